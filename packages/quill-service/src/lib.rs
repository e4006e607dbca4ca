pub mod search;
pub mod time_serde;

mod error;

use std::{future::Future, pin::Pin, sync::Arc};

pub use error::Error as ServiceError;
pub use search::{
	ClientMeta, Engine, Pagination, QueryInfo, SearchResponse, SearchResult,
};

use quill_storage::{
	db::Db,
	history,
	models::SearchHistoryEntry,
	posts::{self, PostPage, PostQuery},
	settings,
};

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read access to the published-post projection.
pub trait PostStore
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		query: &'a PostQuery,
	) -> BoxFuture<'a, quill_storage::Result<PostPage>>;
}

/// Key/value settings lookup. Callers treat any failure as "unset".
pub trait SettingsStore
where
	Self: Send + Sync,
{
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, quill_storage::Result<Option<String>>>;
}

/// Best-effort analytics sink. Errors are the caller's to swallow.
pub trait HistorySink
where
	Self: Send + Sync,
{
	fn insert<'a>(
		&'a self,
		entry: &'a SearchHistoryEntry,
	) -> BoxFuture<'a, quill_storage::Result<()>>;
}

#[derive(Clone)]
pub struct Stores {
	pub posts: Arc<dyn PostStore>,
	pub settings: Arc<dyn SettingsStore>,
	pub history: Arc<dyn HistorySink>,
}
impl Stores {
	pub fn postgres(db: Db) -> Self {
		let store = Arc::new(PgStores { db });

		Self { posts: store.clone(), settings: store.clone(), history: store }
	}
}

pub struct SearchService {
	pub stores: Stores,
	pub engine_flag_key: String,
}
impl SearchService {
	pub fn new(db: Db, cfg: &quill_config::Search) -> Self {
		Self::with_stores(Stores::postgres(db), cfg.engine_flag_key.clone())
	}

	pub fn with_stores(stores: Stores, engine_flag_key: String) -> Self {
		Self { stores, engine_flag_key }
	}
}

struct PgStores {
	db: Db,
}

impl PostStore for PgStores {
	fn search<'a>(
		&'a self,
		query: &'a PostQuery,
	) -> BoxFuture<'a, quill_storage::Result<PostPage>> {
		Box::pin(posts::search(&self.db, query))
	}
}

impl SettingsStore for PgStores {
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, quill_storage::Result<Option<String>>> {
		Box::pin(settings::get(&self.db, key))
	}
}

impl HistorySink for PgStores {
	fn insert<'a>(
		&'a self,
		entry: &'a SearchHistoryEntry,
	) -> BoxFuture<'a, quill_storage::Result<()>> {
		Box::pin(history::insert(&self.db, entry))
	}
}
