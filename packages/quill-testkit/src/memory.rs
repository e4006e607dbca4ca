//! In-memory stand-ins for the service's store seams, mirroring the
//! relational engine's filter, sort, and pagination semantics.

use std::{
	collections::HashMap,
	sync::{
		Arc, Mutex,
		atomic::{AtomicBool, Ordering},
	},
};

use quill_domain::Sort;
use quill_service::{BoxFuture, HistorySink, PostStore, SettingsStore, Stores};
use quill_storage::{
	models::{PostHit, SearchHistoryEntry},
	posts::{PostPage, PostQuery},
};
use time::OffsetDateTime;
use uuid::Uuid;

pub struct MemoryBackend {
	posts: Vec<PostHit>,
	settings: Mutex<HashMap<String, String>>,
	history: Mutex<Vec<SearchHistoryEntry>>,
	fail_posts: AtomicBool,
	fail_settings: AtomicBool,
	fail_history: AtomicBool,
}
impl MemoryBackend {
	pub fn new(posts: Vec<PostHit>) -> Arc<Self> {
		Arc::new(Self {
			posts,
			settings: Mutex::new(HashMap::new()),
			history: Mutex::new(Vec::new()),
			fail_posts: AtomicBool::new(false),
			fail_settings: AtomicBool::new(false),
			fail_history: AtomicBool::new(false),
		})
	}

	pub fn stores(self: &Arc<Self>) -> Stores {
		Stores { posts: self.clone(), settings: self.clone(), history: self.clone() }
	}

	pub fn set_setting(&self, key: &str, value: &str) {
		let mut settings = self.settings.lock().unwrap_or_else(|err| err.into_inner());

		settings.insert(key.to_string(), value.to_string());
	}

	pub fn fail_posts(&self) {
		self.fail_posts.store(true, Ordering::SeqCst);
	}

	pub fn fail_settings(&self) {
		self.fail_settings.store(true, Ordering::SeqCst);
	}

	pub fn fail_history(&self) {
		self.fail_history.store(true, Ordering::SeqCst);
	}

	pub fn recorded_history(&self) -> Vec<SearchHistoryEntry> {
		let history = self.history.lock().unwrap_or_else(|err| err.into_inner());

		history.clone()
	}
}

impl PostStore for MemoryBackend {
	fn search<'a>(
		&'a self,
		query: &'a PostQuery,
	) -> BoxFuture<'a, quill_storage::Result<PostPage>> {
		Box::pin(async move {
			if self.fail_posts.load(Ordering::SeqCst) {
				return Err(backend_down());
			}

			let mut matched: Vec<PostHit> =
				self.posts.iter().filter(|post| matches(post, query)).cloned().collect();

			match query.sort {
				Sort::DateAsc => matched.sort_by_key(|post| post.published_at),
				Sort::DateDesc | Sort::Relevance =>
					matched.sort_by_key(|post| std::cmp::Reverse(post.published_at)),
			}

			let total = matched.len() as i64;
			let hits = matched
				.into_iter()
				.skip(query.offset as usize)
				.take(query.limit as usize)
				.collect();

			Ok(PostPage { hits, total })
		})
	}
}

impl SettingsStore for MemoryBackend {
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, quill_storage::Result<Option<String>>> {
		Box::pin(async move {
			if self.fail_settings.load(Ordering::SeqCst) {
				return Err(backend_down());
			}

			let settings = self.settings.lock().unwrap_or_else(|err| err.into_inner());

			Ok(settings.get(key).cloned())
		})
	}
}

impl HistorySink for MemoryBackend {
	fn insert<'a>(
		&'a self,
		entry: &'a SearchHistoryEntry,
	) -> BoxFuture<'a, quill_storage::Result<()>> {
		Box::pin(async move {
			if self.fail_history.load(Ordering::SeqCst) {
				return Err(backend_down());
			}

			let mut history = self.history.lock().unwrap_or_else(|err| err.into_inner());

			history.push(entry.clone());

			Ok(())
		})
	}
}

pub fn post(
	title: &str,
	r#abstract: Option<&str>,
	fixed_tags: &[&str],
	generated_tags: &[&str],
	published_at: OffsetDateTime,
) -> PostHit {
	PostHit {
		id: Uuid::new_v4(),
		title: title.to_string(),
		r#abstract: r#abstract.map(str::to_string),
		thumbnail_hash: None,
		published_at,
		fixed_tags: fixed_tags.iter().map(|tag| tag.to_string()).collect(),
		generated_tags: generated_tags.iter().map(|tag| tag.to_string()).collect(),
	}
}

fn matches(post: &PostHit, query: &PostQuery) -> bool {
	if let Some(text) = &query.text {
		let needle = text.to_lowercase();
		let in_title = post.title.to_lowercase().contains(&needle);
		let in_abstract = post
			.r#abstract
			.as_deref()
			.map(|text| text.to_lowercase().contains(&needle))
			.unwrap_or(false);

		if !in_title && !in_abstract {
			return false;
		}
	}
	if !query.tags.is_empty() {
		let overlaps = post
			.fixed_tags
			.iter()
			.chain(&post.generated_tags)
			.any(|tag| query.tags.iter().any(|wanted| wanted == &tag.to_lowercase()));

		if !overlaps {
			return false;
		}
	}

	true
}

fn backend_down() -> quill_storage::Error {
	quill_storage::Error::Sqlx(sqlx::Error::PoolClosed)
}
