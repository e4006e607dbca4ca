use std::sync::Arc;

use quill_service::SearchService;
use quill_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<SearchService>,
}
impl AppState {
	pub async fn new(config: quill_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let service = SearchService::new(db, &config.search);

		Ok(Self { service: Arc::new(service) })
	}
}
