use time::OffsetDateTime;
use uuid::Uuid;

/// One row of the `published_post_with_tags` projection, as selected by the
/// search query. The projection is read-only from this crate's perspective.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostHit {
	pub id: Uuid,
	pub title: String,
	pub r#abstract: Option<String>,
	pub thumbnail_hash: Option<String>,
	pub published_at: OffsetDateTime,
	pub fixed_tags: Vec<String>,
	pub generated_tags: Vec<String>,
}

/// Analytics record for one search. Insert-only; the analytics store owns the
/// lifecycle after that.
#[derive(Debug, Clone)]
pub struct SearchHistoryEntry {
	pub search_term: String,
	pub result_count: i64,
	pub search_type: String,
	pub ip_address: String,
	pub user_agent: String,
}
