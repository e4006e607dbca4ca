use quill_domain::Sort;
use sqlx::{Postgres, QueryBuilder};

use crate::{Result, db::Db, models::PostHit};

const PROJECTION: &str = "published_post_with_tags";
const COLUMNS: &str = "id, title, abstract, thumbnail_hash, published_at, fixed_tags, generated_tags";

/// Filter set for one page over the post projection. `text` is the already
/// normalized query (never empty when present); `tags` are lowercased.
#[derive(Debug, Clone)]
pub struct PostQuery {
	pub text: Option<String>,
	pub tags: Vec<String>,
	pub sort: Sort,
	pub limit: i64,
	pub offset: i64,
}

#[derive(Debug)]
pub struct PostPage {
	pub hits: Vec<PostHit>,
	pub total: i64,
}

/// Runs the filtered, sorted, paginated query plus an exact count with the
/// same filters.
pub async fn search(db: &Db, query: &PostQuery) -> Result<PostPage> {
	let mut count = QueryBuilder::<Postgres>::new(format!("SELECT count(*) FROM {PROJECTION}"));

	push_filters(&mut count, query);

	let total: i64 = count.build_query_scalar().fetch_one(&db.pool).await?;

	let mut page = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM {PROJECTION}"));

	push_filters(&mut page, query);

	page.push(match query.sort {
		Sort::DateAsc => " ORDER BY published_at ASC",
		// Relevance has no scoring implementation; recency stands in for it.
		Sort::DateDesc | Sort::Relevance => " ORDER BY published_at DESC",
	});
	page.push(" LIMIT ");
	page.push_bind(query.limit);
	page.push(" OFFSET ");
	page.push_bind(query.offset);

	let hits: Vec<PostHit> = page.build_query_as().fetch_all(&db.pool).await?;

	Ok(PostPage { hits, total })
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &PostQuery) {
	let mut clause = " WHERE ";

	if let Some(text) = &query.text {
		let pattern = format!("%{text}%");

		builder.push(clause);
		builder.push("(title ILIKE ");
		builder.push_bind(pattern.clone());
		builder.push(" OR abstract ILIKE ");
		builder.push_bind(pattern);
		builder.push(")");

		clause = " AND ";
	}
	if !query.tags.is_empty() {
		// Array overlap gives OR semantics across the requested tags, over
		// both tag categories.
		builder.push(clause);
		builder.push("(fixed_tags && ");
		builder.push_bind(query.tags.clone());
		builder.push("::text[] OR generated_tags && ");
		builder.push_bind(query.tags.clone());
		builder.push("::text[])");
	}
}
