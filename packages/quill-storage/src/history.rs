use uuid::Uuid;

use crate::{Result, db::Db, models::SearchHistoryEntry};

pub async fn insert(db: &Db, entry: &SearchHistoryEntry) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO search_history (
	history_id,
	search_term,
	result_count,
	search_type,
	ip_address,
	user_agent
)
VALUES ($1, $2, $3, $4, $5, $6)",
	)
	.bind(Uuid::new_v4())
	.bind(&entry.search_term)
	.bind(entry.result_count)
	.bind(&entry.search_type)
	.bind(&entry.ip_address)
	.bind(&entry.user_agent)
	.execute(&db.pool)
	.await?;

	Ok(())
}
