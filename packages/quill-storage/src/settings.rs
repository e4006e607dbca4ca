use crate::{Result, db::Db};

/// Key/value lookup against `site_settings`. A missing key is `None`; the
/// caller decides what a lookup failure means.
pub async fn get(db: &Db, key: &str) -> Result<Option<String>> {
	let value: Option<String> =
		sqlx::query_scalar("SELECT value FROM site_settings WHERE key = $1")
			.bind(key)
			.fetch_optional(&db.pool)
			.await?;

	Ok(value)
}
