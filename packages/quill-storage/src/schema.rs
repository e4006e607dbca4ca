pub fn render_schema() -> String {
	let init = include_str!("../../../sql/init.sql");

	expand_includes(init)
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_posts.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_posts.sql")),
				"tables/002_site_settings.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_site_settings.sql")),
				"tables/003_search_history.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_search_history.sql")),
				"views/001_published_post_with_tags.sql" => out
					.push_str(include_str!("../../../sql/views/001_published_post_with_tags.sql")),
				_ => out.push_str(line),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}
