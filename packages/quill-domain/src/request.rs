use serde_json::Value;

pub const MAX_QUERY_CHARS: usize = 255;
pub const MAX_TAGS: usize = 10;
pub const MAX_TAG_CHARS: usize = 50;
pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 50;
pub const DEFAULT_LIMIT: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sort {
	Relevance,
	DateDesc,
	DateAsc,
}
impl Sort {
	pub fn from_name(name: &str) -> Option<Self> {
		match name {
			"relevance" => Some(Self::Relevance),
			"date_desc" => Some(Self::DateDesc),
			"date_asc" => Some(Self::DateAsc),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
	Text,
	Tag,
	Combined,
}
impl SearchType {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Text => "text",
			Self::Tag => "tag",
			Self::Combined => "combined",
		}
	}
}

/// A validated search request with defaults applied. Tag order is preserved
/// for echoing back to the caller; matching lowercases independently.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
	pub query: Option<String>,
	pub tags: Vec<String>,
	pub limit: i64,
	pub offset: i64,
	pub sort: Sort,
	pub include_draft: bool,
}
impl SearchParams {
	pub fn search_type(&self) -> SearchType {
		match (self.query.is_some(), !self.tags.is_empty()) {
			(true, true) => SearchType::Combined,
			(false, true) => SearchType::Tag,
			_ => SearchType::Text,
		}
	}

	/// The term recorded in search history: the free-text query when present,
	/// else the tags joined by commas, else empty.
	pub fn search_term(&self) -> String {
		match &self.query {
			Some(query) => query.clone(),
			None => self.tags.join(","),
		}
	}
}
impl Default for SearchParams {
	fn default() -> Self {
		Self {
			query: None,
			tags: Vec::new(),
			limit: DEFAULT_LIMIT,
			offset: 0,
			sort: Sort::Relevance,
			include_draft: false,
		}
	}
}

/// Validates an untrusted request body. Every rule is applied independently
/// and every violation is reported; a type mismatch is a message in the list,
/// never a deserialization failure. Absent fields take their defaults.
pub fn parse_request(data: &Value) -> Result<SearchParams, Vec<String>> {
	let Some(object) = data.as_object() else {
		return Err(vec!["Request body must be a JSON object".to_string()]);
	};

	let mut errors = Vec::new();
	let mut params = SearchParams::default();

	if let Some(query) = object.get("query") {
		match query.as_str() {
			Some(query) if query.chars().count() > MAX_QUERY_CHARS =>
				errors.push("Query must be 255 characters or less".to_string()),
			Some(query) => params.query = Some(query.to_string()),
			None => errors.push("Query must be a string".to_string()),
		}
	}

	if let Some(tags) = object.get("tags") {
		match tags.as_array() {
			Some(tags) => {
				if tags.len() > MAX_TAGS {
					errors.push("Maximum 10 tags allowed".to_string());
				}

				let mut parsed = Vec::with_capacity(tags.len());

				for tag in tags {
					let Some(tag) = tag.as_str() else {
						errors.push("All tags must be strings".to_string());

						parsed.clear();

						break;
					};

					if tag.chars().count() > MAX_TAG_CHARS {
						errors.push("Each tag must be 50 characters or less".to_string());

						parsed.clear();

						break;
					}

					parsed.push(tag.to_string());
				}

				params.tags = parsed;
			},
			None => errors.push("Tags must be an array".to_string()),
		}
	}

	if let Some(limit) = object.get("limit") {
		match limit.as_i64() {
			Some(limit) if (MIN_LIMIT..=MAX_LIMIT).contains(&limit) => params.limit = limit,
			Some(_) => errors.push("Limit must be between 1 and 50".to_string()),
			None => errors.push("Limit must be an integer".to_string()),
		}
	}

	if let Some(offset) = object.get("offset") {
		match offset.as_i64() {
			Some(offset) if offset >= 0 => params.offset = offset,
			Some(_) => errors.push("Offset must be 0 or greater".to_string()),
			None => errors.push("Offset must be an integer".to_string()),
		}
	}

	if let Some(sort) = object.get("sort") {
		match sort.as_str().and_then(Sort::from_name) {
			Some(sort) => params.sort = sort,
			None =>
				errors.push("Sort must be one of: relevance, date_desc, date_asc".to_string()),
		}
	}

	if let Some(include_draft) = object.get("include_draft") {
		match include_draft.as_bool() {
			Some(include_draft) => params.include_draft = include_draft,
			None => errors.push("Include_draft must be a boolean".to_string()),
		}
	}

	if errors.is_empty() { Ok(params) } else { Err(errors) }
}
