use std::borrow::Cow;

use regex::Regex;

/// Reduces free text to a pattern safe for a `%substring%` match: everything
/// outside word characters and whitespace becomes a space, whitespace runs
/// collapse to one space, and the ends are trimmed. Returns `None` when
/// nothing survives, so a pure-punctuation query applies no text filter at
/// all instead of matching an empty pattern.
pub fn normalize_query(raw: &str) -> Option<String> {
	let stripped = match Regex::new(r"[^\w\s]") {
		Ok(re) => re.replace_all(raw, " "),
		Err(_) => Cow::Borrowed(raw),
	};
	let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

	if collapsed.is_empty() { None } else { Some(collapsed) }
}
