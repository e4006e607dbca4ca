pub mod query_text;
pub mod request;

pub use query_text::normalize_query;
pub use request::{SearchParams, SearchType, Sort, parse_request};
