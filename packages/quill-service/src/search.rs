use std::time::Instant;

use quill_domain::{SearchParams, normalize_query};
use quill_storage::{
	models::{PostHit, SearchHistoryEntry},
	posts::PostQuery,
};
use tracing::warn;

use crate::{SearchService, ServiceResult};

/// Relevance scoring is not implemented; every hit carries this weight.
pub const PLACEHOLDER_SCORE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
	Postgresql,
	Opensearch,
}
impl Engine {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Postgresql => "postgresql",
			Self::Opensearch => "opensearch",
		}
	}
}

/// Caller network metadata, extracted at the HTTP boundary.
#[derive(Debug, Clone)]
pub struct ClientMeta {
	pub ip_address: String,
	pub user_agent: String,
}
impl Default for ClientMeta {
	fn default() -> Self {
		Self { ip_address: "unknown".to_string(), user_agent: String::new() }
	}
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchResult {
	pub id: uuid::Uuid,
	pub title: String,
	pub r#abstract: Option<String>,
	pub thumbnail_hash: Option<String>,
	#[serde(with = "crate::time_serde")]
	pub published_at: time::OffsetDateTime,
	pub tags: Vec<String>,
	pub score: f32,
	/// Reserved for a future engine that can produce match highlights.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub highlights: Option<serde_json::Value>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Pagination {
	pub total: i64,
	pub limit: i64,
	pub offset: i64,
	pub has_more: bool,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct QueryInfo {
	pub query: Option<String>,
	pub tags: Vec<String>,
	pub took: u64,
	pub engine: Engine,
	/// Reserved; always empty until suggestion support exists.
	pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SearchResponse {
	pub results: Vec<SearchResult>,
	pub pagination: Pagination,
	pub query_info: QueryInfo,
}

impl SearchService {
	/// Runs one search request end to end: engine selection, query execution,
	/// result shaping, and a detached history write. Only the relational
	/// query itself can fail the request.
	pub async fn search(
		&self,
		params: SearchParams,
		client: ClientMeta,
	) -> ServiceResult<SearchResponse> {
		self.search_from(Instant::now(), params, client).await
	}

	/// Same as [`Self::search`], with `received` marking when the request
	/// entered the process; `took` covers everything from that point, body
	/// parsing and validation included.
	pub async fn search_from(
		&self,
		received: Instant,
		params: SearchParams,
		client: ClientMeta,
	) -> ServiceResult<SearchResponse> {
		let (hits, total, engine) = match self.select_engine().await {
			Engine::Opensearch => {
				// The external index is not wired up yet. Serve a well-formed
				// empty page rather than an error.
				warn!("OpenSearch engine is enabled but not implemented; returning an empty result set.");

				(Vec::new(), 0, Engine::Opensearch)
			},
			Engine::Postgresql => {
				let query = PostQuery {
					text: params.query.as_deref().and_then(normalize_query),
					tags: params.tags.iter().map(|tag| tag.to_lowercase()).collect(),
					sort: params.sort,
					limit: params.limit,
					offset: params.offset,
				};
				let page = self.stores.posts.search(&query).await?;

				(page.hits, page.total, Engine::Postgresql)
			},
		};
		let results = hits.into_iter().map(shape_result).collect();

		self.record_history(&params, total, client);

		let took = received.elapsed().as_millis() as u64;

		Ok(SearchResponse {
			results,
			pagination: Pagination {
				total,
				limit: params.limit,
				offset: params.offset,
				// Offset is only bounded below, so the sum can exceed i64.
				has_more: params.offset.saturating_add(params.limit) < total,
			},
			query_info: QueryInfo {
				query: params.query,
				tags: params.tags,
				took,
				engine,
				suggestions: Vec::new(),
			},
		})
	}

	async fn select_engine(&self) -> Engine {
		match self.stores.settings.get(&self.engine_flag_key).await {
			Ok(Some(value)) if value == "true" => Engine::Opensearch,
			Ok(_) => Engine::Postgresql,
			Err(err) => {
				warn!(error = %err, "Engine flag lookup failed; using the relational engine.");

				Engine::Postgresql
			},
		}
	}

	/// Fire-and-forget analytics write. The response is never gated on it and
	/// a failed insert surfaces only in the logs.
	fn record_history(&self, params: &SearchParams, total: i64, client: ClientMeta) {
		let entry = SearchHistoryEntry {
			search_term: params.search_term(),
			result_count: total,
			search_type: params.search_type().as_str().to_string(),
			ip_address: client.ip_address,
			user_agent: client.user_agent,
		};
		let sink = self.stores.history.clone();

		tokio::spawn(async move {
			if let Err(err) = sink.insert(&entry).await {
				warn!(error = %err, "Failed to record search history.");
			}
		});
	}
}

fn shape_result(hit: PostHit) -> SearchResult {
	let mut tags = hit.fixed_tags;

	tags.extend(hit.generated_tags);

	SearchResult {
		id: hit.id,
		title: hit.title,
		r#abstract: hit.r#abstract,
		thumbnail_hash: hit.thumbnail_hash,
		published_at: hit.published_at,
		tags,
		score: PLACEHOLDER_SCORE,
		highlights: None,
	}
}
