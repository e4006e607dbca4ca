use std::{
	sync::Arc,
	time::{Duration, Instant},
};

use serde_json::json;
use time::macros::datetime;

use quill_domain::{SearchParams, parse_request};
use quill_service::{ClientMeta, Engine, SearchService, ServiceError};
use quill_storage::models::SearchHistoryEntry;
use quill_testkit::memory::{self, MemoryBackend};

const FLAG_KEY: &str = "is_opensearch_enabled";

fn service(backend: &Arc<MemoryBackend>) -> SearchService {
	SearchService::with_stores(backend.stores(), FLAG_KEY.to_string())
}

fn params(body: serde_json::Value) -> SearchParams {
	parse_request(&body).expect("Request must be valid.")
}

fn seeded_backend() -> Arc<MemoryBackend> {
	MemoryBackend::new(vec![
		memory::post(
			"Writing a blog in Rust",
			Some("Notes on static site generators"),
			&["dev", "rust"],
			&["tooling"],
			datetime!(2024-03-01 12:00 UTC),
		),
		memory::post(
			"Sourdough starter log",
			Some("A month of feeding schedules"),
			&["baking"],
			&[],
			datetime!(2024-02-01 09:30 UTC),
		),
		memory::post(
			"Async Rust pitfalls",
			None,
			&["rust"],
			&["dev"],
			datetime!(2024-04-15 18:00 UTC),
		),
	])
}

async fn wait_for_history(backend: &MemoryBackend) -> Vec<SearchHistoryEntry> {
	for _ in 0..200 {
		let entries = backend.recorded_history();

		if !entries.is_empty() {
			return entries;
		}

		tokio::time::sleep(Duration::from_millis(5)).await;
	}

	Vec::new()
}

#[tokio::test]
async fn empty_request_returns_all_posts_newest_first() {
	let backend = seeded_backend();
	let response =
		service(&backend).search(params(json!({})), ClientMeta::default()).await.unwrap();

	assert_eq!(response.pagination.total, 3);
	assert_eq!(response.results.len(), 3);
	assert!(!response.pagination.has_more);
	assert_eq!(response.query_info.engine, Engine::Postgresql);
	assert_eq!(response.results[0].title, "Async Rust pitfalls");
	assert_eq!(response.results[2].title, "Sourdough starter log");
}

#[tokio::test]
async fn page_length_and_has_more_follow_the_arithmetic() {
	let posts = (0..12)
		.map(|n| {
			memory::post(
				&format!("test post {n}"),
				None,
				&["dev"],
				&[],
				datetime!(2024-01-01 00:00 UTC) + Duration::from_secs(n * 3_600),
			)
		})
		.collect();
	let backend = MemoryBackend::new(posts);
	let response = service(&backend)
		.search(params(json!({ "query": "test", "limit": 5 })), ClientMeta::default())
		.await
		.unwrap();

	assert_eq!(response.results.len(), 5);
	assert_eq!(response.pagination.total, 12);
	assert!(response.pagination.has_more);
}

#[tokio::test]
async fn offset_past_the_last_match_yields_an_empty_page() {
	let backend = seeded_backend();
	let response = service(&backend)
		.search(params(json!({ "offset": 40, "limit": 10 })), ClientMeta::default())
		.await
		.unwrap();

	assert!(response.results.is_empty());
	assert_eq!(response.pagination.total, 3);
	assert!(!response.pagination.has_more);
}

#[tokio::test]
async fn maximum_offset_reports_no_further_pages() {
	let backend = seeded_backend();
	let response = service(&backend)
		.search(params(json!({ "offset": i64::MAX, "limit": 10 })), ClientMeta::default())
		.await
		.unwrap();

	assert!(response.results.is_empty());
	assert_eq!(response.pagination.total, 3);
	assert_eq!(response.pagination.offset, i64::MAX);
	assert!(!response.pagination.has_more);
}

#[tokio::test]
async fn took_counts_from_the_supplied_receipt_instant() {
	let backend = seeded_backend();
	let received = Instant::now() - Duration::from_millis(80);
	let response = service(&backend)
		.search_from(received, params(json!({})), ClientMeta::default())
		.await
		.unwrap();

	assert!(response.query_info.took >= 80);
}

#[tokio::test]
async fn tag_filter_is_or_not_and() {
	let backend = seeded_backend();
	let response = service(&backend)
		.search(params(json!({ "tags": ["baking", "nonexistent"] })), ClientMeta::default())
		.await
		.unwrap();

	assert_eq!(response.pagination.total, 1);
	assert_eq!(response.results[0].title, "Sourdough starter log");
}

#[tokio::test]
async fn tags_match_case_insensitively_but_echo_as_sent() {
	let backend = seeded_backend();
	let response = service(&backend)
		.search(params(json!({ "tags": ["Rust"] })), ClientMeta::default())
		.await
		.unwrap();

	assert_eq!(response.pagination.total, 2);
	assert_eq!(response.query_info.tags, vec!["Rust".to_string()]);
}

#[tokio::test]
async fn generated_tags_count_toward_the_match() {
	let backend = seeded_backend();
	let response = service(&backend)
		.search(params(json!({ "tags": ["tooling"] })), ClientMeta::default())
		.await
		.unwrap();

	assert_eq!(response.pagination.total, 1);
	assert_eq!(response.results[0].title, "Writing a blog in Rust");
	// Shaped tags are the union of both categories.
	assert_eq!(response.results[0].tags, vec!["dev", "rust", "tooling"]);
}

#[tokio::test]
async fn date_asc_orders_by_publish_time() {
	let backend = seeded_backend();
	let response = service(&backend)
		.search(params(json!({ "tags": ["dev"], "sort": "date_asc" })), ClientMeta::default())
		.await
		.unwrap();

	assert!(response.results.len() >= 2);

	for pair in response.results.windows(2) {
		assert!(pair[0].published_at <= pair[1].published_at);
	}
}

#[tokio::test]
async fn punctuation_only_query_applies_no_text_filter() {
	let backend = seeded_backend();
	let response = service(&backend)
		.search(params(json!({ "query": "??? !!!" })), ClientMeta::default())
		.await
		.unwrap();

	assert_eq!(response.pagination.total, 3);
}

#[tokio::test]
async fn text_filter_matches_title_or_abstract() {
	let backend = seeded_backend();
	let by_title = service(&backend)
		.search(params(json!({ "query": "sourdough" })), ClientMeta::default())
		.await
		.unwrap();
	let by_abstract = service(&backend)
		.search(params(json!({ "query": "feeding" })), ClientMeta::default())
		.await
		.unwrap();

	assert_eq!(by_title.pagination.total, 1);
	assert_eq!(by_abstract.pagination.total, 1);
	assert_eq!(by_abstract.results[0].title, "Sourdough starter log");
}

#[tokio::test]
async fn identical_requests_return_identical_pages() {
	let backend = seeded_backend();
	let svc = service(&backend);
	let first = svc.search(params(json!({ "query": "rust" })), ClientMeta::default()).await.unwrap();
	let second =
		svc.search(params(json!({ "query": "rust" })), ClientMeta::default()).await.unwrap();

	assert_eq!(first.pagination.total, second.pagination.total);
	assert_eq!(
		first.results.iter().map(|hit| hit.id).collect::<Vec<_>>(),
		second.results.iter().map(|hit| hit.id).collect::<Vec<_>>(),
	);
}

#[tokio::test]
async fn settings_failure_silently_selects_the_relational_engine() {
	let backend = seeded_backend();

	backend.fail_settings();

	let response =
		service(&backend).search(params(json!({})), ClientMeta::default()).await.unwrap();

	assert_eq!(response.query_info.engine, Engine::Postgresql);
	assert_eq!(response.pagination.total, 3);
}

#[tokio::test]
async fn opensearch_flag_selects_the_stub_engine() {
	let backend = seeded_backend();

	backend.set_setting(FLAG_KEY, "true");

	let response =
		service(&backend).search(params(json!({ "query": "rust" })), ClientMeta::default())
			.await
			.unwrap();

	assert_eq!(response.query_info.engine, Engine::Opensearch);
	assert!(response.results.is_empty());
	assert_eq!(response.pagination.total, 0);
	assert!(!response.pagination.has_more);
}

#[tokio::test]
async fn flag_values_other_than_true_stay_relational() {
	let backend = seeded_backend();

	backend.set_setting(FLAG_KEY, "enabled");

	let response =
		service(&backend).search(params(json!({})), ClientMeta::default()).await.unwrap();

	assert_eq!(response.query_info.engine, Engine::Postgresql);
}

#[tokio::test]
async fn relational_query_failure_is_fatal() {
	let backend = seeded_backend();

	backend.fail_posts();

	let err = service(&backend)
		.search(params(json!({ "query": "rust" })), ClientMeta::default())
		.await
		.unwrap_err();

	assert!(matches!(err, ServiceError::Storage { .. }));
}

#[tokio::test]
async fn history_failure_never_fails_the_search() {
	let backend = seeded_backend();

	backend.fail_history();

	let response = service(&backend)
		.search(params(json!({ "query": "rust" })), ClientMeta::default())
		.await
		.unwrap();

	assert_eq!(response.pagination.total, 2);
	// Give the detached write a chance to run; it must fail quietly.
	tokio::time::sleep(Duration::from_millis(25)).await;
	assert!(backend.recorded_history().is_empty());
}

#[tokio::test]
async fn history_records_the_combined_search() {
	let backend = seeded_backend();
	let client = ClientMeta {
		ip_address: "203.0.113.9".to_string(),
		user_agent: "integration-test".to_string(),
	};

	service(&backend)
		.search(params(json!({ "query": "rust", "tags": ["dev"] })), client)
		.await
		.unwrap();

	let entries = wait_for_history(&backend).await;

	assert_eq!(entries.len(), 1);
	assert_eq!(entries[0].search_term, "rust");
	assert_eq!(entries[0].search_type, "combined");
	assert_eq!(entries[0].result_count, 2);
	assert_eq!(entries[0].ip_address, "203.0.113.9");
	assert_eq!(entries[0].user_agent, "integration-test");
}

#[tokio::test]
async fn history_joins_tags_when_no_query_is_present() {
	let backend = seeded_backend();

	service(&backend)
		.search(params(json!({ "tags": ["dev", "rust"] })), ClientMeta::default())
		.await
		.unwrap();

	let entries = wait_for_history(&backend).await;

	assert_eq!(entries.len(), 1);
	assert_eq!(entries[0].search_term, "dev,rust");
	assert_eq!(entries[0].search_type, "tag");
}

#[tokio::test]
async fn history_records_the_empty_request_as_text() {
	let backend = seeded_backend();

	service(&backend).search(params(json!({})), ClientMeta::default()).await.unwrap();

	let entries = wait_for_history(&backend).await;

	assert_eq!(entries.len(), 1);
	assert_eq!(entries[0].search_term, "");
	assert_eq!(entries[0].search_type, "text");
	assert_eq!(entries[0].result_count, 3);
}
