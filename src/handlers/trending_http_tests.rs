//! HTTP integration tests for the trending endpoints.
//!
//! These drive the full handler path through actix's test service with
//! in-memory collaborators standing in for the trending page and the
//! GitHub API.

#[cfg(test)]
mod http_integration_tests {
    use actix_web::{test, web, App};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::Arc;

    use crate::config::Config;
    use crate::handlers::configure_trending_routes;
    use crate::models::{CandidateRow, RepoMetadata, Timeframe};
    use crate::services::enricher::MetadataEnricher;
    use crate::services::page::{FetchError, RowSource};
    use crate::AppState;

    struct StubSource {
        partitions: HashMap<Option<String>, Vec<CandidateRow>>,
        fail: bool,
    }

    #[async_trait]
    impl RowSource for StubSource {
        async fn fetch(
            &self,
            language: Option<&str>,
            _timeframe: Timeframe,
        ) -> Result<Vec<CandidateRow>, FetchError> {
            if self.fail {
                return Err(FetchError::Status {
                    url: "https://github.com/trending".to_string(),
                    status: 503,
                });
            }
            Ok(self
                .partitions
                .get(&language.map(str::to_string))
                .cloned()
                .unwrap_or_default())
        }
    }

    struct StubEnricher;

    #[async_trait]
    impl MetadataEnricher for StubEnricher {
        async fn lookup(&self, _owner: &str, _name: &str) -> Option<RepoMetadata> {
            None
        }
    }

    fn row(owner: &str, name: &str, rank: u32, language: Option<&str>) -> CandidateRow {
        CandidateRow {
            owner: owner.to_string(),
            name: name.to_string(),
            rank_in_context: rank,
            language_context: language.map(str::to_string),
            description: Some("A test repository".to_string()),
            primary_language: language.map(str::to_string),
            total_stars: Some(100),
            forks: Some(10),
            stars_in_timeframe: Some(5),
            timeframe_delta_label: Some("5 stars today".to_string()),
            repo_url: format!("https://github.com/{owner}/{name}"),
            timeframe: Timeframe::Daily,
        }
    }

    fn rows(prefix: &str, count: u32, language: Option<&str>) -> Vec<CandidateRow> {
        (1..=count)
            .map(|i| row(&format!("{prefix}-{i}"), &format!("repo-{i}"), i, language))
            .collect()
    }

    fn create_test_app_state(
        partitions: HashMap<Option<String>, Vec<CandidateRow>>,
        fail: bool,
    ) -> web::Data<AppState> {
        web::Data::new(AppState {
            config: Config {
                host: "127.0.0.1".to_string(),
                port: 8080,
                github_token: None,
                http_timeout_secs: 5,
                fetch_delay_ms: 0,
            },
            source: Arc::new(StubSource { partitions, fail }),
            enricher: Arc::new(StubEnricher),
        })
    }

    #[actix_rt::test]
    async fn http_trending_per_language_happy_path() {
        let mut partitions = HashMap::new();
        partitions.insert(Some("go".to_string()), rows("go", 5, Some("go")));
        partitions.insert(Some("rust".to_string()), rows("rust", 5, Some("rust")));
        let app_state = create_test_app_state(partitions, false);

        let app = test::init_service(
            App::new()
                .app_data(app_state)
                .configure(configure_trending_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/trending?languages=go,rust&limit=3&timeframe=daily")
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success(), "Request should succeed");

        let body: Value = test::read_body_json(resp).await;
        let repos = body["repos"].as_array().expect("repos should be array");
        assert_eq!(repos.len(), 6);

        for (idx, repo) in repos.iter().enumerate() {
            assert_eq!(repo["rank"].as_u64().unwrap(), idx as u64 + 1);
        }

        let metadata = &body["metadata"];
        assert_eq!(metadata["limit_mode"], "per_language");
        assert_eq!(metadata["limit_per_language"], 3);
        assert_eq!(metadata["limit_total"], 6);
        assert_eq!(metadata["effective_limit"], 6);
        assert_eq!(metadata["retrieved"], 6);
        assert_eq!(metadata["timeframe"], "daily");
        assert!(metadata.get("limit").is_none());
    }

    #[actix_rt::test]
    async fn http_trending_defaults_to_shared_mode() {
        let mut partitions = HashMap::new();
        partitions.insert(None, rows("global", 10, None));
        let app_state = create_test_app_state(partitions, false);

        let app = test::init_service(
            App::new()
                .app_data(app_state)
                .configure(configure_trending_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/trending").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: Value = test::read_body_json(resp).await;
        let metadata = &body["metadata"];
        assert_eq!(metadata["limit_mode"], "shared");
        assert_eq!(metadata["languages"], serde_json::json!(["all"]));
        assert_eq!(metadata["limit"], 10);
        assert_eq!(metadata["effective_limit"], 10);
        assert_eq!(body["repos"].as_array().unwrap().len(), 10);
    }

    #[actix_rt::test]
    async fn http_trending_serializes_wire_field_names() {
        let mut partitions = HashMap::new();
        partitions.insert(None, rows("global", 1, None));
        let app_state = create_test_app_state(partitions, false);

        let app = test::init_service(
            App::new()
                .app_data(app_state)
                .configure(configure_trending_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/trending?limit=1").to_request();
        let resp = test::call_service(&app, req).await;
        let body: Value = test::read_body_json(resp).await;

        let repo = &body["repos"][0];
        for field in [
            "rank",
            "owner",
            "name",
            "repo_url",
            "timeframe",
            "rank_in_context",
            "language_context",
            "description",
            "primary_language",
            "total_stars",
            "forks",
            "stars_in_timeframe",
            "timeframe_delta_label",
            "updated_at",
        ] {
            assert!(
                repo.get(field).is_some(),
                "repo object should carry field '{field}'"
            );
        }
        assert!(repo["updated_at"].is_null(), "no enrichment means null timestamp");
    }

    #[actix_rt::test]
    async fn http_invalid_timeframe_returns_400_before_any_fetch() {
        // A failing source proves rejection happens before fetching.
        let app_state = create_test_app_state(HashMap::new(), true);

        let app = test::init_service(
            App::new()
                .app_data(app_state)
                .configure(configure_trending_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/trending?timeframe=yearly")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 400);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["meta"]["request_id"].is_string());
    }

    #[actix_rt::test]
    async fn http_unsupported_language_returns_400() {
        let app_state = create_test_app_state(HashMap::new(), false);

        let app = test::init_service(
            App::new()
                .app_data(app_state)
                .configure(configure_trending_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/trending?languages=klingon")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 400);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[actix_rt::test]
    async fn http_zero_limit_returns_400() {
        let app_state = create_test_app_state(HashMap::new(), false);

        let app = test::init_service(
            App::new()
                .app_data(app_state)
                .configure(configure_trending_routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/trending?limit=0")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 400);
    }

    #[actix_rt::test]
    async fn http_upstream_failure_returns_502_with_no_partial_rows() {
        let app_state = create_test_app_state(HashMap::new(), true);

        let app = test::init_service(
            App::new()
                .app_data(app_state)
                .configure(configure_trending_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/trending").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 502);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
        assert!(body.get("repos").is_none(), "failed requests carry no rows");
    }

    #[actix_rt::test]
    async fn http_languages_lists_curated_set() {
        let app_state = create_test_app_state(HashMap::new(), false);

        let app = test::init_service(
            App::new()
                .app_data(app_state)
                .configure(configure_trending_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/languages").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["default"], "all");
        let supported = body["supported"].as_array().unwrap();
        assert!(supported.iter().any(|l| l == "rust"));
        assert!(supported.iter().any(|l| l == "objective-c"));
    }

    #[actix_rt::test]
    async fn http_health_reports_ok() {
        let app_state = create_test_app_state(HashMap::new(), false);

        let app = test::init_service(
            App::new()
                .app_data(app_state)
                .configure(configure_trending_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
    }
}
