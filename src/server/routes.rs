use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::server::{handlers, state::AppState};

/// CORS policy for the configured origins; `"*"` allows any origin.
fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins = origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin: {}", o))
            })
            .collect::<Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

pub fn create_router(state: AppState) -> Result<Router> {
    let cors = cors_layer(&state.config.server.allowed_origins)?;

    Ok(Router::new()
        // Snapshot endpoints
        .route("/api/nba-teams", get(handlers::get_nba_teams))
        .route("/api/nba-stats", get(handlers::get_nba_stats))
        .route("/api/member-stats", get(handlers::get_member_stats))
        // Live stats endpoints
        .route("/api/teams", get(handlers::get_teams))
        .route("/api/team-stats", get(handlers::get_team_stats))
        // Analysis
        .route("/api/analyze-stats", post(handlers::analyze_stats))
        .with_state(state)
        .layer(cors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::{Result as StatsResult, StatsError};
    use crate::models::{Record, TeamDescriptor};
    use crate::nba::{decode_result_set, teams, StatsSource};
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const TEAM_TREE: &str = include_str!("../../fixtures/nba_team.json");
    const PLAYER_ROWS: &str = include_str!("../../fixtures/nba_data.json");
    const YEAR_BY_YEAR: &str = include_str!("../../fixtures/team_year_by_year.json");
    const NUGGETS: &str = "1610612743";

    /// Knows the Nuggets; every other id fails.
    struct FakeSource;

    #[async_trait]
    impl StatsSource for FakeSource {
        async fn teams(&self) -> StatsResult<Vec<TeamDescriptor>> {
            Ok(teams::all())
        }

        async fn team_year_by_year(&self, team_id: &str) -> StatsResult<Vec<Record>> {
            if team_id == NUGGETS {
                let body: Value = serde_json::from_str(YEAR_BY_YEAR)
                    .map_err(|e| StatsError::UpstreamFormat(e.to_string()))?;
                decode_result_set(&body)
            } else {
                Err(StatsError::UpstreamFormat(format!("unknown team {}", team_id)))
            }
        }
    }

    fn test_router(with_files: bool) -> (TempDir, Router) {
        let dir = TempDir::new().unwrap();
        if with_files {
            std::fs::write(dir.path().join("nba_team.json"), TEAM_TREE).unwrap();
            std::fs::write(dir.path().join("nba_data.json"), PLAYER_ROWS).unwrap();
        }

        let mut config = Config::default();
        config.data.dir = dir.path().to_path_buf();

        let router = create_router(AppState::new(config, Arc::new(FakeSource))).unwrap();
        (dir, router)
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn analyze_request(body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/analyze-stats")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_nba_teams_totals_include_empty_seasons() {
        let (_dir, router) = test_router(true);
        let (status, body) = send(router, get_request("/api/nba-teams")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(
            body["data"],
            json!([
                {"team": "Boston Celtics", "season": "2018-2019", "total_offense": 2882, "total_defense": 959},
                {"team": "Boston Celtics", "season": "2019-2020", "total_offense": 1545, "total_defense": 542},
                {"team": "Denver Nuggets", "season": "2019-2020", "total_offense": 2644, "total_defense": 984},
                {"team": "Denver Nuggets", "season": "2020-2021", "total_offense": 0, "total_defense": 0},
            ])
        );
    }

    #[tokio::test]
    async fn test_nba_stats_defaults_missing_three_pointers() {
        let (_dir, router) = test_router(true);
        let (status, body) = send(router, get_request("/api/nba-stats")).await;

        assert_eq!(status, StatusCode::OK);
        let rows = body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[2],
            json!({"team": "Denver Nuggets", "season": "2019-2020", "total_points": 2644, "three_points": 225})
        );
    }

    #[tokio::test]
    async fn test_member_stats_skip_out_of_range_seasons() {
        let (_dir, router) = test_router(true);
        let (_, body) = send(router, get_request("/api/member-stats")).await;

        let rows = body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r["full_name"] != "Al Horford"));

        let tatum = rows.iter().find(|r| r["full_name"] == "Jayson Tatum").unwrap();
        assert_eq!(tatum["points"], 2831);
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_server_error() {
        let (_dir, router) = test_router(false);
        let (status, body) = send(router, get_request("/api/nba-stats")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "error");
        assert!(body["message"].as_str().unwrap().contains("nba_data.json"));
    }

    #[tokio::test]
    async fn test_teams_directory() {
        let (_dir, router) = test_router(false);
        let (status, body) = send(router, get_request("/api/teams")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 30);
        assert_eq!(body["data"][0]["abbreviation"], "ATL");
    }

    #[tokio::test]
    async fn test_team_stats_isolates_failed_lookups() {
        let (_dir, router) = test_router(false);
        let uri = format!("/api/team-stats?team_ids={},42", NUGGETS);
        let (status, body) = send(router, get_request(&uri)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        let rows = body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r["team"] == "Nuggets"));
        assert_eq!(rows[0]["season"], "2018-19");
        assert!(rows[0]["avg_points"].is_number());
    }

    #[tokio::test]
    async fn test_team_stats_requires_ids() {
        let (_dir, router) = test_router(false);
        let (status, body) = send(router.clone(), get_request("/api/team-stats")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"status": "error", "message": "No teams selected"}));

        let (status, _) = send(router.clone(), get_request("/api/team-stats?team_ids=")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(router, get_request("/api/team-stats?team_ids=,")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_offense() {
        let (_dir, router) = test_router(false);
        let request = analyze_request(json!({
            "type": "score",
            "data": [
                {"team": "Hawks", "season": "A", "total_points": 10},
                {"team": "Hawks", "season": "B", "total_points": 30},
                {"team": "Hawks", "season": "C", "total_points": 20},
            ]
        }));
        let (status, body) = send(router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        let text = body["data"]["analysis"].as_str().unwrap();
        assert!(text.contains("Average points: 20.0"));
        assert!(text.contains("Best season: B, points 30"));
    }

    #[tokio::test]
    async fn test_analyze_defense_on_offense_data_warns() {
        let (_dir, router) = test_router(false);
        let request = analyze_request(json!({
            "type": "defense",
            "data": [{"team": "Hawks", "season": "2019-20", "total_points": 8400}]
        }));
        let (status, body) = send(router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "warning");
        assert!(body["data"]["analysis"]
            .as_str()
            .unwrap()
            .starts_with("Hawks analysis:"));
    }

    #[tokio::test]
    async fn test_analyze_unusable_data_is_error() {
        let (_dir, router) = test_router(false);
        let request = analyze_request(json!({"data": [{"team": "Hawks"}]}));
        let (status, body) = send(router.clone(), request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "error");

        let (status, body) = send(router, analyze_request(json!({"type": "defense"}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let (_dir, router) = test_router(false);
        let request = Request::builder()
            .uri("/api/teams")
            .header(header::ORIGIN, "http://localhost:8080")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("http://localhost:8080"))
        );
    }

    #[test]
    fn test_invalid_origin_is_rejected() {
        assert!(cors_layer(&["bad\norigin".to_string()]).is_err());
        assert!(cors_layer(&["*".to_string()]).is_ok());
    }
}
