//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers); adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/templates", get(http::http_get_templates))
        .route("/api/v1/sessions", post(http::http_post_session))
        .route("/api/v1/sessions/:id", get(http::http_get_session).delete(http::http_delete_session))
        .route("/api/v1/sessions/:id/guess", post(http::http_post_guess))
        .route("/api/v1/sessions/:id/hint", post(http::http_post_hint))
        .route("/api/v1/sessions/:id/reveal", post(http::http_post_reveal))
        .route("/api/v1/sessions/:id/retry", post(http::http_post_retry))
        .route("/api/v1/sessions/:id/next", post(http::http_post_next))
        .route("/api/v1/sessions/:id/graph", get(http::http_get_graph))
        .route("/api/v1/levels", get(http::http_get_levels).post(http::http_post_level))
        .route("/api/v1/levels/:id", delete(http::http_delete_level))
        .route("/api/v1/progress/:player", get(http::http_get_progress))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn call(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = build_router(Arc::new(AppState::with_config(None)));
        let (status, json) = call(app, Request::get("/api/v1/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["ok"], true);
    }

    #[tokio::test]
    async fn custom_level_play_through_over_http() {
        let state = Arc::new(AppState::with_config(None));
        let app = build_router(state.clone());

        let (status, level) = call(
            app.clone(),
            post_json(
                "/api/v1/levels",
                serde_json::json!({
                    "title": "Epic Battle Stats",
                    "creator": "Ms. Rivera",
                    "scenarioType": "kills-deaths",
                    "story": "A player finished 100 rounds with 20 more kills than deaths.",
                    "xLabel": "Kills",
                    "yLabel": "Deaths",
                    "total": 100,
                    "diff": 20
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(level["solution"]["x"], 60.0);
        let level_id = level["id"].as_str().unwrap().to_string();

        let (_, session) = call(
            app.clone(),
            post_json("/api/v1/sessions", serde_json::json!({ "player": "ada", "customLevelId": level_id })),
        )
        .await;
        let sid = session["id"].as_str().unwrap().to_string();

        let guess_uri = format!("/api/v1/sessions/{}/guess", sid);
        let (_, miss) = call(app.clone(), post_json(&guess_uri, serde_json::json!({ "x": "50", "y": "50" }))).await;
        assert_eq!(miss["isCorrect"], false);
        assert_eq!(miss["feedbackTier"], "getting_warmer");

        let (_, hit) = call(app.clone(), post_json(&guess_uri, serde_json::json!({ "x": "60", "y": "40" }))).await;
        assert_eq!(hit["isCorrect"], true);
        assert_eq!(hit["earnedPoints"], 90);
        assert_eq!(hit["badgeUnlocked"], "quick-solver");

        let (status, _) = call(app.clone(), post_json(&guess_uri, serde_json::json!({ "x": "60", "y": "40" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, graph) = call(
            app.clone(),
            Request::get(format!("/api/v1/sessions/{}/graph?x=1&y=2", sid)).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(graph["sample"]["points"].as_array().unwrap().len(), 101);
        assert_eq!(graph["guessMarker"], serde_json::Value::Null);
        assert_eq!(graph["solutionMarker"]["y"], 40.0);
    }

    #[tokio::test]
    async fn malformed_guesses_still_count_as_attempts() {
        let state = Arc::new(AppState::with_config(None));
        let app = build_router(state.clone());
        let level = state
            .save_custom_level(&crate::domain::CustomLevelPayload {
                title: "Epic Battle Stats".into(),
                story: "A player finished 100 rounds with 20 more kills than deaths.".into(),
                x_label: "Kills".into(),
                y_label: "Deaths".into(),
                total: 100.0,
                diff: 20.0,
                ..Default::default()
            })
            .await
            .unwrap();

        let (_, session) = call(
            app.clone(),
            post_json("/api/v1/sessions", serde_json::json!({ "player": "ada", "customLevelId": level.id })),
        )
        .await;
        let sid = session["id"].as_str().unwrap().to_string();
        let guess_uri = format!("/api/v1/sessions/{}/guess", sid);

        let (status, missing) = call(app.clone(), post_json(&guess_uri, serde_json::json!({ "x": "5" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(missing["feedbackTier"], "invalid_input");
        assert_eq!(missing["feedback"], "Please enter numbers for both values!");
        assert_eq!(missing["attempts"], 1);

        let (status, numeric) = call(app.clone(), post_json(&guess_uri, serde_json::json!({ "x": 60, "y": 40 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(numeric["isCorrect"], true);
        assert_eq!(numeric["attempts"], 2);
    }

    #[tokio::test]
    async fn deleting_a_session_ends_it() {
        let app = build_router(Arc::new(AppState::with_config(None)));
        let (_, session) = call(app.clone(), post_json("/api/v1/sessions", serde_json::json!({ "player": "ada" }))).await;
        let uri = format!("/api/v1/sessions/{}", session["id"].as_str().unwrap());

        let (status, body) = call(app.clone(), Request::delete(uri.as_str()).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ended"], true);

        let (status, _) = call(app.clone(), Request::get(uri.as_str()).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(app, Request::delete(uri.as_str()).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn progress_reports_badge_count() {
        let app = build_router(Arc::new(AppState::with_config(None)));
        let (status, body) = call(app, Request::get("/api/v1/progress/ada").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["player"], "ada");
        assert_eq!(body["badgeCount"], 0);
    }

    #[tokio::test]
    async fn errors_map_to_status_codes() {
        let app = build_router(Arc::new(AppState::with_config(None)));

        let (status, body) = call(app.clone(), Request::get("/api/v1/sessions/nope").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Unknown sessionId: nope");

        let (status, _) = call(
            app.clone(),
            post_json(
                "/api/v1/levels",
                serde_json::json!({ "title": "", "story": "s", "xLabel": "a", "yLabel": "b", "total": 1, "diff": 0 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = call(
            app,
            Request::delete("/api/v1/levels/missing").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
