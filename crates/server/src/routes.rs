use std::time::Instant;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};
use utoipa::OpenApi;

use common::types::Health;

use crate::auth::{require_bearer_token, ServerState};
use crate::errors::ApiError;
use crate::openapi::ApiDoc;

pub mod attributes;
pub mod recipes;
pub mod user;

pub(crate) const REQUIRED: &str = "This field is required.";

/// Path ids that are not integers can never match a row.
pub(crate) fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>().map_err(|_| ApiError::NotFound)
}

/// Liveness plus a database ping.
#[utoipa::path(get, path = "/health", responses((status = 200, description = "OK"), (status = 503, description = "Database unavailable")), tag = "health")]
pub async fn health(State(state): State<ServerState>) -> (StatusCode, Json<Health>) {
    match state.db.ping().await {
        Ok(()) => (StatusCode::OK, Json(Health::ok())),
        Err(e) => {
            warn!(err = %e, "health check: database ping failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(Health::unavailable()))
        }
    }
}

async fn metrics() -> impl IntoResponse {
    common::metrics::encode_metrics()
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn track_metrics(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let start = Instant::now();
    let resp = next.run(req).await;
    common::metrics::observe_request(&method, resp.status().as_u16(), start.elapsed());
    resp
}

/// Build the full application router: public endpoints, media files and the
/// token-protected user/recipe API.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let media = ServeDir::new(&state.media.root);
    let upload_limit = state.media.max_upload_bytes;

    // Public routes
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/user/create", post(user::create_user))
        .route("/user/token", post(user::create_token))
        .nest_service(&state.media.url_prefix, media);

    // Token-protected routes
    let protected = Router::new()
        .route("/user/me", get(user::me).patch(user::update_me))
        .route("/recipe/tags", get(attributes::list_tags).post(attributes::create_tag))
        .route("/recipe/ingredients", get(attributes::list_ingredients).post(attributes::create_ingredient))
        .route("/recipe/recipes", get(recipes::list).post(recipes::create))
        .route(
            "/recipe/recipes/:id",
            get(recipes::retrieve)
                .put(recipes::replace)
                .patch(recipes::partial_update)
                .delete(recipes::destroy),
        )
        .route(
            "/recipe/recipes/:id/upload-image",
            post(recipes::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer_token));

    public
        .merge(protected)
        .with_state(state)
        .layer(middleware::from_fn(track_metrics))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
