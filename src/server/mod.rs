mod api;
mod error;
mod state;
mod types;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use self::state::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::predict_handler,
        api::upload_handler,
        api::all_images_handler,
        api::labels_summary_handler,
    ),
    components(schemas(types::PredictForm, types::UploadForm,),)
)]
pub struct ApiDoc;

/// 构建API服务器
pub fn create_app(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    Router::new()
        .route("/predict/", post(api::predict_handler))
        .route("/upload/", post(api::upload_handler))
        .route("/AllImages/", get(api::all_images_handler))
        .route("/LabelsSummary/", get(api::labels_summary_handler))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::disable())
        // 上传限制：50M
        .layer(RequestBodyLimitLayer::new(1024 * 1024 * 50))
        .layer(cors)
        .with_state(state)
}
