pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::contracts::handlers as contracts;
use crate::extraction::handlers as extraction;
use crate::recruitment::handlers as recruitment;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Generated PDFs are served straight from the output directory.
    let generated_files = ServeDir::new(state.renderer.output_dir());

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/extract", post(extraction::handle_extract))
        .route(
            "/contracts",
            post(contracts::handle_create).get(contracts::handle_list),
        )
        .route("/contracts/export.csv", get(contracts::handle_export_csv))
        .route("/contracts/:id", get(contracts::handle_get))
        .route("/recruitment/analyze", post(recruitment::handle_analyze))
        .nest_service("/files", generated_files)
        .with_state(state)
}
