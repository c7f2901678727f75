use axum::{Router, routing::post};

use crate::state::AppState;

use super::controller::upload_file;

pub fn init_files_router() -> Router<AppState> {
    Router::new().route("/upload", post(upload_file))
}
