use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{change_password, delete_me, get_me, update_me, upload_avatar};

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me).put(update_me).delete(delete_me))
        .route("/me/password", put(change_password))
        .route("/me/avatar", post(upload_avatar))
}
