use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/reports", get(handlers::reports_view))
        .route("/report", get(handlers::report_form).post(handlers::submit_report))
        .route("/traffic", get(handlers::traffic_form).post(handlers::check_traffic))
        .route("/subscribe", get(handlers::subscribe_form).post(handlers::subscribe))
        .route("/login", get(handlers::login_form).post(handlers::login))
        .route("/register", get(handlers::register_form).post(handlers::register))
        .route("/logout", post(handlers::logout))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
