use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers;
use crate::api::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    // 认证路由，密码哈希吃 CPU，限制并发
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .layer(ConcurrencyLimitLayer::new(8));

    Router::new()
        .merge(auth_routes)
        // 任务路由
        .route("/task_list", get(handlers::task::task_list))
        .route("/add_task", post(handlers::task::add_task))
        .route("/task/:task_id", get(handlers::task::get_task))
        .route("/update_task", post(handlers::task::update_task))
        .route("/delete_task", post(handlers::task::delete_task))
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
