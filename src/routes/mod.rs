pub mod category;
pub mod guest;
pub mod invitation;
pub mod rsvp;
pub mod session;

use axum::{
    Json, Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    middleware::{log_errors, session_middleware},
};

pub async fn healthcheck() -> impl IntoResponse {
    (StatusCode::OK, Json("OK"))
}

/// 组装全部路由，CORS 由调用方按编译模式决定
pub fn create_router(state: AppState) -> Router {
    // 公开路由
    let public_routes = Router::new()
        .route("/healthcheck", get(healthcheck))
        .route("/sessions", post(session::create_session))
        .route("/p_rsvps", post(guest::create_rsvp))
        .route("/p_rsvps/{id}", get(guest::get_rsvp));

    // 需要登录的管理路由
    let protected_routes = Router::new()
        .route("/sessions", delete(session::destroy_session))
        .route(
            "/categories",
            post(category::create_category).get(category::list_categories),
        )
        .route(
            "/categories/{id}",
            put(category::update_category).delete(category::delete_category),
        )
        .route("/send_invitation", post(invitation::send_invitation))
        .route(
            "/invitations",
            post(invitation::create_invitation).get(invitation::list_invitations),
        )
        .route(
            "/invitations/{id}",
            put(invitation::update_invitation).delete(invitation::delete_invitation),
        )
        .route("/rsvps", post(rsvp::create_rsvp).get(rsvp::list_rsvps))
        .route(
            "/rsvps/{id}",
            put(rsvp::update_rsvp).delete(rsvp::delete_rsvp),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    let api = Router::new().merge(public_routes).merge(protected_routes);

    let base_uri = state.config.api_base_uri.trim_end_matches('/');
    let router = if base_uri.is_empty() {
        Router::new().merge(api)
    } else {
        Router::new().nest(base_uri, api)
    };

    // 静态资源，其余未匹配的路径交给前端路由
    router
        .nest_service("/static", ServeDir::new("static"))
        .fallback_service(ServeFile::new("index.html"))
        .layer(axum::middleware::from_fn(log_errors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
