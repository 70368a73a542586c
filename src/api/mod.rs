// HTTP and WebSocket surface over the match consoles

mod handlers;
mod live;
pub mod types;

pub use live::{FrameSocket, LiveError, LiveFeed, LiveFrame, SnapshotSource};

use axum::{
    http::Method,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::shared::AppState;

/// Build the axum router (separated for testing)
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/matches/:match_id/state", get(handlers::get_state))
        .route("/matches/:match_id/stats", get(handlers::get_stats))
        .route("/matches/:match_id/events", post(handlers::add_event))
        .route(
            "/matches/:match_id/events/:event_id",
            delete(handlers::delete_event),
        )
        .route("/matches/:match_id/clock/toggle", post(handlers::toggle_clock))
        .route("/matches/:match_id/clock/reset", post(handlers::reset_clock))
        .route("/matches/:match_id/clock/minutes", post(handlers::edit_minutes))
        .route("/matches/:match_id/clock/half", post(handlers::set_half))
        .route("/matches/:match_id/possession", post(handlers::set_possession))
        .route("/matches/:match_id/video", put(handlers::report_playhead))
        .route(
            "/matches/:match_id/video/seek/:event_id",
            post(handlers::seek_to_event),
        )
        .route("/matches/:match_id/leave", post(handlers::leave))
        .route("/matches/:match_id/live", get(live::live_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
