use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post, put}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route(
            "/api/days/:date",
            get(handlers::get_day).put(handlers::put_day).delete(handlers::delete_day),
        )
        .route("/api/days/:date/display", get(handlers::get_display))
        .route("/api/history", get(handlers::get_history))
        .route("/api/sell-in", get(handlers::get_total_sell_in))
        .route("/api/sell-in/:year/:month", get(handlers::get_monthly_sell_in))
        .route("/api/config", get(handlers::get_config).patch(handlers::patch_config))
        .route("/api/metrics", get(handlers::get_metrics).delete(handlers::reset_metrics))
        .route("/api/state", put(handlers::import_state).get(handlers::export_state))
        .route("/api/calendar-entries", post(handlers::load_calendar_entries))
        .with_state(state)
}
