pub mod adapter;
pub mod aggregate;
pub mod app;
pub mod cache;
pub mod clock;
pub mod date;
pub mod engine;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod query;
pub mod settings;
pub mod state;
pub mod storage;
pub mod store;
pub mod validate;

pub use app::router;
pub use date::CanonicalDate;
pub use engine::ProgressiveEngine;
pub use errors::EngineError;
pub use settings::Settings;
pub use state::AppState;
pub use storage::{load_snapshot, resolve_data_path};
