use crate::engine::ProgressiveEngine;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

/// Shared handle to the one engine; the mutex serializes every write.
#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub engine: Arc<Mutex<ProgressiveEngine>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, engine: ProgressiveEngine) -> Self {
        Self {
            data_path,
            engine: Arc::new(Mutex::new(engine)),
        }
    }
}
