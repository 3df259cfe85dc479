use crate::errors::AppError;
use crate::models::ProgressiveStoreSnapshot;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::error;

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/state.json"))
}

pub async fn load_snapshot(path: &Path) -> ProgressiveStoreSnapshot {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                error!("failed to parse state file: {err}");
                ProgressiveStoreSnapshot::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => ProgressiveStoreSnapshot::default(),
        Err(err) => {
            error!("failed to read state file: {err}");
            ProgressiveStoreSnapshot::default()
        }
    }
}

pub async fn persist_snapshot(path: &Path, snapshot: &ProgressiveStoreSnapshot) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(snapshot).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ProgressiveEngine;
    use crate::models::ProductObservation;
    use crate::CanonicalDate;

    #[tokio::test]
    async fn missing_file_loads_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = load_snapshot(&dir.path().join("absent.json")).await;
        assert!(snapshot.records.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, b"{not json").await.unwrap();
        assert!(load_snapshot(&path).await.records.is_empty());
    }

    #[tokio::test]
    async fn persisted_snapshot_restores_engine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let date = CanonicalDate::from_ymd(2025, 7, 30).unwrap();

        let mut engine = ProgressiveEngine::default();
        engine
            .update_and_recalculate(date, vec![ProductObservation::new("A", 31.0, 0.0, 2.0, 3.0)])
            .unwrap();
        persist_snapshot(&path, &engine.export_state()).await.unwrap();

        let mut restored = ProgressiveEngine::default();
        restored.import_state(load_snapshot(&path).await).unwrap();
        assert_eq!(restored.get_record(date), engine.get_record(date));
        assert_eq!(restored.get_total_sell_in(None), 6.0);
    }
}
