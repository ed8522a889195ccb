use std::path::{Path, PathBuf};

pub fn snapshot_file_name(millis: i64) -> String {
    format!("snapshot_{millis}.jpg")
}

/// Writes a captured snapshot into `dir`, creating it when missing.
pub async fn save_snapshot(dir: &Path, bytes: &[u8], millis: i64) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(snapshot_file_name(millis));
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}
