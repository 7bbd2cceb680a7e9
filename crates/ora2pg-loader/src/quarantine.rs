//! Failed-batch persistence: batches that fail to encode or copy get
//! written out as their own CSV file instead of being dropped.

use blake2::digest::{Update, VariableOutput};
use blake2::Blake2bVar;
use std::path::PathBuf;

/// Ten-character hex digest of `(error_repr || table_name || batch_size)`,
/// used to keep repeated quarantine files for the same table from
/// colliding.
pub fn short_hash(error_repr: &str, table_name: &str, batch_size: usize) -> String {
    let mut hasher = Blake2bVar::new(5).expect("5-byte blake2b output is valid");
    hasher.update(error_repr.as_bytes());
    hasher.update(table_name.as_bytes());
    hasher.update(batch_size.to_string().as_bytes());
    let mut digest = [0u8; 5];
    hasher.finalize_variable(&mut digest).expect("digest buffer matches output size");
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

pub fn quarantine_path(out_dir: &std::path::Path, table_name: &str, error_repr: &str, batch_size: usize) -> PathBuf {
    let hash = short_hash(error_repr, table_name, batch_size);
    out_dir.join(format!("badbatch_{table_name}_{hash}.csv"))
}

/// Writes a failed batch's already-encoded CSV bytes to its quarantine
/// file. Quarantine failures are logged and swallowed -- they never abort
/// the table.
pub async fn write_quarantine(path: &std::path::Path, payload: &[u8]) {
    if let Some(parent) = path.parent() {
        if let Err(err) = tokio::fs::create_dir_all(parent).await {
            tracing::warn!(path = %path.display(), %err, "failed to create quarantine directory");
            return;
        }
    }
    if let Err(err) = tokio::fs::write(path, payload).await {
        tracing::warn!(path = %path.display(), %err, "failed to write quarantine file");
    }
}
