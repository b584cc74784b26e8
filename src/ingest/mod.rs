//! Voice memo ingestion.
//!
//! ```text
//! audio file → hash (memo id) → Whisper → transcript → extraction
//! ```

pub mod transcriber;

use std::path::Path;

use sha2::{Digest, Sha256};

pub use transcriber::{transcribe, TranscriptResult};

/// SHA256 of file content, first 12 hex chars
pub async fn compute_file_hash(path: &Path) -> Result<String, std::io::Error> {
    let content = tokio::fs::read(path).await?;
    let digest = Sha256::digest(&content);
    Ok(hex::encode(&digest[..6]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_hash_is_stable_and_short() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a.m4a");
        let b = temp.path().join("b.m4a");
        tokio::fs::write(&a, b"fake audio content").await.unwrap();
        tokio::fs::write(&b, b"fake audio content").await.unwrap();

        let hash_a = compute_file_hash(&a).await.unwrap();
        assert_eq!(hash_a.len(), 12);
        assert_eq!(hash_a, compute_file_hash(&b).await.unwrap());
    }
}
