//! Part decoding: gunzip, then parse a JSON array of records.
//!
//! Decompression runs on the async decoder and yields to the scheduler
//! every few buffers, so a multi-hundred-megabyte part does not starve
//! other requests. JSON parsing is CPU bound and runs on the blocking pool.

use async_compression::tokio::bufread::GzipDecoder;
use bytes::Bytes;
use tokio::io::AsyncReadExt;

use super::types::FoodRecord;
use crate::error::DatasetError;

const READ_BUFFER_BYTES: usize = 64 * 1024;
const READS_PER_YIELD: usize = 16;
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub async fn gunzip(compressed: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzipDecoder::new(compressed);
    decoder.multiple_members(true);

    let mut out = Vec::with_capacity(compressed.len().saturating_mul(4));
    let mut buf = vec![0u8; READ_BUFFER_BYTES];
    let mut reads = 0usize;

    loop {
        let n = decoder.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        out.extend_from_slice(&buf[..n]);

        reads += 1;
        if reads % READS_PER_YIELD == 0 {
            tokio::task::yield_now().await;
        }
    }

    Ok(out)
}

pub fn parse_records(json: &[u8]) -> Result<Vec<FoodRecord>, serde_json::Error> {
    let json = json.strip_prefix(UTF8_BOM).unwrap_or(json);
    serde_json::from_slice(json)
}

/// Decodes one gzip JSON part. Any failure is reported as
/// [`DatasetError::DatasetCorrupt`] naming the part.
pub async fn decode_part(path: &str, compressed: Bytes) -> Result<Vec<FoodRecord>, DatasetError> {
    let corrupt = |reason: String| DatasetError::DatasetCorrupt {
        path: path.to_string(),
        reason,
    };

    let json = gunzip(&compressed)
        .await
        .map_err(|e| corrupt(format!("invalid gzip: {e}")))?;
    drop(compressed);

    tokio::task::spawn_blocking(move || parse_records(&json))
        .await
        .map_err(|e| DatasetError::Internal(format!("decode task failed: {e}")))?
        .map_err(|e| corrupt(format!("invalid JSON: {e}")))
}
