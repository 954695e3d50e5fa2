//! Raw transfers to signed destinations.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future;
use futures::stream::{self, Stream};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, StatusCode};
use tracing::{debug, warn};

use crate::error::{DriveError, Result};
use crate::http::HttpClient;
use crate::progress::{ProgressCallback, TransferProgress};

/// Chunk size for the streamed request body.
const TRANSFER_CHUNK_SIZE: usize = 256 * 1024;

/// Upload raw bytes to a signed destination URL.
///
/// The body streams out in chunks; before each chunk is handed to the
/// transport the callback receives the cumulative progress and can return
/// `false` to abort the request mid-flight. The destination signals success
/// with HTTP 200 exactly; any other status is a transfer failure.
pub async fn put_to_signed_url(
    http: &HttpClient,
    url: &str,
    data: Vec<u8>,
    content_type: &str,
    filename: &str,
    callback: ProgressCallback,
) -> Result<()> {
    let total = data.len() as u64;
    let cancelled = Arc::new(AtomicBool::new(false));

    debug!("PUT {} ({} bytes)", url, total);

    let body_stream = progress_stream(
        data,
        TRANSFER_CHUNK_SIZE,
        filename.to_string(),
        callback,
        cancelled.clone(),
    );

    let request = http
        .raw()
        .put(url)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, total)
        .body(Body::wrap_stream(body_stream));

    let response = match request.send().await {
        Ok(response) => response,
        Err(err) => {
            if cancelled.load(Ordering::SeqCst) {
                return Err(DriveError::Cancelled);
            }
            return Err(DriveError::RequestError(err));
        }
    };

    let status = response.status();
    if status != StatusCode::OK {
        warn!("signed transfer rejected with status {}", status);
        return Err(DriveError::TransferFailed(status.as_u16()));
    }

    Ok(())
}

/// Chunk `data` into a body stream that reports cumulative progress and
/// turns a `false` callback return into a request abort.
///
/// Chunks are carved off the owned buffer as the transport asks for them,
/// so the file is never held in memory twice. An abort ends the stream.
fn progress_stream(
    data: Vec<u8>,
    chunk_size: usize,
    filename: String,
    mut callback: ProgressCallback,
    cancelled: Arc<AtomicBool>,
) -> impl Stream<Item = io::Result<Vec<u8>>> + Send {
    let total = data.len() as u64;

    stream::unfold((data, 0u64), move |(mut remaining, sent)| {
        let step = if remaining.is_empty() {
            None
        } else {
            let tail = remaining.split_off(chunk_size.min(remaining.len()));
            let chunk = remaining;
            let sent = sent + chunk.len() as u64;
            let progress = TransferProgress::new(sent, total, filename.clone());
            if callback(&progress) {
                Some((Ok(chunk), (tail, sent)))
            } else {
                cancelled.store(true, Ordering::SeqCst);
                let err = io::Error::new(io::ErrorKind::Interrupted, "transfer cancelled");
                Some((Err(err), (Vec::new(), sent)))
            }
        };
        future::ready(step)
    })
}
