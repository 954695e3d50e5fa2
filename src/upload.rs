//! Upload session lifecycle.
//!
//! One file at a time: initiate with the backend, stream the bytes to the
//! signed destination, then confirm. Every path out of the state machine
//! destroys the session.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info};

use crate::api::{ApiClient, UploadTicket};
use crate::error::{DriveError, Result};
use crate::progress::{ProgressCallback, TransferProgress};
use crate::transfer;

/// Phase of an active upload session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    /// Waiting for the backend to hand out a signed destination
    Initiating,
    /// Streaming bytes to the signed destination
    Transferring,
    /// Confirming the finished transfer with the backend
    Finalizing,
}

impl UploadPhase {
    fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(UploadPhase::Initiating),
            1 => Some(UploadPhase::Transferring),
            2 => Some(UploadPhase::Finalizing),
            _ => None,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            UploadPhase::Initiating => 0,
            UploadPhase::Transferring => 1,
            UploadPhase::Finalizing => 2,
        }
    }
}

/// Shared progress state for one upload session.
///
/// The driving task writes through the wired callback; the view reads
/// snapshots for the placeholder row. Progress is monotonic and reports
/// exactly 100 percent only once the upload has been confirmed.
#[derive(Debug)]
pub struct UploadProgress {
    done: AtomicU64,
    total: u64,
    confirmed: AtomicBool,
    cancelled: AtomicBool,
    phase: AtomicU8,
}

impl UploadProgress {
    fn new(total: u64) -> Self {
        Self {
            done: AtomicU64::new(0),
            total,
            confirmed: AtomicBool::new(false),
            cancelled: AtomicBool::new(false),
            phase: AtomicU8::new(UploadPhase::Initiating.as_u8()),
        }
    }

    /// Bytes handed to the transport so far.
    pub fn done(&self) -> u64 {
        self.done.load(Ordering::SeqCst)
    }

    /// Total bytes in this upload.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Display percentage. Saturates at 99 until success is confirmed, so a
    /// full bar is only ever shown for an upload the destination accepted.
    pub fn percent(&self) -> f64 {
        if self.confirmed.load(Ordering::SeqCst) {
            return 100.0;
        }
        if self.total == 0 {
            return 0.0;
        }
        let pct = (self.done() as f64 / self.total as f64) * 100.0;
        pct.min(99.0)
    }

    /// Current phase.
    pub fn phase(&self) -> UploadPhase {
        UploadPhase::from_u8(self.phase.load(Ordering::SeqCst)).unwrap_or(UploadPhase::Initiating)
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn record(&self, done: u64) {
        // fetch_max keeps the reported value monotonic even if the transport
        // replays a chunk
        self.done.fetch_max(done, Ordering::SeqCst);
    }

    fn confirm(&self) {
        self.done.store(self.total, Ordering::SeqCst);
        self.confirmed.store(true, Ordering::SeqCst);
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn set_phase(&self, phase: UploadPhase) {
        self.phase.store(phase.as_u8(), Ordering::SeqCst);
    }

    /// The destination accepted every byte. Progress reads 100 from here on,
    /// while the completion call is still in flight.
    fn transfer_landed(&self) {
        self.confirm();
        self.set_phase(UploadPhase::Finalizing);
    }
}

/// An active upload session.
///
/// At most one exists at a time. It is created when a file is picked and
/// destroyed on every terminal transition (complete, failure, cancel).
#[derive(Debug, Clone)]
pub struct UploadSession {
    /// Placeholder id, prefixed so it can never collide with a server id
    pub temp_id: String,
    /// Name of the file being uploaded
    pub name: String,
    /// Total size in bytes
    pub size: u64,
    progress: Arc<UploadProgress>,
}

impl UploadSession {
    pub(crate) fn new(name: &str, size: u64) -> Self {
        Self {
            temp_id: make_temp_id(),
            name: name.to_string(),
            size,
            progress: Arc::new(UploadProgress::new(size)),
        }
    }

    /// Shared progress state.
    pub fn progress(&self) -> &UploadProgress {
        &self.progress
    }

    /// Display percentage for the placeholder row.
    pub fn percent(&self) -> f64 {
        self.progress.percent()
    }

    /// Current phase.
    pub fn phase(&self) -> UploadPhase {
        self.progress.phase()
    }

    /// Obtain a cancel/observe handle for this session.
    pub fn handle(&self) -> UploadHandle {
        UploadHandle {
            progress: self.progress.clone(),
        }
    }
}

/// Cancel and observe handle for an active upload.
///
/// Cancellation aborts the in-flight transfer; no server-side cleanup call
/// is made.
#[derive(Debug, Clone)]
pub struct UploadHandle {
    progress: Arc<UploadProgress>,
}

impl UploadHandle {
    /// Request cancellation. The wired callback observes the flag and tears
    /// down the request body on the next chunk.
    pub fn cancel(&self) {
        self.progress.cancel();
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.progress.is_cancelled()
    }

    /// Display percentage.
    pub fn percent(&self) -> f64 {
        self.progress.percent()
    }

    /// Current phase.
    pub fn phase(&self) -> UploadPhase {
        self.progress.phase()
    }
}

/// Terminal result of driving an upload session.
#[derive(Debug)]
pub enum UploadOutcome {
    /// Transfer confirmed and registered with the backend
    Completed,
    /// The signed-destination transfer failed
    TransferFailed(DriveError),
    /// The transfer landed but the completion call was rejected
    FinalizeFailed(DriveError),
    /// Cancelled through the handle
    Cancelled,
}

/// The file data for one upload.
#[derive(Debug, Clone)]
pub struct UploadSource {
    /// Name the file will carry on the server
    pub name: String,
    /// MIME type sent with the initiation request and the transfer
    pub content_type: String,
    /// File contents
    pub data: Vec<u8>,
}

impl UploadSource {
    /// Read an upload source from a local file.
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .ok_or_else(|| DriveError::Custom("Invalid file path".to_string()))?
            .to_string_lossy()
            .to_string();

        let data = tokio::fs::read(path)
            .await
            .map_err(|e| DriveError::Custom(format!("Failed to read file: {}", e)))?;

        Ok(Self::from_bytes(data, &name))
    }

    /// Build an upload source from in-memory bytes.
    ///
    /// The content type is guessed from the name's extension.
    pub fn from_bytes(data: Vec<u8>, name: &str) -> Self {
        let content_type = mime_guess::from_path(name).first_or_octet_stream().to_string();
        Self {
            name: name.to_string(),
            content_type,
            data,
        }
    }

    /// Size of the upload in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Drives one upload session from a signed destination to its terminal
/// transition.
///
/// The progress callback is wired exactly once, here at creation; it closes
/// over this session's progress cell only, so a stale session can never
/// receive updates.
pub struct UploadTask {
    api: ApiClient,
    session: UploadSession,
    ticket: UploadTicket,
    source: UploadSource,
    callback: ProgressCallback,
}

impl UploadTask {
    /// Announce the upload to the backend and obtain its signed destination.
    ///
    /// Quota and validation rejections surface here as an error, before any
    /// bytes move and before any placeholder exists.
    pub async fn initiate(
        api: ApiClient,
        source: UploadSource,
        parent_dir_id: Option<&str>,
    ) -> Result<Self> {
        let ticket = api
            .initiate_upload(&source.name, source.size(), &source.content_type, parent_dir_id)
            .await?;

        debug!("upload initiated: {} -> {}", source.name, ticket.file_id);

        let session = UploadSession::new(&source.name, source.size());
        let callback = wire_callback(session.progress.clone());

        Ok(Self {
            api,
            session,
            ticket,
            source,
            callback,
        })
    }

    /// The session this task drives, for placeholder display.
    pub fn session(&self) -> &UploadSession {
        &self.session
    }

    /// Obtain a cancel/observe handle.
    pub fn handle(&self) -> UploadHandle {
        self.session.handle()
    }

    /// Server id assigned to the pending file.
    pub fn file_id(&self) -> &str {
        &self.ticket.file_id
    }

    /// Stream the bytes to the signed destination, then confirm with the
    /// backend. Always reaches a terminal transition.
    ///
    /// A cancellation requested at any point before the completion call wins:
    /// the backend is never told to finalize an abandoned upload, even when
    /// the transfer itself went through.
    pub async fn run(self) -> UploadOutcome {
        let progress = self.session.progress.clone();
        progress.set_phase(UploadPhase::Transferring);

        if progress.is_cancelled() {
            return UploadOutcome::Cancelled;
        }

        let transferred = transfer::put_to_signed_url(
            self.api.http(),
            &self.ticket.upload_signed_url,
            self.source.data,
            &self.source.content_type,
            &self.source.name,
            self.callback,
        )
        .await;

        if let Some(outcome) = transfer_outcome(transferred, progress.is_cancelled()) {
            return outcome;
        }

        progress.transfer_landed();
        match self.api.complete_upload(&self.ticket.file_id).await {
            Ok(()) => {
                info!(
                    "upload complete: {} ({} bytes, id {})",
                    self.session.name, self.session.size, self.ticket.file_id
                );
                UploadOutcome::Completed
            }
            Err(err) => UploadOutcome::FinalizeFailed(err),
        }
    }
}

/// Resolve a finished transfer into an early terminal outcome, or `None`
/// when finalization should proceed.
///
/// A cancel that lands after the last chunk was queued is still a cancel;
/// the 200 from the destination does not outrank it.
fn transfer_outcome(result: Result<()>, cancelled: bool) -> Option<UploadOutcome> {
    match result {
        Ok(()) if cancelled => Some(UploadOutcome::Cancelled),
        Ok(()) => None,
        Err(DriveError::Cancelled) => Some(UploadOutcome::Cancelled),
        Err(_) if cancelled => Some(UploadOutcome::Cancelled),
        Err(err) => Some(UploadOutcome::TransferFailed(err)),
    }
}

/// Build the one progress callback for a session.
fn wire_callback(progress: Arc<UploadProgress>) -> ProgressCallback {
    Box::new(move |report: &TransferProgress| {
        progress.record(report.done);
        !progress.is_cancelled()
    })
}

fn make_temp_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("temp-{}", millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_roundtrip() {
        for phase in [
            UploadPhase::Initiating,
            UploadPhase::Transferring,
            UploadPhase::Finalizing,
        ] {
            assert_eq!(UploadPhase::from_u8(phase.as_u8()), Some(phase));
        }
        assert_eq!(UploadPhase::from_u8(9), None);
    }

    #[test]
    fn test_temp_id_prefix() {
        let session = UploadSession::new("b.txt", 10);
        assert!(session.temp_id.starts_with("temp-"));
        assert_eq!(session.name, "b.txt");
        assert_eq!(session.size, 10);
        assert_eq!(session.phase(), UploadPhase::Initiating);
    }

    #[test]
    fn test_progress_monotonic_and_capped() {
        let progress = UploadProgress::new(100);
        assert_eq!(progress.percent(), 0.0);

        progress.record(50);
        assert_eq!(progress.done(), 50);
        assert_eq!(progress.percent(), 50.0);

        // A lower report never moves progress backwards.
        progress.record(30);
        assert_eq!(progress.done(), 50);

        // All bytes on the wire still isn't a confirmed upload.
        progress.record(100);
        assert_eq!(progress.percent(), 99.0);

        progress.confirm();
        assert_eq!(progress.percent(), 100.0);
    }

    #[test]
    fn test_zero_byte_upload_percent() {
        let progress = UploadProgress::new(0);
        assert_eq!(progress.percent(), 0.0);
        progress.confirm();
        assert_eq!(progress.percent(), 100.0);
    }

    #[test]
    fn test_cancel_through_handle() {
        let session = UploadSession::new("x.bin", 4);
        let handle = session.handle();
        assert!(!handle.is_cancelled());

        handle.cancel();
        assert!(session.progress().is_cancelled());
    }

    #[test]
    fn test_wired_callback_records_and_observes_cancel() {
        let session = UploadSession::new("x.bin", 10);
        let mut callback = wire_callback(session.progress.clone());

        assert!(callback(&TransferProgress::new(5, 10, "x.bin")));
        assert_eq!(session.progress().done(), 5);

        session.handle().cancel();
        assert!(!callback(&TransferProgress::new(8, 10, "x.bin")));
        // The report before the abort still lands; display stays below 100.
        assert_eq!(session.progress().done(), 8);
        assert!(session.percent() < 100.0);
    }

    #[test]
    fn test_cancel_wins_over_transfer_result() {
        // An accepted transfer must not reach the completion call once the
        // user has cancelled.
        assert!(matches!(
            transfer_outcome(Ok(()), true),
            Some(UploadOutcome::Cancelled)
        ));
        assert!(matches!(
            transfer_outcome(Err(DriveError::Custom("connection reset".to_string())), true),
            Some(UploadOutcome::Cancelled)
        ));
        assert!(matches!(
            transfer_outcome(Err(DriveError::Cancelled), false),
            Some(UploadOutcome::Cancelled)
        ));
    }

    #[test]
    fn test_transfer_outcome_without_cancel() {
        assert!(transfer_outcome(Ok(()), false).is_none());
        assert!(matches!(
            transfer_outcome(Err(DriveError::TransferFailed(500)), false),
            Some(UploadOutcome::TransferFailed(DriveError::TransferFailed(500)))
        ));
    }

    #[test]
    fn test_finalizing_reports_full_progress() {
        let session = UploadSession::new("a.bin", 10);
        session.progress().record(10);
        assert_eq!(session.percent(), 99.0);

        session.progress().transfer_landed();
        assert_eq!(session.percent(), 100.0);
        assert_eq!(session.phase(), UploadPhase::Finalizing);
    }

    #[test]
    fn test_source_content_type_guess() {
        let source = UploadSource::from_bytes(vec![1, 2, 3], "photo.jpg");
        assert_eq!(source.content_type, "image/jpeg");
        assert_eq!(source.size(), 3);

        let source = UploadSource::from_bytes(Vec::new(), "data.weird-ext");
        assert_eq!(source.content_type, "application/octet-stream");
    }
}
