//! Upload orchestration for the view.
//!
//! The view enforces the one-upload-at-a-time rule and owns the placeholder
//! row, but it never holds itself across the transfer: [`start_upload`]
//! hands back an [`UploadTask`] the host drives on its own, and
//! [`finish_upload`] folds the terminal outcome back in. That keeps the
//! view usable for rendering and cancellation while bytes move.
//!
//! [`start_upload`]: DirectoryView::start_upload
//! [`finish_upload`]: DirectoryView::finish_upload

use tracing::{debug, warn};

use super::{Banner, DirectoryView, Redirect, UPLOAD_NOTICE_DISMISS};
use crate::error::{DriveError, Result};
use crate::upload::{UploadOutcome, UploadSource, UploadTask};

impl DirectoryView {
    /// Begin uploading a file into the current directory.
    ///
    /// If an upload is already in flight, a busy notice is shown and the
    /// active session is left untouched. Otherwise the upload is announced
    /// to the backend; once that succeeds the placeholder row appears and
    /// the returned task is ready to run:
    ///
    /// ```no_run
    /// # use drivelib::view::DirectoryView;
    /// # use drivelib::upload::UploadSource;
    /// # async fn example(view: &mut DirectoryView) -> drivelib::Result<()> {
    /// let source = UploadSource::from_path("report.pdf").await?;
    /// let task = view.start_upload(source).await?;
    /// let outcome = task.run().await;
    /// view.finish_upload(outcome).await;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// Initiation failures surface as a timed banner here; no placeholder
    /// ever exists for an upload the backend refused.
    pub async fn start_upload(&mut self, source: UploadSource) -> Result<UploadTask> {
        if self.actions_disabled() {
            debug!("rejecting upload of {}: directory not available", source.name);
            return Err(DriveError::Custom("Directory not found".to_string()));
        }
        if self.upload.is_some() {
            debug!("rejecting upload of {}: session already active", source.name);
            self.banner = Some(Banner::transient(
                DriveError::UploadInProgress.to_string(),
                UPLOAD_NOTICE_DISMISS,
            ));
            return Err(DriveError::UploadInProgress);
        }

        let dir_id = self.dir_id.clone();
        let result = UploadTask::initiate(self.api.clone(), source, dir_id.as_deref()).await;
        match result {
            Ok(task) => {
                self.upload = Some(task.session().clone());
                Ok(task)
            }
            Err(err) => {
                self.apply_initiate_failure(&err);
                Err(err)
            }
        }
    }

    /// Fold an upload's terminal outcome back into the view, then refetch.
    ///
    /// The refetch is unconditional: even a failed or cancelled upload may
    /// have left server-side state, and the listing is the only authority
    /// on what the directory now contains.
    pub async fn finish_upload(&mut self, outcome: UploadOutcome) {
        self.apply_upload_outcome(outcome);
        self.reload().await;
    }

    /// Ask the in-flight upload to stop, if `temp_id` names it.
    ///
    /// The placeholder stays on screen until the task observes the flag and
    /// reaches its terminal transition.
    pub fn cancel_upload(&mut self, temp_id: &str) {
        if let Some(session) = &self.upload {
            if session.temp_id == temp_id {
                debug!("cancelling upload {}", session.name);
                session.handle().cancel();
            }
        }
    }

    pub(super) fn apply_upload_outcome(&mut self, outcome: UploadOutcome) {
        self.upload = None;
        match outcome {
            UploadOutcome::Completed => {}
            UploadOutcome::Cancelled => {
                debug!("upload cancelled");
            }
            UploadOutcome::TransferFailed(DriveError::TransferFailed(status)) => {
                warn!("signed destination rejected upload with status {status}");
                self.banner = Some(Banner::transient(
                    "File upload failed!",
                    UPLOAD_NOTICE_DISMISS,
                ));
            }
            UploadOutcome::TransferFailed(err) => {
                warn!("upload transfer failed: {err}");
                self.banner = Some(Banner::transient(
                    "Upload failed. Please try again.",
                    UPLOAD_NOTICE_DISMISS,
                ));
            }
            UploadOutcome::FinalizeFailed(err) => {
                if err.is_unauthorized() {
                    self.redirect = Some(Redirect::Login);
                    return;
                }
                warn!("upload completion rejected: {err}");
                let message = match err.api() {
                    Some(api) if !api.message.is_empty() => api.message.clone(),
                    _ => "Upload failed".to_string(),
                };
                self.banner = Some(Banner::transient(message, UPLOAD_NOTICE_DISMISS));
            }
        }
    }

    fn apply_initiate_failure(&mut self, err: &DriveError) {
        if err.is_unauthorized() {
            self.redirect = Some(Redirect::Login);
            return;
        }
        let message = match err.api() {
            Some(api) if !api.message.is_empty() => api.message.clone(),
            _ => "Upload failed".to_string(),
        };
        self.banner = Some(Banner::transient(message, UPLOAD_NOTICE_DISMISS));
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{file, view};
    use super::*;
    use crate::api::{ApiError, DirectoryListing};
    use crate::upload::UploadSession;

    fn files_listing(files: Vec<(&str, &str)>) -> DirectoryListing {
        DirectoryListing {
            id: None,
            name: "root".to_string(),
            directories: Vec::new(),
            files: files.into_iter().map(|(i, n)| file(i, n)).collect(),
        }
    }

    #[test]
    fn test_placeholder_prefixes_rows_until_server_lists_the_file() {
        let mut view = view();
        view.apply_listing(files_listing(vec![("f1", "a.txt")]));
        view.upload = Some(UploadSession::new("b.txt", 8));

        let names: Vec<String> = view.entries().iter().map(|e| e.name().to_string()).collect();
        assert_eq!(names, ["b.txt", "a.txt"]);
        assert!(view.entries()[0].is_upload());

        // After completion the refetched listing carries the real row.
        view.apply_upload_outcome(UploadOutcome::Completed);
        view.apply_listing(files_listing(vec![("f1", "a.txt"), ("f2", "b.txt")]));

        let names: Vec<String> = view.entries().iter().map(|e| e.name().to_string()).collect();
        assert_eq!(names, ["b.txt", "a.txt"]);
        assert!(view.entries().iter().all(|e| !e.is_upload()));
    }

    #[tokio::test]
    async fn test_second_upload_rejected_while_first_active() {
        let mut view = view();
        let active = UploadSession::new("a.txt", 4);
        let active_id = active.temp_id.clone();
        view.upload = Some(active);

        let result = view
            .start_upload(crate::upload::UploadSource::from_bytes(vec![1], "b.txt"))
            .await;

        assert!(matches!(result, Err(DriveError::UploadInProgress)));
        let banner = view.banner().unwrap();
        assert_eq!(
            banner.message,
            "An upload is already in progress. Please wait."
        );
        assert_eq!(banner.auto_dismiss, Some(UPLOAD_NOTICE_DISMISS));
        // The active session is untouched.
        assert_eq!(view.upload_session().unwrap().temp_id, active_id);
        assert!(!view.upload_session().unwrap().progress().is_cancelled());
    }

    #[tokio::test]
    async fn test_upload_rejected_while_directory_not_found() {
        let mut view = view();
        view.banner = Some(Banner::persistent("Directory not found"));

        let result = view
            .start_upload(crate::upload::UploadSource::from_bytes(vec![1], "b.txt"))
            .await;

        assert!(result.is_err());
        assert!(view.upload_session().is_none());
        // The not-found banner stays; no upload notice replaces it.
        assert_eq!(view.banner().unwrap().message, "Directory not found");
    }

    #[test]
    fn test_completed_upload_clears_placeholder_without_banner() {
        let mut view = view();
        view.upload = Some(UploadSession::new("a.txt", 4));
        assert!(view.entries().first().is_some_and(|e| e.is_upload()));

        view.apply_upload_outcome(UploadOutcome::Completed);

        assert!(view.upload_session().is_none());
        assert!(view.entries().is_empty());
        assert!(view.banner().is_none());
    }

    #[test]
    fn test_cancelled_upload_clears_placeholder_without_banner() {
        let mut view = view();
        view.upload = Some(UploadSession::new("a.txt", 4));

        view.apply_upload_outcome(UploadOutcome::Cancelled);

        assert!(view.upload_session().is_none());
        assert!(view.banner().is_none());
    }

    #[test]
    fn test_rejected_transfer_shows_fixed_message() {
        let mut view = view();
        view.upload = Some(UploadSession::new("a.txt", 4));

        view.apply_upload_outcome(UploadOutcome::TransferFailed(DriveError::TransferFailed(
            403,
        )));

        let banner = view.banner().unwrap();
        assert_eq!(banner.message, "File upload failed!");
        assert_eq!(banner.auto_dismiss, Some(UPLOAD_NOTICE_DISMISS));
        assert!(view.upload_session().is_none());
    }

    #[test]
    fn test_transfer_network_failure_shows_retry_message() {
        let mut view = view();
        view.upload = Some(UploadSession::new("a.txt", 4));

        view.apply_upload_outcome(UploadOutcome::TransferFailed(DriveError::Custom(
            "connection reset".to_string(),
        )));

        assert_eq!(
            view.banner().unwrap().message,
            "Upload failed. Please try again."
        );
    }

    #[test]
    fn test_finalize_failure_prefers_server_message() {
        let mut view = view();
        view.upload = Some(UploadSession::new("a.txt", 4));

        view.apply_upload_outcome(UploadOutcome::FinalizeFailed(DriveError::Api(
            ApiError::new(507, "Storage quota exceeded"),
        )));

        let banner = view.banner().unwrap();
        assert_eq!(banner.message, "Storage quota exceeded");
        assert_eq!(banner.auto_dismiss, Some(UPLOAD_NOTICE_DISMISS));
    }

    #[test]
    fn test_finalize_failure_fallback_message() {
        let mut view = view();
        view.upload = Some(UploadSession::new("a.txt", 4));

        view.apply_upload_outcome(UploadOutcome::FinalizeFailed(DriveError::Custom(
            "connection reset".to_string(),
        )));

        assert_eq!(view.banner().unwrap().message, "Upload failed");
    }

    #[test]
    fn test_finalize_unauthorized_redirects() {
        let mut view = view();
        view.upload = Some(UploadSession::new("a.txt", 4));

        view.apply_upload_outcome(UploadOutcome::FinalizeFailed(DriveError::Api(
            ApiError::new(401, "Unauthorized"),
        )));

        assert_eq!(view.take_redirect(), Some(Redirect::Login));
        assert!(view.banner().is_none());
    }

    #[test]
    fn test_initiate_failure_uses_server_message() {
        let mut view = view();
        view.apply_initiate_failure(&DriveError::Api(ApiError::new(413, "File too large")));

        let banner = view.banner().unwrap();
        assert_eq!(banner.message, "File too large");
        assert_eq!(banner.auto_dismiss, Some(UPLOAD_NOTICE_DISMISS));
        assert!(view.upload_session().is_none());
    }

    #[test]
    fn test_cancel_upload_matches_temp_id() {
        let mut view = view();
        let session = UploadSession::new("a.txt", 4);
        let temp_id = session.temp_id.clone();
        view.upload = Some(session);

        view.cancel_upload("temp-someone-else");
        assert!(!view.upload_session().unwrap().progress().is_cancelled());

        view.cancel_upload(&temp_id);
        assert!(view.upload_session().unwrap().progress().is_cancelled());
        // Placeholder survives until the task reports its outcome.
        assert!(view.upload_session().is_some());
    }
}
