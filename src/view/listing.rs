//! Fetching and reconciling directory listings.

use tracing::debug;

use super::{Banner, DirectoryView, Redirect, ROOT_DIRECTORY_NAME};
use crate::api::DirectoryListing;
use crate::error::DriveError;

impl DirectoryView {
    /// Navigate to a directory and fetch its listing.
    ///
    /// Clears the selection, menus, dialogs and banner before fetching. The
    /// previous directory's rows stay up until the fetch resolves; a failed
    /// load keeps them next to the failure banner (stale-but-safe). An
    /// in-flight upload is kept; it belongs to the session, not the screen.
    ///
    /// # Arguments
    ///
    /// * `dir_id` - Directory to open, or `None` for the drive root
    pub async fn load_directory(&mut self, dir_id: Option<&str>) {
        self.set_location(dir_id);
        self.reload().await;
    }

    /// Navigate to the drive root and fetch its listing.
    pub async fn load_root(&mut self) {
        self.load_directory(None).await;
    }

    /// Refetch the current directory without touching view chrome.
    ///
    /// Called after every mutation; the server's listing is the only source
    /// of truth for what the directory contains.
    pub async fn reload(&mut self) {
        let dir_id = self.dir_id.clone();
        let result = self.api.get_directory(dir_id.as_deref()).await;
        match result {
            Ok(listing) => self.apply_listing(listing),
            Err(err) => self.apply_load_failure(err),
        }
    }

    pub(super) fn set_location(&mut self, dir_id: Option<&str>) {
        self.dir_id = dir_id.map(str::to_string);
        self.selection.clear();
        self.context_menu = None;
        self.banner = None;
        self.create_dialog = None;
        self.rename_dialog = None;
        self.confirm_delete = None;
        self.details = None;
    }

    /// Replace view rows with a fresh listing.
    ///
    /// The server returns both groups oldest first; the view shows newest
    /// first, so each group is reversed independently. Directories always
    /// precede files.
    pub(super) fn apply_listing(&mut self, listing: DirectoryListing) {
        debug!(
            "applying listing: {} directories, {} files",
            listing.directories.len(),
            listing.files.len()
        );
        self.directory_name = match self.dir_id {
            Some(_) => listing.name,
            None => ROOT_DIRECTORY_NAME.to_string(),
        };
        self.directories = listing.directories;
        self.directories.reverse();
        self.files = listing.files;
        self.files.reverse();
    }

    pub(super) fn apply_load_failure(&mut self, err: DriveError) {
        if err.is_unauthorized() {
            debug!("listing fetch rejected with 401, redirecting to login");
            self.redirect = Some(Redirect::Login);
            return;
        }
        let message = match err.api() {
            Some(api) => api.message.clone(),
            None => err.to_string(),
        };
        self.banner = Some(Banner::persistent(message));
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{dir, file, view};
    use super::*;
    use crate::api::ApiError;
    use crate::view::ViewBranch;

    fn listing(name: &str, dirs: Vec<(&str, &str)>, files: Vec<(&str, &str)>) -> DirectoryListing {
        DirectoryListing {
            id: None,
            name: name.to_string(),
            directories: dirs.into_iter().map(|(i, n)| dir(i, n)).collect(),
            files: files.into_iter().map(|(i, n)| file(i, n)).collect(),
        }
    }

    #[test]
    fn test_newest_entries_listed_first() {
        let mut view = view();
        view.set_location(Some("d9"));
        view.apply_listing(listing(
            "Docs",
            vec![("d1", "Old"), ("d2", "New")],
            vec![("f1", "a.txt"), ("f2", "b.txt")],
        ));

        assert_eq!(view.directory_name(), "Docs");
        let entries = view.entries();
        let names: Vec<String> = entries.iter().map(|e| e.name().to_string()).collect();
        assert_eq!(names, ["New", "Old", "b.txt", "a.txt"]);
    }

    #[test]
    fn test_refetched_listing_replaces_rows() {
        let mut view = view();
        view.apply_listing(listing("Docs", vec![("d1", "Old")], vec![("f1", "a.txt")]));
        view.apply_listing(listing("Docs", vec![], vec![("f1", "a.txt"), ("f2", "b.txt")]));

        let names: Vec<String> = view.entries().iter().map(|e| e.name().to_string()).collect();
        assert_eq!(names, ["b.txt", "a.txt"]);
    }

    #[test]
    fn test_root_listing_uses_drive_title() {
        let mut view = view();
        // The root keeps the drive title no matter what the listing says.
        view.apply_listing(listing("root", vec![], vec![("f1", "a.txt")]));
        assert_eq!(view.directory_name(), ROOT_DIRECTORY_NAME);
    }

    #[test]
    fn test_unauthorized_load_redirects_without_banner() {
        let mut view = view();
        view.apply_load_failure(DriveError::Api(ApiError::new(401, "Unauthorized")));

        assert_eq!(view.take_redirect(), Some(Redirect::Login));
        assert!(view.banner().is_none());
    }

    #[test]
    fn test_failed_load_shows_server_message() {
        let mut view = view();
        view.apply_load_failure(DriveError::Api(ApiError::new(404, "Directory not found")));

        let banner = view.banner().unwrap();
        assert_eq!(banner.message, "Directory not found");
        assert!(banner.auto_dismiss.is_none());
        assert_eq!(view.branch(), ViewBranch::NotFound);
    }

    #[test]
    fn test_failed_load_without_api_error_uses_error_text() {
        let mut view = view();
        view.apply_load_failure(DriveError::Custom("connection refused".to_string()));

        assert_eq!(view.banner().unwrap().message, "connection refused");
    }

    #[test]
    fn test_navigation_resets_chrome_but_keeps_rows() {
        let mut view = view();
        view.apply_listing(listing("Docs", vec![("d1", "Old")], vec![("f1", "a.txt")]));
        view.selection.insert("f1".to_string());
        view.context_menu = Some("f1".to_string());
        view.banner = Some(Banner::persistent("Rename failed"));

        view.set_location(Some("d1"));

        assert_eq!(view.dir_id(), Some("d1"));
        assert_eq!(view.entries().len(), 2);
        assert!(view.selection.is_empty());
        assert!(view.context_menu.is_none());
        assert!(view.banner().is_none());
    }

    #[test]
    fn test_failed_navigation_keeps_prior_listing() {
        let mut view = view();
        view.apply_listing(listing("Docs", vec![], vec![("f1", "a.txt")]));

        view.set_location(Some("missing"));
        view.apply_load_failure(DriveError::Api(ApiError::new(404, "Directory not found")));

        let names: Vec<String> = view.entries().iter().map(|e| e.name().to_string()).collect();
        assert_eq!(names, ["a.txt"]);
        assert_eq!(view.branch(), ViewBranch::Populated);
        assert!(view.actions_disabled());
        assert_eq!(view.banner().unwrap().message, "Directory not found");
    }
}
