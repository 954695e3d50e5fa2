//! Directory view state.
//!
//! The controller behind a drive browser screen. It owns the last fetched
//! listing, the optimistic upload placeholder, the selection set, dialog and
//! banner state, and it refetches the listing after every mutation. Rendering
//! and routing stay with the host: banners carry their dismiss window as
//! data, and navigation comes back as a [`Redirect`] or [`RowOutcome`] value
//! instead of being performed here.

mod listing;
mod mutations;
mod selection;
mod upload_flow;

use std::collections::HashSet;
use std::time::Duration;

use crate::api::{ApiClient, DirectoryRef, FileRef};
use crate::listing::{build_entries, EntryKind, ListingEntry};
use crate::upload::UploadSession;

/// Title shown when browsing the drive root.
pub const ROOT_DIRECTORY_NAME: &str = "My StorageApp";

/// Dismiss window for upload notices.
pub const UPLOAD_NOTICE_DISMISS: Duration = Duration::from_secs(3);

/// Dismiss window for delete errors.
pub const DELETE_ERROR_DISMISS: Duration = Duration::from_secs(8);

/// A user-visible notice, carried as data.
///
/// The view never runs timers. `auto_dismiss` tells the host how long the
/// banner should stay up; `None` means it stays until replaced or cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub message: String,
    pub auto_dismiss: Option<Duration>,
}

impl Banner {
    fn persistent(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            auto_dismiss: None,
        }
    }

    fn transient(message: impl Into<String>, after: Duration) -> Self {
        Self {
            message: message.into(),
            auto_dismiss: Some(after),
        }
    }
}

/// Navigation the host must perform on the view's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    /// The session is gone; take the user to the login screen.
    Login,
}

/// Listing layout toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Grid,
    List,
}

/// Which body the host should render below the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewBranch {
    /// There are rows to show.
    Populated,
    /// The directory exists but holds nothing.
    Empty,
    /// The directory does not exist or is not accessible.
    NotFound,
}

/// What activating a row should do, returned instead of performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// A modifier click toggled selection; nothing to navigate.
    SelectionToggled,
    /// Enter the directory; the caller loads it next.
    EnterDirectory(String),
    /// Navigate the current tab to the file's download URL.
    Download(String),
}

/// State of the create-folder dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateFolderDialog {
    /// Name buffer, edited by the host as the user types.
    pub name: String,
}

/// State of the rename dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameDialog {
    pub kind: EntryKind,
    pub id: String,
    /// Name buffer, prefilled with the entry's current name.
    pub value: String,
}

/// Entry targeted by the delete confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    pub kind: EntryKind,
    pub id: String,
    pub name: String,
}

/// Client-side state for one drive browser screen.
///
/// # Example
///
/// ```no_run
/// use drivelib::api::ApiClient;
/// use drivelib::view::DirectoryView;
///
/// # async fn example() -> drivelib::Result<()> {
/// let api = ApiClient::new("http://localhost:3000")?;
/// let mut view = DirectoryView::new(api);
/// view.load_directory(None).await;
/// for entry in view.entries() {
///     println!("{}", entry.name());
/// }
/// # Ok(())
/// # }
/// ```
pub struct DirectoryView {
    api: ApiClient,
    dir_id: Option<String>,
    directory_name: String,
    directories: Vec<DirectoryRef>,
    files: Vec<FileRef>,
    banner: Option<Banner>,
    redirect: Option<Redirect>,
    selection: HashSet<String>,
    view_mode: ViewMode,
    context_menu: Option<String>,
    upload: Option<UploadSession>,
    create_dialog: Option<CreateFolderDialog>,
    rename_dialog: Option<RenameDialog>,
    confirm_delete: Option<DeleteTarget>,
    details: Option<ListingEntry>,
}

impl DirectoryView {
    /// Create a view rooted at the drive root.
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            dir_id: None,
            directory_name: ROOT_DIRECTORY_NAME.to_string(),
            directories: Vec::new(),
            files: Vec::new(),
            banner: None,
            redirect: None,
            selection: HashSet::new(),
            view_mode: ViewMode::Grid,
            context_menu: None,
            upload: None,
            create_dialog: None,
            rename_dialog: None,
            confirm_delete: None,
            details: None,
        }
    }

    /// Current directory id; `None` at the root.
    pub fn dir_id(&self) -> Option<&str> {
        self.dir_id.as_deref()
    }

    /// Header title for the current directory.
    pub fn directory_name(&self) -> &str {
        &self.directory_name
    }

    /// Subdirectories of the current directory, in display order.
    pub fn directories(&self) -> &[DirectoryRef] {
        &self.directories
    }

    /// Files of the current directory, in display order.
    pub fn files(&self) -> &[FileRef] {
        &self.files
    }

    /// Rows in display order: upload placeholder first, then directories,
    /// then files.
    pub fn entries(&self) -> Vec<ListingEntry> {
        build_entries(&self.directories, &self.files, self.upload.as_ref())
    }

    /// Which body the host should render. Rows win while any exist; the
    /// not-found and empty bodies only show for an empty listing.
    pub fn branch(&self) -> ViewBranch {
        if self.upload.is_some() || !self.directories.is_empty() || !self.files.is_empty() {
            ViewBranch::Populated
        } else if self.is_not_found() {
            ViewBranch::NotFound
        } else {
            ViewBranch::Empty
        }
    }

    /// Current banner, if any.
    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    /// Clear the banner once its dismiss window has elapsed, or when the
    /// user closes it.
    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    /// Whether the banner reports a missing directory. Mutating actions are
    /// disabled while this holds.
    pub fn is_not_found(&self) -> bool {
        self.banner
            .as_ref()
            .is_some_and(|b| b.message.to_lowercase().contains("not found"))
    }

    /// Upload, create, rename and delete are unavailable when the directory
    /// itself could not be loaded.
    pub fn actions_disabled(&self) -> bool {
        self.is_not_found()
    }

    /// Take the pending redirect, if the last operation demanded one.
    pub fn take_redirect(&mut self) -> Option<Redirect> {
        self.redirect.take()
    }

    /// In-flight upload session, if one exists.
    pub fn upload_session(&self) -> Option<&UploadSession> {
        self.upload.as_ref()
    }
}
