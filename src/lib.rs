//! # drivelib
//!
//! Rust client library for the Storage Drive backend.
//!
//! ## Features
//!
//! - **Authentication**: Email/password login with one-time-code signup,
//!   Google and GitHub sign-in, and cookie-backed session resume.
//!   - Logout for one device or every device at once.
//!   - Account record with storage quota tracking.
//! - **Directory Operations**:
//!   - Fetch directory listings (root or by id).
//!   - Create, rename, and delete directories.
//!   - Rename and delete files; build per-file download URLs.
//! - **File Uploads**:
//!   - Three-step flow: initiate, stream to a signed destination, confirm.
//!   - Progress tracking with custom callbacks and cancellation.
//!   - One upload at a time, with an optimistic placeholder row.
//! - **Directory View State**:
//!   - Listing reconciliation, selection, context menus, and dialogs as
//!     plain data, ready for any UI to render.
//!   - Error banners that carry their own dismiss window.
//!
//! The view layer never touches a UI toolkit; hosts render
//! [`view::DirectoryView`] however they like and feed user actions back in.
//!
//! ## Example: Basic Usage
//!
//! ```no_run
//! use drivelib::api::ApiClient;
//! use drivelib::session::Session;
//! use drivelib::upload::UploadSource;
//!
//! # async fn example() -> drivelib::Result<()> {
//! // Login
//! let api = ApiClient::new("http://localhost:3000")?;
//! let session = Session::login(api, "user@example.com", "password").await?;
//!
//! // Browse the drive root
//! let mut view = session.drive_view();
//! view.load_directory(None).await;
//! for entry in view.entries() {
//!     println!("{}", entry.name());
//! }
//!
//! // Upload a file into the current directory
//! let source = UploadSource::from_path("local_file.txt").await?;
//! let task = view.start_upload(source).await?;
//! let outcome = task.run().await;
//! view.finish_upload(outcome).await;
//!
//! # Ok(())
//! # }
//! ```
//!
//! ## Example: Account Registration
//!
//! Registration is a two-step process:
//!
//! ```no_run
//! use drivelib::api::ApiClient;
//! use drivelib::session::{register, send_otp, NewAccount};
//!
//! # async fn example() -> drivelib::Result<()> {
//! let api = ApiClient::new("http://localhost:3000")?;
//!
//! // Step 1: Send a one-time code to the address
//! send_otp(&api, "user@example.com").await?;
//!
//! // Step 2: After receiving the email, complete registration
//! register(
//!     &api,
//!     &NewAccount {
//!         name: "John Doe".to_string(),
//!         email: "user@example.com".to_string(),
//!         password: "SecurePassword123".to_string(),
//!         otp: "424242".to_string(),
//!     },
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod error;
pub mod http;
pub mod listing;
pub mod progress;
pub mod session;
pub mod transfer;
pub mod upload;
pub mod view;

// Re-export commonly used types
pub use api::{
    AccountInfo, ApiClient, ApiError, DirectoryListing, DirectoryRef, FileRef, StorageQuota,
    UploadTicket,
};
pub use error::{DriveError, Result};
pub use listing::{EntryKind, FileIcon, ListingEntry};
pub use progress::{ProgressCallback, TransferProgress};
pub use session::{register, send_otp, verify_otp, NewAccount, Session};
pub use upload::{
    UploadHandle, UploadOutcome, UploadPhase, UploadSession, UploadSource, UploadTask,
};
pub use view::{Banner, DirectoryView, Redirect, RowOutcome, ViewBranch, ViewMode};
