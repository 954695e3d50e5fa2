//! Storage Drive API client and wire types.

pub mod client;
pub mod error;
pub mod types;

pub use client::ApiClient;
pub use error::ApiError;
pub use types::{
    AccountInfo, DirectoryListing, DirectoryRef, FileRef, StorageQuota, UploadTicket,
    DEFAULT_STORAGE_BYTES,
};
