//! Wire types for the Storage Drive backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fallback storage allowance when the server omits a limit (1 GiB).
pub const DEFAULT_STORAGE_BYTES: u64 = 1_073_741_824;

/// A directory listing as returned by the backend.
///
/// Fetched per navigation and treated as an immutable snapshot until the
/// next fetch replaces it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryListing {
    /// Directory id; absent for the root listing
    #[serde(default)]
    pub id: Option<String>,
    /// Directory display name
    #[serde(default)]
    pub name: String,
    /// Immediate subdirectories
    #[serde(default)]
    pub directories: Vec<DirectoryRef>,
    /// Files directly inside this directory
    #[serde(default)]
    pub files: Vec<FileRef>,
}

/// A subdirectory entry inside a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryRef {
    /// Server-assigned identifier
    pub id: String,
    /// Directory name
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A file entry inside a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    /// Server-assigned identifier
    pub id: String,
    /// File name
    pub name: String,
    /// File size in bytes
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Response to an upload initiation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    /// Signed destination URL that accepts the raw file body
    pub upload_signed_url: String,
    /// Server-assigned id for the pending file
    pub file_id: String,
}

/// The authenticated user's account record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    #[serde(default)]
    pub id: Option<String>,
    /// Display name
    pub name: String,
    /// Account email
    pub email: String,
    /// Avatar URL, if the provider supplied one
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Bytes currently consumed by this account
    #[serde(default)]
    pub used_storage_in_bytes: u64,
    /// Storage allowance in bytes; absent means the default allowance
    #[serde(default)]
    pub max_storage_in_bytes: Option<u64>,
}

impl AccountInfo {
    /// Get the storage quota for this account.
    pub fn quota(&self) -> StorageQuota {
        StorageQuota {
            total: self.max_storage_in_bytes.unwrap_or(DEFAULT_STORAGE_BYTES),
            used: self.used_storage_in_bytes,
        }
    }
}

/// User storage quota information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageQuota {
    /// Total storage in bytes
    pub total: u64,
    /// Used storage in bytes
    pub used: u64,
}

impl StorageQuota {
    /// Get free storage in bytes.
    pub fn free(&self) -> u64 {
        self.total.saturating_sub(self.used)
    }

    /// Get usage percentage.
    pub fn usage_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.used as f64 / self.total as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_deserialization() {
        let json = r#"{
            "name": "Documents",
            "directories": [
                {"id": "d1", "name": "Reports", "createdAt": "2024-03-01T10:00:00Z"}
            ],
            "files": [
                {"id": "f1", "name": "notes.txt", "size": 42}
            ]
        }"#;

        let listing: DirectoryListing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.name, "Documents");
        assert!(listing.id.is_none());
        assert_eq!(listing.directories.len(), 1);
        assert_eq!(listing.directories[0].id, "d1");
        assert!(listing.directories[0].created_at.is_some());
        assert!(listing.directories[0].updated_at.is_none());
        assert_eq!(listing.files[0].size, 42);
    }

    #[test]
    fn test_upload_ticket_field_names() {
        let json = r#"{"uploadSignedUrl": "https://storage.example/put/abc", "fileId": "f42"}"#;
        let ticket: UploadTicket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.upload_signed_url, "https://storage.example/put/abc");
        assert_eq!(ticket.file_id, "f42");
    }

    #[test]
    fn test_account_default_quota() {
        let json = r#"{"name": "Jo", "email": "jo@example.com", "usedStorageInBytes": 1024}"#;
        let account: AccountInfo = serde_json::from_str(json).unwrap();

        let quota = account.quota();
        assert_eq!(quota.total, DEFAULT_STORAGE_BYTES);
        assert_eq!(quota.used, 1024);
    }

    #[test]
    fn test_quota_calculations() {
        let quota = StorageQuota {
            total: 1000,
            used: 250,
        };

        assert_eq!(quota.free(), 750);
        assert_eq!(quota.usage_percent(), 25.0);

        let empty_quota = StorageQuota { total: 0, used: 0 };
        assert_eq!(empty_quota.usage_percent(), 0.0);
        assert_eq!(StorageQuota { total: 10, used: 25 }.free(), 0);
    }
}
