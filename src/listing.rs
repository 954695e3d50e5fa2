//! Listing rows for the directory view.

use crate::api::{DirectoryRef, FileRef};
use crate::upload::UploadSession;

/// Kind of server-owned entry, for targeting mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// Icon class for a file row, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileIcon {
    Pdf,
    Image,
    Video,
    Archive,
    Code,
    Generic,
}

impl FileIcon {
    /// Classify a file name by its extension (case-insensitive).
    pub fn for_name(name: &str) -> Self {
        let ext = name.rsplit('.').next().unwrap_or("").to_lowercase();
        match ext.as_str() {
            "pdf" => FileIcon::Pdf,
            "png" | "jpg" | "jpeg" | "gif" => FileIcon::Image,
            "mp4" | "mov" | "avi" => FileIcon::Video,
            "zip" | "rar" | "tar" | "gz" => FileIcon::Archive,
            "js" | "jsx" | "ts" | "tsx" | "html" | "css" | "py" | "java" => FileIcon::Code,
            _ => FileIcon::Generic,
        }
    }
}

/// One row of the directory view.
///
/// Server entries come from the last fetched listing; the upload variant is
/// the optimistic placeholder for the in-flight file. Only server entries
/// support rename, delete, and navigation.
#[derive(Debug, Clone)]
pub enum ListingEntry {
    Directory(DirectoryRef),
    File(FileRef),
    Upload(UploadSession),
}

impl ListingEntry {
    /// Row id: the server id, or the placeholder temp id.
    pub fn id(&self) -> &str {
        match self {
            ListingEntry::Directory(dir) => &dir.id,
            ListingEntry::File(file) => &file.id,
            ListingEntry::Upload(session) => &session.temp_id,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        match self {
            ListingEntry::Directory(dir) => &dir.name,
            ListingEntry::File(file) => &file.name,
            ListingEntry::Upload(session) => &session.name,
        }
    }

    /// Kind for mutation targeting; `None` for the upload placeholder.
    pub fn kind(&self) -> Option<EntryKind> {
        match self {
            ListingEntry::Directory(_) => Some(EntryKind::Directory),
            ListingEntry::File(_) => Some(EntryKind::File),
            ListingEntry::Upload(_) => None,
        }
    }

    /// Check if this row is the upload placeholder.
    pub fn is_upload(&self) -> bool {
        matches!(self, ListingEntry::Upload(_))
    }

    /// Icon for file rows. Directories render a folder glyph instead.
    pub fn icon(&self) -> Option<FileIcon> {
        match self {
            ListingEntry::Directory(_) => None,
            ListingEntry::File(file) => Some(FileIcon::for_name(&file.name)),
            ListingEntry::Upload(session) => Some(FileIcon::for_name(&session.name)),
        }
    }
}

/// Build the display rows: the upload placeholder first (when a session is
/// live), then directories, then files. The caller keeps both slices in
/// display order already.
pub fn build_entries(
    directories: &[DirectoryRef],
    files: &[FileRef],
    upload: Option<&UploadSession>,
) -> Vec<ListingEntry> {
    let mut entries =
        Vec::with_capacity(directories.len() + files.len() + usize::from(upload.is_some()));

    if let Some(session) = upload {
        entries.push(ListingEntry::Upload(session.clone()));
    }
    entries.extend(directories.iter().cloned().map(ListingEntry::Directory));
    entries.extend(files.iter().cloned().map(ListingEntry::File));
    entries
}
