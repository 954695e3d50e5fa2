//! Create, rename and delete flows.
//!
//! Every mutation follows the same shape: send the request, then refetch the
//! listing so the rows always reflect what the server accepted. Failures
//! from an open dialog keep the dialog open with a persistent banner; delete
//! failures surface as a timed banner because there is no dialog left to
//! hold them.

use tracing::debug;

use super::{
    Banner, CreateFolderDialog, DeleteTarget, DirectoryView, Redirect, RenameDialog,
    DELETE_ERROR_DISMISS,
};
use crate::error::DriveError;
use crate::listing::EntryKind;

/// Name prefilled in a fresh create-folder dialog.
const NEW_FOLDER_NAME: &str = "New Folder";

impl DirectoryView {
    /// Create-folder dialog state, if open.
    pub fn create_dialog(&self) -> Option<&CreateFolderDialog> {
        self.create_dialog.as_ref()
    }

    /// Open the create-folder dialog with the default name prefilled.
    pub fn open_create_dialog(&mut self) {
        if self.actions_disabled() {
            return;
        }
        self.create_dialog = Some(CreateFolderDialog {
            name: NEW_FOLDER_NAME.to_string(),
        });
    }

    /// Update the create-folder name buffer as the user types.
    pub fn set_create_name(&mut self, name: &str) {
        if let Some(dialog) = &mut self.create_dialog {
            dialog.name = name.to_string();
        }
    }

    pub fn close_create_dialog(&mut self) {
        self.create_dialog = None;
    }

    /// Submit the create-folder dialog.
    ///
    /// A blank name is ignored. On success the dialog closes and the listing
    /// is refetched; on failure the dialog stays open so the user can fix
    /// the name and retry.
    pub async fn create_folder(&mut self) {
        let Some(dialog) = &self.create_dialog else {
            return;
        };
        let name = dialog.name.trim().to_string();
        if name.is_empty() {
            return;
        }

        let dir_id = self.dir_id.clone();
        let result = self.api.create_directory(dir_id.as_deref(), &name).await;
        match result {
            Ok(()) => {
                self.banner = None;
                self.create_dialog = None;
                self.reload().await;
            }
            Err(err) => self.apply_dialog_failure(err, "Failed to create folder"),
        }
    }

    /// Rename dialog state, if open.
    pub fn rename_dialog(&self) -> Option<&RenameDialog> {
        self.rename_dialog.as_ref()
    }

    /// Open the rename dialog for an entry, prefilled with its current name.
    /// Closes the context menu it was invoked from.
    pub fn open_rename_dialog(&mut self, kind: EntryKind, id: &str, current_name: &str) {
        if self.actions_disabled() {
            return;
        }
        self.context_menu = None;
        self.rename_dialog = Some(RenameDialog {
            kind,
            id: id.to_string(),
            value: current_name.to_string(),
        });
    }

    /// Update the rename buffer as the user types.
    pub fn set_rename_value(&mut self, value: &str) {
        if let Some(dialog) = &mut self.rename_dialog {
            dialog.value = value.to_string();
        }
    }

    pub fn close_rename_dialog(&mut self) {
        self.rename_dialog = None;
    }

    /// Submit the rename dialog.
    ///
    /// Same contract as [`create_folder`](Self::create_folder): blank names
    /// are ignored, success refetches, failure keeps the dialog open.
    pub async fn rename_entry(&mut self) {
        let Some(dialog) = &self.rename_dialog else {
            return;
        };
        let value = dialog.value.trim().to_string();
        if value.is_empty() {
            return;
        }
        let kind = dialog.kind;
        let id = dialog.id.clone();

        let result = match kind {
            EntryKind::Directory => self.api.rename_directory(&id, &value).await,
            EntryKind::File => self.api.rename_file(&id, &value).await,
        };
        match result {
            Ok(()) => {
                self.banner = None;
                self.rename_dialog = None;
                self.reload().await;
            }
            Err(err) => self.apply_dialog_failure(err, "Rename failed"),
        }
    }

    /// Entry awaiting delete confirmation, if any.
    pub fn delete_target(&self) -> Option<&DeleteTarget> {
        self.confirm_delete.as_ref()
    }

    /// Ask for confirmation before deleting an entry. Closes the context
    /// menu it was invoked from.
    pub fn request_delete(&mut self, kind: EntryKind, id: &str, name: &str) {
        if self.actions_disabled() {
            return;
        }
        self.context_menu = None;
        self.confirm_delete = Some(DeleteTarget {
            kind,
            id: id.to_string(),
            name: name.to_string(),
        });
    }

    pub fn close_delete_dialog(&mut self) {
        self.confirm_delete = None;
    }

    /// Delete the confirmed entry.
    ///
    /// The confirmation dialog closes and the selection is cleared whether
    /// or not the request succeeds; the refetch afterwards shows what the
    /// server actually did.
    pub async fn delete_confirmed(&mut self) {
        let Some(target) = self.take_delete_target() else {
            return;
        };

        let result = match target.kind {
            EntryKind::Directory => self.api.delete_directory(&target.id).await,
            EntryKind::File => self.api.delete_file(&target.id).await,
        };
        match result {
            Ok(()) => {
                debug!("deleted {} ({:?})", target.id, target.kind);
                self.banner = None;
            }
            Err(err) => {
                let unauthorized = err.is_unauthorized();
                self.apply_delete_failure(target.kind, err);
                if unauthorized {
                    return;
                }
            }
        }
        self.reload().await;
    }

    /// Consume the confirmation dialog and the selection. A delete attempt
    /// uses up both, whatever the server says next.
    fn take_delete_target(&mut self) -> Option<DeleteTarget> {
        let target = self.confirm_delete.take()?;
        self.selection.clear();
        Some(target)
    }

    fn apply_delete_failure(&mut self, kind: EntryKind, err: DriveError) {
        if err.is_unauthorized() {
            self.redirect = Some(Redirect::Login);
            return;
        }
        let message = classify_delete_error(kind, &err);
        self.banner = Some(Banner::transient(message, DELETE_ERROR_DISMISS));
    }

    /// Shared failure path for the create and rename dialogs. A 401 routes
    /// to login; anything else becomes a persistent banner while the dialog
    /// stays open.
    fn apply_dialog_failure(&mut self, err: DriveError, fallback: &str) {
        if err.is_unauthorized() {
            self.redirect = Some(Redirect::Login);
            return;
        }
        let message = match err.api() {
            Some(api) if !api.message.is_empty() => api.message.clone(),
            _ => fallback.to_string(),
        };
        self.banner = Some(Banner::persistent(message));
    }
}

/// Turn a delete failure into the message the user sees.
///
/// Permission rejections win over everything; a non-empty directory gets the
/// fixed explanation; anything else shows the server's message when there is
/// one.
fn classify_delete_error(kind: EntryKind, err: &DriveError) -> String {
    if let Some(api) = err.api() {
        if api.message_contains("permission") || api.message_contains("access denied") {
            return "You don't have permission to delete this item.".to_string();
        }
        let not_empty_status = api.status_code == 409 || api.status_code == 423;
        let not_empty_message = api.message_contains("not empty")
            || api.message_contains("contains files")
            || api.message_contains("non-empty");
        if kind == EntryKind::Directory && (not_empty_status || not_empty_message) {
            return "Cannot delete folder: The folder is not empty. Please delete all files \
                    and subfolders first before deleting the folder."
                .to_string();
        }
        if !api.message.is_empty() {
            return api.message.clone();
        }
    }
    "Delete failed. Please try again.".to_string()
}
