//! Typed endpoint wrappers for the Storage Drive API.

use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::api::types::{AccountInfo, DirectoryListing, UploadTicket};
use crate::error::{DriveError, Result};
use crate::http::HttpClient;

/// Typed client for the Storage Drive REST API.
///
/// Thin request wrappers only; listing reconciliation and error
/// classification live in the view layer. Clones share the transport and its
/// cookie store, so one login authenticates them all.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: HttpClient,
}

impl ApiClient {
    /// Create a new API client for the given backend base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(base_url)?,
        })
    }

    /// Create a new API client with a proxy.
    ///
    /// # Arguments
    /// * `base_url` - Backend base URL
    /// * `proxy` - Proxy URL (e.g., "http://proxy:8080" or "socks5://proxy:1080")
    pub fn with_proxy(base_url: &str, proxy: &str) -> Result<Self> {
        Ok(Self {
            http: HttpClient::with_proxy(base_url, proxy)?,
        })
    }

    /// Shared HTTP transport.
    pub(crate) fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Fetch a directory listing. `None` fetches the root directory.
    pub async fn get_directory(&self, dir_id: Option<&str>) -> Result<DirectoryListing> {
        decode(self.http.get(&directory_path(dir_id)).await?).await
    }

    /// Create a directory under the given parent (`None` = root).
    pub async fn create_directory(&self, parent_id: Option<&str>, name: &str) -> Result<()> {
        self.http
            .post("/directory", &json!({ "parentId": parent_id, "name": name }))
            .await?;
        Ok(())
    }

    /// Rename a directory.
    pub async fn rename_directory(&self, dir_id: &str, new_name: &str) -> Result<()> {
        self.http
            .patch(
                &format!("/directory/{}", dir_id),
                &json!({ "newName": new_name }),
            )
            .await?;
        Ok(())
    }

    /// Delete a directory.
    ///
    /// The backend rejects directories that still have contents (409/423 or
    /// a message to that effect).
    pub async fn delete_directory(&self, dir_id: &str) -> Result<()> {
        self.http.delete(&format!("/directory/{}", dir_id)).await?;
        Ok(())
    }

    /// Rename a file.
    pub async fn rename_file(&self, file_id: &str, new_name: &str) -> Result<()> {
        self.http
            .patch(
                &format!("/file/{}", file_id),
                &json!({ "newFilename": new_name }),
            )
            .await?;
        Ok(())
    }

    /// Delete a file.
    pub async fn delete_file(&self, file_id: &str) -> Result<()> {
        self.http.delete(&format!("/file/{}", file_id)).await?;
        Ok(())
    }

    /// Announce an upload and obtain its signed destination.
    ///
    /// This is where quota and validation rejections surface, before any
    /// bytes move.
    pub async fn initiate_upload(
        &self,
        name: &str,
        size: u64,
        content_type: &str,
        parent_dir_id: Option<&str>,
    ) -> Result<UploadTicket> {
        let response = self
            .http
            .post(
                "/file/upload/initiated",
                &json!({
                    "name": name,
                    "size": size,
                    "contentType": content_type,
                    "parentDirId": parent_dir_id,
                }),
            )
            .await?;
        check_ticket(decode(response).await?)
    }

    /// Confirm that the signed-destination transfer finished.
    pub async fn complete_upload(&self, file_id: &str) -> Result<()> {
        self.http
            .post("/file/upload/complete", &json!({ "fileId": file_id }))
            .await?;
        Ok(())
    }

    /// Absolute download URL for a file, for same-tab navigation.
    pub fn file_download_url(&self, file_id: &str) -> String {
        format!("{}/file/{}", self.http.base_url(), file_id)
    }

    /// Send a one-time password to the given email.
    pub async fn send_otp(&self, email: &str) -> Result<()> {
        self.http
            .post("/auth/send-otp", &json!({ "email": email }))
            .await?;
        Ok(())
    }

    /// Verify a one-time password previously sent to the email.
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<()> {
        self.http
            .post("/auth/verify-otp", &json!({ "email": email, "otp": otp }))
            .await?;
        Ok(())
    }

    /// Exchange a Google ID token for a session cookie.
    pub async fn login_with_google(&self, id_token: &str) -> Result<()> {
        self.http
            .post("/auth/google", &json!({ "idToken": id_token }))
            .await?;
        Ok(())
    }

    /// Entry URL for the GitHub OAuth flow.
    ///
    /// The exchange completes through browser redirects; there is nothing to
    /// call once the user lands back with a session cookie.
    pub fn github_login_url(&self) -> String {
        format!("{}/auth/github", self.http.base_url())
    }

    /// Register a new account. The email must hold a verified OTP.
    pub async fn register(&self, name: &str, email: &str, password: &str, otp: &str) -> Result<()> {
        self.http
            .post(
                "/user/register",
                &json!({
                    "name": name,
                    "email": email,
                    "password": password,
                    "otp": otp,
                }),
            )
            .await?;
        Ok(())
    }

    /// Log in with email and password; the session cookie lands in the
    /// shared cookie store.
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        self.http
            .post(
                "/user/login",
                &json!({ "email": email, "password": password }),
            )
            .await?;
        Ok(())
    }

    /// Log out the current session.
    pub async fn logout(&self) -> Result<()> {
        self.http.post_empty("/user/logout").await?;
        Ok(())
    }

    /// Log out every session of the current user.
    pub async fn logout_all(&self) -> Result<()> {
        self.http.post_empty("/user/logout-all").await?;
        Ok(())
    }

    /// Fetch the authenticated user's account record.
    pub async fn current_user(&self) -> Result<AccountInfo> {
        decode(self.http.get("/user/").await?).await
    }
}

/// Decode a successful response body as JSON.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// A ticket without a destination or a file id cannot drive an upload;
/// reject it before any bytes move.
fn check_ticket(ticket: UploadTicket) -> Result<UploadTicket> {
    if ticket.upload_signed_url.is_empty() || ticket.file_id.is_empty() {
        return Err(DriveError::InvalidResponse);
    }
    Ok(ticket)
}

fn directory_path(dir_id: Option<&str>) -> String {
    match dir_id {
        Some(id) => format!("/directory/{}", id),
        None => "/directory/".to_string(),
    }
}
