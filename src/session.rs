//! Authentication and account state.
//!
//! Registration is a two-step email flow:
//! 1. Call [`send_otp`] with the address; the backend emails a one-time code
//! 2. Call [`register`] with the profile and the code from the email
//!
//! Logging in yields a [`Session`]. The backend sets an http-only cookie on
//! the shared client, so the session owns no token of its own; it holds the
//! client plus the account record fetched right after authentication.

use tracing::{debug, info};

use crate::api::{AccountInfo, ApiClient, StorageQuota};
use crate::error::Result;
use crate::view::DirectoryView;

/// Profile submitted when registering a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Display name
    pub name: String,
    /// Email address, already verified via the one-time code
    pub email: String,
    /// Password for email login
    pub password: String,
    /// One-time code from the verification email
    pub otp: String,
}

/// Step 1: request a one-time code for an email address.
///
/// The backend emails the code; it expires server-side.
pub async fn send_otp(api: &ApiClient, email: &str) -> Result<()> {
    api.send_otp(email).await
}

/// Check a one-time code without consuming it.
///
/// Lets a signup form validate the code before asking for the rest of the
/// profile. An invalid or expired code surfaces as an API error.
pub async fn verify_otp(api: &ApiClient, email: &str, otp: &str) -> Result<()> {
    api.verify_otp(email, otp).await
}

/// Step 2: create the account.
///
/// # Example
/// ```no_run
/// use drivelib::api::ApiClient;
/// use drivelib::session::{register, send_otp, NewAccount};
///
/// # async fn example() -> drivelib::Result<()> {
/// let api = ApiClient::new("http://localhost:3000")?;
/// send_otp(&api, "user@example.com").await?;
/// // ... read the code from the email ...
/// register(
///     &api,
///     &NewAccount {
///         name: "Jo".to_string(),
///         email: "user@example.com".to_string(),
///         password: "hunter2hunter2".to_string(),
///         otp: "424242".to_string(),
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn register(api: &ApiClient, account: &NewAccount) -> Result<()> {
    debug!("registering account for {}", account.email);
    api.register(&account.name, &account.email, &account.password, &account.otp)
        .await
}

/// An authenticated session against the drive backend.
///
/// # Example
/// ```no_run
/// use drivelib::api::ApiClient;
/// use drivelib::session::Session;
///
/// # async fn example() -> drivelib::Result<()> {
/// let api = ApiClient::new("http://localhost:3000")?;
/// let session = Session::login(api, "user@example.com", "hunter2hunter2").await?;
/// let quota = session.quota();
/// println!(
///     "{}: {} of {} bytes used",
///     session.account().name,
///     quota.used,
///     quota.total
/// );
/// # Ok(())
/// # }
/// ```
pub struct Session {
    api: ApiClient,
    account: AccountInfo,
}

impl Session {
    /// Log in with email and password.
    pub async fn login(api: ApiClient, email: &str, password: &str) -> Result<Self> {
        api.login(email, password).await?;
        Self::resume(api).await
    }

    /// Log in with a Google ID token obtained from the Google sign-in flow.
    pub async fn login_with_google(api: ApiClient, id_token: &str) -> Result<Self> {
        api.login_with_google(id_token).await?;
        Self::resume(api).await
    }

    /// Resume a session from the client's stored cookie.
    ///
    /// Also the landing step after browser-based logins (GitHub via
    /// [`ApiClient::github_login_url`]): once the provider redirects back
    /// and the cookie is set, resuming fetches the account it belongs to.
    /// A missing or expired cookie surfaces as a 401 API error.
    pub async fn resume(api: ApiClient) -> Result<Self> {
        let account = api.current_user().await?;
        info!("session active for {}", account.email);
        Ok(Self { api, account })
    }

    /// The API client carrying this session's cookie.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The account record fetched at login.
    pub fn account(&self) -> &AccountInfo {
        &self.account
    }

    /// Refetch the account record, picking up storage usage changes.
    pub async fn refresh_account(&mut self) -> Result<&AccountInfo> {
        self.account = self.api.current_user().await?;
        Ok(&self.account)
    }

    /// Storage quota from the last fetched account record.
    pub fn quota(&self) -> StorageQuota {
        self.account.quota()
    }

    /// Open a directory view backed by this session.
    pub fn drive_view(&self) -> DirectoryView {
        DirectoryView::new(self.api.clone())
    }

    /// Log out, invalidating this session's cookie.
    pub async fn logout(self) -> Result<()> {
        self.api.logout().await
    }

    /// Log out everywhere, invalidating every session of this account.
    pub async fn logout_all(self) -> Result<()> {
        self.api.logout_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_reads_account_record() {
        let api = ApiClient::new("http://localhost:3000").unwrap();
        let session = Session {
            api,
            account: AccountInfo {
                id: Some("u1".to_string()),
                name: "Jo".to_string(),
                email: "jo@example.com".to_string(),
                picture: None,
                role: None,
                used_storage_in_bytes: 300,
                max_storage_in_bytes: Some(1000),
            },
        };

        let quota = session.quota();
        assert_eq!(quota.used, 300);
        assert_eq!(quota.free(), 700);
        assert_eq!(session.account().email, "jo@example.com");
    }
}
