//! Authenticated shopper session.

use std::sync::Arc;

use tracing::{info, instrument};

use checkout::accounts::{AccountUuid, Address, Profile};

use crate::remote::{AccountsApi, RemoteError};

/// The signed-in shopper, shared by the cart and checkout flows.
///
/// Constructed once at login and handed around as `Arc<Session>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    profile: Profile,
}

impl Session {
    /// Wrap an already fetched profile.
    pub fn new(profile: Profile) -> Arc<Self> {
        Arc::new(Self { profile })
    }

    /// Fetch the account's profile and open a session for it.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the profile cannot be fetched.
    #[instrument(name = "session.login", skip(accounts), fields(account = %account), err)]
    pub async fn login(
        account: AccountUuid,
        accounts: &dyn AccountsApi,
    ) -> Result<Arc<Self>, RemoteError> {
        let profile = accounts.get_profile(account).await?;

        info!(addresses = profile.addresses.len(), "session opened");

        Ok(Self::new(profile))
    }

    /// End this handle on the session.
    pub fn logout(self: Arc<Self>) {
        info!(account = %self.profile.account, "session closed");
    }

    /// Signed-in account.
    pub fn account(&self) -> AccountUuid {
        self.profile.account
    }

    /// Full profile.
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// The shopper's address book.
    pub fn addresses(&self) -> &[Address] {
        &self.profile.addresses
    }
}
