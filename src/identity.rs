use std::fmt;

use anyhow::Result;
use async_trait::async_trait;

const KEY_PREFIX: &str = "showcase:content:";
const ANONYMOUS: &str = "anonymous";
const ADDRESS_NS: &str = "addr:";

/// Wallet-based sign-in, supplied by the embedding application.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    fn is_authenticated(&self) -> bool;
    fn user_address(&self) -> Option<String>;
    async fn connect_wallet(&self) -> Result<()>;
    async fn disconnect_wallet(&self) -> Result<()>;
}

/// Point-in-time view of the auth provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub is_authenticated: bool,
    pub user_address: Option<String>,
}

impl AuthState {
    pub fn anonymous() -> Self { AuthState::default() }

    pub fn signed_in(address: impl Into<String>) -> Self {
        AuthState { is_authenticated: true, user_address: Some(address.into()) }
    }

    pub fn from_provider(provider: &dyn AuthProvider) -> Self {
        AuthState { is_authenticated: provider.is_authenticated(), user_address: provider.user_address() }
    }
}

/// Namespaced key a content document is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// Wallet addresses are case-insensitive (checksum casing), so the key
    /// uses the lowercased form under `addr:`. Signed-out or address-less
    /// sessions share the anonymous key, which no address can produce.
    pub fn for_identity(auth: &AuthState) -> Self {
        let address = auth
            .user_address
            .as_deref()
            .map(|a| a.trim().to_ascii_lowercase())
            .filter(|a| auth.is_authenticated && !a.is_empty());
        match address {
            Some(a) => StorageKey(format!("{KEY_PREFIX}{ADDRESS_NS}{a}")),
            None => StorageKey::anonymous(),
        }
    }

    pub fn anonymous() -> Self { StorageKey(format!("{KEY_PREFIX}{ANONYMOUS}")) }

    pub fn is_anonymous(&self) -> bool { self.0.strip_prefix(KEY_PREFIX) == Some(ANONYMOUS) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}
