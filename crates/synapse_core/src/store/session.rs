//! Access credential and the client-side login gate.
//!
//! The gate only decides whether capture is offered; the credential itself
//! is forwarded verbatim and checked by the remote service.

use super::kv::KvStore;
use super::{StoreError, StoreResult};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Key under which the access credential is stored.
pub const ACCESS_KEY_KEY: &str = "synapse_key";

#[derive(Debug)]
pub enum SessionError {
    /// Login attempted with a blank credential.
    EmptyKey,
    Store(StoreError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyKey => write!(f, "access key cannot be empty"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyKey => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Holds the credential for the running process.
pub struct Session<K: KvStore> {
    kv: K,
    access_key: Option<String>,
}

impl<K: KvStore> Session<K> {
    /// Restores a previously stored credential, if any.
    pub fn load(kv: K) -> StoreResult<Self> {
        let access_key = kv.get(ACCESS_KEY_KEY)?.filter(|key| !key.is_empty());
        Ok(Self { kv, access_key })
    }

    /// Stores `key` and unlocks capture.
    pub fn login(&mut self, key: &str) -> Result<(), SessionError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(SessionError::EmptyKey);
        }
        self.kv.set(ACCESS_KEY_KEY, key)?;
        self.access_key = Some(key.to_string());
        info!("event=session_login module=store status=ok");
        Ok(())
    }

    /// Forgets the credential and locks capture again.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.kv.remove(ACCESS_KEY_KEY)?;
        self.access_key = None;
        info!("event=session_logout module=store status=ok");
        Ok(())
    }

    pub fn access_key(&self) -> Option<&str> {
        self.access_key.as_deref()
    }

    pub fn is_unlocked(&self) -> bool {
        self.access_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::{Session, SessionError, ACCESS_KEY_KEY};
    use crate::store::kv::{KvStore, MemoryKvStore};

    #[test]
    fn login_persists_trimmed_key_and_logout_clears_it() {
        let kv = MemoryKvStore::new();
        let mut session = Session::load(&kv).expect("load");
        assert!(!session.is_unlocked());

        session.login("  1234 ").expect("login");
        assert_eq!(session.access_key(), Some("1234"));
        assert_eq!(
            Session::load(&kv).expect("reload").access_key(),
            Some("1234")
        );

        session.logout().expect("logout");
        assert!(!session.is_unlocked());
        assert_eq!(kv.get(ACCESS_KEY_KEY).expect("get"), None);
    }

    #[test]
    fn blank_key_is_rejected() {
        let kv = MemoryKvStore::new();
        let mut session = Session::load(&kv).expect("load");
        assert!(matches!(session.login("   "), Err(SessionError::EmptyKey)));
        assert!(kv.is_empty());
    }
}
