use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::AuthError;

/// In-memory email → password-hash map. Entries live for the life of the
/// process; nothing is persisted.
#[derive(Default)]
pub struct CredentialStore {
    users: DashMap<String, String>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new entry. The existence check and the insert happen under
    /// the same shard lock, so concurrent inserts for one email cannot both win.
    pub fn insert(&self, email: &str, password_hash: String) -> Result<(), AuthError> {
        match self.users.entry(email.to_string()) {
            Entry::Occupied(_) => Err(AuthError::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(password_hash);
                Ok(())
            }
        }
    }

    pub fn password_hash(&self, email: &str) -> Option<String> {
        self.users.get(email).map(|h| h.value().clone())
    }

    pub fn contains(&self, email: &str) -> bool {
        self.users.contains_key(email)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
