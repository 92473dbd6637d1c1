use thiserror::Error;

use crate::store::UserStore;

/// Prefix of the placeholder name returned for unknown ids.
pub const FALLBACK_PREFIX: &str = "user_";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("user backend at {location} failed: {message}")]
    Backend { location: String, message: String },
}

/// Lookup facade over a [`UserStore`].
///
/// Misses are answered with a synthesized `user_<id>` name that is never written
/// back, so repeated misses leave the store untouched.
#[derive(Clone, Debug)]
pub struct UserService {
    store: UserStore,
    db_location: String,
}

impl UserService {
    pub fn new(db_location: impl Into<String>, store: UserStore) -> Self {
        Self {
            store,
            db_location: db_location.into(),
        }
    }

    /// Return the stored name for `id`, or the fallback placeholder.
    pub fn get_user(&self, id: &str) -> Result<String, ServiceError> {
        match self.store.get(id) {
            Some(name) => {
                tracing::debug!(id, "user lookup hit");
                Ok(name)
            }
            None => {
                tracing::debug!(id, "user lookup miss");
                Ok(format!("{FALLBACK_PREFIX}{id}"))
            }
        }
    }

    /// Store `name` for `id`. No validation; empty strings are fine.
    pub fn save_user(&self, id: &str, name: &str) -> Result<(), ServiceError> {
        self.store.set(id, name);
        tracing::debug!(id, "user saved");
        Ok(())
    }

    /// Configured database location. Informational only; storage is always in memory.
    pub fn db_location(&self) -> &str {
        &self.db_location
    }

    pub fn store(&self) -> &UserStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DEFAULT_SEED;

    fn seeded() -> UserService {
        UserService::new("test-db", UserStore::with_seed(DEFAULT_SEED.iter().copied()))
    }

    #[test]
    fn get_seeded_user() {
        let svc = seeded();
        assert_eq!(svc.get_user("admin").unwrap(), "Administrator");
    }

    #[test]
    fn miss_synthesizes_without_storing() {
        let svc = seeded();
        assert_eq!(svc.get_user("unknown").unwrap(), "user_unknown");
        assert_eq!(svc.get_user("unknown").unwrap(), "user_unknown");
        assert_eq!(svc.store().len(), 1);
        assert_eq!(svc.store().get("unknown"), None);
    }

    #[test]
    fn empty_id_miss() {
        let svc = seeded();
        assert_eq!(svc.get_user("").unwrap(), "user_");
    }

    #[test]
    fn special_characters_pass_through() {
        let svc = seeded();
        assert_eq!(svc.get_user("a b/ü?").unwrap(), "user_a b/ü?");
    }

    #[test]
    fn save_then_get() {
        let svc = seeded();
        svc.save_user("guest", "Guest User").unwrap();
        assert_eq!(svc.get_user("guest").unwrap(), "Guest User");
    }

    #[test]
    fn save_accepts_empty_strings() {
        let svc = seeded();
        svc.save_user("", "").unwrap();
        assert_eq!(svc.get_user("").unwrap(), "");
    }

    #[test]
    fn guest_scenario() {
        let svc = seeded();
        assert_eq!(svc.get_user("admin").unwrap(), "Administrator");
        assert_eq!(svc.get_user("guest").unwrap(), "user_guest");
        svc.save_user("guest", "Guest User").unwrap();
        assert_eq!(svc.get_user("guest").unwrap(), "Guest User");
    }

    #[test]
    fn services_do_not_share_unrelated_stores() {
        let a = seeded();
        let b = seeded();
        a.save_user("guest", "Guest User").unwrap();
        assert_eq!(b.get_user("guest").unwrap(), "user_guest");
    }

    #[test]
    fn db_location_is_kept() {
        assert_eq!(seeded().db_location(), "test-db");
    }

    #[test]
    fn backend_error_message() {
        let err = ServiceError::Backend {
            location: "postgres://localhost/demo".into(),
            message: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "user backend at postgres://localhost/demo failed: connection refused"
        );
    }
}
