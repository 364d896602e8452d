//! The tracking session state machine.
//!
//! ```text
//! Uninitialized --initialize--> Active --finish--> Terminated
//! ```
//!
//! A session is used once. Its data is loaded from storage on initialize and
//! written back on commit and finish.

use crate::cmi::Cmi;
use crate::element::Element;
use crate::storage::{Storage, STORAGE_KEY};
use crate::TrackingError;
use log::{info, warn};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Active,
    Terminated,
}

/// Tracking data of one learner plus the storage it persists to.
#[derive(Debug)]
pub struct Session<S> {
    state: SessionState,
    cmi: Cmi,
    storage: S,
    key: String,
}

impl<S: Storage> Session<S> {
    /// A fresh session persisting under [`STORAGE_KEY`].
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, STORAGE_KEY)
    }

    /// A fresh session persisting under `key`.
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            state: SessionState::Uninitialized,
            cmi: Cmi::default(),
            storage,
            key: key.into(),
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The current tracking tree.
    #[must_use]
    pub fn cmi(&self) -> &Cmi {
        &self.cmi
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Start the session, resuming persisted data when there is any.
    ///
    /// Unreadable persisted data is logged and the seeded defaults are used.
    pub fn initialize(&mut self) -> Result<(), TrackingError> {
        match self.state {
            SessionState::Uninitialized => {}
            SessionState::Active => return Err(TrackingError::AlreadyInitialized),
            SessionState::Terminated => return Err(TrackingError::Terminated),
        }

        self.cmi = match self.load() {
            Ok(Some(cmi)) => {
                info!("resumed tracking data from '{}'", self.key);
                cmi
            }
            Ok(None) => Cmi::default(),
            Err(e) => {
                warn!("ignoring stored tracking data under '{}': {}", self.key, e);
                Cmi::default()
            }
        };
        self.state = SessionState::Active;
        info!("session initialized");
        Ok(())
    }

    /// Persist the tree and end the session.
    ///
    /// On a storage failure the session stays active.
    pub fn finish(&mut self) -> Result<(), TrackingError> {
        self.ensure_active()?;
        self.persist()?;
        self.state = SessionState::Terminated;
        info!("session terminated");
        Ok(())
    }

    /// Persist the tree without ending the session.
    pub fn commit(&mut self) -> Result<(), TrackingError> {
        self.ensure_active()?;
        self.persist()?;
        info!("session committed");
        Ok(())
    }

    /// Value of the element at `path`.
    pub fn get(&self, path: &str) -> Result<&str, TrackingError> {
        self.ensure_active()?;
        self.cmi
            .get(&Element::parse(path))
            .ok_or_else(|| TrackingError::NotFound(path.to_string()))
    }

    /// Validate and store `value` at `path`.
    pub fn set(&mut self, path: &str, value: &str) -> Result<(), TrackingError> {
        self.ensure_active()?;
        self.cmi
            .set(&Element::parse(path), value)
            .map_err(|reason| TrackingError::Rejected {
                element: path.to_string(),
                reason,
            })
    }

    fn ensure_active(&self) -> Result<(), TrackingError> {
        match self.state {
            SessionState::Active => Ok(()),
            SessionState::Uninitialized => Err(TrackingError::NotInitialized),
            SessionState::Terminated => Err(TrackingError::Terminated),
        }
    }

    fn load(&self) -> Result<Option<Cmi>, crate::StorageError> {
        match self.storage.load(&self.key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn persist(&mut self) -> Result<(), TrackingError> {
        let json = serde_json::to_string(&self.cmi).map_err(crate::StorageError::from)?;
        self.storage.store(&self.key, &json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStorage, StorageError};

    /// Storage whose writes always fail.
    struct ReadOnly;

    impl Storage for ReadOnly {
        fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn store(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    #[test]
    fn lifecycle_transitions() {
        let mut session = Session::new(MemoryStorage::new());
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(matches!(session.finish(), Err(TrackingError::NotInitialized)));

        session.initialize().unwrap();
        assert!(matches!(
            session.initialize(),
            Err(TrackingError::AlreadyInitialized)
        ));

        session.finish().unwrap();
        assert_eq!(session.state(), SessionState::Terminated);
        assert!(matches!(session.initialize(), Err(TrackingError::Terminated)));
        assert!(matches!(session.finish(), Err(TrackingError::Terminated)));
    }

    #[test]
    fn access_requires_active_session() {
        let mut session = Session::new(MemoryStorage::new());
        assert!(matches!(
            session.get("cmi.core.lesson_status"),
            Err(TrackingError::NotInitialized)
        ));
        assert!(matches!(
            session.set("cmi.core.exit", "suspend"),
            Err(TrackingError::NotInitialized)
        ));
    }

    #[test]
    fn get_distinguishes_empty_from_missing() {
        let mut session = Session::new(MemoryStorage::new());
        session.initialize().unwrap();
        assert_eq!(session.get("cmi.core.exit").unwrap(), "");
        assert!(matches!(
            session.get("cmi.nothing.here"),
            Err(TrackingError::NotFound(_))
        ));
    }

    #[test]
    fn rejection_leaves_value_unchanged() {
        let mut session = Session::new(MemoryStorage::new());
        session.initialize().unwrap();
        session.set("cmi.core.score.raw", "85").unwrap();
        let err = session.set("cmi.core.score.raw", "150").unwrap_err();
        assert!(matches!(err, TrackingError::Rejected { .. }));
        assert_eq!(session.get("cmi.core.score.raw").unwrap(), "85");
    }

    #[test]
    fn corrupt_storage_falls_back_to_defaults() {
        let mut storage = MemoryStorage::new();
        storage.store(STORAGE_KEY, "not json").unwrap();

        let mut session = Session::new(storage);
        session.initialize().unwrap();
        assert_eq!(session.get("cmi.core.lesson_status").unwrap(), "not attempted");
    }

    #[test]
    fn failed_write_keeps_session_active() {
        let mut session = Session::new(ReadOnly);
        session.initialize().unwrap();
        assert!(matches!(session.commit(), Err(TrackingError::Storage(_))));
        assert!(matches!(session.finish(), Err(TrackingError::Storage(_))));
        assert_eq!(session.state(), SessionState::Active);
    }

    #[test]
    fn commit_persists_and_stays_active() {
        let mut storage = MemoryStorage::new();
        let mut session = Session::with_key(&mut storage, "course-a");
        session.initialize().unwrap();
        session.set("cmi.core.lesson_location", "page-4").unwrap();
        session.commit().unwrap();
        assert_eq!(session.state(), SessionState::Active);
        drop(session);

        let stored = storage.load("course-a").unwrap().unwrap();
        assert!(stored.contains("page-4"));
        assert_eq!(storage.load(STORAGE_KEY).unwrap(), None);
    }
}
