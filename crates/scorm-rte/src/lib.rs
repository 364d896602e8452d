//! SCORM runtime environment.
//!
//! Launched content reports progress through a string-typed API. This crate
//! provides:
//! - The `cmi` tracking tree with validation of the constrained elements
//! - A session state machine (uninitialized, active, terminated)
//! - Persistence of the tree to a key-value [`Storage`]
//! - The SCORM 1.2 and 2004 wire methods over one session
//!
//! # Example
//!
//! ```
//! use scorm_rte::{MemoryStorage, ScormApi};
//!
//! let mut api = ScormApi::new(MemoryStorage::new());
//! assert_eq!(api.lms_initialize(""), "true");
//! assert_eq!(api.lms_set_value("cmi.core.score.raw", "85"), "true");
//! assert_eq!(api.lms_get_value("cmi.core.score.raw"), "85");
//! assert_eq!(api.lms_finish(""), "true");
//! ```

mod api;
mod cmi;
mod element;
mod embed;
mod error;
mod session;
mod storage;

pub use api::{ScormApi, FALSE, NO_ERROR, TRUE};
pub use cmi::{
    Cmi, Core, Interaction, LessonStatus, Objective, Rejection, Score, StudentData,
    StudentPreference, SUSPEND_DATA_LIMIT,
};
pub use element::{
    CoreField, Element, InteractionField, ObjectiveField, PreferenceField, ScoreField,
    StudentDataField,
};
pub use embed::{ContentRegistration, API_2004_BINDING, API_BINDING};
pub use error::{diagnostic, error_string, StorageError, TrackingError, ERROR_CODES};
pub use session::{Session, SessionState};
pub use storage::{FileStorage, MemoryStorage, Storage, STORAGE_KEY};
