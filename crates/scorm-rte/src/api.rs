//! The SCORM wire contract.
//!
//! Content calls the API with strings and expects strings back: `"true"` /
//! `"false"` for commands, the value or `""` for reads. [`ScormApi`] exposes
//! the SCORM 1.2 names (`LMSInitialize`, ...) and the SCORM 2004 names
//! (`Initialize`, ...) side by side over one [`Session`], and collapses every
//! [`TrackingError`] into those sentinels.

use crate::error::{diagnostic, error_string};
use crate::session::{Session, SessionState};
use crate::storage::Storage;
use crate::TrackingError;
use log::{debug, warn};

pub const TRUE: &str = "true";
pub const FALSE: &str = "false";

/// Code returned by `LMSGetLastError`.
pub const NO_ERROR: &str = "0";

/// A SCORM runtime API instance.
#[derive(Debug)]
pub struct ScormApi<S> {
    session: Session<S>,
}

impl<S: Storage> ScormApi<S> {
    /// An API over a fresh session with default storage key.
    pub fn new(storage: S) -> Self {
        Self {
            session: Session::new(storage),
        }
    }

    pub fn from_session(session: Session<S>) -> Self {
        Self { session }
    }

    /// The typed session behind the wire methods.
    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn into_session(self) -> Session<S> {
        self.session
    }

    // SCORM 1.2

    pub fn lms_initialize(&mut self, _param: &str) -> &'static str {
        wire_bool("LMSInitialize", self.session.initialize())
    }

    pub fn lms_finish(&mut self, _param: &str) -> &'static str {
        wire_bool("LMSFinish", self.session.finish())
    }

    pub fn lms_commit(&mut self, _param: &str) -> &'static str {
        wire_bool("LMSCommit", self.session.commit())
    }

    pub fn lms_get_value(&self, element: &str) -> String {
        match self.session.get(element) {
            Ok(value) => {
                debug!("LMSGetValue({}) = {:?}", element, value);
                value.to_string()
            }
            Err(e) => {
                debug!("LMSGetValue({}) failed [{}]: {}", element, e.scorm_code(), e);
                String::new()
            }
        }
    }

    pub fn lms_set_value(&mut self, element: &str, value: &str) -> &'static str {
        match self.session.set(element, value) {
            Ok(()) => {
                debug!("LMSSetValue({}, {:?}) accepted", element, value);
                TRUE
            }
            Err(e) => {
                warn!("LMSSetValue({}) failed [{}]: {}", element, e.scorm_code(), e);
                FALSE
            }
        }
    }

    /// Always `"0"`; failures are reported through return values only.
    pub fn lms_get_last_error(&self) -> &'static str {
        NO_ERROR
    }

    pub fn lms_get_error_string(&self, code: &str) -> &'static str {
        error_string(code)
    }

    pub fn lms_get_diagnostic(&self, code: &str) -> String {
        diagnostic(code)
    }

    // SCORM 2004

    pub fn initialize(&mut self, param: &str) -> &'static str {
        self.lms_initialize(param)
    }

    pub fn terminate(&mut self, param: &str) -> &'static str {
        self.lms_finish(param)
    }

    /// Same as [`Self::lms_finish`]: a 2004 `Commit` ends the session.
    pub fn commit(&mut self, param: &str) -> &'static str {
        self.lms_finish(param)
    }

    pub fn get_value(&self, element: &str) -> String {
        self.lms_get_value(element)
    }

    pub fn set_value(&mut self, element: &str, value: &str) -> &'static str {
        self.lms_set_value(element, value)
    }

    pub fn get_last_error(&self) -> &'static str {
        self.lms_get_last_error()
    }

    pub fn get_error_string(&self, code: &str) -> &'static str {
        self.lms_get_error_string(code)
    }

    pub fn get_diagnostic(&self, code: &str) -> String {
        self.lms_get_diagnostic(code)
    }

    /// Call a method by its SCORM name.
    ///
    /// Missing arguments are treated as `""`. Returns `None` for names that
    /// are not part of either API.
    pub fn invoke(&mut self, method: &str, args: &[&str]) -> Option<String> {
        let arg = |i: usize| args.get(i).copied().unwrap_or_default();

        let result = match method {
            "LMSInitialize" => self.lms_initialize(arg(0)).to_string(),
            "LMSFinish" => self.lms_finish(arg(0)).to_string(),
            "LMSCommit" => self.lms_commit(arg(0)).to_string(),
            "LMSGetValue" => self.lms_get_value(arg(0)),
            "LMSSetValue" => self.lms_set_value(arg(0), arg(1)).to_string(),
            "LMSGetLastError" => self.lms_get_last_error().to_string(),
            "LMSGetErrorString" => self.lms_get_error_string(arg(0)).to_string(),
            "LMSGetDiagnostic" => self.lms_get_diagnostic(arg(0)),
            "Initialize" => self.initialize(arg(0)).to_string(),
            "Terminate" => self.terminate(arg(0)).to_string(),
            "Commit" => self.commit(arg(0)).to_string(),
            "GetValue" => self.get_value(arg(0)),
            "SetValue" => self.set_value(arg(0), arg(1)).to_string(),
            "GetLastError" => self.get_last_error().to_string(),
            "GetErrorString" => self.get_error_string(arg(0)).to_string(),
            "GetDiagnostic" => self.get_diagnostic(arg(0)),
            _ => return None,
        };
        Some(result)
    }
}

fn wire_bool(method: &str, result: Result<(), TrackingError>) -> &'static str {
    match result {
        Ok(()) => {
            debug!("{}() = true", method);
            TRUE
        }
        Err(e) => {
            warn!("{}() failed [{}]: {}", method, e.scorm_code(), e);
            FALSE
        }
    }
}
