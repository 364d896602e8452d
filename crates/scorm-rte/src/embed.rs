//! Exposing the API to launched content.
//!
//! SCORM content finds its runtime by name: `API` for 1.2 and `API_1484_11`
//! for 2004. A [`ContentRegistration`] owns the API instance for one launch
//! and answers both names with it.

use crate::api::ScormApi;
use crate::storage::Storage;
use log::info;

/// Binding name SCORM 1.2 content looks up.
pub const API_BINDING: &str = "API";

/// Binding name SCORM 2004 content looks up.
pub const API_2004_BINDING: &str = "API_1484_11";

/// An API instance registered for one piece of launched content.
#[derive(Debug)]
pub struct ContentRegistration<S> {
    api: ScormApi<S>,
    launch_url: String,
}

impl<S: Storage> ContentRegistration<S> {
    /// Register `api` for the content at `launch_url`.
    pub fn register(api: ScormApi<S>, launch_url: impl Into<String>) -> Self {
        let launch_url = launch_url.into();
        info!(
            "registered {} and {} for {}",
            API_BINDING, API_2004_BINDING, launch_url
        );
        Self { api, launch_url }
    }

    #[must_use]
    pub fn launch_url(&self) -> &str {
        &self.launch_url
    }

    /// Look up the API by the name content asks for.
    pub fn binding(&mut self, name: &str) -> Option<&mut ScormApi<S>> {
        match name {
            API_BINDING | API_2004_BINDING => Some(&mut self.api),
            _ => None,
        }
    }

    pub fn api(&self) -> &ScormApi<S> {
        &self.api
    }

    /// Drop the bindings and hand back the API.
    pub fn unregister(self) -> ScormApi<S> {
        info!("unregistered API for {}", self.launch_url);
        self.api
    }
}
