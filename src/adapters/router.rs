use std::collections::HashMap;
use std::sync::Arc;

use crate::controllers::streaming::errors::{DeliveryError, NetworkError};
use crate::controllers::streaming::ports::ComputeBackend;
use crate::core::actions::cancellation::CancelSignal;
use crate::core::data::render_request::RenderRequest;
use crate::core::data::rendered_rows::RenderedRows;

/// Picks a backend by the request's method selector.
#[derive(Clone, Default)]
pub struct BackendRouter {
    routes: HashMap<String, Arc<dyn ComputeBackend>>,
}

impl BackendRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_route(mut self, method: impl Into<String>, backend: Arc<dyn ComputeBackend>) -> Self {
        self.add_route(method, backend);
        self
    }

    /// Replaces any backend already registered for `method`.
    pub fn add_route(&mut self, method: impl Into<String>, backend: Arc<dyn ComputeBackend>) {
        self.routes.insert(method.into(), backend);
    }

    #[must_use]
    pub fn methods(&self) -> Vec<&str> {
        let mut methods: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        methods.sort_unstable();
        methods
    }
}

impl ComputeBackend for BackendRouter {
    fn compute(
        &self,
        method: &str,
        request: &RenderRequest,
        cancel: &CancelSignal,
    ) -> Result<RenderedRows, DeliveryError> {
        let backend = self
            .routes
            .get(method)
            .ok_or_else(|| NetworkError::UnknownBackend(method.to_owned()))?;

        backend.compute(method, request, cancel)
    }
}
