use std::io::Read;
use std::time::Duration;

use log::debug;

use crate::adapters::http::wire::{ComputeQuery, JSON_CONTENT_TYPE, PNG_CONTENT_TYPE, decode_response};
use crate::controllers::streaming::errors::{DeliveryError, NetworkError};
use crate::controllers::streaming::ports::ComputeBackend;
use crate::core::actions::cancellation::{CancelSignal, CancelToken};
use crate::core::data::render_request::RenderRequest;
use crate::core::data::rendered_rows::RenderedRows;

/// Largest response body read from a worker.
const MAX_RESPONSE_BYTES: u64 = 256 * 1024 * 1024;

/// Calls a remote compute worker over HTTP.
///
/// The request is a GET with the parameters in the query string; the worker
/// may answer with JSON or PNG. A call cannot be interrupted once sent, so
/// cancellation is only observed before sending and after the body arrives.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    agent: ureq::Agent,
    endpoint: String,
}

impl HttpBackend {
    /// `endpoint` is the full compute URL, e.g. `http://127.0.0.1:6001/compute`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Self {
            agent: builder.build(),
            endpoint: endpoint.into(),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url_for(&self, method: &str, request: &RenderRequest) -> Result<String, NetworkError> {
        let query = serde_urlencoded::to_string(ComputeQuery::from_request(Some(method), request))
            .map_err(|err| NetworkError::Transport(format!("cannot encode query: {err}")))?;

        Ok(format!("{}?{query}", self.endpoint))
    }
}

impl ComputeBackend for HttpBackend {
    fn compute(
        &self,
        method: &str,
        request: &RenderRequest,
        cancel: &CancelSignal,
    ) -> Result<RenderedRows, DeliveryError> {
        let url = self.url_for(method, request)?;

        if cancel.is_cancelled() {
            return Err(DeliveryError::Cancelled);
        }
        debug!("GET {url}");

        let response = match self
            .agent
            .get(&url)
            .set("Accept", &format!("{JSON_CONTENT_TYPE}, {PNG_CONTENT_TYPE}"))
            .call()
        {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                let body = response.into_string().unwrap_or_default();
                return Err(NetworkError::Status { code, body }.into());
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(NetworkError::Transport(transport.to_string()).into());
            }
        };

        let content_type = response.content_type().to_owned();
        let mut body = Vec::new();
        response
            .into_reader()
            .take(MAX_RESPONSE_BYTES)
            .read_to_end(&mut body)
            .map_err(|err| NetworkError::Transport(format!("reading response body: {err}")))?;

        if cancel.is_cancelled() {
            return Err(DeliveryError::Cancelled);
        }

        Ok(decode_response(&content_type, &body, request)?)
    }
}
