//! Access to the remote asset data provider.
//!
//! The provider is a single HTTP endpoint driven by query parameters:
//! `opt` selects the operation and the rest are operation-specific
//! (`asset_id`, `var_id`, `units_mode`). Every response is a JSON envelope
//! `{"success": bool, "result": ...}`.
//!
//! HTTP itself sits behind the [`Transport`] trait so the directory can be
//! driven by any client. [`UreqTransport`] is the blocking implementation.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Endpoint the public provider serves from.
pub const DEFAULT_BASE_URL: &str = "http://nvs.nanoos.org/services/get_asset_info.php";

/// Operations the provider understands, sent as `opt=<name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Metadata for every asset.
    Meta,

    /// Timestamp of an asset's latest data.
    DataAge,

    /// Latest samples of one variable of one asset.
    RecentValues,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Meta => "meta",
            Self::DataAge => "data_age",
            Self::RecentValues => "recent_values",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced a response.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("provider unreachable: {0}")]
    Unreachable(String),

    #[error("failed to read response body: {0}")]
    Body(#[from] std::io::Error),
}

/// A blocking HTTP GET against the provider endpoint.
///
/// Non-success statuses are returned as responses, not errors; only a
/// failure to complete the exchange is a [`TransportError`].
pub trait Transport {
    fn get(&self, query: &[(&str, &str)]) -> Result<HttpResponse, TransportError>;
}

/// Errors from a provider operation.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider unavailable: {0}")]
    Unavailable(#[from] TransportError),

    #[error("{operation}: provider returned HTTP {status}")]
    HttpStatus { operation: Operation, status: u16 },

    #[error("{operation}: provider reported failure")]
    Rejected { operation: Operation },

    #[error("{operation}: malformed response: {source}")]
    InvalidResponse {
        operation: Operation,
        source: serde_json::Error,
    },

    #[error("{operation}: response has no result")]
    MissingResult { operation: Operation },
}

impl ProviderError {
    /// Whether the provider could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::HttpStatus { .. })
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    success: bool,
    result: Option<T>,
}

/// Typed access to provider operations over some transport.
#[derive(Debug, Clone)]
pub struct Provider<T> {
    transport: T,
}

impl<T: Transport> Provider<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Bare request with no parameters. Used for health checks.
    pub fn ping(&self) -> Result<HttpResponse, TransportError> {
        self.transport.get(&[])
    }

    /// Run an operation and decode the envelope's `result`.
    pub fn fetch<R: DeserializeOwned>(
        &self,
        operation: Operation,
        params: &[(&str, &str)],
    ) -> Result<R, ProviderError> {
        let mut query = Vec::with_capacity(params.len() + 1);
        query.push(("opt", operation.as_str()));
        query.extend_from_slice(params);

        debug!(%operation, ?params, "provider request");
        let response = self.transport.get(&query)?;
        if !response.is_success() {
            return Err(ProviderError::HttpStatus {
                operation,
                status: response.status,
            });
        }
        decode(operation, &response.body)
    }
}

fn decode<R: DeserializeOwned>(operation: Operation, body: &str) -> Result<R, ProviderError> {
    let envelope: Envelope<R> = serde_json::from_str(body)
        .map_err(|source| ProviderError::InvalidResponse { operation, source })?;
    if !envelope.success {
        return Err(ProviderError::Rejected { operation });
    }
    envelope
        .result
        .ok_or(ProviderError::MissingResult { operation })
}

/// [`Transport`] over a blocking `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    base_url: String,
}

impl UreqTransport {
    /// Creates a transport for `base_url`. `timeout` bounds each whole request.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            base_url: base_url.into(),
        }
    }
}

impl Transport for UreqTransport {
    fn get(&self, query: &[(&str, &str)]) -> Result<HttpResponse, TransportError> {
        let request = query
            .iter()
            .fold(self.agent.get(&self.base_url), |req, (key, value)| {
                req.query(key, value)
            });

        let response = match request.call() {
            Ok(response) | Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(e)) => {
                return Err(TransportError::Unreachable(e.to_string()));
            }
        };

        let status = response.status();
        let body = response.into_string()?;
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;

    /// Replies with a fixed response and remembers each query.
    struct Canned {
        response: HttpResponse,
        queries: RefCell<Vec<Vec<(String, String)>>>,
    }

    impl Canned {
        fn new(status: u16, body: &str) -> Self {
            Self {
                response: HttpResponse {
                    status,
                    body: body.to_string(),
                },
                queries: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for Canned {
        fn get(&self, query: &[(&str, &str)]) -> Result<HttpResponse, TransportError> {
            self.queries.borrow_mut().push(
                query
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
            );
            Ok(self.response.clone())
        }
    }

    #[test]
    fn operation_selector_comes_first() {
        let provider = Provider::new(Canned::new(200, r#"{"success": true, "result": []}"#));
        let _: Vec<u32> = provider
            .fetch(Operation::DataAge, &[("asset_id", "a1")])
            .unwrap();

        let queries = provider.transport.queries.borrow();
        assert_eq!(
            queries[0],
            vec![
                ("opt".to_string(), "data_age".to_string()),
                ("asset_id".to_string(), "a1".to_string()),
            ]
        );
    }

    #[test]
    fn decodes_result() {
        let provider = Provider::new(Canned::new(200, r#"{"success": true, "result": [1, 2]}"#));
        let result: Vec<u32> = provider.fetch(Operation::Meta, &[]).unwrap();
        assert_eq!(result, vec![1, 2]);
    }

    #[test]
    fn unsuccessful_envelope_is_rejected() {
        let provider = Provider::new(Canned::new(200, r#"{"success": false}"#));
        let err = provider.fetch::<Vec<u32>>(Operation::Meta, &[]).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Rejected {
                operation: Operation::Meta
            }
        ));
        assert!(!err.is_unavailable());
    }

    #[test]
    fn missing_result_is_an_error() {
        let provider = Provider::new(Canned::new(200, r#"{"success": true}"#));
        let err = provider.fetch::<Vec<u32>>(Operation::Meta, &[]).unwrap_err();
        assert!(matches!(err, ProviderError::MissingResult { .. }));
    }

    #[test]
    fn http_error_status_means_unavailable() {
        let provider = Provider::new(Canned::new(503, "down for maintenance"));
        let err = provider.fetch::<Vec<u32>>(Operation::Meta, &[]).unwrap_err();
        assert!(matches!(err, ProviderError::HttpStatus { status: 503, .. }));
        assert!(err.is_unavailable());
    }

    #[test]
    fn garbage_body_is_invalid_response() {
        let provider = Provider::new(Canned::new(200, "<html>"));
        let err = provider
            .fetch::<Vec<u32>>(Operation::RecentValues, &[])
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse { .. }));
        assert!(err.to_string().starts_with("recent_values: malformed response"));
    }

    #[test]
    fn ping_sends_no_parameters() {
        let provider = Provider::new(Canned::new(200, ""));
        assert!(provider.ping().unwrap().is_success());
        assert!(provider.transport.queries.borrow()[0].is_empty());
    }
}
