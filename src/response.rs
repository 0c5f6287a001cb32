use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;
use serde_json::Value;

use pio_dispatch_interface::{Error as TransportError, Response as WireResponse};

use crate::{Error, PendingRequest, Result, StatusCode};

/// The raw outcome of one dispatched request, handed to its response handler.
///
/// Either a received response (status, headers, body) or the transport error that prevented
/// receiving one. The JSON body is parsed on first use and cached.
pub struct AsyncResponse {
    request: Arc<PendingRequest>,
    outcome: std::result::Result<WireResponse, Arc<TransportError>>,
    json: OnceLock<std::result::Result<Value, Arc<serde_json::Error>>>,
}

impl AsyncResponse {
    /// Wraps the outcome of executing `request`.
    ///
    /// Workers build these; the constructor is public so response handlers can be tested
    /// without a connection.
    pub fn new(
        request: impl Into<Arc<PendingRequest>>,
        outcome: std::result::Result<WireResponse, TransportError>,
    ) -> Self {
        Self {
            request: request.into(),
            outcome: outcome.map_err(Arc::new),
            json: OnceLock::new(),
        }
    }

    /// The request this is the outcome of.
    pub fn request(&self) -> &Arc<PendingRequest> {
        &self.request
    }

    /// The transport error, if the exchange failed before a response was received.
    pub fn error(&self) -> Option<&Arc<TransportError>> {
        self.outcome.as_ref().err()
    }

    /// The status code, if a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        self.outcome.as_ref().ok().map(|res| res.status.into())
    }

    /// The first value of a response header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.outcome.as_ref().ok()?.get_header(name).into_iter().next()
    }

    /// The raw body; empty if no response was received.
    pub fn body(&self) -> &[u8] {
        match &self.outcome {
            Ok(res) => &res.body,
            Err(_) => &[],
        }
    }

    /// The body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.body())
    }

    /// The body parsed as JSON. Parsing happens at most once.
    pub fn json(&self) -> Result<&Value> {
        self.json
            .get_or_init(|| serde_json::from_slice(self.body()).map_err(Arc::new))
            .as_ref()
            .map_err(|source| self.json_error(source.clone()))
    }

    /// The body deserialized into `T`.
    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(self.body()).map_err(|e| self.json_error(Arc::new(e)))
    }

    /// The status code, or [`Error::Transport`] if no response was received.
    pub fn checked_status(&self) -> Result<StatusCode> {
        match &self.outcome {
            Ok(res) => Ok(res.status.into()),
            Err(source) => Err(Error::Transport {
                request: self.request.clone(),
                source: source.clone(),
            }),
        }
    }

    /// Converts the transport failure, if any, into [`Error::Transport`].
    pub fn transport_error(&self) -> Option<Error> {
        self.checked_status().err()
    }

    fn json_error(&self, source: Arc<serde_json::Error>) -> Error {
        Error::Json {
            request: self.request.clone(),
            source,
        }
    }
}

impl fmt::Debug for AsyncResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncResponse")
            .field("request", &self.request)
            .field("status", &self.status())
            .field("error", &self.error())
            .field("body_len", &self.body().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use serde_json::json;

    use super::*;

    fn ok(status: u16, body: &str) -> AsyncResponse {
        AsyncResponse::new(
            PendingRequest::get("/events/x.json"),
            Ok(WireResponse {
                status,
                headers: vec![("Content-Type".into(), "application/json".into())],
                body: body.into(),
            }),
        )
    }

    #[test]
    fn test_received_response() {
        let res = ok(200, r#"{"id":"x"}"#);
        assert_eq!(res.status(), Some(StatusCode::OK));
        assert_eq!(res.checked_status().unwrap(), StatusCode::OK);
        assert!(res.error().is_none());
        assert!(res.transport_error().is_none());
        assert_eq!(res.header("content-type"), Some("application/json"));
        assert_eq!(res.text(), r#"{"id":"x"}"#);
        assert_eq!(res.json().unwrap(), &json!({"id": "x"}));
        // cached parse hands out the same value
        assert!(std::ptr::eq(res.json().unwrap(), res.json().unwrap()));
    }

    #[test]
    fn test_malformed_json() {
        let res = ok(200, "not json");
        let err = res.json().unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
        assert_eq!(err.request().unwrap().path(), "/events/x.json");
    }

    #[test]
    fn test_transport_failure() {
        let res = AsyncResponse::new(
            PendingRequest::get("/"),
            Err(TransportError::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "refused",
            ))),
        );
        assert_eq!(res.status(), None);
        assert!(res.body().is_empty());
        assert!(res.header("content-type").is_none());
        let err = res.transport_error().unwrap();
        assert!(err.is_transport());
        assert!(err.to_string().contains("refused"));
    }
}
