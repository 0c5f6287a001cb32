use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use pio_dispatch_interface::{Body, Method, Request as WireRequest};

/// An immutable description of one outbound call: method, path, query and JSON body fields.
///
/// Requests are built with the consuming `with_*` methods and never change once submitted; the
/// connection shares them behind an `Arc` between the caller's handle, the worker and any error
/// reported about them.
///
/// ```
/// use pio_dispatch::PendingRequest;
///
/// let req = PendingRequest::post("/events.json")
///     .with_query("accessKey", "my-key")
///     .with_field("event", "$set")
///     .with_field("entityType", "user")
///     .with_field("entityId", "u1");
/// assert_eq!(req.to_string(), "POST /events.json?accessKey=my-key");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Map<String, Value>,
}

impl PendingRequest {
    /// Creates a request without query parameters or body fields.
    ///
    /// The path is appended to the connection's base URL; a leading `/` is added if missing.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let mut path = path.into();
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        Self {
            method,
            path,
            query: vec![],
            body: Map::new(),
        }
    }

    /// Creates a `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Creates a `POST` request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Creates a `DELETE` request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Appends a query parameter. Keys may repeat; order is preserved.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets a body field, replacing any previous value under the same key.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.insert(key.into(), value.into());
        self
    }

    /// Sets every field of `fields`, replacing previous values under the same keys.
    pub fn with_fields(mut self, fields: Map<String, Value>) -> Self {
        self.body.extend(fields);
        self
    }

    /// Sets the fields of any value that serializes to a JSON object.
    pub fn with_json<T: Serialize + ?Sized>(self, value: &T) -> serde_json::Result<Self> {
        match serde_json::to_value(value)? {
            Value::Object(fields) => Ok(self.with_fields(fields)),
            other => Err(serde::ser::Error::custom(format_args!(
                "request body must be a JSON object, got {other}"
            ))),
        }
    }

    /// The request method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// The path relative to the connection's base URL.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters in insertion order.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Body fields.
    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Path and form-urlencoded query string.
    pub fn relative_uri(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&self.query)
            .finish();
        format!("{}?{query}", self.path)
    }

    /// Builds the wire request against `base_url`. A non-empty body is sent as JSON.
    pub(crate) fn to_wire(&self, base_url: &str) -> serde_json::Result<WireRequest> {
        let body = if self.body.is_empty() {
            None
        } else {
            Some(Body {
                content: serde_json::to_vec(&self.body)?.into(),
                content_type: "application/json".into(),
            })
        };
        Ok(WireRequest {
            method: self.method,
            url: format!("{base_url}{}", self.relative_uri()).into(),
            additional_headers: vec![],
            body,
        })
    }
}

impl fmt::Display for PendingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.relative_uri())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_relative_uri_encodes_query() {
        let req = PendingRequest::get("events/abc.json")
            .with_query("accessKey", "k&1")
            .with_query("channel", "c h")
            .with_query("channel", "second");
        assert_eq!(req.path(), "/events/abc.json");
        assert_eq!(
            req.relative_uri(),
            "/events/abc.json?accessKey=k%261&channel=c+h&channel=second"
        );
    }

    #[test]
    fn test_to_wire_json_body() {
        let req = PendingRequest::post("/queries.json")
            .with_field("user", "u1")
            .with_field("num", 4);
        let wire = req.to_wire("http://localhost:8000").unwrap();
        assert_eq!(wire.method, Method::Post);
        assert_eq!(wire.url, "http://localhost:8000/queries.json");
        let body = wire.body.unwrap();
        assert_eq!(body.content_type, "application/json");
        let sent: Value = serde_json::from_slice(&body.content).unwrap();
        assert_eq!(sent, json!({"user": "u1", "num": 4}));
    }

    #[test]
    fn test_to_wire_without_body() {
        let wire = PendingRequest::delete("/events/x.json")
            .to_wire("https://example.com/api")
            .unwrap();
        assert_eq!(wire.method, Method::Delete);
        assert_eq!(wire.url, "https://example.com/api/events/x.json");
        assert!(wire.body.is_none());
    }

    #[test]
    fn test_with_json() {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Event<'a> {
            event: &'a str,
            entity_type: &'a str,
            entity_id: &'a str,
        }
        let req = PendingRequest::post("/events.json")
            .with_json(&Event {
                event: "$set",
                entity_type: "user",
                entity_id: "u1",
            })
            .unwrap();
        assert_eq!(
            Value::Object(req.body().clone()),
            json!({"event": "$set", "entityType": "user", "entityId": "u1"})
        );

        let err = PendingRequest::post("/events.json")
            .with_json(&[1, 2])
            .unwrap_err();
        assert!(err.to_string().contains("must be a JSON object"));
    }
}
