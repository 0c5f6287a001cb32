//! Response handlers: turning an [`AsyncResponse`] into a domain result or a typed error.
//!
//! A handler is chosen when a request is submitted and runs on the worker that executed the
//! request. Every handler sees transport failures first; the built-in ones then compare the
//! status code with the expected one and finally extract the value:
//!
//! | Constructor | Expected status | Success value | Mismatch error |
//! |---|---|---|---|
//! | [`create`] | 201 | `()` | [`Error::NotCreated`] |
//! | [`get`] | 200 | parsed JSON | [`Error::NotFound`] |
//! | [`get_as`] | 200 | JSON deserialized into `T` | [`Error::NotFound`] |
//! | [`delete`] | 200 | body text | [`Error::NotFound`] |
//! | [`query`] | 200 | parsed JSON | [`Error::NotFound`] with a custom label |
//! | [`status`] | 200 | body text | [`Error::ServerStatus`] |
//!
//! Any `Fn(&AsyncResponse) -> Result<T>` closure is a handler too.

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{AsyncResponse, Error, Result, StatusCode};

/// Maps the raw outcome of a request to a domain result.
pub trait ResponseHandler: Send + 'static {
    /// The value a successful request resolves to.
    type Output: Send + 'static;

    /// Interprets the response.
    fn handle(&self, response: &AsyncResponse) -> Result<Self::Output>;
}

impl<F, T> ResponseHandler for F
where
    F: Fn(&AsyncResponse) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    type Output = T;

    fn handle(&self, response: &AsyncResponse) -> Result<T> {
        self(response)
    }
}

/// Extracts the success value from a response whose status matched.
pub trait Extract: Send + 'static {
    /// The extracted value.
    type Output: Send + 'static;

    /// Extracts the value.
    fn extract(&self, response: &AsyncResponse) -> Result<Self::Output>;
}

/// Ignores the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

/// Parses the body as a JSON value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json;

/// Returns the body as lossily decoded text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Text;

/// Deserializes the body into `T`.
pub struct JsonAs<T>(PhantomData<fn() -> T>);

impl Extract for Discard {
    type Output = ();

    fn extract(&self, _response: &AsyncResponse) -> Result<()> {
        Ok(())
    }
}

impl Extract for Json {
    type Output = Value;

    fn extract(&self, response: &AsyncResponse) -> Result<Value> {
        response.json().cloned()
    }
}

impl Extract for Text {
    type Output = String;

    fn extract(&self, response: &AsyncResponse) -> Result<String> {
        Ok(response.text().into_owned())
    }
}

impl<T: DeserializeOwned + Send + 'static> Extract for JsonAs<T> {
    type Output = T;

    fn extract(&self, response: &AsyncResponse) -> Result<T> {
        response.json_as()
    }
}

impl<T> Default for JsonAs<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T> fmt::Debug for JsonAs<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JsonAs<{}>", std::any::type_name::<T>())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mismatch {
    NotCreated,
    NotFound(Cow<'static, str>),
    ServerStatus,
}

/// A handler expecting one status code, then extracting the value with `X`.
#[derive(Debug, Clone)]
pub struct Expect<X> {
    status: StatusCode,
    mismatch: Mismatch,
    extract: X,
}

/// A handler that expects `status` and discards the body. Mismatches are reported as
/// [`Error::NotFound`] until changed with one of the `or_*` methods.
pub fn expect(status: impl Into<StatusCode>) -> Expect<Discard> {
    Expect {
        status: status.into(),
        mismatch: Mismatch::NotFound("resource".into()),
        extract: Discard,
    }
}

/// Create-style calls: `201 Created`, nothing extracted.
pub fn create() -> Expect<Discard> {
    expect(StatusCode::CREATED).or_not_created()
}

/// Get-style calls: `200 OK`, body parsed as JSON.
pub fn get() -> Expect<Json> {
    expect(StatusCode::OK).extract(Json)
}

/// Get-style calls deserializing the body into `T`.
pub fn get_as<T: DeserializeOwned + Send + 'static>() -> Expect<JsonAs<T>> {
    expect(StatusCode::OK).extract(JsonAs::default())
}

/// Delete-style calls: `200 OK`, body returned as text.
pub fn delete() -> Expect<Text> {
    expect(StatusCode::OK).extract(Text)
}

/// Query-style calls: `200 OK`, body parsed as JSON; a mismatch names `what` was not found.
pub fn query(what: impl Into<Cow<'static, str>>) -> Expect<Json> {
    expect(StatusCode::OK).extract(Json).or_not_found(what)
}

/// Server status checks: `200 OK`, body returned as text.
pub fn status() -> Expect<Text> {
    expect(StatusCode::OK).extract(Text).or_server_status()
}

impl<X> Expect<X> {
    /// Replaces the extractor.
    pub fn extract<Y: Extract>(self, extract: Y) -> Expect<Y> {
        Expect {
            status: self.status,
            mismatch: self.mismatch,
            extract,
        }
    }

    /// Reports a status mismatch as [`Error::NotCreated`].
    pub fn or_not_created(mut self) -> Self {
        self.mismatch = Mismatch::NotCreated;
        self
    }

    /// Reports a status mismatch as [`Error::NotFound`] about `what`.
    pub fn or_not_found(mut self, what: impl Into<Cow<'static, str>>) -> Self {
        self.mismatch = Mismatch::NotFound(what.into());
        self
    }

    /// Reports a status mismatch as [`Error::ServerStatus`].
    pub fn or_server_status(mut self) -> Self {
        self.mismatch = Mismatch::ServerStatus;
        self
    }

    /// The expected status.
    pub fn expected_status(&self) -> StatusCode {
        self.status
    }

    fn mismatch_error(&self, response: &AsyncResponse, status: StatusCode) -> Error {
        let request = response.request().clone();
        let body = response.text().into_owned();
        match &self.mismatch {
            Mismatch::NotCreated => Error::NotCreated {
                request,
                status,
                body,
            },
            Mismatch::NotFound(what) => Error::NotFound {
                what: what.clone(),
                request,
                status,
                body,
            },
            Mismatch::ServerStatus => Error::ServerStatus {
                request,
                status,
                body,
            },
        }
    }
}

impl<X: Extract> ResponseHandler for Expect<X> {
    type Output = X::Output;

    fn handle(&self, response: &AsyncResponse) -> Result<X::Output> {
        let status = response.checked_status()?;
        if status != self.status {
            return Err(self.mismatch_error(response, status));
        }
        self.extract.extract(response)
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use serde::Deserialize;
    use serde_json::json;

    use pio_dispatch_interface::{Error as TransportError, Response as WireResponse};

    use super::*;
    use crate::PendingRequest;

    fn response(status: u16, body: &str) -> AsyncResponse {
        AsyncResponse::new(
            PendingRequest::get("/events/x.json"),
            Ok(WireResponse {
                status,
                headers: vec![],
                body: body.into(),
            }),
        )
    }

    fn timed_out() -> AsyncResponse {
        AsyncResponse::new(
            PendingRequest::post("/events.json"),
            Err(TransportError::RequestTimeout),
        )
    }

    #[test]
    fn test_get_parses_json() {
        let value = get().handle(&response(200, r#"{"id":"x"}"#)).unwrap();
        assert_eq!(value, json!({"id": "x"}));
    }

    #[test]
    fn test_get_not_found() {
        let err = get().handle(&response(404, "missing")).unwrap_err();
        match &err {
            Error::NotFound {
                what,
                status,
                body,
                request,
            } => {
                assert_eq!(what, "resource");
                assert_eq!(*status, 404);
                assert_eq!(body, "missing");
                assert_eq!(request.path(), "/events/x.json");
            }
            e => panic!("unexpected error: {e:?}"),
        }
        assert!(err.to_string().contains("status 404"));
    }

    #[test]
    fn test_create_expects_created() {
        assert!(create().handle(&response(201, "")).is_ok());
        let err = create().handle(&response(200, "{}")).unwrap_err();
        assert!(matches!(err, Error::NotCreated { status, .. } if status == 200));
    }

    #[test]
    fn test_delete_returns_body() {
        let body = delete().handle(&response(200, "deleted")).unwrap();
        assert_eq!(body, "deleted");
        assert!(matches!(
            delete().handle(&response(404, "")),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_query_names_what_was_missing() {
        let err = query("recommendation")
            .handle(&response(400, "bad query"))
            .unwrap_err();
        assert!(matches!(&err, Error::NotFound { what, .. } if what == "recommendation"));
        assert!(err.to_string().starts_with("recommendation not found"));
    }

    #[test]
    fn test_status_check() {
        let text = status().handle(&response(200, "alive")).unwrap();
        assert_eq!(text, "alive");
        assert!(matches!(
            status().handle(&response(503, "")),
            Err(Error::ServerStatus { .. })
        ));
    }

    #[test]
    fn test_get_as_deserializes() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Item {
            id: String,
        }
        let item = get_as::<Item>()
            .handle(&response(200, r#"{"id":"i1"}"#))
            .unwrap();
        assert_eq!(item, Item { id: "i1".into() });
        let err = get_as::<Item>()
            .handle(&response(200, r#"{"name":"i1"}"#))
            .unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
    }

    #[test]
    fn test_transport_error_precedes_status() {
        for err in [
            create().handle(&timed_out()).map(|_| ()).unwrap_err(),
            get().handle(&timed_out()).map(|_| ()).unwrap_err(),
            delete().handle(&timed_out()).map(|_| ()).unwrap_err(),
            status().handle(&timed_out()).map(|_| ()).unwrap_err(),
        ] {
            match err {
                Error::Transport { request, source } => {
                    assert_eq!(request.path(), "/events.json");
                    assert!(matches!(*source, TransportError::RequestTimeout));
                }
                e => panic!("unexpected error: {e:?}"),
            }
        }
    }

    #[test]
    fn test_custom_expectation_and_closure() {
        let accepted = expect(202u16).or_not_created();
        assert_eq!(accepted.expected_status(), 202);
        assert!(accepted.handle(&response(202, "")).is_ok());

        let closure = |res: &AsyncResponse| -> Result<usize> { Ok(res.body().len()) };
        assert_eq!(closure.handle(&response(500, "abc")).unwrap(), 3);

        let refused = AsyncResponse::new(
            PendingRequest::get("/"),
            Err(TransportError::Io(io::Error::from(io::ErrorKind::ConnectionRefused))),
        );
        assert!(get().handle(&refused).unwrap_err().is_transport());
    }
}
