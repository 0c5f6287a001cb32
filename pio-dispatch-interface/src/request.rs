use std::borrow::Cow;
use std::fmt;

/// HTTP methods understood by the transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
}

impl Method {
    /// The method name as sent on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully buffered request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    /// Raw body bytes.
    pub content: Cow<'static, [u8]>,
    /// Value of the `content-type` header sent along with the body.
    pub content_type: Cow<'static, str>,
}

/// A wire-level request, ready to be executed by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The request method.
    pub method: Method,
    /// Absolute URL including the encoded query string.
    pub url: Cow<'static, str>,
    /// Headers sent in addition to the transport's default headers.
    pub additional_headers: Vec<(Cow<'static, str>, Cow<'static, str>)>,
    /// Optional request body.
    pub body: Option<Body>,
}
