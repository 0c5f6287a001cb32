//! Configuration options for transports.

use std::time::Duration;

/// Configuration options for creating a transport.
#[derive(Debug, Clone, Default)]
pub struct TransportOptions {
    /// Optional User-Agent header value to use for all requests.
    pub user_agent: Option<String>,
    /// Headers to include in all requests by default.
    pub default_headers: Vec<(String, String)>,
    /// Optional maximum buffer size for response bodies.
    pub max_response_buffer_size: Option<u64>,
    /// Optional upper bound on a whole request, connecting included.
    pub request_timeout: Option<Duration>,
}
