//! Configuration options for connections.

use std::time::Duration;

use pio_dispatch_interface::transport::TransportOptions;

/// Event server address used when none is given.
pub const DEFAULT_URL: &str = "http://localhost:7070";
/// Upper bound on one network call used when none is given.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration options for opening a [`crate::Connection`].
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    /// Base URL every request path is appended to. Must use `http` or `https` and name a host;
    /// it may carry a path prefix.
    pub url: String,
    /// Number of worker threads, each with its own transport. Must be at least 1.
    pub threads: usize,
    /// Maximum number of queued requests before `submit` blocks. `0` means unbounded.
    pub queue_capacity: usize,
    /// Upper bound on each network call, connecting included. [`Duration::ZERO`] disables it.
    pub timeout: Duration,
    /// Optional User-Agent header value to use for all requests.
    pub user_agent: Option<String>,
    /// Headers to include in all requests by default.
    pub default_headers: Vec<(String, String)>,
    /// Optional maximum buffer size for response bodies.
    pub max_response_buffer_size: Option<u64>,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.into(),
            threads: 1,
            queue_capacity: 0,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            default_headers: vec![],
            max_response_buffer_size: None,
        }
    }
}

impl ConnectionOptions {
    pub(crate) fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            user_agent: self.user_agent.clone(),
            default_headers: self.default_headers.clone(),
            max_response_buffer_size: self.max_response_buffer_size,
            request_timeout: (!self.timeout.is_zero()).then_some(self.timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ConnectionOptions::default();
        assert_eq!(options.url, "http://localhost:7070");
        assert_eq!(options.threads, 1);
        assert_eq!(options.queue_capacity, 0);
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(
            options.transport_options().request_timeout,
            Some(Duration::from_secs(5))
        );
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let options = ConnectionOptions {
            timeout: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(options.transport_options().request_timeout, None);
    }
}
