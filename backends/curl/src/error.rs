use std::io::{self, ErrorKind};

use pio_dispatch_interface::{Error as TransportError, Result as TransportResult};

pub(crate) trait IntoTransportResult<T> {
    fn into_transport_result(self, ctx: &str) -> TransportResult<T>;
}

impl<T> IntoTransportResult<T> for Result<T, curl::Error> {
    fn into_transport_result(self, ctx: &str) -> TransportResult<T> {
        self.map_err(|e| {
            if e.is_operation_timedout() {
                return TransportError::RequestTimeout;
            }
            if e.is_url_malformed() || e.is_unsupported_protocol() {
                return TransportError::InvalidUrl;
            }
            let kind = if e.is_couldnt_connect() {
                ErrorKind::ConnectionRefused
            } else if e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy() {
                ErrorKind::NotFound
            } else if e.is_send_error() || e.is_recv_error() || e.is_got_nothing() {
                ErrorKind::ConnectionAborted
            } else {
                ErrorKind::Other
            };
            let message = match e.extra_description() {
                Some(extra) => format!("curl error:{ctx}:{}: {extra}", e.description()),
                None => format!("curl error:{ctx}:{}", e.description()),
            };
            TransportError::Io(io::Error::new(kind, message))
        })
    }
}
