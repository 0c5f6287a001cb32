use std::fmt;

use curl::easy::Easy2;
use pio_dispatch_interface::blocking::{BlockingBackend, BlockingTransport};
use pio_dispatch_interface::transport::{BuildTransportResult, TransportOptions};
use pio_dispatch_interface::{Error as TransportError, Request, Response, Result as TransportResult};

use crate::error::IntoTransportResult;
use crate::handler::Collector;
use crate::request::populate_request;

/// A transport backed by one libcurl easy handle.
pub struct CurlTransport {
    options: TransportOptions,
    easy: Easy2<Collector>,
}

impl CurlTransport {
    /// Creates a transport with its own easy handle.
    pub fn new(options: TransportOptions) -> Self {
        Self {
            options,
            easy: Easy2::new(Collector::default()),
        }
    }
}

impl BlockingTransport for CurlTransport {
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CurlTransport")
    }

    fn execute(&mut self, req: Request) -> TransportResult<Response> {
        populate_request(&req, &self.options, &mut self.easy)?;
        tracing::trace!(method = %req.method, url = %req.url, "curl perform");
        let performed = self.easy.perform().into_transport_result("curl_easy_perform");
        let state = self.easy.get_mut().take_state();
        if state.exceeded_max_size {
            return Err(TransportError::ResponseTooLarge);
        }
        if let Err(err) = performed {
            tracing::debug!(url = %req.url, error = %err, "curl transfer failed");
            return Err(err);
        }
        let status = self
            .easy
            .response_code()
            .into_transport_result("getinfo CURLINFO_RESPONSE_CODE")?;
        Ok(Response {
            status: status as u16,
            headers: state.response_headers,
            body: state.response_buffer,
        })
    }
}

impl BlockingBackend for crate::CurlBackend {
    type Transport = CurlTransport;

    fn create_transport(
        &self,
        options: &TransportOptions,
    ) -> BuildTransportResult<Self::Transport> {
        Ok(CurlTransport::new(options.clone()))
    }
}
