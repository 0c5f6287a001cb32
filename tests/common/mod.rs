//! Scripted in-memory backend shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use pio_dispatch::interface::blocking::{BlockingBackend, BlockingTransport};
use pio_dispatch::interface::transport::{BuildTransportResult, TransportOptions};
use pio_dispatch::interface::{Method, Request, Response, Result};

/// A request as seen by the mock transport.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub worker: usize,
    pub method: Method,
    pub url: String,
    pub body: Option<String>,
}

type Responder = dyn Fn(&Request) -> Result<Response> + Send + Sync;

struct Shared {
    calls: Mutex<Vec<Recorded>>,
    gate_open: Mutex<bool>,
    gate: Condvar,
    transports: Mutex<Vec<TransportOptions>>,
    responder: Box<Responder>,
}

/// Backend whose transports answer through a closure, optionally held back by a gate.
#[derive(Clone)]
pub struct MockBackend {
    shared: Arc<Shared>,
}

pub struct MockTransport {
    worker: usize,
    shared: Arc<Shared>,
}

impl MockBackend {
    pub fn new(responder: impl Fn(&Request) -> Result<Response> + Send + Sync + 'static) -> Self {
        Self::with_gate(true, responder)
    }

    /// Transports record each call, then block until [`MockBackend::open_gate`].
    pub fn gated(responder: impl Fn(&Request) -> Result<Response> + Send + Sync + 'static) -> Self {
        Self::with_gate(false, responder)
    }

    fn with_gate(
        open: bool,
        responder: impl Fn(&Request) -> Result<Response> + Send + Sync + 'static,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                calls: Mutex::new(vec![]),
                gate_open: Mutex::new(open),
                gate: Condvar::new(),
                transports: Mutex::new(vec![]),
                responder: Box::new(responder),
            }),
        }
    }

    pub fn open_gate(&self) {
        *self
            .shared
            .gate_open
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = true;
        self.shared.gate.notify_all();
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.shared.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.shared.calls.lock().unwrap().len()
    }

    /// Waits until at least `n` calls have reached a transport.
    pub fn wait_for_calls(&self, n: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while self.call_count() < n {
            assert!(Instant::now() < deadline, "expected {n} calls");
            thread::sleep(Duration::from_millis(1));
        }
    }

    pub fn transport_options(&self) -> Vec<TransportOptions> {
        self.shared.transports.lock().unwrap().clone()
    }
}

impl BlockingBackend for MockBackend {
    type Transport = MockTransport;

    fn create_transport(&self, options: &TransportOptions) -> BuildTransportResult<MockTransport> {
        let mut transports = self.shared.transports.lock().unwrap();
        transports.push(options.clone());
        Ok(MockTransport {
            worker: transports.len() - 1,
            shared: self.shared.clone(),
        })
    }
}

impl BlockingTransport for MockTransport {
    fn execute(&mut self, req: Request) -> Result<Response> {
        self.shared.calls.lock().unwrap().push(Recorded {
            worker: self.worker,
            method: req.method,
            url: req.url.to_string(),
            body: req
                .body
                .as_ref()
                .map(|body| String::from_utf8_lossy(&body.content).into_owned()),
        });
        let open = self.shared.gate_open.lock().unwrap();
        drop(self.shared.gate.wait_while(open, |open| !*open).unwrap());
        (self.shared.responder)(&req)
    }
}

pub fn respond(status: u16, body: &str) -> Result<Response> {
    Ok(Response {
        status,
        headers: vec![("Content-Type".into(), "application/json".into())],
        body: body.as_bytes().to_vec(),
    })
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}
