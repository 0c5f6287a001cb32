#![cfg(test)]

use std::{
    collections::BTreeMap,
    convert::Infallible,
    future::Future,
    io,
    net::SocketAddr,
    pin::Pin,
    sync::{LazyLock, Mutex, Once},
};

use http_body_util::{BodyExt, Full};
use hyper::{
    body::{self, Bytes},
    server::conn::http1,
    service::service_fn,
    Request, Response,
};
use hyper_util::rt::TokioIo;
use pio_dispatch::ConnectionBuilder;
use tokio::net::TcpListener;

mod fixtures;
mod request_ext;

pub use request_ext::RequestExt;

#[must_use]
struct HyperFixtureHandle(String);

impl Drop for HyperFixtureHandle {
    fn drop(&mut self) {
        let failed_request = {
            let mut services = HYPER_SERVICE_FIXTURES.lock().unwrap();
            services
                .remove(&*self.0)
                .expect("fixture not found")
                .assertion_failed_request
        };
        if let Some(req) = failed_request {
            panic!("assertion failed for request {}: {:?}", self.0, req);
        }
    }
}

type BoxedBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// The response to send, plus the request handed back when it failed the fixture's checks.
type FixtureAssertionResult = (Response<BoxedBody>, Result<(), String>);

type HyperServiceFixtureCallback = Box<
    dyn Fn(Request<body::Incoming>) -> Pin<Box<dyn Future<Output = FixtureAssertionResult> + Send>>
        + Send
        + Sync,
>;
struct HyperServiceFixture {
    svc: HyperServiceFixtureCallback,
    assertion_failed_request: Option<String>,
}

static HYPER_SERVICE_FIXTURES: Mutex<BTreeMap<String, HyperServiceFixture>> =
    Mutex::new(BTreeMap::new());

fn full(body: impl Into<Bytes>) -> BoxedBody {
    Full::new(body.into()).map_err(|_| unreachable!()).boxed()
}

/// Builds a response with `status` and `body`.
fn respond(status: u16, body: impl Into<Bytes>) -> Response<BoxedBody> {
    Response::builder()
        .status(status)
        .header(hyper::header::CONTENT_TYPE, "application/json")
        .body(full(body))
        .unwrap()
}

fn add_hyper_fixture<Fut>(
    url: impl Into<String>,
    svc_fn: impl Fn(Request<body::Incoming>) -> Fut + Send + Sync + 'static,
) -> HyperFixtureHandle
where
    Fut: Future<Output = FixtureAssertionResult> + Send + 'static,
{
    let mut url: String = url.into();
    if !url.starts_with('/') {
        url.insert(0, '/');
    }
    let svc = Box::new(move |req| Box::pin(svc_fn(req)) as _);
    let fixture = HyperServiceFixture {
        svc,
        assertion_failed_request: None,
    };
    {
        let url = url.clone();
        let mut services = HYPER_SERVICE_FIXTURES.lock().unwrap();
        services.insert(url, fixture);
    }
    HyperFixtureHandle(url)
}

async fn handle_service(req: Request<body::Incoming>) -> Result<Response<BoxedBody>, Infallible> {
    let path = req.uri().path().to_owned();
    let fut = {
        let services = HYPER_SERVICE_FIXTURES.lock().unwrap();
        match services.get(&*path) {
            Some(fixture) => (fixture.svc)(req),
            None => return Ok(respond(404, r#"{"message":"no fixture"}"#)),
        }
    };
    let (response, result) = fut.await;

    if let Err(req) = result {
        let mut services = HYPER_SERVICE_FIXTURES.lock().unwrap();
        if let Some(fixture) = services.get_mut(&*path) {
            fixture.assertion_failed_request = Some(req);
        }
    }

    Ok(response)
}

async fn setup_hyper_impl() -> Result<String, io::Error> {
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));

    let listener = TcpListener::bind(addr).await?;
    let port = listener.local_addr()?.port();

    tokio::spawn(async move {
        loop {
            let (stream, _) = listener.accept().await.expect("accept failed");
            let io = TokioIo::new(stream);

            tokio::task::spawn(async move {
                if let Err(err) = http1::Builder::new()
                    .serve_connection(io, service_fn(handle_service))
                    .await
                {
                    eprintln!("Error serving connection: {err:?}");
                }
            });
        }
    });

    Ok(format!("http://127.0.0.1:{port}"))
}

static TOKIO_RT: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
});

async fn init_builder() -> io::Result<ConnectionBuilder> {
    use tokio::sync::OnceCell;

    static BACKEND_INIT: Once = Once::new();
    BACKEND_INIT.call_once(init_backend);

    static HYPER_SERVICE_INIT: OnceCell<io::Result<String>> = OnceCell::const_new();
    match HYPER_SERVICE_INIT.get_or_init(setup_hyper_impl).await {
        Ok(url) => Ok(ConnectionBuilder::new(url.clone())),
        Err(err) => Err(io::Error::new(err.kind(), err.to_string())),
    }
}

/// A builder pointing at the fixture server, with the backend under test registered.
fn init_builder_blocking() -> io::Result<ConnectionBuilder> {
    TOKIO_RT.block_on(init_builder())
}

/// Reads a request body as JSON.
async fn read_json(req: Request<body::Incoming>) -> serde_json::Value {
    let body = req.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap_or_default()
}

macro_rules! declare_backends {
    ($(($feature:expr, $pkg:ident)),* $(,)*) => {
        cfg_if::cfg_if! {
            if #[cfg(any())] {
            } $(
                else if #[cfg(feature = $feature)] {
                    use $pkg as backend;
                }
            )* else {
                pub mod backend {
                    pub fn register() { }
                }
            }
        }

        #[allow(non_upper_case_globals)]
        let backend_feature_count = 0 $(+ cfg!(feature = $feature) as u32)*;
        match backend_feature_count {
            0 => panic!("No backend feature enabled."),
            1 => backend::register(),
            _ => panic!("Multiple backend features enabled."),
        }
    };
}

fn init_backend() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    declare_backends!(("curl", pio_dispatch_backend_curl),);
}
