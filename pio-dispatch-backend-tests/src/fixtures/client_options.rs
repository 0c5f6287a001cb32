#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use hyper::header::USER_AGENT;
    use pio_dispatch::interface::Error as TransportError;
    use pio_dispatch::{handler, Error, PendingRequest};

    use crate::*;

    const BODY: &str = r#"{"status":"slow"}"#;

    async fn delayed_response_handler(millis: u64) -> FixtureAssertionResult {
        tokio::time::sleep(Duration::from_millis(millis)).await;
        (respond(200, BODY), Ok(()))
    }

    #[test]
    fn test_request_timeout() {
        const PATH: &str = "client_options/request_timeout";
        const TIMEOUT: Duration = Duration::from_secs(1);
        let _handle = crate::add_hyper_fixture(PATH, |_| delayed_response_handler(30_000));

        let connection = crate::init_builder_blocking()
            .unwrap()
            .timeout(TIMEOUT)
            .build()
            .unwrap();
        let time_start = Instant::now();
        let err = connection
            .submit(PendingRequest::get(PATH), handler::get())
            .unwrap()
            .wait()
            .unwrap_err();
        let elapsed = time_start.elapsed();
        match err {
            Error::Transport { source, .. } => {
                assert!(matches!(*source, TransportError::RequestTimeout))
            }
            e => panic!("unexpected error: {e:?}"),
        }
        assert!(elapsed >= TIMEOUT, "gave up after {elapsed:?}");
        assert!(elapsed < TIMEOUT + Duration::from_secs(2), "took {elapsed:?}");
    }

    #[test]
    fn test_request_didnt_timeout() {
        const PATH: &str = "client_options/request_didnt_timeout";
        let _handle = crate::add_hyper_fixture(PATH, |_| delayed_response_handler(500));

        let connection = crate::init_builder_blocking()
            .unwrap()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();
        let res = connection
            .submit(PendingRequest::get(PATH), handler::delete())
            .unwrap()
            .wait()
            .unwrap();
        assert_eq!(res, BODY);
    }

    #[test]
    fn test_user_agent_and_headers() {
        const PATH: &str = "client_options/user_agent";
        const USER_AGENT_VALUE: &str = "pio-dispatch/1.0 (Test User Agent)";
        let _handle = crate::add_hyper_fixture(PATH, |req| async move {
            let header = |name| {
                req.headers()
                    .get(name)
                    .map(|v| v.to_str().unwrap().to_owned())
                    .unwrap_or_default()
            };
            let body = serde_json::json!({
                "userAgent": header(USER_AGENT),
                "channel": header(hyper::header::HeaderName::from_static("x-pio-channel")),
            });
            (respond(200, body.to_string()), Ok(()))
        });

        let connection = crate::init_builder_blocking()
            .unwrap()
            .user_agent(USER_AGENT_VALUE)
            .with_header("X-Pio-Channel", "batch")
            .build()
            .unwrap();
        let value = connection
            .submit(PendingRequest::get(PATH), handler::get())
            .unwrap()
            .wait()
            .unwrap();
        assert_eq!(value["userAgent"], USER_AGENT_VALUE);
        assert_eq!(value["channel"], "batch");
    }

    #[test]
    fn test_response_size_limit() {
        const PATH: &str = "client_options/response_size";
        let _handle = crate::add_hyper_fixture(PATH, |_| async move {
            (respond(200, vec![b'a'; 64 * 1024]), Ok(()))
        });

        let connection = crate::init_builder_blocking()
            .unwrap()
            .max_response_buffer_size(1024)
            .build()
            .unwrap();
        let err = connection
            .submit(PendingRequest::get(PATH), handler::delete())
            .unwrap()
            .wait()
            .unwrap_err();
        match err {
            Error::Transport { source, .. } => {
                assert!(matches!(*source, TransportError::ResponseTooLarge))
            }
            e => panic!("unexpected error: {e:?}"),
        }
    }
}
