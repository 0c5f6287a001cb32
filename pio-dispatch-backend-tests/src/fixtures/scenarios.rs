#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::thread;

    use pio_dispatch::{handler, PendingRequest};

    use crate::*;

    #[test]
    fn test_concurrent_submitters_bounded_queue() {
        const PATH: &str = "scenarios/concurrent";
        let _handle = crate::add_hyper_fixture(PATH, |_| async move {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            (respond(201, ""), Ok(()))
        });
        let connection = Arc::new(
            crate::init_builder_blocking()
                .unwrap()
                .threads(4)
                .queue_capacity(3)
                .build()
                .unwrap(),
        );
        let submitters: Vec<_> = (0..4)
            .map(|t| {
                let connection = connection.clone();
                thread::spawn(move || {
                    (0..10)
                        .map(|i| {
                            let request = PendingRequest::post(PATH)
                                .with_field("entityId", format!("u{t}-{i}"));
                            connection.submit(request, handler::create()).unwrap()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let handles: Vec<_> = submitters
            .into_iter()
            .flat_map(|s| s.join().unwrap())
            .collect();
        assert_eq!(handles.len(), 40);
        for handle in handles {
            handle.wait().unwrap();
        }
        assert_eq!(connection.pending_requests(), 0);
        connection.close();
    }

    #[test]
    fn test_single_worker_keeps_order() {
        const PATH: &str = "scenarios/ordered";
        let seen = Arc::new(Mutex::new(Vec::new()));
        let _handle = crate::add_hyper_fixture(PATH, {
            let seen = seen.clone();
            move |req| {
                let seen = seen.clone();
                async move {
                    let body = read_json(req).await;
                    seen.lock().unwrap().push(body["n"].as_u64().unwrap_or(u64::MAX));
                    (respond(201, ""), Ok(()))
                }
            }
        });
        let connection = crate::init_builder_blocking()
            .unwrap()
            .threads(1)
            .build()
            .unwrap();
        let handles: Vec<_> = (0..15u64)
            .map(|n| {
                connection
                    .submit(PendingRequest::post(PATH).with_field("n", n), handler::create())
                    .unwrap()
            })
            .collect();
        connection.close();
        for handle in handles {
            handle.wait().unwrap();
        }
        assert_eq!(*seen.lock().unwrap(), (0..15).collect::<Vec<_>>());
    }
}
