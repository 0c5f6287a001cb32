use std::{
    env,
    fs::File,
    io::{BufRead, BufReader},
    time::{Duration, Instant},
};

use pio_dispatch::{handler, AsyncRequest, Connection, Error, PendingRequest};
use tracing_subscriber::EnvFilter;

struct Rating {
    user: String,
    item: String,
    rating: f64,
}

fn parse_line(line: &str) -> Option<Rating> {
    let mut fields = line.split(',').map(str::trim);
    let user = fields.next().filter(|s| !s.is_empty())?.to_owned();
    let item = fields.next().filter(|s| !s.is_empty())?.to_owned();
    let rating = fields.next()?.parse().ok()?;
    Some(Rating { user, item, rating })
}

fn rate_event(access_key: &str, rating: &Rating) -> PendingRequest {
    PendingRequest::post("/events.json")
        .with_query("accessKey", access_key)
        .with_field("event", "rate")
        .with_field("entityType", "user")
        .with_field("entityId", rating.user.as_str())
        .with_field("targetEntityType", "item")
        .with_field("targetEntityId", rating.item.as_str())
        .with_field("properties", serde_json::json!({ "rating": rating.rating }))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // setting up env
    let access_key =
        env::var("PIO_ACCESS_KEY").expect("Missing PIO_ACCESS_KEY environment variable");
    let url = env::var("PIO_EVENT_SERVER_URL").unwrap_or_else(|_| "http://localhost:7070".into());
    let threads = env::var("PIO_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(4);

    // setting up args
    let mut args = env::args();
    args.next();
    let path = args.next().expect("Missing arg1 as CSV file path");
    let file = File::open(&path).expect("Failed to open CSV file");

    let connection = Connection::builder(url)
        .threads(threads)
        .queue_capacity(threads * 16)
        .timeout(Duration::from_secs(10))
        .user_agent(concat!("batch-import/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to open connection");
    match connection.get_status() {
        Ok(status) => tracing::info!(%status, "event server is up"),
        Err(e) => {
            eprintln!("Event server is not reachable: {e}");
            std::process::exit(1);
        }
    }

    let started = Instant::now();
    let mut submitted: Vec<(usize, AsyncRequest<()>)> = vec![];
    let mut skipped = 0;
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.expect("Failed to read CSV file");
        let Some(rating) = parse_line(&line) else {
            tracing::warn!(line = index + 1, "skipping malformed line");
            skipped += 1;
            continue;
        };
        let request = connection
            .submit(rate_event(&access_key, &rating), handler::create())
            .expect("Connection closed while importing");
        submitted.push((index + 1, request));
    }
    tracing::info!(
        submitted = submitted.len(),
        pending = connection.pending_requests(),
        "all lines submitted"
    );

    let mut failed = 0;
    for (line, request) in &submitted {
        if let Err(e) = request.wait() {
            failed += 1;
            match e {
                Error::Transport { .. } => tracing::error!(line, error = %e, "network failure"),
                _ => tracing::warn!(line, error = %e, "event rejected"),
            }
        }
    }
    connection.close();

    println!(
        "Imported {} of {} ratings in {:.1?} ({} malformed lines skipped)",
        submitted.len() - failed,
        submitted.len(),
        started.elapsed(),
        skipped,
    );
}
