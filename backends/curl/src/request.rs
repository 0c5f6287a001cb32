use curl::easy::{Easy2, List};
use pio_dispatch_interface::transport::TransportOptions;
use pio_dispatch_interface::{Method, Request, Result as TransportResult};

use crate::error::IntoTransportResult;
use crate::handler::Collector;

pub(crate) fn populate_request(
    req: &Request,
    options: &TransportOptions,
    easy: &mut Easy2<Collector>,
) -> TransportResult<()> {
    easy.reset();
    easy.get_mut().reset(options.max_response_buffer_size);
    // Timeouts must not rely on SIGALRM, workers run on their own threads.
    easy.signal(false).into_transport_result("setopt CURLOPT_NOSIGNAL")?;
    if let Some(timeout) = options.request_timeout {
        easy.timeout(timeout)
            .into_transport_result("setopt CURLOPT_TIMEOUT_MS")?;
        easy.connect_timeout(timeout)
            .into_transport_result("setopt CURLOPT_CONNECTTIMEOUT_MS")?;
    }
    if let Some(user_agent) = options.user_agent.as_deref() {
        easy.useragent(user_agent)
            .into_transport_result("setopt CURLOPT_USERAGENT")?;
    }
    easy.url(&req.url).into_transport_result("setopt CURLOPT_URL")?;
    match req.method {
        Method::Get if req.body.is_none() => easy.get(true),
        Method::Get => easy.custom_request("GET"),
        Method::Post => easy.post(true),
        Method::Delete => easy.custom_request("DELETE"),
    }
    .into_transport_result("setopt method")?;

    let mut headers = List::new();
    for (name, value) in options.default_headers.iter().filter(|(name, _)| {
        !req.additional_headers
            .iter()
            .any(|(n, _)| n.eq_ignore_ascii_case(name))
    }) {
        headers
            .append(&format!("{name}: {value}"))
            .into_transport_result("curl_slist_append")?;
    }
    for (name, value) in &req.additional_headers {
        headers
            .append(&format!("{name}: {value}"))
            .into_transport_result("curl_slist_append")?;
    }
    match &req.body {
        Some(body) => {
            headers
                .append(&format!("content-type: {}", body.content_type))
                .into_transport_result("curl_slist_append")?;
            easy.post_fields_copy(&body.content)
                .into_transport_result("setopt CURLOPT_COPYPOSTFIELDS")?;
        }
        None if req.method == Method::Post => {
            easy.post_field_size(0)
                .into_transport_result("setopt CURLOPT_POSTFIELDSIZE")?;
        }
        None => {}
    }
    easy.http_headers(headers)
        .into_transport_result("setopt CURLOPT_HTTPHEADER")?;
    Ok(())
}
