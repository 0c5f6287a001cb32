/// A fully received response.
///
/// Transports read the whole body before handing the response back, so a worker never holds a
/// half-consumed stream across the call into a response handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// The HTTP status code.
    pub status: u16,
    /// Response headers in the order they were received.
    pub headers: Vec<(String, String)>,
    /// The response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Gets all values for the specified header, compared case-insensitively.
    pub fn get_header(&self, header: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(header))
            .map(|(_, v)| v.as_str())
            .collect()
    }
}
