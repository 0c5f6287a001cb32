use curl::easy::{Handler, WriteError};

#[derive(Debug, Default)]
pub(crate) struct ResponseState {
    pub(crate) response_headers: Vec<(String, String)>,
    pub(crate) response_buffer: Vec<u8>,
    pub(crate) exceeded_max_size: bool,
}

/// Collects the response of the easy handle it is attached to.
#[derive(Debug, Default)]
pub(crate) struct Collector {
    pub(crate) state: ResponseState,
    max_response_buffer_size: Option<u64>,
}

impl Collector {
    pub(crate) fn reset(&mut self, max_response_buffer_size: Option<u64>) {
        self.state = ResponseState::default();
        self.max_response_buffer_size = max_response_buffer_size;
    }

    pub(crate) fn take_state(&mut self) -> ResponseState {
        std::mem::take(&mut self.state)
    }
}

impl ResponseState {
    fn push_header_data(&mut self, data: &[u8]) {
        let line = data.strip_suffix(b"\r\n").unwrap_or(data);
        if line.is_empty() {
            return;
        }
        if line.starts_with(b"HTTP/") {
            // A new status line starts another header block, e.g. after `100 Continue` or a
            // redirect. Only the headers of the last block belong to the response.
            self.response_headers.clear();
            return;
        }
        let Some((name, value)) = std::str::from_utf8(line)
            .ok()
            .and_then(|line| line.split_once(':'))
        else {
            return;
        };
        self.response_headers
            .push((name.trim().to_owned(), value.trim().to_owned()));
    }
}

impl Handler for Collector {
    fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        if let Some(max) = self.max_response_buffer_size {
            if (self.state.response_buffer.len() + data.len()) as u64 > max {
                self.state.exceeded_max_size = true;
                // Returning a short count aborts the transfer with CURLE_WRITE_ERROR.
                return Ok(0);
            }
        }
        self.state.response_buffer.extend_from_slice(data);
        Ok(data.len())
    }

    fn header(&mut self, data: &[u8]) -> bool {
        self.state.push_header_data(data);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_block_after_continue() {
        let mut state = ResponseState::default();
        for line in [
            &b"HTTP/1.1 100 Continue\r\n"[..],
            b"X-Interim: 1\r\n",
            b"\r\n",
            b"HTTP/1.1 201 Created\r\n",
            b"Content-Type: application/json\r\n",
            b"Content-Length: 2\r\n",
            b"\r\n",
        ] {
            state.push_header_data(line);
        }
        assert_eq!(
            state.response_headers,
            [
                ("Content-Type".to_owned(), "application/json".to_owned()),
                ("Content-Length".to_owned(), "2".to_owned()),
            ]
        );
    }

    #[test]
    fn test_write_respects_max_size() {
        let mut collector = Collector::default();
        collector.reset(Some(4));
        assert_eq!(collector.write(b"abc").unwrap(), 3);
        assert_eq!(collector.write(b"de").unwrap(), 0);
        assert!(collector.state.exceeded_max_size);
        assert_eq!(collector.take_state().response_buffer, b"abc");
    }
}
