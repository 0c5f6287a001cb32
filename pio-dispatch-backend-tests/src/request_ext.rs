use hyper::{body, Request};

pub trait RequestExt {
    /// First value of a query string parameter.
    fn query_param(&self, key: &str) -> Option<String>;
}

impl RequestExt for Request<body::Incoming> {
    fn query_param(&self, key: &str) -> Option<String> {
        let query = self.uri().query()?;
        form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}
