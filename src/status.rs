use std::fmt;

/// HTTP status code of a received response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct StatusCode(u16);

impl StatusCode {
    /// `200 OK`, expected by get-, delete- and query-style calls.
    pub const OK: Self = Self(200);
    /// `201 Created`, expected by create-style calls.
    pub const CREATED: Self = Self(201);
    /// `404 Not Found`.
    pub const NOT_FOUND: Self = Self(404);

    /// Wraps a raw code.
    #[inline]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// The raw code.
    #[inline]
    pub const fn code(self) -> u16 {
        self.0
    }
}

impl From<u16> for StatusCode {
    #[inline]
    fn from(code: u16) -> Self {
        Self::new(code)
    }
}

impl From<StatusCode> for u16 {
    #[inline]
    fn from(code: StatusCode) -> Self {
        code.0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl PartialEq<u16> for StatusCode {
    #[inline]
    fn eq(&self, other: &u16) -> bool {
        self.code() == *other
    }
}

impl PartialEq<StatusCode> for u16 {
    #[inline]
    fn eq(&self, other: &StatusCode) -> bool {
        *self == other.code()
    }
}
