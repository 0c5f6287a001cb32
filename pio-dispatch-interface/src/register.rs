use std::sync::OnceLock;

use crate::blocking::AnyBlockingBackend;

/// The backend registered through [`register_backend`].
pub static BACKEND: OnceLock<Box<dyn AnyBlockingBackend>> = OnceLock::new();

/// Registers the backend used by connections that are built without an explicit one.
///
/// # Panics
///
/// Panics if a backend has already been registered.
pub fn register_backend(backend: impl AnyBlockingBackend) {
    if BACKEND.set(Box::new(backend)).is_err() {
        panic!("Backend already registered");
    }
}
