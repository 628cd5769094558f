//! Request identifiers used for log correlation.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier attached to a queued validation request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(Arc<str>);

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

impl RequestId {
    /// Create a new request id, unique within this process.
    #[must_use]
    pub fn next() -> Self {
        let n = REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(Arc::<str>::from(format!("val_{n}")))
    }

    /// Borrow the identifier as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique_and_prefixed() {
        let first = RequestId::next();
        let second = RequestId::next();

        assert_ne!(first, second);
        assert!(first.as_str().starts_with("val_"));
    }
}
