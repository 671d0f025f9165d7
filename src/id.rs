//! Identifier providers injected into battery and site construction.

/// Yields a fresh unique identifier per call.
///
/// Any `FnMut() -> String` closure is a provider, so tests can hand in fixed
/// sequences.
pub trait IdProvider {
    fn next_id(&mut self) -> String;
}

impl<F: FnMut() -> String> IdProvider for F {
    fn next_id(&mut self) -> String {
        self()
    }
}

/// Monotonic `"{prefix}-{n}"` identifiers starting at 1.
///
/// # Examples
///
/// ```
/// use battery_sim::id::{IdProvider, SequentialIds};
///
/// let mut ids = SequentialIds::new("battery");
/// assert_eq!(ids.next_id(), "battery-1");
/// assert_eq!(ids.next_id(), "battery-2");
/// ```
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdProvider for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
