use thiserror::Error;

/// Errors raised while building a window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    /// Custom client order does not cover every visible slot.
    #[error("client slot order has {found} entries, expected {expected}")]
    OrderLength {
        /// Number of visible slots.
        expected: usize,
        /// Entries supplied.
        found: usize,
    },
    /// Custom client order maps two client indices to one slot, or past the end.
    #[error("client slot order is not a bijection (server index {0} repeated or out of range)")]
    NotABijection(usize),
    /// Window exposes more slots than the protocol can address.
    #[error("window exposes {0} slots, more than the protocol allows")]
    TooManySlots(usize),
}
