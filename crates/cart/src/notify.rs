//! Notification sink for human-readable warnings.
//!
//! Rejected and failed mutations push one of the fixed messages in
//! [`warnings`] through the sink. This is fire-and-forget: the sink is how a
//! human learns why nothing happened, not part of the operation's result.

/// The fixed warning messages the store emits.
pub mod warnings {
    /// A mutation asked for more units than the inventory service has.
    pub const OUT_OF_STOCK: &str = "requested quantity exceeds available stock";
    /// Adding a product failed (collaborator or persistence error).
    pub const ADD_FAILED: &str = "failed to add product";
    /// Removing a product failed (no such entry or persistence error).
    pub const REMOVE_FAILED: &str = "failed to remove product";
    /// Changing a product's quantity failed.
    pub const UPDATE_FAILED: &str = "failed to change product quantity";
}

/// Receives human-readable warnings from the store.
pub trait NotificationSink {
    /// Deliver one warning message.
    fn warn(&self, message: &str);
}

/// Sink that forwards warnings to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }
}
