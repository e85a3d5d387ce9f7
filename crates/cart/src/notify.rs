//! User-facing failure notices.
//!
//! The cart store is the only producer in this subsystem, and it sends
//! exactly four message classes. Notices are one-way and fire-and-forget:
//! emitting one never fails and never blocks the operation that raised it.

use std::fmt;

/// Classes of user-facing cart failure notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartNotice {
    /// Requested quantity exceeds the available stock.
    OutOfStock,
    /// Adding a product failed.
    AddFailed,
    /// Removing a product failed.
    RemoveFailed,
    /// Changing a product amount failed.
    UpdateFailed,
}

impl CartNotice {
    /// User-facing message for this notice.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::OutOfStock => "Requested quantity is out of stock",
            Self::AddFailed => "Error adding product",
            Self::RemoveFailed => "Error removing product",
            Self::UpdateFailed => "Error updating product amount",
        }
    }
}

impl fmt::Display for CartNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// One-way user notification sink.
pub trait Notifier: Send + Sync {
    /// Surface an error notice to the user.
    fn error(&self, notice: CartNotice);
}

/// Notifier that routes notices to the `tracing` error stream.
///
/// The terminal analog of a toast popup: with a subscriber installed the
/// notice reaches the user's display.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, notice: CartNotice) {
        tracing::error!(notice = ?notice, "{notice}");
    }
}
