//! Client-side output cap.

/// Counts records handed to the presenter and reports when the cap is hit.
///
/// A cap of zero or `None` means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputGovernor {
    cap: Option<u64>,
    produced: u64,
}

impl OutputGovernor {
    /// Creates a governor enforcing `cap`.
    #[must_use]
    pub fn new(cap: Option<u64>) -> Self {
        Self {
            cap: cap.filter(|limit| *limit > 0),
            produced: 0,
        }
    }

    /// Configured cap, if any.
    #[must_use]
    pub const fn cap(&self) -> Option<u64> {
        self.cap
    }

    /// Records produced so far.
    #[must_use]
    pub const fn produced(&self) -> u64 {
        self.produced
    }

    /// True when no further record may be produced.
    #[must_use]
    pub fn cap_reached(&self) -> bool {
        self.cap.is_some_and(|limit| self.produced >= limit)
    }

    /// Counts one produced record.
    pub fn record_produced(&mut self) {
        self.produced = self.produced.saturating_add(1);
    }
}
