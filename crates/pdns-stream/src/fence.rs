//! Time fencing.
//!
//! A fence turns the user's `after`/`before` intent into the four bounds the
//! server understands. Without `complete` an observation only has to overlap
//! the fence; with it the observation must lie entirely inside.

use thiserror::Error;

use crate::descriptor::QueryDescriptor;

/// The four optional time bounds sent with a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeFence {
    /// Observation must begin after this instant.
    pub first_after: Option<u64>,
    /// Observation must begin before this instant.
    pub first_before: Option<u64>,
    /// Observation must end after this instant.
    pub last_after: Option<u64>,
    /// Observation must end before this instant.
    pub last_before: Option<u64>,
}

/// Reasons a fence cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FenceError {
    /// The fence would be empty.
    #[error("after ({after}) must not be later than before ({before})")]
    Inverted {
        /// Requested fence start.
        after: u64,
        /// Requested fence end.
        before: u64,
    },
    /// `complete` only constrains something when a bound is present.
    #[error("complete matching without an after or before bound makes no sense")]
    CompleteWithoutBounds,
}

impl TimeFence {
    /// Builds the fence for the given intent.
    pub fn build(after: Option<u64>, before: Option<u64>, complete: bool) -> Result<Self, FenceError> {
        if let (Some(after), Some(before)) = (after, before)
            && after > before
        {
            return Err(FenceError::Inverted { after, before });
        }
        if complete && after.is_none() && before.is_none() {
            return Err(FenceError::CompleteWithoutBounds);
        }

        let fence = if complete {
            Self {
                first_after: after,
                last_before: before,
                ..Self::default()
            }
        } else {
            Self {
                last_after: after,
                first_before: before,
                ..Self::default()
            }
        };
        Ok(fence)
    }

    /// Builds the fence described by a query descriptor.
    pub fn for_descriptor(descriptor: &QueryDescriptor) -> Result<Self, FenceError> {
        Self::build(descriptor.after, descriptor.before, descriptor.complete)
    }

    /// Returns true when no bound is set.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.first_after.is_none()
            && self.first_before.is_none()
            && self.last_after.is_none()
            && self.last_before.is_none()
    }

    /// Reports whether an observation spanning `time_first..=time_last`
    /// falls inside the fence.
    #[must_use]
    pub fn admits(&self, time_first: u64, time_last: u64) -> bool {
        self.first_after.is_none_or(|bound| time_first > bound)
            && self.first_before.is_none_or(|bound| time_first < bound)
            && self.last_after.is_none_or(|bound| time_last > bound)
            && self.last_before.is_none_or(|bound| time_last < bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const T: u64 = 1_600_000_000;

    #[test]
    fn overlap_after_uses_last_after() {
        let fence = TimeFence::build(Some(T), None, false).expect("fence");
        assert_eq!(fence.last_after, Some(T));
        assert_eq!(fence.first_after, None);
    }

    #[test]
    fn complete_before_uses_last_before() {
        let fence = TimeFence::build(None, Some(T), true).expect("fence");
        assert_eq!(fence.last_before, Some(T));
        assert_eq!(fence.first_before, None);
    }

    #[test]
    fn overlap_admits_observation_straddling_the_start() {
        let fence = TimeFence::build(Some(T), None, false).expect("fence");
        assert!(fence.admits(T - 100, T + 100));
    }

    #[test]
    fn complete_excludes_observation_straddling_the_start() {
        let fence = TimeFence::build(Some(T), None, true).expect("fence");
        assert!(!fence.admits(T - 100, T + 100));
        assert!(!fence.admits(T, T + 100));
        assert!(fence.admits(T + 1, T + 100));
    }

    #[rstest]
    #[case(Some(T + 1), Some(T), false)]
    #[case(Some(T + 1), Some(T), true)]
    fn inverted_bounds_are_rejected(
        #[case] after: Option<u64>,
        #[case] before: Option<u64>,
        #[case] complete: bool,
    ) {
        let error = TimeFence::build(after, before, complete).expect_err("inverted");
        assert!(matches!(error, FenceError::Inverted { .. }));
    }

    #[test]
    fn complete_requires_a_bound() {
        assert_eq!(
            TimeFence::build(None, None, true),
            Err(FenceError::CompleteWithoutBounds)
        );
    }

    #[test]
    fn no_bounds_build_an_open_fence() {
        let fence = TimeFence::build(None, None, false).expect("fence");
        assert!(fence.is_open());
        assert!(fence.admits(0, u64::MAX));
    }

    #[test]
    fn equal_bounds_are_accepted() {
        assert!(TimeFence::build(Some(T), Some(T), false).is_ok());
    }
}
