//! Per-query completion state machine driven by SAF `cond` values.

use std::fmt;

/// Completion state of one query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProtocolState {
    /// Nothing received yet.
    #[default]
    Init,
    /// The server announced the start of results.
    Begin,
    /// Results are flowing.
    Ongoing,
    /// The server finished normally.
    Succeeded,
    /// The server stopped early because of its own limits.
    Limited,
    /// The server gave up.
    Failed,
    /// The client stopped the stream after reaching its output cap.
    SelfLimited,
    /// The `cond` value was unrecognised, or the stream ended without one.
    Missing,
}

impl ProtocolState {
    /// Returns true once the stream has a final outcome.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Limited | Self::Failed | Self::SelfLimited
        )
    }

    /// Lowercase label used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Begin => "begin",
            Self::Ongoing => "ongoing",
            Self::Succeeded => "succeeded",
            Self::Limited => "limited",
            Self::Failed => "failed",
            Self::SelfLimited => "self-limited",
            Self::Missing => "missing",
        }
    }
}

impl fmt::Display for ProtocolState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// A decoded `cond` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cond {
    /// `begin`
    Begin,
    /// `ongoing`
    Ongoing,
    /// `succeeded`
    Succeeded,
    /// `limited`
    Limited,
    /// `failed`
    Failed,
    /// Anything else the server sent.
    Unknown(String),
}

impl Cond {
    /// Maps the wire string onto a condition.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "begin" => Self::Begin,
            "ongoing" => Self::Ongoing,
            "succeeded" => Self::Succeeded,
            "limited" => Self::Limited,
            "failed" => Self::Failed,
            other => Self::Unknown(other.to_owned()),
        }
    }
}

/// Outcome of feeding one record to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State after the record.
    pub state: ProtocolState,
    /// Whether the record's payload goes to the presenter.
    pub forward: bool,
    /// Whether the record counts towards the output cap.
    pub count: bool,
}

impl Transition {
    const fn consume(state: ProtocolState) -> Self {
        Self {
            state,
            forward: false,
            count: false,
        }
    }

    const fn pass(state: ProtocolState, has_payload: bool) -> Self {
        Self {
            state,
            forward: has_payload,
            count: has_payload,
        }
    }
}

/// Computes the next state for a record carrying `cond` and, when
/// `has_payload` is set, an `obj` data payload.
///
/// Terminal states are not left for `begin` or `ongoing`; a later terminal
/// or unrecognised condition still overrides them.
#[must_use]
pub fn transition(current: ProtocolState, cond: Option<&Cond>, has_payload: bool) -> Transition {
    match cond {
        None => Transition::pass(current, has_payload),
        Some(Cond::Begin) if current.is_terminal() => Transition::consume(current),
        Some(Cond::Begin) => Transition::consume(ProtocolState::Begin),
        Some(Cond::Ongoing) if current.is_terminal() => Transition::pass(current, has_payload),
        Some(Cond::Ongoing) => Transition::pass(ProtocolState::Ongoing, has_payload),
        Some(Cond::Succeeded) => Transition::consume(ProtocolState::Succeeded),
        Some(Cond::Limited) => Transition::consume(ProtocolState::Limited),
        Some(Cond::Failed) => Transition::consume(ProtocolState::Failed),
        Some(Cond::Unknown(_)) => Transition::consume(ProtocolState::Missing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ProtocolState::Init)]
    #[case(ProtocolState::Ongoing)]
    fn begin_is_consumed(#[case] current: ProtocolState) {
        let next = transition(current, Some(&Cond::Begin), false);
        assert_eq!(next, Transition::consume(ProtocolState::Begin));
    }

    #[test]
    fn ongoing_still_forwards_its_payload() {
        let next = transition(ProtocolState::Begin, Some(&Cond::Ongoing), true);
        assert_eq!(next.state, ProtocolState::Ongoing);
        assert!(next.forward);
        assert!(next.count);
    }

    #[rstest]
    #[case(Cond::Succeeded, ProtocolState::Succeeded)]
    #[case(Cond::Limited, ProtocolState::Limited)]
    #[case(Cond::Failed, ProtocolState::Failed)]
    fn terminal_conditions_swallow_payloads(#[case] cond: Cond, #[case] expected: ProtocolState) {
        let next = transition(ProtocolState::Ongoing, Some(&cond), true);
        assert_eq!(next, Transition::consume(expected));
        assert!(expected.is_terminal());
    }

    #[test]
    fn unknown_condition_marks_missing_without_forwarding() {
        let cond = Cond::parse("paused");
        assert_eq!(cond, Cond::Unknown("paused".to_owned()));
        let next = transition(ProtocolState::Succeeded, Some(&cond), true);
        assert_eq!(next, Transition::consume(ProtocolState::Missing));
    }

    #[test]
    fn keepalive_changes_nothing() {
        let next = transition(ProtocolState::Begin, None, false);
        assert_eq!(next, Transition::consume(ProtocolState::Begin));
    }

    #[test]
    fn bare_payload_is_forwarded_once() {
        let next = transition(ProtocolState::Begin, None, true);
        assert_eq!(next.state, ProtocolState::Begin);
        assert!(next.forward && next.count);
    }

    #[rstest]
    #[case(Cond::Begin)]
    #[case(Cond::Ongoing)]
    fn terminal_states_are_sticky(#[case] cond: Cond) {
        let next = transition(ProtocolState::Limited, Some(&cond), false);
        assert_eq!(next.state, ProtocolState::Limited);
    }

    #[test]
    fn labels_match_wire_names() {
        assert_eq!(ProtocolState::SelfLimited.to_string(), "self-limited");
        assert_eq!(Cond::parse("succeeded"), Cond::Succeeded);
    }
}
