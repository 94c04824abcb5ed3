use std::fmt::Display;

/// What a dispatcher did with one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Dispatched,
    Skipped(SkipReason),
}

/// Why nothing was sent. None of these are failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingResident,
    ProfileNotFound,
    NoDeviceToken,
    StatusUnchanged,
    NotADecision,
    Malformed,
    Duplicate,
    Unrouted,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            SkipReason::MissingResident => "no resident on record",
            SkipReason::ProfileNotFound => "resident profile not found",
            SkipReason::NoDeviceToken => "resident has no registered device",
            SkipReason::StatusUnchanged => "status unchanged",
            SkipReason::NotADecision => "status is not a decision",
            SkipReason::Malformed => "malformed record",
            SkipReason::Duplicate => "duplicate delivery",
            SkipReason::Unrouted => "no handler registered",
        };
        f.write_str(reason)
    }
}

impl Outcome {
    pub fn skipped(reason: SkipReason) -> Self {
        Outcome::Skipped(reason)
    }
}
