//! TaskKind - the closed set of task types the system knows how to run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of a task, used as the dispatch key.
///
/// Parsing is case-insensitive (`"Email"` and `"EMAIL"` are both `Email`); the
/// serialized form is always lower-case.
///
/// # Adding a kind
/// 1. Add a variant here and to [`TaskKind::ALL`].
/// 2. Add its payload checks to the validator (the match there is exhaustive).
/// 3. Implement [`crate::typed::Task`] for its payload and register a handler.
///    The worker builder refuses to start while any kind lacks a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Email,
}

impl TaskKind {
    pub const ALL: &'static [TaskKind] = &[TaskKind::Email];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Email => "email",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task type: {0}")]
pub struct UnknownTaskKind(pub String);

impl FromStr for TaskKind {
    type Err = UnknownTaskKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        TaskKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == lowered)
            .ok_or_else(|| UnknownTaskKind(s.to_string()))
    }
}
