use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Return early with [`ProfileError::PreconditionViolated`] unless the condition holds.
///
/// The message names the invariant that failed, optionally formatted with arguments.
macro_rules! ensure {
    ($cond:expr, $msg:literal $(,)?) => {
        if !($cond) {
            return Err($crate::error::ProfileError::PreconditionViolated(
                $msg.to_string(),
            ));
        }
    };
    ($cond:expr, $fmt:literal, $($arg:tt)+) => {
        if !($cond) {
            return Err($crate::error::ProfileError::PreconditionViolated(
                format!($fmt, $($arg)+),
            ));
        }
    };
}

/// One of the six faces of a bounding box, named by the direction of the outward walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoxFace {
    NegX,
    PosX,
    NegY,
    PosY,
    NegZ,
    PosZ,
}

impl fmt::Display for BoxFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BoxFace::NegX => "-x",
            BoxFace::PosX => "+x",
            BoxFace::NegY => "-y",
            BoxFace::PosY => "+y",
            BoxFace::NegZ => "-z",
            BoxFace::PosZ => "+z",
        };
        f.write_str(label)
    }
}

/// Errors raised by model construction and per-reflection queries.
///
/// Every failure is fatal to the call that raised it; nothing is retried and no
/// partial result is produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfileError {
    /// An input invariant does not hold; the message names the invariant.
    #[error("precondition violated: {0}")]
    PreconditionViolated(String),

    /// The outward bounding box walk along `face` hit its step limit.
    #[error("bounding box search along {face} did not converge within {steps} steps")]
    SearchDidNotConverge { face: BoxFace, steps: usize },
}

impl ProfileError {
    /// Whether this error reports a violated precondition.
    pub fn is_precondition(&self) -> bool {
        matches!(self, ProfileError::PreconditionViolated(_))
    }
}
