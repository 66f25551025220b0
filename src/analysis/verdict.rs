//! Signed byte distances and the final pass/fail narrative.
//!
//! The two canonical directions are `target − buffer_start` (how far the check
//! target sits past the buffer) and `marker − target` (how far the injected
//! test data landed from the check target). Both are signed and in bytes; a
//! missing endpoint makes the distance absent and the verdict "not detected",
//! never an error.

use std::fmt;

/// Signed byte distance `a − b` under two's-complement wrap.
#[must_use]
pub fn signed_distance(a: u64, b: u64) -> i64 {
    a.wrapping_sub(b) as i64
}

/// Where the injected marker landed relative to the comparison target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The marker lies exactly on the target slot.
    ExactHit,
    /// The write stopped short of the target by this many bytes (underwrite).
    Short(u64),
    /// The write ran past the target by this many bytes (overwrite).
    Past(u64),
    /// Marker or target unresolved; no verdict possible.
    NotDetected,
}

impl Verdict {
    /// Derives the verdict from the `marker − target` distance, when available.
    #[must_use]
    pub fn from_distance(marker_to_target: Option<i64>) -> Verdict {
        match marker_to_target {
            Some(0) => Verdict::ExactHit,
            Some(n) if n < 0 => Verdict::Short(n.unsigned_abs()),
            Some(n) => Verdict::Past(n.unsigned_abs()),
            None => Verdict::NotDetected,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::ExactHit => write!(f, "marker lands exactly on target"),
            Verdict::Short(n) => write!(f, "{n} bytes short"),
            Verdict::Past(n) => write!(f, "{n} bytes past"),
            Verdict::NotDetected => write!(f, "not detected"),
        }
    }
}
