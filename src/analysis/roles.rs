//! Semantic role classification for stack slots.
//!
//! A role is presentation and reasoning metadata only: it is recomputed per
//! snapshot on demand and never cached or persisted. Classification is a
//! cascade with fixed precedence, so an explicit hint from the trace author
//! always beats the address heuristics.

use crate::{analysis::BufferRegion, trace::StackSlot};

/// The semantic category of a stack slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    /// Inside the user-controlled write buffer.
    Buffer,
    /// A local variable of the current frame.
    Local,
    /// Compiler-inserted alignment or padding.
    Padding,
    /// Security-relevant saved state: saved frame pointer or return address.
    Control,
    /// Not enough information to classify.
    Unknown,
}

impl Role {
    /// All roles in declaration order, for rendering a classification legend.
    #[must_use]
    pub fn legend() -> impl Iterator<Item = Role> {
        <Role as strum::IntoEnumIterator>::iter()
    }
}

/// Classifies a stack slot, first match wins:
///
/// 1. Explicit role hint (`role`/`kind`/`zone`/`type` fields, normalized at
///    ingestion): substring match on `buffer`, `local`, `padding`/`pad`,
///    `control`/`ret`/`saved`.
/// 2. Name substring heuristic: `buffer`/`buf`, `padding`/`pad`/`align`,
///    `ret`/`saved`/`ebp`/`rbp`, `var`/`local`.
/// 3. Address-range heuristic (needs a resolved address and a frame pointer):
///    inside the buffer region; inside `[fp, fp + 2×word_size)`, which covers
///    the saved frame pointer and the return address; below the frame pointer.
/// 4. [`Role::Unknown`].
///
/// # Examples
///
/// ```rust
/// use stackscope::analysis::{classify_role, BufferRegion, Role};
/// use stackscope::trace::StackSlot;
///
/// let region = BufferRegion { start: 0x7ffd0fe0, end: Some(0x7ffd0ff0) };
/// let slot = StackSlot { role_hint: Some("control".into()), ..StackSlot::default() };
///
/// // An explicit hint beats the address heuristic, even inside the region.
/// let role = classify_role(&slot, Some(0x7ffd0fe4), Some(0x7ffd1000), 8, Some(&region));
/// assert_eq!(role, Role::Control);
/// ```
#[must_use]
pub fn classify_role(
    slot: &StackSlot,
    addr: Option<u64>,
    frame_pointer: Option<u64>,
    word_size: u64,
    region: Option<&BufferRegion>,
) -> Role {
    if let Some(hint) = &slot.role_hint {
        let hint = hint.to_ascii_lowercase();
        if hint.contains("buffer") {
            return Role::Buffer;
        }
        if hint.contains("local") {
            return Role::Local;
        }
        if hint.contains("padding") || hint.contains("pad") {
            return Role::Padding;
        }
        if hint.contains("control") || hint.contains("ret") || hint.contains("saved") {
            return Role::Control;
        }
    }

    if let Some(name) = &slot.name {
        let name = name.to_ascii_lowercase();
        if name.contains("buffer") || name.contains("buf") {
            return Role::Buffer;
        }
        if name.contains("padding") || name.contains("pad") || name.contains("align") {
            return Role::Padding;
        }
        if name.contains("ret")
            || name.contains("saved")
            || name.contains("ebp")
            || name.contains("rbp")
        {
            return Role::Control;
        }
        if name.contains("var") || name.contains("local") {
            return Role::Local;
        }
    }

    if let (Some(addr), Some(region)) = (addr, region) {
        if region.contains(addr) {
            return Role::Buffer;
        }
    }

    if let (Some(addr), Some(fp)) = (addr, frame_pointer) {
        if word_size > 0 {
            if addr >= fp && addr < fp.wrapping_add(word_size * 2) {
                return Role::Control;
            }
            if addr < fp {
                return Role::Local;
            }
        }
    }

    Role::Unknown
}
