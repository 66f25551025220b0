//! Absolute address resolution for stack slots.

use crate::trace::{model::parse_int_text, RawValue, StackSlot};

/// Computes the absolute address of a stack slot.
///
/// Resolution order:
///
/// 1. The slot's explicit address, when it is a hex-prefixed string or a
///    number, used verbatim. A hex-prefixed string that fails to parse leaves
///    the slot unresolved rather than falling through.
/// 2. `stack_pointer + slot.pos` when both are known.
/// 3. Otherwise unresolved (`None`).
///
/// Total function; never fails. An unresolved address propagates as `None`
/// through every downstream computation that needs one, disabling only those.
///
/// # Examples
///
/// ```rust
/// use stackscope::analysis::resolve_slot_address;
/// use stackscope::trace::{RawValue, StackSlot};
///
/// let explicit = StackSlot {
///     addr: Some(RawValue::Text("0x7ffd0fe4".into())),
///     pos: Some(8),
///     ..StackSlot::default()
/// };
/// // The explicit address wins over the position.
/// assert_eq!(resolve_slot_address(&explicit, Some(0x7ffd0fe0)), Some(0x7ffd0fe4));
///
/// let relative = StackSlot { pos: Some(8), ..StackSlot::default() };
/// assert_eq!(resolve_slot_address(&relative, Some(0x7ffd0fe0)), Some(0x7ffd0fe8));
/// assert_eq!(resolve_slot_address(&relative, None), None);
/// ```
#[must_use]
pub fn resolve_slot_address(slot: &StackSlot, stack_pointer: Option<u64>) -> Option<u64> {
    match &slot.addr {
        Some(RawValue::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
                // Explicit but unparseable means unresolved, not positional.
                return parse_int_text(trimmed);
            }
        }
        Some(RawValue::Int(value)) => return Some(*value as u64),
        Some(RawValue::Float(value)) if value.is_finite() => {
            return Some(*value as i64 as u64);
        }
        _ => {}
    }

    match (stack_pointer, slot.pos) {
        (Some(sp), Some(pos)) => Some(sp.wrapping_add_signed(pos)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_address_forms() {
        let hex = StackSlot {
            addr: Some(RawValue::Text("0x7ffd1000".into())),
            ..StackSlot::default()
        };
        assert_eq!(resolve_slot_address(&hex, None), Some(0x7ffd_1000));

        let numeric = StackSlot {
            addr: Some(RawValue::Int(0x1000)),
            ..StackSlot::default()
        };
        assert_eq!(resolve_slot_address(&numeric, None), Some(0x1000));
    }

    #[test]
    fn test_bad_hex_address_does_not_fall_through() {
        let slot = StackSlot {
            addr: Some(RawValue::Text("0xzz".into())),
            pos: Some(8),
            ..StackSlot::default()
        };
        assert_eq!(resolve_slot_address(&slot, Some(0x1000)), None);
    }

    #[test]
    fn test_non_hex_string_address_falls_through_to_position() {
        let slot = StackSlot {
            addr: Some(RawValue::Text("stack+8".into())),
            pos: Some(8),
            ..StackSlot::default()
        };
        assert_eq!(resolve_slot_address(&slot, Some(0x1000)), Some(0x1008));
    }

    #[test]
    fn test_unresolvable_slot_is_none() {
        assert_eq!(resolve_slot_address(&StackSlot::default(), None), None);
        assert_eq!(resolve_slot_address(&StackSlot::default(), Some(0x1000)), None);

        let negative = StackSlot {
            pos: Some(-16),
            ..StackSlot::default()
        };
        assert_eq!(resolve_slot_address(&negative, Some(0x1000)), Some(0xff0));
    }
}
