//! Comparison-target resolution.
//!
//! When a trace contains a security check, it shows up as a `cmp` instruction
//! testing a stack slot against an expected value. This resolver recovers the
//! slot's address in two forms: directly, when the `cmp` itself addresses
//! `[fp ± offset]`, or indirectly, by scanning backward for the most recent
//! load of the compared register from a frame-relative slot. Both forms record
//! full provenance for explainability.
//!
//! The indirect form is a bounded heuristic: it cannot see through
//! memory-to-memory moves or loads beyond the scan window, and reports "no
//! target" in those cases rather than guessing.

use crate::{
    analysis::{AnalysisConfig, ProvenanceLine},
    disasm::{DisasmIndex, Instruction, Operand},
    trace::{Snapshot, Trace},
};

/// The resolved comparison target of a security check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetInfo {
    /// Absolute address of the compared stack slot.
    pub address: u64,
    /// Signed frame-pointer-relative offset of that slot.
    pub frame_offset: i64,
    /// Expected comparison value from the immediate operand, when present.
    pub expected: Option<i64>,
    /// The backward-scan load match; absent for the direct form.
    pub load: Option<ProvenanceLine>,
    /// The comparison instruction itself.
    pub cmp: ProvenanceLine,
}

/// Resolves the comparison target from the first `cmp` snapshot of a trace.
///
/// Returns `None` when the trace has no `cmp` step, the frame pointer is
/// unknown, or neither resolution form matches within the scan window. All of
/// these are documented limitations, not errors.
///
/// # Examples
///
/// ```rust
/// use stackscope::analysis::{resolve_target, AnalysisConfig};
/// use stackscope::disasm::DisasmIndex;
/// use stackscope::Trace;
///
/// let trace = Trace::from_json(r#"[{"instr": "cmp [rbp-0x10], 0x2a"}]"#)?;
/// let target = resolve_target(
///     &trace,
///     &DisasmIndex::default(),
///     Some(0x7ffd1000),
///     &AnalysisConfig::default(),
/// )
/// .unwrap();
/// assert_eq!(target.address, 0x7ffd0ff0);
/// assert_eq!(target.expected, Some(42));
/// # Ok::<(), stackscope::Error>(())
/// ```
#[must_use]
pub fn resolve_target(
    trace: &Trace,
    index: &DisasmIndex,
    frame_pointer: Option<u64>,
    config: &AnalysisConfig,
) -> Option<TargetInfo> {
    let fp = frame_pointer?;
    let (snapshot, instr) = first_cmp(trace)?;

    let expected = instr.operands.get(1).and_then(Operand::as_immediate);
    let cmp_provenance = ProvenanceLine {
        line: snapshot.line,
        text: instr.text.clone(),
    };

    // Direct form: the cmp addresses the slot itself.
    if let Some(offset) = instr.frame_operand() {
        return Some(TargetInfo {
            address: fp.wrapping_add_signed(offset),
            frame_offset: offset,
            expected,
            load: None,
            cmp: cmp_provenance,
        });
    }

    // Indirect form: find the most recent load of the compared register.
    let register = instr.register_operand()?.to_string();
    let cmp_pos = snapshot
        .ip
        .as_deref()
        .and_then(|addr| index.position_of(addr))?;
    let (_, load_line) = index.scan_backward(cmp_pos, config.scan_window, |candidate| {
        candidate.loads_register_from_frame(&register)
    })?;
    let offset = load_line.instr.frame_operand()?;

    Some(TargetInfo {
        address: fp.wrapping_add_signed(offset),
        frame_offset: offset,
        expected,
        load: Some(ProvenanceLine {
            line: load_line.line,
            text: load_line.instr.text.clone(),
        }),
        cmp: cmp_provenance,
    })
}

/// The first snapshot in program order executing a `cmp`, with its parsed instruction.
fn first_cmp(trace: &Trace) -> Option<(&Snapshot, Instruction)> {
    trace.snapshots.iter().find_map(|snapshot| {
        let instr = Instruction::parse(snapshot.instr.as_deref()?);
        instr.is_cmp().then_some((snapshot, instr))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::DisasmLine;

    fn listing(lines: &[&str]) -> DisasmIndex {
        let lines: Vec<DisasmLine> = lines
            .iter()
            .enumerate()
            .map(|(i, text)| DisasmLine {
                addr: Some(format!("{:#x}", 0x401000 + i * 4)),
                line: Some(i as u32 + 1),
                text: (*text).to_string(),
            })
            .collect();
        DisasmIndex::new(&lines)
    }

    fn cmp_trace(instr: &str, ip: Option<&str>) -> Trace {
        let ip_field = ip
            .map(|addr| format!(r#","rip":"{addr}""#))
            .unwrap_or_default();
        Trace::from_json(&format!(
            r#"[{{"step":1,"instr":"{instr}","line":7{ip_field}}}]"#
        ))
        .unwrap()
    }

    #[test]
    fn test_direct_form() {
        let trace = cmp_trace("cmp [rbp-0x10], 0x2a", None);
        let target = resolve_target(
            &trace,
            &DisasmIndex::default(),
            Some(0x7ffd_1000),
            &AnalysisConfig::default(),
        )
        .unwrap();
        assert_eq!(target.address, 0x7ffd_0ff0);
        assert_eq!(target.frame_offset, -0x10);
        assert_eq!(target.expected, Some(0x2a));
        assert!(target.load.is_none());
        assert_eq!(target.cmp.line, Some(7));
        assert_eq!(target.cmp.text, "cmp [rbp-0x10], 0x2a");
    }

    #[test]
    fn test_indirect_form_scans_for_load() {
        let index = listing(&[
            "mov eax, [rbp-0x10]",
            "nop",
            "cmp eax, 0x2a",
        ]);
        let trace = cmp_trace("cmp eax, 0x2a", Some("0x401008"));
        let target = resolve_target(
            &trace,
            &index,
            Some(0x7ffd_1000),
            &AnalysisConfig::default(),
        )
        .unwrap();
        assert_eq!(target.address, 0x7ffd_0ff0);
        assert_eq!(target.frame_offset, -0x10);
        assert_eq!(target.expected, Some(42));

        let load = target.load.unwrap();
        assert_eq!(load.line, Some(1));
        assert_eq!(load.text, "mov eax, [rbp-0x10]");
    }

    #[test]
    fn test_missing_immediate_does_not_abort() {
        let trace = cmp_trace("cmp [rbp-0x10], ecx", None);
        let target = resolve_target(
            &trace,
            &DisasmIndex::default(),
            Some(0x1000),
            &AnalysisConfig::default(),
        )
        .unwrap();
        assert_eq!(target.expected, None);
        assert_eq!(target.frame_offset, -0x10);
    }

    #[test]
    fn test_no_target_cases() {
        let config = AnalysisConfig::default();

        // No cmp anywhere in the trace.
        let no_cmp = Trace::from_json(r#"[{"instr":"mov eax, ebx"}]"#).unwrap();
        assert!(resolve_target(&no_cmp, &DisasmIndex::default(), Some(0x1000), &config).is_none());

        // Unknown frame pointer.
        let trace = cmp_trace("cmp [rbp-0x10], 0x2a", None);
        assert!(resolve_target(&trace, &DisasmIndex::default(), None, &config).is_none());

        // Indirect form with no load inside the window.
        let index = listing(&["nop", "nop", "cmp eax, 0x2a"]);
        let indirect = cmp_trace("cmp eax, 0x2a", Some("0x401008"));
        assert!(resolve_target(&indirect, &index, Some(0x1000), &config).is_none());

        // Indirect form with no instruction pointer to anchor the scan.
        let unanchored = cmp_trace("cmp eax, 0x2a", None);
        assert!(resolve_target(&unanchored, &index, Some(0x1000), &config).is_none());
    }

    #[test]
    fn test_first_cmp_in_program_order_wins() {
        let trace = Trace::from_json(
            r#"[
                {"instr":"mov eax, 1"},
                {"instr":"cmp [rbp-0x10], 1"},
                {"instr":"cmp [rbp-0x20], 2"}
            ]"#,
        )
        .unwrap();
        let target = resolve_target(
            &trace,
            &DisasmIndex::default(),
            Some(0x1000),
            &AnalysisConfig::default(),
        )
        .unwrap();
        assert_eq!(target.frame_offset, -0x10);
    }
}
