//! Address-indexed disassembly listing with a bounded backward scan.
//!
//! The index holds the companion listing in program order, each line tokenized
//! once into an [`Instruction`]. Two lookups are offered: resolving the listing
//! line for an instruction-pointer address, and a bounded backward walk testing
//! a structural predicate against each preceding line.
//!
//! The backward scan is the shared primitive behind target and buffer inference.
//! It is explicitly a heuristic, not a data-flow analysis: it walks program
//! order (not execution order), does not follow branches, does not account for
//! aliasing, and misses matches beyond its window. Callers must treat a miss as
//! "not found", never as proof of absence.

use crate::{disasm::Instruction, trace::DisasmLine};

/// One listing line, tokenized and ready for structural matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedLine {
    /// Hex address text normalized to lowercase, when the listing carries one.
    pub addr: Option<String>,
    /// 1-based line number in the listing file.
    pub line: Option<u32>,
    /// The tokenized instruction.
    pub instr: Instruction,
}

/// The disassembly listing indexed for address lookup and backward scanning.
///
/// # Examples
///
/// ```rust
/// use stackscope::disasm::DisasmIndex;
/// use stackscope::trace::DisasmLine;
///
/// let listing = vec![
///     DisasmLine { addr: Some("0x401000".into()), line: Some(1), text: "mov eax, [rbp-0x10]".into() },
///     DisasmLine { addr: Some("0x401004".into()), line: Some(2), text: "cmp eax, 0x2a".into() },
/// ];
/// let index = DisasmIndex::new(&listing);
///
/// let pos = index.position_of("0x401004").unwrap();
/// let hit = index.scan_backward(pos, 8, |instr| instr.mnemonic == "mov");
/// assert!(hit.is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DisasmIndex {
    lines: Vec<IndexedLine>,
}

impl DisasmIndex {
    /// Builds the index from a listing, tokenizing every line once.
    ///
    /// Addresses are normalized to lowercase here so that lookup stays
    /// case-insensitive regardless of how the listing was produced.
    #[must_use]
    pub fn new(listing: &[DisasmLine]) -> DisasmIndex {
        DisasmIndex {
            lines: listing
                .iter()
                .map(|line| IndexedLine {
                    addr: line.addr.as_ref().map(|addr| addr.to_ascii_lowercase()),
                    line: line.line,
                    instr: Instruction::parse(&line.text),
                })
                .collect(),
        }
    }

    /// Returns the number of indexed lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if the listing is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns all indexed lines in program order.
    #[must_use]
    pub fn lines(&self) -> &[IndexedLine] {
        &self.lines
    }

    /// Resolves the listing position of an address, compared case-insensitively.
    #[must_use]
    pub fn position_of(&self, addr: &str) -> Option<usize> {
        let needle = addr.to_ascii_lowercase();
        self.lines
            .iter()
            .position(|line| line.addr.as_deref() == Some(needle.as_str()))
    }

    /// Resolves the listing line for an address.
    #[must_use]
    pub fn line_at(&self, addr: &str) -> Option<&IndexedLine> {
        self.position_of(addr).map(|pos| &self.lines[pos])
    }

    /// Walks backward from (excluding) position `from`, testing up to `window`
    /// preceding lines against `predicate` in program order. Returns the first
    /// match, nearest line first.
    pub fn scan_backward(
        &self,
        from: usize,
        window: usize,
        predicate: impl Fn(&Instruction) -> bool,
    ) -> Option<(usize, &IndexedLine)> {
        let stop = from.saturating_sub(window);
        (stop..from.min(self.lines.len()))
            .rev()
            .map(|pos| (pos, &self.lines[pos]))
            .find(|(_, line)| predicate(&line.instr))
    }

    /// Finds the first line in program order matching `predicate`.
    pub fn find_forward(
        &self,
        predicate: impl Fn(&Instruction) -> bool,
    ) -> Option<(usize, &IndexedLine)> {
        self.lines
            .iter()
            .enumerate()
            .find(|(_, line)| predicate(&line.instr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(lines: &[(&str, &str)]) -> Vec<DisasmLine> {
        lines
            .iter()
            .enumerate()
            .map(|(i, (addr, text))| DisasmLine {
                addr: Some((*addr).to_string()),
                line: Some(i as u32 + 1),
                text: (*text).to_string(),
            })
            .collect()
    }

    #[test]
    fn test_position_lookup_is_case_insensitive() {
        // Mixed-case listing addresses, mixed-case needles.
        let index = DisasmIndex::new(&listing(&[
            ("0X401000", "push rbp"),
            ("0x401001", "mov rbp, rsp"),
            ("0x401002", "ret"),
        ]));
        assert_eq!(index.position_of("0x401000"), Some(0));
        assert_eq!(index.position_of("0x401001"), Some(1));
        assert_eq!(index.position_of("0X401001"), Some(1));
        assert_eq!(index.lines()[0].addr.as_deref(), Some("0x401000"));
        assert_eq!(
            index.line_at("0X401000").map(|l| l.instr.mnemonic.as_str()),
            Some("push")
        );
        assert_eq!(index.position_of("0x999999"), None);
    }

    #[test]
    fn test_backward_scan_respects_window() {
        let index = DisasmIndex::new(&listing(&[
            ("0x1", "mov eax, [rbp-0x10]"),
            ("0x2", "nop"),
            ("0x3", "nop"),
            ("0x4", "nop"),
            ("0x5", "cmp eax, 0x2a"),
        ]));
        let from = index.position_of("0x5").unwrap();

        // A window of 4 reaches back to the load, a window of 3 does not.
        assert!(index
            .scan_backward(from, 4, |instr| instr.loads_register_from_frame("eax"))
            .is_some());
        assert!(index
            .scan_backward(from, 3, |instr| instr.loads_register_from_frame("eax"))
            .is_none());
    }

    #[test]
    fn test_backward_scan_returns_nearest_match() {
        let index = DisasmIndex::new(&listing(&[
            ("0x1", "mov eax, [rbp-0x20]"),
            ("0x2", "mov eax, [rbp-0x10]"),
            ("0x3", "cmp eax, 0x2a"),
        ]));
        let (pos, line) = index
            .scan_backward(2, 8, |instr| instr.loads_register_from_frame("eax"))
            .unwrap();
        assert_eq!(pos, 1);
        assert_eq!(line.instr.frame_operand(), Some(-0x10));
    }

    #[test]
    fn test_scan_on_empty_or_out_of_range() {
        let index = DisasmIndex::default();
        assert!(index.scan_backward(0, 8, |_| true).is_none());
        assert!(index.scan_backward(100, 8, |_| true).is_none());
        assert!(index.find_forward(|_| true).is_none());
    }
}
