//! Write-buffer region resolution and inference.
//!
//! The buffer is where user-controlled data lands. When the trace metadata
//! carries a frame-relative offset and size, the region is formed directly.
//! Otherwise the locator falls back to listing inference: find the first call
//! to a read-style primitive, then scan backward for the `lea` that computed a
//! frame-relative address into a register feeding that call. A supplied offset
//! doubles as a consistency check on the inferred one.

use crate::{
    analysis::{AnalysisConfig, ProvenanceLine},
    disasm::DisasmIndex,
    trace::TraceMeta,
};

/// A half-open address range `[start, end)` occupied by the write buffer.
///
/// Only valid when the frame pointer is known. The end is absent when the
/// buffer size could not be determined; range membership then always fails,
/// but the start still anchors distance computations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferRegion {
    /// First address of the buffer.
    pub start: u64,
    /// One past the last address, when the size is known.
    pub end: Option<u64>,
}

impl BufferRegion {
    /// Returns `true` when `addr` falls inside the region. Requires a known end.
    #[must_use]
    pub fn contains(&self, addr: u64) -> bool {
        match self.end {
            Some(end) => addr >= self.start && addr < end,
            None => false,
        }
    }

    /// Returns the region size in bytes, when the end is known.
    #[must_use]
    pub fn size(&self) -> Option<u64> {
        self.end.map(|end| end.wrapping_sub(self.start))
    }
}

/// The listing lines buffer inference was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferProvenance {
    /// The `lea`-style instruction computing the buffer address.
    pub address_of: ProvenanceLine,
    /// The read-style call consuming that address.
    pub call: ProvenanceLine,
}

/// The resolved write-buffer region with its derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferInfo {
    /// The buffer address range.
    pub region: BufferRegion,
    /// Signed frame-pointer-relative offset of the buffer start.
    pub frame_offset: i64,
    /// Inference provenance; absent when the region came from metadata alone.
    pub provenance: Option<BufferProvenance>,
}

/// Resolves or infers the write-buffer region.
///
/// Requires a known frame pointer; without one there is no region. A
/// metadata-supplied offset wins, enriched with listing provenance only when
/// the inferred offset agrees with it (the consistency check). With no
/// supplied offset, the inferred one is used as-is. Returns `None` when
/// neither source yields an offset, which is a documented heuristic miss, not
/// an error.
#[must_use]
pub fn locate_buffer(
    meta: &TraceMeta,
    index: &DisasmIndex,
    frame_pointer: Option<u64>,
    config: &AnalysisConfig,
) -> Option<BufferInfo> {
    let fp = frame_pointer?;
    let inferred = infer_from_listing(index, config);

    let (frame_offset, provenance) = match (meta.buffer_offset, inferred) {
        (Some(supplied), Some((inferred_offset, prov))) if inferred_offset == supplied => {
            (supplied, Some(prov))
        }
        (Some(supplied), _) => (supplied, None),
        (None, Some((inferred_offset, prov))) => (inferred_offset, Some(prov)),
        (None, None) => return None,
    };

    let start = fp.wrapping_add_signed(frame_offset);
    Some(BufferInfo {
        region: BufferRegion {
            start,
            end: meta.buffer_size.map(|size| start.wrapping_add(size)),
        },
        frame_offset,
        provenance,
    })
}

/// Scans the listing for a read-style call and the frame-relative address
/// computation feeding it.
fn infer_from_listing(
    index: &DisasmIndex,
    config: &AnalysisConfig,
) -> Option<(i64, BufferProvenance)> {
    let (call_pos, call_line) = index.find_forward(|instr| {
        if instr.mnemonic != "call" {
            return false;
        }
        let text = instr.text.to_ascii_lowercase();
        config
            .read_call_symbols
            .iter()
            .any(|symbol| text.contains(symbol.as_str()))
    })?;

    let (_, lea_line) = index.scan_backward(call_pos, config.scan_window, |instr| {
        instr.mnemonic == "lea" && instr.frame_operand().is_some()
    })?;

    let offset = lea_line.instr.frame_operand()?;
    Some((
        offset,
        BufferProvenance {
            address_of: ProvenanceLine {
                line: lea_line.line,
                text: lea_line.instr.text.clone(),
            },
            call: ProvenanceLine {
                line: call_line.line,
                text: call_line.instr.text.clone(),
            },
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::DisasmLine;

    fn index_of(lines: &[&str]) -> DisasmIndex {
        let listing: Vec<DisasmLine> = lines
            .iter()
            .enumerate()
            .map(|(i, text)| DisasmLine {
                addr: Some(format!("{:#x}", 0x401000 + i * 4)),
                line: Some(i as u32 + 1),
                text: (*text).to_string(),
            })
            .collect();
        DisasmIndex::new(&listing)
    }

    #[test]
    fn test_supplied_offset_and_size() {
        let meta = TraceMeta {
            buffer_offset: Some(-0x20),
            buffer_size: Some(16),
            ..TraceMeta::default()
        };
        let info = locate_buffer(
            &meta,
            &DisasmIndex::default(),
            Some(0x7ffd_1000),
            &AnalysisConfig::default(),
        )
        .unwrap();
        assert_eq!(info.region.start, 0x7ffd_0fe0);
        assert_eq!(info.region.end, Some(0x7ffd_0ff0));
        assert_eq!(info.frame_offset, -0x20);
        assert!(info.provenance.is_none());
        assert!(info.region.contains(0x7ffd_0fe0));
        assert!(!info.region.contains(0x7ffd_0ff0));
    }

    #[test]
    fn test_no_frame_pointer_means_no_region() {
        let meta = TraceMeta {
            buffer_offset: Some(-0x20),
            buffer_size: Some(16),
            ..TraceMeta::default()
        };
        assert!(locate_buffer(
            &meta,
            &DisasmIndex::default(),
            None,
            &AnalysisConfig::default()
        )
        .is_none());
    }

    #[test]
    fn test_inference_from_listing() {
        let index = index_of(&[
            "push rbp",
            "mov rbp, rsp",
            "lea rdi, [rbp-0x20]",
            "mov rsi, rdx",
            "call read_input",
        ]);
        let info = locate_buffer(
            &TraceMeta::default(),
            &index,
            Some(0x7ffd_1000),
            &AnalysisConfig::default(),
        )
        .unwrap();
        assert_eq!(info.frame_offset, -0x20);
        assert_eq!(info.region.start, 0x7ffd_0fe0);
        assert_eq!(info.region.end, None);

        let prov = info.provenance.unwrap();
        assert_eq!(prov.address_of.line, Some(3));
        assert_eq!(prov.address_of.text, "lea rdi, [rbp-0x20]");
        assert_eq!(prov.call.line, Some(5));
    }

    #[test]
    fn test_consistency_check_on_supplied_offset() {
        let index = index_of(&["lea rdi, [rbp-0x20]", "call gets"]);

        // Matching inference attaches provenance to the supplied offset.
        let matching = TraceMeta {
            buffer_offset: Some(-0x20),
            ..TraceMeta::default()
        };
        let info = locate_buffer(&matching, &index, Some(0x1000), &AnalysisConfig::default())
            .unwrap();
        assert!(info.provenance.is_some());

        // A disagreeing inference is discarded; the supplied offset stands alone.
        let disagreeing = TraceMeta {
            buffer_offset: Some(-0x40),
            ..TraceMeta::default()
        };
        let info = locate_buffer(&disagreeing, &index, Some(0x1000), &AnalysisConfig::default())
            .unwrap();
        assert_eq!(info.frame_offset, -0x40);
        assert!(info.provenance.is_none());
    }

    #[test]
    fn test_heuristic_misses_yield_none() {
        // No read-style call at all.
        let no_call = index_of(&["lea rdi, [rbp-0x20]", "call compute"]);
        assert!(locate_buffer(
            &TraceMeta::default(),
            &no_call,
            Some(0x1000),
            &AnalysisConfig::default()
        )
        .is_none());

        // Address computation beyond the scan window.
        let mut lines = vec!["lea rdi, [rbp-0x20]"];
        lines.extend(std::iter::repeat("nop").take(9));
        lines.push("call read_input");
        assert!(locate_buffer(
            &TraceMeta::default(),
            &index_of(&lines),
            Some(0x1000),
            &AnalysisConfig::default()
        )
        .is_none());
    }
}
