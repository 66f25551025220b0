//! Sentinel marker detection among stack words.
//!
//! Trace authors feed the analyzed program distinctive repeating-byte fill
//! patterns (`AAAA`, `BBBB`, ...) so that the reach of a user-controlled write
//! is visible in the stack dump. The detector scans snapshots in order and
//! stops at the first one containing any sentinel-valued slot, since the
//! injected marker is an invariant of the analyzed run rather than of the
//! playback position.

use crate::{
    analysis::{build_register_map, resolve_slot_address, stack_pointer, AnalysisConfig, RegisterMap},
    trace::{RawValue, Snapshot, Trace},
};

/// A detected sentinel stack word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    /// Absolute address of the sentinel slot.
    pub address: u64,
    /// The sentinel value, masked to 32 bits.
    pub value: u32,
}

/// Scans every snapshot's stack slots in order, stopping at the first snapshot
/// with a detected marker.
///
/// Slot addresses resolve against the snapshot's own stack pointer, falling
/// back to the baseline register map for snapshots without register data.
/// Within the matching snapshot the lowest-addressed candidate at or above the
/// buffer start wins; without such a candidate (or without a known buffer
/// start) the lowest-addressed candidate overall is taken. No match is no
/// marker, not an error.
#[must_use]
pub fn detect_marker(
    trace: &Trace,
    buffer_start: Option<u64>,
    baseline: &RegisterMap,
    config: &AnalysisConfig,
) -> Option<Marker> {
    trace
        .snapshots
        .iter()
        .find_map(|snapshot| snapshot_marker(snapshot, buffer_start, baseline, config))
}

fn snapshot_marker(
    snapshot: &Snapshot,
    buffer_start: Option<u64>,
    baseline: &RegisterMap,
    config: &AnalysisConfig,
) -> Option<Marker> {
    let own_map;
    let sp = if snapshot.has_registers() {
        own_map = build_register_map(&snapshot.registers);
        stack_pointer(&own_map)
    } else {
        stack_pointer(baseline)
    };

    let candidates: Vec<Marker> = snapshot
        .stack
        .iter()
        .filter_map(|slot| {
            let address = resolve_slot_address(slot, sp)?;
            let bits = slot.value.as_ref().and_then(RawValue::as_bits)?;
            let value = (bits & 0xffff_ffff) as u32;
            config
                .sentinels
                .contains(&value)
                .then_some(Marker { address, value })
        })
        .collect();

    if let Some(start) = buffer_start {
        if let Some(marker) = candidates
            .iter()
            .filter(|marker| marker.address >= start)
            .min_by_key(|marker| marker.address)
        {
            return Some(*marker);
        }
    }
    candidates.into_iter().min_by_key(|marker| marker.address)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(json: &str) -> Trace {
        Trace::from_json(json).unwrap()
    }

    fn baseline_of(trace: &Trace) -> RegisterMap {
        trace
            .baseline()
            .map(|snap| build_register_map(&snap.registers))
            .unwrap_or_default()
    }

    #[test]
    fn test_detects_sentinel_inside_buffer() {
        let trace = trace(
            r#"[{
                "registers": [{"name":"rsp","value":"0x7ffd0fe0"}],
                "stack": [
                    {"pos": 0, "value": 0},
                    {"pos": 4, "value": "0x41414141"}
                ]
            }]"#,
        );
        let baseline = baseline_of(&trace);
        let marker = detect_marker(
            &trace,
            Some(0x7ffd_0fe0),
            &baseline,
            &AnalysisConfig::default(),
        )
        .unwrap();
        assert_eq!(marker.address, 0x7ffd_0fe4);
        assert_eq!(marker.value, 0x4141_4141);
    }

    #[test]
    fn test_prefers_lowest_address_at_or_above_buffer_start() {
        let trace = trace(
            r#"[{
                "registers": [{"name":"rsp","value":"0x1000"}],
                "stack": [
                    {"pos": 32, "value": "0x42424242"},
                    {"pos": 16, "value": "0x41414141"},
                    {"pos": 0, "value": "0x43434343"}
                ]
            }]"#,
        );
        let baseline = baseline_of(&trace);

        // Buffer starts above the lowest candidate: 0x1000 is skipped.
        let marker = detect_marker(
            &trace,
            Some(0x1008),
            &baseline,
            &AnalysisConfig::default(),
        )
        .unwrap();
        assert_eq!(marker.address, 0x1010);

        // No buffer start: lowest-addressed candidate overall.
        let marker = detect_marker(&trace, None, &baseline, &AnalysisConfig::default()).unwrap();
        assert_eq!(marker.address, 0x1000);

        // Buffer start above every candidate: fall back to lowest overall.
        let marker = detect_marker(
            &trace,
            Some(0x2000),
            &baseline,
            &AnalysisConfig::default(),
        )
        .unwrap();
        assert_eq!(marker.address, 0x1000);
    }

    #[test]
    fn test_stops_at_first_matching_snapshot() {
        let trace = trace(
            r#"[
                {"registers":[{"name":"rsp","value":"0x1000"}],
                 "stack":[{"pos":0,"value":0}]},
                {"registers":[{"name":"rsp","value":"0x1000"}],
                 "stack":[{"pos":0,"value":"0x42424242"}]},
                {"registers":[{"name":"rsp","value":"0x1000"}],
                 "stack":[{"pos":0,"value":"0x41414141"}]}
            ]"#,
        );
        let baseline = baseline_of(&trace);
        let marker = detect_marker(&trace, None, &baseline, &AnalysisConfig::default()).unwrap();
        assert_eq!(marker.value, 0x4242_4242);
    }

    #[test]
    fn test_value_is_masked_to_32_bits() {
        let trace = trace(
            r#"[{
                "registers": [{"name":"rsp","value":"0x1000"}],
                "stack": [{"pos": 0, "value": "0xdead41414141"}]
            }]"#,
        );
        let baseline = baseline_of(&trace);
        let marker = detect_marker(&trace, None, &baseline, &AnalysisConfig::default()).unwrap();
        assert_eq!(marker.value, 0x4141_4141);
    }

    #[test]
    fn test_no_match_and_unresolved_addresses() {
        // No sentinel values at all.
        let plain = trace(
            r#"[{"registers":[{"name":"rsp","value":"0x1000"}],
                "stack":[{"pos":0,"value":7}]}]"#,
        );
        let baseline = baseline_of(&plain);
        assert!(detect_marker(&plain, None, &baseline, &AnalysisConfig::default()).is_none());

        // Sentinel value present but no stack pointer to place it.
        let unplaced = trace(r#"[{"stack":[{"pos":0,"value":"0x41414141"}]}]"#);
        let baseline = baseline_of(&unplaced);
        assert!(detect_marker(&unplaced, None, &baseline, &AnalysisConfig::default()).is_none());
    }
}
