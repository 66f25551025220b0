//! One-shot reasoning orchestration with an explicit cache lifecycle.
//!
//! The quantities of interest (buffer location, comparison target, injected
//! marker) are invariant properties of one analyzed run, not of the current
//! playback position. Recomputing them per navigation step would be wasteful
//! and would make the presentation flicker whenever a heuristic input drifts
//! in and out of view. [`reason`] therefore runs exactly once per loaded trace
//! and [`Session`] owns the cached result; reloading a trace must go through
//! [`Session::invalidate`] so the result is discarded and fully rebuilt, never
//! patched in place.

use crate::{
    analysis::{
        build_register_map, detect_marker, frame_pointer, locate_buffer, resolve_target,
        signed_distance, AnalysisConfig, BufferInfo, Marker, TargetInfo, Verdict,
    },
    disasm::DisasmIndex,
    trace::Trace,
};

/// The frozen outcome of reasoning over one loaded trace.
///
/// Plain read-only data for the presentation layer. Each component is absent
/// when its inputs could not be resolved; absence composes, ending in a
/// [`Verdict::NotDetected`] rather than an error.
#[derive(Debug, Clone, PartialEq)]
pub struct ReasoningResult {
    /// The write-buffer region, supplied or inferred.
    pub buffer: Option<BufferInfo>,
    /// The comparison target of the first security check.
    pub target: Option<TargetInfo>,
    /// The first detected sentinel marker.
    pub marker: Option<Marker>,
    /// `target − buffer_start`, in bytes.
    pub buffer_to_target: Option<i64>,
    /// `marker − target`, in bytes.
    pub marker_to_target: Option<i64>,
    /// The pass/fail narrative derived from `marker_to_target`.
    pub verdict: Verdict,
}

/// Runs the full reasoning pipeline once over a loaded trace.
///
/// Pure function of its inputs: building twice from the identical trace and
/// configuration yields identical output. Baseline registers come from the
/// first snapshot carrying register data (falling back to the first snapshot);
/// the comparison basis is the first `cmp` snapshot in program order; the
/// marker search scans every snapshot in order and stops at the first hit.
#[must_use]
pub fn reason(trace: &Trace, config: &AnalysisConfig) -> ReasoningResult {
    let registers = trace
        .baseline()
        .map(|snapshot| build_register_map(&snapshot.registers))
        .unwrap_or_default();
    let fp = frame_pointer(&registers);
    let index = DisasmIndex::new(&trace.meta.disasm);

    let buffer = locate_buffer(&trace.meta, &index, fp, config);
    let target = resolve_target(trace, &index, fp, config);
    let marker = detect_marker(
        trace,
        buffer.as_ref().map(|info| info.region.start),
        &registers,
        config,
    );

    let target_addr = target.as_ref().map(|info| info.address);
    let buffer_to_target = match (target_addr, buffer.as_ref()) {
        (Some(target), Some(info)) => Some(signed_distance(target, info.region.start)),
        _ => None,
    };
    let marker_to_target = match (marker.as_ref(), target_addr) {
        (Some(marker), Some(target)) => Some(signed_distance(marker.address, target)),
        _ => None,
    };

    ReasoningResult {
        buffer,
        target,
        marker,
        buffer_to_target,
        marker_to_target,
        verdict: Verdict::from_distance(marker_to_target),
    }
}

/// A caller-owned reasoning session: configuration plus the cached result.
///
/// The cache is written exactly once per trace load and read repeatedly
/// thereafter. Loading a new trace must [`Session::invalidate`] first; the
/// next [`Session::build`] then rebuilds from scratch.
///
/// # Examples
///
/// ```rust
/// use stackscope::{analysis::Session, Trace};
///
/// let trace = Trace::from_json("[]")?;
/// let mut session = Session::new();
///
/// let result = session.build(&trace).clone();
/// assert_eq!(result.verdict.to_string(), "not detected");
///
/// // Subsequent builds reuse the cache until invalidated.
/// assert_eq!(session.build(&trace), &result);
/// session.invalidate();
/// # Ok::<(), stackscope::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Session {
    config: AnalysisConfig,
    cached: Option<ReasoningResult>,
}

impl Session {
    /// Creates a session with the default [`AnalysisConfig`].
    #[must_use]
    pub fn new() -> Session {
        Session::default()
    }

    /// Creates a session with an explicit configuration.
    #[must_use]
    pub fn with_config(config: AnalysisConfig) -> Session {
        Session {
            config,
            cached: None,
        }
    }

    /// Returns the session configuration.
    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Builds the reasoning result for `trace`, or returns the cached one.
    ///
    /// The caller is responsible for invalidating between different traces;
    /// the session does not fingerprint its input.
    pub fn build(&mut self, trace: &Trace) -> &ReasoningResult {
        self.cached
            .get_or_insert_with(|| reason(trace, &self.config))
    }

    /// Returns the cached result, when one has been built.
    #[must_use]
    pub fn result(&self) -> Option<&ReasoningResult> {
        self.cached.as_ref()
    }

    /// Discards the cached result. The next [`Session::build`] recomputes.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
