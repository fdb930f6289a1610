//! Progress reducer: maps stage-local percentages into the job window.
//!
//! Each stage reports its own 0-100; the orchestrator assigns every stage a
//! disjoint slice of the job's overall scale so the combined progress stays
//! monotonic across stage boundaries.

/// A stage's slice of the overall 0-100 progress scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSpan {
    pub start: u8,
    pub end: u8,
}

impl StageSpan {
    pub const fn new(start: u8, end: u8) -> Self {
        Self { start, end }
    }

    /// Remap a stage-local percentage into this span.
    ///
    /// Input is clamped to 0-100; the result never leaves [start, end].
    pub fn remap(&self, stage_percent: f32) -> u8 {
        let pct = stage_percent.clamp(0.0, 100.0);
        let width = self.end.saturating_sub(self.start) as f32;
        self.start + (pct * width / 100.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults;

    #[test]
    fn remap_hits_span_endpoints() {
        let span = StageSpan::new(10, 98);
        assert_eq!(span.remap(0.0), 10);
        assert_eq!(span.remap(100.0), 98);
    }

    #[test]
    fn remap_is_linear_inside_the_span() {
        let span = StageSpan::new(10, 98);
        // 10 + 50 * 0.88 = 54
        assert_eq!(span.remap(50.0), 54);
        assert_eq!(span.remap(25.0), 32);
    }

    #[test]
    fn remap_clamps_out_of_range_input() {
        let span = StageSpan::new(10, 98);
        assert_eq!(span.remap(-20.0), 10);
        assert_eq!(span.remap(250.0), 98);
        assert_eq!(span.remap(f32::NAN), 10);
    }

    #[test]
    fn remap_is_monotone_within_a_stage() {
        let span = defaults::SEPARATE_SPAN;
        let mut last = 0;
        for pct in 0..=100 {
            let overall = span.remap(pct as f32);
            assert!(overall >= last, "{} regressed below {}", overall, last);
            last = overall;
        }
    }

    #[test]
    fn default_spans_chain_without_regression() {
        // Ingest's ceiling never exceeds separation's floor
        assert!(
            defaults::INGEST_SPAN.remap(100.0) <= defaults::SEPARATE_SPAN.remap(0.0)
        );
    }
}
