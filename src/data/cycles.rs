use std::fmt;
use std::ops::Range;

use super::error::CycleIndexError;
use super::model::Dataset;

// ---------------------------------------------------------------------------
// Boundary detection
// ---------------------------------------------------------------------------

/// Indices where the current changes sign.
///
/// Only rows with `|current| > threshold` carry a sign; rows at or below it
/// neither start a new half-cycle nor reset the last seen sign. Index 0 is
/// always the first boundary.
pub fn detect_boundaries<I>(currents: I, threshold: f64) -> Vec<usize>
where
    I: IntoIterator<Item = f64>,
{
    let mut boundaries = vec![0];
    let mut last_sign = 0i8;

    for (idx, current) in currents.into_iter().enumerate() {
        if current.abs() <= threshold {
            continue;
        }
        let sign = if current > 0.0 { 1 } else { -1 };
        if last_sign != 0 && sign != last_sign {
            boundaries.push(idx);
        }
        last_sign = sign;
    }
    boundaries
}

// ---------------------------------------------------------------------------
// Half-cycle direction
// ---------------------------------------------------------------------------

/// Current direction of a half-cycle: positive current charges,
/// negative current discharges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Charge,
    Discharge,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Charge => write!(f, "charge"),
            Direction::Discharge => write!(f, "discharge"),
        }
    }
}

/// One span between consecutive boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct HalfCycle {
    /// 1-based cycle number.
    pub index: usize,
    /// Active-relative row range.
    pub range: Range<usize>,
    /// `None` when no row of the span exceeds the threshold.
    pub direction: Option<Direction>,
}

// ---------------------------------------------------------------------------
// Extraction / trimming
// ---------------------------------------------------------------------------

impl Dataset {
    /// Number of detected cycles (one per boundary).
    pub fn cycle_count(&self) -> usize {
        self.boundaries().len()
    }

    /// Active-relative row range of cycle `n` (1-indexed).
    pub fn extract_cycle(&self, n: usize) -> Result<Range<usize>, CycleIndexError> {
        let boundaries = self.boundaries();
        if n == 0 || n > boundaries.len() {
            return Err(CycleIndexError::cycle(n, boundaries.len()));
        }
        let start = boundaries[n - 1];
        let end = boundaries.get(n).copied().unwrap_or(self.len());
        Ok(start..end)
    }

    /// Restrict the active view to cycle 1. Calling it again is a no-op.
    pub fn trim_to_first_cycle(&mut self) {
        // Cycle 1 always exists: boundary 0 is unconditional.
        if let Ok(range) = self.extract_cycle(1) {
            if range != (0..self.len()) {
                log::debug!("{}: trimming to first cycle {range:?}", self.name());
                self.set_active(range);
            }
        }
    }

    /// Drop leading rows until the first one carrying current above the
    /// threshold. Does nothing when no row does.
    pub fn trim_leading_rest(&mut self) {
        let threshold = self.threshold_ma();
        let first = self
            .records()
            .iter()
            .position(|r| r.current_ma.abs() > threshold);
        match first {
            Some(0) => {}
            Some(idx) => {
                log::debug!("{}: dropping {idx} leading rest rows", self.name());
                self.set_active(idx..self.len());
            }
            None => log::warn!("{}: no row exceeds {threshold} mA", self.name()),
        }
    }

    /// Every cycle with its range and current direction.
    pub fn half_cycles(&self) -> Vec<HalfCycle> {
        let threshold = self.threshold_ma();
        (1..=self.cycle_count())
            .filter_map(|n| self.extract_cycle(n).ok().map(|range| (n, range)))
            .map(|(index, range)| {
                let direction = self.records()[range.clone()]
                    .iter()
                    .find(|r| r.current_ma.abs() > threshold)
                    .map(|r| {
                        if r.current_ma > 0.0 {
                            Direction::Charge
                        } else {
                            Direction::Discharge
                        }
                    });
                HalfCycle {
                    index,
                    range,
                    direction,
                }
            })
            .collect()
    }

    /// Half-cycles running in `direction`, in file order.
    pub fn cycles_in_direction(&self, direction: Direction) -> Vec<HalfCycle> {
        self.half_cycles()
            .into_iter()
            .filter(|c| c.direction == Some(direction))
            .collect()
    }

    pub fn discharge_cycles(&self) -> Vec<HalfCycle> {
        self.cycles_in_direction(Direction::Discharge)
    }

    pub fn charge_cycles(&self) -> Vec<HalfCycle> {
        self.cycles_in_direction(Direction::Charge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::dataset;
    use crate::data::model::Column;

    #[test]
    fn test_detect_boundaries_reference_example() {
        let currents = [5.0, 5.0, -3.0, -3.0, 0.0000001, 4.0];
        assert_eq!(detect_boundaries(currents, 1e-6), vec![0, 2, 5]);
    }

    #[test]
    fn test_detect_boundaries_all_below_threshold() {
        let currents = [0.0, 1e-7, -1e-7, 0.0];
        assert_eq!(detect_boundaries(currents, 1e-6), vec![0]);
    }

    #[test]
    fn test_detect_boundaries_empty() {
        assert_eq!(detect_boundaries(Vec::new(), 1e-6), vec![0]);
    }

    #[test]
    fn test_detect_boundaries_counts_alternations() {
        for threshold in [1e-6, 0.1, 2.0] {
            for k in 0..6usize {
                // k alternations with rest rows in between each run.
                let mut currents = Vec::new();
                for run in 0..=k {
                    let sign = if run % 2 == 0 { 1.0 } else { -1.0 };
                    currents.push(0.0);
                    currents.extend([sign * (threshold + 1.0); 3]);
                }
                let boundaries = detect_boundaries(currents, threshold);
                assert_eq!(boundaries.len(), k + 1, "threshold {threshold}, k {k}");
            }
        }
    }

    #[test]
    fn test_zero_current_never_triggers() {
        let currents = [2.0, 0.0, 0.0, 2.0, 0.0, -2.0];
        assert_eq!(detect_boundaries(currents, 0.0), vec![0, 5]);
    }

    #[test]
    fn test_extract_cycle_ranges() {
        let ds = dataset(&[5.0, 5.0, -3.0, -3.0, 0.0000001, 4.0]);
        assert_eq!(ds.cycle_count(), 3);
        assert_eq!(ds.extract_cycle(1).unwrap(), 0..2);
        assert_eq!(ds.extract_cycle(2).unwrap(), 2..5);
        assert_eq!(ds.extract_cycle(3).unwrap(), 5..6);
    }

    #[test]
    fn test_extract_cycle_out_of_range() {
        let ds = dataset(&[5.0, -5.0]);
        let err = ds.extract_cycle(3).unwrap_err();
        assert_eq!(err, CycleIndexError::cycle(3, 2));
        assert!(ds.extract_cycle(0).is_err());
    }

    #[test]
    fn test_whole_file_is_cycle_one_without_current() {
        let ds = dataset(&[0.0, 0.0, 0.0]);
        assert_eq!(ds.boundaries(), &[0]);
        assert_eq!(ds.extract_cycle(1).unwrap(), 0..3);
    }

    #[test]
    fn test_trim_to_first_cycle_is_idempotent() {
        let mut ds = dataset(&[0.0, 5.0, 5.0, -3.0, -3.0, 4.0]);
        ds.trim_to_first_cycle();
        let first = ds.active_range();
        assert_eq!(first, 0..3);
        assert_eq!(ds.boundaries(), &[0]);

        ds.trim_to_first_cycle();
        assert_eq!(ds.active_range(), first);
    }

    #[test]
    fn test_trim_recomputes_time_offset() {
        let mut ds = dataset(&[0.0, 0.0, 5.0, -5.0]);
        ds.normalize_time();
        ds.trim_leading_rest();
        assert_eq!(ds.active_range(), 2..4);
        assert_eq!(ds.column(Column::Time).next(), Some(0.0));
        assert_eq!(ds.boundaries(), &[0, 1]);
    }

    #[test]
    fn test_trim_leading_rest_without_current_is_noop() {
        let mut ds = dataset(&[0.0, 0.0]);
        ds.trim_leading_rest();
        assert_eq!(ds.active_range(), 0..2);
    }

    #[test]
    fn test_half_cycle_directions() {
        let ds = dataset(&[0.0, -1.0, -1.0, 1.0, 1.0, -1.0]);
        let cycles = ds.half_cycles();
        assert_eq!(cycles.len(), 3);
        assert_eq!(cycles[0].direction, Some(Direction::Discharge));
        assert_eq!(cycles[1].direction, Some(Direction::Charge));

        let discharge = ds.discharge_cycles();
        assert_eq!(discharge.iter().map(|c| c.index).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(ds.charge_cycles()[0].range, 3..5);
    }

    #[test]
    fn test_rest_only_cycle_has_no_direction() {
        let ds = dataset(&[0.0, 0.0]);
        assert_eq!(ds.half_cycles()[0].direction, None);
        assert!(ds.discharge_cycles().is_empty());
        assert!(ds.charge_cycles().is_empty());
    }
}
