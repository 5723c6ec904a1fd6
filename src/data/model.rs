use std::fmt;
use std::ops::Range;

use crate::config::validate_threshold;

use super::cycles::detect_boundaries;
use super::error::InvalidParameterError;

// ---------------------------------------------------------------------------
// RawRecord – one row of the source file
// ---------------------------------------------------------------------------

/// One parsed data row, in file column order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawRecord {
    pub cycle_number: i64,
    pub time_s: f64,
    pub potential_v: f64,
    pub capacity_mah: f64,
    pub current_ma: f64,
}

// ---------------------------------------------------------------------------
// Column – the plottable quantities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Time,
    Potential,
    Capacity,
    Current,
}

impl Column {
    pub const ALL: [Column; 4] = [
        Column::Time,
        Column::Potential,
        Column::Capacity,
        Column::Current,
    ];

    /// Raw (unnormalized) value of this column in a record.
    pub fn raw(self, record: &RawRecord) -> f64 {
        match self {
            Column::Time => record.time_s,
            Column::Potential => record.potential_v,
            Column::Capacity => record.capacity_mah,
            Column::Current => record.current_ma,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Column::Time => "Time",
            Column::Potential => "Potential",
            Column::Capacity => "Capacity",
            Column::Current => "Current",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// NormalizationState – read-time projections
// ---------------------------------------------------------------------------

/// Offsets and divisors applied when columns are read. Raw records are
/// never touched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NormalizationState {
    /// Subtracted from every time value.
    pub time_offset: Option<f64>,
    /// Divisor turning mAh into mAh/g.
    pub active_mass_g: Option<f64>,
}

impl NormalizationState {
    fn apply(&self, column: Column, record: &RawRecord) -> f64 {
        let raw = column.raw(record);
        match column {
            Column::Time => raw - self.time_offset.unwrap_or(0.0),
            Column::Capacity => match self.active_mass_g {
                Some(mass) => raw / mass,
                None => raw,
            },
            Column::Potential | Column::Current => raw,
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – one loaded file
// ---------------------------------------------------------------------------

/// A loaded cycling file: records in file order plus the active view.
///
/// All indices handed out by the dataset (boundaries, cycle ranges) are
/// relative to the active range.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    records: Vec<RawRecord>,
    /// Absolute row range currently in view.
    active: Range<usize>,
    threshold_ma: f64,
    boundaries: Vec<usize>,
    normalization: NormalizationState,
}

impl Dataset {
    /// Build a dataset over `records`. Fails on an empty record list or an
    /// invalid threshold.
    pub fn from_records(
        name: impl Into<String>,
        records: Vec<RawRecord>,
        threshold_ma: f64,
    ) -> Result<Self, InvalidParameterError> {
        validate_threshold(threshold_ma)?;
        if records.is_empty() {
            return Err(InvalidParameterError::new(
                "record count",
                0.0,
                "a dataset needs at least one row",
            ));
        }
        let active = 0..records.len();
        let mut dataset = Dataset {
            name: name.into(),
            records,
            active,
            threshold_ma,
            boundaries: Vec::new(),
            normalization: NormalizationState::default(),
        };
        dataset.recompute_boundaries();
        Ok(dataset)
    }

    /// Display name (usually the file name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of active rows.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Whether the active view is empty. Never true for a constructed dataset.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Number of rows loaded from the file, regardless of trimming.
    pub fn total_len(&self) -> usize {
        self.records.len()
    }

    /// Active records, in file order.
    pub fn records(&self) -> &[RawRecord] {
        &self.records[self.active.clone()]
    }

    /// Absolute row range currently in view.
    pub fn active_range(&self) -> Range<usize> {
        self.active.clone()
    }

    pub fn threshold_ma(&self) -> f64 {
        self.threshold_ma
    }

    /// Change the boundary threshold and recompute boundaries.
    pub fn set_threshold_ma(&mut self, threshold_ma: f64) -> Result<(), InvalidParameterError> {
        validate_threshold(threshold_ma)?;
        self.threshold_ma = threshold_ma;
        self.recompute_boundaries();
        Ok(())
    }

    /// Cycle boundaries relative to the active range; always starts with 0.
    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    pub fn normalization(&self) -> NormalizationState {
        self.normalization
    }

    // -- Normalization --

    /// Shift time so the first active row reads as t = 0.
    pub fn normalize_time(&mut self) {
        self.normalization.time_offset = self.records().first().map(|r| r.time_s);
    }

    pub fn clear_time_normalization(&mut self) {
        self.normalization.time_offset = None;
    }

    /// Report capacity per gram of active material.
    pub fn normalize_capacity(&mut self, active_mass_g: f64) -> Result<(), InvalidParameterError> {
        if !active_mass_g.is_finite() || active_mass_g <= 0.0 {
            return Err(InvalidParameterError::new(
                "active mass",
                active_mass_g,
                "must be a positive number of grams",
            ));
        }
        self.normalization.active_mass_g = Some(active_mass_g);
        Ok(())
    }

    pub fn clear_capacity_normalization(&mut self) {
        self.normalization.active_mass_g = None;
    }

    // -- Column access --

    /// Active values of `column` with normalization applied.
    pub fn column(&self, column: Column) -> impl Iterator<Item = f64> + '_ {
        self.column_in(column, 0..self.len())
    }

    /// Normalized values of `column` over an active-relative row range.
    /// The range is clamped to the active view.
    pub fn column_in(&self, column: Column, range: Range<usize>) -> impl Iterator<Item = f64> + '_ {
        let rows = self.records();
        let end = range.end.min(rows.len());
        let start = range.start.min(end);
        let norm = self.normalization;
        rows[start..end]
            .iter()
            .map(move |r| norm.apply(column, r))
    }

    /// Active values of `column` exactly as stored in the file.
    pub fn raw_column(&self, column: Column) -> impl Iterator<Item = f64> + '_ {
        self.records().iter().map(move |r| column.raw(r))
    }

    // -- Internal --

    /// Narrow the active view to an active-relative range. Boundaries and an
    /// already-set time offset follow the new first row.
    pub(super) fn set_active(&mut self, relative: Range<usize>) {
        let start = self.active.start + relative.start;
        let end = self.active.start + relative.end.min(self.len());
        self.active = start..end;
        self.recompute_boundaries();
        if self.normalization.time_offset.is_some() {
            self.normalize_time();
        }
    }

    fn recompute_boundaries(&mut self) {
        let currents = self.records().iter().map(|r| r.current_ma);
        self.boundaries = detect_boundaries(currents, self.threshold_ma);
    }
}
