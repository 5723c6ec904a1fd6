use thiserror::Error;

use super::error::CycleIndexError;
use super::model::{Column, Dataset};
use super::selection::CycleSelection;

const SECONDS_PER_HOUR: f64 = 3600.0;

// ---------------------------------------------------------------------------
// Plot-ready series
// ---------------------------------------------------------------------------

/// Which columns and cycles to project.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesRequest {
    pub x: Column,
    pub y: Column,
    pub selection: CycleSelection,
}

/// One cycle of one file as (x, y) points.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleSegment {
    /// 1-based cycle number.
    pub cycle: usize,
    pub points: Vec<[f64; 2]>,
}

/// Everything the plot needs for one file. No further transformation is
/// applied downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSeries {
    /// Position among the aligned files, `0..total`.
    pub index: usize,
    pub total: usize,
    pub name: String,
    pub x_label: String,
    pub y_label: String,
    pub segments: Vec<CycleSegment>,
}

#[derive(Debug, Error)]
pub enum AlignError {
    #[error("No files selected")]
    NoFiles,

    #[error("Cycle selection '{selection}' matches no cycle in any file")]
    NothingSelected { selection: CycleSelection },

    #[error(transparent)]
    CycleIndex(#[from] CycleIndexError),
}

/// Axis label for `column` as projected from `dataset`.
pub fn axis_label(column: Column, dataset: &Dataset) -> &'static str {
    match column {
        Column::Time => "Time (h)",
        Column::Potential => "Potential (V)",
        Column::Capacity if dataset.normalization().active_mass_g.is_some() => {
            "Specific Capacity (mAh/g)"
        }
        Column::Capacity => "Capacity (mAh)",
        Column::Current => "Current (mA)",
    }
}

fn to_axis_units(column: Column, value: f64) -> f64 {
    match column {
        Column::Time => value / SECONDS_PER_HOUR,
        _ => value,
    }
}

/// Project the selected cycles of a single dataset.
pub fn project(
    dataset: &Dataset,
    request: &SeriesRequest,
    index: usize,
    total: usize,
) -> Result<FileSeries, CycleIndexError> {
    let cycles = request.selection.resolve(dataset)?;
    let segments = cycles
        .into_iter()
        .map(|cycle| {
            let range = dataset.extract_cycle(cycle)?;
            let xs = dataset.column_in(request.x, range.clone());
            let ys = dataset.column_in(request.y, range);
            let points = xs
                .zip(ys)
                .map(|(x, y)| [to_axis_units(request.x, x), to_axis_units(request.y, y)])
                .collect();
            Ok::<_, CycleIndexError>(CycleSegment { cycle, points })
        })
        .collect::<Result<Vec<_>, CycleIndexError>>()?;

    Ok(FileSeries {
        index,
        total,
        name: dataset.name().to_string(),
        x_label: axis_label(request.x, dataset).to_string(),
        y_label: axis_label(request.y, dataset).to_string(),
        segments,
    })
}

/// Project every dataset for an overlay plot.
///
/// Files are not resampled against each other. A file lacking the selected
/// cycle contributes an empty series; only when no file matches is the
/// request rejected.
pub fn align(datasets: &[Dataset], request: &SeriesRequest) -> Result<Vec<FileSeries>, AlignError> {
    if datasets.is_empty() {
        return Err(AlignError::NoFiles);
    }
    let total = datasets.len();

    // A single file reports the exact out-of-range error.
    if total == 1 {
        return Ok(vec![project(&datasets[0], request, 0, 1)?]);
    }

    let series: Vec<FileSeries> = datasets
        .iter()
        .enumerate()
        .map(|(index, ds)| {
            project(ds, request, index, total).unwrap_or_else(|e| {
                log::warn!("{}: {e}; skipping", ds.name());
                FileSeries {
                    index,
                    total,
                    name: ds.name().to_string(),
                    x_label: axis_label(request.x, ds).to_string(),
                    y_label: axis_label(request.y, ds).to_string(),
                    segments: Vec::new(),
                }
            })
        })
        .collect();

    if series.iter().all(|s| s.segments.is_empty()) {
        return Err(AlignError::NothingSelected {
            selection: request.selection,
        });
    }
    Ok(series)
}
