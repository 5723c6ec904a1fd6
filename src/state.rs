use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use cycle_plotter::config::ProcessorConfig;
use cycle_plotter::data::loader::{load_file, LoadReport};
use cycle_plotter::data::model::{Column, Dataset};
use cycle_plotter::data::selection::CycleSelection;
use cycle_plotter::data::series::{align, FileSeries, SeriesRequest};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlotMode {
    /// One file, drawn in black.
    #[default]
    Single,
    /// Several files overlaid on a colour gradient.
    Multi,
}

/// The full UI state, independent of rendering. Every processing call gets
/// its parameters from here explicitly.
pub struct AppState {
    pub mode: PlotMode,

    /// Files chosen in the dialog (at most one in single mode).
    pub files: Vec<PathBuf>,

    /// Short description of the selection shown under the file button.
    pub file_summary: Option<String>,

    pub x_column: Column,
    pub y_column: Column,

    /// Active mass in grams as typed; empty means no normalization.
    pub mass_text: String,

    /// Cycle selection as typed (`all`, `3`, `discharge 2`, ...).
    pub cycle_text: String,

    pub config: ProcessorConfig,

    /// Series of the last successful plot.
    pub series: Vec<FileSeries>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_config(ProcessorConfig::default())
    }
}

impl AppState {
    pub fn with_config(config: ProcessorConfig) -> Self {
        Self {
            mode: PlotMode::default(),
            files: Vec::new(),
            file_summary: None,
            x_column: Column::Time,
            y_column: Column::Potential,
            mass_text: String::new(),
            cycle_text: String::new(),
            config,
            series: Vec::new(),
            status_message: None,
        }
    }

    /// Replace the file selection and describe it.
    pub fn set_files(&mut self, mut files: Vec<PathBuf>) {
        if self.mode == PlotMode::Single {
            files.truncate(1);
        }
        self.files = files;
        self.file_summary = (!self.files.is_empty()).then(|| self.describe_selection());
    }

    /// Load every selected file, project the chosen columns and store the
    /// result for the plot panel.
    pub fn generate_plot(&mut self) -> Result<()> {
        if self.files.is_empty() {
            bail!("Please select file(s)");
        }

        let mass = parse_mass(&self.mass_text)?;
        let selection: CycleSelection = self.cycle_text.parse()?;

        let mut datasets = Vec::with_capacity(self.files.len());
        for path in &self.files {
            let mut dataset = load_prepared(path, &self.config)?.dataset;
            if let Some(mass) = mass {
                dataset
                    .normalize_capacity(mass)
                    .with_context(|| format!("normalizing {}", dataset.name()))?;
            }
            datasets.push(dataset);
        }

        let request = SeriesRequest {
            x: self.x_column,
            y: self.y_column,
            selection,
        };
        self.series = align(&datasets, &request)?;
        self.status_message = None;
        log::info!(
            "Plotted {} file(s), {} vs {}, cycles: {selection}",
            self.series.len(),
            self.y_column,
            self.x_column
        );
        Ok(())
    }

    /// [`generate_plot`](Self::generate_plot), reporting failures in the
    /// status line.
    pub fn plot(&mut self) {
        if let Err(e) = self.generate_plot() {
            log::error!("Error generating plot: {e:#}");
            self.status_message = Some(format!("Error: {e:#}"));
        }
    }

    fn describe_selection(&self) -> String {
        let names: Vec<String> = self
            .files
            .iter()
            .map(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| p.display().to_string())
            })
            .collect();
        let mut text = format!("Selected: {}", names.join(", "));

        // Cycle overview of the first file.
        match load_prepared(&self.files[0], &self.config) {
            Ok(report) => text.push_str(&format!("\n{}", summarize(&report))),
            Err(e) => {
                log::warn!("Could not summarize {}: {e:#}", self.files[0].display());
                text.push_str(&format!("\nWarning: {e:#}"));
            }
        }
        text
    }
}

/// Load a file and apply the standard preparation: drop leading rest rows,
/// then start the time axis at zero.
pub fn load_prepared(path: &Path, config: &ProcessorConfig) -> Result<LoadReport> {
    let mut report =
        load_file(path, config).with_context(|| format!("Error loading {}", path.display()))?;
    report.dataset.trim_leading_rest();
    report.dataset.normalize_time();
    Ok(report)
}

/// One-line overview: row count, skipped rows, cycle counts.
pub fn summarize(report: &LoadReport) -> String {
    let ds: &Dataset = &report.dataset;
    let discharge = ds.discharge_cycles().len();
    let charge = ds.charge_cycles().len();
    let mut text = format!(
        "{} rows, cycles: {discharge} discharge, {charge} charge ({} total)",
        ds.len(),
        discharge + charge
    );
    if !report.skipped.is_empty() {
        text.push_str(&format!(", {} malformed rows skipped", report.skipped.len()));
    }
    text
}

/// Parse the active-mass field. Accepts `.` or `,` as decimal separator.
pub fn parse_mass(text: &str) -> Result<Option<f64>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let mass: f64 = text
        .replace(',', ".")
        .parse()
        .with_context(|| format!("Active mass '{text}' is not a number"))?;
    Ok(Some(mass))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const HEADER: &str = "Cycle Number\tTime (s)\tPotential (V)\tCapacity (mAh)\tCurrent (mA)";

    /// Rest, discharge, charge.
    fn write_cell(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "0\t0\t3,0\t0\t0").unwrap();
        writeln!(file, "1\t3600\t2,0\t0,1\t-0,5").unwrap();
        writeln!(file, "1\t7200\t1,0\t0,2\t-0,5").unwrap();
        writeln!(file, "1\t10800\t2,0\t0,1\t0,5").unwrap();
        writeln!(file, "1\t14400\t3,0\t0\t0,5").unwrap();
        path
    }

    #[test]
    fn test_parse_mass() {
        assert_eq!(parse_mass("").unwrap(), None);
        assert_eq!(parse_mass(" 0,5 ").unwrap(), Some(0.5));
        assert_eq!(parse_mass("0.25").unwrap(), Some(0.25));
        assert!(parse_mass("heavy").is_err());
    }

    #[test]
    fn test_load_prepared_trims_rest_and_zeroes_time() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_cell(temp_dir.path(), "cell.txt");
        let report = load_prepared(&path, &ProcessorConfig::default()).unwrap();

        assert_eq!(report.dataset.len(), 4);
        assert_eq!(report.dataset.column(Column::Time).next(), Some(0.0));
        assert_eq!(
            summarize(&report),
            "4 rows, cycles: 1 discharge, 1 charge (2 total)"
        );
    }

    #[test]
    fn test_generate_plot_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_cell(temp_dir.path(), "cell.txt");

        let mut state = AppState::default();
        state.set_files(vec![path.clone(), path]);
        assert_eq!(state.files.len(), 1);
        assert!(state.file_summary.as_deref().unwrap().starts_with("Selected: cell.txt"));

        state.x_column = Column::Capacity;
        state.mass_text = "0,1".into();
        state.cycle_text = "charge 1".into();
        state.generate_plot().unwrap();

        assert_eq!(state.series.len(), 1);
        let series = &state.series[0];
        assert_eq!(series.x_label, "Specific Capacity (mAh/g)");
        assert_eq!(series.segments[0].cycle, 2);
        assert_eq!(series.segments[0].points.len(), 2);
    }

    #[test]
    fn test_generate_plot_multi_file() {
        let temp_dir = TempDir::new().unwrap();
        let a = write_cell(temp_dir.path(), "a.txt");
        let b = write_cell(temp_dir.path(), "b.txt");

        let mut state = AppState::default();
        state.mode = PlotMode::Multi;
        state.set_files(vec![a, b]);
        state.generate_plot().unwrap();

        assert_eq!(state.series.len(), 2);
        assert_eq!(state.series[1].index, 1);
        assert_eq!(state.series[1].segments.len(), 2);
        assert_eq!(state.series[0].x_label, "Time (h)");
        // 3600 s after the first current row.
        assert_eq!(state.series[0].segments[0].points[1][0], 1.0);
    }

    #[test]
    fn test_plot_reports_errors_in_status() {
        let mut state = AppState::default();
        state.plot();
        assert!(state.status_message.unwrap().contains("select file"));

        let temp_dir = TempDir::new().unwrap();
        let path = write_cell(temp_dir.path(), "cell.txt");
        let mut state = AppState::default();
        state.set_files(vec![path]);
        state.mass_text = "-1".into();
        state.plot();
        assert!(state.status_message.is_some());
        assert!(state.series.is_empty());
    }
}
