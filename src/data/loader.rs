use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::config::{ParseMode, ProcessorConfig};

use super::error::{LoadError, MalformedReason, MalformedRecordError};
use super::model::{Dataset, RawRecord};

/// Field names in file order, used in error messages.
const FIELDS: [&str; 5] = [
    "Cycle Number",
    "Time (s)",
    "Potential (V)",
    "Capacity (mAh)",
    "Current (mA)",
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// A parsed file together with what the parser had to leave out.
#[derive(Debug)]
pub struct LoadReport {
    pub dataset: Dataset,
    /// Rows skipped in tolerant mode, in file order.
    pub skipped: Vec<MalformedRecordError>,
    /// Whether the first line was recognised as a header and ignored.
    pub header_skipped: bool,
}

/// Load a cycling data file.
///
/// Expected layout: one optional header line, then tab-separated rows of
/// `cycle  time_s  potential_V  capacity_mAh  current_mA`, with `,` as the
/// decimal separator. The file is read fully and closed before parsing.
pub fn load_file(path: &Path, config: &ProcessorConfig) -> Result<LoadReport, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    parse_str(&text, &name, config)
}

/// Parse file contents that are already in memory.
pub fn parse_str(text: &str, name: &str, config: &ProcessorConfig) -> Result<LoadReport, LoadError> {
    config.validate()?;

    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    let mut skipped = Vec::new();
    let mut header_skipped = false;
    let mut data_rows = 0usize;
    let mut column_mismatches = 0usize;

    // The reader drops blank lines, so record `n` sits on the n-th non-blank line.
    let mut lines = non_blank_lines(text);

    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let line = lines.next().unwrap_or(row_no as u64 + 1);

        // A single header is allowed, recognised by a non-numeric first field.
        if row_no == 0 && !starts_with_number(&record) {
            log::info!(
                "{name}: treating line {line} as header: {:?}",
                record.iter().collect::<Vec<_>>().join("\t")
            );
            header_skipped = true;
            continue;
        }
        data_rows += 1;

        match parse_record(&record) {
            Ok(raw) => records.push(raw),
            Err(reason) => {
                let err = MalformedRecordError { line, reason };
                if config.parse_mode == ParseMode::Strict {
                    return Err(err.into());
                }
                if matches!(err.reason, MalformedReason::ColumnCount { .. }) {
                    column_mismatches += 1;
                }
                log::warn!("{name}: skipping {err}");
                skipped.push(err);
            }
        }
    }

    if data_rows > 0
        && column_mismatches as f64 / data_rows as f64 > config.max_column_mismatch_fraction
    {
        return Err(LoadError::Structural {
            mismatched: column_mismatches,
            rows: data_rows,
        });
    }

    if records.is_empty() {
        return Err(LoadError::NoRecords {
            skipped: skipped.len(),
        });
    }

    let dataset = Dataset::from_records(name, records, config.current_threshold_ma)?;
    log::info!(
        "{name}: loaded {} rows ({} skipped), {} cycles",
        dataset.total_len(),
        skipped.len(),
        dataset.cycle_count()
    );

    Ok(LoadReport {
        dataset,
        skipped,
        header_skipped,
    })
}

// ---------------------------------------------------------------------------
// Row / field parsing
// ---------------------------------------------------------------------------

/// 1-based numbers of the lines the CSV reader turns into records.
fn non_blank_lines(text: &str) -> impl Iterator<Item = u64> + '_ {
    text.lines()
        .enumerate()
        .filter(|(_, l)| !l.trim_end_matches('\r').is_empty())
        .map(|(i, _)| i as u64 + 1)
}

fn starts_with_number(record: &StringRecord) -> bool {
    record
        .get(0)
        .is_some_and(|field| parse_decimal(FIELDS[0], field).is_ok())
}

fn parse_record(record: &StringRecord) -> Result<RawRecord, MalformedReason> {
    if record.len() != FIELDS.len() {
        return Err(MalformedReason::ColumnCount {
            found: record.len(),
        });
    }

    let field = |i: usize| parse_decimal(FIELDS[i], &record[i]);

    Ok(RawRecord {
        cycle_number: parse_cycle_number(&record[0])?,
        time_s: field(1)?,
        potential_v: field(2)?,
        capacity_mah: field(3)?,
        current_ma: field(4)?,
    })
}

/// Parse a number written with `,` as decimal separator (`"1,5E-03"`).
fn parse_decimal(column: &'static str, text: &str) -> Result<f64, MalformedReason> {
    let tok = text.trim();
    let looks_numeric = !tok.is_empty()
        && tok
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | ',' | 'e' | 'E'));

    if looks_numeric && (tok.contains('.') || tok.matches(',').count() > 1) {
        return Err(MalformedReason::DecimalSeparator {
            column,
            text: tok.to_string(),
        });
    }

    let non_numeric = || MalformedReason::NonNumeric {
        column,
        text: tok.to_string(),
    };
    if !looks_numeric {
        return Err(non_numeric());
    }
    match tok.replacen(',', ".", 1).parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(non_numeric()),
    }
}

fn parse_cycle_number(text: &str) -> Result<i64, MalformedReason> {
    let value = parse_decimal(FIELDS[0], text)?;
    if value.fract() != 0.0 || value.abs() > i64::MAX as f64 {
        return Err(MalformedReason::NonIntegerCycle {
            text: text.trim().to_string(),
        });
    }
    Ok(value as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;
    use std::io::Write;
    use tempfile::TempDir;

    const HEADER: &str = "Cycle Number\tTime (s)\tPotential (V)\tCapacity (mAh)\tCurrent (mA)";

    fn file_text(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text.push('\n');
        text
    }

    #[test]
    fn test_parse_comma_decimals() {
        let text = file_text(&[
            "1\t0\t3,1\t0\t0,5",
            "1\t10,5\t3,25\t1,5E-03\t-0,5",
        ]);
        let report = parse_str(&text, "cell.txt", &ProcessorConfig::default()).unwrap();

        assert!(report.header_skipped);
        assert!(report.skipped.is_empty());
        let ds = &report.dataset;
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.name(), "cell.txt");

        let rec = ds.records()[1];
        assert_eq!(rec.cycle_number, 1);
        assert_eq!(rec.time_s, 10.5);
        assert_eq!(rec.potential_v, 3.25);
        assert_eq!(rec.capacity_mah, 1.5e-3);
        assert_eq!(rec.current_ma, -0.5);
        assert_eq!(ds.boundaries(), &[0, 1]);
    }

    #[test]
    fn test_headerless_file() {
        let text = "1\t0\t3,1\t0\t0,5\n1\t1\t3,2\t0,1\t0,5\n";
        let report = parse_str(text, "raw", &ProcessorConfig::default()).unwrap();
        assert!(!report.header_skipped);
        assert_eq!(report.dataset.len(), 2);
    }

    #[test]
    fn test_tolerant_mode_skips_and_counts() {
        let rows = [
            "1\t0\t3,0\t0\t1,0",
            "abc\t1,5\t2,0\t3,0\t1,0",
            "1\t2\t3,1\t0,2\t1,0",
            "1\t3\t3,2\t0,3\t1,0",
        ];
        let text = file_text(&rows);
        let total_lines = rows.len() + 1;

        let report = parse_str(&text, "cell", &ProcessorConfig::default()).unwrap();
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].line, 3);
        assert!(matches!(
            report.skipped[0].reason,
            MalformedReason::NonNumeric { .. }
        ));
        assert_eq!(
            report.dataset.total_len(),
            total_lines - 1 - report.skipped.len()
        );
    }

    #[test]
    fn test_strict_mode_fails_on_first_bad_row() {
        let text = file_text(&["1\t0\t3,0\t0\t1,0", "1\t1\t3,0\t0"]);
        let config = ProcessorConfig {
            parse_mode: ParseMode::Strict,
            ..Default::default()
        };
        match parse_str(&text, "cell", &config) {
            Err(LoadError::Malformed(err)) => {
                assert_eq!(err.line, 3);
                assert_eq!(err.reason, MalformedReason::ColumnCount { found: 4 });
            }
            other => panic!("expected malformed error, got {other:?}"),
        }
    }

    #[test]
    fn test_dot_decimal_is_rejected() {
        let text = file_text(&["1\t0\t3,0\t0\t1,0", "1\t1\t3.5\t0\t1,0"]);
        let report = parse_str(&text, "cell", &ProcessorConfig::default()).unwrap();
        assert_eq!(report.dataset.len(), 1);
        assert!(matches!(
            report.skipped[0].reason,
            MalformedReason::DecimalSeparator { column: "Potential (V)", .. }
        ));
    }

    #[test]
    fn test_fractional_cycle_number_is_rejected() {
        let text = file_text(&["1\t0\t3,0\t0\t1,0", "1,5\t1\t3,0\t0\t1,0"]);
        let report = parse_str(&text, "cell", &ProcessorConfig::default()).unwrap();
        assert!(matches!(
            report.skipped[0].reason,
            MalformedReason::NonIntegerCycle { .. }
        ));
    }

    #[test]
    fn test_repeated_column_mismatch_escalates() {
        let text = file_text(&[
            "1,0;2,0;3,0",
            "1,0;2,0;3,0",
            "1\t0\t3,0\t0\t1,0",
        ]);
        let err = parse_str(&text, "cell", &ProcessorConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Structural {
                mismatched: 2,
                rows: 3
            }
        ));
    }

    #[test]
    fn test_no_valid_rows() {
        let text = file_text(&[]);
        assert!(matches!(
            parse_str(&text, "cell", &ProcessorConfig::default()),
            Err(LoadError::NoRecords { skipped: 0 })
        ));
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let text = format!("{HEADER}\r\n1\t0\t3,0\t0\t1,0\r\n\r\n1\t1\t3,1\t0,1\t-1,0\r\n");
        let report = parse_str(&text, "cell", &ProcessorConfig::default()).unwrap();
        assert_eq!(report.dataset.len(), 2);
        assert!(report.skipped.is_empty());
    }

    const GOOD: &str = "1\t0\t3,0\t0\t1,0";
    const BAD: &str = "1\t1\tx\t0\t1,0";

    fn skipped_lines(text: &str) -> Vec<u64> {
        parse_str(text, "cell", &ProcessorConfig::default())
            .unwrap()
            .skipped
            .iter()
            .map(|e| e.line)
            .collect()
    }

    fn strict_line(text: &str) -> u64 {
        let config = ProcessorConfig {
            parse_mode: ParseMode::Strict,
            ..Default::default()
        };
        match parse_str(text, "cell", &config) {
            Err(LoadError::Malformed(err)) => err.line,
            other => panic!("expected malformed error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_line_numbers() {
        let cases = [
            (format!("{HEADER}\n{GOOD}\n{BAD}\n{GOOD}\n"), 3),
            (format!("{HEADER}\r\n{GOOD}\r\n{BAD}\r\n{GOOD}\r\n"), 3),
            (format!("{HEADER}\r\n{GOOD}\r\n\r\n{BAD}\r\n{GOOD}\r\n"), 4),
            (format!("{HEADER}\n{GOOD}\n\n\n{BAD}\n{GOOD}\n"), 5),
            (format!("{GOOD}\n\n{GOOD}\n{BAD}\n"), 4),
        ];
        for (text, expected) in &cases {
            assert_eq!(skipped_lines(text), vec![*expected], "{text:?}");
            assert_eq!(strict_line(text), *expected, "{text:?}");
        }
    }

    #[test]
    fn test_malformed_first_row_is_taken_as_header() {
        let text = format!("abc\t1,5\t2,0\t3,0\t1,0\n{GOOD}\n{GOOD}\n");
        let report = parse_str(&text, "cell", &ProcessorConfig::default()).unwrap();
        assert!(report.header_skipped);
        assert!(report.skipped.is_empty());
        assert_eq!(report.dataset.len(), 2);
    }

    #[test]
    fn test_load_file_round_trip_raw_capacity() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("formation.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            "{}",
            file_text(&["1\t0\t3,0\t0,25\t1,0", "1\t10\t3,1\t0,5\t1,0"])
        )
        .unwrap();
        drop(file);

        let config = ProcessorConfig::default();
        let mut report = load_file(&path, &config).unwrap();
        assert_eq!(report.dataset.name(), "formation.txt");
        report.dataset.normalize_capacity(0.01).unwrap();

        let reloaded = load_file(&path, &config).unwrap();
        let raw: Vec<f64> = reloaded.dataset.raw_column(Column::Capacity).collect();
        assert_eq!(raw, vec![0.25, 0.5]);
        assert_eq!(
            report.dataset.raw_column(Column::Capacity).collect::<Vec<_>>(),
            raw
        );
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_file(&temp_dir.path().join("nope.txt"), &ProcessorConfig::default());
        assert!(matches!(err, Err(LoadError::Io { .. })));
    }
}
