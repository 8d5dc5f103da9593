use std::path::{Path, PathBuf};

use crate::config::{FieldDelimiter, InputSeparator, Leniency};

use super::error::{DumpError, DumpResult};
use super::model::{NumericStream, SignalTable};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Fail with [`DumpError::FileNotFound`] unless `path` exists, reporting the
/// working directory the path was resolved against.
pub fn ensure_exists(path: &Path) -> DumpResult<()> {
    if path.exists() {
        return Ok(());
    }
    Err(DumpError::FileNotFound {
        path: path.to_path_buf(),
        cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    })
}

/// Read a raw sample dump into one flat stream of integers.
pub fn load_numeric_stream(path: &Path, separator: InputSeparator) -> DumpResult<NumericStream> {
    ensure_exists(path)?;
    let text = std::fs::read_to_string(path)?;
    let stream = parse_numeric_stream(&text, separator)?;
    log::info!("Read {} values from {}", stream.len(), path.display());
    Ok(stream)
}

/// Read a signal dump: a header line of names, then one value per name per line.
pub fn load_signal_table(
    path: &Path,
    delimiter: FieldDelimiter,
    leniency: Leniency,
) -> DumpResult<SignalTable> {
    ensure_exists(path)?;
    let text = std::fs::read_to_string(path)?;
    let (table, report) = parse_signal_table(&text, delimiter, leniency)?;
    log::info!(
        "Loaded {} signals × {} samples from {} ({} data lines accepted)",
        table.width(),
        table.sample_count(),
        path.display(),
        report.accepted
    );
    if !report.skipped_lines.is_empty() {
        log::warn!(
            "{} malformed line(s) skipped: {:?}",
            report.skipped_lines.len(),
            report.skipped_lines
        );
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Raw sample dumps
// ---------------------------------------------------------------------------

/// Tokens are split per physical line and then flattened, so a token never
/// spans a line break. Every token must be an integer.
pub fn parse_numeric_stream(text: &str, separator: InputSeparator) -> DumpResult<NumericStream> {
    let mut values = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        for token in split_tokens(line, separator) {
            let value = token.parse::<i64>().map_err(|_| DumpError::Parse {
                line: idx + 1,
                token: token.to_string(),
            })?;
            values.push(value);
        }
    }
    Ok(NumericStream::new(values))
}

fn split_tokens(line: &str, separator: InputSeparator) -> Box<dyn Iterator<Item = &str> + '_> {
    match separator {
        InputSeparator::Whitespace => Box::new(line.split_whitespace()),
        InputSeparator::Comma => Box::new(
            line.split(|c: char| c == ',' || c.is_whitespace())
                .filter(|t| !t.is_empty()),
        ),
    }
}

// ---------------------------------------------------------------------------
// Signal dumps
// ---------------------------------------------------------------------------

/// What the parser left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Lines that became samples.
    pub accepted: usize,
    /// 1-based numbers of lines dropped in lenient mode.
    pub skipped_lines: Vec<usize>,
}

impl ParseReport {
    /// Record a malformed line: abort under [`Leniency::Strict`], log and
    /// remember it under [`Leniency::Lenient`].
    fn reject(
        &mut self,
        leniency: Leniency,
        line_no: usize,
        fields: &[String],
        err: DumpError,
    ) -> DumpResult<()> {
        match leniency {
            Leniency::Strict => Err(err),
            Leniency::Lenient => {
                log::warn!("Skipping invalid line {line_no}: {} ({err})", fields.join(" "));
                self.skipped_lines.push(line_no);
                Ok(())
            }
        }
    }
}

/// A non-blank input line split into trimmed fields, with its 1-based number.
type Row = (usize, Vec<String>);

/// Parse a whole signal dump held in memory.
///
/// For comma and whitespace dumps the first non-empty line names the signals.
/// Tagged dumps have no header; see [`parse_tagged`]. Blank lines are ignored.
/// A malformed data line aborts under [`Leniency::Strict`] and is logged and
/// dropped under [`Leniency::Lenient`].
pub fn parse_signal_table(
    text: &str,
    delimiter: FieldDelimiter,
    leniency: Leniency,
) -> DumpResult<(SignalTable, ParseReport)> {
    match delimiter {
        FieldDelimiter::Comma => parse_columns(comma_rows(text)?, leniency),
        FieldDelimiter::Whitespace => parse_columns(whitespace_rows(text), leniency),
        FieldDelimiter::Tagged => parse_tagged(whitespace_rows(text), leniency),
    }
}

/// Header row of names, then one value per name on every row.
fn parse_columns(rows: Vec<Row>, leniency: Leniency) -> DumpResult<(SignalTable, ParseReport)> {
    let mut rows = rows.into_iter();
    let (_, names) = rows.next().ok_or(DumpError::MissingHeader)?;
    log::debug!("Header declares signals {names:?}");

    let mut columns: Vec<Vec<i64>> = vec![Vec::new(); names.len()];
    let mut report = ParseReport::default();

    for (line_no, fields) in rows {
        match parse_row(&fields, line_no, names.len()) {
            Ok(row) => {
                for (column, value) in columns.iter_mut().zip(row) {
                    column.push(value);
                }
                report.accepted += 1;
            }
            Err(err) => report.reject(leniency, line_no, &fields, err)?,
        }
    }

    let table = SignalTable::from_columns(names, columns)?;
    Ok((table, report))
}

/// Samples written by the desktop debug harness, one `time value series` line
/// per sample. Series become signals in order of first appearance and must
/// share one time sequence, which becomes the table's time axis.
fn parse_tagged(rows: Vec<Row>, leniency: Leniency) -> DumpResult<(SignalTable, ParseReport)> {
    let mut names: Vec<String> = Vec::new();
    let mut times: Vec<Vec<i64>> = Vec::new();
    let mut values: Vec<Vec<i64>> = Vec::new();
    let mut report = ParseReport::default();

    for (line_no, fields) in rows {
        let (time, value) = match parse_tagged_row(&fields, line_no) {
            Ok(sample) => sample,
            Err(err) => {
                report.reject(leniency, line_no, &fields, err)?;
                continue;
            }
        };
        let series = &fields[2];
        let idx = match names.iter().position(|n| n == series) {
            Some(idx) => idx,
            None => {
                log::debug!("New series '{series}' at line {line_no}");
                names.push(series.clone());
                times.push(Vec::new());
                values.push(Vec::new());
                names.len() - 1
            }
        };
        times[idx].push(time);
        values[idx].push(value);
        report.accepted += 1;
    }

    let table = SignalTable::from_columns(names, values)?;
    let mut times = times.into_iter();
    let axis = times.next().unwrap_or_default();
    for (signal, series_times) in table.signals().iter().skip(1).zip(times) {
        if let Some(index) = axis.iter().zip(&series_times).position(|(a, b)| a != b) {
            return Err(DumpError::MisalignedSeries {
                name: signal.name.clone(),
                index,
                expected: axis[index],
                found: series_times[index],
            });
        }
    }
    Ok((table.with_ticks(axis)?, report))
}

/// All fields of a data line, or the first problem found.
fn parse_row(fields: &[String], line_no: usize, expected: usize) -> DumpResult<Vec<i64>> {
    if fields.len() != expected {
        return Err(DumpError::ColumnCountMismatch {
            line: line_no,
            expected,
            found: fields.len(),
        });
    }
    fields
        .iter()
        .map(|field| parse_field(field, line_no))
        .collect()
}

fn parse_tagged_row(fields: &[String], line_no: usize) -> DumpResult<(i64, i64)> {
    if fields.len() != 3 {
        return Err(DumpError::ColumnCountMismatch {
            line: line_no,
            expected: 3,
            found: fields.len(),
        });
    }
    Ok((parse_field(&fields[0], line_no)?, parse_field(&fields[1], line_no)?))
}

fn parse_field(field: &str, line_no: usize) -> DumpResult<i64> {
    field.parse::<i64>().map_err(|_| DumpError::Parse {
        line: line_no,
        token: field.to_string(),
    })
}

/// Comma-separated rows read through the CSV reader, so quoted fields are
/// unquoted. A single empty field after a trailing comma is dropped.
fn comma_rows(text: &str) -> DumpResult<Vec<Row>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let line_no = record.position().map_or(0, |p| p.line() as usize);
        let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
        if fields.len() > 1 && fields.last().is_some_and(String::is_empty) {
            fields.pop();
        }
        rows.push((line_no, fields));
    }
    Ok(rows)
}

fn whitespace_rows(text: &str) -> Vec<Row> {
    text.lines()
        .enumerate()
        .map(|(idx, line)| {
            let fields = line.split_whitespace().map(str::to_string).collect();
            (idx + 1, fields)
        })
        .filter(|(_, fields): &Row| !fields.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn samples<'a>(table: &'a SignalTable, name: &str) -> &'a [i64] {
        &table.get(name).unwrap().samples
    }

    #[test]
    fn numeric_stream_flattens_lines() {
        let stream = parse_numeric_stream("1 2  3\n\t4\n\n5 -6 +7\n", InputSeparator::Whitespace)
            .unwrap();
        assert_eq!(stream.values(), &[1, 2, 3, 4, 5, -6, 7]);
    }

    #[test]
    fn numeric_stream_rejects_bad_token() {
        let err = parse_numeric_stream("1 2\n3 x4\n", InputSeparator::Whitespace).unwrap_err();
        assert!(matches!(err, DumpError::Parse { line: 2, ref token } if token == "x4"));
    }

    #[test]
    fn numeric_stream_with_commas() {
        let stream = parse_numeric_stream("1,2,3,\n4, 5,\n6", InputSeparator::Comma).unwrap();
        assert_eq!(stream.values(), &[1, 2, 3, 4, 5, 6]);
        // whitespace mode keeps commas inside tokens
        assert!(parse_numeric_stream("1,2", InputSeparator::Whitespace).is_err());
    }

    #[test]
    fn comma_table() {
        let (table, report) =
            parse_signal_table("a,b\n1,2\n3,4\n", FieldDelimiter::Comma, Leniency::Strict)
                .unwrap();
        assert_eq!(samples(&table, "a"), &[1, 3]);
        assert_eq!(samples(&table, "b"), &[2, 4]);
        assert_eq!(report.accepted, 2);
        assert!(report.skipped_lines.is_empty());
    }

    #[test]
    fn length_matches_data_lines() {
        let text = "Sample Filtered Deriv_2\n10 11 12\n20 21 22\n30 31 32\n40 41 42\n";
        let (table, _) =
            parse_signal_table(text, FieldDelimiter::Whitespace, Leniency::Strict).unwrap();
        assert_eq!(table.width(), 3);
        for signal in table.signals() {
            assert_eq!(signal.samples.len(), 4);
        }
        assert_eq!(samples(&table, "Deriv_2"), &[12, 22, 32, 42]);
    }

    #[test]
    fn strict_aborts_on_column_mismatch() {
        let err = parse_signal_table("a b\n1 2\n3\n5 6\n", FieldDelimiter::Whitespace, Leniency::Strict)
            .unwrap_err();
        assert!(matches!(
            err,
            DumpError::ColumnCountMismatch { line: 3, expected: 2, found: 1 }
        ));
    }

    #[test]
    fn strict_aborts_on_bad_field() {
        let err = parse_signal_table("a,b\n1,2\n3,oops\n", FieldDelimiter::Comma, Leniency::Strict)
            .unwrap_err();
        assert!(matches!(err, DumpError::Parse { line: 3, ref token } if token == "oops"));
    }

    #[test]
    fn lenient_skips_bad_lines_and_continues() {
        let text = "a,b\n1,2\n3,oops\n5\n7,8\n";
        let (table, report) =
            parse_signal_table(text, FieldDelimiter::Comma, Leniency::Lenient).unwrap();
        assert_eq!(samples(&table, "a"), &[1, 7]);
        assert_eq!(samples(&table, "b"), &[2, 8]);
        assert_eq!(report.accepted, 2);
        assert_eq!(report.skipped_lines, vec![3, 4]);
    }

    #[test]
    fn trailing_comma_and_blank_lines_are_tolerated() {
        let text = "\n a , b ,\r\n1,2,\n\n3 , 4\n";
        let (table, _) =
            parse_signal_table(text, FieldDelimiter::Comma, Leniency::Strict).unwrap();
        let names: Vec<&str> = table.names().collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(samples(&table, "a"), &[1, 3]);
        assert_eq!(samples(&table, "b"), &[2, 4]);
    }

    #[test]
    fn quoted_fields_are_unquoted() {
        let (table, _) = parse_signal_table(
            "\"Sample\",\"Filtered\"\n1,2\n3,4\n",
            FieldDelimiter::Comma,
            Leniency::Strict,
        )
        .unwrap();
        assert_eq!(samples(&table, "Sample"), &[1, 3]);
        assert_eq!(samples(&table, "Filtered"), &[2, 4]);

        let (table, report) =
            parse_signal_table("a,b\n\"1\",2\n3,4\n", FieldDelimiter::Comma, Leniency::Lenient)
                .unwrap();
        assert_eq!(samples(&table, "a"), &[1, 3]);
        assert_eq!(report.accepted, 2);
        assert!(report.skipped_lines.is_empty());
    }

    #[test]
    fn comma_errors_keep_source_line_numbers() {
        let err = parse_signal_table("a,b\n\n1,2\n3,x\n", FieldDelimiter::Comma, Leniency::Strict)
            .unwrap_err();
        assert!(matches!(err, DumpError::Parse { line: 4, ref token } if token == "x"));
    }

    #[test]
    fn tagged_series_become_signals() {
        let text = "0 2048 raw\n0 2040 filtered\n2 2051 raw\n2 2042 filtered\n4 2049 raw\n4 2043 filtered\n";
        let (table, report) =
            parse_signal_table(text, FieldDelimiter::Tagged, Leniency::Strict).unwrap();
        let names: Vec<&str> = table.names().collect();
        assert_eq!(names, vec!["raw", "filtered"]);
        assert_eq!(samples(&table, "raw"), &[2048, 2051, 2049]);
        assert_eq!(samples(&table, "filtered"), &[2040, 2042, 2043]);
        assert_eq!(table.tick(2), 4.0);
        assert_eq!(report.accepted, 6);
    }

    #[test]
    fn tagged_bad_lines_follow_leniency() {
        let text = "0 1 raw\n1 2\n1 2 raw\n2 x raw\n";
        let (table, report) =
            parse_signal_table(text, FieldDelimiter::Tagged, Leniency::Lenient).unwrap();
        assert_eq!(samples(&table, "raw"), &[1, 2]);
        assert_eq!(report.skipped_lines, vec![2, 4]);

        let err = parse_signal_table(text, FieldDelimiter::Tagged, Leniency::Strict).unwrap_err();
        assert!(matches!(
            err,
            DumpError::ColumnCountMismatch { line: 2, expected: 3, found: 2 }
        ));
    }

    #[test]
    fn tagged_series_must_share_time_stamps() {
        let text = "0 1 raw\n0 5 filtered\n1 2 raw\n3 6 filtered\n";
        let err = parse_signal_table(text, FieldDelimiter::Tagged, Leniency::Strict).unwrap_err();
        assert!(matches!(
            err,
            DumpError::MisalignedSeries { ref name, index: 1, expected: 1, found: 3 } if name == "filtered"
        ));

        let uneven = "0 1 raw\n0 5 filtered\n1 2 raw\n";
        assert!(matches!(
            parse_signal_table(uneven, FieldDelimiter::Tagged, Leniency::Strict),
            Err(DumpError::RaggedTable { .. })
        ));
    }

    #[test]
    fn empty_input_has_no_header() {
        assert!(matches!(
            parse_signal_table("\n  \n", FieldDelimiter::Comma, Leniency::Lenient),
            Err(DumpError::MissingHeader)
        ));
    }

    #[test]
    fn header_only_gives_empty_signals() {
        let (table, _) =
            parse_signal_table("a,b\n", FieldDelimiter::Comma, Leniency::Strict).unwrap();
        assert_eq!(table.width(), 2);
        assert_eq!(table.sample_count(), 0);
    }

    #[test]
    fn missing_file_reports_cwd() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("matt_EKG.txt");
        let err = load_numeric_stream(&path, InputSeparator::Whitespace).unwrap_err();
        match err {
            DumpError::FileNotFound { path: p, cwd } => {
                assert_eq!(p, path);
                assert!(!cwd.as_os_str().is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            load_signal_table(&path, FieldDelimiter::Comma, Leniency::Lenient),
            Err(DumpError::FileNotFound { .. })
        ));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.out");
        fs::write(&path, "Sample,Filtered\n2000,1990\n2010,1995\n").unwrap();
        let table = load_signal_table(&path, FieldDelimiter::Comma, Leniency::Lenient).unwrap();
        assert_eq!(samples(&table, "Filtered"), &[1990, 1995]);
    }
}
