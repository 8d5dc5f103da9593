use std::io::Write;

use crate::config::ReformatConfig;

use super::error::DumpResult;
use super::loader::load_numeric_stream;
use super::model::NumericStream;

/// Outcome of a successful [`reformat`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReformatSummary {
    pub values: usize,
    pub rows: usize,
}

/// Rewrite a raw sample dump as fixed-width delimited rows.
///
/// The whole input is read and parsed before the output file is created, so
/// a missing input or a bad token leaves no output behind. An existing
/// output file is overwritten.
pub fn reformat(config: &ReformatConfig) -> DumpResult<ReformatSummary> {
    config.validate()?;
    let stream = load_numeric_stream(&config.input, config.input_separator)?;
    if stream.is_empty() {
        log::warn!("{} holds no numbers; output will be empty", config.input.display());
    }

    let file = std::fs::File::create(&config.output)?;
    let summary = write_rows(&stream, config, file)?;
    log::info!(
        "Wrote {} values in {} rows to {}",
        summary.values,
        summary.rows,
        config.output.display()
    );
    Ok(summary)
}

/// Serialize `stream` as rows of `config.row_width` values.
pub fn write_rows<W: Write>(
    stream: &NumericStream,
    config: &ReformatConfig,
    sink: W,
) -> DumpResult<ReformatSummary> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(config.delimiter_byte())
        .has_headers(false)
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(sink);

    let mut rows = 0;
    for row in stream.rows(config.row_width) {
        let mut record: Vec<String> = row.iter().map(i64::to_string).collect();
        if config.trailing_delimiter {
            // an empty last field puts a delimiter before the newline
            record.push(String::new());
        }
        writer.write_record(&record)?;
        rows += 1;
    }
    writer.flush()?;

    Ok(ReformatSummary {
        values: stream.len(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputSeparator;
    use crate::data::error::DumpError;
    use crate::data::loader::parse_numeric_stream;
    use std::fs;
    use tempfile::tempdir;

    fn render(values: Vec<i64>, config: &ReformatConfig) -> String {
        let mut out = Vec::new();
        write_rows(&NumericStream::new(values), config, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn eleven_values_with_trailing_commas() {
        let config = ReformatConfig::new("in", "out");
        let text = render((1..=11).collect(), &config);
        assert_eq!(text, "1,2,3,4,5,6,7,8,9,10,\n11,\n");
    }

    #[test]
    fn without_trailing_delimiter() {
        let mut config = ReformatConfig::new("in", "out");
        config.trailing_delimiter = false;
        config.row_width = 4;
        config.delimiter = ';';
        let text = render(vec![-1, 2, -3, 4, 5], &config);
        assert_eq!(text, "-1;2;-3;4\n5\n");
    }

    #[test]
    fn one_value_per_row() {
        let mut config = ReformatConfig::new("in", "out");
        config.row_width = 1;
        assert_eq!(render(vec![2048, 2051], &config), "2048,\n2051,\n");
    }

    #[test]
    fn row_widths() {
        for (total, width) in [(0usize, 3usize), (9, 3), (10, 3), (11, 3), (7, 10), (25, 1)] {
            let mut config = ReformatConfig::new("in", "out");
            config.row_width = width;
            config.trailing_delimiter = false;
            let text = render((0..total as i64).collect(), &config);
            let rows: Vec<usize> = text.lines().map(|l| l.split(',').count()).collect();
            assert_eq!(rows.len(), total.div_ceil(width));
            if let Some((last, full)) = rows.split_last() {
                assert!(full.iter().all(|&n| n == width));
                let tail = if total % width == 0 { width } else { total % width };
                assert_eq!(*last, tail);
            }
        }
    }

    #[test]
    fn output_reads_back_to_the_same_sequence() {
        let values: Vec<i64> = vec![2048, 2050, -7, 0, 4095, 12, 13, 99, 1, 2, 3, 4, 5];
        for trailing in [true, false] {
            for width in [1, 5, 10, 13, 20] {
                let mut config = ReformatConfig::new("in", "out");
                config.row_width = width;
                config.trailing_delimiter = trailing;
                let text = render(values.clone(), &config);
                let back = parse_numeric_stream(&text, InputSeparator::Comma).unwrap();
                assert_eq!(back.values(), values.as_slice());
            }
        }
    }

    #[test]
    fn reformat_file_end_to_end() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("matt_EKG.txt");
        let output = dir.path().join("matt_formatted.csv");
        fs::write(&input, "1 2 3 4 5\n6 7 8 9 10 11\n").unwrap();
        fs::write(&output, "stale contents that must disappear\n").unwrap();

        let summary = reformat(&ReformatConfig::new(&input, &output)).unwrap();
        assert_eq!(summary, ReformatSummary { values: 11, rows: 2 });
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "1,2,3,4,5,6,7,8,9,10,\n11,\n"
        );
    }

    #[test]
    fn comma_input_one_per_line() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("ecg_normal_board_calm1.txt");
        let output = dir.path().join("reformatted_numbers.txt");
        fs::write(&input, "2048,2049,\n2050,\n").unwrap();

        let mut config = ReformatConfig::new(&input, &output);
        config.input_separator = InputSeparator::Comma;
        config.row_width = 1;
        reformat(&config).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "2048,\n2049,\n2050,\n");
    }

    #[test]
    fn missing_input_writes_nothing() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.csv");
        let err = reformat(&ReformatConfig::new(dir.path().join("nope.txt"), &output)).unwrap_err();
        assert!(matches!(err, DumpError::FileNotFound { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn bad_token_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let output = dir.path().join("out.csv");
        fs::write(&input, "1 2 3\n4 five 6\n").unwrap();
        let err = reformat(&ReformatConfig::new(&input, &output)).unwrap_err();
        assert!(matches!(err, DumpError::Parse { line: 2, .. }));
        assert!(!output.exists());
    }
}
