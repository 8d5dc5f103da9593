use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::data::error::{DumpError, DumpResult};

pub const DEFAULT_ROW_WIDTH: usize = 10;
pub const DEFAULT_DELIMITER: char = ',';

// ---------------------------------------------------------------------------
// Enumerated options
// ---------------------------------------------------------------------------

/// How fields are separated on a signal dump line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FieldDelimiter {
    #[default]
    Comma,
    /// Any run of spaces or tabs.
    Whitespace,
    /// Headerless `time value series` lines; one signal per series tag.
    Tagged,
}

/// How tokens are separated in a raw sample file fed to the reformatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum InputSeparator {
    #[default]
    Whitespace,
    /// Commas or whitespace; empty fields are ignored.
    Comma,
}

/// What to do with a data line that does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Leniency {
    /// Abort on the first malformed line.
    Strict,
    /// Log the line and keep going.
    #[default]
    Lenient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LegendCorner {
    #[default]
    UpperRight,
    UpperLeft,
    LowerRight,
    LowerLeft,
}

// ---------------------------------------------------------------------------
// Signal selection
// ---------------------------------------------------------------------------

/// One requested curve, as written by the operator.
///
/// On the command line this is `name[:scale[:offset[:spacing]]]`; empty
/// parts keep their default (`Sample::-2000` shifts without scaling).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSelection {
    pub name: String,
    #[serde(default = "unit_scale")]
    pub scale: f64,
    #[serde(default)]
    pub offset: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<f64>,
}

fn unit_scale() -> f64 {
    1.0
}

impl SignalSelection {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scale: 1.0,
            offset: 0.0,
            spacing: None,
        }
    }

    /// Fill in the run-wide spacing and check the numbers.
    pub fn resolve(&self, sample_spacing: Option<f64>) -> DumpResult<PlotSpec> {
        let spacing = self.spacing.or(sample_spacing).ok_or_else(|| {
            DumpError::InvalidConfig(format!(
                "no sample spacing for signal '{}'; pass --spacing or give one in the selection",
                self.name
            ))
        })?;
        check_spacing(spacing)?;
        if !self.scale.is_finite() || !self.offset.is_finite() {
            return Err(DumpError::InvalidConfig(format!(
                "scale and offset for '{}' must be finite",
                self.name
            )));
        }
        Ok(PlotSpec {
            name: self.name.clone(),
            scale: self.scale,
            offset: self.offset,
            spacing,
        })
    }
}

impl FromStr for SignalSelection {
    type Err = DumpError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| DumpError::InvalidSelection {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };
        let mut parts = spec.split(':');
        let name = parts.next().unwrap_or("").trim();
        if name.is_empty() {
            return Err(invalid("missing signal name"));
        }
        let mut number = |what: &str| -> Result<Option<f64>, DumpError> {
            match parts.next().map(str::trim) {
                None | Some("") => Ok(None),
                Some(text) => text
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| invalid(&format!("{what} '{text}' is not a number"))),
            }
        };
        let scale = number("scale")?.unwrap_or(1.0);
        let offset = number("offset")?.unwrap_or(0.0);
        let spacing = number("spacing")?;
        if parts.next().is_some() {
            return Err(invalid("expected at most name:scale:offset:spacing"));
        }
        Ok(SignalSelection {
            scale,
            offset,
            spacing,
            ..SignalSelection::named(name)
        })
    }
}

/// A selection with every value settled, ready for curve building.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSpec {
    pub name: String,
    pub scale: f64,
    pub offset: f64,
    pub spacing: f64,
}

fn check_spacing(spacing: f64) -> DumpResult<()> {
    if spacing.is_finite() && spacing > 0.0 {
        Ok(())
    } else {
        Err(DumpError::InvalidConfig(format!(
            "sample spacing must be a positive number, got {spacing}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Config file sections
// ---------------------------------------------------------------------------

/// Reformatter settings as found in a config file or on the command line.
/// Unset fields fall through to the next source and finally to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReformatSection {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub row_width: Option<usize>,
    pub delimiter: Option<char>,
    pub trailing_delimiter: Option<bool>,
    pub input_separator: Option<InputSeparator>,
}

impl ReformatSection {
    /// Values set here win; the rest come from `fallback`.
    pub fn or(self, fallback: ReformatSection) -> ReformatSection {
        ReformatSection {
            input: self.input.or(fallback.input),
            output: self.output.or(fallback.output),
            row_width: self.row_width.or(fallback.row_width),
            delimiter: self.delimiter.or(fallback.delimiter),
            trailing_delimiter: self.trailing_delimiter.or(fallback.trailing_delimiter),
            input_separator: self.input_separator.or(fallback.input_separator),
        }
    }

    pub fn into_config(self) -> DumpResult<ReformatConfig> {
        let input = self
            .input
            .ok_or_else(|| DumpError::InvalidConfig("no input file given".into()))?;
        let output = self
            .output
            .ok_or_else(|| DumpError::InvalidConfig("no output file given".into()))?;
        let defaults = ReformatConfig::new(input, output);
        let config = ReformatConfig {
            row_width: self.row_width.unwrap_or(defaults.row_width),
            delimiter: self.delimiter.unwrap_or(defaults.delimiter),
            trailing_delimiter: self.trailing_delimiter.unwrap_or(defaults.trailing_delimiter),
            input_separator: self.input_separator.unwrap_or(defaults.input_separator),
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }
}

/// Plotter settings as found in a config file or on the command line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotSection {
    pub input: Option<PathBuf>,
    pub delimiter: Option<FieldDelimiter>,
    pub leniency: Option<Leniency>,
    pub sample_spacing: Option<f64>,
    pub signals: Option<Vec<SignalSelection>>,
    pub zero_line: Option<bool>,
    pub title: Option<String>,
    pub legend: Option<LegendCorner>,
    pub save: Option<PathBuf>,
}

impl PlotSection {
    pub fn or(self, fallback: PlotSection) -> PlotSection {
        PlotSection {
            input: self.input.or(fallback.input),
            delimiter: self.delimiter.or(fallback.delimiter),
            leniency: self.leniency.or(fallback.leniency),
            sample_spacing: self.sample_spacing.or(fallback.sample_spacing),
            signals: self.signals.or(fallback.signals),
            zero_line: self.zero_line.or(fallback.zero_line),
            title: self.title.or(fallback.title),
            legend: self.legend.or(fallback.legend),
            save: self.save.or(fallback.save),
        }
    }

    pub fn into_config(self) -> DumpResult<PlotConfig> {
        let config = PlotConfig {
            input: self
                .input
                .ok_or_else(|| DumpError::InvalidConfig("no input file given".into()))?,
            delimiter: self.delimiter.unwrap_or_default(),
            leniency: self.leniency.unwrap_or_default(),
            sample_spacing: self.sample_spacing,
            signals: self.signals.unwrap_or_default(),
            zero_line: self.zero_line.unwrap_or(false),
            title: self.title,
            legend: self.legend.unwrap_or_default(),
            save: self.save,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Top-level layout of a JSON config file. Either section may be absent.
///
/// ```json
/// {
///   "reformat": { "row_width": 1, "trailing_delimiter": true },
///   "plot": {
///     "sample_spacing": 0.002,
///     "signals": [
///       { "name": "Sample", "offset": -2000 },
///       { "name": "Dual_QRS", "scale": 1000 }
///     ]
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub reformat: ReformatSection,
    pub plot: PlotSection,
}

impl ConfigFile {
    pub fn load(path: &Path) -> DumpResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: ConfigFile = serde_json::from_str(&text)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Resolved configurations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ReformatConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub row_width: usize,
    pub delimiter: char,
    pub trailing_delimiter: bool,
    pub input_separator: InputSeparator,
}

impl ReformatConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            row_width: DEFAULT_ROW_WIDTH,
            delimiter: DEFAULT_DELIMITER,
            trailing_delimiter: true,
            input_separator: InputSeparator::Whitespace,
        }
    }

    pub fn validate(&self) -> DumpResult<()> {
        if self.row_width == 0 {
            return Err(DumpError::InvalidConfig("row width must be at least 1".into()));
        }
        let d = self.delimiter;
        if !d.is_ascii() || d.is_ascii_digit() || matches!(d, '-' | '+' | '"' | '\n' | '\r') {
            return Err(DumpError::InvalidConfig(format!(
                "delimiter {d:?} must be a single ASCII character that cannot appear in a number"
            )));
        }
        Ok(())
    }

    /// The delimiter as the single byte the CSV writer wants.
    pub fn delimiter_byte(&self) -> u8 {
        // validate() guarantees ASCII
        self.delimiter as u8
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotConfig {
    pub input: PathBuf,
    pub delimiter: FieldDelimiter,
    pub leniency: Leniency,
    pub sample_spacing: Option<f64>,
    pub signals: Vec<SignalSelection>,
    pub zero_line: bool,
    pub title: Option<String>,
    pub legend: LegendCorner,
    pub save: Option<PathBuf>,
}

impl PlotConfig {
    pub fn validate(&self) -> DumpResult<()> {
        if self.signals.is_empty() {
            return Err(DumpError::InvalidConfig(
                "no signals selected; pass --signal NAME at least once".into(),
            ));
        }
        if let Some(spacing) = self.sample_spacing {
            check_spacing(spacing)?;
        }
        self.plot_specs().map(|_| ())
    }

    pub fn plot_specs(&self) -> DumpResult<Vec<PlotSpec>> {
        self.signals
            .iter()
            .map(|s| s.resolve(self.sample_spacing))
            .collect()
    }

    /// Spacing used for the zero reference line: the run-wide value, or the
    /// first selection's when only per-signal spacings were given.
    pub fn reference_spacing(&self) -> Option<f64> {
        self.sample_spacing
            .or_else(|| self.signals.iter().find_map(|s| s.spacing))
    }
}
