use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

use crate::config::{
    FieldDelimiter, InputSeparator, LegendCorner, Leniency, PlotSection, ReformatSection,
    SignalSelection,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Reformat raw sensor dumps and plot multi-column signal dumps"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rewrite a file of whitespace-separated integers as fixed-width delimited rows
    Reformat(ReformatArgs),

    /// Plot selected columns of a signal dump over time
    Plot(PlotArgs),

    /// List the signals of a dump with their sample counts and ranges
    Signals(SignalsArgs),
}

#[derive(Args, Debug)]
pub struct ReformatArgs {
    /// Raw sample file to read
    #[arg(value_hint = ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    /// File to write; overwritten if it exists
    #[arg(value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Values per output row [default: 10]
    #[arg(short = 'w', long)]
    pub row_width: Option<usize>,

    /// Single-character delimiter between values [default: ,]
    #[arg(short, long)]
    pub delimiter: Option<char>,

    /// End every row with a delimiter (the default)
    #[arg(long, overrides_with = "no_trailing_delimiter")]
    pub trailing_delimiter: bool,

    /// Do not end rows with a delimiter
    #[arg(long)]
    pub no_trailing_delimiter: bool,

    /// How values are separated in the input [default: whitespace]
    #[arg(long, value_enum)]
    pub input_separator: Option<InputSeparator>,

    /// JSON config file; its "reformat" section fills anything not given here
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
}

impl ReformatArgs {
    pub fn section(&self) -> ReformatSection {
        ReformatSection {
            input: self.input.clone(),
            output: self.output.clone(),
            row_width: self.row_width,
            delimiter: self.delimiter,
            trailing_delimiter: flag_pair(self.trailing_delimiter, self.no_trailing_delimiter),
            input_separator: self.input_separator,
        }
    }
}

#[derive(Args, Debug)]
pub struct PlotArgs {
    /// Signal dump to read
    #[arg(value_hint = ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    /// Signal to draw, as NAME[:SCALE[:OFFSET[:SPACING]]]; repeat for more curves
    #[arg(short, long = "signal", value_name = "SELECTION")]
    pub signals: Vec<SignalSelection>,

    /// Seconds between samples, used by selections without their own spacing
    #[arg(long)]
    pub spacing: Option<f64>,

    /// Field delimiter of the dump [default: comma]
    #[arg(short, long, value_enum)]
    pub delimiter: Option<FieldDelimiter>,

    #[command(flatten)]
    pub leniency: LeniencyArgs,

    /// Draw a reference line at zero
    #[arg(long, overrides_with = "no_zero_line")]
    pub zero_line: bool,

    /// Do not draw the zero line, even if the config file asks for it
    #[arg(long, hide = true)]
    pub no_zero_line: bool,

    /// Chart title
    #[arg(long)]
    pub title: Option<String>,

    /// Legend placement [default: upper-right]
    #[arg(long, value_enum)]
    pub legend: Option<LegendCorner>,

    /// Write the chart to this PNG file instead of opening a window
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub save: Option<PathBuf>,

    /// JSON config file; its "plot" section fills anything not given here
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
}

impl PlotArgs {
    pub fn section(&self) -> PlotSection {
        PlotSection {
            input: self.input.clone(),
            delimiter: self.delimiter,
            leniency: self.leniency.value(),
            sample_spacing: self.spacing,
            signals: (!self.signals.is_empty()).then(|| self.signals.clone()),
            zero_line: flag_pair(self.zero_line, self.no_zero_line),
            title: self.title.clone(),
            legend: self.legend,
            save: self.save.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct SignalsArgs {
    /// Signal dump to read
    #[arg(value_hint = ValueHint::FilePath)]
    pub input: PathBuf,

    /// Field delimiter of the dump
    #[arg(short, long, value_enum, default_value_t = FieldDelimiter::Comma)]
    pub delimiter: FieldDelimiter,

    #[command(flatten)]
    pub leniency: LeniencyArgs,
}

#[derive(Args, Debug)]
pub struct LeniencyArgs {
    /// Abort on the first malformed line
    #[arg(long, conflicts_with = "lenient")]
    pub strict: bool,

    /// Skip malformed lines with a warning (the default)
    #[arg(long)]
    pub lenient: bool,
}

impl LeniencyArgs {
    pub fn value(&self) -> Option<Leniency> {
        match (self.strict, self.lenient) {
            (true, _) => Some(Leniency::Strict),
            (_, true) => Some(Leniency::Lenient),
            _ => None,
        }
    }
}

/// `--thing` / `--no-thing` as a tri-state.
fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
