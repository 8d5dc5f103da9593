use std::fmt;

use super::error::{DumpError, DumpResult};

// ---------------------------------------------------------------------------
// NumericStream – the flattened contents of a raw sample dump
// ---------------------------------------------------------------------------

/// Integers in the order they appear in the source file, line breaks dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumericStream {
    values: Vec<i64>,
}

impl NumericStream {
    pub fn new(values: Vec<i64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fixed-width windows over the stream; the last one may be shorter.
    ///
    /// `width` must be non-zero; callers validate it through the config.
    pub fn rows(&self, width: usize) -> std::slice::Chunks<'_, i64> {
        self.values().chunks(width)
    }
}

// ---------------------------------------------------------------------------
// Signal – one named column of a signal dump
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub name: String,
    pub samples: Vec<i64>,
}

impl Signal {
    pub fn min(&self) -> Option<i64> {
        self.samples.iter().copied().min()
    }

    pub fn max(&self) -> Option<i64> {
        self.samples.iter().copied().max()
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min(), self.max()) {
            (Some(lo), Some(hi)) => write!(
                f,
                "{}: {} samples, min {lo}, max {hi}",
                self.name,
                self.samples.len()
            ),
            _ => write!(f, "{}: 0 samples", self.name),
        }
    }
}

// ---------------------------------------------------------------------------
// SignalTable – every signal of a dump, in header order
// ---------------------------------------------------------------------------

/// The parsed signal dump.
///
/// Signals keep the order of the header line and all hold the same number
/// of samples (one per accepted data line). Tagged dumps also carry the
/// time stamp of every sample; otherwise the sample index is the time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalTable {
    signals: Vec<Signal>,
    ticks: Option<Vec<i64>>,
}

impl SignalTable {
    /// Build a table from header names and per-column samples.
    pub fn from_columns(names: Vec<String>, columns: Vec<Vec<i64>>) -> DumpResult<Self> {
        if names.is_empty() {
            return Err(DumpError::MissingHeader);
        }
        if names.len() != columns.len() {
            return Err(DumpError::ShapeMismatch {
                names: names.len(),
                columns: columns.len(),
            });
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(DumpError::DuplicateSignal(name.clone()));
            }
        }

        let expected = columns[0].len();
        let signals: Vec<Signal> = names
            .into_iter()
            .zip(columns)
            .map(|(name, samples)| Signal { name, samples })
            .collect();
        if let Some(bad) = signals.iter().find(|s| s.samples.len() != expected) {
            return Err(DumpError::RaggedTable {
                name: bad.name.clone(),
                expected,
                found: bad.samples.len(),
            });
        }

        Ok(SignalTable {
            signals,
            ticks: None,
        })
    }

    /// Attach recorded time stamps, one per sample.
    pub fn with_ticks(mut self, ticks: Vec<i64>) -> DumpResult<Self> {
        if ticks.len() != self.sample_count() {
            return Err(DumpError::RaggedTable {
                name: "time".into(),
                expected: self.sample_count(),
                found: ticks.len(),
            });
        }
        self.ticks = Some(ticks);
        Ok(self)
    }

    /// Time of sample `index` in source units: the recorded stamp if there is
    /// one, the index otherwise.
    pub fn tick(&self, index: usize) -> f64 {
        match &self.ticks {
            Some(ticks) => ticks[index] as f64,
            None => index as f64,
        }
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.signals.iter().map(|s| s.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|s| s.name == name)
    }

    /// Look up a signal, failing with [`DumpError::UnknownSignal`].
    pub fn signal(&self, name: &str) -> DumpResult<&Signal> {
        self.get(name)
            .ok_or_else(|| DumpError::UnknownSignal(name.to_string()))
    }

    /// Number of signals (columns).
    pub fn width(&self) -> usize {
        self.signals.len()
    }

    /// Number of sample ticks, shared by every signal.
    pub fn sample_count(&self) -> usize {
        self.signals.first().map_or(0, |s| s.samples.len())
    }
}

// ---------------------------------------------------------------------------
// Curve – a selection ready to be drawn
// ---------------------------------------------------------------------------

/// A labelled series of `[time, value]` points.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub name: String,
    pub points: Vec<[f64; 2]>,
}

impl Curve {
    /// `(min, max)` over the values, `None` when the curve has no points.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.points.iter().fold(None, |acc, &[_, y]| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
        })
    }
}
