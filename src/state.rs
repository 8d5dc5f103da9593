use eframe::egui::Color32;

use crate::color::generate_palette;
use crate::data::chart::Chart;
use crate::data::model::Curve;

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// The full viewer state, independent of rendering.
pub struct ViewerState {
    /// The chart being shown. Built once before the window opens.
    pub chart: Chart,

    /// Where the data came from, for the status line.
    pub source: String,

    /// One colour per curve, same order as `chart.curves`.
    pub colors: Vec<Color32>,

    /// Per-curve visibility, same order as `chart.curves`.
    pub visible: Vec<bool>,

    /// Draw point markers on top of the lines.
    pub show_markers: bool,

    /// Draw the zero reference line (only when the chart has one).
    pub show_reference: bool,
}

impl ViewerState {
    pub fn new(chart: Chart, source: impl Into<String>) -> Self {
        let n = chart.curves.len();
        let show_reference = chart.reference.is_some();
        Self {
            colors: generate_palette(n),
            visible: vec![true; n],
            chart,
            source: source.into(),
            show_markers: true,
            show_reference,
        }
    }

    /// Curves currently switched on, with their colours.
    pub fn visible_curves(&self) -> impl Iterator<Item = (&Curve, Color32)> {
        self.chart
            .curves
            .iter()
            .zip(self.colors.iter().copied())
            .zip(self.visible.iter())
            .filter(|(_, &on)| on)
            .map(|(pair, _)| pair)
    }

    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|&&on| on).count()
    }

    pub fn set_all(&mut self, on: bool) {
        self.visible.iter_mut().for_each(|v| *v = on);
    }

    /// One-line summary for the top bar.
    pub fn summary(&self) -> String {
        format!(
            "{}: {} samples, {} of {} curves shown",
            self.source,
            self.chart.sample_count,
            self.visible_count(),
            self.chart.curves.len()
        )
    }
}
