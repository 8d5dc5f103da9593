use crate::config::{LegendCorner, PlotConfig, PlotSpec};

use super::error::DumpResult;
use super::model::{Curve, Signal, SignalTable};

pub const X_LABEL: &str = "Time (s)";
pub const Y_LABEL: &str = "Amplitude";
pub const REFERENCE_NAME: &str = "y = 0";

// ---------------------------------------------------------------------------
// Curve building
// ---------------------------------------------------------------------------

/// Turn one signal of `table` into points: `x = tick * spacing`,
/// `y = v * scale + offset`. The tick is the sample index unless the table
/// recorded time stamps.
pub fn transform(table: &SignalTable, signal: &Signal, spec: &PlotSpec) -> Curve {
    let points = signal
        .samples
        .iter()
        .enumerate()
        .map(|(i, &v)| [table.tick(i) * spec.spacing, v as f64 * spec.scale + spec.offset])
        .collect();
    Curve {
        name: signal.name.clone(),
        points,
    }
}

/// One curve per spec, in order. Every name is checked before any curve is
/// built so an unknown signal fails the whole chart.
pub fn build_curves(table: &SignalTable, specs: &[PlotSpec]) -> DumpResult<Vec<Curve>> {
    let signals = specs
        .iter()
        .map(|spec| table.signal(&spec.name))
        .collect::<DumpResult<Vec<&Signal>>>()
        .map_err(|err| {
            let known: Vec<&str> = table.names().collect();
            log::warn!("available signals: {}", known.join(", "));
            err
        })?;
    Ok(signals
        .into_iter()
        .zip(specs)
        .map(|(signal, spec)| transform(table, signal, spec))
        .collect())
}

/// A flat line at zero spanning the first signal of the table.
pub fn zero_reference(table: &SignalTable, spacing: f64) -> Curve {
    let points = (0..table.sample_count())
        .map(|i| [table.tick(i) * spacing, 0.0])
        .collect();
    Curve {
        name: REFERENCE_NAME.to_string(),
        points,
    }
}

// ---------------------------------------------------------------------------
// Chart – everything a backend needs to draw
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: Option<String>,
    pub curves: Vec<Curve>,
    pub reference: Option<Curve>,
    pub legend: LegendCorner,
    pub sample_count: usize,
}

impl Chart {
    pub fn build(table: &SignalTable, config: &PlotConfig) -> DumpResult<Self> {
        let specs = config.plot_specs()?;
        let curves = build_curves(table, &specs)?;
        let reference = match (config.zero_line, config.reference_spacing()) {
            (true, Some(spacing)) => Some(zero_reference(table, spacing)),
            _ => None,
        };
        for spec in &specs {
            log::debug!(
                "plotting {} × {} + {} every {} s",
                spec.name,
                spec.scale,
                spec.offset,
                spec.spacing
            );
        }
        Ok(Chart {
            title: config.title.clone(),
            curves,
            reference,
            legend: config.legend,
            sample_count: table.sample_count(),
        })
    }

    /// Curves followed by the reference line, if any.
    pub fn all_curves(&self) -> impl Iterator<Item = &Curve> {
        self.curves.iter().chain(self.reference.iter())
    }

    /// Time span covered by any curve; `(0, 1)` when nothing has points.
    pub fn time_range(&self) -> (f64, f64) {
        let end = self
            .all_curves()
            .filter_map(|c| c.points.last().map(|p| p[0]))
            .fold(0.0f64, f64::max);
        if end > 0.0 {
            (0.0, end)
        } else {
            (0.0, 1.0)
        }
    }

    /// Value span over all curves, padded when flat or empty.
    pub fn value_range(&self) -> (f64, f64) {
        let (lo, hi) = self
            .all_curves()
            .filter_map(Curve::value_range)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (a, b)| {
                (lo.min(a), hi.max(b))
            });
        if !lo.is_finite() || !hi.is_finite() {
            (-1.0, 1.0)
        } else if (hi - lo).abs() < f64::EPSILON {
            (lo - 1.0, hi + 1.0)
        } else {
            (lo, hi)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FieldDelimiter, Leniency, SignalSelection};
    use crate::data::error::DumpError;

    fn table(columns: &[(&str, Vec<i64>)]) -> SignalTable {
        SignalTable::from_columns(
            columns.iter().map(|(n, _)| n.to_string()).collect(),
            columns.iter().map(|(_, v)| v.clone()).collect(),
        )
        .unwrap()
    }

    fn spec(name: &str, scale: f64, offset: f64, spacing: f64) -> PlotSpec {
        PlotSpec {
            name: name.to_string(),
            scale,
            offset,
            spacing,
        }
    }

    fn plot_config(signals: Vec<SignalSelection>) -> PlotConfig {
        PlotConfig {
            input: "run.out".into(),
            delimiter: FieldDelimiter::Comma,
            leniency: Leniency::Lenient,
            sample_spacing: Some(0.002),
            signals,
            zero_line: false,
            title: None,
            legend: LegendCorner::UpperRight,
            save: None,
        }
    }

    #[test]
    fn scale_offset_and_spacing() {
        let t = table(&[("a", vec![0, 10, 20])]);
        let curves = build_curves(&t, &[spec("a", 2.0, -5.0, 0.002)]).unwrap();
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].name, "a");
        assert_eq!(curves[0].points, vec![[0.0, -5.0], [0.002, 15.0], [0.004, 35.0]]);
    }

    #[test]
    fn identity_transform_keeps_values() {
        let values = vec![2048, -3, 0, 4095, 17];
        let t = table(&[("Sample", values.clone())]);
        let curves = build_curves(&t, &[spec("Sample", 1.0, 0.0, 0.002)]).unwrap();
        let ys: Vec<f64> = curves[0].points.iter().map(|p| p[1]).collect();
        let expected: Vec<f64> = values.iter().map(|&v| v as f64).collect();
        assert_eq!(ys, expected);
    }

    #[test]
    fn selections_keep_their_order() {
        let t = table(&[("a", vec![1]), ("b", vec![2]), ("c", vec![3])]);
        let curves = build_curves(
            &t,
            &[spec("c", 1.0, 0.0, 1.0), spec("a", 1.0, 0.0, 1.0)],
        )
        .unwrap();
        let names: Vec<&str> = curves.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a"]);
    }

    #[test]
    fn unknown_signal_fails_the_chart() {
        let t = table(&[("a", vec![1, 2])]);
        let err = build_curves(&t, &[spec("a", 1.0, 0.0, 1.0), spec("Left_QRS", 1.0, 0.0, 1.0)])
            .unwrap_err();
        assert!(matches!(err, DumpError::UnknownSignal(ref n) if n == "Left_QRS"));
    }

    #[test]
    fn zero_line_follows_first_signal() {
        let t = table(&[("a", vec![5, 6, 7, 8]), ("b", vec![1, 1, 1, 1])]);
        let line = zero_reference(&t, 0.5);
        assert_eq!(line.points, vec![[0.0, 0.0], [0.5, 0.0], [1.0, 0.0], [1.5, 0.0]]);
    }

    #[test]
    fn recorded_ticks_set_the_time_axis() {
        let t = table(&[("raw", vec![2048, 2050, 2047])])
            .with_ticks(vec![10, 12, 16])
            .unwrap();
        let curves = build_curves(&t, &[spec("raw", 1.0, 0.0, 0.5)]).unwrap();
        assert_eq!(curves[0].points, vec![[5.0, 2048.0], [6.0, 2050.0], [8.0, 2047.0]]);
        assert_eq!(zero_reference(&t, 0.5).points[2], [8.0, 0.0]);
    }

    #[test]
    fn chart_from_config() {
        let t = table(&[("Sample", vec![2000, 2010]), ("Dual_QRS", vec![0, 1])]);
        let mut config = plot_config(vec![
            "Sample::-2000".parse().unwrap(),
            "Dual_QRS:1000".parse().unwrap(),
        ]);
        config.zero_line = true;
        config.title = Some("ECG Data".into());

        let chart = Chart::build(&t, &config).unwrap();
        assert_eq!(chart.curves[0].points, vec![[0.0, 0.0], [0.002, 10.0]]);
        assert_eq!(chart.curves[1].points, vec![[0.0, 0.0], [0.002, 1000.0]]);
        assert_eq!(chart.reference.as_ref().map(|c| c.points.len()), Some(2));
        assert_eq!(chart.all_curves().count(), 3);
        assert_eq!(chart.time_range(), (0.0, 0.002));
        assert_eq!(chart.value_range(), (0.0, 1000.0));
        assert_eq!(chart.title.as_deref(), Some("ECG Data"));
    }

    #[test]
    fn ranges_for_empty_and_flat_charts() {
        let empty = table(&[("a", vec![])]);
        let chart = Chart::build(&empty, &plot_config(vec![SignalSelection::named("a")])).unwrap();
        assert_eq!(chart.time_range(), (0.0, 1.0));
        assert_eq!(chart.value_range(), (-1.0, 1.0));

        let flat = table(&[("a", vec![3, 3, 3])]);
        let chart = Chart::build(&flat, &plot_config(vec![SignalSelection::named("a")])).unwrap();
        assert_eq!(chart.value_range(), (2.0, 4.0));
    }
}
