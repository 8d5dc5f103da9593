use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::*;

use crate::color::{generate_palette, REFERENCE_COLOR};
use crate::config::LegendCorner;
use crate::data::chart::{Chart, X_LABEL, Y_LABEL};
use crate::data::error::DumpError;

#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub foreground: RGBColor,
    pub marker_radius: i32,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 700,
            background: WHITE,
            foreground: BLACK,
            marker_radius: 2,
        }
    }
}

fn label_position(corner: LegendCorner) -> SeriesLabelPosition {
    match corner {
        LegendCorner::UpperRight => SeriesLabelPosition::UpperRight,
        LegendCorner::UpperLeft => SeriesLabelPosition::UpperLeft,
        LegendCorner::LowerRight => SeriesLabelPosition::LowerRight,
        LegendCorner::LowerLeft => SeriesLabelPosition::LowerLeft,
    }
}

fn rgb(color: eframe::egui::Color32) -> RGBColor {
    RGBColor(color.r(), color.g(), color.b())
}

/// Draw the chart into an in-memory PNG.
pub fn render_chart_png(chart: &Chart, style: &PlotStyle) -> Result<Vec<u8>, DumpError> {
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;

        let (x_min, x_max) = chart.time_range();
        let (y_min, y_max) = chart.value_range();
        let mut builder = ChartBuilder::on(&root);
        builder
            .margin(10)
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 45);
        if let Some(title) = &chart.title {
            builder.caption(title, ("sans-serif", 20).into_font().color(&style.foreground));
        }
        let mut plot = builder.build_cartesian_2d(x_min..x_max, y_min..y_max)?;
        plot.configure_mesh()
            .x_desc(X_LABEL)
            .y_desc(Y_LABEL)
            .light_line_style(&style.foreground.mix(0.05))
            .draw()?;

        let palette = generate_palette(chart.curves.len());
        for (curve, color) in chart.curves.iter().zip(palette) {
            let color = rgb(color);
            let points = curve.points.iter().map(|&[x, y]| (x, y));
            plot.draw_series(LineSeries::new(points, &color))?
                .label(curve.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
            let radius = style.marker_radius;
            plot.draw_series(
                curve
                    .points
                    .iter()
                    .map(|&[x, y]| Circle::new((x, y), radius, color.filled())),
            )?;
        }

        if let Some(reference) = &chart.reference {
            let color = rgb(REFERENCE_COLOR);
            let points = reference.points.iter().map(|&[x, y]| (x, y));
            plot.draw_series(LineSeries::new(points, &color))?
                .label(reference.name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
        }

        plot.configure_series_labels()
            .position(label_position(chart.legend))
            .border_style(&style.foreground.mix(0.3))
            .background_style(&style.background.mix(0.8))
            .draw()?;
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}

/// Render the chart and write it to `path`, replacing any existing file.
pub fn save_chart_png(chart: &Chart, path: &Path) -> Result<(), DumpError> {
    let png = render_chart_png(chart, &PlotStyle::default())?;
    std::fs::write(path, png)?;
    log::info!("Saved chart to {}", path.display());
    Ok(())
}

fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, DumpError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| DumpError::Plot("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
