use eframe::egui::Ui;
use egui_plot::{Corner, Legend, Line, MarkerShape, Plot, PlotPoints, Points};

use crate::color::REFERENCE_COLOR;
use crate::config::LegendCorner;
use crate::data::chart::{X_LABEL, Y_LABEL};
use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Signal plot (central panel)
// ---------------------------------------------------------------------------

pub fn legend_corner(corner: LegendCorner) -> Corner {
    match corner {
        LegendCorner::UpperRight => Corner::RightTop,
        LegendCorner::UpperLeft => Corner::LeftTop,
        LegendCorner::LowerRight => Corner::RightBottom,
        LegendCorner::LowerLeft => Corner::LeftBottom,
    }
}

/// Render the signal plot in the central panel.
pub fn signal_plot(ui: &mut Ui, state: &ViewerState) {
    if let Some(title) = &state.chart.title {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.heading(title);
        });
    }

    Plot::new("signal_plot")
        .legend(Legend::default().position(legend_corner(state.chart.legend)))
        .x_axis_label(X_LABEL)
        .y_axis_label(Y_LABEL)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (curve, color) in state.visible_curves() {
                let line = Line::new(PlotPoints::from(curve.points.clone()))
                    .name(&curve.name)
                    .color(color)
                    .width(1.5);
                plot_ui.line(line);

                if state.show_markers {
                    // same name, so the legend entry toggles both
                    let markers = Points::new(PlotPoints::from(curve.points.clone()))
                        .name(&curve.name)
                        .color(color)
                        .shape(MarkerShape::Circle)
                        .radius(2.0);
                    plot_ui.points(markers);
                }
            }

            if state.show_reference {
                if let Some(reference) = &state.chart.reference {
                    let line = Line::new(PlotPoints::from(reference.points.clone()))
                        .name(&reference.name)
                        .color(REFERENCE_COLOR)
                        .width(1.0);
                    plot_ui.line(line);
                }
            }
        });
}
