use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::state::ViewerState;

// ---------------------------------------------------------------------------
// Left side panel – curve toggles
// ---------------------------------------------------------------------------

/// Render the left panel listing every selected signal.
pub fn side_panel(ui: &mut Ui, state: &mut ViewerState) {
    ui.heading("Signals");
    ui.separator();

    if state.chart.curves.is_empty() {
        ui.label("No signals selected.");
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.set_all(true);
        }
        if ui.small_button("None").clicked() {
            state.set_all(false);
        }
    });

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for ((curve, color), visible) in state
                .chart
                .curves
                .iter()
                .zip(state.colors.iter())
                .zip(state.visible.iter_mut())
            {
                let text = RichText::new(&curve.name).color(*color);
                ui.checkbox(visible, text);
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut ViewerState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.label(state.summary());

        ui.separator();

        if ui
            .selectable_label(state.show_markers, "Markers")
            .clicked()
        {
            state.show_markers = !state.show_markers;
        }

        if state.chart.reference.is_some()
            && ui
                .selectable_label(state.show_reference, "Zero line")
                .clicked()
        {
            state.show_reference = !state.show_reference;
        }
    });
}
