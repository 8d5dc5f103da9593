use anyhow::anyhow;
use eframe::egui;

use crate::data::chart::Chart;
use crate::state::ViewerState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SignalViewerApp {
    pub state: ViewerState,
}

impl SignalViewerApp {
    pub fn new(state: ViewerState) -> Self {
        Self { state }
    }
}

impl eframe::App for SignalViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: summary and toggles ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: curve visibility ----
        egui::SidePanel::left("signal_panel")
            .default_width(180.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::signal_plot(ui, &self.state);
        });
    }
}

/// Open the viewer window and block until the operator closes it.
pub fn show(chart: Chart, source: &str) -> anyhow::Result<()> {
    let title = chart
        .title
        .clone()
        .unwrap_or_else(|| format!("sigdump – {source}"));
    let state = ViewerState::new(chart, source);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0])
            .with_title(title.clone()),
        ..Default::default()
    };

    log::info!("plotting...");
    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(SignalViewerApp::new(state)))),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
}
