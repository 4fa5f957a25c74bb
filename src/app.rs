use eframe::egui;

use crate::fonts::RenderContext;
use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SurveyLensApp {
    pub state: AppState,
    pub render: RenderContext,
}

impl SurveyLensApp {
    pub fn new(cc: &eframe::CreationContext<'_>, state: AppState, render: RenderContext) -> Self {
        render.install(&cc.egui_ctx);
        Self { state, render }
    }
}

impl eframe::App for SurveyLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_for_changes();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Central panel: KPIs, diagnostics, charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    panels::dashboard(ui, &self.state, &self.render);
                });
        });

        // keep polling the data file while idle
        ctx.request_repaint_after(std::time::Duration::from_secs(1));
    }
}
