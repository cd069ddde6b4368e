use eframe::egui::{self, Align, Color32, Context, Layout, RichText};
use rdf_graph_explorer::util::local_name;

use super::ExplorerApp;

impl ExplorerApp {
    pub(in crate::app) fn draw_status_bar(
        &mut self,
        ctx: &Context,
        navigation: &mut Option<Option<String>>,
    ) {
        egui::TopBottomPanel::bottom("status_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let subject = match self.explorer.subject() {
                        Some(subject) => format!("subject: {}", local_name(subject)),
                        None => "subject: classes".to_owned(),
                    };
                    ui.label(subject)
                        .on_hover_text(self.explorer.subject().unwrap_or("class listing"));
                    ui.separator();

                    let model = self.explorer.model();
                    ui.label(format!("nodes: {}", model.node_count()));
                    ui.label(format!("edges: {}", model.edge_count()));
                    ui.separator();

                    let pending = self.feeder.in_flight();
                    if pending > 0 {
                        ui.spinner();
                        ui.label(format!("pending: {pending}"));
                    } else {
                        ui.label("idle");
                    }

                    if ui.button("Classes").clicked() {
                        *navigation = Some(None);
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(RichText::new(&self.source_label).weak());
                        if let Some(error) = self.explorer.last_error().map(str::to_owned) {
                            if ui.small_button("dismiss").clicked() {
                                self.explorer.clear_error();
                            }
                            ui.label(RichText::new(error).color(Color32::from_rgb(235, 110, 96)));
                        }
                    });
                });
            });
    }
}
