use eframe::egui::{
    self, Align2, Color32, CornerRadius, FontId, Rect, Sense, Stroke, StrokeKind, Ui, vec2,
};
use rdf_graph_explorer::util::local_name;
use tracing::info;

use super::ExplorerApp;
use super::render_utils::{blend_color, dim_color, draw_background, edge_visible, fit_label};

const EDGE_COLOR: Color32 = Color32::from_rgb(96, 104, 116);
const NODE_FILL: Color32 = Color32::from_rgb(55, 118, 171);
const TYPE_FILL: Color32 = Color32::from_rgb(181, 119, 58);
const HOVER_TINT: Color32 = Color32::from_rgb(255, 164, 101);
const SUBJECT_RING: Color32 = Color32::from_rgb(245, 206, 93);

impl ExplorerApp {
    /// Ticks the layout against the canvas rect and draws one frame.
    ///
    /// Primary click expands the node under the pointer; secondary click
    /// starts a new session from it.
    pub(in crate::app) fn draw_canvas(
        &mut self,
        ui: &mut Ui,
        elapsed: f32,
        navigation: &mut Option<Option<String>>,
    ) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click());
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect);

        self.explorer.set_viewport(rect);
        self.explorer.advance(elapsed);

        let pointer = ui.input(|input| input.pointer.hover_pos());
        self.hovered = pointer
            .filter(|point| rect.contains(*point))
            .and_then(|point| self.explorer.hit_test(point))
            .map(str::to_owned);
        if self.hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        let frame = self.explorer.frame();
        let metrics = self.explorer.config().metrics;

        if frame.is_empty() {
            let message = if self.feeder.is_idle() {
                "Nothing to show yet."
            } else {
                "Fetching graph..."
            };
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                message,
                FontId::proportional(16.0),
                Color32::from_gray(180),
            );
        }

        for edge in &frame.edges {
            if !edge_visible(rect, edge.source, edge.label_position, 2.0)
                && !edge_visible(rect, edge.label_position, edge.destination, 2.0)
            {
                continue;
            }

            let stroke = Stroke::new(1.3, EDGE_COLOR);
            painter.line_segment([edge.source, edge.label_position], stroke);
            painter.line_segment([edge.label_position, edge.destination], stroke);

            let galley = painter.layout_no_wrap(
                edge.label.clone(),
                FontId::proportional(11.0),
                Color32::from_gray(210),
            );
            let label_rect =
                Rect::from_center_size(edge.label_position, galley.size() + vec2(8.0, 4.0));
            painter.rect_filled(label_rect, CornerRadius::same(3), dim_color(EDGE_COLOR, 0.35));
            painter.galley(label_rect.min + vec2(4.0, 2.0), galley, Color32::from_gray(210));
        }

        for node in &frame.nodes {
            let bounds = node.bounds();
            if !rect.intersects(bounds) {
                continue;
            }

            let is_hovered = self.hovered.as_deref() == Some(node.identity.as_str());
            let base = if node.type_like { TYPE_FILL } else { NODE_FILL };
            let fill = if is_hovered {
                blend_color(base, HOVER_TINT, 0.55)
            } else {
                base
            };

            painter.rect_filled(bounds, CornerRadius::same(8), fill);
            let outline = if self.explorer.subject() == Some(node.identity.as_str()) {
                Stroke::new(2.0, SUBJECT_RING)
            } else {
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190))
            };
            painter.rect_stroke(bounds, CornerRadius::same(8), outline, StrokeKind::Inside);

            let max_chars =
                ((bounds.width() - metrics.padding * 2.0) / metrics.char_width).floor() as usize;
            painter.text(
                bounds.center(),
                Align2::CENTER_CENTER,
                fit_label(&node.display_label, max_chars),
                FontId::proportional(14.0),
                Color32::from_gray(245),
            );
        }

        if let Some(hovered) = &self.hovered {
            let detail = match self.explorer.model().node(hovered) {
                Some(node) => match node.attributes.type_label.as_deref() {
                    Some(type_label) => format!("{hovered}  |  {type_label}"),
                    None => hovered.clone(),
                },
                None => hovered.clone(),
            };
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                detail,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if response.clicked_by(egui::PointerButton::Primary)
            && let Some(request) = response
                .interact_pointer_pos()
                .and_then(|point| self.explorer.tap(point))
        {
            self.dispatch([request]);
        }

        if response.clicked_by(egui::PointerButton::Secondary)
            && let Some(identity) = response
                .interact_pointer_pos()
                .and_then(|point| self.explorer.hit_test(point))
        {
            info!(subject = local_name(identity), "navigating");
            *navigation = Some(Some(identity.to_owned()));
        }
    }
}
