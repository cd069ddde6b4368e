use std::time::Duration;

use eframe::egui::{self, Context};
use rdf_graph_explorer::source::{DataFeeder, FetchRequest};
use rdf_graph_explorer::{Explorer, NodeEntry, OutcomeStatus};
use tracing::info;

mod panels;
mod render_utils;
mod view;

/// Slowest repaint while fetches are pending, so results show up promptly
/// even when the layout is idle.
const FETCH_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct ExplorerApp {
    explorer: Explorer,
    feeder: DataFeeder,
    source_label: String,
    last_frame_secs: Option<f64>,
    hovered: Option<String>,
}

impl ExplorerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        explorer: Explorer,
        feeder: DataFeeder,
        subject: Option<NodeEntry>,
        source_label: String,
    ) -> Self {
        let mut app = Self {
            explorer,
            feeder,
            source_label,
            last_frame_secs: None,
            hovered: None,
        };
        let requests = app.explorer.start(subject);
        app.dispatch(requests);
        app
    }

    fn dispatch(&mut self, requests: impl IntoIterator<Item = FetchRequest>) {
        let generation = self.explorer.generation();
        for request in requests {
            self.feeder.dispatch(generation, request);
        }
    }

    fn drain_feeder(&mut self) {
        for outcome in self.feeder.poll() {
            if let OutcomeStatus::Merged(report) = self.explorer.apply_outcome(outcome)
                && report.dropped > 0
            {
                info!(dropped = report.dropped, "fetch result contained malformed entries");
            }
        }
    }

    fn navigate_to(&mut self, identity: Option<String>) {
        self.hovered = None;
        let requests = match identity {
            Some(identity) => self.explorer.focus(&identity),
            None => self.explorer.navigate(None),
        };
        self.dispatch(requests);
    }

    /// Seconds since the previous frame, zero on the first one.
    fn frame_elapsed(&mut self, ctx: &Context) -> f32 {
        let now = ctx.input(|input| input.time);
        let elapsed = self
            .last_frame_secs
            .map_or(0.0, |last| (now - last).max(0.0) as f32);
        self.last_frame_secs = Some(now);
        elapsed
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.drain_feeder();

        let mut navigation = None;
        self.draw_status_bar(ctx, &mut navigation);

        let elapsed = self.frame_elapsed(ctx);
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_canvas(ui, elapsed, &mut navigation));

        if let Some(target) = navigation {
            self.navigate_to(target);
        }

        let tick = Duration::from_secs_f32(self.explorer.tick_interval());
        let next = if self.feeder.is_idle() {
            tick
        } else {
            tick.min(FETCH_POLL_INTERVAL)
        };
        ctx.request_repaint_after(next);
    }
}
