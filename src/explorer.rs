//! Owns the model and the simulator. Never performs I/O: returned
//! [`FetchRequest`]s go to a [`crate::source::DataFeeder`] and its outcomes
//! come back through [`Explorer::apply_outcome`].

use eframe::egui::{Pos2, Rect};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::frame::Frame;
use crate::hit::HitTester;
use crate::layout::{LayoutSimulator, SyncReport, TickClock};
use crate::model::{
    Batch, EdgeEntry, GraphModel, MergeReport, NodeAttributes, NodeEntry, RDF_TYPE,
};
use crate::source::{FetchOutcome, FetchRequest};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutcomeStatus {
    Merged(MergeReport),
    Failed,
    /// Issued for an earlier session and ignored.
    Stale,
}

pub struct Explorer {
    config: Config,
    model: GraphModel,
    simulator: LayoutSimulator,
    clock: TickClock,
    hit_tester: HitTester,
    synced_revision: Option<u64>,
    subject: Option<String>,
    last_error: Option<String>,
}

impl Explorer {
    pub fn new(config: Config) -> Self {
        Self {
            model: GraphModel::new(),
            simulator: LayoutSimulator::new(config.layout, config.metrics),
            clock: TickClock::new(config.layout.tick_interval(), config.layout.max_catch_up_ticks),
            hit_tester: HitTester::new(),
            synced_revision: None,
            subject: None,
            last_error: None,
            config,
        }
    }

    pub fn with_hit_tester(mut self, hit_tester: HitTester) -> Self {
        self.hit_tester = hit_tester;
        self
    }

    /// Seeds the session and returns the fetches that populate it.
    ///
    /// A subject with a known type gets its type edge merged right away, then
    /// its relations are requested. Without a subject the class listing is
    /// requested instead.
    pub fn start(&mut self, subject: Option<NodeEntry>) -> Vec<FetchRequest> {
        let Some(entry) = subject else {
            info!(generation = self.generation(), "starting session from class listing");
            self.subject = None;
            return vec![FetchRequest::Classes];
        };

        let Some(identity) = entry
            .identity
            .clone()
            .filter(|identity| !identity.trim().is_empty())
        else {
            warn!("subject has no identity, starting from class listing");
            self.subject = None;
            return vec![FetchRequest::Classes];
        };

        info!(generation = self.generation(), subject = %identity, "starting session");

        let type_edge = entry.attributes.type_identity.clone().map(|type_identity| {
            let type_hints = NodeAttributes {
                primary_label: entry.attributes.type_label.clone(),
                ..NodeAttributes::default()
            };
            EdgeEntry::new(identity.clone(), RDF_TYPE, type_identity)
                .with_destination_hints(type_hints)
        });
        self.model.merge(Batch {
            nodes: vec![entry],
            edges: type_edge.into_iter().collect(),
        });

        self.subject = Some(identity.clone());
        vec![FetchRequest::relations(
            identity,
            self.config.explore.initial_limit,
        )]
    }

    /// Drops everything and starts a new session. Results still in flight
    /// for the previous session become stale.
    pub fn navigate(&mut self, subject: Option<NodeEntry>) -> Vec<FetchRequest> {
        self.model.reset();
        self.simulator.clear();
        self.synced_revision = None;
        self.last_error = None;
        self.start(subject)
    }

    /// Starts a new session from a node of the current graph, keeping what
    /// is known about it.
    pub fn focus(&mut self, identity: &str) -> Vec<FetchRequest> {
        let mut entry = NodeEntry::new(identity);
        if let Some(node) = self.model.node(identity) {
            entry = entry.with_attributes(node.attributes.clone());
        }
        if self.model.is_type_like(identity) {
            entry = entry.type_like();
        }
        self.navigate(Some(entry))
    }

    pub fn generation(&self) -> u64 {
        self.model.generation()
    }

    pub fn merge(&mut self, batch: Batch) -> MergeReport {
        self.model.merge(batch)
    }

    pub fn apply_outcome(&mut self, outcome: FetchOutcome) -> OutcomeStatus {
        let FetchOutcome {
            generation,
            request,
            result,
        } = outcome;

        if generation != self.generation() {
            debug!(
                generation,
                current = self.generation(),
                %request,
                "discarding stale fetch result"
            );
            return OutcomeStatus::Stale;
        }

        match result {
            Ok(batch) => {
                let report = self.model.merge(batch);
                debug!(%request, ?report, "merged fetch result");
                OutcomeStatus::Merged(report)
            }
            Err(message) => {
                error!(%request, %message, "fetch failed");
                self.last_error = Some(format!("{request}: {message}"));
                OutcomeStatus::Failed
            }
        }
    }

    /// Reconciles the simulator with the model if the model changed since the
    /// last call.
    pub fn sync(&mut self) -> Option<SyncReport> {
        let revision = self.model.revision();
        if self.synced_revision == Some(revision) {
            return None;
        }

        let report = self.simulator.sync(&self.model);
        self.synced_revision = Some(revision);
        Some(report)
    }

    /// Syncs, then runs as many fixed-length ticks as `elapsed` seconds
    /// cover. Returns the number of ticks run.
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        self.sync();

        let ticks = self.clock.advance(elapsed);
        let dt = self.clock.interval();
        for _ in 0..ticks {
            self.simulator.step(dt);
        }
        ticks
    }

    pub fn set_viewport(&mut self, rect: Rect) {
        self.simulator.set_viewport(rect);
    }

    pub fn frame(&self) -> Frame {
        Frame::capture(&self.model, &self.simulator)
    }

    pub fn hit_test(&self, point: Pos2) -> Option<&str> {
        self.hit_tester.hit_test(
            self.simulator
                .bodies()
                .map(|(identity, body)| (identity, body.bounds())),
            point,
        )
    }

    pub fn tap(&self, point: Pos2) -> Option<FetchRequest> {
        let identity = self.hit_test(point)?;
        Some(self.expand_request(identity))
    }

    /// Type-like nodes sample their members, everything else its relations.
    pub fn expand_request(&self, identity: &str) -> FetchRequest {
        let explore = &self.config.explore;
        if self.model.is_type_like(identity) {
            FetchRequest::members(identity, explore.member_limit)
        } else {
            FetchRequest::relations(identity, explore.expand_limit)
        }
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn simulator(&self) -> &LayoutSimulator {
        &self.simulator
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn tick_interval(&self) -> f32 {
        self.clock.interval()
    }
}
