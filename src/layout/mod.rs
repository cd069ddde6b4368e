mod body;
mod bounds;
mod clock;
mod forces;
mod quadtree;

use std::collections::{HashMap, HashSet};

use eframe::egui::{Pos2, Rect, Vec2, vec2};
use tracing::{debug, warn};

use crate::config::{LayoutConfig, NodeMetrics};
use crate::model::{Edge, GraphModel};
use crate::util::stable_pair;

pub use body::{PhysicsBody, SpringConstraint};
pub use bounds::Viewport;
pub use clock::TickClock;
use forces::{Collision, RepulsionParams, accumulate_repulsion, spring_force};
use quadtree::QuadTree;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub bodies_added: usize,
    pub constraints_added: usize,
    /// The model was reset since the previous sync and everything was rebuilt.
    pub rebuilt: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub moving: bool,
    /// Bodies whose force or integration was discarded as non-finite.
    pub discarded: usize,
}

#[derive(Default)]
struct Scratch {
    /// Node bodies first, then one entry per constraint anchor.
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
    masses: Vec<f32>,
    half_sizes: Vec<Vec2>,
    reaches: Vec<f32>,
}

/// Force-directed layout over the nodes and edges of a [`GraphModel`].
///
/// Bodies and constraints are only ever added by [`LayoutSimulator::sync`], so
/// settled positions survive new data arriving. Everything is dropped when
/// the model reports a new generation.
pub struct LayoutSimulator {
    config: LayoutConfig,
    metrics: NodeMetrics,
    viewport: Viewport,
    identities: Vec<String>,
    bodies: Vec<PhysicsBody>,
    index_by_id: HashMap<String, usize>,
    constraints: Vec<SpringConstraint>,
    constrained: HashSet<Edge>,
    model_generation: Option<u64>,
    scratch: Scratch,
}

impl LayoutSimulator {
    pub fn new(config: LayoutConfig, metrics: NodeMetrics) -> Self {
        Self {
            config,
            metrics,
            viewport: Viewport {
                safe_area: config.safe_area,
                ..Viewport::default()
            },
            identities: Vec::new(),
            bodies: Vec::new(),
            index_by_id: HashMap::new(),
            constraints: Vec::new(),
            constrained: HashSet::new(),
            model_generation: None,
            scratch: Scratch::default(),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Takes effect on the next step; bodies are not moved here.
    pub fn set_viewport(&mut self, rect: Rect) {
        self.viewport.rect = rect;
    }

    pub fn set_safe_area(&mut self, safe_area: [f32; 4]) {
        self.viewport.safe_area = safe_area;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn clear(&mut self) {
        self.identities.clear();
        self.bodies.clear();
        self.index_by_id.clear();
        self.constraints.clear();
        self.constrained.clear();
        self.model_generation = None;
    }

    pub fn sync(&mut self, model: &GraphModel) -> SyncReport {
        let mut report = SyncReport::default();
        if self
            .model_generation
            .is_some_and(|generation| generation != model.generation())
        {
            self.clear();
            report.rebuilt = true;
        }
        self.model_generation = Some(model.generation());

        for node in model.nodes() {
            if self.index_by_id.contains_key(&node.identity) {
                continue;
            }

            let position = self.spawn_position(&node.identity);
            let half_size = self.metrics.half_size(node.display_label());
            self.index_by_id.insert(node.identity.clone(), self.bodies.len());
            self.identities.push(node.identity.clone());
            self.bodies
                .push(PhysicsBody::at(position, self.config.node_mass, half_size));
            report.bodies_added += 1;
        }

        for edge in model.edges() {
            if self.constrained.contains(edge) {
                continue;
            }

            let (Some(&source), Some(&destination)) = (
                self.index_by_id.get(&edge.source),
                self.index_by_id.get(&edge.destination),
            ) else {
                warn!(?edge, "edge endpoint has no body");
                continue;
            };

            let anchor_position = self.anchor_position(source, destination, &edge.label);
            let anchor_half = self.metrics.half_size(edge.display_label()) * 0.5;
            self.constraints.push(SpringConstraint {
                edge: edge.clone(),
                source,
                destination,
                rest_length: self.config.rest_length,
                anchor: PhysicsBody::at(anchor_position, self.config.anchor_mass, anchor_half),
            });
            self.constrained.insert(edge.clone());
            report.constraints_added += 1;
        }

        if report.bodies_added > 0 || report.constraints_added > 0 {
            debug!(
                bodies_added = report.bodies_added,
                constraints_added = report.constraints_added,
                bodies = self.bodies.len(),
                constraints = self.constraints.len(),
                "synced layout"
            );
        }
        report
    }

    fn spawn_position(&self, identity: &str) -> Pos2 {
        let (jx, jy) = stable_pair(identity);
        let [spread_x, spread_y] = self.config.jitter;
        self.viewport.center() + vec2(jx * spread_x, jy * spread_y)
    }

    fn anchor_position(&self, source: usize, destination: usize, label: &str) -> Pos2 {
        let from = self.bodies[source].position;
        let to = self.bodies[destination].position;
        let (jx, jy) = stable_pair(label);
        let offset = if source == destination {
            let direction = vec2(jx, jy);
            let direction = if direction.length_sq() > 0.0001 {
                direction.normalized()
            } else {
                Vec2::X
            };
            direction * self.config.rest_length
        } else {
            vec2(jx, jy)
        };
        from.lerp(to, 0.5) + offset
    }

    /// Advances the layout by `dt` seconds, split into the configured number
    /// of substeps.
    pub fn step(&mut self, dt: f32) -> StepReport {
        let mut report = StepReport::default();
        if !dt.is_finite() || dt <= 0.0 || self.bodies.is_empty() {
            return report;
        }

        let substeps = self.config.substeps.max(1);
        let sub_dt = dt / substeps as f32;
        for _ in 0..substeps {
            let substep = self.substep(sub_dt);
            report.moving = substep.moving;
            report.discarded += substep.discarded;
        }

        if report.discarded > 0 {
            warn!(
                discarded = report.discarded,
                "discarded non-finite layout contributions"
            );
        }
        report
    }

    fn substep(&mut self, dt: f32) -> StepReport {
        let config = self.config;
        self.gather();

        let node_count = self.bodies.len();
        let Scratch {
            forces,
            positions,
            masses,
            half_sizes,
            reaches,
        } = &mut self.scratch;

        // Only nodes repel; label anchors are placed by their springs.
        if let Some(tree) = QuadTree::build(
            &positions[..node_count],
            &masses[..node_count],
            &reaches[..node_count],
        ) {
            let repulsion = RepulsionParams {
                strength: config.repulsion,
                softening: config.softening,
            };
            for (index, force) in forces[..node_count].iter_mut().enumerate() {
                accumulate_repulsion(&tree, index, positions, masses, repulsion, force);
            }
        }

        if let Some(tree) = QuadTree::build(positions, masses, reaches) {
            Collision {
                positions: &positions[..],
                half_sizes: &half_sizes[..],
                strength: config.collision_strength,
            }
            .accumulate(&tree, &tree, true, forces);
        }

        let (forces, anchor_forces) = forces.split_at_mut(node_count);
        for (constraint, anchor_force) in self.constraints.iter().zip(anchor_forces.iter_mut()) {
            let source = &self.bodies[constraint.source];
            let destination = &self.bodies[constraint.destination];
            let anchor = &constraint.anchor;
            let stiffness = config.spring_stiffness * anchor.mass;

            let endpoints = [
                (constraint.source, source),
                (constraint.destination, destination),
            ];
            for (index, body) in endpoints {
                let pull = spring_force(
                    anchor.position.to_vec2(),
                    anchor.velocity,
                    body.position.to_vec2(),
                    body.velocity,
                    constraint.rest_length,
                    stiffness,
                    config.spring_damping * anchor.mass,
                );
                *anchor_force += pull;
                forces[index] -= pull;
            }

            if !constraint.is_loop() {
                let cohesion = spring_force(
                    source.position.to_vec2(),
                    source.velocity,
                    destination.position.to_vec2(),
                    destination.velocity,
                    constraint.cohesion_length(),
                    config.spring_stiffness * config.cohesion_ratio * source.mass,
                    config.spring_damping * config.cohesion_ratio * source.mass,
                );
                forces[constraint.source] += cohesion;
                forces[constraint.destination] -= cohesion;
            }
        }

        let center = self.viewport.center();
        for (force, body) in forces.iter_mut().zip(&self.bodies) {
            *force += (center - body.position) * (config.center_pull * body.mass);
        }

        let region = self.viewport.containment();
        let damping_factor = config.velocity_damping.clamp(0.0, 1.0).powf(dt * 60.0);
        let mut report = StepReport::default();

        let bodies = self
            .bodies
            .iter_mut()
            .zip(forces.iter())
            .chain(
                self.constraints
                    .iter_mut()
                    .map(|constraint| &mut constraint.anchor)
                    .zip(anchor_forces.iter()),
            );
        for (body, &force) in bodies {
            let force = if force.is_finite() {
                let magnitude = force.length();
                if magnitude > config.max_force {
                    force * (config.max_force / magnitude)
                } else {
                    force
                }
            } else {
                report.discarded += 1;
                Vec2::ZERO
            };

            if !body.integrate(force, dt, damping_factor, config.max_speed) {
                report.discarded += 1;
            }
            bounds::contain(body, region, config.boundary_elasticity);

            if body.velocity.length_sq() < 0.25 && force.length_sq() < 1.0 {
                body.velocity = Vec2::ZERO;
            } else {
                report.moving = true;
            }
        }

        report
    }

    fn gather(&mut self) {
        let scratch = &mut self.scratch;
        scratch.forces.clear();
        scratch
            .forces
            .resize(self.bodies.len() + self.constraints.len(), Vec2::ZERO);

        scratch.positions.clear();
        scratch.masses.clear();
        scratch.half_sizes.clear();
        scratch.reaches.clear();
        let anchors = self.constraints.iter().map(|constraint| &constraint.anchor);
        for body in self.bodies.iter().chain(anchors) {
            scratch.positions.push(body.position.to_vec2());
            scratch.masses.push(body.mass);
            scratch.half_sizes.push(body.half_size);
            scratch.reaches.push(body.half_size.max_elem());
        }
    }

    pub fn position_of(&self, identity: &str) -> Option<Pos2> {
        self.body(identity).map(|body| body.position)
    }

    pub fn body(&self, identity: &str) -> Option<&PhysicsBody> {
        self.index_by_id
            .get(identity)
            .and_then(|&index| self.bodies.get(index))
    }

    // Creation order is draw order.
    pub fn bodies(&self) -> impl DoubleEndedIterator<Item = (&str, &PhysicsBody)> {
        self.identities
            .iter()
            .map(String::as_str)
            .zip(self.bodies.iter())
    }

    pub fn constraints(&self) -> std::slice::Iter<'_, SpringConstraint> {
        self.constraints.iter()
    }

    pub fn body_at(&self, index: usize) -> Option<&PhysicsBody> {
        self.bodies.get(index)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;
    use crate::model::{EdgeEntry, NodeEntry};

    fn simulator() -> LayoutSimulator {
        LayoutSimulator::new(LayoutConfig::default(), NodeMetrics::default())
    }

    fn chain(model: &mut GraphModel, length: usize) {
        let edges = (0..length)
            .map(|index| EdgeEntry::new(format!("n{index}"), "next", format!("n{}", index + 1)))
            .collect::<Vec<_>>();
        model.merge_edges(edges);
    }

    #[test]
    fn sync_creates_one_body_and_constraint_each() {
        let mut model = GraphModel::new();
        chain(&mut model, 4);
        let mut simulator = simulator();

        let report = simulator.sync(&model);

        assert_eq!(report.bodies_added, 5);
        assert_eq!(report.constraints_added, 4);
        assert_eq!(simulator.body_count(), model.node_count());
        assert_eq!(simulator.constraint_count(), model.edge_count());

        let again = simulator.sync(&model);
        assert_eq!(again, SyncReport::default());
    }

    #[test]
    fn spawn_positions_stay_in_jitter_window() {
        let mut model = GraphModel::new();
        model.merge_nodes((0..40).map(|index| NodeEntry::new(format!("node-{index}"))));
        let mut simulator = simulator();
        simulator.set_viewport(Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0)));

        simulator.sync(&model);

        let center = pos2(400.0, 300.0);
        for (_, body) in simulator.bodies() {
            let offset = body.position - center;
            assert!(offset.x.abs() <= 250.0);
            assert!(offset.y.abs() <= 50.0);
        }
        assert_ne!(
            simulator.position_of("node-0"),
            simulator.position_of("node-1")
        );
    }

    #[test]
    fn later_sync_does_not_move_existing_bodies() {
        let mut model = GraphModel::new();
        chain(&mut model, 2);
        let mut simulator = simulator();
        simulator.sync(&model);
        for _ in 0..5 {
            simulator.step(0.2);
        }
        let before = simulator.position_of("n0");

        model.merge_edges([EdgeEntry::new("n2", "next", "n3")]);
        let report = simulator.sync(&model);

        assert_eq!(report.bodies_added, 1);
        assert_eq!(simulator.position_of("n0"), before);
    }

    #[test]
    fn reset_model_rebuilds_layout() {
        let mut model = GraphModel::new();
        chain(&mut model, 3);
        let mut simulator = simulator();
        simulator.sync(&model);

        model.reset();
        model.merge_nodes([NodeEntry::new("fresh")]);
        let report = simulator.sync(&model);

        assert!(report.rebuilt);
        assert_eq!(simulator.body_count(), 1);
        assert_eq!(simulator.constraint_count(), 0);
        assert!(simulator.position_of("n0").is_none());
    }

    #[test]
    fn connected_bodies_settle_near_rest_length() {
        let mut model = GraphModel::new();
        model.merge_edges([EdgeEntry::new("a", "knows", "b")]);
        let mut simulator = simulator();
        simulator.set_viewport(Rect::from_min_size(Pos2::ZERO, vec2(2000.0, 2000.0)));
        simulator.sync(&model);

        for _ in 0..200 {
            simulator.step(0.2);
        }

        let a = simulator.position_of("a").expect("a has a body");
        let b = simulator.position_of("b").expect("b has a body");
        let distance = a.distance(b);
        assert!(
            distance > 128.0 && distance < 600.0,
            "unexpected separation {distance}"
        );
    }

    #[test]
    fn overlapping_bodies_separate() {
        let mut model = GraphModel::new();
        model.merge_nodes([NodeEntry::new("x"), NodeEntry::new("y")]);
        let mut simulator = simulator();
        simulator.sync(&model);
        let center = simulator.viewport().center();
        simulator.bodies[0].position = center;
        simulator.bodies[1].position = center;

        for _ in 0..20 {
            simulator.step(0.2);
        }

        let x = simulator.body("x").expect("x").bounds();
        let y = simulator.body("y").expect("y").bounds();
        assert!(!x.intersects(y.shrink(1.0)));
    }

    #[test]
    fn label_anchors_settle_clear_of_nodes() {
        let mut model = GraphModel::new();
        let edges = (0..15)
            .flat_map(|hub| {
                (0..4).map(move |leaf| {
                    EdgeEntry::new(format!("hub-{hub}"), "link", format!("leaf-{hub}-{leaf}"))
                })
            })
            .collect::<Vec<_>>();
        model.merge_edges(edges);
        let mut simulator = simulator();
        simulator.set_viewport(Rect::from_min_size(Pos2::ZERO, vec2(1280.0, 800.0)));
        simulator.sync(&model);
        assert_eq!(simulator.body_count(), 75);

        for _ in 0..200 {
            simulator.step(0.2);
        }

        let overlapping = simulator
            .constraints()
            .filter(|constraint| {
                let chip = constraint.anchor.bounds().shrink(3.0);
                simulator
                    .bodies()
                    .any(|(_, body)| body.bounds().intersects(chip))
            })
            .count();
        assert!(
            overlapping <= 3,
            "{overlapping} of {} label anchors overlap a node",
            simulator.constraint_count()
        );
    }

    #[test]
    fn bodies_stay_inside_resized_viewport() {
        let mut model = GraphModel::new();
        chain(&mut model, 30);
        let mut simulator = simulator();
        simulator.sync(&model);

        let small = Rect::from_min_size(pos2(100.0, 50.0), vec2(300.0, 200.0));
        simulator.set_viewport(small);
        simulator.step(0.2);
        for _ in 0..10 {
            simulator.step(0.2);
            for (_, body) in simulator.bodies() {
                assert!(small.contains(body.position));
            }
        }
    }

    #[test]
    fn non_finite_state_is_discarded() {
        let mut model = GraphModel::new();
        model.merge_edges([EdgeEntry::new("a", "knows", "b")]);
        let mut simulator = simulator();
        simulator.sync(&model);
        simulator.bodies[0].velocity = vec2(f32::NAN, 0.0);

        let report = simulator.step(0.2);

        assert!(report.discarded > 0);
        let b = simulator.position_of("b").expect("b");
        assert!(b.is_finite());
        for (_, body) in simulator.bodies() {
            assert!(body.position.is_finite());
        }
    }

    #[test]
    fn self_loop_keeps_anchor_away_from_node() {
        let mut model = GraphModel::new();
        model.merge_edges([EdgeEntry::new("a", "sameAs", "a")]);
        let mut simulator = simulator();
        simulator.sync(&model);

        let constraint = simulator.constraints().next().expect("constraint");
        assert!(constraint.is_loop());
        let node = simulator.position_of("a").expect("a");
        assert!(constraint.anchor.position.distance(node) > 100.0);

        for _ in 0..10 {
            simulator.step(0.2);
        }
        assert!(simulator.position_of("a").expect("a").is_finite());
    }
}
