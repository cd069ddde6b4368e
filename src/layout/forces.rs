use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadTree;

const BARNES_HUT_THETA: f32 = 0.72;
const MIN_DISTANCE: f32 = 0.0001;

#[derive(Clone, Copy)]
pub(super) struct RepulsionParams {
    pub(super) strength: f32,
    pub(super) softening: f32,
}

/// Direction from `b` to `a`, with a deterministic fallback for coincident
/// points so stacked bodies still separate.
fn separation(a: Vec2, b: Vec2, salt_a: usize, salt_b: usize) -> (Vec2, f32) {
    let delta = a - b;
    let distance = delta.length();
    if distance > MIN_DISTANCE {
        return (delta / distance, distance);
    }

    let (low, high) = (salt_a.min(salt_b), salt_a.max(salt_b));
    let angle = ((low as f32) * 0.618_034 + (high as f32) * 0.414_214) * std::f32::consts::TAU;
    let direction = vec2(angle.cos(), angle.sin());
    if salt_a < salt_b {
        (direction, 0.0)
    } else {
        (-direction, 0.0)
    }
}

pub(super) fn accumulate_repulsion(
    tree: &QuadTree,
    index: usize,
    positions: &[Vec2],
    masses: &[f32],
    params: RepulsionParams,
    force: &mut Vec2,
) {
    if tree.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if tree.is_leaf() {
        for &other in &tree.bodies {
            if other == index {
                continue;
            }
            let (direction, distance) = separation(point, positions[other], index, other);
            *force += direction
                * (params.strength * masses[other] / ((distance * distance) + params.softening));
        }
        return;
    }

    let delta = point - tree.center_of_mass;
    let distance_sq = delta.length_sq().max(MIN_DISTANCE);
    let distance = distance_sq.sqrt();
    let far_enough = !tree.cell.contains(point)
        && (tree.cell.half_extent * 2.0 / distance) < BARNES_HUT_THETA;

    if far_enough {
        *force +=
            (delta / distance) * (params.strength * tree.mass / (distance_sq + params.softening));
        return;
    }

    for child in tree.children() {
        accumulate_repulsion(child, index, positions, masses, params, force);
    }
}

/// Push needed to separate two label boxes along their axis of least overlap.
/// Zero when the boxes do not overlap.
pub(super) fn overlap_push(
    a: Vec2,
    a_half: Vec2,
    b: Vec2,
    b_half: Vec2,
    salts: (usize, usize),
    strength: f32,
) -> Vec2 {
    let delta = a - b;
    let overlap_x = (a_half.x + b_half.x) - delta.x.abs();
    let overlap_y = (a_half.y + b_half.y) - delta.y.abs();
    if overlap_x <= 0.0 || overlap_y <= 0.0 {
        return Vec2::ZERO;
    }

    if delta.length() <= MIN_DISTANCE {
        let (direction, _) = separation(a, b, salts.0, salts.1);
        return direction * overlap_x.min(overlap_y) * strength;
    }

    if overlap_x < overlap_y {
        vec2(delta.x.signum() * overlap_x * strength, 0.0)
    } else {
        vec2(0.0, delta.y.signum() * overlap_y * strength)
    }
}

pub(super) struct Collision<'a> {
    pub(super) positions: &'a [Vec2],
    pub(super) half_sizes: &'a [Vec2],
    pub(super) strength: f32,
}

impl Collision<'_> {
    fn resolve_pair(&self, from: usize, to: usize, forces: &mut [Vec2]) {
        let push = overlap_push(
            self.positions[from],
            self.half_sizes[from],
            self.positions[to],
            self.half_sizes[to],
            (from, to),
            self.strength,
        );
        forces[from] += push;
        forces[to] -= push;
    }

    /// Visits every pair of bodies whose cells could overlap, pruning cell
    /// pairs that are further apart than their largest boxes reach.
    pub(super) fn accumulate(&self, a: &QuadTree, b: &QuadTree, same: bool, forces: &mut [Vec2]) {
        if a.cell.gap_sq(a.reach, b.cell, b.reach) > 0.0 {
            return;
        }

        if a.is_leaf() && b.is_leaf() {
            if same {
                for (offset, &from) in a.bodies.iter().enumerate() {
                    for &to in &a.bodies[offset + 1..] {
                        self.resolve_pair(from, to, forces);
                    }
                }
            } else {
                for &from in &a.bodies {
                    for &to in &b.bodies {
                        self.resolve_pair(from, to, forces);
                    }
                }
            }
            return;
        }

        if same {
            let children = a.children().collect::<Vec<_>>();
            for (offset, first) in children.iter().enumerate() {
                self.accumulate(first, first, true, forces);
                for second in &children[offset + 1..] {
                    self.accumulate(first, second, false, forces);
                }
            }
            return;
        }

        let split_a = !a.is_leaf() && (b.is_leaf() || a.cell.half_extent >= b.cell.half_extent);
        if split_a {
            for child in a.children() {
                self.accumulate(child, b, false, forces);
            }
        } else {
            for child in b.children() {
                self.accumulate(a, child, false, forces);
            }
        }
    }
}

/// Damped Hooke spring between two points. Returns the force on `a`; `b`
/// receives the opposite.
pub(super) fn spring_force(
    a: Vec2,
    a_velocity: Vec2,
    b: Vec2,
    b_velocity: Vec2,
    rest_length: f32,
    stiffness: f32,
    damping: f32,
) -> Vec2 {
    let delta = a - b;
    let distance = delta.length();
    if distance <= MIN_DISTANCE {
        return Vec2::ZERO;
    }
    let direction = delta / distance;

    let stretch = (distance - rest_length) * stiffness;
    let closing = (a_velocity - b_velocity).dot(direction) * damping;
    -direction * (stretch + closing)
}
