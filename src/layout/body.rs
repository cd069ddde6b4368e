use eframe::egui::{Pos2, Rect, Vec2};

use crate::model::Edge;

#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsBody {
    pub position: Pos2,
    pub velocity: Vec2,
    pub mass: f32,
    /// Half extent of the label box drawn for this body.
    pub half_size: Vec2,
}

impl PhysicsBody {
    pub fn at(position: Pos2, mass: f32, half_size: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            mass: mass.max(f32::EPSILON),
            half_size,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.position, self.half_size * 2.0)
    }

    /// Applies one integration step unless it would produce a non-finite
    /// state. Returns false when the step was rejected.
    pub(super) fn integrate(
        &mut self,
        force: Vec2,
        dt: f32,
        damping_factor: f32,
        max_speed: f32,
    ) -> bool {
        let mut velocity = (self.velocity + (force / self.mass) * dt) * damping_factor;
        let speed = velocity.length();
        if speed > max_speed {
            velocity *= max_speed / speed;
        }
        let position = self.position + velocity * dt;

        if !(velocity.is_finite() && position.is_finite()) {
            if !self.velocity.is_finite() {
                self.velocity = Vec2::ZERO;
            }
            return false;
        }

        self.velocity = velocity;
        self.position = position;
        true
    }
}

/// Ties the two endpoint bodies of an edge together.
///
/// Both endpoints are pulled toward `rest_length` from a label anchor that
/// rides between them, and directly toward each other at twice that length
/// with a weaker spring.
#[derive(Clone, Debug, PartialEq)]
pub struct SpringConstraint {
    pub edge: Edge,
    pub source: usize,
    pub destination: usize,
    pub rest_length: f32,
    pub anchor: PhysicsBody,
}

impl SpringConstraint {
    pub fn cohesion_length(&self) -> f32 {
        self.rest_length * 2.0
    }

    pub fn is_loop(&self) -> bool {
        self.source == self.destination
    }
}
