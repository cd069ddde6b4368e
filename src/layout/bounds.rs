use eframe::egui::{Pos2, Rect, pos2, vec2};

use super::body::PhysicsBody;

/// Viewport rectangle supplied by the hosting surface, minus its safe area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub rect: Rect,
    /// Top, right, bottom, left.
    pub safe_area: [f32; 4],
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            rect: Rect::from_min_size(Pos2::ZERO, vec2(1024.0, 768.0)),
            safe_area: [0.0; 4],
        }
    }
}

impl Viewport {
    /// Region bodies must stay within. Collapses to the viewport center on
    /// axes where the insets leave no room.
    pub fn containment(&self) -> Rect {
        let [top, right, bottom, left] = self.safe_area.map(|inset| inset.max(0.0));
        let min = pos2(self.rect.min.x + left, self.rect.min.y + top);
        let max = pos2(self.rect.max.x - right, self.rect.max.y - bottom);
        let center = self.rect.center();

        let (min_x, max_x) = if min.x <= max.x {
            (min.x, max.x)
        } else {
            (center.x, center.x)
        };
        let (min_y, max_y) = if min.y <= max.y {
            (min.y, max.y)
        } else {
            (center.y, center.y)
        };
        Rect::from_min_max(pos2(min_x, min_y), pos2(max_x, max_y))
    }

    pub fn center(&self) -> Pos2 {
        self.containment().center()
    }
}

fn clamp_axis(value: f32, half: f32, min: f32, max: f32) -> Option<f32> {
    let (low, high) = if max - min >= half * 2.0 {
        (min + half, max - half)
    } else {
        let middle = (min + max) * 0.5;
        (middle, middle)
    };

    if value < low {
        Some(low)
    } else if value > high {
        Some(high)
    } else {
        None
    }
}

/// Keeps the body's box inside `region` where it fits (its center otherwise),
/// bouncing the velocity component that crossed the edge.
pub(super) fn contain(body: &mut PhysicsBody, region: Rect, elasticity: f32) {
    if let Some(x) = clamp_axis(body.position.x, body.half_size.x, region.min.x, region.max.x) {
        if (x - body.position.x) * body.velocity.x < 0.0 {
            body.velocity.x = -body.velocity.x * elasticity;
        }
        body.position.x = x;
    }

    if let Some(y) = clamp_axis(body.position.y, body.half_size.y, region.min.y, region.max.y) {
        if (y - body.position.y) * body.velocity.y < 0.0 {
            body.velocity.y = -body.velocity.y * elasticity;
        }
        body.position.y = y;
    }
}
