use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 10;

/// Square cell used to partition bodies.
#[derive(Clone, Copy, Debug)]
pub(super) struct Cell {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl Cell {
    fn enclosing(points: &[Vec2], indices: &[usize]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for &index in indices {
            min = min.min(points[index]);
            max = max.max(points[index]);
        }

        if !(min.is_finite() && max.is_finite()) {
            return None;
        }

        let span = (max - min).max_elem().max(1.0);
        Some(Self {
            center: (min + max) * 0.5,
            half_extent: (span * 0.5) + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half_extent
            && (point.y - self.center.y).abs() <= self.half_extent
    }

    fn quadrant_of(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }

    fn child(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let sign_x = if quadrant & 1 == 0 { -1.0 } else { 1.0 };
        let sign_y = if quadrant & 2 == 0 { -1.0 } else { 1.0 };
        Self {
            center: self.center + vec2(sign_x * quarter, sign_y * quarter),
            half_extent: quarter,
        }
    }

    /// Squared gap between two cells grown by their contents' reach; zero when
    /// they touch.
    pub(super) fn gap_sq(self, reach: f32, other: Self, other_reach: f32) -> f32 {
        let limit = self.half_extent + reach + other.half_extent + other_reach;
        let dx = ((self.center.x - other.center.x).abs() - limit).max(0.0);
        let dy = ((self.center.y - other.center.y).abs() - limit).max(0.0);
        (dx * dx) + (dy * dy)
    }
}

/// Barnes-Hut tree over body positions, weighted by body mass.
pub(super) struct QuadTree {
    pub(super) cell: Cell,
    pub(super) center_of_mass: Vec2,
    pub(super) mass: f32,
    /// Largest half extent of any label box below this node.
    pub(super) reach: f32,
    pub(super) bodies: Vec<usize>,
    pub(super) children: [Option<Box<QuadTree>>; 4],
}

impl QuadTree {
    /// Builds over every body whose position is finite.
    pub(super) fn build(positions: &[Vec2], masses: &[f32], reaches: &[f32]) -> Option<Self> {
        let indices = (0..positions.len())
            .filter(|&index| positions[index].is_finite())
            .collect::<Vec<_>>();
        if indices.is_empty() {
            return None;
        }

        let cell = Cell::enclosing(positions, &indices)?;
        Some(Self::build_node(cell, indices, positions, masses, reaches, 0))
    }

    fn build_node(
        cell: Cell,
        bodies: Vec<usize>,
        positions: &[Vec2],
        masses: &[f32],
        reaches: &[f32],
        depth: usize,
    ) -> Self {
        let mut weighted = Vec2::ZERO;
        let mut mass = 0.0;
        let mut reach = 0.0_f32;
        for &index in &bodies {
            weighted += positions[index] * masses[index];
            mass += masses[index];
            reach = reach.max(reaches[index]);
        }
        let center_of_mass = if mass > 0.0 { weighted / mass } else { cell.center };

        let mut node = Self {
            cell,
            center_of_mass,
            mass,
            reach,
            bodies,
            children: std::array::from_fn(|_| None),
        };

        if depth >= MAX_DEPTH || node.bodies.len() <= LEAF_CAPACITY {
            return node;
        }

        let mut buckets: [Vec<usize>; 4] = std::array::from_fn(|_| Vec::new());
        for &index in &node.bodies {
            buckets[cell.quadrant_of(positions[index])].push(index);
        }

        // Coincident bodies cannot be separated by subdividing.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return node;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            node.children[quadrant] = Some(Box::new(Self::build_node(
                cell.child(quadrant),
                bucket,
                positions,
                masses,
                reaches,
                depth + 1,
            )));
        }
        node.bodies.clear();
        node
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn children(&self) -> impl Iterator<Item = &QuadTree> {
        self.children.iter().filter_map(Option::as_deref)
    }

    #[cfg(test)]
    fn body_count(&self) -> usize {
        self.bodies.len() + self.children().map(Self::body_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_holds_every_finite_body() {
        let mut positions = (0..50)
            .map(|index| vec2((index % 7) as f32 * 40.0, (index / 7) as f32 * 25.0))
            .collect::<Vec<_>>();
        positions.push(vec2(f32::NAN, 0.0));
        let masses = vec![1.0; positions.len()];
        let reaches = vec![10.0; positions.len()];

        let tree = QuadTree::build(&positions, &masses, &reaches).expect("tree");

        assert_eq!(tree.body_count(), 50);
        assert!(!tree.is_leaf());
        assert_eq!(tree.mass, 50.0);
        assert_eq!(tree.reach, 10.0);
    }

    #[test]
    fn coincident_bodies_stay_in_one_leaf() {
        let positions = vec![vec2(3.0, 3.0); 20];
        let masses = vec![2.0; 20];
        let reaches = vec![5.0; 20];

        let tree = QuadTree::build(&positions, &masses, &reaches).expect("tree");

        assert!(tree.is_leaf());
        assert_eq!(tree.bodies.len(), 20);
        assert_eq!(tree.center_of_mass, vec2(3.0, 3.0));
    }

    #[test]
    fn center_of_mass_is_weighted() {
        let positions = [vec2(0.0, 0.0), vec2(10.0, 0.0)];
        let masses = [3.0, 1.0];
        let reaches = [1.0, 1.0];

        let tree = QuadTree::build(&positions, &masses, &reaches).expect("tree");

        assert!((tree.center_of_mass.x - 2.5).abs() < 1e-5);
        assert!(tree.cell.contains(positions[1]));
    }

    #[test]
    fn no_finite_bodies_means_no_tree() {
        let positions = [vec2(f32::INFINITY, 0.0)];
        assert!(QuadTree::build(&positions, &[1.0], &[1.0]).is_none());
        assert!(QuadTree::build(&[], &[], &[]).is_none());
    }

    #[test]
    fn gap_is_zero_for_touching_cells() {
        let a = Cell {
            center: vec2(0.0, 0.0),
            half_extent: 5.0,
        };
        let b = Cell {
            center: vec2(30.0, 0.0),
            half_extent: 5.0,
        };
        assert_eq!(a.gap_sq(0.0, b, 0.0), 400.0);
        assert_eq!(a.gap_sq(10.0, b, 10.0), 0.0);
    }
}
