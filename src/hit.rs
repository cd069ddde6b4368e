use eframe::egui::{Pos2, Rect};

/// Maps a point to the topmost node whose box contains it.
#[derive(Clone, Copy, Debug)]
pub struct HitTester {
    slop: f32,
}

impl Default for HitTester {
    fn default() -> Self {
        Self::new()
    }
}

impl HitTester {
    pub fn new() -> Self {
        Self { slop: 0.0 }
    }

    pub fn with_slop(slop: f32) -> Self {
        Self {
            slop: slop.max(0.0),
        }
    }

    pub fn slop(&self) -> f32 {
        self.slop
    }

    /// `regions` are given in draw order; later regions are drawn on top and
    /// therefore win.
    pub fn hit_test<'a, I>(&self, regions: I, point: Pos2) -> Option<&'a str>
    where
        I: IntoIterator<Item = (&'a str, Rect)>,
        I::IntoIter: DoubleEndedIterator,
    {
        if !point.is_finite() {
            return None;
        }

        regions
            .into_iter()
            .rev()
            .find(|(_, bounds)| bounds.expand(self.slop).contains(point))
            .map(|(identity, _)| identity)
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    fn regions() -> Vec<(&'static str, Rect)> {
        vec![
            ("A", Rect::from_center_size(pos2(100.0, 100.0), vec2(80.0, 40.0))),
            ("B", Rect::from_center_size(pos2(130.0, 100.0), vec2(80.0, 40.0))),
        ]
    }

    #[test]
    fn topmost_region_wins() {
        let tester = HitTester::new();
        assert_eq!(tester.hit_test(regions(), pos2(120.0, 100.0)), Some("B"));
        assert_eq!(tester.hit_test(regions(), pos2(65.0, 100.0)), Some("A"));
    }

    #[test]
    fn misses_return_none() {
        let tester = HitTester::new();
        assert_eq!(tester.hit_test(regions(), pos2(5_000.0, -5_000.0)), None);
        assert_eq!(tester.hit_test(Vec::new(), pos2(100.0, 100.0)), None);
        assert_eq!(tester.hit_test(regions(), pos2(f32::NAN, 100.0)), None);
    }

    #[test]
    fn slop_widens_targets() {
        let point = pos2(58.0, 125.0);
        assert_eq!(HitTester::new().hit_test(regions(), point), None);
        assert_eq!(HitTester::with_slop(8.0).hit_test(regions(), point), Some("A"));
    }
}
