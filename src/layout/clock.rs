/// Converts host frame time into a whole number of fixed-length ticks.
#[derive(Clone, Debug)]
pub struct TickClock {
    interval: f32,
    accumulator: f32,
    max_catch_up: u32,
}

impl TickClock {
    pub fn new(interval: f32, max_catch_up: u32) -> Self {
        Self {
            interval: interval.max(f32::EPSILON),
            accumulator: 0.0,
            max_catch_up: max_catch_up.max(1),
        }
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn remaining(&self) -> f32 {
        (self.interval - self.accumulator).max(0.0)
    }

    /// Ticks due after `elapsed` seconds. Backlog beyond the catch-up limit is
    /// dropped so a stalled host does not trigger a burst of steps.
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        if !elapsed.is_finite() || elapsed <= 0.0 {
            return 0;
        }

        self.accumulator += elapsed;
        let due = (self.accumulator / self.interval).floor();
        if due < 1.0 {
            return 0;
        }

        if due > self.max_catch_up as f32 {
            self.accumulator = 0.0;
            return self.max_catch_up;
        }

        self.accumulator -= due * self.interval;
        due as u32
    }
}
