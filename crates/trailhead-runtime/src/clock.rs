//! Fixed-step metering for the simulation loop

/// Longest frame time fed into the accumulator, to avoid a spiral of death
const MAX_FRAME_TIME: f64 = 0.25;

/// Turns variable frame time into whole simulation steps.
///
/// Whatever scheduler drives the loop (a display callback, a headless
/// for-loop) reports elapsed time through `advance`, and runs the returned
/// number of `step(fixed_timestep)` calls.
#[derive(Debug, Clone)]
pub struct GameClock {
    fixed_timestep: f64,
    /// Time not yet converted into steps
    accumulator: f64,
    total_time: f64,
    steps: u64,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::with_fixed_timestep(60.0)
    }
}

impl GameClock {
    /// 60 Hz clock
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fixed_timestep(hz: f64) -> Self {
        Self {
            fixed_timestep: 1.0 / hz,
            accumulator: 0.0,
            total_time: 0.0,
            steps: 0,
        }
    }

    /// Seconds per simulation step
    pub fn fixed_timestep(&self) -> f64 {
        self.fixed_timestep
    }

    /// Clamped time fed in so far
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Steps handed out so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Feed in `elapsed` seconds and take the number of steps now due.
    /// Negative time counts as zero; long stalls are capped.
    pub fn advance(&mut self, elapsed: f64) -> u32 {
        let elapsed = elapsed.clamp(0.0, MAX_FRAME_TIME);
        self.total_time += elapsed;
        self.accumulator += elapsed;

        let mut due = 0;
        while self.accumulator >= self.fixed_timestep {
            self.accumulator -= self.fixed_timestep;
            due += 1;
        }
        self.steps += u64::from(due);
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_step_per_fixed_interval() {
        let mut clock = GameClock::new();
        let dt = clock.fixed_timestep();
        for _ in 0..10 {
            assert_eq!(clock.advance(dt), 1);
        }
        assert_eq!(clock.steps(), 10);
    }

    #[test]
    fn test_remainder_carries_over() {
        let mut clock = GameClock::with_fixed_timestep(60.0);
        assert_eq!(clock.advance(2.5 / 60.0), 2);
        assert_eq!(clock.advance(0.25 / 60.0), 0);
        assert_eq!(clock.advance(0.3 / 60.0), 1);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut clock = GameClock::with_fixed_timestep(8.0);
        assert_eq!(clock.advance(5.0), 2);
        assert!((clock.total_time() - MAX_FRAME_TIME).abs() < 1e-12);
    }

    #[test]
    fn test_negative_time_ignored() {
        let mut clock = GameClock::new();
        assert_eq!(clock.advance(-1.0), 0);
        assert_eq!(clock.total_time(), 0.0);
    }
}
