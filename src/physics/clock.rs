use crate::settings::PhysicsSettings;

/// Fixed-rate step accumulator.
///
/// Real frame time is accumulated in `timer`; once it exceeds the step
/// interval a single step is due. At most one step is taken per rendered
/// frame, so the timer is clamped to `max_lag_steps` intervals to keep a slow
/// frame from building up an unbounded backlog.
#[derive(Debug, Clone)]
pub struct PhysicsClock {
    interval: f32,
    max_lag: f32,
    timer: f32,
    enabled: bool,
    steps: u64,
}

impl PhysicsClock {
    #[must_use]
    pub fn new(settings: &PhysicsSettings) -> Self {
        Self {
            interval: settings.step_interval,
            max_lag: settings.step_interval * settings.max_lag_steps,
            timer: 0.0,
            enabled: settings.enabled,
            steps: 0,
        }
    }

    /// Accumulates elapsed frame time.
    pub fn advance(&mut self, dt: f32) {
        self.timer += dt.max(0.0);
        if self.timer > self.max_lag {
            log::debug!(
                "Physics is lagging behind by {:.4}s, dropping excess",
                self.timer - self.max_lag
            );
            self.timer = self.max_lag;
        }
    }

    #[inline]
    #[must_use]
    pub fn is_step_due(&self) -> bool {
        self.enabled && self.timer > self.interval
    }

    /// Marks one step as taken.
    pub fn consume_step(&mut self) {
        self.timer = (self.timer - self.interval).max(0.0);
        self.steps += 1;
    }

    /// Progress towards the next step in `[0, 1]`.
    #[inline]
    #[must_use]
    pub fn partial_ticks(&self) -> f32 {
        (self.timer / self.interval).clamp(0.0, 1.0)
    }

    #[inline]
    #[must_use]
    pub fn interval(&self) -> f32 {
        self.interval
    }

    #[inline]
    #[must_use]
    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Total number of steps consumed since creation.
    #[inline]
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    #[inline]
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl Default for PhysicsClock {
    fn default() -> Self {
        Self::new(&PhysicsSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_is_due_only_past_the_interval() {
        let mut clock = PhysicsClock::default();
        clock.advance(clock.interval() * 0.5);
        assert!(!clock.is_step_due());
        clock.advance(clock.interval() * 0.75);
        assert!(clock.is_step_due());

        clock.consume_step();
        assert!(!clock.is_step_due());
        assert!((clock.partial_ticks() - 0.25).abs() < 1e-4);
    }

    #[test]
    fn lag_is_clamped() {
        let mut clock = PhysicsClock::default();
        clock.advance(1.0);
        assert!((clock.timer() - clock.interval() * 2.0).abs() < 1e-6);
        assert!((clock.partial_ticks() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn disabled_clock_never_steps() {
        let mut clock = PhysicsClock::new(&PhysicsSettings {
            enabled: false,
            ..Default::default()
        });
        clock.advance(0.5);
        assert!(!clock.is_step_due());
    }
}
