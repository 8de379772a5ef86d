use crate::narrow_phase::CONTACT_EPSILON;

/// Tunables for the collision core.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionConfig {
    /// Separation tolerance used by the narrow phase. Shapes whose gap along
    /// every tested axis is within this distance count as touching.
    pub epsilon: f32,
    /// Log a warning when a degenerate shape reaches the narrow phase.
    pub warn_on_degenerate: bool,
    /// Report pairs involving a passive collider as trigger events.
    pub report_triggers: bool,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            epsilon: CONTACT_EPSILON,
            warn_on_degenerate: true,
            report_triggers: true,
        }
    }
}

impl CollisionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the separation tolerance. Negative or non-finite values fall
    /// back to the default.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = if epsilon.is_finite() && epsilon >= 0.0 {
            epsilon
        } else {
            log::warn!("Ignoring invalid collision epsilon {epsilon}, using {CONTACT_EPSILON}");
            CONTACT_EPSILON
        };
        self
    }

    #[must_use]
    pub fn with_degenerate_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_degenerate = enabled;
        self
    }

    #[must_use]
    pub fn with_triggers(mut self, enabled: bool) -> Self {
        self.report_triggers = enabled;
        self
    }
}
