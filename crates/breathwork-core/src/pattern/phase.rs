use serde::{Deserialize, Serialize};

/// One of the four timed segments of a breath cycle.
///
/// The cyclic order is fixed: Inhale -> HoldAfterInhale -> Exhale ->
/// HoldAfterExhale -> Inhale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreathPhase {
    Inhale,
    HoldAfterInhale,
    Exhale,
    HoldAfterExhale,
}

impl BreathPhase {
    pub const ALL: [BreathPhase; 4] = [
        BreathPhase::Inhale,
        BreathPhase::HoldAfterInhale,
        BreathPhase::Exhale,
        BreathPhase::HoldAfterExhale,
    ];

    /// Next phase in cyclic order.
    pub fn next(self) -> BreathPhase {
        match self {
            BreathPhase::Inhale => BreathPhase::HoldAfterInhale,
            BreathPhase::HoldAfterInhale => BreathPhase::Exhale,
            BreathPhase::Exhale => BreathPhase::HoldAfterExhale,
            BreathPhase::HoldAfterExhale => BreathPhase::Inhale,
        }
    }

    pub fn is_hold(self) -> bool {
        matches!(self, BreathPhase::HoldAfterInhale | BreathPhase::HoldAfterExhale)
    }

    /// Short label shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            BreathPhase::Inhale => "Inhale",
            BreathPhase::HoldAfterInhale => "Hold",
            BreathPhase::Exhale => "Exhale",
            BreathPhase::HoldAfterExhale => "Pause",
        }
    }

    /// Identifier handed to the audio collaborator for the phase cue.
    pub fn sound_id(self) -> &'static str {
        match self {
            BreathPhase::Inhale => "phase_inhale",
            BreathPhase::HoldAfterInhale => "phase_hold",
            BreathPhase::Exhale => "phase_exhale",
            BreathPhase::HoldAfterExhale => "phase_pause",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_walks_the_full_cycle() {
        let mut phase = BreathPhase::Inhale;
        for expected in BreathPhase::ALL.iter().cycle().skip(1).take(8) {
            phase = phase.next();
            assert_eq!(phase, *expected);
        }
    }

    #[test]
    fn holds_are_detected() {
        assert!(BreathPhase::HoldAfterInhale.is_hold());
        assert!(BreathPhase::HoldAfterExhale.is_hold());
        assert!(!BreathPhase::Inhale.is_hold());
        assert!(!BreathPhase::Exhale.is_hold());
    }
}
