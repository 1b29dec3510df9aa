mod engine;

pub use engine::{
    breathing_scale, SessionSummary, SessionTimer, TimerSnapshot, TimerState, SCALE_HOLD,
    SCALE_MAX, SCALE_MIN,
};
