//! Simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Time arrives as timestamps captured at tick boundaries
//! - Motion is normalized against the fixed target frame duration
//! - Stable obstacle references (by entity id)
//! - No rendering or platform dependencies

pub mod clock;
pub mod field;
pub mod mode;
pub mod motion;
pub mod quiz;
pub mod state;
pub mod tick;

pub use clock::FrameTimer;
pub use field::ObstacleField;
pub use mode::{EndlessMode, LegacyMode, Mode, QuizParams, TenQuestionMode};
pub use motion::CharacterMotion;
pub use quiz::{normalize_answer, overlay, QuizEngine, QuizSession};
pub use state::{
    GameMode, ModeSummary, Obstacle, ObstacleAction, ObstacleId, PendingAnswer, RunEvent, RunPhase,
    RunState, RunSummary, Verdict,
};
pub use tick::RunController;
