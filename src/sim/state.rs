//! Run state and core simulation types
//!
//! One explicit struct per concern. The scattered flags of a typical
//! immediate-mode game loop (answer flags, target pointer, pause/slow
//! state) are fields here, owned by the run controller and nowhere else.

use serde::{Deserialize, Serialize};

/// Which policy variant drives the run. Chosen on the menu screen before
/// the run starts; immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Earliest behavior: single life, any failure ends the run
    Legacy,
    /// Fixed 10 questions, wrong answers pass through
    TenQuestion,
    /// 3 hearts, collisions cost hearts, runs until they are gone
    Endless,
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Waiting for assets to settle
    Initializing,
    /// Active gameplay
    Playing,
    /// Run-ending condition met; result screen after a fixed delay
    EndingSequence,
    /// Run ended
    Result,
}

/// Outcome of a submitted or timed-out answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Wrong,
}

/// An answer verdict waiting to be resolved against the target obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingAnswer {
    #[default]
    None,
    Correct,
    Wrong,
}

impl From<Verdict> for PendingAnswer {
    fn from(v: Verdict) -> Self {
        match v {
            Verdict::Correct => PendingAnswer::Correct,
            Verdict::Wrong => PendingAnswer::Wrong,
        }
    }
}

/// What the active mode decides to do with the target obstacle this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleAction {
    None,
    Jump,
    PassThrough,
    Collide,
}

/// Stable obstacle handle. Holding an id instead of a reference means a
/// pruned obstacle can never dangle behind the target binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObstacleId(pub u32);

/// A fence scrolling toward the character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: ObstacleId,
    /// World-space x of the fence's left edge
    pub x: f32,
    /// Scroll speed in px per normalized tick
    pub speed: f32,
    /// Set once when the obstacle activates its quiz; never cleared
    pub has_triggered_quiz: bool,
    /// Hearts mode only: collision or clearance already accounted for
    pub has_been_processed: bool,
}

/// Shared run state owned by the run controller. Mode policies mutate
/// `score` through it; phase transitions are decided by the mode but
/// applied by the controller.
#[derive(Debug, Clone)]
pub struct RunState {
    pub score: u32,
    pub phase: RunPhase,
    /// Scroll multiplier; 1.0 exactly when no quiz is active
    pub slow_factor: f32,
    /// Character motion suspended (quiz overlay up)
    pub paused: bool,
    pub pending_answer: PendingAnswer,
    /// The single obstacle bound to the active/just-resolved quiz
    pub target: Option<ObstacleId>,
    pub started_at_ms: f64,
    /// Deadline for the post-final-obstacle clearance delay
    pub clearance_deadline_ms: Option<f64>,
    /// Deadline at which the ending sequence yields the result screen
    pub ending_deadline_ms: Option<f64>,
}

impl RunState {
    pub fn new(started_at_ms: f64) -> Self {
        Self {
            score: 0,
            phase: RunPhase::Initializing,
            slow_factor: 1.0,
            paused: false,
            pending_answer: PendingAnswer::None,
            target: None,
            started_at_ms,
            clearance_deadline_ms: None,
            ending_deadline_ms: None,
        }
    }

    /// Consume the pending answer and target binding. Called exactly once
    /// per resolved obstacle.
    pub fn consume_pending(&mut self) {
        self.pending_answer = PendingAnswer::None;
        self.target = None;
    }
}

/// Mode-specific result detail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSummary {
    Legacy,
    TenQuestion { correct: u32, answered: u32 },
    Endless { hearts_remaining: u8 },
}

/// What the result screen shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub mode: GameMode,
    pub score: u32,
    pub detail: ModeSummary,
}

impl RunSummary {
    /// Percentage of correct answers (10-question mode only)
    pub fn accuracy_percent(&self) -> Option<u32> {
        match self.detail {
            ModeSummary::TenQuestion { correct, answered } if answered > 0 => {
                Some(correct * 100 / answered)
            }
            _ => None,
        }
    }
}

/// Events raised during a tick, in order. The shell maps these onto audio
/// and HUD updates; the simulation never blocks on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEvent {
    QuizStarted,
    AnswerCorrect,
    AnswerWrong,
    QuizTimedOut,
    Jumped,
    PassedThrough,
    Collided,
    HeartLost { remaining: u8 },
    NewHighScore { score: u32 },
    EndingStarted,
    Finished,
    Aborted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_pending_resets_both_fields() {
        let mut run = RunState::new(0.0);
        run.pending_answer = PendingAnswer::Correct;
        run.target = Some(ObstacleId(3));
        run.consume_pending();
        assert_eq!(run.pending_answer, PendingAnswer::None);
        assert!(run.target.is_none());
    }

    #[test]
    fn test_accuracy_percent() {
        let summary = RunSummary {
            mode: GameMode::TenQuestion,
            score: 7,
            detail: ModeSummary::TenQuestion {
                correct: 7,
                answered: 10,
            },
        };
        assert_eq!(summary.accuracy_percent(), Some(70));

        let endless = RunSummary {
            mode: GameMode::Endless,
            score: 40,
            detail: ModeSummary::Endless { hearts_remaining: 0 },
        };
        assert_eq!(endless.accuracy_percent(), None);
    }
}
