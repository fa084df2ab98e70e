//! Mode policies
//!
//! One trait, three variants. Everything the three historical game loops
//! disagreed on - what a wrong answer costs, when the run ends, how score
//! accrues - lives behind this interface; the tick loop itself is shared.

use crate::consts::*;
use crate::questions::Question;
use crate::sim::state::{
    GameMode, ModeSummary, Obstacle, ObstacleAction, PendingAnswer, RunState, RunSummary, Verdict,
};
use crate::slow_factor_for_duration;

/// Time budget and world slowdown for a newly triggered quiz
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuizParams {
    pub time_limit_ms: f64,
    pub slow_factor: f32,
}

impl QuizParams {
    fn for_question(question: &Question) -> Self {
        let duration_secs = question
            .duration_secs
            .unwrap_or((QUIZ_TIME_LIMIT_MS / 1000.0) as u32);
        Self {
            time_limit_ms: question.time_limit_ms(),
            slow_factor: slow_factor_for_duration(duration_secs),
        }
    }
}

/// True while `x` is inside the shared jump/pass resolution window
/// `(character_x - 50, character_x + 250)`
fn in_resolution_window(x: f32, character_x: f32) -> bool {
    x < character_x + JUMP_DISTANCE && x > character_x - JUMP_BEHIND_MARGIN
}

/// Policy layer consumed by the run controller
pub trait Mode {
    fn kind(&self) -> GameMode;

    /// Time limit and slow factor for a triggered question
    fn on_quiz_triggered(&mut self, question: &Question) -> QuizParams {
        QuizParams::for_question(question)
    }

    /// Record a verdict: score, progress, lives. The controller sets
    /// `pending_answer` and routes high-score persistence.
    fn on_answer(&mut self, verdict: Verdict, run: &mut RunState);

    /// Decide what happens to the target obstacle this tick. Called while
    /// an answer is pending; the first tick the window holds commits the
    /// action.
    fn resolve_against_obstacle(
        &self,
        obstacle: &Obstacle,
        character_x: f32,
        pending: PendingAnswer,
    ) -> ObstacleAction;

    /// The controller committed a resolution action for the target obstacle
    fn on_target_resolved(&mut self) {}

    /// Collision band as `(behind, ahead)` offsets around the character,
    /// or None when the mode has no physical collision
    fn collision_band(&self) -> Option<(f32, f32)> {
        None
    }

    /// An unjumped obstacle reached the character
    fn on_collision(&mut self, run: &mut RunState);

    /// Lives remaining, for modes that have them
    fn lives(&self) -> Option<u8> {
        None
    }

    /// Whether new obstacles may spawn / quizzes may trigger
    fn allows_spawn(&self) -> bool {
        true
    }
    fn allows_trigger(&self) -> bool {
        true
    }

    /// Spawn wait after a quiz for this question. Hook for variants that
    /// shorten the gap after long questions; the default is the fixed
    /// interval every shipped mode uses.
    fn spawn_interval_after(&self, _question: &Question) -> f64 {
        OBSTACLE_SPAWN_INTERVAL_MS
    }

    /// Correct answers persist the score as a high score
    fn persists_high_score(&self) -> bool {
        true
    }

    /// Run skips the ending sequence and goes straight to the result
    fn ends_immediately(&self) -> bool {
        false
    }

    /// Obstacles are wiped when the ending sequence starts
    fn clears_field_on_ending(&self) -> bool {
        false
    }

    /// Extra wait between the run-over condition and the ending sequence
    fn clearance_delay_ms(&self) -> f64 {
        0.0
    }

    fn is_run_over(&self) -> bool;

    fn finalize(&self, run: &RunState) -> RunSummary;
}

/// Earliest policy: one life, any failure ends the run on the spot.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyMode {
    over: bool,
}

impl LegacyMode {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Mode for LegacyMode {
    fn kind(&self) -> GameMode {
        GameMode::Legacy
    }

    fn on_answer(&mut self, verdict: Verdict, run: &mut RunState) {
        match verdict {
            Verdict::Correct => run.score += 10,
            Verdict::Wrong => self.over = true,
        }
    }

    fn resolve_against_obstacle(
        &self,
        obstacle: &Obstacle,
        character_x: f32,
        pending: PendingAnswer,
    ) -> ObstacleAction {
        // Only a correct answer schedules a jump; a wrong answer already
        // ended the run before resolution could run.
        if pending == PendingAnswer::Correct && in_resolution_window(obstacle.x, character_x) {
            ObstacleAction::Jump
        } else {
            ObstacleAction::None
        }
    }

    fn collision_band(&self) -> Option<(f32, f32)> {
        Some((JUMP_BEHIND_MARGIN, LEGACY_COLLIDE_AHEAD))
    }

    fn on_collision(&mut self, _run: &mut RunState) {
        self.over = true;
    }

    fn ends_immediately(&self) -> bool {
        true
    }

    fn is_run_over(&self) -> bool {
        self.over
    }

    fn finalize(&self, run: &RunState) -> RunSummary {
        RunSummary {
            mode: GameMode::Legacy,
            score: run.score,
            detail: ModeSummary::Legacy,
        }
    }
}

/// Fixed 10 questions; wrong answers run through the fence. The run ends
/// only after the 10th question's obstacle has been jumped or passed.
#[derive(Debug, Clone, Copy)]
pub struct TenQuestionMode {
    max_questions: u32,
    questions_answered: u32,
    correct_answers: u32,
    last_obstacle_cleared: bool,
}

impl Default for TenQuestionMode {
    fn default() -> Self {
        Self::new()
    }
}

impl TenQuestionMode {
    pub fn new() -> Self {
        Self {
            max_questions: 10,
            questions_answered: 0,
            correct_answers: 0,
            last_obstacle_cleared: false,
        }
    }

    pub fn questions_answered(&self) -> u32 {
        self.questions_answered
    }

    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    fn all_answered(&self) -> bool {
        self.questions_answered >= self.max_questions
    }
}

impl Mode for TenQuestionMode {
    fn kind(&self) -> GameMode {
        GameMode::TenQuestion
    }

    fn on_quiz_triggered(&mut self, _question: &Question) -> QuizParams {
        // This variant keeps the flat 10-second limit regardless of the
        // question's own duration
        QuizParams {
            time_limit_ms: QUIZ_TIME_LIMIT_MS,
            slow_factor: 0.2,
        }
    }

    fn on_answer(&mut self, verdict: Verdict, run: &mut RunState) {
        self.questions_answered += 1;
        if verdict == Verdict::Correct {
            self.correct_answers += 1;
            // Score is the count of correct answers, not point-weighted
            run.score = self.correct_answers;
        }
    }

    fn resolve_against_obstacle(
        &self,
        obstacle: &Obstacle,
        character_x: f32,
        pending: PendingAnswer,
    ) -> ObstacleAction {
        if !in_resolution_window(obstacle.x, character_x) {
            return ObstacleAction::None;
        }
        match pending {
            PendingAnswer::Correct => ObstacleAction::Jump,
            PendingAnswer::Wrong => ObstacleAction::PassThrough,
            PendingAnswer::None => ObstacleAction::None,
        }
    }

    fn on_target_resolved(&mut self) {
        if self.all_answered() {
            self.last_obstacle_cleared = true;
        }
    }

    fn on_collision(&mut self, _run: &mut RunState) {
        // No collision penalty: the character runs through unanswered fences
    }

    fn allows_spawn(&self) -> bool {
        !self.all_answered()
    }

    fn allows_trigger(&self) -> bool {
        !self.all_answered()
    }

    fn persists_high_score(&self) -> bool {
        false
    }

    fn clearance_delay_ms(&self) -> f64 {
        LAST_CLEAR_DELAY_MS
    }

    fn is_run_over(&self) -> bool {
        self.all_answered() && self.last_obstacle_cleared
    }

    fn finalize(&self, run: &RunState) -> RunSummary {
        RunSummary {
            mode: GameMode::TenQuestion,
            score: run.score,
            detail: ModeSummary::TenQuestion {
                correct: self.correct_answers,
                answered: self.questions_answered,
            },
        }
    }
}

/// Hearts mode: the run lasts as long as the hearts do. Collision is
/// physical and independent of the answer flag, so an unanswered fence
/// costs a heart the same way a wrong-answered one does.
#[derive(Debug, Clone, Copy)]
pub struct EndlessMode {
    hearts: u8,
    max_hearts: u8,
}

impl Default for EndlessMode {
    fn default() -> Self {
        Self::new()
    }
}

impl EndlessMode {
    pub fn new() -> Self {
        Self {
            hearts: 3,
            max_hearts: 3,
        }
    }

    pub fn hearts(&self) -> u8 {
        self.hearts
    }

    pub fn max_hearts(&self) -> u8 {
        self.max_hearts
    }
}

impl Mode for EndlessMode {
    fn kind(&self) -> GameMode {
        GameMode::Endless
    }

    fn on_answer(&mut self, verdict: Verdict, run: &mut RunState) {
        if verdict == Verdict::Correct {
            run.score += 10;
        }
    }

    fn resolve_against_obstacle(
        &self,
        obstacle: &Obstacle,
        character_x: f32,
        pending: PendingAnswer,
    ) -> ObstacleAction {
        if !in_resolution_window(obstacle.x, character_x) {
            return ObstacleAction::None;
        }
        match pending {
            PendingAnswer::Correct => ObstacleAction::Jump,
            // Pass-through does not mark the fence processed: it will still
            // reach the collision band and cost the heart there
            PendingAnswer::Wrong => ObstacleAction::PassThrough,
            PendingAnswer::None => ObstacleAction::None,
        }
    }

    fn collision_band(&self) -> Option<(f32, f32)> {
        Some((JUMP_BEHIND_MARGIN, COLLIDE_AHEAD))
    }

    fn on_collision(&mut self, _run: &mut RunState) {
        self.hearts = self.hearts.saturating_sub(1);
        log::info!("Lost a heart, {} remaining", self.hearts);
    }

    fn lives(&self) -> Option<u8> {
        Some(self.hearts)
    }

    fn clears_field_on_ending(&self) -> bool {
        true
    }

    fn is_run_over(&self) -> bool {
        self.hearts == 0
    }

    fn finalize(&self, run: &RunState) -> RunSummary {
        RunSummary {
            mode: GameMode::Endless,
            score: run.score,
            detail: ModeSummary::Endless {
                hearts_remaining: self.hearts,
            },
        }
    }
}

/// Construct the policy for a selected mode
pub fn make_mode(mode: GameMode) -> Box<dyn Mode> {
    match mode {
        GameMode::Legacy => Box::new(LegacyMode::new()),
        GameMode::TenQuestion => Box::new(TenQuestionMode::new()),
        GameMode::Endless => Box::new(EndlessMode::new()),
    }
}
