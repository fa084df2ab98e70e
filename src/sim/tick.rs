//! Run controller
//!
//! The one tick loop shared by every mode. Order inside a tick matters:
//! the quiz deadline check runs before jump resolution, so a timeout
//! converts to a Wrong verdict that the same tick's resolution step sees.

use crate::consts::*;
use crate::highscores::ScorePersistence;
use crate::input::{InputEvent, Key};
use crate::questions::{Question, QuestionBank, QuestionKind};
use crate::sim::clock::FrameTimer;
use crate::sim::field::ObstacleField;
use crate::sim::mode::{make_mode, Mode};
use crate::sim::motion::CharacterMotion;
use crate::sim::quiz::{overlay, QuizEngine, QuizSession};
use crate::sim::state::{
    GameMode, Obstacle, ObstacleAction, ObstacleId, PendingAnswer, RunEvent, RunPhase, RunState,
    RunSummary, Verdict,
};
use crate::telemetry::PlayTelemetry;
use crate::AssetProvider;

/// Identity of the play session for telemetry
struct PlayContext {
    game_id: String,
    user_id: String,
}

/// Top-level orchestrator: owns the run state, the sub-systems, and the
/// collaborator ports, and routes input to the current phase only.
pub struct RunController {
    run: RunState,
    clock: FrameTimer,
    field: ObstacleField,
    character: CharacterMotion,
    quiz: QuizEngine,
    mode: Box<dyn Mode>,
    bank: Box<dyn QuestionBank>,
    scores: Box<dyn ScorePersistence>,
    telemetry: Option<(Box<dyn PlayTelemetry>, PlayContext)>,
    telemetry_sent: bool,
    summary: Option<RunSummary>,
    events: Vec<RunEvent>,
    empty_bank_warned: Option<ObstacleId>,
}

impl RunController {
    pub fn new(
        mode: GameMode,
        bank: Box<dyn QuestionBank>,
        scores: Box<dyn ScorePersistence>,
    ) -> Self {
        Self {
            run: RunState::new(0.0),
            clock: FrameTimer::new(),
            field: ObstacleField::new(0.0),
            character: CharacterMotion::new(),
            quiz: QuizEngine::new(),
            mode: make_mode(mode),
            bank,
            scores,
            telemetry: None,
            telemetry_sent: false,
            summary: None,
            events: Vec::new(),
            empty_bank_warned: None,
        }
    }

    /// Attach the play-tracking backend
    pub fn with_telemetry(
        mut self,
        telemetry: Box<dyn PlayTelemetry>,
        game_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        self.telemetry = Some((
            telemetry,
            PlayContext {
                game_id: game_id.into(),
                user_id: user_id.into(),
            },
        ));
        self
    }

    /// Leave `Initializing` once the shell's assets have settled. The first
    /// fence spawns immediately, like every mode's original init path.
    pub fn try_start(&mut self, assets: &dyn AssetProvider, now_ms: f64) -> bool {
        if self.run.phase != RunPhase::Initializing {
            return true;
        }
        if !assets.is_ready() {
            return false;
        }
        self.run = RunState::new(now_ms);
        self.run.phase = RunPhase::Playing;
        self.field = ObstacleField::new(now_ms);
        self.field.spawn();
        self.character.reset();
        log::info!("run started: {:?}", self.mode.kind());
        true
    }

    /// Advance one frame. Returns the events raised this tick, in order.
    pub fn tick(&mut self, now_ms: f64) -> Vec<RunEvent> {
        let delta_ms = self.clock.tick(now_ms);

        match self.run.phase {
            RunPhase::Initializing | RunPhase::Result => {}
            RunPhase::EndingSequence => {
                // The world keeps scrolling behind the countdown overlay
                self.field.advance(delta_ms, self.run.slow_factor);
                self.field.prune();
                self.character.update(delta_ms);
                if self
                    .run
                    .ending_deadline_ms
                    .is_some_and(|deadline| now_ms >= deadline)
                {
                    self.finish(now_ms);
                }
            }
            RunPhase::Playing => {
                if self.mode.allows_spawn() {
                    self.field.spawn_if_due(now_ms, self.quiz.is_active());
                }
                self.field.advance(delta_ms, self.run.slow_factor);
                let removed = self.field.prune();
                if let Some(target) = self.run.target {
                    if removed.contains(&target) {
                        // The gating fence left the screen unresolved; the
                        // question is settled either way
                        self.run.consume_pending();
                        self.mode.on_target_resolved();
                    }
                }

                self.maybe_trigger(now_ms);

                if !self.run.paused {
                    self.character.update(delta_ms);
                }

                // Timeout strictly before resolution (see module docs)
                if let Some((verdict, question)) = self.quiz.tick(now_ms) {
                    self.events.push(RunEvent::QuizTimedOut);
                    self.apply_verdict(verdict, &question, now_ms);
                }

                self.resolve_target();
                self.check_collisions(now_ms);
                self.check_run_over(now_ms);
            }
        }

        std::mem::take(&mut self.events)
    }

    /// Route an input event to the current phase's handler. There is only
    /// this dispatcher; nothing is registered per screen, so nothing leaks
    /// across screens.
    pub fn handle_input(&mut self, event: InputEvent, now_ms: f64) -> Vec<RunEvent> {
        match self.run.phase {
            RunPhase::Playing if self.quiz.is_active() => self.handle_quiz_input(event, now_ms),
            RunPhase::Playing => {
                if event == InputEvent::KeyPress(Key::Escape) {
                    self.abort(now_ms);
                }
            }
            _ => {}
        }
        std::mem::take(&mut self.events)
    }

    fn handle_quiz_input(&mut self, event: InputEvent, now_ms: f64) {
        let Some(kind) = self.quiz.session().map(|s| s.question.kind) else {
            return;
        };
        match (kind, event) {
            (QuestionKind::TextInput, InputEvent::KeyPress(key)) => match key {
                Key::Char(c) => self.quiz.push_char(c),
                Key::Backspace => self.quiz.pop_char(),
                Key::Enter => {
                    if let Some((verdict, question)) = self.quiz.submit_buffer() {
                        self.apply_verdict(verdict, &question, now_ms);
                        self.check_run_over(now_ms);
                    }
                }
                Key::Escape => {}
            },
            (QuestionKind::TextInput, InputEvent::PointerClick { x, y }) => {
                // Clicking the input box only focuses it; the buffer is
                // already the keyboard target
                let _ = overlay::hit_test_input(x, y);
            }
            (QuestionKind::MultipleChoice, InputEvent::PointerClick { x, y }) => {
                let count = self
                    .quiz
                    .session()
                    .map(|s| s.question.options.len())
                    .unwrap_or(0);
                if let Some(overlay::OverlayHit::Option(index)) =
                    overlay::hit_test_options(count, x, y)
                {
                    if let Some((verdict, question)) = self.quiz.submit_option(index) {
                        self.apply_verdict(verdict, &question, now_ms);
                        self.check_run_over(now_ms);
                    }
                }
            }
            (QuestionKind::MultipleChoice, InputEvent::KeyPress(_)) => {}
        }
    }

    /// Quiz trigger detection. The fence is only marked triggered once a
    /// question was actually drawn; an empty bank leaves it on the
    /// unanswered-collision path instead of wedging the run.
    fn maybe_trigger(&mut self, now_ms: f64) {
        if self.quiz.is_active()
            || !self.character.is_grounded()
            || self.run.target.is_some()
            || !self.mode.allows_trigger()
        {
            return;
        }
        let Some(id) = self.field.detect_quiz_trigger(CHARACTER_X) else {
            return;
        };
        match self.bank.next_question() {
            Some(question) => {
                let params = self.mode.on_quiz_triggered(&question);
                self.field.mark_triggered(id);
                self.run.target = Some(id);
                self.run.slow_factor = params.slow_factor;
                self.run.paused = true;
                self.quiz.activate(question, params.time_limit_ms, now_ms);
                self.events.push(RunEvent::QuizStarted);
            }
            None => {
                if self.empty_bank_warned != Some(id) {
                    log::warn!("question bank empty; fence {} proceeds unanswered", id.0);
                    self.empty_bank_warned = Some(id);
                }
            }
        }
    }

    /// Record a verdict and tear the quiz state down. `pending_answer`
    /// stays set until the target obstacle reaches the resolution window.
    fn apply_verdict(&mut self, verdict: Verdict, question: &Question, now_ms: f64) {
        self.run.pending_answer = PendingAnswer::from(verdict);
        self.mode.on_answer(verdict, &mut self.run);
        self.events.push(match verdict {
            Verdict::Correct => RunEvent::AnswerCorrect,
            Verdict::Wrong => RunEvent::AnswerWrong,
        });

        if verdict == Verdict::Correct
            && self.mode.persists_high_score()
            && self.run.score > self.scores.high_score()
        {
            self.scores.set_high_score(self.run.score);
            self.events.push(RunEvent::NewHighScore {
                score: self.run.score,
            });
        }

        self.run.slow_factor = 1.0;
        self.run.paused = false;
        self.field.note_quiz_end(now_ms);
        self.field
            .set_spawn_interval(self.mode.spawn_interval_after(question));
    }

    /// Resolve the pending answer against the target obstacle. The first
    /// tick the window holds commits the action and consumes the pending
    /// state, so no action fires twice for the same fence.
    fn resolve_target(&mut self) {
        if self.run.pending_answer == PendingAnswer::None || !self.character.is_grounded() {
            return;
        }
        let Some(target) = self.run.target else {
            return;
        };
        let Some(obstacle) = self.field.get(target) else {
            self.run.consume_pending();
            return;
        };
        let action =
            self.mode
                .resolve_against_obstacle(obstacle, CHARACTER_X, self.run.pending_answer);
        match action {
            ObstacleAction::None => {}
            ObstacleAction::Jump => {
                self.character.jump();
                self.events.push(RunEvent::Jumped);
                self.run.consume_pending();
                self.mode.on_target_resolved();
            }
            ObstacleAction::PassThrough => {
                self.events.push(RunEvent::PassedThrough);
                self.run.consume_pending();
                self.mode.on_target_resolved();
            }
            ObstacleAction::Collide => {
                // Collisions are detected physically, not scheduled
            }
        }
    }

    /// Physical collision and clearance bookkeeping. Checked independently
    /// of the answer flags so an unanswered fence costs the same as a
    /// wrong-answered one.
    fn check_collisions(&mut self, now_ms: f64) {
        if let Some((behind, ahead)) = self.mode.collision_band() {
            if self.character.is_grounded() {
                let lower = CHARACTER_X - behind;
                let upper = CHARACTER_X + ahead;
                let hit = self
                    .field
                    .obstacles()
                    .iter()
                    .find(|o| !o.has_been_processed && o.x >= lower && o.x <= upper)
                    .map(|o| o.id);
                if let Some(id) = hit {
                    if let Some(obstacle) = self.field.get_mut(id) {
                        obstacle.has_been_processed = true;
                    }
                    // A quiz still pending on this fence loses the race:
                    // cancel it without a verdict
                    if self.quiz.is_active() && self.run.target == Some(id) {
                        self.quiz.cancel();
                        self.run.slow_factor = 1.0;
                        self.run.paused = false;
                        self.field.note_quiz_end(now_ms);
                    }
                    if self.run.target == Some(id) {
                        self.run.consume_pending();
                    }
                    self.mode.on_collision(&mut self.run);
                    self.events.push(RunEvent::Collided);
                    if let Some(remaining) = self.mode.lives() {
                        self.events.push(RunEvent::HeartLost { remaining });
                    }
                }
            }
        }

        // A fence fully behind the character is settled
        let cleared: Vec<ObstacleId> = self
            .field
            .obstacles()
            .iter()
            .filter(|o| !o.has_been_processed && o.x < CHARACTER_X - PASS_BEHIND)
            .map(|o| o.id)
            .collect();
        for id in cleared {
            if let Some(obstacle) = self.field.get_mut(id) {
                obstacle.has_been_processed = true;
            }
            if self.run.target == Some(id) {
                self.run.consume_pending();
            }
        }
    }

    /// Phase transitions out of `Playing`
    fn check_run_over(&mut self, now_ms: f64) {
        if self.run.phase != RunPhase::Playing || !self.mode.is_run_over() {
            return;
        }
        if self.mode.ends_immediately() {
            self.finish(now_ms);
            return;
        }
        let delay = self.mode.clearance_delay_ms();
        if delay > 0.0 {
            match self.run.clearance_deadline_ms {
                None => {
                    self.run.clearance_deadline_ms = Some(now_ms + delay);
                    return;
                }
                Some(deadline) if now_ms < deadline => return,
                Some(_) => {}
            }
        }
        self.start_ending(now_ms);
    }

    fn start_ending(&mut self, now_ms: f64) {
        self.run.phase = RunPhase::EndingSequence;
        self.run.ending_deadline_ms = Some(now_ms + ENDING_SEQUENCE_MS);
        self.quiz.cancel();
        self.run.slow_factor = 1.0;
        self.run.paused = false;
        self.run.consume_pending();
        if self.mode.clears_field_on_ending() {
            self.field.clear();
        }
        self.events.push(RunEvent::EndingStarted);
        log::info!("ending sequence started");
    }

    /// Terminal transition into `Result`
    fn finish(&mut self, now_ms: f64) {
        if self.run.phase == RunPhase::Result {
            return;
        }
        self.run.phase = RunPhase::Result;
        self.quiz.cancel();
        self.run.slow_factor = 1.0;
        self.run.paused = false;
        self.run.consume_pending();
        self.field.clear();
        self.summary = Some(self.mode.finalize(&self.run));
        self.events.push(RunEvent::Finished);
        log::info!("run over: score {}", self.run.score);
        self.report_play(now_ms);
    }

    /// Abort back to the menu (Escape). Still produces a summary and a
    /// telemetry row for the partial run.
    fn abort(&mut self, now_ms: f64) {
        self.events.push(RunEvent::Aborted);
        self.finish(now_ms);
    }

    /// One fire-and-forget telemetry row per run; failures are logged and
    /// swallowed, never retried.
    fn report_play(&mut self, now_ms: f64) {
        if self.telemetry_sent {
            return;
        }
        let Some((telemetry, ctx)) = &self.telemetry else {
            return;
        };
        self.telemetry_sent = true;
        let duration_secs = ((now_ms - self.run.started_at_ms) / 1000.0).max(0.0) as u32;
        if let Err(e) =
            telemetry.record_play(&ctx.game_id, &ctx.user_id, self.run.score, duration_secs)
        {
            log::warn!("failed to track play: {e}");
        }
    }

    // --- accessors for the shell/HUD ---

    pub fn phase(&self) -> RunPhase {
        self.run.phase
    }

    pub fn state(&self) -> &RunState {
        &self.run
    }

    pub fn score(&self) -> u32 {
        self.run.score
    }

    pub fn mode_kind(&self) -> GameMode {
        self.mode.kind()
    }

    pub fn lives(&self) -> Option<u8> {
        self.mode.lives()
    }

    pub fn fps(&self) -> u32 {
        self.clock.fps()
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        self.field.obstacles()
    }

    pub fn character(&self) -> &CharacterMotion {
        &self.character
    }

    pub fn quiz_session(&self) -> Option<&QuizSession> {
        self.quiz.session()
    }

    pub fn quiz_remaining_ms(&self, now_ms: f64) -> f64 {
        self.quiz.remaining_ms(now_ms)
    }

    /// Result-screen data, present once the run has finished
    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }
}
