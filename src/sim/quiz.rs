//! Quiz engine
//!
//! Owns the active question, its deadline, and the typed input buffer.
//! Correctness policy and scoring live in the mode; this module only
//! produces verdicts. A timeout is always a Wrong verdict, never a
//! separate failure class.

use unicode_normalization::UnicodeNormalization;

use crate::questions::{Question, QuestionKind};
use crate::sim::state::Verdict;

/// An activated question with its deadline and input buffer
#[derive(Debug, Clone)]
pub struct QuizSession {
    pub question: Question,
    pub started_at_ms: f64,
    pub time_limit_ms: f64,
    pub input_buffer: String,
}

/// Inactive/Active state machine around the current quiz session
#[derive(Debug, Clone, Default)]
pub struct QuizEngine {
    session: Option<QuizSession>,
}

impl QuizEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    /// Start a quiz. Replaces nothing: at most one session exists, and the
    /// controller only activates while inactive.
    pub fn activate(&mut self, question: Question, time_limit_ms: f64, now_ms: f64) {
        debug_assert!(self.session.is_none());
        self.session = Some(QuizSession {
            question,
            started_at_ms: now_ms,
            time_limit_ms,
            input_buffer: String::new(),
        });
    }

    /// Time left on the active question, clamped at zero
    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        match &self.session {
            Some(s) => (s.time_limit_ms - (now_ms - s.started_at_ms)).max(0.0),
            None => 0.0,
        }
    }

    /// Deadline check. An expired session resolves to Wrong and deactivates;
    /// the question comes back so the caller can tune follow-up timing.
    pub fn tick(&mut self, now_ms: f64) -> Option<(Verdict, Question)> {
        let expired = self
            .session
            .as_ref()
            .is_some_and(|s| now_ms - s.started_at_ms >= s.time_limit_ms);
        if !expired {
            return None;
        }
        let session = self.session.take()?;
        Some((Verdict::Wrong, session.question))
    }

    /// Append a typed character (text-input questions only)
    pub fn push_char(&mut self, c: char) {
        if let Some(session) = &mut self.session {
            if session.question.kind == QuestionKind::TextInput {
                session.input_buffer.push(c);
            }
        }
    }

    /// Remove the last typed character
    pub fn pop_char(&mut self) {
        if let Some(session) = &mut self.session {
            session.input_buffer.pop();
        }
    }

    /// Submit the typed buffer (Enter on a text-input question). An empty
    /// buffer is simply a wrong answer, not a validation error.
    pub fn submit_buffer(&mut self) -> Option<(Verdict, Question)> {
        let session = self.session.as_ref()?;
        if session.question.kind != QuestionKind::TextInput {
            return None;
        }
        let verdict = if answers_match(&session.question.correct, &session.input_buffer) {
            Verdict::Correct
        } else {
            Verdict::Wrong
        };
        let session = self.session.take()?;
        Some((verdict, session.question))
    }

    /// Submit a selected option (click on a multiple-choice question).
    /// An out-of-range index counts as wrong.
    pub fn submit_option(&mut self, index: usize) -> Option<(Verdict, Question)> {
        let session = self.session.as_ref()?;
        if session.question.kind != QuestionKind::MultipleChoice {
            return None;
        }
        let verdict = match session.question.options.get(index) {
            Some(option) if option == &session.question.correct => Verdict::Correct,
            _ => Verdict::Wrong,
        };
        let session = self.session.take()?;
        Some((verdict, session.question))
    }

    /// Drop the session without a verdict (collision won the race, or the
    /// run was aborted)
    pub fn cancel(&mut self) {
        self.session = None;
    }
}

/// Locale-normalizing free-text comparison: case-insensitive,
/// diacritics-insensitive, whitespace-collapsed, so an answer typed without
/// accent marks still matches the accented canonical form.
pub fn answers_match(canonical: &str, input: &str) -> bool {
    !input.trim().is_empty() && normalize_answer(canonical) == normalize_answer(input)
}

/// Fold a free-text answer to its comparison form. NFD decomposition with
/// combining marks stripped handles the accent classes; đ/Đ does not
/// decompose and is mapped by hand.
pub fn normalize_answer(s: &str) -> String {
    let folded: String = s
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .map(|c| match c {
            'đ' => 'd',
            'Đ' => 'D',
            c => c,
        })
        .collect();
    folded
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Quiz overlay geometry. The shell draws the 1200x600 box; clicks come
/// back as raw world coordinates and are resolved here so the input source
/// stays a dumb event pipe.
pub mod overlay {
    use crate::consts::{VIEW_HEIGHT, VIEW_WIDTH};

    pub const BOX_WIDTH: f32 = 1200.0;
    pub const BOX_HEIGHT: f32 = 600.0;
    pub const BUTTON_WIDTH: f32 = 320.0;
    pub const BUTTON_HEIGHT: f32 = 100.0;
    pub const BUTTON_SPACING: f32 = 20.0;
    pub const INPUT_BOX_WIDTH: f32 = 400.0;
    pub const INPUT_BOX_HEIGHT: f32 = 60.0;

    /// What a click inside the overlay landed on
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum OverlayHit {
        Option(usize),
        InputBox,
    }

    fn box_origin() -> (f32, f32) {
        (
            (VIEW_WIDTH - BOX_WIDTH) / 2.0,
            (VIEW_HEIGHT - BOX_HEIGHT) / 2.0,
        )
    }

    /// Hit-test a click against the 2x2 option grid
    pub fn hit_test_options(option_count: usize, x: f32, y: f32) -> Option<OverlayHit> {
        let (box_x, box_y) = box_origin();
        let start_x = box_x + (BOX_WIDTH - 2.0 * BUTTON_WIDTH - BUTTON_SPACING) / 2.0;
        let start_y = box_y + 150.0;

        for index in 0..option_count {
            let col = (index % 2) as f32;
            let row = (index / 2) as f32;
            let bx = start_x + col * (BUTTON_WIDTH + BUTTON_SPACING);
            let by = start_y + row * (BUTTON_HEIGHT + BUTTON_SPACING);
            if x >= bx && x <= bx + BUTTON_WIDTH && y >= by && y <= by + BUTTON_HEIGHT {
                return Some(OverlayHit::Option(index));
            }
        }
        None
    }

    /// Center of an option button, for shells that place cursors or
    /// synthesize clicks on the grid
    pub fn option_center(index: usize) -> (f32, f32) {
        let (box_x, box_y) = box_origin();
        let start_x = box_x + (BOX_WIDTH - 2.0 * BUTTON_WIDTH - BUTTON_SPACING) / 2.0;
        let start_y = box_y + 150.0;
        let col = (index % 2) as f32;
        let row = (index / 2) as f32;
        (
            start_x + col * (BUTTON_WIDTH + BUTTON_SPACING) + BUTTON_WIDTH / 2.0,
            start_y + row * (BUTTON_HEIGHT + BUTTON_SPACING) + BUTTON_HEIGHT / 2.0,
        )
    }

    /// Hit-test a click against the text-input box
    pub fn hit_test_input(x: f32, y: f32) -> Option<OverlayHit> {
        let (_, box_y) = box_origin();
        let input_x = (VIEW_WIDTH - INPUT_BOX_WIDTH) / 2.0;
        let input_y = box_y + 200.0;
        if x >= input_x && x <= input_x + INPUT_BOX_WIDTH && y >= input_y && y <= input_y + INPUT_BOX_HEIGHT
        {
            return Some(OverlayHit::InputBox);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn text_question(correct: &str) -> Question {
        Question {
            prompt: "fill in the blank".into(),
            kind: QuestionKind::TextInput,
            options: Vec::new(),
            correct: correct.into(),
            duration_secs: None,
        }
    }

    fn choice_question(options: &[&str], correct: &str) -> Question {
        Question {
            prompt: "pick one".into(),
            kind: QuestionKind::MultipleChoice,
            options: options.iter().map(|s| s.to_string()).collect(),
            correct: correct.into(),
            duration_secs: Some(10),
        }
    }

    #[test]
    fn test_normalize_strips_accents_and_case() {
        assert_eq!(normalize_answer("Độc lập"), "doc lap");
        assert_eq!(normalize_answer("doc lap"), "doc lap");
        assert_eq!(normalize_answer("  DOC   LAP  "), "doc lap");
        assert_eq!(normalize_answer("Điện Biên Phủ"), "dien bien phu");
    }

    #[test]
    fn test_unaccented_input_matches_accented_canonical() {
        assert!(answers_match("Độc lập", "doc lap"));
        assert!(answers_match("Độc lập", "ĐỘC LẬP"));
        assert!(!answers_match("Độc lập", "doc"));
    }

    #[test]
    fn test_empty_submission_is_wrong() {
        assert!(!answers_match("Độc lập", ""));
        assert!(!answers_match("Độc lập", "   "));

        let mut quiz = QuizEngine::new();
        quiz.activate(text_question("Độc lập"), 10_000.0, 0.0);
        let (verdict, _) = quiz.submit_buffer().unwrap();
        assert_eq!(verdict, Verdict::Wrong);
        assert!(!quiz.is_active());
    }

    #[test]
    fn test_typed_answer_submits_correct() {
        let mut quiz = QuizEngine::new();
        quiz.activate(text_question("Độc lập"), 10_000.0, 0.0);
        for c in "doc lap".chars() {
            quiz.push_char(c);
        }
        let (verdict, question) = quiz.submit_buffer().unwrap();
        assert_eq!(verdict, Verdict::Correct);
        assert_eq!(question.correct, "Độc lập");
    }

    #[test]
    fn test_backspace_edits_buffer() {
        let mut quiz = QuizEngine::new();
        quiz.activate(text_question("ha noi"), 10_000.0, 0.0);
        for c in "ha noix".chars() {
            quiz.push_char(c);
        }
        quiz.pop_char();
        let (verdict, _) = quiz.submit_buffer().unwrap();
        assert_eq!(verdict, Verdict::Correct);
    }

    #[test]
    fn test_option_submit_exact_match() {
        let mut quiz = QuizEngine::new();
        quiz.activate(choice_question(&["a", "b", "c", "d"], "c"), 10_000.0, 0.0);
        let (verdict, _) = quiz.submit_option(2).unwrap();
        assert_eq!(verdict, Verdict::Correct);

        let mut quiz = QuizEngine::new();
        quiz.activate(choice_question(&["a", "b", "c", "d"], "c"), 10_000.0, 0.0);
        let (verdict, _) = quiz.submit_option(0).unwrap();
        assert_eq!(verdict, Verdict::Wrong);
    }

    #[test]
    fn test_out_of_range_option_is_wrong() {
        let mut quiz = QuizEngine::new();
        quiz.activate(choice_question(&["a", "b"], "a"), 10_000.0, 0.0);
        let (verdict, _) = quiz.submit_option(7).unwrap();
        assert_eq!(verdict, Verdict::Wrong);
    }

    #[test]
    fn test_timeout_is_always_wrong() {
        let mut quiz = QuizEngine::new();
        quiz.activate(text_question("x"), 10_000.0, 1000.0);

        assert!(quiz.tick(10_999.0).is_none());
        let (verdict, _) = quiz.tick(11_000.0).unwrap();
        assert_eq!(verdict, Verdict::Wrong);
        assert!(!quiz.is_active());
        // Resolved session does not fire twice
        assert!(quiz.tick(12_000.0).is_none());
    }

    #[test]
    fn test_remaining_ms_clamps() {
        let mut quiz = QuizEngine::new();
        quiz.activate(text_question("x"), 5000.0, 0.0);
        assert_eq!(quiz.remaining_ms(1000.0), 4000.0);
        assert_eq!(quiz.remaining_ms(9000.0), 0.0);
    }

    #[test]
    fn test_overlay_hits_option_grid() {
        use overlay::{hit_test_options, OverlayHit};
        // First button: start_x = 325 + 270 = ... derive from constants
        let box_x = (crate::consts::VIEW_WIDTH - overlay::BOX_WIDTH) / 2.0;
        let box_y = (crate::consts::VIEW_HEIGHT - overlay::BOX_HEIGHT) / 2.0;
        let start_x = box_x + (overlay::BOX_WIDTH - 2.0 * overlay::BUTTON_WIDTH - overlay::BUTTON_SPACING) / 2.0;
        let start_y = box_y + 150.0;

        assert_eq!(
            hit_test_options(4, start_x + 10.0, start_y + 10.0),
            Some(OverlayHit::Option(0))
        );
        assert_eq!(
            hit_test_options(
                4,
                start_x + overlay::BUTTON_WIDTH + overlay::BUTTON_SPACING + 10.0,
                start_y + overlay::BUTTON_HEIGHT + overlay::BUTTON_SPACING + 10.0
            ),
            Some(OverlayHit::Option(3))
        );
        assert_eq!(hit_test_options(4, 0.0, 0.0), None);
        // Only as many buttons as options
        assert_eq!(
            hit_test_options(
                2,
                start_x + 10.0,
                start_y + overlay::BUTTON_HEIGHT + overlay::BUTTON_SPACING + 10.0
            ),
            None
        );
    }

    #[test]
    fn test_option_center_round_trips_through_hit_test() {
        use overlay::{hit_test_options, option_center, OverlayHit};
        for index in 0..4 {
            let (x, y) = option_center(index);
            assert_eq!(hit_test_options(4, x, y), Some(OverlayHit::Option(index)));
        }
    }

    proptest! {
        /// Any mix of case and precomposed/decomposed accents folds to the
        /// same comparison form
        #[test]
        fn prop_normalize_case_insensitive(s in "[a-zA-ZĐđàáạảãâầấậẩẫăằắặẳẵèéẹẻẽêềếệểễìíịỉĩòóọỏõôồốộổỗơờớợởỡùúụủũưừứựửữỳýỵỷỹ ]{0,24}") {
            prop_assert_eq!(
                normalize_answer(&s),
                normalize_answer(&s.to_uppercase())
            );
        }

        #[test]
        fn prop_normalize_is_idempotent(s in ".{0,32}") {
            let once = normalize_answer(&s);
            prop_assert_eq!(normalize_answer(&once), once);
        }
    }
}
