//! Quiz Runner entry point
//!
//! Headless demo: runs a scripted session at a fixed timestep and logs the
//! event stream. The browser shell drives the same controller through its
//! own frame callback instead.

use quiz_runner::audio::{play_events, LogAudio};
use quiz_runner::consts::FIXED_TIME_STEP_MS;
use quiz_runner::highscores::HighScore;
use quiz_runner::input::{InputEvent, Key};
use quiz_runner::questions::{InMemoryBank, QuestionKind};
use quiz_runner::sim::{overlay, GameMode, RunController, RunEvent, RunPhase};
use quiz_runner::telemetry::LogTelemetry;
use quiz_runner::{AlwaysReady, Settings};

const DEMO_BANK: &str = r#"[
    {
        "question": "Chiến dịch Điện Biên Phủ kết thúc năm nào?",
        "type": "multiple_choice",
        "options": ["1945", "1954", "1968", "1975"],
        "correct": "1954",
        "duration_in_seconds": 10
    },
    {
        "question": "Điền từ còn thiếu: Không có gì quý hơn ___, tự do",
        "type": "text_input",
        "correct": "Độc lập",
        "duration_in_seconds": 15
    },
    {
        "question": "Thủ đô của Việt Nam là thành phố nào?",
        "type": "text_input",
        "correct": "Hà Nội",
        "duration_in_seconds": 5
    }
]"#;

fn parse_mode(arg: Option<&str>) -> GameMode {
    match arg {
        Some("legacy") => GameMode::Legacy,
        Some("ten") | Some("10") => GameMode::TenQuestion,
        _ => GameMode::Endless,
    }
}

/// Scripted player: answers most questions correctly, fumbles every fourth
/// one, and never answers the seventh, to exercise all three outcome paths.
struct DemoBot {
    answered: u32,
}

impl DemoBot {
    fn new() -> Self {
        Self { answered: 0 }
    }

    fn respond(&mut self, rc: &mut RunController, now_ms: f64) -> Vec<RunEvent> {
        let Some(session) = rc.quiz_session() else {
            return Vec::new();
        };
        self.answered += 1;
        if self.answered % 7 == 0 {
            // Sit this one out and let the timeout land
            return Vec::new();
        }
        let fumble = self.answered % 4 == 0;

        let kind = session.question.kind;
        let correct = session.question.correct.clone();
        let option_count = session.question.options.len();
        let correct_index = session
            .question
            .options
            .iter()
            .position(|o| o == &correct)
            .unwrap_or(0);

        let mut events = Vec::new();
        match kind {
            QuestionKind::TextInput => {
                let answer = if fumble { "khong biet" } else { correct.as_str() };
                for c in answer.chars() {
                    events.extend(rc.handle_input(InputEvent::KeyPress(Key::Char(c)), now_ms));
                }
                events.extend(rc.handle_input(InputEvent::KeyPress(Key::Enter), now_ms));
            }
            QuestionKind::MultipleChoice => {
                let index = if fumble {
                    (correct_index + 1) % option_count.max(1)
                } else {
                    correct_index
                };
                let (x, y) = overlay::option_center(index);
                events.extend(rc.handle_input(InputEvent::PointerClick { x, y }, now_ms));
            }
        }
        events
    }
}

fn main() {
    env_logger::init();

    let mode = parse_mode(std::env::args().nth(1).as_deref());
    log::info!("demo run: {mode:?}");

    let bank = InMemoryBank::from_json(DEMO_BANK, 0xdecade).expect("demo bank is valid JSON");
    let settings = Settings::load();
    let audio = LogAudio;

    let mut rc = RunController::new(mode, Box::new(bank), Box::new(HighScore::load()))
        .with_telemetry(Box::new(LogTelemetry), "demo", "local");

    let mut now_ms = 0.0;
    rc.try_start(&AlwaysReady, now_ms);

    let mut bot = DemoBot::new();
    let mut quiz_open = false;

    // Ten minutes of simulated frames is more than any demo run needs
    for _ in 0..36_000u32 {
        now_ms += FIXED_TIME_STEP_MS;
        let events = rc.tick(now_ms);
        play_events(&events, &audio, settings.effective_sfx_volume());

        for event in &events {
            match event {
                RunEvent::QuizStarted => quiz_open = true,
                RunEvent::NewHighScore { score } => log::info!("new high score: {score}"),
                RunEvent::HeartLost { remaining } => log::info!("hearts left: {remaining}"),
                _ => {}
            }
        }

        // Answer as soon as the overlay is up
        if quiz_open && rc.quiz_session().is_some() {
            quiz_open = false;
            let responses = bot.respond(&mut rc, now_ms);
            play_events(&responses, &audio, settings.effective_sfx_volume());
        }

        if rc.phase() == RunPhase::Result {
            break;
        }
    }

    match rc.summary() {
        Some(summary) => {
            log::info!("final score: {}", summary.score);
            if let Some(accuracy) = summary.accuracy_percent() {
                log::info!("accuracy: {accuracy}%");
            }
        }
        None => log::warn!("demo ran out of frames before the run ended"),
    }
}
