//! Audio port
//!
//! The core never waits on audio; it names an effect and a volume and moves
//! on. Synthesis/playback is the shell's problem.

use crate::sim::RunEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Character leaves the ground
    Jump,
    /// Correct answer
    Success,
    /// Wrong answer, timeout, or collision
    Fail,
    /// Periodic footstep loop while running
    Running,
    /// Result screen for a strong finish
    Win,
    /// Run ended
    GameOver,
}

/// Fire-and-forget playback port
pub trait AudioSink {
    fn play(&self, effect: SoundEffect, volume: f32);
}

/// Sink that drops everything (tests)
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&self, _effect: SoundEffect, _volume: f32) {}
}

/// Sink that logs effect names (headless demo)
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play(&self, effect: SoundEffect, volume: f32) {
        log::debug!("sfx {effect:?} at {volume:.1}");
    }
}

/// Map one tick's events onto the sink. Volumes match the original mix:
/// gameplay cues at 0.7 of the effects volume, the result sting at 0.5.
pub fn play_events(events: &[RunEvent], sink: &dyn AudioSink, sfx_volume: f32) {
    for event in events {
        match event {
            RunEvent::Jumped => {
                sink.play(SoundEffect::Jump, 0.7 * sfx_volume);
                sink.play(SoundEffect::Success, 0.7 * sfx_volume);
            }
            RunEvent::PassedThrough | RunEvent::Collided => {
                sink.play(SoundEffect::Fail, 0.7 * sfx_volume);
            }
            RunEvent::Finished => {
                sink.play(SoundEffect::GameOver, 0.5 * sfx_volume);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Recorder(RefCell<Vec<SoundEffect>>);

    impl AudioSink for Recorder {
        fn play(&self, effect: SoundEffect, _volume: f32) {
            self.0.borrow_mut().push(effect);
        }
    }

    #[test]
    fn test_jump_plays_jump_and_success() {
        let sink = Recorder(RefCell::new(Vec::new()));
        play_events(&[RunEvent::Jumped], &sink, 1.0);
        assert_eq!(*sink.0.borrow(), vec![SoundEffect::Jump, SoundEffect::Success]);
    }

    #[test]
    fn test_pass_through_plays_fail() {
        let sink = Recorder(RefCell::new(Vec::new()));
        play_events(&[RunEvent::PassedThrough], &sink, 1.0);
        assert_eq!(*sink.0.borrow(), vec![SoundEffect::Fail]);
    }

    #[test]
    fn test_verdict_events_are_silent_until_resolution() {
        // The fail cue belongs to the pass-through/collision moment, not
        // the submission itself
        let sink = Recorder(RefCell::new(Vec::new()));
        play_events(
            &[RunEvent::AnswerWrong, RunEvent::QuizTimedOut],
            &sink,
            1.0,
        );
        assert!(sink.0.borrow().is_empty());
    }
}
