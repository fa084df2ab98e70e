//! Play tracking port
//!
//! The backend records one row per finished run. The call is fire-and-forget:
//! failures are logged and swallowed, never retried, and never reach gameplay.

/// Error from the telemetry backend. Only ever logged.
#[derive(Debug)]
pub struct TelemetryError(pub String);

impl std::fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "telemetry error: {}", self.0)
    }
}

impl std::error::Error for TelemetryError {}

/// Backend port for recording a finished run
pub trait PlayTelemetry {
    fn record_play(
        &self,
        game_id: &str,
        user_id: &str,
        score: u32,
        duration_secs: u32,
    ) -> Result<(), TelemetryError>;
}

/// Telemetry sink that only logs. Stands in for the HTTP backend in tests
/// and the headless demo.
pub struct LogTelemetry;

impl PlayTelemetry for LogTelemetry {
    fn record_play(
        &self,
        game_id: &str,
        user_id: &str,
        score: u32,
        duration_secs: u32,
    ) -> Result<(), TelemetryError> {
        log::info!(
            "play recorded: game={game_id} user={user_id} score={score} duration={duration_secs}s"
        );
        Ok(())
    }
}
