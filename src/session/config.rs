use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;
use crate::stream::{PacingPlan, Strategy};

/// Longest pacing delay a client may request
const MAX_DELAY_SECS: f64 = 60.0;

/// Configuration for one streaming session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Unique session identifier, used in logs
    pub session_id: String,

    /// Directory audio files are resolved against
    pub upload_dir: PathBuf,

    /// Transcript written by the pipeline and replayed by the transcript strategy
    pub transcript_path: PathBuf,

    /// Audio above this size is rejected before transcription
    pub max_transcription_bytes: u64,

    /// Default delay between transcript words
    pub word_delay: Duration,

    /// Extra pause after each transcript line
    pub line_delay: Duration,

    /// Default delay between static demo chunks
    pub chunk_delay: Duration,

    /// Default delay between translated sentences
    pub sentence_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: new_session_id(),
            upload_dir: PathBuf::from("uploads"),
            transcript_path: PathBuf::from("transcript.txt"),
            max_transcription_bytes: 25 * 1024 * 1024,
            word_delay: Duration::from_millis(800),
            line_delay: Duration::from_millis(1500),
            chunk_delay: Duration::from_secs(1),
            sentence_delay: Duration::from_secs(3),
        }
    }
}

impl SessionConfig {
    /// Per-session config derived from the process-wide config
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            session_id: new_session_id(),
            upload_dir: cfg.uploads.dir.clone(),
            transcript_path: cfg.stream.transcript_path.clone(),
            max_transcription_bytes: cfg.uploads.max_transcription_bytes,
            word_delay: secs(cfg.stream.word_delay_secs),
            line_delay: secs(cfg.stream.line_delay_secs),
            chunk_delay: secs(cfg.stream.chunk_delay_secs),
            sentence_delay: secs(cfg.stream.sentence_delay_secs),
        }
    }

    /// Same config with every delay zeroed
    pub fn without_pacing(mut self) -> Self {
        self.word_delay = Duration::ZERO;
        self.line_delay = Duration::ZERO;
        self.chunk_delay = Duration::ZERO;
        self.sentence_delay = Duration::ZERO;
        self
    }

    /// Pacing for `strategy`, with `requested` seconds overriding its primary delay
    pub fn plan_for(&self, strategy: Strategy, requested: Option<f64>) -> Result<PacingPlan, String> {
        let requested = match requested {
            Some(d) if !d.is_finite() || d < 0.0 || d > MAX_DELAY_SECS => {
                return Err(format!(
                    "Invalid delay {}: must be between 0 and {} seconds",
                    d, MAX_DELAY_SECS
                ));
            }
            Some(d) => Some(Duration::from_secs_f64(d)),
            None => None,
        };

        Ok(match strategy {
            Strategy::Static => {
                PacingPlan::new(requested.unwrap_or(self.chunk_delay), Duration::ZERO)
            }
            Strategy::Transcript => {
                PacingPlan::new(requested.unwrap_or(self.word_delay), self.line_delay)
            }
            Strategy::Pipeline => {
                PacingPlan::new(Duration::ZERO, requested.unwrap_or(self.sentence_delay))
            }
        })
    }
}

fn new_session_id() -> String {
    format!("session-{}", uuid::Uuid::new_v4())
}

fn secs(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f64(value.min(MAX_DELAY_SECS))
    } else {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_defaults_per_strategy() {
        let config = SessionConfig::default();

        let plan = config.plan_for(Strategy::Transcript, None).unwrap();
        assert_eq!(plan.delay, Duration::from_millis(800));
        assert_eq!(plan.unit_delay, Duration::from_millis(1500));

        let plan = config.plan_for(Strategy::Static, None).unwrap();
        assert_eq!(plan.delay, Duration::from_secs(1));

        let plan = config.plan_for(Strategy::Pipeline, None).unwrap();
        assert_eq!(plan.unit_delay, Duration::from_secs(3));
    }

    #[test]
    fn test_requested_delay_overrides() {
        let config = SessionConfig::default();
        let plan = config.plan_for(Strategy::Pipeline, Some(0.5)).unwrap();
        assert_eq!(plan.unit_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_rejects_bad_delays() {
        let config = SessionConfig::default();
        assert!(config.plan_for(Strategy::Static, Some(-1.0)).is_err());
        assert!(config.plan_for(Strategy::Static, Some(f64::NAN)).is_err());
        assert!(config.plan_for(Strategy::Static, Some(1e9)).is_err());
    }
}
