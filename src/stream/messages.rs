use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fragment strategies a client can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Transcribe audio, split into sentences, translate each
    #[default]
    Pipeline,
    /// Replay a cached transcript word by word
    Transcript,
    /// Canned demo chunks
    Static,
}

/// Requests sent by the browser over the JSON socket.
///
/// Framed as `{"event": "start_processing", "data": {...}}`. For requests
/// without a payload `data` may be omitted, `null` or `{}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientRequest {
    StartProcessing {
        audio_file: String,
        /// Seconds between fragments; strategy default when absent
        delay: Option<f64>,
        strategy: Strategy,
    },
    StopProcessing,
    TestConnection,
    ListAudioFiles,
}

#[derive(Deserialize)]
struct RawRequest {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize)]
struct StartParams {
    #[serde(default)]
    audio_file: String,
    #[serde(default)]
    delay: Option<f64>,
    #[serde(default)]
    strategy: Strategy,
}

impl<'de> Deserialize<'de> for ClientRequest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawRequest::deserialize(deserializer)?;

        match raw.event.as_str() {
            "start_processing" => {
                let data = match raw.data {
                    Value::Null => Value::Object(Default::default()),
                    data => data,
                };
                let params: StartParams = serde_json::from_value(data).map_err(de::Error::custom)?;
                Ok(Self::StartProcessing {
                    audio_file: params.audio_file,
                    delay: params.delay,
                    strategy: params.strategy,
                })
            }
            "stop_processing" => Ok(Self::StopProcessing),
            "test_connection" => Ok(Self::TestConnection),
            "list_audio_files" => Ok(Self::ListAudioFiles),
            other => Err(de::Error::custom(format!("unknown event '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

/// Notifications sent to the browser, framed like requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    Status {
        message: String,
        #[serde(rename = "type")]
        kind: StatusKind,
    },
    SentenceUpdate {
        original: String,
        translated: String,
        index: usize,
        total: usize,
        progress: f64,
    },
    ProcessingComplete {
        total: usize,
    },
    AudioFilesList {
        files: Vec<String>,
    },
}

impl ServerMessage {
    pub fn status(kind: StatusKind, message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
            kind,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::status(StatusKind::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::status(StatusKind::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::status(StatusKind::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::status(StatusKind::Error, message)
    }
}

/// One item on a session's outbound queue
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    /// Raw caption payload, sent with no envelope. Empty means "clear line".
    Text(String),
    /// JSON envelope notification
    Event(ServerMessage),
}

impl From<ServerMessage> for Outgoing {
    fn from(msg: ServerMessage) -> Self {
        Self::Event(msg)
    }
}

/// Percentage of `index` out of `total`, unrounded so it grows with every index.
pub fn progress_percent(index: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    index as f64 / total as f64 * 100.0
}
