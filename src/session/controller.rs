use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::config::SessionConfig;
use super::state::SessionHandle;
use super::stats::{SessionCounters, SessionStats};
use crate::errors::{SourceError, TransportFailure};
use crate::providers::ProviderSet;
use crate::source::{FragmentSource, PipelineSource, StaticSource, TranscriptSource};
use crate::stream::{ClientRequest, Outgoing, PacingEmitter, PacingPlan, RunOutcome, ServerMessage, Strategy};
use crate::uploads;

/// Drives one connection: receives requests, runs at most one stream at a time,
/// and tears the run down when the client leaves.
///
/// Transport-agnostic: requests arrive on an `mpsc::Receiver` and everything the
/// session sends goes through one ordered `mpsc::Sender<Outgoing>`.
pub struct SessionController {
    config: SessionConfig,
    providers: ProviderSet,
    handle: Arc<SessionHandle>,
    outbound: mpsc::Sender<Outgoing>,
    counters: Arc<SessionCounters>,
    run_task: Option<JoinHandle<()>>,
    probes: Vec<JoinHandle<()>>,
}

impl SessionController {
    pub fn new(config: SessionConfig, providers: ProviderSet, outbound: mpsc::Sender<Outgoing>) -> Self {
        info!("Session accepted: {}", config.session_id);

        let handle = Arc::new(SessionHandle::new(config.session_id.clone()));

        Self {
            config,
            providers,
            handle,
            outbound,
            counters: Arc::new(SessionCounters::new()),
            run_task: None,
            probes: Vec::new(),
        }
    }

    /// Handle shared with the run task; clearing it stops the stream
    pub fn handle(&self) -> Arc<SessionHandle> {
        Arc::clone(&self.handle)
    }

    /// Serve requests until the inbound side closes, then shut down
    pub async fn serve(mut self, mut inbound: mpsc::Receiver<ClientRequest>) -> SessionStats {
        while let Some(request) = inbound.recv().await {
            if let Err(e) = self.handle_request(request).await {
                warn!("[{}] {}, closing session", self.config.session_id, e);
                break;
            }
        }

        self.shutdown().await
    }

    /// Start a run immediately, as if the client had asked for it
    pub async fn autostart(&mut self, strategy: Strategy, delay: Option<f64>) -> Result<(), TransportFailure> {
        self.handle_request(ClientRequest::StartProcessing {
            audio_file: String::new(),
            delay,
            strategy,
        })
        .await
    }

    pub async fn handle_request(&mut self, request: ClientRequest) -> Result<(), TransportFailure> {
        match request {
            ClientRequest::StartProcessing {
                audio_file,
                delay,
                strategy,
            } => self.start(audio_file, delay, strategy).await,
            ClientRequest::StopProcessing => self.stop().await,
            ClientRequest::TestConnection => {
                self.test_connection();
                Ok(())
            }
            ClientRequest::ListAudioFiles => {
                let files = uploads::list_audio_files(&self.config.upload_dir).await;
                self.reply(ServerMessage::AudioFilesList { files }).await
            }
        }
    }

    /// Stop any run, wait for it to exit, and return final stats
    pub async fn shutdown(mut self) -> SessionStats {
        self.handle.disconnect();

        for probe in self.probes.drain(..) {
            probe.abort();
        }

        if let Some(task) = self.run_task.take() {
            if let Err(e) = task.await {
                error!("[{}] Run task panicked: {}", self.config.session_id, e);
            }
        }

        let stats = self.counters.snapshot();
        info!(
            "[{}] Session closed: {} runs, {} fragments, {:.1}s",
            self.config.session_id, stats.runs_started, stats.fragments_sent, stats.duration_secs
        );
        stats
    }

    async fn start(&mut self, audio_file: String, delay: Option<f64>, strategy: Strategy) -> Result<(), TransportFailure> {
        let plan = match self.config.plan_for(strategy, delay) {
            Ok(plan) => plan,
            Err(message) => return self.reply(ServerMessage::error(message)).await,
        };

        if !self.handle.try_begin() {
            warn!("[{}] Start rejected, run already in progress", self.config.session_id);
            return self
                .reply(ServerMessage::warning("Processing already in progress"))
                .await;
        }

        // The previous run has already marked itself idle.
        if let Some(previous) = self.run_task.take() {
            if let Err(e) = previous.await {
                error!("[{}] Previous run task panicked: {}", self.config.session_id, e);
            }
        }

        info!("[{}] Starting {:?} run", self.config.session_id, strategy);

        let job = RunJob {
            config: self.config.clone(),
            providers: self.providers.clone(),
            handle: self.handle(),
            outbound: self.outbound.clone(),
            counters: Arc::clone(&self.counters),
            strategy,
            audio_file,
            plan,
        };
        self.run_task = Some(tokio::spawn(job.run()));

        Ok(())
    }

    async fn stop(&mut self) -> Result<(), TransportFailure> {
        if self.handle.request_stop() {
            info!("[{}] Stop requested", self.config.session_id);
            self.reply(ServerMessage::info("Processing stopped")).await
        } else {
            self.reply(ServerMessage::warning("No processing in progress")).await
        }
    }

    /// Probe the translator without holding up request handling
    fn test_connection(&mut self) {
        let outbound = self.outbound.clone();
        let translator = self.providers.translator.clone();
        let session_id = self.config.session_id.clone();

        self.probes.retain(|probe| !probe.is_finished());
        self.probes.push(tokio::spawn(async move {
            let reply = match translator {
                None => ServerMessage::error("Provider not configured"),
                Some(translator) => match translator.test_connection().await {
                    Ok(text) => ServerMessage::success(format!("API connection OK: {}", text)),
                    Err(e) => {
                        warn!("[{}] Connection test failed: {}", session_id, e);
                        ServerMessage::error(format!("API connection failed ({}): {}", e.kind, e.message))
                    }
                },
            };
            let _ = outbound.send(Outgoing::Event(reply)).await;
        }));
    }

    async fn reply(&self, msg: ServerMessage) -> Result<(), TransportFailure> {
        self.outbound
            .send(Outgoing::Event(msg))
            .await
            .map_err(|_| TransportFailure)
    }
}

/// Everything one run task owns
struct RunJob {
    config: SessionConfig,
    providers: ProviderSet,
    handle: Arc<SessionHandle>,
    outbound: mpsc::Sender<Outgoing>,
    counters: Arc<SessionCounters>,
    strategy: Strategy,
    audio_file: String,
    plan: PacingPlan,
}

impl RunJob {
    async fn run(self) {
        self.counters.run_started();

        let outcome = match self.build_source().await {
            Ok(mut source) => {
                let emitter = PacingEmitter::new(self.outbound.clone(), self.handle(), self.plan);
                emitter.run(source.as_mut()).await
            }
            Err(e) => {
                error!("[{}] Cannot start {:?} run: {}", self.handle.id(), self.strategy, e);
                let message = e.to_string();
                let _ = self
                    .outbound
                    .send(Outgoing::Event(ServerMessage::error(message.clone())))
                    .await;
                RunOutcome::Errored(message)
            }
        };

        info!("[{}] Run finished: {:?}", self.handle.id(), outcome);
        self.counters.record(&outcome);
        self.handle.finish();
    }

    fn handle(&self) -> Arc<SessionHandle> {
        Arc::clone(&self.handle)
    }

    async fn build_source(&self) -> Result<Box<dyn FragmentSource>, SourceError> {
        match self.strategy {
            Strategy::Static => Ok(Box::new(StaticSource::demo())),
            Strategy::Transcript => {
                let source = TranscriptSource::open(&self.config.transcript_path).await?;
                Ok(Box::new(source))
            }
            Strategy::Pipeline => {
                let (transcriber, translator) =
                    match (&self.providers.transcriber, &self.providers.translator) {
                        (Some(t), Some(tr)) => (Arc::clone(t), Arc::clone(tr)),
                        _ => {
                            return Err(SourceError::Configuration(
                                "transcription/translation provider not configured".to_string(),
                            ))
                        }
                    };

                let audio = uploads::resolve(&self.config.upload_dir, &self.audio_file)?;
                self.notify(ServerMessage::info(format!("Transcribing {}...", self.audio_file)))
                    .await;

                let source = PipelineSource::prepare(
                    &audio,
                    self.config.max_transcription_bytes,
                    transcriber.as_ref(),
                    translator,
                    Some(self.config.transcript_path.clone()),
                )
                .await?;

                if let Some(total) = source.total_units() {
                    self.notify(ServerMessage::success(format!(
                        "Transcription complete: {} sentences",
                        total
                    )))
                    .await;
                }
                Ok(Box::new(source))
            }
        }
    }

    /// Best-effort status; a closed queue is picked up by the emitter
    async fn notify(&self, msg: ServerMessage) {
        if self.handle.is_live() {
            let _ = self.outbound.send(Outgoing::Event(msg)).await;
        }
    }
}
