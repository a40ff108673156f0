use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::messages::{progress_percent, Outgoing, ServerMessage};
use crate::errors::TransportFailure;
use crate::session::SessionHandle;
use crate::source::{Fragment, FragmentSource};

/// Delays inserted between emissions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacingPlan {
    /// After each caption fragment
    pub delay: Duration,
    /// After each line end or sentence
    pub unit_delay: Duration,
}

impl PacingPlan {
    pub fn new(delay: Duration, unit_delay: Duration) -> Self {
        Self { delay, unit_delay }
    }

    /// No pacing at all
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Pause to take after `fragment` has been sent
    pub fn after(&self, fragment: &Fragment) -> Duration {
        if fragment.ends_unit() {
            self.unit_delay
        } else {
            self.delay
        }
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Every fragment was sent; `total` fragments in all
    Completed { total: usize },
    /// Stop request or disconnect observed at a checkpoint
    Stopped { sent: usize },
    /// The source failed; the message was reported to the client
    Errored(String),
    /// The outbound queue closed mid-run
    Disconnected { sent: usize },
}

/// Streams fragments in order over a session's outbound queue
pub struct PacingEmitter {
    outbound: mpsc::Sender<Outgoing>,
    handle: Arc<SessionHandle>,
    plan: PacingPlan,
}

impl PacingEmitter {
    pub fn new(outbound: mpsc::Sender<Outgoing>, handle: Arc<SessionHandle>, plan: PacingPlan) -> Self {
        Self {
            outbound,
            handle,
            plan,
        }
    }

    /// Drain `source`, pausing between fragments.
    ///
    /// Each fragment is pulled before the previous fragment's pause is waited
    /// out, so no pause follows the last one. The session handle is checked before each fragment
    /// is pulled and again before it is sent; once it reads not-live nothing
    /// further is emitted.
    pub async fn run(&self, source: &mut dyn FragmentSource) -> RunOutcome {
        info!(
            "[{}] Streaming from {} source ({} units)",
            self.handle.id(),
            source.name(),
            source
                .total_units()
                .map_or_else(|| "?".to_string(), |n| n.to_string())
        );

        let mut sent = 0;
        let mut pause = Duration::ZERO;

        loop {
            if !self.handle.is_live() {
                info!("[{}] Stopped after {} fragments", self.handle.id(), sent);
                return RunOutcome::Stopped { sent };
            }

            let fragment = match source.next_fragment().await {
                None => break,
                Some(Ok(fragment)) => fragment,
                Some(Err(e)) => {
                    error!("[{}] Fragment source failed: {}", self.handle.id(), e);
                    let message = e.to_string();
                    if self.send(ServerMessage::error(message.clone())).await.is_err() {
                        return RunOutcome::Disconnected { sent };
                    }
                    return RunOutcome::Errored(message);
                }
            };

            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }

            if !self.handle.is_live() {
                info!("[{}] Stopped after {} fragments", self.handle.id(), sent);
                return RunOutcome::Stopped { sent };
            }

            if let Err(e) = self.emit(&fragment).await {
                warn!("[{}] {} after {} fragments", self.handle.id(), e, sent);
                return RunOutcome::Disconnected { sent };
            }

            sent += 1;
            pause = self.plan.after(&fragment);
        }

        if !self.handle.is_live() {
            return RunOutcome::Stopped { sent };
        }

        let finished = async {
            self.send(ServerMessage::ProcessingComplete { total: sent }).await?;
            self.send(ServerMessage::success(format!(
                "Processing complete: {} fragments",
                sent
            )))
            .await
        };

        match finished.await {
            Ok(()) => {
                info!("[{}] Completed, {} fragments", self.handle.id(), sent);
                RunOutcome::Completed { total: sent }
            }
            Err(_) => RunOutcome::Disconnected { sent },
        }
    }

    async fn emit(&self, fragment: &Fragment) -> Result<(), TransportFailure> {
        match fragment {
            Fragment::Caption(text) => self.push(Outgoing::Text(text.clone())).await,
            Fragment::LineEnd => self.push(Outgoing::Text(String::new())).await,
            Fragment::Sentence(pair) => {
                debug!(
                    "[{}] Sentence {}/{}: {}",
                    self.handle.id(),
                    pair.index,
                    pair.total,
                    pair.original
                );
                self.send(ServerMessage::info(format!(
                    "Translating sentence {}/{}",
                    pair.index, pair.total
                )))
                .await?;
                self.send(ServerMessage::SentenceUpdate {
                    original: pair.original.clone(),
                    translated: pair.translated.clone(),
                    index: pair.index,
                    total: pair.total,
                    progress: progress_percent(pair.index, pair.total),
                })
                .await
            }
        }
    }

    async fn send(&self, msg: ServerMessage) -> Result<(), TransportFailure> {
        self.push(Outgoing::Event(msg)).await
    }

    async fn push(&self, item: Outgoing) -> Result<(), TransportFailure> {
        self.outbound.send(item).await.map_err(|_| TransportFailure)
    }
}
