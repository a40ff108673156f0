// Integration tests for the pacing emitter
//
// These tests drive the emitter over an in-memory outbound queue and check
// payload order, pacing, checkpoint behaviour and failure handling.

use async_trait::async_trait;
use caption_stream::errors::SourceError;
use caption_stream::providers::ScriptedTranslator;
use caption_stream::session::SessionHandle;
use caption_stream::source::{Fragment, FragmentSource, PipelineSource, StaticSource, TranscriptSource};
use caption_stream::stream::{Outgoing, PacingEmitter, PacingPlan, RunOutcome, ServerMessage, StatusKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

fn live_handle() -> Arc<SessionHandle> {
    let handle = Arc::new(SessionHandle::new("test-session"));
    assert!(handle.try_begin());
    handle
}

fn drain(rx: &mut mpsc::Receiver<Outgoing>) -> Vec<Outgoing> {
    let mut items = Vec::new();
    while let Ok(item) = rx.try_recv() {
        items.push(item);
    }
    items
}

fn texts(items: &[Outgoing]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            Outgoing::Text(text) => Some(text.clone()),
            Outgoing::Event(_) => None,
        })
        .collect()
}

fn has_complete(items: &[Outgoing]) -> bool {
    items.iter().any(|item| {
        matches!(
            item,
            Outgoing::Event(ServerMessage::ProcessingComplete { .. })
        )
    })
}

/// Wraps a source and requests stop while producing fragment number `stop_at`,
/// like a stop arriving during an in-flight provider call.
struct StopDuringPull {
    inner: StaticSource,
    handle: Arc<SessionHandle>,
    stop_at: usize,
    pulled: usize,
}

#[async_trait]
impl FragmentSource for StopDuringPull {
    async fn next_fragment(&mut self) -> Option<Result<Fragment, SourceError>> {
        self.pulled += 1;
        if self.pulled == self.stop_at {
            self.handle.request_stop();
        }
        self.inner.next_fragment().await
    }

    fn name(&self) -> &str {
        "stop-during-pull"
    }
}

/// Yields one caption and then fails
struct FailingSource {
    yielded: bool,
}

#[async_trait]
impl FragmentSource for FailingSource {
    async fn next_fragment(&mut self) -> Option<Result<Fragment, SourceError>> {
        if self.yielded {
            return Some(Err(SourceError::EmptyResult("translation")));
        }
        self.yielded = true;
        Some(Ok(Fragment::Caption("first".to_string())))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

#[tokio::test]
async fn test_transcript_replay_payloads_in_order() {
    let (tx, mut rx) = mpsc::channel(64);
    let emitter = PacingEmitter::new(tx, live_handle(), PacingPlan::immediate());

    let mut source = TranscriptSource::from_text("a b c");
    let outcome = emitter.run(&mut source).await;

    assert_eq!(outcome, RunOutcome::Completed { total: 4 });

    let items = drain(&mut rx);
    assert_eq!(texts(&items), vec!["a", "a b", "a b c", ""]);
    assert!(items.contains(&Outgoing::Event(ServerMessage::ProcessingComplete { total: 4 })));
}

#[tokio::test]
async fn test_pipeline_sentence_updates_then_complete() {
    let (tx, mut rx) = mpsc::channel(64);
    let emitter = PacingEmitter::new(tx, live_handle(), PacingPlan::immediate());

    let sentences = vec!["Om namah shivaya".to_string(), "Jai shri krishna".to_string()];
    let mut source =
        PipelineSource::from_sentences(sentences, Arc::new(ScriptedTranslator::new()), false);

    let outcome = emitter.run(&mut source).await;
    assert_eq!(outcome, RunOutcome::Completed { total: 2 });

    let items = drain(&mut rx);
    let updates: Vec<(usize, usize, f64)> = items
        .iter()
        .filter_map(|item| match item {
            Outgoing::Event(ServerMessage::SentenceUpdate {
                index,
                total,
                progress,
                ..
            }) => Some((*index, *total, *progress)),
            _ => None,
        })
        .collect();
    assert_eq!(updates, vec![(1, 2, 50.0), (2, 2, 100.0)]);

    // Each update is directly preceded by its progress status
    let update_pos = items
        .iter()
        .position(|i| matches!(i, Outgoing::Event(ServerMessage::SentenceUpdate { .. })))
        .unwrap();
    assert_eq!(
        items[update_pos - 1],
        Outgoing::Event(ServerMessage::info("Translating sentence 1/2"))
    );

    let completes: Vec<&Outgoing> = items
        .iter()
        .filter(|i| matches!(i, Outgoing::Event(ServerMessage::ProcessingComplete { .. })))
        .collect();
    assert_eq!(
        completes,
        vec![&Outgoing::Event(ServerMessage::ProcessingComplete { total: 2 })]
    );

    let last_update = items
        .iter()
        .rposition(|i| matches!(i, Outgoing::Event(ServerMessage::SentenceUpdate { .. })))
        .unwrap();
    let complete_pos = items
        .iter()
        .position(|i| matches!(i, Outgoing::Event(ServerMessage::ProcessingComplete { .. })))
        .unwrap();
    assert!(complete_pos > last_update);
}

#[tokio::test]
async fn test_stop_during_pull_suppresses_fragment_and_complete() {
    let (tx, mut rx) = mpsc::channel(64);
    let handle = live_handle();
    let emitter = PacingEmitter::new(tx, Arc::clone(&handle), PacingPlan::immediate());

    let mut source = StopDuringPull {
        inner: StaticSource::new(["one", "two", "three", "four"]),
        handle: Arc::clone(&handle),
        stop_at: 3,
        pulled: 0,
    };

    let outcome = emitter.run(&mut source).await;
    assert_eq!(outcome, RunOutcome::Stopped { sent: 2 });

    let items = drain(&mut rx);
    assert_eq!(texts(&items), vec!["one", "two"]);
    assert!(!has_complete(&items));
}

#[tokio::test]
async fn test_not_live_handle_emits_nothing() {
    let (tx, mut rx) = mpsc::channel(64);
    let handle = live_handle();
    handle.request_stop();

    let emitter = PacingEmitter::new(tx, handle, PacingPlan::immediate());
    let outcome = emitter.run(&mut StaticSource::demo()).await;

    assert_eq!(outcome, RunOutcome::Stopped { sent: 0 });
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_closed_outbound_ends_run_quietly() {
    let (tx, rx) = mpsc::channel(64);
    drop(rx);

    let emitter = PacingEmitter::new(tx, live_handle(), PacingPlan::immediate());
    let outcome = emitter.run(&mut StaticSource::demo()).await;

    assert_eq!(outcome, RunOutcome::Disconnected { sent: 0 });
}

#[tokio::test]
async fn test_source_failure_reports_error_status() {
    let (tx, mut rx) = mpsc::channel(64);
    let emitter = PacingEmitter::new(tx, live_handle(), PacingPlan::immediate());

    let outcome = emitter.run(&mut FailingSource { yielded: false }).await;
    assert!(matches!(outcome, RunOutcome::Errored(ref msg) if msg.contains("empty translation")));

    let items = drain(&mut rx);
    assert_eq!(texts(&items), vec!["first"]);
    assert!(!has_complete(&items));

    let last = items.last().unwrap();
    assert!(matches!(
        last,
        Outgoing::Event(ServerMessage::Status { kind: StatusKind::Error, .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_delay_is_waited_between_emissions_only() {
    let (tx, mut rx) = mpsc::channel(64);
    let plan = PacingPlan::new(Duration::from_secs(1), Duration::ZERO);
    let emitter = PacingEmitter::new(tx, live_handle(), plan);

    let started = Instant::now();
    let outcome = emitter.run(&mut StaticSource::new(["one", "two", "three"])).await;

    assert_eq!(outcome, RunOutcome::Completed { total: 3 });
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(2) && elapsed < Duration::from_millis(2100));
    assert_eq!(texts(&drain(&mut rx)), vec!["one", "two", "three"]);
}

#[tokio::test(start_paused = true)]
async fn test_line_end_uses_unit_delay() {
    let (tx, mut rx) = mpsc::channel(64);
    let plan = PacingPlan::new(Duration::from_millis(800), Duration::from_millis(1500));
    let emitter = PacingEmitter::new(tx, live_handle(), plan);

    // "a", "a b", "", "c", "": 800 + 800 + 1500 + 800 between five payloads
    let started = Instant::now();
    let outcome = emitter.run(&mut TranscriptSource::from_text("a b\nc")).await;

    assert_eq!(outcome, RunOutcome::Completed { total: 5 });
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(3900) && elapsed < Duration::from_millis(4000));
    assert_eq!(texts(&drain(&mut rx)), vec!["a", "a b", "", "c", ""]);
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_pause_prevents_next_emission() {
    let (tx, mut rx) = mpsc::channel(64);
    let handle = live_handle();
    let plan = PacingPlan::new(Duration::from_secs(5), Duration::ZERO);
    let emitter = PacingEmitter::new(tx, Arc::clone(&handle), plan);

    let run = tokio::spawn(async move { emitter.run(&mut StaticSource::demo()).await });

    // First chunk goes out immediately, then the emitter sleeps 5s
    let first = rx.recv().await.unwrap();
    assert_eq!(first, Outgoing::Text("Om namah shivaya".to_string()));

    tokio::time::sleep(Duration::from_secs(2)).await;
    handle.request_stop();

    let outcome = run.await.unwrap();
    assert_eq!(outcome, RunOutcome::Stopped { sent: 1 });
    assert!(drain(&mut rx).is_empty());
}
