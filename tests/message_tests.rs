// Wire-shape tests for socket requests and notifications

use caption_stream::stream::{progress_percent, ClientRequest, ServerMessage, StatusKind, Strategy};
use serde_json::json;

#[test]
fn test_start_request_with_all_fields() {
    let request: ClientRequest = serde_json::from_value(json!({
        "event": "start_processing",
        "data": {"audio_file": "audio_1.mp3", "delay": 0.5, "strategy": "transcript"}
    }))
    .unwrap();

    assert_eq!(
        request,
        ClientRequest::StartProcessing {
            audio_file: "audio_1.mp3".to_string(),
            delay: Some(0.5),
            strategy: Strategy::Transcript,
        }
    );
}

#[test]
fn test_start_request_defaults_to_pipeline() {
    let request: ClientRequest = serde_json::from_value(json!({
        "event": "start_processing",
        "data": {"audio_file": "chant.wav"}
    }))
    .unwrap();

    assert_eq!(
        request,
        ClientRequest::StartProcessing {
            audio_file: "chant.wav".to_string(),
            delay: None,
            strategy: Strategy::Pipeline,
        }
    );
}

#[test]
fn test_requests_without_payload_accept_any_empty_data() {
    let forms = [
        json!({"event": "stop_processing"}),
        json!({"event": "stop_processing", "data": null}),
        json!({"event": "stop_processing", "data": {}}),
    ];
    for form in forms {
        let request: ClientRequest = serde_json::from_value(form).unwrap();
        assert_eq!(request, ClientRequest::StopProcessing);
    }

    let request: ClientRequest =
        serde_json::from_str(r#"{"event":"list_audio_files","data":{}}"#).unwrap();
    assert_eq!(request, ClientRequest::ListAudioFiles);

    let request: ClientRequest = serde_json::from_str(r#"{"event":"test_connection"}"#).unwrap();
    assert_eq!(request, ClientRequest::TestConnection);
}

#[test]
fn test_unknown_event_and_bad_strategy_are_rejected() {
    assert!(serde_json::from_str::<ClientRequest>(r#"{"event":"rewind"}"#).is_err());
    assert!(serde_json::from_str::<ClientRequest>(r#"{"data":{}}"#).is_err());
    assert!(serde_json::from_value::<ClientRequest>(json!({
        "event": "start_processing",
        "data": {"strategy": "karaoke"}
    }))
    .is_err());
}

#[test]
fn test_status_shape() {
    let value = serde_json::to_value(ServerMessage::warning("Processing already in progress")).unwrap();
    assert_eq!(
        value,
        json!({
            "event": "status",
            "data": {"message": "Processing already in progress", "type": "warning"}
        })
    );
}

#[test]
fn test_sentence_update_shape() {
    let value = serde_json::to_value(ServerMessage::SentenceUpdate {
        original: "Om namah shivaya".to_string(),
        translated: "Salutations to Shiva".to_string(),
        index: 1,
        total: 3,
        progress: 33.3,
    })
    .unwrap();

    assert_eq!(
        value,
        json!({
            "event": "sentence_update",
            "data": {
                "original": "Om namah shivaya",
                "translated": "Salutations to Shiva",
                "index": 1,
                "total": 3,
                "progress": 33.3
            }
        })
    );
}

#[test]
fn test_completion_and_listing_shapes() {
    assert_eq!(
        serde_json::to_value(ServerMessage::ProcessingComplete { total: 4 }).unwrap(),
        json!({"event": "processing_complete", "data": {"total": 4}})
    );
    assert_eq!(
        serde_json::to_value(ServerMessage::AudioFilesList {
            files: vec!["a.mp3".to_string()]
        })
        .unwrap(),
        json!({"event": "audio_files_list", "data": {"files": ["a.mp3"]}})
    );
}

#[test]
fn test_status_parses_back() {
    let msg: ServerMessage = serde_json::from_str(
        r#"{"event":"status","data":{"message":"Processing stopped","type":"info"}}"#,
    )
    .unwrap();
    assert_eq!(
        msg,
        ServerMessage::Status {
            message: "Processing stopped".to_string(),
            kind: StatusKind::Info,
        }
    );
}

#[test]
fn test_progress_strictly_increases_on_long_runs() {
    let total = 3000;
    let mut previous = progress_percent(1, total);
    for index in 2..=total {
        let current = progress_percent(index, total);
        assert!(current > previous, "progress stalled at {}/{}", index, total);
        previous = current;
    }
    assert_eq!(progress_percent(total, total), 100.0);
    assert_eq!(progress_percent(1, 2), 50.0);
    assert_eq!(progress_percent(0, 0), 0.0);
}
