//! Session scenarios driven against the mock backend
use genga::backends::BackendCall;
use genga::*;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Notify;

fn png() -> EncodedImage {
    EncodedImage::parse("data:image/png;base64,iVBORw0KGgo=").unwrap()
}

fn services(backend: &Arc<MockBackend>) -> StudioServices {
    StudioServices::new(backend.clone(), "English")
}

#[tokio::test]
async fn test_text_sequence_scenario() {
    let backend = Arc::new(MockBackend::new().with_generated_images(None));
    let services = services(&backend);

    let mut session = Session::new();
    session.set_description("dragon fight");
    session.set_style("cinematic action".parse().unwrap());
    session.set_frame_count(3).unwrap();

    session.generate(&services).await.unwrap();

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(&calls[0], BackendCall::Generate { count: 3, .. }));

    let view = StudioView::from_session(&session);
    match view.output {
        OutputPanel::Results(tiles) => {
            assert_eq!(tiles.len(), 3);
            assert_eq!(
                tiles.iter().map(|t| t.number).collect::<Vec<_>>(),
                vec![1, 2, 3]
            );
        }
        other => panic!("expected results, got {:?}", other),
    }
    assert_eq!(session.status(), RequestStatus::Idle);
}

#[tokio::test]
async fn test_suggestion_chip_scenario() {
    let backend = Arc::new(MockBackend::new().with_analysis(r#"{"suggestions": ["raises sword"]}"#));
    let services = services(&backend);

    let mut session = Session::new();
    session.upload_and_analyze(&services, png()).await.unwrap();

    assert_eq!(backend.call_count(), 1);
    let view = StudioView::from_session(&session);
    assert_eq!(view.suggestions, vec!["raises sword"]);

    session.select_suggestion(0).unwrap();
    assert_eq!(session.request().description, "raises sword");
}

#[tokio::test]
async fn test_edit_without_images_scenario() {
    let backend = Arc::new(MockBackend::new());
    let services = services(&backend);

    let mut session = Session::new();
    session.set_frame_count(4).unwrap();
    session.upload_and_analyze(&services, png()).await.unwrap();
    session.set_description("step back");

    session.generate(&services).await.unwrap();

    let calls = backend.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(&calls[1], BackendCall::Edit { instruction, .. } if instruction.contains("step back")));
    assert!(!calls
        .iter()
        .any(|call| matches!(call, BackendCall::Generate { .. })));

    assert_eq!(session.status(), RequestStatus::Idle);
    assert_eq!(session.last_error(), Some(&SessionError::EditProducedNoImage));
    assert_eq!(
        StudioView::from_session(&session).output,
        OutputPanel::Error(
            "The AI could not modify the image. Try a different description.".to_string()
        )
    );
}

#[tokio::test]
async fn test_empty_description_makes_no_call() {
    let backend = Arc::new(MockBackend::new());
    let services = services(&backend);

    let mut session = Session::new();
    let err = session.generate(&services).await.unwrap_err();

    assert_eq!(err, SessionError::EmptyDescription);
    assert_eq!(backend.call_count(), 0);
    assert_eq!(session.status(), RequestStatus::Idle);
    assert_eq!(
        StudioView::from_session(&session).output,
        OutputPanel::Error(SessionError::EmptyDescription.to_string())
    );
}

#[tokio::test]
async fn test_analysis_failure_does_not_block_generation() {
    let backend = Arc::new(MockBackend::new().with_analysis("definitely not json"));
    let services = services(&backend);

    let mut session = Session::new();
    session.upload_and_analyze(&services, png()).await.unwrap();
    assert_eq!(session.last_error(), Some(&SessionError::AnalysisFailed));
    assert_eq!(session.status(), RequestStatus::Idle);

    session.set_description("turns around");
    session.generate(&services).await.unwrap();
    // Generation start clears the analysis message; the empty edit sets its own
    assert_eq!(session.last_error(), Some(&SessionError::EditProducedNoImage));
}

#[tokio::test]
async fn test_empty_sequence_scenario() {
    let backend = Arc::new(MockBackend::new());
    let services = services(&backend);

    let mut session = Session::new();
    session.set_description("dragon fight");
    session.generate(&services).await.unwrap();

    assert_eq!(backend.call_count(), 1);
    assert_eq!(session.status(), RequestStatus::Idle);
    assert_eq!(session.last_error(), Some(&SessionError::NoImagesGenerated));
    assert!(session.frames().is_empty());
    assert_eq!(
        StudioView::from_session(&session).output,
        OutputPanel::Error(
            "The AI could not generate images. Please try again with a different request."
                .to_string()
        )
    );
}

#[tokio::test]
async fn test_transport_failure_resets_status() {
    let backend = Arc::new(MockBackend::new().with_failure("connection refused"));
    let services = services(&backend);

    let mut session = Session::new();
    session.set_description("dragon fight");
    session.generate(&services).await.unwrap();

    assert_eq!(session.status(), RequestStatus::Idle);
    assert_eq!(session.last_error(), Some(&SessionError::Connection));
}

#[tokio::test]
async fn test_remove_and_reupload_reanalyzes() {
    let backend = Arc::new(MockBackend::new().with_analysis(r#"{"suggestions": ["spins"]}"#));
    let services = services(&backend);

    let mut session = Session::new();
    session.upload_and_analyze(&services, png()).await.unwrap();
    assert_eq!(session.suggestions(), ["spins".to_string()]);

    session.remove_image();
    assert!(session.request().reference_image.is_none());
    assert!(session.suggestions().is_empty());

    session.upload_and_analyze(&services, png()).await.unwrap();
    assert_eq!(backend.call_count(), 2);
    assert_eq!(session.suggestions(), ["spins".to_string()]);
}

#[tokio::test]
async fn test_preset_is_idempotent() {
    let mut session = Session::new();
    session.apply_preset(2).unwrap();
    let first = session.request().clone();
    session.apply_preset(2).unwrap();
    assert_eq!(session.request(), &first);
}

#[tokio::test]
async fn test_status_while_call_in_flight() {
    let gate = Arc::new(Notify::new());
    let backend = Arc::new(
        MockBackend::new()
            .with_analysis(r#"{"suggestions": ["leaps"]}"#)
            .with_gate(gate.clone()),
    );
    let services = Arc::new(services(&backend));
    let session = Arc::new(Mutex::new(Session::new()));

    let job = session.lock().upload_image(png()).unwrap();
    let task = {
        let session = session.clone();
        let services = services.clone();
        tokio::spawn(async move {
            let outcome = services.suggestions.suggest(&job.image).await;
            session.lock().finish_analysis(outcome);
        })
    };

    // Call is held by the gate
    tokio::task::yield_now().await;
    assert_eq!(session.lock().status(), RequestStatus::Analyzing);
    session.lock().set_description("jump");
    assert_eq!(session.lock().begin_generation(), Err(SessionError::Busy));

    gate.notify_one();
    task.await.unwrap();

    let session = session.lock();
    assert_eq!(session.status(), RequestStatus::Idle);
    assert_eq!(session.suggestions(), ["leaps".to_string()]);
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn test_second_generate_while_generating() {
    let gate = Arc::new(Notify::new());
    let backend = Arc::new(
        MockBackend::new()
            .with_generated_images(None)
            .with_gate(gate.clone()),
    );
    let services = Arc::new(services(&backend));
    let session = Arc::new(Mutex::new(Session::new()));
    session.lock().set_description("dragon fight");

    let job = session.lock().begin_generation().unwrap();
    let task = {
        let session = session.clone();
        let services = services.clone();
        tokio::spawn(async move {
            let outcome = services.generation.generate(&job).await;
            session.lock().finish_generation(outcome);
        })
    };

    tokio::task::yield_now().await;
    assert_eq!(session.lock().begin_generation(), Err(SessionError::Busy));
    assert_eq!(session.lock().status(), RequestStatus::Generating);

    gate.notify_one();
    task.await.unwrap();

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(&calls[0], BackendCall::Generate { count: 3, .. }));

    let session = session.lock();
    assert_eq!(session.status(), RequestStatus::Idle);
    assert_eq!(session.frames().len(), 3);
}
