//! HTTP client tests against a stub backend.
//!
//! Each test starts an axum server on a random port that records every
//! request it receives and answers from a per-test reply function.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method as HttpMethod, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::{json, Map, Value};

use reasoncare_config::{AuthToken, Configuration, MetricsBackend};
use reasoncare_contracts::{
    capability::{AudioInput, MetricUnit, TranscriptionStatus},
    error::ReasonCareError,
    request::RequestDescriptor,
};
use reasoncare_core::traits::{
    DocumentStore, GenerativeModelInvocation, KnowledgeRetrieval, MetricsSink, PassthroughClient,
    SpeechTranscription,
};
use reasoncare_production::{
    HttpDocumentStore, HttpKnowledgeRetrieval, HttpMetricsSink, HttpModelInvocation, HttpPassthrough,
    HttpSpeechTranscription, HttpTransport, ProductionClients,
};

// ── Stub backend ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    authorization: Option<String>,
    content_type: Option<String>,
    region: Option<String>,
    body: Value,
    raw: Vec<u8>,
}

type ReplyFn = dyn Fn(&Recorded, &[Recorded]) -> (StatusCode, Value) + Send + Sync;

#[derive(Clone)]
struct Stub {
    calls: Arc<Mutex<Vec<Recorded>>>,
    reply: Arc<ReplyFn>,
}

async fn record(
    State(stub): State<Stub>,
    method: HttpMethod,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_text = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let recorded = Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        authorization: header_text(header::AUTHORIZATION.as_str()),
        content_type: header_text(header::CONTENT_TYPE.as_str()),
        region: header_text("x-reasoncare-region"),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
        raw: body.to_vec(),
    };

    let (status, value) = {
        let mut calls = stub.calls.lock().unwrap();
        let reply = (stub.reply)(&recorded, calls.as_slice());
        calls.push(recorded);
        reply
    };

    if value.is_null() {
        status.into_response()
    } else {
        (status, Json(value)).into_response()
    }
}

async fn start_stub<F>(reply: F) -> (String, Arc<Mutex<Vec<Recorded>>>)
where
    F: Fn(&Recorded, &[Recorded]) -> (StatusCode, Value) + Send + Sync + 'static,
{
    let calls = Arc::new(Mutex::new(Vec::new()));
    let stub = Stub {
        calls: Arc::clone(&calls),
        reply: Arc::new(reply),
    };
    let router = Router::new().fallback(record).with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{}", addr), calls)
}

fn transport(token: &str) -> HttpTransport {
    HttpTransport::new(Duration::from_secs(5), AuthToken::new(token)).unwrap()
}

fn recorded(calls: &Arc<Mutex<Vec<Recorded>>>) -> Vec<Recorded> {
    calls.lock().unwrap().clone()
}

/// Production settings pointing both backends at `base`.
fn production_config(base: &str, metrics_backend: MetricsBackend) -> Configuration {
    let mut config = Configuration::default();
    config.base_url = base.to_string();
    config.region = Some("eu-west-1".to_string());
    config.orchestrator_url = Some(base.to_string());
    config.knowledge_base_id = Some("KB-1".to_string());
    config.bucket_ref = Some("media".to_string());
    config.metrics_backend = metrics_backend;
    config
}

// ── Generative model ─────────────────────────────────────────────────────────

#[tokio::test]
async fn model_invocation_sends_messages_request() {
    let (base, calls) = start_stub(|_, _| {
        (
            StatusCode::OK,
            json!({
                "content": [{"type": "text", "text": "Diagnosis: NSTEMI\nConfidence: 82%"}],
                "usage": {"input_tokens": 120, "output_tokens": 40}
            }),
        )
    })
    .await;

    let model = HttpModelInvocation::new(transport("t-1"), &base);
    let output = model.invoke("clinical-model", "Assess this patient").await.unwrap();

    assert_eq!(output.text, "Diagnosis: NSTEMI\nConfidence: 82%");
    assert_eq!(output.usage.input_tokens, 120);
    assert_eq!(output.usage.output_tokens, 40);

    let calls = recorded(&calls);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "POST");
    assert_eq!(calls[0].path, "/model/clinical-model/invoke");
    assert_eq!(calls[0].authorization.as_deref(), Some("Bearer t-1"));
    assert_eq!(calls[0].body["anthropic_version"], "bedrock-2023-05-31");
    assert_eq!(calls[0].body["max_tokens"], 4000);
    assert_eq!(
        calls[0].body["messages"],
        json!([{"role": "user", "content": "Assess this patient"}])
    );
}

#[tokio::test]
async fn model_error_status_is_a_capability_error() {
    let (base, _) = start_stub(|_, _| (StatusCode::TOO_MANY_REQUESTS, json!({"message": "throttled"}))).await;

    let model = HttpModelInvocation::new(transport("t"), &base);
    let err = model.invoke("clinical-model", "p").await.unwrap_err();
    match err {
        ReasonCareError::Capability { capability, reason } => {
            assert_eq!(capability, "generative_model");
            assert!(reason.contains("429"), "{reason}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn model_reply_without_text_is_rejected() {
    let (base, _) = start_stub(|_, _| (StatusCode::OK, json!({"content": []}))).await;

    let model = HttpModelInvocation::new(transport("t"), &base);
    let err = model.invoke("clinical-model", "p").await.unwrap_err();
    assert!(matches!(err, ReasonCareError::Capability { .. }));
}

// ── Knowledge retrieval ──────────────────────────────────────────────────────

#[tokio::test]
async fn knowledge_query_flattens_results_and_sources() {
    let (base, calls) = start_stub(|_, _| {
        (
            StatusCode::OK,
            json!({
                "results": [{"content": "Serial troponin at 0 and 3h"}, "Aspirin on arrival"],
                "sources": [{"location": "s3://kb/acc-2023.pdf"}, {"name": "ESC 2020"}]
            }),
        )
    })
    .await;

    let knowledge = HttpKnowledgeRetrieval::new(transport("t"), &base, "kb-123");
    let found = knowledge.query("troponin timing").await.unwrap();

    assert_eq!(found.results, vec!["Serial troponin at 0 and 3h", "Aspirin on arrival"]);
    assert_eq!(found.sources, vec!["s3://kb/acc-2023.pdf", "ESC 2020"]);

    let calls = recorded(&calls);
    assert_eq!(calls[0].path, "/knowledge-base/query");
    assert_eq!(
        calls[0].body,
        json!({"query": "troponin timing", "knowledge_base_id": "kb-123", "max_results": 10})
    );
}

// ── Speech transcription ─────────────────────────────────────────────────────

#[tokio::test]
async fn transcription_submit_for_media_uri_creates_job() {
    let (base, calls) = start_stub(|_, _| {
        (
            StatusCode::OK,
            json!({"TranscriptionJob": {"TranscriptionJobStatus": "IN_PROGRESS"}}),
        )
    })
    .await;

    let transcription = HttpSpeechTranscription::new(transport("t"), &base, "rc-media");
    let job = transcription
        .submit(AudioInput::Uri("s3://rc-media/intake/visit.wav".into()))
        .await
        .unwrap();

    assert!(job.job_id.starts_with("reasoncare-"));
    assert_eq!(job.status, TranscriptionStatus::InProgress);

    let calls = recorded(&calls);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, "/transcribe/jobs");
    let body = &calls[0].body;
    assert_eq!(body["TranscriptionJobName"], job.job_id.as_str());
    assert_eq!(body["LanguageCode"], "en-US");
    assert_eq!(body["MediaFormat"], "wav");
    assert_eq!(body["Media"]["MediaFileUri"], "s3://rc-media/intake/visit.wav");
    assert_eq!(body["Settings"]["VocabularyName"], "medical-vocabulary");
    assert_eq!(body["Settings"]["MaxSpeakerLabels"], 2);
}

#[tokio::test]
async fn transcription_submit_uploads_inline_audio_first() {
    let (base, calls) = start_stub(|_, _| (StatusCode::OK, Value::Null)).await;

    let transcription = HttpSpeechTranscription::new(transport("t"), &base, "rc-media");
    let job = transcription
        .submit(AudioInput::Inline(b"RIFF....WAVE".to_vec()))
        .await
        .unwrap();
    assert_eq!(job.status, TranscriptionStatus::Queued);

    let calls = recorded(&calls);
    assert_eq!(calls.len(), 2);

    let upload = &calls[0];
    assert_eq!(upload.method, "PUT");
    assert!(upload.path.starts_with("/media/rc-media/voice-input/"));
    assert!(upload.path.ends_with(".wav"));
    assert_eq!(upload.content_type.as_deref(), Some("audio/wav"));
    assert_eq!(upload.raw, b"RIFF....WAVE");

    let object = upload.path.trim_start_matches("/media/rc-media/");
    assert_eq!(
        calls[1].body["Media"]["MediaFileUri"],
        format!("s3://rc-media/{object}")
    );
}

#[tokio::test]
async fn transcription_upload_failure_stops_submission() {
    let (base, calls) = start_stub(|_, _| (StatusCode::FORBIDDEN, Value::Null)).await;

    let transcription = HttpSpeechTranscription::new(transport("t"), &base, "rc-media");
    let err = transcription
        .submit(AudioInput::Inline(vec![1, 2, 3]))
        .await
        .unwrap_err();

    assert!(matches!(err, ReasonCareError::Capability { ref capability, .. } if capability == "speech_transcription"));
    assert_eq!(recorded(&calls).len(), 1);
}

#[tokio::test]
async fn transcription_poll_reports_transcript_location() {
    let (base, calls) = start_stub(|_, _| {
        (
            StatusCode::OK,
            json!({
                "TranscriptionJob": {
                    "TranscriptionJobStatus": "COMPLETED",
                    "Transcript": {"TranscriptFileUri": "s3://rc-media/out/job-7.json"}
                }
            }),
        )
    })
    .await;

    let transcription = HttpSpeechTranscription::new(transport("t"), &base, "rc-media");
    let result = transcription.poll("job-7").await.unwrap();

    assert_eq!(result.status, TranscriptionStatus::Completed);
    assert_eq!(result.transcript_ref.as_deref(), Some("s3://rc-media/out/job-7.json"));
    assert_eq!(recorded(&calls)[0].path, "/transcribe/jobs/job-7");
}

#[tokio::test]
async fn transcription_poll_of_missing_job_fails() {
    let (base, _) = start_stub(|_, _| (StatusCode::NOT_FOUND, json!({"message": "no such job"}))).await;

    let transcription = HttpSpeechTranscription::new(transport("t"), &base, "rc-media");
    let err = transcription.poll("missing").await.unwrap_err();
    assert!(err.to_string().contains("404"), "{err}");
}

// ── Document store ───────────────────────────────────────────────────────────

#[tokio::test]
async fn document_store_merges_over_remote_record() {
    let (base, calls) = start_stub(|req, _| match req.method.as_str() {
        "GET" => (
            StatusCode::OK,
            json!({"success": true, "data": {"name": "Sarah Johnson", "age": 58}}),
        ),
        _ => (StatusCode::OK, json!({"success": true})),
    })
    .await;

    let store = HttpDocumentStore::new(transport("t"), &base);
    let mut partial = Map::new();
    partial.insert("age".into(), json!(59));
    partial.insert("allergies".into(), json!(["penicillin"]));

    let merged = store.merge_put("P001", partial).await.unwrap();
    assert_eq!(
        merged,
        json!({"name": "Sarah Johnson", "age": 59, "allergies": ["penicillin"]})
    );

    let calls = recorded(&calls);
    assert_eq!(calls.len(), 2);
    assert_eq!((calls[0].method.as_str(), calls[0].path.as_str()), ("GET", "/api/ehr/P001"));
    assert_eq!((calls[1].method.as_str(), calls[1].path.as_str()), ("PUT", "/api/ehr/P001"));
    assert_eq!(calls[1].body, merged);
}

#[tokio::test]
async fn document_store_treats_404_as_absent() {
    let (base, calls) = start_stub(|req, _| match req.method.as_str() {
        "GET" => (StatusCode::NOT_FOUND, Value::Null),
        _ => (StatusCode::CREATED, Value::Null),
    })
    .await;

    let store = HttpDocumentStore::new(transport("t"), &base);
    assert_eq!(store.get("P404").await.unwrap(), None);

    let mut partial = Map::new();
    partial.insert("diagnosis".into(), json!("NSTEMI"));
    let merged = store.merge_put("P404", partial).await.unwrap();
    assert_eq!(merged, json!({"diagnosis": "NSTEMI"}));
    assert_eq!(recorded(&calls).len(), 3);
}

#[tokio::test]
async fn document_store_rejects_bad_ids_without_a_request() {
    let (base, calls) = start_stub(|_, _| (StatusCode::OK, Value::Null)).await;

    let store = HttpDocumentStore::new(transport("t"), &base);
    assert!(matches!(
        store.get("../etc").await,
        Err(ReasonCareError::Validation { .. })
    ));
    assert!(recorded(&calls).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_remote_merges_on_one_patient_do_not_lose_updates() {
    // The stub holds a single record; GET returns it and PUT replaces it.
    let record = Arc::new(Mutex::new(json!({})));
    let stored = Arc::clone(&record);
    let (base, _) = start_stub(move |req, _| match req.method.as_str() {
        "GET" => (StatusCode::OK, stored.lock().unwrap().clone()),
        _ => {
            *stored.lock().unwrap() = req.body.clone();
            (StatusCode::OK, Value::Null)
        }
    })
    .await;

    let store = Arc::new(HttpDocumentStore::new(transport("t"), &base));
    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let mut partial = Map::new();
                partial.insert(format!("field_{i}"), json!(i));
                store.merge_put("P-shared", partial).await.unwrap();
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    let fields = record.lock().unwrap().as_object().unwrap().len();
    assert_eq!(fields, 8);
}

// ── Passthrough ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn passthrough_forwards_method_path_and_body() {
    let (base, calls) = start_stub(|_, _| (StatusCode::OK, json!({"approved": true}))).await;

    let passthrough = HttpPassthrough::new(transport("t"), &base);
    let envelope = passthrough
        .forward(&RequestDescriptor::post(
            "/api/diagnosis/approve",
            json!({"diagnosisId": "D-9"}),
        ))
        .await
        .unwrap();

    assert!(envelope.success);
    assert_eq!(envelope.data, Some(json!({"approved": true})));

    let calls = recorded(&calls);
    assert_eq!(calls[0].method, "POST");
    assert_eq!(calls[0].path, "/api/diagnosis/approve");
    assert_eq!(calls[0].body, json!({"diagnosisId": "D-9"}));
}

#[tokio::test]
async fn passthrough_returns_upstream_envelope_unchanged() {
    let (base, _) = start_stub(|_, _| {
        (
            StatusCode::OK,
            json!({"success": true, "data": {"id": 1}, "message": "Reviewed"}),
        )
    })
    .await;

    let passthrough = HttpPassthrough::new(transport("t"), &base);
    let envelope = passthrough
        .forward(&RequestDescriptor::get("/api/reviews/1"))
        .await
        .unwrap();
    assert_eq!(envelope.message.as_deref(), Some("Reviewed"));
    assert_eq!(envelope.data, Some(json!({"id": 1})));
}

#[tokio::test]
async fn passthrough_non_success_status_is_transport_error() {
    let (base, _) = start_stub(|_, _| (StatusCode::BAD_GATEWAY, Value::Null)).await;

    let passthrough = HttpPassthrough::new(transport("t"), &base);
    let err = passthrough
        .forward(&RequestDescriptor::get("/api/anything"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ReasonCareError::Transport {
            reason: "API Error: 502 Bad Gateway".into()
        }
    );
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    // Bind and drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let passthrough = HttpPassthrough::new(transport("t"), format!("http://{addr}"));
    let err = passthrough
        .forward(&RequestDescriptor::get("/api/anything"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReasonCareError::Transport { .. }));
}

// ── Metrics ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn metrics_are_posted_in_namespace() {
    let (base, calls) = start_stub(|_, _| (StatusCode::OK, Value::Null)).await;

    let sink = HttpMetricsSink::new(transport("t"), &base);
    sink.emit("DiagnosisConfidence", 87.0, MetricUnit::Percent).await;

    let calls = recorded(&calls);
    assert_eq!(calls[0].path, "/metrics");
    assert_eq!(calls[0].body["Namespace"], "ReasonCare");
    let datum = &calls[0].body["MetricData"][0];
    assert_eq!(datum["MetricName"], "DiagnosisConfidence");
    assert_eq!(datum["Value"], 87.0);
    assert_eq!(datum["Unit"], "Percent");
    assert!(datum["Timestamp"].is_string());
}

#[tokio::test]
async fn metrics_failures_are_swallowed() {
    let (base, calls) = start_stub(|_, _| (StatusCode::INTERNAL_SERVER_ERROR, Value::Null)).await;

    let sink = HttpMetricsSink::new(transport("t"), &base);
    // Completes without panicking or returning anything.
    sink.emit("Agent.cardiologist_agent.Invocations", 1.0, MetricUnit::Count).await;
    assert_eq!(recorded(&calls).len(), 1);
}

#[tokio::test]
async fn log_metrics_backend_sends_nothing() {
    let (base, calls) = start_stub(|_, _| (StatusCode::OK, Value::Null)).await;

    let clients = ProductionClients::from_config(&production_config(&base, MetricsBackend::Log)).unwrap();
    clients.metrics.emit("DiagnosisConfidence", 87.0, MetricUnit::Percent).await;
    assert!(recorded(&calls).is_empty());
}

#[tokio::test]
async fn http_metrics_backend_posts_to_orchestrator() {
    let (base, calls) = start_stub(|_, _| (StatusCode::OK, Value::Null)).await;

    let clients = ProductionClients::from_config(&production_config(&base, MetricsBackend::Http)).unwrap();
    clients.metrics.emit("DiagnosisConfidence", 87.0, MetricUnit::Percent).await;

    let calls = recorded(&calls);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "POST");
    assert_eq!(calls[0].path, "/metrics");
}

// ── Region ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn regional_transport_tags_requests() {
    let (base, calls) = start_stub(|_, _| {
        (StatusCode::OK, json!({"content": [{"type": "text", "text": "ok"}]}))
    })
    .await;

    let model = HttpModelInvocation::new(transport("t").with_region("ap-south-1"), &base);
    model.invoke("clinical-model", "Assess").await.unwrap();
    HttpModelInvocation::new(transport("t"), &base)
        .invoke("clinical-model", "Assess")
        .await
        .unwrap();

    let regions: Vec<Option<String>> = recorded(&calls).into_iter().map(|c| c.region).collect();
    assert_eq!(regions, vec![Some("ap-south-1".to_string()), None]);
}

#[tokio::test]
async fn configured_region_reaches_orchestrator_but_not_passthrough() {
    let (base, calls) = start_stub(|_, _| {
        (StatusCode::OK, json!({"content": [{"type": "text", "text": "ok"}]}))
    })
    .await;

    let clients = ProductionClients::from_config(&production_config(&base, MetricsBackend::Http)).unwrap();
    clients.models.invoke("clinical-model", "Assess").await.unwrap();
    clients.passthrough.forward(&RequestDescriptor::get("/api/guidelines")).await.unwrap();

    let calls = recorded(&calls);
    assert_eq!(calls[0].region.as_deref(), Some("eu-west-1"));
    assert_eq!(calls[1].path, "/api/guidelines");
    assert_eq!(calls[1].region, None);
}

// ── Auth token ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn rotated_token_is_used_on_the_next_request() {
    let (base, calls) = start_stub(|_, _| (StatusCode::OK, json!({}))).await;

    let transport = transport("first");
    let passthrough = HttpPassthrough::new(transport.clone(), &base);

    passthrough.forward(&RequestDescriptor::get("/api/a")).await.unwrap();
    transport.auth().rotate("second");
    passthrough.forward(&RequestDescriptor::get("/api/b")).await.unwrap();

    let seen: Vec<Option<String>> = recorded(&calls).into_iter().map(|c| c.authorization).collect();
    assert_eq!(
        seen,
        vec![Some("Bearer first".to_string()), Some("Bearer second".to_string())]
    );
}

#[tokio::test]
async fn empty_token_sends_no_authorization_header() {
    let (base, calls) = start_stub(|_, _| (StatusCode::OK, json!({}))).await;

    let passthrough = HttpPassthrough::new(transport(""), &base);
    passthrough.forward(&RequestDescriptor::get("/api/a")).await.unwrap();
    assert_eq!(recorded(&calls)[0].authorization, None);
}
