//! Speech transcription through the orchestrator's transcribe endpoints.
//!
//! Inline audio is first uploaded to `<bucket>/voice-input/<uuid>.wav`;
//! the job then points at that media location. Jobs are asynchronous:
//! `submit` returns a handle and `poll` reports progress.

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use reasoncare_contracts::{
    capability::{AudioInput, TranscriptionJob, TranscriptionResult, TranscriptionStatus},
    error::{ReasonCareError, ReasonCareResult},
};
use reasoncare_core::traits::SpeechTranscription;

use crate::http::{join_url, HttpTransport, OutboundBody};

const CAPABILITY: &str = "speech_transcription";

pub const LANGUAGE_CODE: &str = "en-US";
pub const MEDIA_FORMAT: &str = "wav";
pub const VOCABULARY_NAME: &str = "medical-vocabulary";
pub const MAX_SPEAKER_LABELS: u8 = 2;

pub struct HttpSpeechTranscription {
    transport: HttpTransport,
    orchestrator_url: String,
    bucket_ref: String,
}

impl HttpSpeechTranscription {
    pub fn new(
        transport: HttpTransport,
        orchestrator_url: impl Into<String>,
        bucket_ref: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            orchestrator_url: orchestrator_url.into(),
            bucket_ref: bucket_ref.into(),
        }
    }

    /// Resolve the media location for `audio`, uploading inline bytes.
    async fn media_uri(&self, audio: AudioInput, key: Uuid) -> ReasonCareResult<String> {
        match audio {
            AudioInput::Uri(uri) => Ok(uri),
            AudioInput::Inline(bytes) => {
                let object = format!("voice-input/{key}.{MEDIA_FORMAT}");
                let url = join_url(
                    &self.orchestrator_url,
                    &format!("media/{}/{object}", self.bucket_ref),
                );
                let reply = self
                    .transport
                    .send(
                        Method::PUT,
                        &url,
                        Some(OutboundBody::Raw {
                            bytes,
                            content_type: "audio/wav",
                        }),
                    )
                    .await?;
                if !reply.is_success() {
                    return Err(reply.status_error());
                }
                Ok(format!("s3://{}/{object}", self.bucket_ref))
            }
        }
    }
}

#[async_trait]
impl SpeechTranscription for HttpSpeechTranscription {
    async fn submit(&self, audio: AudioInput) -> ReasonCareResult<TranscriptionJob> {
        let key = Uuid::new_v4();
        let media_uri = self
            .media_uri(audio, key)
            .await
            .map_err(|e| e.into_capability(CAPABILITY))?;
        let job_name = format!("reasoncare-{key}");

        let body = json!({
            "TranscriptionJobName": job_name,
            "LanguageCode": LANGUAGE_CODE,
            "MediaFormat": MEDIA_FORMAT,
            "Media": { "MediaFileUri": media_uri },
            "Settings": {
                "VocabularyName": VOCABULARY_NAME,
                "ShowSpeakerLabels": true,
                "MaxSpeakerLabels": MAX_SPEAKER_LABELS
            }
        });

        let url = join_url(&self.orchestrator_url, "transcribe/jobs");
        let reply = self
            .transport
            .send_json(Method::POST, &url, Some(OutboundBody::Json(body)))
            .await
            .map_err(|e| e.into_capability(CAPABILITY))?;

        // A reply without a job echo means the job was accepted and queued.
        let status = serde_json::from_value::<JobEnvelope>(reply)
            .ok()
            .and_then(|envelope| envelope.transcription_job)
            .and_then(|job| job.status)
            .unwrap_or(TranscriptionStatus::Queued);

        info!(job_id = %job_name, media_uri = %media_uri, status = status.as_str(), "transcription job submitted");
        Ok(TranscriptionJob { job_id: job_name, status })
    }

    async fn poll(&self, job_id: &str) -> ReasonCareResult<TranscriptionResult> {
        let url = join_url(&self.orchestrator_url, &format!("transcribe/jobs/{job_id}"));
        let reply = self
            .transport
            .send_json(Method::GET, &url, None)
            .await
            .map_err(|e| e.into_capability(CAPABILITY))?;

        let job = serde_json::from_value::<JobEnvelope>(reply)
            .ok()
            .and_then(|envelope| envelope.transcription_job)
            .ok_or_else(|| ReasonCareError::Capability {
                capability: CAPABILITY.to_string(),
                reason: format!("no transcription job '{job_id}' in response"),
            })?;

        let status = job.status.ok_or_else(|| ReasonCareError::Capability {
            capability: CAPABILITY.to_string(),
            reason: format!("transcription job '{job_id}' has no status"),
        })?;

        Ok(TranscriptionResult {
            status,
            transcript_ref: job.transcript.and_then(|t| t.transcript_file_uri),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct JobEnvelope {
    transcription_job: Option<JobDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct JobDetail {
    #[serde(rename = "TranscriptionJobStatus")]
    status: Option<TranscriptionStatus>,
    transcript: Option<TranscriptDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TranscriptDetail {
    transcript_file_uri: Option<String>,
}
