use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use camera_integration::{CameraConnector, CameraFrame, CameraOptions, CameraSession, MissingCamera};
use chrono::{DateTime, Local, NaiveTime, Timelike, Utc};
use shared::{
    domain::{AttendanceKind, AttendanceStatus},
    error::FormError,
    protocol::{AttendanceRecord, PhotoAttachment, SubmissionPayload},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

pub mod photo;

/// Clock-ins strictly after this wall-clock time are marked late.
/// Minute precision, matching the recorded event time.
pub const LATE_CUTOFF: (u32, u32) = (8, 0);

const EVENT_CHANNEL_CAPACITY: usize = 64;
const SIMULATED_SUBMIT_LATENCY: Duration = Duration::from_millis(350);

/// Derives the status label for an event at the given wall-clock time.
pub fn derive_status(kind: AttendanceKind, time: NaiveTime) -> AttendanceStatus {
    match kind {
        AttendanceKind::ClockIn => {
            if (time.hour(), time.minute()) > LATE_CUTOFF {
                AttendanceStatus::Late
            } else {
                AttendanceStatus::Present
            }
        }
        AttendanceKind::ClockOut => AttendanceStatus::Present,
        AttendanceKind::Leave => AttendanceStatus::OnLeave,
    }
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

/// Builds the wire payload handed to a submission gateway.
pub fn build_payload(record: &AttendanceRecord) -> SubmissionPayload {
    SubmissionPayload {
        kind: record.kind,
        date: record.date,
        time: record.time,
        status: record.status,
        remarks: record.remarks.clone(),
        photo_b64: record.photo.as_ref().map(|p| STANDARD.encode(&p.bytes)),
        photo_data_url: record.photo.as_ref().map(|p| p.data_url.clone()),
        photo_filename: record.photo.as_ref().map(|p| p.filename.clone()),
        created_at: record.created_at,
    }
}

/// The external collaborator that receives finalized records. The
/// controller awaits completion before resetting; an in-flight submission
/// is never cancelled.
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn submit(&self, payload: SubmissionPayload) -> Result<()>;
}

pub struct MissingSubmissionGateway;

#[async_trait]
impl SubmissionGateway for MissingSubmissionGateway {
    async fn submit(&self, _payload: SubmissionPayload) -> Result<()> {
        Err(anyhow!("no submission endpoint is wired into this build"))
    }
}

/// Stand-in for a real backend: waits a beat, then answers with a
/// scripted outcome.
pub struct SimulatedSubmissionGateway {
    latency: Duration,
    fail_with: Option<String>,
}

impl SimulatedSubmissionGateway {
    pub fn new() -> Self {
        Self {
            latency: SIMULATED_SUBMIT_LATENCY,
            fail_with: None,
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            latency: SIMULATED_SUBMIT_LATENCY,
            fail_with: Some(message.into()),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

impl Default for SimulatedSubmissionGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubmissionGateway for SimulatedSubmissionGateway {
    async fn submit(&self, payload: SubmissionPayload) -> Result<()> {
        tokio::time::sleep(self.latency).await;
        match &self.fail_with {
            Some(message) => Err(anyhow!(message.clone())),
            None => {
                info!(
                    kind = payload.kind.wire_label(),
                    status = payload.status.label(),
                    "simulated submission accepted"
                );
                Ok(())
            }
        }
    }
}

/// Posts the JSON payload to a configured endpoint.
pub struct HttpSubmissionGateway {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpSubmissionGateway {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl SubmissionGateway for HttpSubmissionGateway {
    async fn submit(&self, payload: SubmissionPayload) -> Result<()> {
        self.http
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("failed to reach submission endpoint {}", self.endpoint))?
            .error_for_status()
            .map(|_| ())
            .with_context(|| format!("submission endpoint {} rejected the record", self.endpoint))
    }
}

#[derive(Debug, Clone)]
pub enum FormEvent {
    KindSelected(AttendanceKind),
    CameraOpened,
    CameraClosed,
    PhotoCaptured {
        filename: String,
        width: u32,
        height: u32,
    },
    SubmissionStarted,
    /// Fired exactly once per successful submission, with the finalized
    /// record. This is the success-callback surface.
    RecordSubmitted(AttendanceRecord),
    Error(FormError),
}

/// Derived view of the form for the presentation layer.
#[derive(Debug, Clone)]
pub struct FormSnapshot {
    pub kind: AttendanceKind,
    pub remarks: String,
    pub photo: Option<PhotoAttachment>,
    pub camera_open: bool,
    pub submitting: bool,
    pub error: Option<FormError>,
    pub submit_enabled: bool,
}

struct FormState {
    kind: AttendanceKind,
    remarks: String,
    photo: Option<PhotoAttachment>,
    camera_session: Option<Arc<dyn CameraSession>>,
    submitting: bool,
    error: Option<FormError>,
}

impl FormState {
    fn submit_enabled(&self) -> bool {
        !self.submitting && !(self.kind.requires_photo() && self.photo.is_none())
    }
}

pub struct AttendanceFormController {
    camera: Arc<dyn CameraConnector>,
    gateway: Arc<dyn SubmissionGateway>,
    inner: Mutex<FormState>,
    events: broadcast::Sender<FormEvent>,
}

impl AttendanceFormController {
    pub fn new() -> Arc<Self> {
        Self::new_with_dependencies(Arc::new(MissingCamera), Arc::new(MissingSubmissionGateway))
    }

    pub fn new_with_dependencies(
        camera: Arc<dyn CameraConnector>,
        gateway: Arc<dyn SubmissionGateway>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            camera,
            gateway,
            inner: Mutex::new(FormState {
                kind: AttendanceKind::default(),
                remarks: String::new(),
                photo: None,
                camera_session: None,
                submitting: false,
                error: None,
            }),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<FormEvent> {
        self.events.subscribe()
    }

    /// Sets the attendance kind. Always returns the form to the idle
    /// capture state: any captured photo is discarded and an open camera
    /// session is closed, whatever the prior state was.
    pub async fn select_kind(&self, kind: AttendanceKind) {
        let session = {
            let mut guard = self.inner.lock().await;
            guard.kind = kind;
            guard.photo = None;
            guard.camera_session.take()
        };
        if let Some(session) = session {
            session.close().await;
            let _ = self.events.send(FormEvent::CameraClosed);
        }
        info!(kind = kind.wire_label(), "form: kind selected");
        let _ = self.events.send(FormEvent::KindSelected(kind));
    }

    /// Replaces the remarks text verbatim; trimming happens only at
    /// validation time.
    pub async fn edit_remarks(&self, text: impl Into<String>) {
        self.inner.lock().await.remarks = text.into();
    }

    /// Requests device access and starts the live preview. A refusal is
    /// surfaced through the error slot, never thrown away.
    pub async fn open_camera(&self) {
        {
            let guard = self.inner.lock().await;
            if guard
                .camera_session
                .as_ref()
                .is_some_and(|session| session.is_open())
            {
                return;
            }
        }

        match self.camera.open(CameraOptions::default()).await {
            Ok(session) => {
                self.inner.lock().await.camera_session = Some(session);
                info!("form: camera preview opened");
                let _ = self.events.send(FormEvent::CameraOpened);
            }
            Err(err) => {
                self.set_error(FormError::device_unavailable(err.to_string()))
                    .await;
            }
        }
    }

    /// Samples the current preview frame into a photo attachment and
    /// closes the preview; this design captures a single frame rather
    /// than keeping a capture stream alive.
    pub async fn capture_photo(&self) {
        let (session, kind) = {
            let guard = self.inner.lock().await;
            (guard.camera_session.clone(), guard.kind)
        };
        let Some(session) = session else {
            self.set_error(FormError::device_unavailable(
                "camera is not open; open the preview before capturing",
            ))
            .await;
            return;
        };

        let frame = match session.latest_frame().await {
            Ok(frame) => frame,
            Err(err) => {
                self.set_error(FormError::device_unavailable(err.to_string()))
                    .await;
                return;
            }
        };

        let attachment = match photo::encode_capture(&frame, kind, Utc::now()) {
            Ok(attachment) => attachment,
            Err(err) => {
                self.set_error(FormError::device_unavailable(err.to_string()))
                    .await;
                return;
            }
        };

        let event = FormEvent::PhotoCaptured {
            filename: attachment.filename.clone(),
            width: attachment.width,
            height: attachment.height,
        };
        {
            let mut guard = self.inner.lock().await;
            guard.photo = Some(attachment);
            guard.camera_session = None;
        }
        session.close().await;
        info!("form: photo captured, preview closed");
        let _ = self.events.send(event);
        let _ = self.events.send(FormEvent::CameraClosed);
    }

    /// Live preview stream of the currently open camera session, if any.
    pub async fn preview_frames(&self) -> Option<broadcast::Receiver<CameraFrame>> {
        self.inner
            .lock()
            .await
            .camera_session
            .as_ref()
            .map(|session| session.subscribe_frames())
    }

    /// Discards the captured photo so the camera can be reopened.
    pub async fn retake(&self) {
        self.inner.lock().await.photo = None;
    }

    /// Stops the live preview without capturing and releases the device.
    pub async fn close_camera(&self) {
        let session = self.inner.lock().await.camera_session.take();
        if let Some(session) = session {
            session.close().await;
            info!("form: camera preview closed");
            let _ = self.events.send(FormEvent::CameraClosed);
        }
    }

    /// Validates and submits the form at the current wall clock.
    pub async fn submit(&self) {
        self.submit_at(Local::now()).await;
    }

    /// Validates and submits the form at an explicit wall-clock instant.
    pub async fn submit_at(&self, now: DateTime<Local>) {
        let (kind, remarks, photo) = {
            let mut guard = self.inner.lock().await;
            if guard.submitting {
                return;
            }
            if guard.kind.requires_photo() && guard.photo.is_none() {
                drop(guard);
                self.set_error(FormError::missing_photo()).await;
                return;
            }
            if guard.kind == AttendanceKind::Leave && guard.remarks.trim().is_empty() {
                drop(guard);
                self.set_error(FormError::missing_remarks()).await;
                return;
            }
            guard.submitting = true;
            (guard.kind, guard.remarks.clone(), guard.photo.clone())
        };

        let time = truncate_to_minute(now.time());
        let record = AttendanceRecord {
            kind,
            date: now.date_naive(),
            time,
            status: derive_status(kind, time),
            remarks,
            photo,
            created_at: now.with_timezone(&Utc),
        };
        let _ = self.events.send(FormEvent::SubmissionStarted);

        match self.gateway.submit(build_payload(&record)).await {
            Ok(()) => {
                let session = {
                    let mut guard = self.inner.lock().await;
                    guard.remarks.clear();
                    guard.photo = None;
                    guard.error = None;
                    guard.submitting = false;
                    guard.camera_session.take()
                };
                if let Some(session) = session {
                    session.close().await;
                    let _ = self.events.send(FormEvent::CameraClosed);
                }
                info!(
                    kind = record.kind.wire_label(),
                    status = record.status.label(),
                    "form: attendance record submitted"
                );
                let _ = self.events.send(FormEvent::RecordSubmitted(record));
            }
            Err(err) => {
                // Keep remarks and photo so the user can retry as-is.
                self.inner.lock().await.submitting = false;
                self.set_error(FormError::submission_failed(err.to_string()))
                    .await;
            }
        }
    }

    /// Submission eligibility, derived: disabled while a submission is in
    /// flight or while the kind requires a photo that is not captured.
    pub async fn submit_enabled(&self) -> bool {
        self.inner.lock().await.submit_enabled()
    }

    pub async fn snapshot(&self) -> FormSnapshot {
        let guard = self.inner.lock().await;
        FormSnapshot {
            kind: guard.kind,
            remarks: guard.remarks.clone(),
            photo: guard.photo.clone(),
            camera_open: guard
                .camera_session
                .as_ref()
                .is_some_and(|session| session.is_open()),
            submitting: guard.submitting,
            error: guard.error.clone(),
            submit_enabled: guard.submit_enabled(),
        }
    }

    /// Releases the camera device if a session is still open. Call on
    /// application shutdown; session `Drop` guards cover paths that never
    /// get here.
    pub async fn shutdown(&self) {
        self.close_camera().await;
    }

    async fn set_error(&self, error: FormError) {
        warn!(code = ?error.code, "form: {}", error.message);
        self.inner.lock().await.error = Some(error.clone());
        let _ = self.events.send(FormEvent::Error(error));
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
