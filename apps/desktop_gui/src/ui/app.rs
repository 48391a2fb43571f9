use std::{sync::Arc, thread, time::Duration};

use camera_integration::{CameraConnector, CameraFrame, SyntheticCamera};
use client_core::{
    AttendanceFormController, FormEvent, FormSnapshot, HttpSubmissionGateway,
    SimulatedSubmissionGateway, SubmissionGateway,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use egui::TextureHandle;
use shared::{domain::AttendanceKind, protocol::AttendanceRecord};
use tokio::sync::broadcast::error::RecvError;

use crate::backend_bridge::commands::FormCommand;
use crate::controller::events::{UiError, UiErrorCategory, UiEvent};
use crate::controller::orchestration::dispatch_form_command;

const PREVIEW_PANE_SIZE: egui::Vec2 = egui::vec2(320.0, 240.0);
const SUBMITTED_LOG_HEIGHT: f32 = 170.0;

/// Collaborator wiring chosen at launch from the CLI flags.
pub struct StartupConfig {
    pub submit_url: Option<String>,
    pub fail_submissions: bool,
    pub camera_unavailable: bool,
}

pub struct AttendanceApp {
    cmd_tx: Sender<FormCommand>,
    ui_rx: Receiver<UiEvent>,

    kind: AttendanceKind,
    remarks_draft: String,
    snapshot: Option<FormSnapshot>,

    preview_texture: Option<TextureHandle>,
    // Keyed by filename so the decoded texture follows the capture.
    captured_texture: Option<(String, TextureHandle)>,

    submitted: Vec<AttendanceRecord>,
    status: String,
    startup_error: Option<UiError>,
}

impl AttendanceApp {
    pub fn new(cmd_tx: Sender<FormCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            kind: AttendanceKind::default(),
            remarks_draft: String::new(),
            snapshot: None,
            preview_texture: None,
            captured_texture: None,
            submitted: Vec::new(),
            status: "Starting backend worker...".to_string(),
            startup_error: None,
        }
    }

    fn dispatch(&mut self, cmd: FormCommand) {
        dispatch_form_command(&self.cmd_tx, cmd, &mut self.status);
    }

    fn process_ui_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Ready => {
                    self.status = "Ready".to_string();
                }
                UiEvent::Snapshot(snapshot) => {
                    self.kind = snapshot.kind;
                    if snapshot.photo.is_none() {
                        self.captured_texture = None;
                    }
                    if !snapshot.camera_open {
                        self.preview_texture = None;
                    }
                    self.snapshot = Some(snapshot);
                }
                UiEvent::PreviewFrame(frame) => {
                    self.update_preview_texture(ctx, &frame);
                }
                UiEvent::RecordSubmitted(record) => {
                    self.remarks_draft.clear();
                    self.status = format!(
                        "Recorded {} at {} ({})",
                        record.kind.label(),
                        record.time.format("%H:%M"),
                        record.status.label()
                    );
                    self.submitted.insert(0, record);
                }
                UiEvent::Error(error) => {
                    if error.category == UiErrorCategory::Unknown && self.snapshot.is_none() {
                        self.startup_error = Some(error);
                    }
                    // Form errors arrive again inside the next snapshot's
                    // error slot; the banner renders from there.
                }
                UiEvent::Info(message) => {
                    self.status = message;
                }
            }
        }
    }

    fn update_preview_texture(&mut self, ctx: &egui::Context, frame: &CameraFrame) {
        let color_image = egui::ColorImage::from_rgba_unmultiplied(
            [frame.width as usize, frame.height as usize],
            &frame.rgba,
        );
        match &mut self.preview_texture {
            Some(texture) => texture.set(color_image, egui::TextureOptions::LINEAR),
            None => {
                self.preview_texture =
                    Some(ctx.load_texture("camera-preview", color_image, egui::TextureOptions::LINEAR));
            }
        }
    }

    fn captured_photo_texture(&mut self, ctx: &egui::Context) -> Option<TextureHandle> {
        let photo = self.snapshot.as_ref()?.photo.as_ref()?;
        if let Some((filename, texture)) = &self.captured_texture {
            if *filename == photo.filename {
                return Some(texture.clone());
            }
        }
        let decoded = image::load_from_memory(&photo.bytes).ok()?.to_rgba8();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(
            [decoded.width() as usize, decoded.height() as usize],
            decoded.as_raw(),
        );
        let texture = ctx.load_texture("captured-photo", color_image, egui::TextureOptions::LINEAR);
        self.captured_texture = Some((photo.filename.clone(), texture.clone()));
        Some(texture)
    }

    fn show_kind_selector(&mut self, ui: &mut egui::Ui) {
        ui.label("Attendance type");
        ui.horizontal(|ui| {
            for kind in [
                AttendanceKind::ClockIn,
                AttendanceKind::ClockOut,
                AttendanceKind::Leave,
            ] {
                if ui.radio_value(&mut self.kind, kind, kind.label()).clicked() {
                    self.dispatch(FormCommand::SelectKind(kind));
                }
            }
        });
    }

    fn show_remarks_editor(&mut self, ui: &mut egui::Ui) {
        let required = self.kind == AttendanceKind::Leave;
        ui.label(if required {
            "Remarks (required)"
        } else {
            "Remarks"
        });
        let hint = if required {
            "Reason for the leave request..."
        } else {
            "Optional notes..."
        };
        let response = ui.add(
            egui::TextEdit::multiline(&mut self.remarks_draft)
                .desired_rows(3)
                .desired_width(f32::INFINITY)
                .hint_text(hint),
        );
        if response.changed() {
            self.dispatch(FormCommand::EditRemarks(self.remarks_draft.clone()));
        }
    }

    fn show_camera_panel(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        if !self.kind.requires_photo() {
            return;
        }
        ui.separator();
        ui.label("Photo");

        let (camera_open, has_photo) = self
            .snapshot
            .as_ref()
            .map(|snapshot| (snapshot.camera_open, snapshot.photo.is_some()))
            .unwrap_or((false, false));

        if camera_open {
            if let Some(texture) = self.preview_texture.clone() {
                // Mirror the preview so it matches what the captured photo
                // will look like.
                ui.add(
                    egui::Image::from_texture(&texture)
                        .fit_to_exact_size(PREVIEW_PANE_SIZE)
                        .uv(egui::Rect::from_min_max(
                            egui::pos2(1.0, 0.0),
                            egui::pos2(0.0, 1.0),
                        )),
                );
            } else {
                ui.add_sized(PREVIEW_PANE_SIZE, egui::Spinner::new());
            }
            ui.horizontal(|ui| {
                if ui.button("Capture").clicked() {
                    self.dispatch(FormCommand::CapturePhoto);
                }
                if ui.button("Cancel").clicked() {
                    self.dispatch(FormCommand::CloseCamera);
                }
            });
        } else if has_photo {
            if let Some(texture) = self.captured_photo_texture(ctx) {
                ui.add(egui::Image::from_texture(&texture).fit_to_exact_size(PREVIEW_PANE_SIZE));
            }
            if ui.button("Retake").clicked() {
                self.dispatch(FormCommand::Retake);
                self.dispatch(FormCommand::OpenCamera);
            }
        } else {
            if ui.button("Open camera").clicked() {
                self.dispatch(FormCommand::OpenCamera);
            }
            ui.small("A photo is required for clock-in and clock-out.");
        }
    }

    fn show_error_banner(&self, ui: &mut egui::Ui) {
        let message = self
            .snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.error.as_ref())
            .map(|error| error.message.clone())
            .or_else(|| {
                self.startup_error
                    .as_ref()
                    .map(|error| error.message.clone())
            });
        if let Some(message) = message {
            ui.colored_label(egui::Color32::from_rgb(220, 80, 80), message);
        }
    }

    fn show_submit_row(&mut self, ui: &mut egui::Ui) {
        let (enabled, submitting) = self
            .snapshot
            .as_ref()
            .map(|snapshot| (snapshot.submit_enabled, snapshot.submitting))
            .unwrap_or((false, false));

        let label = match self.kind {
            AttendanceKind::ClockIn => "Record clock-in",
            AttendanceKind::ClockOut => "Record clock-out",
            AttendanceKind::Leave => "Request leave",
        };

        ui.horizontal(|ui| {
            if ui.add_enabled(enabled, egui::Button::new(label)).clicked() {
                self.dispatch(FormCommand::Submit);
            }
            if submitting {
                ui.spinner();
                ui.small("Submitting...");
            } else if !enabled && self.kind.requires_photo() {
                ui.small("Capture a photo to enable submission.");
            }
        });
    }

    fn show_submitted_log(&self, ui: &mut egui::Ui) {
        if self.submitted.is_empty() {
            return;
        }
        ui.separator();
        ui.label("Submitted this session");
        egui::ScrollArea::vertical()
            .max_height(SUBMITTED_LOG_HEIGHT)
            .show(ui, |ui| {
                egui::Grid::new("submitted-records")
                    .striped(true)
                    .min_col_width(70.0)
                    .show(ui, |ui| {
                        for record in &self.submitted {
                            ui.label(record.date.format("%Y-%m-%d").to_string());
                            ui.label(record.time.format("%H:%M").to_string());
                            ui.label(record.kind.label());
                            ui.label(record.status.label());
                            ui.label(if record.photo.is_some() { "photo" } else { "-" });
                            ui.label(record.remarks.as_str());
                            ui.end_row();
                        }
                    });
            });
    }
}

impl eframe::App for AttendanceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events(ctx);

        egui::TopBottomPanel::bottom("status-bar").show(ctx, |ui| {
            ui.small(self.status.as_str());
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Attendance");
            ui.add_space(6.0);
            self.show_kind_selector(ui);
            ui.add_space(6.0);
            self.show_remarks_editor(ui);
            self.show_camera_panel(ui, ctx);
            ui.add_space(8.0);
            self.show_error_banner(ui);
            self.show_submit_row(ui);
            self.show_submitted_log(ui);
        });

        let camera_open = self
            .snapshot
            .as_ref()
            .is_some_and(|snapshot| snapshot.camera_open);
        if camera_open {
            ctx.request_repaint_after(Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

impl Drop for AttendanceApp {
    fn drop(&mut self) {
        // Make sure the worker releases an open camera device on exit.
        let _ = self.cmd_tx.try_send(FormCommand::Shutdown);
    }
}

pub fn start_backend_bridge(
    cmd_rx: Receiver<FormCommand>,
    ui_tx: Sender<UiEvent>,
    startup: StartupConfig,
) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(format!(
                    "backend worker startup failure: failed to build runtime: {err}"
                ))));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let camera: Arc<dyn CameraConnector> = if startup.camera_unavailable {
                Arc::new(SyntheticCamera::unavailable())
            } else {
                Arc::new(SyntheticCamera::new())
            };
            let gateway: Arc<dyn SubmissionGateway> = match &startup.submit_url {
                Some(url) => {
                    tracing::info!(endpoint = url.as_str(), "using HTTP submission gateway");
                    Arc::new(HttpSubmissionGateway::new(url.clone()))
                }
                None if startup.fail_submissions => {
                    Arc::new(SimulatedSubmissionGateway::failing("simulated backend rejection"))
                }
                None => Arc::new(SimulatedSubmissionGateway::new()),
            };
            let controller = AttendanceFormController::new_with_dependencies(camera, gateway);

            let events_task = {
                let controller = Arc::clone(&controller);
                let ui_tx = ui_tx.clone();
                let mut events = controller.subscribe_events();
                tokio::spawn(async move {
                    loop {
                        match events.recv().await {
                            Ok(event) => {
                                match event {
                                    FormEvent::RecordSubmitted(record) => {
                                        let _ = ui_tx.try_send(UiEvent::RecordSubmitted(record));
                                    }
                                    FormEvent::Error(error) => {
                                        let _ = ui_tx
                                            .try_send(UiEvent::Error(UiError::from_form(&error)));
                                    }
                                    FormEvent::KindSelected(_)
                                    | FormEvent::CameraOpened
                                    | FormEvent::CameraClosed
                                    | FormEvent::PhotoCaptured { .. }
                                    | FormEvent::SubmissionStarted => {}
                                }
                                let _ = ui_tx
                                    .try_send(UiEvent::Snapshot(controller.snapshot().await));
                            }
                            Err(RecvError::Lagged(_)) => continue,
                            Err(RecvError::Closed) => break,
                        }
                    }
                })
            };

            let _ = ui_tx.try_send(UiEvent::Ready);
            let _ = ui_tx.try_send(UiEvent::Snapshot(controller.snapshot().await));

            let mut preview_task: Option<tokio::task::JoinHandle<()>> = None;
            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    FormCommand::SelectKind(kind) => controller.select_kind(kind).await,
                    FormCommand::EditRemarks(text) => controller.edit_remarks(text).await,
                    FormCommand::OpenCamera => {
                        controller.open_camera().await;
                        if let Some(mut frames) = controller.preview_frames().await {
                            if let Some(task) = preview_task.take() {
                                task.abort();
                            }
                            let ui_tx = ui_tx.clone();
                            preview_task = Some(tokio::spawn(async move {
                                loop {
                                    match frames.recv().await {
                                        Ok(frame) => {
                                            let _ =
                                                ui_tx.try_send(UiEvent::PreviewFrame(frame));
                                        }
                                        Err(RecvError::Lagged(_)) => continue,
                                        Err(RecvError::Closed) => break,
                                    }
                                }
                            }));
                        }
                    }
                    FormCommand::CapturePhoto => controller.capture_photo().await,
                    FormCommand::Retake => controller.retake().await,
                    FormCommand::CloseCamera => controller.close_camera().await,
                    FormCommand::Submit => controller.submit().await,
                    FormCommand::Shutdown => break,
                }
                let _ = ui_tx.try_send(UiEvent::Snapshot(controller.snapshot().await));
            }

            // Runs on explicit shutdown and when the UI side hangs up.
            if let Some(task) = preview_task.take() {
                task.abort();
            }
            controller.shutdown().await;
            events_task.abort();
            tracing::info!("backend worker stopped");
        });
    });
}
