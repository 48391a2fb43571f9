//! UI/backend events and error presentation for the desktop form.

use camera_integration::CameraFrame;
use client_core::FormSnapshot;
use shared::{
    error::{FormError, FormErrorCode},
    protocol::AttendanceRecord,
};

pub enum UiEvent {
    Ready,
    Snapshot(FormSnapshot),
    PreviewFrame(CameraFrame),
    RecordSubmitted(AttendanceRecord),
    Error(UiError),
    Info(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Validation,
    Device,
    Transport,
    Unknown,
}

#[derive(Debug, Clone)]
pub struct UiError {
    pub category: UiErrorCategory,
    pub message: String,
}

impl UiError {
    pub fn from_form(error: &FormError) -> Self {
        let category = match error.code {
            FormErrorCode::MissingPhoto | FormErrorCode::MissingRemarks => {
                UiErrorCategory::Validation
            }
            FormErrorCode::DeviceUnavailable => UiErrorCategory::Device,
            FormErrorCode::SubmissionFailed => UiErrorCategory::Transport,
        };
        Self {
            category,
            message: error.message.clone(),
        }
    }

    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let category = if lower.contains("missing") || lower.contains("required") {
            UiErrorCategory::Validation
        } else if lower.contains("camera") || lower.contains("device") {
            UiErrorCategory::Device
        } else if lower.contains("submission")
            || lower.contains("endpoint")
            || lower.contains("connection")
            || lower.contains("timed out")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };
        Self { category, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_error_codes_map_to_presentation_categories() {
        assert_eq!(
            UiError::from_form(&FormError::missing_photo()).category,
            UiErrorCategory::Validation
        );
        assert_eq!(
            UiError::from_form(&FormError::missing_remarks()).category,
            UiErrorCategory::Validation
        );
        assert_eq!(
            UiError::from_form(&FormError::device_unavailable("no camera")).category,
            UiErrorCategory::Device
        );
        assert_eq!(
            UiError::from_form(&FormError::submission_failed("503")).category,
            UiErrorCategory::Transport
        );
    }

    #[test]
    fn classifies_worker_startup_failures_from_text() {
        let err = UiError::from_message("backend worker startup failure: failed to build runtime");
        assert_eq!(err.category, UiErrorCategory::Unknown);

        let err = UiError::from_message("failed to reach submission endpoint http://x");
        assert_eq!(err.category, UiErrorCategory::Transport);
    }
}
