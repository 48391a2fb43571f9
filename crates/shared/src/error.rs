use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormErrorCode {
    MissingPhoto,
    MissingRemarks,
    DeviceUnavailable,
    SubmissionFailed,
}

/// A recoverable form failure. Every variant lands in the controller's
/// single most-recent-error slot; none of them abort the process.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct FormError {
    pub code: FormErrorCode,
    pub message: String,
}

impl FormError {
    pub fn new(code: FormErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn missing_photo() -> Self {
        Self::new(
            FormErrorCode::MissingPhoto,
            "A photo is required for clock-in and clock-out. Open the camera and capture one first.",
        )
    }

    pub fn missing_remarks() -> Self {
        Self::new(
            FormErrorCode::MissingRemarks,
            "Remarks are required for a leave request.",
        )
    }

    pub fn device_unavailable(detail: impl Into<String>) -> Self {
        Self::new(
            FormErrorCode::DeviceUnavailable,
            format!("Camera unavailable: {}", detail.into()),
        )
    }

    pub fn submission_failed(detail: impl Into<String>) -> Self {
        Self::new(
            FormErrorCode::SubmissionFailed,
            format!("Submission failed: {}", detail.into()),
        )
    }
}
