//! Form commands queued from UI to the backend worker.

use shared::domain::AttendanceKind;

pub enum FormCommand {
    SelectKind(AttendanceKind),
    EditRemarks(String),
    OpenCamera,
    CapturePhoto,
    Retake,
    CloseCamera,
    Submit,
    Shutdown,
}
