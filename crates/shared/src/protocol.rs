use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AttendanceKind, AttendanceStatus};

/// A still frame captured from the live preview, already encoded for
/// submission. Exists only between capture and submission/reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoAttachment {
    /// Raw JPEG bytes at the fixed capture resolution.
    pub bytes: Vec<u8>,
    /// Display-ready `data:image/jpeg;base64,...` form.
    pub data_url: String,
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

/// A finalized attendance event. Constructed at submission time and
/// immutable afterwards; ownership passes to the submission gateway and
/// then to `RecordSubmitted` subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub kind: AttendanceKind,
    pub date: NaiveDate,
    /// Wall-clock time of the event, minute precision.
    pub time: NaiveTime,
    pub status: AttendanceStatus,
    pub remarks: String,
    pub photo: Option<PhotoAttachment>,
    pub created_at: DateTime<Utc>,
}

/// Wire shape handed to submission gateways. Photo bytes travel base64
/// encoded next to the display form and the generated filename.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub kind: AttendanceKind,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AttendanceStatus,
    pub remarks: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_b64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_data_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_filename: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Filename stamped onto a captured photo: `attendance_{kind}_{unixMillis}.jpg`.
pub fn attendance_filename(kind: AttendanceKind, created_at: DateTime<Utc>) -> String {
    format!(
        "attendance_{}_{}.jpg",
        kind.wire_label(),
        created_at.timestamp_millis()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn filename_follows_pattern() {
        let created_at = Utc.with_ymd_and_hms(2024, 5, 2, 1, 15, 0).unwrap();
        assert_eq!(
            attendance_filename(AttendanceKind::ClockIn, created_at),
            format!("attendance_clock_in_{}.jpg", created_at.timestamp_millis())
        );
        assert_eq!(
            attendance_filename(AttendanceKind::Leave, created_at),
            format!("attendance_leave_{}.jpg", created_at.timestamp_millis())
        );
    }

    #[test]
    fn payload_omits_absent_photo_fields() {
        let payload = SubmissionPayload {
            kind: AttendanceKind::Leave,
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            time: NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
            status: AttendanceStatus::OnLeave,
            remarks: "Sick".to_string(),
            photo_b64: None,
            photo_data_url: None,
            photo_filename: None,
            created_at: Utc.with_ymd_and_hms(2024, 5, 2, 1, 15, 0).unwrap(),
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(!json.contains("photo_b64"));
        assert!(!json.contains("photo_filename"));
        assert!(json.contains("\"status\":\"on_leave\""));
    }
}
