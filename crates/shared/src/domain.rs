use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceKind {
    #[default]
    ClockIn,
    ClockOut,
    Leave,
}

impl AttendanceKind {
    /// Clock events must carry a photo; leave requests must not.
    pub fn requires_photo(self) -> bool {
        matches!(self, AttendanceKind::ClockIn | AttendanceKind::ClockOut)
    }

    /// Label used in payload fields and generated filenames.
    pub fn wire_label(self) -> &'static str {
        match self {
            AttendanceKind::ClockIn => "clock_in",
            AttendanceKind::ClockOut => "clock_out",
            AttendanceKind::Leave => "leave",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AttendanceKind::ClockIn => "Clock in",
            AttendanceKind::ClockOut => "Clock out",
            AttendanceKind::Leave => "Leave",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Late,
    OnLeave,
}

impl AttendanceStatus {
    pub fn label(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Late => "Late",
            AttendanceStatus::OnLeave => "On Leave",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_labels_are_stable() {
        assert_eq!(AttendanceKind::ClockIn.wire_label(), "clock_in");
        assert_eq!(AttendanceKind::ClockOut.wire_label(), "clock_out");
        assert_eq!(AttendanceKind::Leave.wire_label(), "leave");
    }

    #[test]
    fn serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&AttendanceKind::ClockIn).unwrap(),
            "\"clock_in\""
        );
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::OnLeave).unwrap(),
            "\"on_leave\""
        );
    }

    #[test]
    fn only_clock_events_require_a_photo() {
        assert!(AttendanceKind::ClockIn.requires_photo());
        assert!(AttendanceKind::ClockOut.requires_photo());
        assert!(!AttendanceKind::Leave.requires_photo());
    }

    #[test]
    fn default_kind_is_clock_in() {
        assert_eq!(AttendanceKind::default(), AttendanceKind::ClockIn);
    }
}
