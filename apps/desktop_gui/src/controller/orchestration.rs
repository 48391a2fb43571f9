//! Command orchestration from UI actions to the backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::FormCommand;

pub fn dispatch_form_command(cmd_tx: &Sender<FormCommand>, cmd: FormCommand, status: &mut String) {
    let cmd_name = match &cmd {
        FormCommand::SelectKind(_) => "select_kind",
        FormCommand::EditRemarks(_) => "edit_remarks",
        FormCommand::OpenCamera => "open_camera",
        FormCommand::CapturePhoto => "capture_photo",
        FormCommand::Retake => "retake",
        FormCommand::CloseCamera => "close_camera",
        FormCommand::Submit => "submit",
        FormCommand::Shutdown => "shutdown",
    };
    match cmd_tx.try_send(cmd) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            *status = format!("Backend busy; dropped {cmd_name} request");
            tracing::warn!("ui: backend command queue full, dropped {cmd_name}");
        }
        Err(TrySendError::Disconnected(_)) => {
            *status = "Backend worker disconnected".to_string();
            tracing::error!("ui: backend command channel disconnected on {cmd_name}");
        }
    }
}
