//! Runtime bridge between the UI command queue and the backend event intake.

use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::FormCommand;
use crate::controller::events::UiEvent;
use crate::ui::app::StartupConfig;

pub fn launch(cmd_rx: Receiver<FormCommand>, ui_tx: Sender<UiEvent>, startup: StartupConfig) {
    crate::ui::app::start_backend_bridge(cmd_rx, ui_tx, startup);
}
