mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use crossbeam_channel::bounded;

use backend_bridge::commands::FormCommand;
use controller::events::UiEvent;
use ui::app::{AttendanceApp, StartupConfig};

#[derive(Parser, Debug)]
#[command(about = "Attendance capture desktop app")]
struct Args {
    /// POST records to this endpoint instead of the simulated backend.
    #[arg(long)]
    submit_url: Option<String>,
    /// Reject every submission, for exercising the retry path by hand.
    #[arg(long)]
    fail_submissions: bool,
    /// Start with a camera device that refuses to open.
    #[arg(long)]
    camera_unavailable: bool,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let (cmd_tx, cmd_rx) = bounded::<FormCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(1024);
    backend_bridge::runtime::launch(
        cmd_rx,
        ui_tx,
        StartupConfig {
            submit_url: args.submit_url,
            fail_submissions: args.fail_submissions,
            camera_unavailable: args.camera_unavailable,
        },
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Attendance Capture")
            .with_inner_size([760.0, 680.0])
            .with_min_inner_size([560.0, 520.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Attendance Capture",
        options,
        Box::new(|_cc| Ok(Box::new(AttendanceApp::new(cmd_tx, ui_rx)))),
    )
}
