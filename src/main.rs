use std::process::ExitCode;

use clap::Parser;
use eframe::egui;

use patchcrop::app::PatchCropApp;
use patchcrop::cli::{CliArgs, Config};
use patchcrop::session::Session;
use patchcrop::{log_err, log_info, logger};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Initialize session log (overwrites previous session log)
    logger::init(args.verbose);

    // -- Startup configuration -------------------------------------------
    // Any failure here is fatal: report it and exit before a window opens.
    let session = match Config::from_args(args).and_then(Session::open) {
        Ok(session) => session,
        Err(e) => {
            log_err!("{}", e);
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = session.config();
    log_info!(
        "images={} output={} patch_size={} format={:?}",
        config.images_path.display(),
        config.output_path.display(),
        config.patch_size,
        config.format
    );

    println!("Instructions:");
    println!("Press 'd' (next), 'a' (previous), 'q' (quit), 's' (save patches)");
    println!("Left click (add square), middle click (remove square)\n");

    // -- GUI ---------------------------------------------------------------
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 900.0])
            .with_title("patchcrop"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "patchcrop",
        options,
        Box::new(move |cc| Box::new(PatchCropApp::new(cc, session))),
    );

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_err!("window error: {}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
