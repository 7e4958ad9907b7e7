//! Main application entry point (native).

#[cfg(feature = "native")]
fn main() {
    env_logger::init();
    log::info!("Starting SnapCrop");

    let config = snapcrop_app::AppConfig::load();
    if let Err(e) = run(config) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "native")]
fn run(config: snapcrop_app::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Start capturing before any window exists so it can't appear in the shot.
    let capture = snapcrop_app::spawn_configured(config.capture_from.clone())?;
    let target = snapcrop_app::ExportTarget {
        output_path: config.output_path(),
        clipboard: config.clipboard,
        clipboard_wait: config.clipboard_wait,
    };

    let Some(image) = snapcrop_app::App::run(config, capture)? else {
        log::info!("Nothing exported");
        return Ok(());
    };

    let report = snapcrop_app::spawn_export(image, target)?.join()?;
    log::info!(
        "Published {}x{} image (file: {}, clipboard: {})",
        report.width,
        report.height,
        report
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "none".to_string()),
        report.clipboard
    );
    Ok(())
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
