use std::path::PathBuf;
use std::process;

use clap::Parser;
use surfwatch::common::config::{Config, config_file};
use surfwatch::common::log;

#[derive(Parser)]
struct Cli {
    /// Path to configuration file to use (overrides default).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Check whether the configuration is valid without starting the overlay.
    #[arg(long)]
    validate: bool,

    /// Owner name substring of the window to track (overrides the config).
    #[arg(long, value_name = "NAME")]
    target: Option<String>,

    /// Poll interval in milliseconds (overrides the config).
    #[arg(long, value_name = "MS")]
    poll_ms: Option<u64>,

    /// Capture a still of the target window on every tick.
    #[arg(long)]
    heartbeat: bool,
}

fn main() {
    sigpipe::reset();
    let opt = Cli::parse();

    if std::env::var_os("RUST_BACKTRACE").is_none() {
        // SAFETY: We are single threaded at this point.
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }
    log::init_logging();
    install_panic_hook();

    let config_path = opt.config.clone().or_else(config_file);
    let mut config = match Config::read_or_default(config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err:#}");
            process::exit(1);
        }
    };
    if let Some(target) = &opt.target {
        config.target.owner = target.clone();
    }
    if let Some(poll_ms) = opt.poll_ms {
        config.target.poll_interval_ms = poll_ms;
    }
    config.target.heartbeat_capture |= opt.heartbeat;

    for notice in config.notices() {
        tracing::warn!("config: {notice}");
    }
    let issues = config.validate();
    if !issues.is_empty() {
        for issue in issues {
            eprintln!("{}", issue);
        }
        process::exit(1);
    }
    if opt.validate {
        println!("Config validation passed");
        return;
    }

    run(config);
}

#[cfg(target_os = "macos")]
fn run(config: Config) {
    use objc2::MainThreadMarker;
    use surfwatch::actor::{self, controller, input};
    use surfwatch::locator::WindowLocator;
    use surfwatch::sys::screen::CoordinateConverter;
    use surfwatch::sys::window_server::WindowServer;
    use surfwatch::ui::cgs_canvas::CgsCanvas;
    use surfwatch::ui::overlay::{BorderStyle, Color, OverlaySurface};
    use surfwatch::ui::shell::{ConsoleShell, PanelView};
    use surfwatch::ui::side_panel::SidePanel;
    use tracing::warn;

    let Some(mtm) = MainThreadMarker::new() else {
        eprintln!("surfwatch must be started on the main thread");
        process::exit(1);
    };
    {
        use objc2_app_kit::{NSApplication, NSApplicationActivationPolicy};
        let app = NSApplication::sharedApplication(mtm);
        let _ = app.setActivationPolicy(NSApplicationActivationPolicy::Accessory);
        app.finishLaunching();
    }

    let border = BorderStyle {
        width: config.overlay.border_width as f64,
        color: Color::from(config.overlay.color),
    };
    let canvas = match CgsCanvas::new() {
        Ok(canvas) => canvas,
        Err(err) => {
            eprintln!("could not create overlay window: {err}");
            process::exit(1);
        }
    };
    // SkyLight windows are positioned in the same top-left space the window
    // list reports.
    let surface = OverlaySurface::create(canvas, CoordinateConverter::identity(), border);

    let panel: Option<Box<dyn PanelView>> = if config.panel.enabled {
        match SidePanel::new(&config.panel, border.width, border.color) {
            Ok(panel) => Some(Box::new(panel)),
            Err(err) => {
                warn!(?err, "could not create side panel, continuing without it");
                None
            }
        }
    } else {
        None
    };
    let shell = ConsoleShell::new(std::io::stdout(), panel);

    let (tx, rx) = actor::channel::<controller::Event>();
    if let Err(err) = input::spawn_stdin_reader(tx.clone()) {
        warn!(?err, "could not start command reader");
    }
    let signal_tx = tx.clone();
    if let Err(err) = ctrlc::set_handler(move || signal_tx.send(controller::Event::Shutdown)) {
        warn!(?err, "could not install Ctrl-C handler");
    }
    drop(tx);

    let controller =
        controller::Controller::new(&config, rx, WindowLocator::new(WindowServer), surface, shell);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_time().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("could not start runtime: {err}");
            process::exit(1);
        }
    };
    runtime.block_on(controller.run());
}

#[cfg(not(target_os = "macos"))]
fn run(_config: Config) {
    eprintln!("surfwatch requires macOS");
    process::exit(1);
}

#[cfg(panic = "unwind")]
fn install_panic_hook() {
    // Abort on panic instead of propagating panics to the main thread.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        original_hook(info);
        std::process::abort();
    }));
}

#[cfg(not(panic = "unwind"))]
fn install_panic_hook() {}
