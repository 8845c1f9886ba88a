//! Main entry point for abcompose

use anyhow::{anyhow, bail, Context, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{info, warn};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io::{self, Stdout},
    panic,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use abcompose::{
    compose::fonts::FontBook,
    compose::layout::Slot,
    compose::style::{
        default_gradient_stops, Background, BackgroundKind, GradientStop, StyleConfig,
        DEFAULT_GRADIENT_ANGLE,
    },
    compose::Compositor,
    config::Config,
    export::export_png,
    image_loader::load_image,
    input::handle_event,
    state::AppState,
    style_controller::StyleController,
    terminal_capabilities::detect_capabilities,
    ui,
    worker::{decode_pair, spawn_workers, WorkerHandle},
};

/// Target frame time for 60 FPS
const FRAME_TIME_MS: u64 = 16;

const USAGE: &str = "\
Usage: abcompose [--a <path>] [--b <path>] [--render-once] [--out <dir>]
                 [--background solid|gradient] [--color <hex>]
                 [--stop <hex>:<pos>]... [--angle <deg>] [--font <name>]
                 [--radius <px>]";

/// Command line options
#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    image_a: Option<PathBuf>,
    image_b: Option<PathBuf>,
    render_once: bool,
    out_dir: Option<PathBuf>,
    background: Option<String>,
    color: Option<String>,
    stops: Vec<GradientStop>,
    angle: Option<f32>,
    font: Option<String>,
    radius: Option<f32>,
    help: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Set up panic hook to restore terminal on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let args = parse_args(std::env::args().skip(1))?;
    if args.help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {:#}", e);
        Config::default()
    });

    let compositor = Arc::new(Compositor::new(FontBook::system(&config.fonts.extra_dirs)));

    if args.render_once {
        return run_render_once(&args, &config, &compositor);
    }

    let capabilities = detect_capabilities();
    let workers = spawn_workers(Arc::clone(&compositor))?;

    let mut app_state = AppState::new(config, capabilities, workers.request_tx.clone());
    if let Some(style) = cli_style(&args, &app_state.config.style)? {
        app_state.style = StyleController::from_style(&style);
    }

    // Images given on the command line are loaded before the TUI starts
    for (slot, path) in [(Slot::A, &args.image_a), (Slot::B, &args.image_b)] {
        if let Some(path) = path {
            match load_image(path) {
                Ok(image) => {
                    let name = path
                        .file_name()
                        .map(|s| s.to_string_lossy().to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    app_state.set_slot_image(slot, name, image);
                }
                Err(e) => eprintln!("Failed to load image: {:#}", e),
            }
        }
    }
    if app_state.slots.is_full() {
        app_state.trigger_generate();
    }

    // Initialize terminal (only needed for interactive TUI)
    let mut terminal = setup_terminal()?;

    let result = run_event_loop(&mut terminal, &mut app_state, &workers);

    cleanup_terminal(terminal)?;
    workers.shutdown();

    result
}

/// Parse command line arguments (without the program name)
fn parse_args<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut parsed = CliArgs::default();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .ok_or_else(|| anyhow!("{} needs a value\n{}", name, USAGE))
        };

        match arg.as_str() {
            "--a" => parsed.image_a = Some(PathBuf::from(value("--a")?)),
            "--b" => parsed.image_b = Some(PathBuf::from(value("--b")?)),
            "--render-once" => parsed.render_once = true,
            "--out" => parsed.out_dir = Some(PathBuf::from(value("--out")?)),
            "--background" => parsed.background = Some(value("--background")?),
            "--color" => parsed.color = Some(value("--color")?),
            "--stop" => parsed.stops.push(parse_stop(&value("--stop")?)?),
            "--angle" => {
                let raw = value("--angle")?;
                parsed.angle = Some(
                    raw.parse()
                        .with_context(|| format!("Invalid angle: {:?}", raw))?,
                );
            }
            "--font" => parsed.font = Some(value("--font")?),
            "--radius" => {
                let raw = value("--radius")?;
                parsed.radius = Some(
                    raw.parse()
                        .with_context(|| format!("Invalid radius: {:?}", raw))?,
                );
            }
            "-h" | "--help" => parsed.help = true,
            other => warn!("Ignoring unknown argument {:?}", other),
        }
    }

    Ok(parsed)
}

/// Parse `<color>:<position>`; the colour itself may contain no colon
fn parse_stop(raw: &str) -> Result<GradientStop> {
    let (color, position) = raw
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("Gradient stop must look like <hex>:<pos>, got {:?}", raw))?;
    let position: f32 = position
        .trim()
        .trim_end_matches('%')
        .parse()
        .with_context(|| format!("Invalid stop position in {:?}", raw))?;
    Ok(GradientStop::new(color.trim(), position))
}

/// Style from the command line layered over `base`, or `None` when no style
/// flag was given
fn cli_style(args: &CliArgs, base: &StyleConfig) -> Result<Option<StyleConfig>> {
    let touched = args.background.is_some()
        || args.color.is_some()
        || !args.stops.is_empty()
        || args.angle.is_some()
        || args.font.is_some()
        || args.radius.is_some();
    if !touched {
        return Ok(None);
    }

    let mut controller = StyleController::from_style(base);
    let mut style = controller.snapshot();

    let gradient = match args.background.as_deref() {
        Some("solid") => false,
        Some("gradient") => true,
        Some(other) => bail!("Unknown background {:?}, expected solid or gradient", other),
        None => {
            !args.stops.is_empty()
                || args.angle.is_some()
                || (args.color.is_none() && base.background.kind() == BackgroundKind::Gradient)
        }
    };

    if gradient {
        let (base_stops, base_angle) = match &base.background {
            Background::Gradient {
                stops,
                angle_degrees,
            } => (stops.clone(), *angle_degrees),
            Background::Solid { .. } => (default_gradient_stops(), DEFAULT_GRADIENT_ANGLE),
        };
        style.background = Background::Gradient {
            stops: if args.stops.is_empty() {
                base_stops
            } else {
                args.stops.clone()
            },
            angle_degrees: args.angle.unwrap_or(base_angle),
        };
    } else {
        let color = match (&args.color, &base.background) {
            (Some(color), _) => color.clone(),
            (None, Background::Solid { color }) => color.clone(),
            (None, Background::Gradient { .. }) => controller.solid_color.clone(),
        };
        style.background = Background::Solid { color };
    }

    if let Some(font) = &args.font {
        style.label_font = font.clone();
    }
    if let Some(radius) = args.radius {
        controller.set_radius(radius);
        style.corner_radius_px = controller.radius();
    }

    Ok(Some(style))
}

/// Render once: decode both images, compose, write the PNG
fn run_render_once(args: &CliArgs, config: &Config, compositor: &Compositor) -> Result<()> {
    let (path_a, path_b) = match (&args.image_a, &args.image_b) {
        (Some(a), Some(b)) => (a.clone(), b.clone()),
        _ => bail!("--render-once needs both --a and --b\n{}", USAGE),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let (image_a, image_b) = runtime.block_on(decode_pair(path_a, path_b))?;

    let style = cli_style(args, &config.style)?.unwrap_or_else(|| config.style.clone());

    let start = Instant::now();
    let composition = compositor.compose(&image_a, &image_b, &style)?;
    let render_time = start.elapsed().as_millis();

    let out_dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| config.export.output_dir.clone());
    let path = export_png(&composition, &out_dir)?;

    info!("render-once finished in {}ms", render_time);
    println!(
        "Saved {}x{} comparison to {} ({}ms)",
        composition.width,
        composition.height,
        path.display(),
        render_time
    );
    Ok(())
}

/// Set up the terminal for TUI rendering
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state
fn cleanup_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Main event loop - handles input, processes worker messages, renders UI
fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app_state: &mut AppState,
    workers: &WorkerHandle,
) -> Result<()> {
    let frame_duration = Duration::from_millis(FRAME_TIME_MS);

    loop {
        let frame_start = Instant::now();

        app_state.poll_theme();
        terminal.draw(|frame| ui::render(frame, app_state))?;

        // Poll for events with timeout
        let timeout = frame_duration.saturating_sub(frame_start.elapsed());
        if event::poll(timeout)? {
            let event = event::read()?;

            if let Event::Resize(width, height) = event {
                app_state.set_terminal_size(width, height);
            }

            handle_event(event, app_state)?;
        }

        // Process worker responses (non-blocking)
        while let Ok(response) = workers.response_rx.try_recv() {
            app_state.handle_worker_response(response);
        }

        if app_state.should_quit {
            break;
        }
    }

    // Save configuration on exit
    app_state.sync_config();
    if let Err(e) = app_state.config.save() {
        eprintln!("Warning: Failed to save config: {:#}", e);
    }

    Ok(())
}
