use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pulldash::data::duration::parse_duration;
use pulldash::data::{Binding, Board, Highlighter, MissingPolicy, Resolver};
use pulldash::poll::http::HttpFetcher;
use pulldash::poll::PollLoop;
use pulldash::ui::{self, Theme};
use pulldash::{events, App, DashboardConfig, DataSource, FileSource, HttpSource, Snapshot};

/// How often the status bar age is repainted when nothing else changes.
const IDLE_REDRAW: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(name = "pulldash")]
#[command(about = "Terminal dashboard for a polled JSON endpoint")]
struct Args {
    /// Configuration file (TOML); missing file means defaults
    #[arg(short, long, default_value = "pulldash.toml")]
    config: PathBuf,

    /// Endpoint to poll (e.g. http://192.168.1.20:8000/pull)
    #[arg(short, long, conflicts_with = "file")]
    url: Option<String>,

    /// Read snapshots from a JSON file instead of polling
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Delay between polls (e.g. "1s", "500ms")
    #[arg(short, long)]
    interval: Option<String>,

    /// How long a changed value stays highlighted
    #[arg(long)]
    highlight: Option<String>,

    /// Per-request timeout
    #[arg(long)]
    timeout: Option<String>,

    /// Behaviour for keys missing from the payload (zero|fail)
    #[arg(long)]
    missing: Option<MissingPolicy>,

    /// Number of points kept in the chart
    #[arg(long)]
    history: Option<usize>,

    /// Bind a key to a row: key, key=Label or +key=Label (repeatable)
    #[arg(short, long = "bind")]
    bind: Vec<Binding>,

    /// Fetch once, print the resolved values as JSON and exit
    #[arg(long)]
    once: bool,

    /// Write logs to this file (RUST_LOG controls the filter)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(args.log_file.as_deref(), args.once)?;

    let mut config = DashboardConfig::load(&args.config)?;
    apply_overrides(&mut config, &args)?;
    tracing::info!(
        endpoint = %config.endpoint,
        rows = config.effective_bindings().len(),
        "starting"
    );

    if args.once {
        return run_once(&config, args.file.as_deref());
    }

    if let Some(ref path) = args.file {
        let source = Box::new(FileSource::new(path));
        return run_tui(source, &config);
    }

    run_with_http(&config)
}

/// Command-line flags take precedence over the file and environment.
fn apply_overrides(config: &mut DashboardConfig, args: &Args) -> Result<()> {
    if let Some(ref url) = args.url {
        config.endpoint = url.clone();
    }
    if let Some(ref interval) = args.interval {
        config.interval = parse_duration(interval).context("invalid --interval")?;
    }
    if let Some(ref highlight) = args.highlight {
        config.highlight = parse_duration(highlight).context("invalid --highlight")?;
    }
    if let Some(ref timeout) = args.timeout {
        config.timeout = parse_duration(timeout).context("invalid --timeout")?;
    }
    if let Some(missing) = args.missing {
        config.missing = missing;
    }
    if let Some(history) = args.history {
        config.history = history;
    }
    if !args.bind.is_empty() {
        config.bindings = args.bind.clone();
    }
    config.validate()?;
    Ok(())
}

/// Install a subscriber. The TUI owns the terminal, so interactive runs only
/// log when a file is given; headless runs log to stderr.
fn init_tracing(log_file: Option<&Path>, headless: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "pulldash=info".into()),
    );

    if let Some(path) = log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("cannot open log file {}", path.display()))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file)),
            )
            .init();
    } else if headless {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
    Ok(())
}

/// Poll the configured endpoint in the background and run the TUI.
fn run_with_http(config: &DashboardConfig) -> Result<()> {
    // The runtime must outlive the TUI; the poll task runs on its workers.
    let rt = tokio::runtime::Runtime::new()?;

    let source = rt.block_on(async {
        HttpSource::connect(&config.endpoint, config.interval, config.timeout)
            .with_context(|| format!("cannot poll {}", config.endpoint))
    })?;

    run_tui(Box::new(source), config)
}

/// Single fetch, single pass, JSON to stdout.
fn run_once(config: &DashboardConfig, file: Option<&Path>) -> Result<()> {
    let snapshot: Snapshot = match file {
        Some(path) => {
            let mut source = FileSource::new(path);
            match source.poll() {
                Some(snapshot) => snapshot,
                None => anyhow::bail!(
                    "{}: {}",
                    source.description(),
                    source.error().unwrap_or("no data")
                ),
            }
        }
        None => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(async {
                let fetcher = HttpFetcher::new(&config.endpoint, config.timeout)?;
                let mut poll = PollLoop::new(fetcher, config.interval);
                poll.cycle().await
            })
            .with_context(|| format!("fetch from {} failed", config.endpoint))?
        }
    };

    let mut board = Board::new(
        config.effective_bindings(),
        Resolver::new(config.missing),
        Highlighter::new(config.highlight),
    );
    let values = board.apply(&snapshot, Instant::now())?;

    println!("{}", serde_json::to_string_pretty(&values)?);
    Ok(())
}

/// Run the TUI with the given data source
fn run_tui(source: Box<dyn DataSource>, config: &DashboardConfig) -> Result<()> {
    // Detect before raw mode; the probe talks to the terminal itself.
    let theme = Theme::auto_detect();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::from_config(source, config).with_theme(theme);
    app.reload_data();

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    tracing::info!(cycles = app.cycles, failures = app.fetch_failures(), "stopped");
    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let mut redraw = true;
    let mut last_draw = Instant::now();

    while app.running {
        if redraw || last_draw.elapsed() >= IDLE_REDRAW {
            terminal.draw(|frame| ui::draw(frame, app))?;
            last_draw = Instant::now();
        }

        // Poll for events with a short timeout
        redraw = match events::poll_event(Duration::from_millis(100))? {
            Some(Event::Key(key)) => {
                events::handle_key_event(app, key);
                true
            }
            Some(Event::Mouse(mouse)) => {
                events::handle_mouse_event(app, mouse);
                true
            }
            Some(Event::Resize(_, _)) => true,
            _ => false,
        };

        // Drain the source, expire highlights, feed the chart
        redraw |= app.reload_data();
    }

    Ok(())
}
