use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config, LevelFilter, WriteLogger};

use koma::app::{App, export_spread, run_app_with_event_source, seek_to_page};
use koma::event_source::TerminalEventSource;
use koma::panic_handler;
use koma::reader::{ComicViewer, NoPanel, PdfDocument};
use koma::settings::load_settings;
use koma::widget::ControlBarState;

/// Viewport width assumed for headless export when `--width` is not given
const EXPORT_WIDTH_PX: u32 = 1024;

#[derive(Parser, Debug)]
#[clap(
    name = "koma",
    version,
    about = "Dual-page comic reader for the terminal",
    long_about = None
)]
struct Cli {
    /// PDF to open
    #[clap(name = "FILE")]
    file: PathBuf,

    /// Use a specific configuration file
    #[clap(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Viewport width in pixels instead of the terminal width
    #[clap(short, long, value_name = "PX")]
    width: Option<u32>,

    /// Start with the blank padding page inserted
    #[clap(short, long)]
    blank_padding: bool,

    /// Render the spread without a terminal and write left.png/right.png into DIR
    #[clap(short, long, value_name = "DIR")]
    export: Option<PathBuf>,

    /// Open at this page (1-based)
    #[clap(short, long, value_name = "N")]
    page: Option<usize>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    WriteLogger::init(
        log_level(cli.verbose),
        Config::default(),
        File::create("koma.log").context("creating koma.log")?,
    )?;

    info!("Starting koma");

    let mut settings = load_settings(cli.config.as_deref());
    if cli.blank_padding {
        settings.start_with_blank_padding = true;
    }

    let path = cli.file.clone();
    let load = move || PdfDocument::open(&path);

    if let Some(dir) = &cli.export {
        let options = settings.to_options(cli.width.unwrap_or(EXPORT_WIDTH_PX));
        let mut viewer = ComicViewer::open(load, options, NoPanel);
        viewer
            .wait_until_loaded()
            .with_context(|| format!("opening {}", cli.file.display()))?;
        if let Some(page) = cli.page {
            seek_to_page(&mut viewer, page);
        }

        for written in export_spread(&mut viewer, dir)? {
            println!("{}", written.display());
        }
        return Ok(());
    }

    panic_handler::initialize_panic_handler();

    // Terminal initialization
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let input = settings.input_adapter();
    let width = match cli.width {
        Some(width) => width,
        None => input.columns_to_px(terminal.size()?.width),
    };
    let mut viewer = ComicViewer::open(
        load,
        settings.to_options(width),
        ControlBarState::default(),
    );
    if let Some(page) = cli.page {
        // A failed load is shown by the UI itself
        if viewer.wait_until_loaded().is_ok() {
            seek_to_page(&mut viewer, page);
        }
    }

    let mut app = App::new(viewer, input);
    let res = run_app_with_event_source(&mut terminal, &mut app, &mut TerminalEventSource);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Application error: {err:?}");
        eprintln!("{err:?}");
    }

    info!("Shutting down koma");
    Ok(())
}
