mod ui;

use clap::{error::ErrorKind, Args, CommandFactory, Parser, Subcommand, ValueEnum};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use reticle::{
    app_dirs::AppDirs,
    clock::SystemClock,
    engine::{SessionEngine, ShotOutcome},
    history::{format_duration, trend, HistorySummary, TrendMetric},
    input::{apply, viewport_for, Applied, InputMapper},
    logging,
    mode::GameMode,
    random::RngSource,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner, FRAME_INTERVAL},
    sensitivity::{
        convert_sensitivity, format_cm360, format_edpi, in_per_360, recommended_range,
        web_sensitivity_factor, GameYaw, SensitivityClass, REFERENCE_FOV, REFERENCE_YAW,
    },
    session::{SessionConfig, SessionState},
    settings::{Difficulty, GameSettings, TargetSize},
    storage::{export_file_name, HistoryStore, SettingsStore, Storage},
};
use std::{
    error::Error,
    fs,
    io::{self, stdin},
    path::PathBuf,
};
use tracing::info;

/// Recent sessions compared for the trend line
const TREND_WINDOW: usize = 5;

/// terminal aim trainer with sensitivity matching and session history
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal aim trainer: click targets with your mouse, scaled through your in-game sensitivity, and track accuracy and reaction time across sessions."
)]
pub struct Cli {
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// start a training session (default)
    Play(PlayArgs),
    /// show sensitivity conversions for a DPI and in-game sensitivity
    Sens(SensArgs),
    /// show or change stored settings
    Settings(SettingsArgs),
    /// show session history
    History {
        /// print every session as CSV instead of the summary
        #[clap(long)]
        csv: bool,

        /// number of recent sessions listed
        #[clap(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
    /// write settings and history to a JSON file
    Export {
        /// output path, defaults to reticle-data-<date>.json
        #[clap(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// load settings and history from an exported JSON file
    Import { path: PathBuf },
    /// delete all stored sessions
    ClearHistory,
}

#[derive(Args, Debug, Clone, Default)]
struct PlayArgs {
    /// training mode, defaults to the last one played
    #[clap(short = 'm', long, value_enum)]
    mode: Option<ModeArg>,

    /// end the session automatically after this many seconds
    #[clap(short = 's', long)]
    secs: Option<u64>,

    /// seed target placement for a repeatable session
    #[clap(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug, Clone)]
struct SensArgs {
    /// mouse DPI, defaults to the stored setting
    #[clap(short = 'd', long)]
    dpi: Option<u32>,

    /// in-game sensitivity, defaults to the stored setting
    #[clap(long)]
    sens: Option<f64>,

    /// game the sensitivity comes from
    #[clap(long, value_enum, default_value_t = YawArg::Valorant)]
    from: YawArg,

    /// viewport width used for the pixel factor
    #[clap(long, default_value_t = 1920.0)]
    width: f64,
}

#[derive(Args, Debug, Clone, Default)]
struct SettingsArgs {
    /// mouse DPI (floored at 100)
    #[clap(long)]
    dpi: Option<String>,

    /// in-game sensitivity (floored at 0.01)
    #[clap(long)]
    sens: Option<String>,

    #[clap(long, value_enum)]
    size: Option<SizeArg>,

    #[clap(long, value_enum)]
    difficulty: Option<DifficultyArg>,

    /// crosshair color as #rrggbb
    #[clap(long)]
    crosshair_color: Option<String>,

    /// restore every setting to its default
    #[clap(long)]
    reset: bool,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum ModeArg {
    Reaction,
    Flick,
    Tracking,
    Gridshot,
    Headshot,
}

impl ModeArg {
    fn as_mode(&self) -> GameMode {
        match self {
            ModeArg::Reaction => GameMode::Reaction,
            ModeArg::Flick => GameMode::Flick,
            ModeArg::Tracking => GameMode::Tracking,
            ModeArg::Gridshot => GameMode::GridShot,
            ModeArg::Headshot => GameMode::HeadshotLine,
        }
    }
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum YawArg {
    Valorant,
    Cs2,
    Apex,
    Overwatch,
    Fortnite,
}

impl YawArg {
    fn as_yaw(&self) -> GameYaw {
        match self {
            YawArg::Valorant => GameYaw::Valorant,
            YawArg::Cs2 => GameYaw::Cs2,
            YawArg::Apex => GameYaw::Apex,
            YawArg::Overwatch => GameYaw::Overwatch,
            YawArg::Fortnite => GameYaw::Fortnite,
        }
    }
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum SizeArg {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

/// Interactive state shared by the event loop and the renderer
pub struct App {
    pub engine: SessionEngine,
    pub mapper: InputMapper,
    pub canvas: Rect,
    pub last_shot: Option<ShotOutcome>,
    pub notice: Option<String>,
    /// History totals as of the last finished session
    pub history_summary: Option<HistorySummary>,
}

impl App {
    pub fn new(engine: SessionEngine) -> Self {
        Self {
            engine,
            mapper: InputMapper::new(),
            canvas: Rect::default(),
            last_shot: None,
            notice: None,
            history_summary: None,
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.canvas = ui::canvas_area(Rect::new(0, 0, cols, rows));
        self.engine
            .set_viewport(viewport_for(self.canvas.width, self.canvas.height));
    }

    pub fn on_frame(&mut self, dt: f64) {
        self.engine.tick(dt);
        if let Some(session) = self.engine.update_elapsed() {
            info!(id = %session.id, "session reached its time limit");
            self.session_ended();
        }
    }

    fn session_ended(&mut self) {
        self.history_summary = Some(self.engine.history().summary());
        self.last_shot = None;
    }

    /// Returns false once the user asked to quit
    pub fn on_event(&mut self, event: &AppEvent) -> bool {
        let Some(command) = self.mapper.translate(event, self.engine.state()) else {
            return true;
        };
        match apply(&mut self.engine, command) {
            Applied::Quit => return false,
            Applied::Shot(outcome) => self.last_shot = Some(outcome),
            Applied::Rejected(e) => self.notice = Some(e.to_string()),
            Applied::Ended(_) => {
                self.notice = None;
                self.session_ended();
            }
            Applied::Nothing => {
                self.notice = None;
                if self.engine.state() != SessionState::Playing {
                    self.last_shot = None;
                }
            }
        }
        true
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = AppDirs::log_path() {
        logging::init_file_logging(&path);
    }

    let storage = Storage::open_default();
    match cli.command.unwrap_or(Command::Play(PlayArgs::default())) {
        Command::Play(args) => play(storage, args),
        Command::Sens(args) => {
            print_sensitivity(&storage, &args);
            Ok(())
        }
        Command::Settings(args) => {
            update_settings(&storage, &args)?;
            Ok(())
        }
        Command::History { csv, limit } => {
            if csv {
                storage.export_csv(io::stdout().lock())?;
            } else {
                print_history(&storage, limit);
            }
            Ok(())
        }
        Command::Export { output } => {
            let now = chrono::Utc::now();
            let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(now.date_naive())));
            fs::write(&path, storage.export_json(now)?)?;
            println!("exported to {}", path.display());
            Ok(())
        }
        Command::Import { path } => {
            let raw = fs::read_to_string(&path)?;
            let summary = storage.import_json(&raw)?;
            println!(
                "imported {} sessions{}",
                summary.sessions_imported,
                if summary.settings_imported {
                    " and settings"
                } else {
                    ""
                }
            );
            Ok(())
        }
        Command::ClearHistory => {
            HistoryStore::clear(&storage);
            println!("history cleared");
            Ok(())
        }
    }
}

fn play(storage: Storage, args: PlayArgs) -> Result<(), Box<dyn Error>> {
    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let rng = match args.seed {
        Some(seed) => RngSource::seeded(seed),
        None => RngSource::from_entropy(),
    };
    let mut engine = SessionEngine::new(storage.clone(), storage, SystemClock, rng).with_config(
        SessionConfig {
            session_length_ms: args.secs.map(|s| s * 1000),
        },
    );
    if let Some(mode) = args.mode {
        engine.set_mode(mode.as_mode())?;
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(engine);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(CrosstermEventSource::new(), FixedTicker::new(FRAME_INTERVAL));
    let size = terminal.size()?;
    app.resize(size.width, size.height);

    loop {
        app.on_frame(runner.frame_dt());
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            AppEvent::Tick => {}
            AppEvent::Resize(cols, rows) => app.resize(cols, rows),
            event => {
                if !app.on_event(&event) {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn print_sensitivity(storage: &Storage, args: &SensArgs) {
    let stored = SettingsStore::load(storage);
    let dpi = args.dpi.unwrap_or(stored.dpi) as f64;
    let source = args.sens.unwrap_or(stored.valorant_sens);
    let sens = convert_sensitivity(source, args.from.as_yaw().degrees_per_count());
    let (low, high) = recommended_range(dpi);

    println!("dpi:          {dpi}");
    if !matches!(args.from, YawArg::Valorant) {
        println!("{} {source} = valorant {sens:.3}", args.from.as_yaw());
    }
    println!("sensitivity:  {sens:.3}");
    println!("eDPI:         {}", format_edpi(dpi, sens));
    println!("cm/360:       {}", format_cm360(dpi, sens));
    println!("in/360:       {:.2}", in_per_360(dpi, sens));
    println!(
        "class:        {}",
        SensitivityClass::from_edpi(dpi * sens)
    );
    println!("recommended:  {low} - {high}");
    for yaw in GameYaw::ALL {
        println!(
            "{:<13} {:.3}",
            format!("{yaw}:"),
            sens * REFERENCE_YAW / yaw.degrees_per_count()
        );
    }
    println!(
        "px per count: {:.4} at {}px",
        web_sensitivity_factor(sens, args.width, REFERENCE_FOV),
        args.width
    );
}

fn update_settings(storage: &Storage, args: &SettingsArgs) -> Result<(), Box<dyn Error>> {
    let mut settings = if args.reset {
        GameSettings::default()
    } else {
        SettingsStore::load(storage)
    };
    if let Some(raw) = &args.dpi {
        settings.apply_dpi_input(raw);
    }
    if let Some(raw) = &args.sens {
        settings.apply_sensitivity_input(raw);
    }
    if let Some(size) = args.size {
        settings.target_size = match size {
            SizeArg::Small => TargetSize::Small,
            SizeArg::Medium => TargetSize::Medium,
            SizeArg::Large => TargetSize::Large,
        };
    }
    if let Some(difficulty) = args.difficulty {
        settings.difficulty = match difficulty {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
        };
    }
    if let Some(color) = &args.crosshair_color {
        settings.crosshair_color = color.clone();
    }

    let changed = args.reset
        || args.dpi.is_some()
        || args.sens.is_some()
        || args.size.is_some()
        || args.difficulty.is_some()
        || args.crosshair_color.is_some();
    if changed {
        SettingsStore::save(storage, &settings);
    }
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

fn print_history(storage: &Storage, limit: usize) {
    let history = storage.load_all();
    let summary = history.summary();
    if summary.total_sessions == 0 {
        println!("no sessions yet");
        return;
    }

    println!(
        "{} sessions, {} total",
        summary.total_sessions,
        format_duration(summary.total_time_ms)
    );
    println!(
        "accuracy: {:.1}% avg, {:.1}% best",
        summary.average_accuracy, summary.best_accuracy
    );
    println!(
        "reaction: {}ms avg, {}ms best",
        summary.average_reaction_time, summary.best_reaction_time
    );
    println!(
        "trend:    accuracy {}, reaction {}",
        trend(&history, TrendMetric::Accuracy, TREND_WINDOW),
        trend(&history, TrendMetric::ReactionTime, TREND_WINDOW)
    );
    println!();

    for s in history.sessions.iter().rev().take(limit) {
        let started = chrono::DateTime::from_timestamp_millis(s.start_time as i64)
            .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "{started}  {:<13} {:>6}  {:>5.1}%  {:>4}ms  {:>5} pts  {}",
            s.mode.config().name,
            format_duration(s.duration),
            s.stats.accuracy,
            s.stats.average_reaction_time,
            s.stats.score,
            s.stats.rating()
        );
    }
}
