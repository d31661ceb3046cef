use clap::{Parser, Subcommand};
use focus_core::export::{cleanup_processed, export_csv};
use focus_core::*;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::{self, Sender};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "focus")]
#[command(about = "Pomodoro focus timer with a to-do list", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the timer interactively (default)
    Run(RunArgs),

    /// Show or change interval lengths
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },

    /// Manage the to-do list
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Show today's completed intervals
    Stats,

    /// Export the completion log to CSV
    Export {
        /// Delete archived logs after exporting
        #[arg(long)]
        cleanup: bool,
    },
}

#[derive(clap::Args, Default)]
struct RunArgs {
    /// Mode to begin in (work, short-break, long-break)
    #[arg(long, value_parser = parse_mode)]
    mode: Option<Mode>,

    /// Exit after this many completed intervals
    #[arg(long)]
    intervals: Option<u32>,

    /// Start right away and start each next interval automatically
    #[arg(long)]
    auto_continue: bool,

    /// Never post desktop notifications
    #[arg(long)]
    no_notify: bool,

    /// No completion sound
    #[arg(long)]
    mute: bool,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the current interval lengths
    Show,

    /// Change interval lengths; unspecified values are kept
    Set {
        /// Work interval in minutes (1-60)
        #[arg(long)]
        work: Option<u32>,

        /// Short break in minutes (1-30)
        #[arg(long)]
        short_break: Option<u32>,

        /// Long break in minutes (1-60)
        #[arg(long)]
        long_break: Option<u32>,

        /// Work intervals before a long break (2-10)
        #[arg(long)]
        long_break_interval: Option<u32>,
    },
}

#[derive(Subcommand)]
enum TaskAction {
    /// Add a task
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// List tasks in the order they were added
    List,

    /// Mark a task done, or open again
    Toggle { id: u64 },

    /// Delete a task
    Rm { id: u64 },
}

fn parse_mode(s: &str) -> std::result::Result<Mode, String> {
    s.parse::<Mode>().map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    focus_core::logging::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.data.data_dir.clone());
    let store = Store::new(data_dir);

    match cli.command {
        Some(Commands::Run(args)) => cmd_run(store, &config, args),
        Some(Commands::Settings { action }) => cmd_settings(store, action),
        Some(Commands::Task { action }) => cmd_task(store, action),
        Some(Commands::Stats) => cmd_stats(&store),
        Some(Commands::Export { cleanup }) => cmd_export(&store, cleanup),
        None => cmd_run(store, &config, RunArgs::default()),
    }
}

/// A timer with no side effects, for the bookkeeping commands
fn open_quiet(store: Store) -> Result<FocusTimer> {
    let notifier = CompletionNotifier::new(Box::new(SilentCue), Box::new(NullNotifier));
    FocusTimer::open(store, notifier)
}

// ============================================================================
// run
// ============================================================================

enum UiEvent {
    Timer(TickerEvent),
    Input(String),
    InputClosed,
}

enum Action {
    Start,
    Pause,
    Reset,
    Switch(Mode),
    ToggleNotifications,
    Quit,
}

fn parse_action(line: &str) -> Option<Action> {
    match line.trim().to_lowercase().as_str() {
        "s" | "start" => Some(Action::Start),
        "p" | "pause" => Some(Action::Pause),
        "r" | "reset" => Some(Action::Reset),
        "w" | "work" => Some(Action::Switch(Mode::Work)),
        "b" | "break" => Some(Action::Switch(Mode::ShortBreak)),
        "l" | "long" => Some(Action::Switch(Mode::LongBreak)),
        "n" | "notify" => Some(Action::ToggleNotifications),
        "q" | "quit" | "exit" => Some(Action::Quit),
        _ => None,
    }
}

fn cmd_run(store: Store, config: &Config, args: RunArgs) -> Result<()> {
    let cue: Box<dyn AudioCue> = if args.mute {
        Box::new(SilentCue)
    } else {
        config.sound.build_cue()
    };
    let sink: Box<dyn NotificationSink> = if args.no_notify {
        Box::new(NullNotifier)
    } else {
        Box::new(DesktopNotifier::new(&config.notifications.app_name))
    };

    let mut timer = FocusTimer::open(store, CompletionNotifier::new(cue, sink))?;
    let permission = timer.negotiate_notifications(config.notifications.enabled && !args.no_notify);
    tracing::info!("Notifications: {:?}", permission);
    if let Some(mode) = args.mode {
        timer.switch_mode(mode);
    }

    let (tx, rx) = mpsc::channel::<UiEvent>();
    let timer_tx = Mutex::new(tx.clone());
    let mut service = TimerService::new(
        timer,
        Duration::from_millis(config.timer.tick_millis),
        move |event| {
            if let Ok(tx) = timer_tx.lock() {
                let _ = tx.send(UiEvent::Timer(event));
            }
        },
    );
    spawn_input_reader(tx);

    println!("Commands: s start  p pause  r reset  w/b/l switch mode  n notifications  q quit");
    if args.auto_continue {
        service.start();
    }
    render(&service.snapshot());

    let mut completed = 0u32;
    while let Ok(event) = rx.recv() {
        match event {
            UiEvent::Timer(TickerEvent::Tick(reported)) => render(&live_view(&service, reported)),
            UiEvent::Timer(TickerEvent::Completed(event)) => {
                completed += 1;
                println!();
                println!("✓ {} finished, next: {}", event.finished.title(), event.next.title());
                if args.intervals.is_some_and(|n| completed >= n) {
                    break;
                }
                if args.auto_continue {
                    service.start();
                }
                render(&service.snapshot());
            }
            UiEvent::Input(line) => match parse_action(&line) {
                Some(Action::Quit) => break,
                Some(action) => {
                    apply_action(&mut service, action);
                    render(&service.snapshot());
                }
                None if line.trim().is_empty() => render(&service.snapshot()),
                None => println!("Unknown command: {}", line.trim()),
            },
            UiEvent::InputClosed => {
                if !args.auto_continue {
                    break;
                }
            }
        }
    }

    service.shutdown();
    let summary = service.snapshot();
    println!();
    println!("Completed intervals: {}", summary.completed_work_intervals);
    println!("Focused minutes: {}", summary.total_focused_minutes);
    Ok(())
}

fn apply_action(service: &mut TimerService, action: Action) {
    match action {
        Action::Start => {
            service.start();
        }
        Action::Pause => service.pause(),
        Action::Reset => service.reset_current_mode(),
        Action::Switch(mode) => service.switch_mode(mode),
        Action::ToggleNotifications => {
            match service.with_timer(|t| t.toggle_notifications()) {
                NotificationToggle::Enabled => println!("Notifications on"),
                NotificationToggle::Disabled => println!("Notifications off"),
                NotificationToggle::Blocked => println!(
                    "Notifications are blocked. Enable them in your system settings."
                ),
            }
        }
        Action::Quit => {}
    }
}

fn spawn_input_reader(tx: Sender<UiEvent>) {
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(UiEvent::Input(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(UiEvent::InputClosed);
    });
}

/// A tick queued just before a pause, reset or switch is already stale
/// when it arrives; show the timer as it is now.
fn live_view(service: &TimerService, reported: TimerSnapshot) -> TimerSnapshot {
    let live = service.snapshot();
    if live != reported {
        tracing::debug!("Dropping stale tick: {:?}", reported);
    }
    live
}

fn status_line(snapshot: &TimerSnapshot) -> String {
    let state = if snapshot.is_running { "running" } else { "paused" };
    format!(
        "{:<11} {}  [{}]  done: {}",
        snapshot.mode.title(),
        format_clock(snapshot.time_left),
        state,
        snapshot.completed_work_intervals
    )
}

fn render(snapshot: &TimerSnapshot) {
    print!("\r{}   ", status_line(snapshot));
    let _ = io::stdout().flush();
}

// ============================================================================
// settings / task / stats / export
// ============================================================================

fn cmd_settings(store: Store, action: Option<SettingsAction>) -> Result<()> {
    let mut timer = open_quiet(store)?;

    if let Some(SettingsAction::Set {
        work,
        short_break,
        long_break,
        long_break_interval,
    }) = action
    {
        let updated = timer.config().with_edit(DurationEdit {
            work_minutes: work,
            short_break_minutes: short_break,
            long_break_minutes: long_break,
            long_break_interval,
        })?;
        timer.save_config(updated)?;
        println!("✓ Settings saved");
    }

    let config = timer.config();
    println!("Work:                {} min", config.work_minutes());
    println!("Short break:         {} min", config.short_break_minutes());
    println!("Long break:          {} min", config.long_break_minutes());
    println!("Long break every:    {} work intervals", config.long_break_interval());
    Ok(())
}

fn cmd_task(store: Store, action: TaskAction) -> Result<()> {
    let mut timer = open_quiet(store)?;

    match action {
        TaskAction::Add { text } => match timer.add_task(&text.join(" "))? {
            Some(id) => println!("✓ Added task {}", id),
            None => eprintln!("Nothing added: task text is empty"),
        },
        TaskAction::List => {
            if timer.tasks().is_empty() {
                println!("No tasks yet. Add one with `focus task add`.");
            }
            for task in timer.tasks() {
                let mark = if task.completed { "x" } else { " " };
                println!("{}  [{}] {}", task.id, mark, task.text);
            }
        }
        TaskAction::Toggle { id } => {
            if timer.toggle_task(id)? {
                println!("✓ Toggled task {}", id);
            } else {
                eprintln!("No task with id {}", id);
            }
        }
        TaskAction::Rm { id } => {
            if timer.delete_task(id)? {
                println!("✓ Deleted task {}", id);
            } else {
                eprintln!("No task with id {}", id);
            }
        }
    }
    Ok(())
}

fn cmd_stats(store: &Store) -> Result<()> {
    let records = read_completions(&store.completions_path())?;
    let today = chrono::Local::now().date_naive();
    let summary = summarize_day(&records, today);

    println!("Today ({})", today);
    println!("  Work intervals:  {}", summary.work_intervals);
    println!("  Focused minutes: {}", summary.focused_minutes);
    println!("  Breaks taken:    {}", summary.breaks);
    Ok(())
}

fn cmd_export(store: &Store, cleanup: bool) -> Result<()> {
    let csv_path = store.completions_csv_path();
    let count = export_csv(&store.completions_path(), &csv_path)?;
    if count == 0 {
        println!("No new completions - nothing to export.");
    } else {
        println!("✓ Exported {} completions to CSV", count);
        println!("  CSV: {}", csv_path.display());
    }

    if cleanup {
        let cleaned = cleanup_processed(store.data_dir())?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} archived logs", cleaned);
        }
    }
    Ok(())
}
