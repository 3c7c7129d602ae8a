use std::fmt;
use std::io::Write as _;
use std::path::PathBuf;

use quiz_core::format_elapsed;
use quiz_core::model::{QuizSettingsDraft, SessionConfig};
use services::{Clock, Dispatch, FileSource, LoadNotice, QuizMachine, SessionError};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

mod terminal;

use terminal::{Input, help, parse_input, render, render_notice};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidCount { raw: String },
    InvalidStart { raw: String },
    InvalidFlag { name: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCount { raw } => write!(f, "invalid --count value: {raw}"),
            ArgsError::InvalidStart { raw } => write!(f, "invalid --start value: {raw}"),
            ArgsError::InvalidFlag { name, raw } => write!(f, "invalid {name} value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--file <path>] [--count <n>] [--start <n>] [--randomize]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --count 10");
    eprintln!("  --start 1");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_FILE, QUIZ_COUNT, QUIZ_START, QUIZ_RANDOMIZE, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Run(Args),
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    file: Option<PathBuf>,
    config: SessionConfig,
}

impl Args {
    /// Parse flags, falling back to `env` for anything not given.
    fn parse(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Command, ArgsError> {
        let mut file = env("QUIZ_FILE")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let mut config = SessionConfig::default();
        if let Some(raw) = env("QUIZ_COUNT") {
            config.number_of_questions = parse_count(raw)?;
        }
        if let Some(raw) = env("QUIZ_START") {
            config.start_from = parse_start(raw)?;
        }
        if let Some(raw) = env("QUIZ_RANDOMIZE") {
            config.randomize = parse_bool(raw)?;
        }

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--file" => file = Some(PathBuf::from(require_value(args, "--file")?)),
                "--count" => config.number_of_questions = parse_count(require_value(args, "--count")?)?,
                "--start" => config.start_from = parse_start(require_value(args, "--start")?)?,
                "--randomize" => config.randomize = true,
                "--help" | "-h" => return Ok(Command::Help),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Command::Run(Self { file, config }))
    }
}

fn parse_count(raw: String) -> Result<usize, ArgsError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ArgsError::InvalidCount { raw }),
    }
}

fn parse_start(raw: String) -> Result<usize, ArgsError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ArgsError::InvalidStart { raw }),
    }
}

fn parse_bool(raw: String) -> Result<bool, ArgsError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ArgsError::InvalidFlag {
            name: "QUIZ_RANDOMIZE",
            raw,
        }),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn show(text: &str) {
    let mut stdout = std::io::stdout();
    let _ = write!(stdout, "{text}");
    let _ = stdout.flush();
}

/// Read one line, redrawing the timer on every tick while a test runs.
async fn read_line(
    lines: &mut Lines<BufReader<Stdin>>,
    ticks: Option<watch::Receiver<u64>>,
) -> std::io::Result<Option<String>> {
    let Some(mut ticks) = ticks else {
        return lines.next_line().await;
    };
    loop {
        tokio::select! {
            line = lines.next_line() => return line,
            changed = ticks.changed() => {
                if changed.is_err() {
                    return lines.next_line().await;
                }
                let elapsed = *ticks.borrow_and_update();
                show(&format!("\r[{}] > ", format_elapsed(elapsed)));
            }
        }
    }
}

fn report(result: Result<Dispatch, SessionError>) {
    match result {
        Ok(Dispatch::Loaded(notice)) => println!("{}", render_notice(&notice)),
        Ok(Dispatch::Applied) => {}
        Ok(Dispatch::Ignored(reason)) => println!("({reason})"),
        Err(err @ (SessionError::Load(_) | SessionError::Source(_))) => {
            println!("{}", render_notice(&LoadNotice::from_error(&err)));
        }
        Err(err) => println!("error: {err}"),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = match Args::parse(&mut argv, |key| std::env::var(key).ok()) {
        Ok(Command::Run(parsed)) => parsed,
        Ok(Command::Help) => {
            print_usage();
            return Ok(());
        }
        Err(e) => {
            eprintln!("{e}");
            print_usage();
            return Err(e.into());
        }
    };

    let settings = QuizSettingsDraft {
        default_config: Some(parsed.config),
        ..QuizSettingsDraft::new()
    }
    .validate()?;
    tracing::debug!(file = ?parsed.file, config = ?parsed.config, "starting quiz");
    let mut machine = QuizMachine::new(Clock::System, settings);

    if let Some(path) = &parsed.file {
        machine.open_setup();
        report(machine.upload_from(&FileSource::new(path)).await);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        show(&format!("\n{}> ", render(&machine.view())));
        let Some(line) = read_line(&mut lines, machine.elapsed_updates()).await? else {
            break;
        };

        match parse_input(machine.screen(), &line) {
            Input::Event(event) => report(machine.dispatch(event)),
            Input::Load(path) => report(machine.upload_from(&FileSource::new(path)).await),
            Input::Help => println!("{}", help(machine.screen())),
            Input::Quit => break,
            Input::Unknown(raw) => println!("unknown command: {raw} (try `help`)"),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
