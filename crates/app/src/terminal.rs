//! Line-based rendering and command parsing for the terminal front end.

use std::fmt::Write as _;
use std::path::PathBuf;

use quiz_core::format_elapsed;
use quiz_core::model::ConfigPatch;
use services::session::{
    OptionMark, ResultsView, ReviewItem, ReviewStatus, Screen, SetupView, TestView, ViewState,
    WelcomeView,
};
use services::{LoadNotice, QuizEvent};

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Event(QuizEvent),
    Load(PathBuf),
    Help,
    Quit,
    Unknown(String),
}

/// Interpret `line` for the given screen. Option and question numbers are 1-based.
pub fn parse_input(screen: Screen, line: &str) -> Input {
    let line = line.trim();
    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default();
    let rest: Vec<&str> = words.collect();

    match (command, rest.as_slice()) {
        ("q" | "quit", []) => return Input::Quit,
        ("h" | "help" | "?", []) => return Input::Help,
        ("reset", []) => return Input::Event(QuizEvent::Reset),
        _ => {}
    }

    let event = match screen {
        Screen::Welcome => match (command, rest.as_slice()) {
            ("s" | "setup", []) => Some(QuizEvent::OpenSetup),
            _ => None,
        },
        Screen::Setup => match (command, rest.as_slice()) {
            ("load", [_, ..]) => return Input::Load(PathBuf::from(rest.join(" "))),
            ("count", [n]) => n
                .parse()
                .ok()
                .map(|n| QuizEvent::SetConfig(ConfigPatch::number_of_questions(n))),
            ("from", [n]) => n
                .parse()
                .ok()
                .map(|n| QuizEvent::SetConfig(ConfigPatch::start_from(n))),
            ("random", [flag]) => parse_flag(flag).map(|on| QuizEvent::SetConfig(ConfigPatch::randomize(on))),
            ("start", []) => Some(QuizEvent::StartTest),
            ("back", []) => Some(QuizEvent::CancelSetup),
            _ => None,
        },
        Screen::Test => match (command, rest.as_slice()) {
            ("" | "c" | "confirm", []) => Some(QuizEvent::ConfirmAnswer),
            ("n" | "next", []) => Some(QuizEvent::Next),
            ("p" | "prev", []) => Some(QuizEvent::Previous),
            ("g" | "goto", [n]) => parse_position(n).map(QuizEvent::Navigate),
            ("f" | "finish", []) => Some(QuizEvent::FinishTest),
            (n, []) => parse_position(n).map(QuizEvent::SelectOption),
            _ => None,
        },
        Screen::Results => match (command, rest.as_slice()) {
            ("r" | "review", []) => Some(QuizEvent::ToggleReview),
            ("n" | "next", []) => Some(QuizEvent::Next),
            ("p" | "prev", []) => Some(QuizEvent::Previous),
            ("g" | "goto", [n]) => parse_position(n).map(QuizEvent::Navigate),
            ("new", []) => Some(QuizEvent::Reset),
            _ => None,
        },
    };

    event.map_or_else(|| Input::Unknown(line.to_owned()), Input::Event)
}

fn parse_position(raw: &str) -> Option<usize> {
    raw.parse::<usize>().ok()?.checked_sub(1)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw {
        "on" | "yes" | "true" | "1" => Some(true),
        "off" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

#[must_use]
pub fn help(screen: Screen) -> &'static str {
    match screen {
        Screen::Welcome => "setup | quit",
        Screen::Setup => "load <path> | count <n> | from <n> | random on|off | start | back | reset | quit",
        Screen::Test => "<option number> | confirm (empty line) | next | prev | goto <n> | finish | reset | quit",
        Screen::Results => "review | next | prev | goto <n> | new | quit",
    }
}

#[must_use]
pub fn render_notice(notice: &LoadNotice) -> String {
    let marker = if notice.is_error() { "!!" } else { "ok" };
    format!("[{marker}] {}\n     {}", notice.title, notice.message)
}

#[must_use]
pub fn render(view: &ViewState) -> String {
    match view {
        ViewState::Welcome(welcome) => render_welcome(welcome),
        ViewState::Setup(setup) => render_setup(setup),
        ViewState::Test(test) => render_test(test),
        ViewState::Results(results) => render_results(results),
    }
}

fn render_welcome(view: &WelcomeView) -> String {
    let mut out = String::from("== Quiz ==\n");
    if let Some(bank) = &view.bank {
        let _ = writeln!(out, "Loaded: {} ({} questions)", bank.title, bank.question_count);
    }
    out.push_str("Type `setup` to choose a test.\n");
    out
}

fn render_setup(view: &SetupView) -> String {
    let mut out = String::from("== Setup ==\n");
    match &view.bank {
        Some(bank) => {
            let _ = writeln!(out, "{} ({} questions)", bank.title, bank.question_count);
            if !bank.description.is_empty() {
                let _ = writeln!(out, "{}", bank.description);
            }
        }
        None => out.push_str("No test loaded. Use `load <path>`.\n"),
    }
    let config = &view.config;
    let _ = writeln!(
        out,
        "count: {}  from: {}  random: {}",
        config.number_of_questions,
        config.start_from,
        if config.randomize { "on" } else { "off" }
    );
    if view.bank.is_some() {
        let _ = writeln!(out, "Questions in this run: {}", view.expected_questions);
    }
    out
}

fn render_test(view: &TestView) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "== {} == Question {}/{}  answered {} ({}%)  time {}",
        view.title,
        view.index + 1,
        view.total,
        view.answered(),
        view.progress.percent_answered,
        format_elapsed(view.elapsed_secs)
    );

    let cells: Vec<String> = view
        .navigator
        .iter()
        .map(|cell| {
            let mark = match (cell.current, cell.answered) {
                (true, _) => '>',
                (false, true) => '*',
                (false, false) => ' ',
            };
            format!("{mark}{}", cell.index + 1)
        })
        .collect();
    let _ = writeln!(out, "[{}]", cells.join(" "));

    let _ = writeln!(out, "\n{}", view.question.prompt());
    for (index, option) in view.question.options().iter().enumerate() {
        let picked = if view.selection == Some(index) { "(x)" } else { "( )" };
        let _ = writeln!(out, "  {picked} {}. {option}", index + 1);
    }
    if view.can_confirm() {
        let action = if view.has_answered_current { "update" } else { "confirm" };
        let _ = writeln!(out, "Press enter to {action} your answer.");
    }
    out
}

fn render_results(view: &ResultsView) -> String {
    let results = view.summary.results;
    let mut out = String::new();
    let _ = writeln!(out, "== {} == Results", view.title);
    let _ = writeln!(
        out,
        "Score: {}/{} ({}%)  grade {}  {}",
        results.correct_count(),
        results.total_questions(),
        results.percentage(),
        results.grade(),
        if results.passed() { "passed" } else { "not passed" }
    );
    let _ = writeln!(
        out,
        "Answered {} of {} in {}",
        results.answered_count(),
        results.total_questions(),
        format_elapsed(view.summary.duration_secs)
    );

    let statuses: Vec<String> = view
        .statuses
        .iter()
        .enumerate()
        .map(|(index, status)| format!("{}{}", index + 1, status_mark(*status)))
        .collect();
    let _ = writeln!(out, "[{}]", statuses.join(" "));

    if let Some(item) = &view.review {
        render_review(&mut out, item);
    }
    out
}

fn render_review(out: &mut String, item: &ReviewItem) {
    let _ = writeln!(
        out,
        "\nReview {}/{}: {}",
        item.index + 1,
        item.total,
        item.question.prompt()
    );
    for option in &item.options {
        let mark = match option.mark {
            OptionMark::CorrectOption => "ok",
            OptionMark::WrongSelected => "xx",
            OptionMark::Neutral => "  ",
        };
        let _ = writeln!(out, "  {mark} {}. {}", option.index + 1, option.text);
    }
    if item.status == ReviewStatus::Unanswered {
        out.push_str("  (not answered)\n");
    }
    if let Some(explanation) = item.question.explanation() {
        let _ = writeln!(out, "  Explanation: {explanation}");
    }
}

fn status_mark(status: ReviewStatus) -> char {
    match status {
        ReviewStatus::Correct => '+',
        ReviewStatus::Incorrect => '-',
        ReviewStatus::Unanswered => '?',
    }
}
