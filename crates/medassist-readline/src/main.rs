use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing_subscriber::EnvFilter;

use medassist_application::surfaces::DISCLAIMER;
use medassist_application::{
    AnalysisView, AssistantChat, COMMON_SYMPTOMS, FloatingAssistant, PanelState, SymptomChecker,
    TurnOutcome,
};
use medassist_core::SessionError;
use medassist_core::session::ConversationState;
use medassist_core::settings::ClientSettings;
use medassist_interaction::{GeminiBackend, resolve_credentials};

const COMMANDS: &[&str] = &[
    "/chat", "/symptoms", "/floating", "/list", "/toggle", "/analyze", "/reset", "/open",
    "/minimize", "/close", "/status", "/help",
];

const TOGGLE_PREFIX: &str = "/toggle ";

/// Canonical spelling of a known symptom, matched case-insensitively.
fn known_symptom(name: &str) -> Option<&'static str> {
    let name = name.trim();
    COMMON_SYMPTOMS
        .iter()
        .copied()
        .find(|symptom| symptom.eq_ignore_ascii_case(name))
}

/// Line editor helper: completes and hints commands and symptom names.
#[derive(Clone, Copy)]
struct CliHelper;

impl CliHelper {
    /// Start of the word being completed and the values it may become.
    fn candidates(line: &str) -> (usize, Vec<&'static str>) {
        if let Some(partial) = line.strip_prefix(TOGGLE_PREFIX) {
            let partial = partial.to_lowercase();
            let symptoms = COMMON_SYMPTOMS
                .iter()
                .copied()
                .filter(|symptom| symptom.to_lowercase().starts_with(&partial))
                .collect();
            return (TOGGLE_PREFIX.len(), symptoms);
        }
        if line.starts_with('/') && !line.contains(' ') {
            let commands = COMMANDS
                .iter()
                .copied()
                .filter(|command| command.starts_with(line))
                .collect();
            return (0, commands);
        }
        (0, Vec::new())
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, values) = Self::candidates(&line[..pos]);
        let pairs = values
            .into_iter()
            .map(|value| Pair {
                display: value.to_string(),
                replacement: value.to_string(),
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        match line.strip_prefix(TOGGLE_PREFIX) {
            Some(argument) if known_symptom(argument).is_some() => Owned(format!(
                "{}{}",
                TOGGLE_PREFIX.bright_cyan(),
                argument.green()
            )),
            _ if line.starts_with('/') => Owned(line.bright_cyan().to_string()),
            _ => Borrowed(line),
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    /// Suggests the rest of the first matching command or symptom.
    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        let (start, values) = Self::candidates(line);
        let typed = line.len() - start;
        values
            .first()
            .and_then(|value| value.get(typed..))
            .filter(|rest| !rest.is_empty())
            .map(str::to_string)
    }
}

impl Validator for CliHelper {}

/// Surface that plain input lines are sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveSurface {
    Chat,
    Symptoms,
    Floating,
}

impl ActiveSurface {
    fn prompt(self) -> &'static str {
        match self {
            Self::Chat => "chat>> ",
            Self::Symptoms => "symptoms>> ",
            Self::Floating => "floating>> ",
        }
    }
}

struct Surfaces {
    chat: AssistantChat,
    symptoms: SymptomChecker,
    floating: FloatingAssistant,
}

impl Surfaces {
    fn mount(backend: &GeminiBackend) -> Self {
        let credentials = backend.credentials().clone();
        Self {
            chat: AssistantChat::mount(Arc::new(backend.start_session()), credentials.clone()),
            symptoms: SymptomChecker::mount(
                Arc::new(backend.start_session()),
                credentials.clone(),
            ),
            floating: FloatingAssistant::mount(Arc::new(backend.start_session()), credentials),
        }
    }
}

fn print_outcome(outcome: Result<TurnOutcome, SessionError>) {
    match outcome {
        Ok(TurnOutcome::Replied(turn)) => {
            for line in turn.content.lines() {
                println!("{}", line.bright_blue());
            }
        }
        Ok(TurnOutcome::CredentialsMissing(turn)) => println!("{}", turn.content.yellow()),
        Ok(TurnOutcome::Failed { notice, error }) => {
            println!("{}", notice.content.red());
            println!("{}", format!("({})", error).bright_black());
        }
        Ok(TurnOutcome::Discarded) => {}
        Err(SessionError::Busy) => println!("{}", "Still waiting for the last reply.".yellow()),
        Err(SessionError::EmptyInput) => {
            println!("{}", "Nothing to send.".bright_black())
        }
        Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
    }
}

fn print_analysis(view: Option<AnalysisView>) {
    match view {
        Some(AnalysisView::Sections(sections)) => {
            println!("{}", "Analysis Summary".bright_magenta().bold());
            for (title, body) in sections.iter() {
                println!("{}", title.bright_yellow());
                for line in body.lines() {
                    println!("  {}", line.bright_blue());
                }
            }
            println!("{}", DISCLAIMER.yellow());
        }
        Some(AnalysisView::Raw(text)) => {
            for line in text.lines() {
                println!("{}", line.bright_blue());
            }
        }
        None => println!("{}", "No analysis yet.".bright_black()),
    }
}

fn print_status(label: &str, state: &ConversationState) {
    println!(
        "{}",
        format!(
            "[{}] {:?}, {} turns{}",
            label,
            state.status,
            state.turns.len(),
            state
                .last_error
                .as_ref()
                .map(|e| format!(", last error: {}", e))
                .unwrap_or_default()
        )
        .bright_black()
    );
}

fn print_help() {
    println!("{}", "/chat, /symptoms, /floating   switch surface".bright_black());
    println!("{}", "/list, /toggle <symptom>, /analyze   symptom form".bright_black());
    println!("{}", "/open, /minimize, /close   floating panel".bright_black());
    println!("{}", "/reset, /status, /help, quit".bright_black());
}

/// Loads settings, falling back to defaults when the file is invalid.
fn load_settings() -> ClientSettings {
    ClientSettings::load_default().unwrap_or_else(|e| {
        tracing::warn!("Ignoring settings file: {}", e);
        ClientSettings::default()
    })
}

/// The main entry point for the medassist REPL.
///
/// Resolves credentials once, mounts the three surfaces with their own
/// sessions, then routes each input line to the active surface.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // ===== Backend Initialization =====
    let resolved = resolve_credentials();
    let mut settings = load_settings();
    if let Some(model) = resolved.model_override.clone() {
        settings = settings.with_model(model);
    }
    let backend = GeminiBackend::new(resolved.credentials, settings);
    let mut surfaces = Surfaces::mount(&backend);

    // ===== REPL Setup =====
    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper));

    println!("{}", "=== medassist ===".bright_magenta().bold());
    if let Some(banner) = surfaces.floating.credentials_banner() {
        println!("{}", banner.yellow());
    }
    println!("{}", "Type '/help' for commands or 'quit' to exit.".bright_black());
    for turn in surfaces.chat.transcript().await.turns {
        println!("{}", turn.content.bright_blue());
    }
    println!();

    let mut active = ActiveSurface::Chat;

    // ===== Main REPL Loop =====
    loop {
        let readline = rl.readline(active.prompt());

        match readline {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                let (command, argument) = trimmed
                    .split_once(' ')
                    .map(|(c, a)| (c, a.trim()))
                    .unwrap_or((trimmed, ""));

                match command {
                    "/chat" => active = ActiveSurface::Chat,
                    "/symptoms" => active = ActiveSurface::Symptoms,
                    "/floating" => active = ActiveSurface::Floating,
                    "/help" => print_help(),
                    "/list" => {
                        for symptom in COMMON_SYMPTOMS {
                            let selected = surfaces
                                .symptoms
                                .selected_symptoms()
                                .iter()
                                .any(|s| s == symptom);
                            let marker = if selected { "[x]" } else { "[ ]" };
                            println!("{} {}", marker.green(), symptom);
                        }
                    }
                    "/toggle" if argument.is_empty() => {
                        println!("{}", "Usage: /toggle <symptom>".bright_black());
                    }
                    "/toggle" => {
                        let symptom = known_symptom(argument).unwrap_or(argument);
                        let selected = surfaces.symptoms.toggle_symptom(symptom);
                        let verb = if selected { "Selected" } else { "Deselected" };
                        println!("{}", format!("{} {}", verb, symptom).green());
                    }
                    "/analyze" => {
                        println!("{}", "Analyzing symptoms...".bright_black());
                        print_outcome(surfaces.symptoms.analyze().await);
                        print_analysis(surfaces.symptoms.latest_analysis().await);
                    }
                    "/reset" => {
                        match active {
                            ActiveSurface::Chat => surfaces.chat.conversation().reset().await,
                            ActiveSurface::Symptoms => surfaces.symptoms.clear().await,
                            ActiveSurface::Floating => {
                                println!(
                                    "{}",
                                    "The floating panel keeps its conversation.".bright_black()
                                );
                                continue;
                            }
                        }
                        println!("{}", "Conversation cleared.".green());
                    }
                    "/open" => surfaces.floating.open(),
                    "/minimize" => surfaces.floating.toggle_minimize(),
                    "/close" => surfaces.floating.close(),
                    "/status" => {
                        print_status("chat", &surfaces.chat.transcript().await);
                        print_status("symptoms", &surfaces.symptoms.transcript().await);
                        print_status("floating", &surfaces.floating.transcript().await);
                        println!(
                            "{}",
                            format!("floating panel: {:?}", surfaces.floating.panel_state())
                                .bright_black()
                        );
                    }
                    _ if command.starts_with('/') => {
                        println!("{}", "Unknown command".bright_black());
                    }
                    _ => match active {
                        ActiveSurface::Chat => print_outcome(surfaces.chat.send(trimmed).await),
                        ActiveSurface::Symptoms => {
                            surfaces.symptoms.set_description(trimmed);
                            print_outcome(surfaces.symptoms.analyze().await);
                            print_analysis(surfaces.symptoms.latest_analysis().await);
                        }
                        ActiveSurface::Floating => {
                            if surfaces.floating.panel_state() == PanelState::Open {
                                print_outcome(surfaces.floating.send(trimmed).await);
                            } else {
                                println!(
                                    "{}",
                                    "The assistant panel is not open. Type /open first."
                                        .bright_black()
                                );
                            }
                        }
                    },
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}
