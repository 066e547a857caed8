//! Line-oriented terminal front-end.
//!
//! Lines starting with `/` are commands; everything else is an utterance
//! routed through the [`FeatureRouter`]. On a terminal the loop runs under
//! a rustyline editor with history and `/` command completion.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use chrono::Local;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use nlpbot_chat::{FeatureRouter, ResponseContext, Session, Turn};
use nlpbot_core::{Mode, Role};

use crate::transcript::{self, NOTHING_TO_SAVE};

const HELP: &str = "Commands:
  /mode <name>      switch mode (chat, sentiment_analysis, text_summarization, entity_recognition)
  /modes            list available modes
  /name [name]      set or clear your display name
  /details on|off   show or hide technical details
  /clear            clear the conversation
  /save [dir]       save the conversation as JSON
  /history          show the conversation so far
  /help             show this help
  /quit             exit";

/// Command names offered by tab completion.
pub const COMMAND_NAMES: [&str; 10] = [
    "/mode", "/modes", "/name", "/details", "/clear", "/save", "/history", "/help", "/quit",
    "/exit",
];

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mode(Mode),
    Modes,
    Name(Option<String>),
    Details(bool),
    Clear,
    Save(Option<PathBuf>),
    History,
    Help,
    Quit,
}

/// Parse a slash command.
///
/// Returns `None` if `line` is not a command, and `Some(Err(message))` if it
/// is a malformed one.
pub fn parse_command(line: &str) -> Option<Result<Command, String>> {
    let line = line.trim();
    let rest = line.strip_prefix('/')?;
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match name.to_lowercase().as_str() {
        "mode" if arg.is_empty() => Err("Usage: /mode <name>. Try /modes.".to_string()),
        "mode" => arg.parse().map(Command::Mode).map_err(|e| e.to_string()),
        "modes" => Ok(Command::Modes),
        "name" if arg.is_empty() => Ok(Command::Name(None)),
        "name" => Ok(Command::Name(Some(arg.to_string()))),
        "details" => match arg.to_lowercase().as_str() {
            "on" => Ok(Command::Details(true)),
            "off" => Ok(Command::Details(false)),
            _ => Err("Usage: /details on|off".to_string()),
        },
        "clear" => Ok(Command::Clear),
        "save" if arg.is_empty() => Ok(Command::Save(None)),
        "save" => Ok(Command::Save(Some(PathBuf::from(arg)))),
        "history" => Ok(Command::History),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("Unknown command '/{}'. Type /help for commands.", other)),
    };
    Some(command)
}

// ============================================================================
// Line editor helper
// ============================================================================

/// Completes command names, mode labels after `/mode`, and `on|off` after
/// `/details`.
#[derive(Debug, Clone, Default)]
pub struct CommandCompleter;

impl CommandCompleter {
    /// Candidates for the text before the cursor, with the byte offset the
    /// replacement starts at.
    pub fn candidates(&self, line: &str) -> (usize, Vec<String>) {
        if !line.starts_with('/') {
            return (0, Vec::new());
        }

        let Some((name, arg)) = line.split_once(' ') else {
            let names = COMMAND_NAMES
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| cmd.to_string())
                .collect();
            return (0, names);
        };

        let start = line.len() - arg.len();
        let options: Vec<String> = match name {
            "/mode" => Mode::ALL.iter().map(|m| m.to_string()).collect(),
            "/details" => vec!["on".to_string(), "off".to_string()],
            _ => Vec::new(),
        };
        let matches = options.into_iter().filter(|o| o.starts_with(arg)).collect();
        (start, matches)
    }
}

impl Helper for CommandCompleter {}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, names) = self.candidates(&line[..pos]);
        let pairs = names
            .into_iter()
            .map(|name| Pair {
                display: name.clone(),
                replacement: name,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return None;
        }
        COMMAND_NAMES
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Highlighter for CommandCompleter {}

impl Validator for CommandCompleter {}

// ============================================================================
// Loop
// ============================================================================

/// Whether the loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Interactive session state owned by the terminal front-end.
pub struct Repl {
    router: FeatureRouter,
    session: Session,
    name: Option<String>,
    show_details: bool,
    transcript_dir: PathBuf,
}

impl Repl {
    pub fn new(
        router: FeatureRouter,
        session: Session,
        name: Option<String>,
        transcript_dir: PathBuf,
    ) -> Self {
        Self {
            router,
            session,
            name,
            show_details: false,
            transcript_dir,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Read from the terminal until EOF or `/quit`.
    ///
    /// Ctrl-C discards the current line; Ctrl-D exits.
    pub fn run_interactive(&mut self) -> Result<(), ReadlineError> {
        let mut editor = Editor::new()?;
        editor.set_helper(Some(CommandCompleter));

        let mut stdout = io::stdout();
        self.banner(&mut stdout)?;

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        editor.add_history_entry(line.as_str())?;
                    }
                    if self.process_line(&line, &mut stdout)? == Flow::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    writeln!(stdout, "Type /quit to exit.")?;
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Read lines from `input` until EOF or `/quit`.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> io::Result<()> {
        self.banner(output)?;
        prompt(output)?;

        for line in input.lines() {
            let line = line?;
            if self.process_line(&line, output)? == Flow::Exit {
                break;
            }
            prompt(output)?;
        }
        Ok(())
    }

    fn banner<W: Write>(&self, output: &mut W) -> io::Result<()> {
        writeln!(
            output,
            "NLPBot ready in {} mode. Type /help for commands.",
            self.session.mode().display_name()
        )
    }

    /// Handle one input line.
    pub fn process_line<W: Write>(&mut self, line: &str, output: &mut W) -> io::Result<Flow> {
        match parse_command(line) {
            Some(Ok(command)) => self.execute(command, output),
            Some(Err(message)) => {
                writeln!(output, "{}", message)?;
                Ok(Flow::Continue)
            }
            None if line.trim().is_empty() => Ok(Flow::Continue),
            None => {
                self.converse(line.trim(), output)?;
                Ok(Flow::Continue)
            }
        }
    }

    fn converse<W: Write>(&mut self, utterance: &str, output: &mut W) -> io::Result<()> {
        let context = ResponseContext::new(self.name.clone(), Local::now());
        let turn = self.router.handle(&mut self.session, utterance, &context);

        writeln!(output, "NLPBot: {}", turn.content)?;
        if self.show_details {
            if let Some(details) = &turn.details {
                let json = serde_json::to_string_pretty(details).map_err(io::Error::other)?;
                writeln!(output, "Technical details:\n{}", json)?;
            }
        }
        Ok(())
    }

    fn execute<W: Write>(&mut self, command: Command, output: &mut W) -> io::Result<Flow> {
        match command {
            Command::Mode(mode) => {
                self.session.select_mode(mode);
                writeln!(output, "Mode set to {}.", mode.display_name())?;
            }
            Command::Modes => {
                for mode in Mode::ALL {
                    let marker = if mode == self.session.mode() { "*" } else { " " };
                    writeln!(output, "{} {:<20} ({})", marker, mode.display_name(), mode)?;
                }
            }
            Command::Name(name) => {
                match &name {
                    Some(n) => writeln!(output, "Nice to meet you, {}!", n)?,
                    None => writeln!(output, "Display name cleared.")?,
                }
                self.name = name;
            }
            Command::Details(on) => {
                self.show_details = on;
                let state = if on { "shown" } else { "hidden" };
                writeln!(output, "Technical details {}.", state)?;
            }
            Command::Clear => {
                self.session.clear();
                writeln!(output, "Conversation cleared.")?;
            }
            Command::Save(dir) => {
                let dir = dir.unwrap_or_else(|| self.transcript_dir.clone());
                match transcript::save_transcript(&self.session, &dir, Local::now()) {
                    Ok(Some(path)) => {
                        writeln!(output, "Conversation saved to {}", path.display())?
                    }
                    Ok(None) => writeln!(output, "{}", NOTHING_TO_SAVE)?,
                    Err(e) => {
                        tracing::warn!(dir = %dir.display(), error = %e, "Transcript save failed");
                        writeln!(output, "Could not save the conversation: {}", e)?;
                    }
                }
            }
            Command::History => {
                if self.session.is_empty() {
                    writeln!(output, "No messages yet.")?;
                }
                for turn in self.session.turns() {
                    writeln!(output, "{}", format_turn(turn))?;
                }
            }
            Command::Help => writeln!(output, "{}", HELP)?,
            Command::Quit => {
                writeln!(output, "Goodbye!")?;
                return Ok(Flow::Exit);
            }
        }
        Ok(Flow::Continue)
    }
}

fn prompt<W: Write>(output: &mut W) -> io::Result<()> {
    write!(output, "> ")?;
    output.flush()
}

fn format_turn(turn: &Turn) -> String {
    let speaker = match turn.role {
        Role::User => "You",
        Role::Assistant => "NLPBot",
    };
    format!(
        "[{}] {}: {}",
        turn.timestamp.format("%H:%M:%S"),
        speaker,
        turn.content
    )
}
