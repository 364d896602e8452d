//! Interactive tracking session for `scorm session`.
//!
//! Each input line is a SCORM API call such as
//! `LMSSetValue cmi.core.score.raw 85`, forwarded to one registered API
//! instance. The wire result is printed as the content would see it.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use scorm_rte::{ContentRegistration, ScormApi, SessionState, Storage, API_BINDING};

/// Prompt shown at the start of each line
const PROMPT: &str = "scorm> ";
/// History file name
const HISTORY_FILE: &str = ".scorm_history";

/// Result of processing one input line
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    /// Print this and continue
    Output(String),
    /// Exit the prompt
    Exit,
}

/// The API registration driven by the prompt.
pub struct Shell<S> {
    registration: ContentRegistration<S>,
}

impl<S: Storage> Shell<S> {
    pub fn new(api: ScormApi<S>) -> Self {
        Self {
            registration: ContentRegistration::register(api, "scorm session"),
        }
    }

    fn handle_line(&mut self, line: &str) -> Outcome {
        let line = line.trim();
        if let Some(command) = line.strip_prefix(':') {
            return self.handle_command(command.trim());
        }

        let (method, args) = split_call(line);
        let Some(api) = self.registration.binding(API_BINDING) else {
            return Outcome::Output("API is not registered".to_string());
        };
        match api.invoke(method, &args) {
            Some(result) => Outcome::Output(format!("{result:?}")),
            None => Outcome::Output(format!(
                "Unknown method: {method}\nType :help for available methods"
            )),
        }
    }

    fn handle_command(&self, command: &str) -> Outcome {
        match command.to_lowercase().as_str() {
            "quit" | "q" | "exit" => Outcome::Exit,
            "help" | "h" | "?" => Outcome::Output(HELP.trim().to_string()),
            "state" => Outcome::Output(format!("{:?}", self.state())),
            "dump" => {
                let cmi = self.registration.api().session().cmi();
                match serde_json::to_string_pretty(cmi) {
                    Ok(json) => Outcome::Output(json),
                    Err(e) => Outcome::Output(format!("Cannot serialize tracking data: {e}")),
                }
            }
            other => Outcome::Output(format!(
                "Unknown command: :{other}\nType :help for available commands"
            )),
        }
    }

    fn state(&self) -> SessionState {
        self.registration.api().state()
    }
}

/// Split `Method element value with spaces` into the method and at most two
/// arguments. The value keeps its inner whitespace.
fn split_call(line: &str) -> (&str, Vec<&str>) {
    let Some((method, rest)) = line.split_once(char::is_whitespace) else {
        return (line, Vec::new());
    };
    let rest = rest.trim_start();
    if rest.is_empty() {
        return (method, Vec::new());
    }
    match rest.split_once(char::is_whitespace) {
        Some((first, value)) => (method, vec![first, value.trim()]),
        None => (method, vec![rest]),
    }
}

/// Run the prompt until `:quit` or end of input.
pub fn run<S: Storage>(shell: &mut Shell<S>) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    let history_path = dirs::home_dir().map(|home| home.join(HISTORY_FILE));
    if let Some(path) = &history_path {
        let _ = editor.load_history(path);
    }

    println!("SCORM tracking session v{}", env!("CARGO_PKG_VERSION"));
    println!("Type :help for help, :quit to exit");
    println!();

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line.as_str());
                match shell.handle_line(&line) {
                    Outcome::Output(text) => println!("{text}"),
                    Outcome::Exit => break,
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error reading input: {err}");
                break;
            }
        }
    }

    if shell.state() == SessionState::Active {
        println!("Session was not finished; changes since the last commit are discarded.");
    }

    if let Some(path) = &history_path {
        let _ = editor.save_history(path);
    }
    Ok(())
}

const HELP: &str = r#"
Session Commands:
  :help, :h, :?    Show this help message
  :dump            Print the tracking data as JSON
  :state           Show the session state
  :quit, :q        Exit

SCORM 1.2 methods:
  LMSInitialize, LMSFinish, LMSCommit
  LMSGetValue <element>
  LMSSetValue <element> <value>
  LMSGetLastError, LMSGetErrorString <code>, LMSGetDiagnostic <code>

SCORM 2004 methods:
  Initialize, Terminate, GetValue, SetValue,
  GetLastError, GetErrorString, GetDiagnostic
  Commit           Same as Terminate; use LMSCommit to save and continue

Examples:
  scorm> LMSInitialize
  "true"
  scorm> LMSSetValue cmi.core.lesson_status not attempted
  "true"
"#;
