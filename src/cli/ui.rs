//! Terminal output
//!
//! Every user-facing line goes through `Ui`. `TerminalUi` writes to stdout
//! and mirrors each line into the shared `OutputCapture`, which is how plugins
//! get back the output of core commands they invoke.

use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::rpc::capture::OutputCapture;

pub trait Ui: Send + Sync {
    fn say(&self, message: &str);

    fn ok(&self) {
        self.say("OK");
    }

    fn failed(&self, message: &str) {
        self.say("FAILED");
        self.say(message);
    }
}

/// Stdout UI backed by an output capture
#[derive(Debug)]
pub struct TerminalUi {
    capture: Arc<OutputCapture>,
    print: bool,
    transcript: Option<Mutex<Vec<String>>>,
}

impl TerminalUi {
    pub fn new(capture: Arc<OutputCapture>) -> Self {
        Self {
            capture,
            print: true,
            transcript: None,
        }
    }

    /// UI that keeps a transcript of every line instead of printing
    pub fn captured() -> Self {
        Self {
            capture: Arc::new(OutputCapture::new()),
            print: false,
            transcript: Some(Mutex::new(Vec::new())),
        }
    }

    pub fn capture(&self) -> &Arc<OutputCapture> {
        &self.capture
    }

    /// Lines said so far (only for `captured` UIs)
    pub fn outputs(&self) -> Vec<String> {
        self.transcript
            .as_ref()
            .map(|t| t.lock().unwrap_or_else(|p| p.into_inner()).clone())
            .unwrap_or_default()
    }

    /// Whether any recorded line contains every fragment in order
    pub fn contains_line(&self, fragments: &[&str]) -> bool {
        self.outputs().iter().any(|line| {
            let mut rest = line.as_str();
            fragments.iter().all(|fragment| match rest.find(fragment) {
                Some(at) => {
                    rest = &rest[at + fragment.len()..];
                    true
                }
                None => false,
            })
        })
    }
}

impl Ui for TerminalUi {
    fn say(&self, message: &str) {
        for line in message.lines() {
            self.capture.record(line);
            if let Some(transcript) = &self.transcript {
                transcript
                    .lock()
                    .unwrap_or_else(|p| p.into_inner())
                    .push(line.to_string());
            }
        }

        if self.print && !self.capture.is_silent() {
            let mut stdout = std::io::stdout().lock();
            let _ = writeln!(stdout, "{message}");
            let _ = stdout.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captured_transcript() {
        let ui = TerminalUi::captured();
        ui.say("Installing plugin ./test_1.exe...");
        ui.failed("Plugin name Test1 is already taken");

        assert_eq!(
            ui.outputs(),
            vec![
                "Installing plugin ./test_1.exe...",
                "FAILED",
                "Plugin name Test1 is already taken"
            ]
        );
        assert!(ui.contains_line(&["Plugin name", "Test1", "is already taken"]));
        assert!(!ui.contains_line(&["is already taken", "Plugin name"]));
    }

    #[test]
    fn test_lines_reach_capture_while_recording() {
        let capture = Arc::new(OutputCapture::new());
        let ui = TerminalUi::new(capture.clone());
        capture.start_recording();
        capture.set_silent(true);

        ui.say("one\ntwo");
        assert_eq!(capture.drain(), vec!["one", "two"]);
    }
}
