//! Output capture shared by the terminal UI and the RPC service
//!
//! While a plugin session that can run core commands is open, every line the
//! UI prints is also recorded here so the plugin can drain it with
//! `GetOutputAndReset`. The silent flag only affects printing.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Buffered terminal output plus the silent/recording switches
#[derive(Debug, Default)]
pub struct OutputCapture {
    lines: Mutex<Vec<String>>,
    silent: AtomicBool,
    recording: AtomicBool,
}

impl OutputCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a printed line if recording is active
    pub fn record(&self, line: impl Into<String>) {
        if !self.is_recording() {
            return;
        }
        self.lock_lines().push(line.into());
    }

    /// Take every recorded line, leaving the buffer empty
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.lock_lines())
    }

    /// Copy of the recorded lines
    #[cfg(test)]
    pub fn snapshot(&self) -> Vec<String> {
        self.lock_lines().clone()
    }

    pub fn set_silent(&self, silent: bool) {
        self.silent.store(silent, Ordering::SeqCst);
    }

    /// Whether terminal printing is suppressed
    pub fn is_silent(&self) -> bool {
        self.silent.load(Ordering::SeqCst)
    }

    pub fn start_recording(&self) {
        self.recording.store(true, Ordering::SeqCst);
    }

    /// Stop recording, restore terminal output and drop undrained lines
    pub fn stop_recording(&self) {
        self.recording.store(false, Ordering::SeqCst);
        self.silent.store(false, Ordering::SeqCst);
        self.lock_lines().clear();
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    fn lock_lines(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.lines.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
