//! Battle event logger with bump-allocated formatting
//!
//! Combat and unit code never log. The activation controller, turn scheduler
//! and battle loop describe what happened through this sink, which can print,
//! capture into memory, or both.

use crate::game::VerbosityLevel;
use bumpalo::collections::String as BumpString;
use bumpalo::Bump;
use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::fmt::{self, Write as FmtWrite};
use std::ops::Deref;

/// Log a formatted message at the given level, compiled out without the
/// `verbose-logging` feature
#[macro_export]
macro_rules! log_if_verbose {
    ($logger:expr, $level:expr, $($arg:tt)*) => {{
        #[cfg(feature = "verbose-logging")]
        {
            $logger.log_fmt($level, format_args!($($arg)*));
        }
        // Still type-checks the arguments so they never read as unused
        #[cfg(not(feature = "verbose-logging"))]
        {
            if false {
                $logger.log_fmt($level, format_args!($($arg)*));
            }
        }
    }};
}

/// Output destination for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputMode {
    /// Output only to stdout (default)
    #[default]
    Stdout,
    /// Capture only to in-memory buffer (no stdout)
    Memory,
    /// Both stdout and in-memory buffer
    Both,
}

/// A captured log line
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: VerbosityLevel,
    pub message: String,
    /// Optional category (e.g. "policy_choice", "rule_violation")
    pub category: Option<String>,
}

/// Read-only access to captured log entries
pub struct LogGuard<'a> {
    guard: Ref<'a, Vec<LogEntry>>,
}

impl<'a> LogGuard<'a> {
    pub fn iter(&self) -> std::slice::Iter<'_, LogEntry> {
        self.guard.iter()
    }

    pub fn len(&self) -> usize {
        self.guard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard.is_empty()
    }
}

impl<'a> Deref for LogGuard<'a> {
    type Target = [LogEntry];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

/// Verbosity-gated battle event sink
pub struct BattleLogger {
    verbosity: VerbosityLevel,
    output_mode: OutputMode,

    /// Scratch arena for formatting; reset once the buffer is cleared
    format_bump: RefCell<Bump>,

    log_buffer: RefCell<Vec<LogEntry>>,
}

impl BattleLogger {
    /// Create a new logger with default verbosity (Normal)
    pub fn new() -> Self {
        Self::with_verbosity(VerbosityLevel::default())
    }

    pub fn with_verbosity(verbosity: VerbosityLevel) -> Self {
        BattleLogger {
            verbosity,
            output_mode: OutputMode::default(),
            format_bump: RefCell::new(Bump::new()),
            log_buffer: RefCell::new(Vec::new()),
        }
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    /// Capture into memory only
    pub fn enable_capture(&mut self) {
        self.output_mode = OutputMode::Memory;
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.output_mode, OutputMode::Memory | OutputMode::Both)
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: VerbosityLevel) {
        self.verbosity = verbosity;
    }

    /// Print buffered logs that the verbosity allows, then clear the buffer
    pub fn flush_buffer(&mut self) {
        let buffer = self.log_buffer.borrow();
        for entry in buffer.iter() {
            if entry.level <= self.verbosity {
                self.log_to_stdout(entry.level, &entry.message);
            }
        }
        drop(buffer);
        self.clear_logs();
    }

    pub fn logs(&self) -> LogGuard<'_> {
        LogGuard {
            guard: self.log_buffer.borrow(),
        }
    }

    pub fn clear_logs(&mut self) {
        self.log_buffer.borrow_mut().clear();
        self.format_bump.borrow_mut().reset();
    }

    #[inline]
    fn log_to_stdout(&self, level: VerbosityLevel, message: &str) {
        if level == VerbosityLevel::Minimal {
            println!("{}", message);
        } else {
            println!("  {}", message);
        }
    }

    /// True when a message at `level` would go anywhere
    #[inline]
    pub fn enabled(&self, level: VerbosityLevel) -> bool {
        level != VerbosityLevel::Silent && (level <= self.verbosity || self.is_capturing())
    }

    fn emit(&self, level: VerbosityLevel, message: &str, category: Option<&str>) {
        if level == VerbosityLevel::Silent {
            return;
        }
        if self.is_capturing() {
            self.log_buffer.borrow_mut().push(LogEntry {
                level,
                message: message.to_string(),
                category: category.map(str::to_string),
            });
        }
        let to_stdout = matches!(self.output_mode, OutputMode::Stdout | OutputMode::Both);
        if to_stdout && level <= self.verbosity {
            self.log_to_stdout(level, message);
        }
    }

    /// Format into the scratch arena and log at `level`
    pub fn log_fmt(&self, level: VerbosityLevel, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        let bump = self.format_bump.borrow();
        let mut text = BumpString::new_in(&bump);
        if text.write_fmt(args).is_ok() {
            self.emit(level, text.as_str(), None);
        }
    }

    #[inline]
    pub fn minimal(&self, message: &str) {
        self.emit(VerbosityLevel::Minimal, message, None);
    }

    #[inline]
    pub fn normal(&self, message: &str) {
        self.emit(VerbosityLevel::Normal, message, None);
    }

    #[inline]
    pub fn verbose(&self, message: &str) {
        self.emit(VerbosityLevel::Verbose, message, None);
    }

    /// Log a policy decision at Normal level, tagged "policy_choice"
    pub fn policy_choice(&self, policy: &str, message: &str) {
        if !self.enabled(VerbosityLevel::Normal) {
            return;
        }
        let bump = self.format_bump.borrow();
        let mut text = BumpString::new_in(&bump);
        if write!(text, "[{policy}] {message}").is_ok() {
            self.emit(VerbosityLevel::Normal, text.as_str(), Some("policy_choice"));
        }
    }

    /// Log a recovered rule violation at Verbose level
    pub fn rule_violation(&self, violation: &crate::error::RuleViolation) {
        if !self.enabled(VerbosityLevel::Verbose) {
            return;
        }
        let bump = self.format_bump.borrow();
        let mut text = BumpString::new_in(&bump);
        if write!(text, "recovered: {violation}").is_ok() {
            self.emit(VerbosityLevel::Verbose, text.as_str(), Some("rule_violation"));
        }
    }
}

impl Default for BattleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BattleLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleLogger")
            .field("verbosity", &self.verbosity)
            .field("output_mode", &self.output_mode)
            .field("log_count", &self.log_buffer.borrow().len())
            .finish()
    }
}

impl Clone for BattleLogger {
    /// Clones settings only; the copy starts with an empty buffer
    fn clone(&self) -> Self {
        BattleLogger {
            verbosity: self.verbosity,
            output_mode: self.output_mode,
            format_bump: RefCell::new(Bump::new()),
            log_buffer: RefCell::new(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EntityId;
    use crate::error::RuleViolation;

    #[test]
    fn test_logger_creation() {
        let logger = BattleLogger::new();
        assert_eq!(logger.verbosity(), VerbosityLevel::Normal);
        let silent = BattleLogger::with_verbosity(VerbosityLevel::Silent);
        assert_eq!(silent.verbosity(), VerbosityLevel::Silent);
    }

    #[test]
    fn test_log_capture() {
        let mut logger = BattleLogger::new();
        logger.enable_capture();

        logger.normal("Solar Knights advance");
        logger.minimal("Frank wins");

        let logs = logger.logs();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].message, "Solar Knights advance");
        assert_eq!(logs[1].level, VerbosityLevel::Minimal);
    }

    #[test]
    fn test_log_fmt_uses_arguments() {
        let mut logger = BattleLogger::with_verbosity(VerbosityLevel::Verbose);
        logger.enable_capture();
        logger.log_fmt(VerbosityLevel::Verbose, format_args!("{} rolls {} dice", "Unit 3", 7));
        assert_eq!(logger.logs()[0].message, "Unit 3 rolls 7 dice");
    }

    #[test]
    fn test_macro_as_match_arm() {
        let mut logger = BattleLogger::with_verbosity(VerbosityLevel::Minimal);
        logger.enable_capture();
        for winner in [Some("Frank"), None] {
            match winner {
                Some(name) => crate::log_if_verbose!(logger, VerbosityLevel::Minimal, "{} wins", name),
                None => crate::log_if_verbose!(logger, VerbosityLevel::Minimal, "Draw"),
            }
        }
        #[cfg(feature = "verbose-logging")]
        {
            let messages: Vec<String> = logger.logs().iter().map(|e| e.message.clone()).collect();
            assert_eq!(messages, vec!["Frank wins".to_string(), "Draw".to_string()]);
        }
        #[cfg(not(feature = "verbose-logging"))]
        assert!(logger.logs().is_empty());
    }

    #[test]
    fn test_categories() {
        let mut logger = BattleLogger::new();
        logger.enable_capture();
        logger.policy_choice("heuristic", "activates unit 2");
        logger.rule_violation(&RuleViolation::InvalidTarget {
            unit: EntityId::new(1),
            target: EntityId::new(9),
        });

        let logs = logger.logs();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].message, "[heuristic] activates unit 2");
        assert_eq!(logs[0].category.as_deref(), Some("policy_choice"));
        assert_eq!(logs[1].category.as_deref(), Some("rule_violation"));
    }

    #[test]
    fn test_silent_never_captured() {
        let mut logger = BattleLogger::new();
        logger.enable_capture();
        logger.log_fmt(VerbosityLevel::Silent, format_args!("nothing"));
        assert!(logger.logs().is_empty());
    }

    #[test]
    fn test_flush_buffer() {
        let mut logger = BattleLogger::new();
        logger.enable_capture();
        logger.normal("message 1");
        logger.normal("message 2");
        assert_eq!(logger.logs().len(), 2);

        logger.flush_buffer();
        assert!(logger.logs().is_empty());
    }

    #[test]
    fn test_clone_keeps_settings_not_logs() {
        let mut logger = BattleLogger::with_verbosity(VerbosityLevel::Verbose);
        logger.enable_capture();
        logger.normal("message");

        let copy = logger.clone();
        assert_eq!(copy.verbosity(), VerbosityLevel::Verbose);
        assert!(copy.is_capturing());
        assert!(copy.logs().is_empty());
    }
}
