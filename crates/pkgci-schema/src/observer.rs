//! Hooks for watching the parser work.
//!
//! The parser never logs on its own. Callers that want diagnostics pass an
//! observer; [`TracingObserver`] forwards every event to `tracing` at debug level.

use crate::types::{ArrayField, ScalarField};
use tracing::debug;

/// Receives parse events in file order. All hooks default to doing nothing.
pub trait ParseObserver {
    /// Called for every physical line before it is normalized. `number` is 1-based.
    fn line(&mut self, _number: usize, _raw: &str) {}

    /// A recognized scalar assignment. `applied` is false when an earlier
    /// assignment already set the field.
    fn scalar(&mut self, _field: ScalarField, _value: &str, _applied: bool) {}

    /// An array closed. `target` is `None` for untracked identifiers.
    fn array(&mut self, _target: Option<ArrayField>, _tokens: &[String]) {}

    /// End of input was reached while an array was still open. Its entries are dropped.
    fn unterminated(&mut self, _target: Option<ArrayField>) {}

    /// Parsing reached end of input. Called before the validity check.
    fn finished(&mut self, _name: &str, _version: &str, _release: &str) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ParseObserver for NoopObserver {}

/// Observer that emits `tracing` debug events.
#[derive(Debug, Clone, Copy)]
pub struct TracingObserver {
    preview_lines: usize,
}

impl TracingObserver {
    pub const DEFAULT_PREVIEW_LINES: usize = 15;

    pub fn new() -> Self {
        Self {
            preview_lines: Self::DEFAULT_PREVIEW_LINES,
        }
    }

    /// Number of leading raw lines echoed to the log.
    #[must_use]
    pub fn with_preview_lines(mut self, lines: usize) -> Self {
        self.preview_lines = lines;
        self
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseObserver for TracingObserver {
    fn line(&mut self, number: usize, raw: &str) {
        if number <= self.preview_lines {
            debug!("{number:2}: {raw}");
        }
    }

    fn scalar(&mut self, field: ScalarField, value: &str, applied: bool) {
        if applied {
            debug!("found variable: {field} = '{value}'");
        } else {
            debug!("ignoring repeated {field} = '{value}'");
        }
    }

    fn array(&mut self, target: Option<ArrayField>, tokens: &[String]) {
        match target {
            Some(field) => debug!("found array: {field} = {tokens:?}"),
            None => debug!("skipped untracked array ({} entries)", tokens.len()),
        }
    }

    fn unterminated(&mut self, target: Option<ArrayField>) {
        match target {
            Some(field) => debug!("array {field} not closed before end of file, dropping it"),
            None => debug!("untracked array not closed before end of file"),
        }
    }

    fn finished(&mut self, name: &str, version: &str, release: &str) {
        debug!("parsed values: pkgname='{name}', pkgver='{version}', pkgrel='{release}'");
    }
}

/// Records every event, for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingObserver {
    pub lines: usize,
    pub scalars: Vec<(ScalarField, String, bool)>,
    pub arrays: Vec<(Option<ArrayField>, Vec<String>)>,
    pub unterminated: Option<Option<ArrayField>>,
    pub finished: bool,
}

#[cfg(test)]
impl ParseObserver for RecordingObserver {
    fn line(&mut self, _number: usize, _raw: &str) {
        self.lines += 1;
    }

    fn scalar(&mut self, field: ScalarField, value: &str, applied: bool) {
        self.scalars.push((field, value.to_owned(), applied));
    }

    fn array(&mut self, target: Option<ArrayField>, tokens: &[String]) {
        self.arrays.push((target, tokens.to_vec()));
    }

    fn unterminated(&mut self, target: Option<ArrayField>) {
        self.unterminated = Some(target);
    }

    fn finished(&mut self, _name: &str, _version: &str, _release: &str) {
        self.finished = true;
    }
}

