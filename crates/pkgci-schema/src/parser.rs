//! Line-driven state machine over a PKGBUILD.
//!
//! The input is never executed. Each physical line is normalized, then either
//! classified as an assignment (when no array is open) or fed to the open
//! array. An array closes on the first line whose normalized text contains `)`,
//! including the line that opened it.

use crate::accumulate::ArrayAccumulator;
use crate::classify::{classify, Assignment};
use crate::manifest::{ManifestBuilder, ManifestError, PackageManifest};
use crate::normalize::normalize_line;
use crate::observer::ParseObserver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    InArray,
}

pub struct ManifestParser<'o> {
    state: State,
    accumulator: ArrayAccumulator,
    builder: ManifestBuilder,
    observer: Option<&'o mut dyn ParseObserver>,
}

impl ManifestParser<'_> {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            accumulator: ArrayAccumulator::new(),
            builder: ManifestBuilder::default(),
            observer: None,
        }
    }
}

impl Default for ManifestParser<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'o> ManifestParser<'o> {
    pub fn with_observer(observer: &'o mut dyn ParseObserver) -> Self {
        Self {
            state: State::Idle,
            accumulator: ArrayAccumulator::new(),
            builder: ManifestBuilder::default(),
            observer: Some(observer),
        }
    }

    /// Run the parser over `input` and validate the result.
    pub fn parse(mut self, input: &str) -> Result<PackageManifest, ManifestError> {
        for (idx, raw) in input.lines().enumerate() {
            self.notify(|o| o.line(idx + 1, raw));
            self.step(raw);
        }

        if self.state == State::InArray {
            let target = self.accumulator.target();
            self.notify(|o| o.unterminated(target));
        }

        if let Some(observer) = self.observer.as_deref_mut() {
            let (name, version, release) = self.builder.scalars();
            observer.finished(name, version, release);
        }
        self.builder.finish()
    }

    fn notify(&mut self, event: impl FnOnce(&mut dyn ParseObserver)) {
        if let Some(observer) = self.observer.as_deref_mut() {
            event(observer);
        }
    }

    fn step(&mut self, raw: &str) {
        let line = normalize_line(raw);
        if line.is_empty() {
            return;
        }

        match self.state {
            State::Idle => match classify(line) {
                Some(Assignment::Scalar {
                    field: Some(field),
                    value,
                }) => {
                    let applied = self.builder.set_scalar(field, value);
                    self.notify(|o| o.scalar(field, value, applied));
                }
                Some(Assignment::ArrayOpen { target, fragment }) => {
                    self.accumulator.open(target);
                    self.accumulator.feed(fragment);
                    self.state = State::InArray;
                }
                Some(Assignment::Scalar { field: None, .. }) | None => {}
            },
            State::InArray => self.accumulator.feed(line),
        }

        if self.state == State::InArray && line.contains(')') {
            let (target, tokens) = self.accumulator.close();
            self.notify(|o| o.array(target, &tokens));
            if let Some(field) = target {
                self.builder.append(field, tokens);
            }
            self.state = State::Idle;
        }
    }
}
