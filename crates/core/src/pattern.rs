// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A single include-pattern, its excludes, and the sinks it feeds.

use std::sync::Arc;

use crate::matcher::Matcher;
use crate::sink::Sink;
use crate::Error;

/// Mutable, fluent builder for a [`Pattern`]. Collected by
/// [`crate::HandlerBuilder::target`] and compiled together at
/// `HandlerBuilder::build()` time, since the pattern's `no` ordinal is
/// assigned across the whole handler's target list.
#[derive(Default)]
pub struct PatternBuilder {
    content: String,
    excludes: Vec<String>,
    sinks: Vec<Arc<dyn Sink>>,
    ext: String,
}

impl PatternBuilder {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// A substring that, if present in an otherwise-matched line,
    /// disqualifies it from delivery.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excludes.push(pattern.into());
        self
    }

    pub fn sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Opaque caller-supplied value returned alongside a match.
    pub fn ext(mut self, ext: impl Into<String>) -> Self {
        self.ext = ext.into();
        self
    }

    /// Validate and compile, assigning the 1-based ordinal `no`.
    pub(crate) fn build(self, no: usize) -> Result<Pattern, Error> {
        if self.content.is_empty() {
            return Err(Error::EmptyPatternContent);
        }
        if self.sinks.is_empty() {
            return Err(Error::NoSinks(self.content));
        }
        let excludes_display: Vec<String> = self.excludes.iter().filter(|e| !e.is_empty()).cloned().collect();
        let excludes = Matcher::build(
            self.excludes
                .into_iter()
                .filter(|e| !e.is_empty())
                .map(|e| (e.into_bytes(), ()))
                .collect(),
        );
        Ok(Pattern {
            no,
            content: self.content.into_bytes(),
            excludes,
            excludes_display,
            sinks: self.sinks,
            ext: self.ext,
        })
    }
}

/// Compiled, immutable form of a [`PatternBuilder`]. Owned by a
/// [`crate::CompiledHandler`]'s matcher; never mutated after compilation.
#[derive(Clone)]
pub struct Pattern {
    no: usize,
    content: Vec<u8>,
    excludes: Matcher<()>,
    excludes_display: Vec<String>,
    sinks: Vec<Arc<dyn Sink>>,
    ext: String,
}

impl Pattern {
    pub fn no(&self) -> usize {
        self.no
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// True if `line` contains one of this pattern's exclude substrings.
    pub fn excluded(&self, line: &[u8]) -> bool {
        self.excludes.search(line)
    }

    /// The raw exclude substrings, for diagnostics (`Engine::list`).
    pub fn excludes_display(&self) -> &[String] {
        &self.excludes_display
    }

    pub fn sinks(&self) -> &[Arc<dyn Sink>] {
        &self.sinks
    }

    pub fn ext(&self) -> &str {
        &self.ext
    }
}

impl std::fmt::Debug for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pattern")
            .field("no", &self.no)
            .field("content", &String::from_utf8_lossy(&self.content))
            .field("ext", &self.ext)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
