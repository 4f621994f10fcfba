// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Collapsing physical lines into logical records.
//!
//! A [`LineAssembler`] is fed one physical line at a time (no trailing
//! newline) and either buffers it or commits a completed logical record.
//! `Single` commits every line immediately; `Multi` buffers until a line
//! matching a configured start pattern closes out the previous record.

use regex::Regex;

/// How a [`crate::CompiledHandler`] assembles physical lines into records.
#[derive(Debug, Clone)]
pub enum MergeRule {
    /// Every physical line is its own record.
    Single,
    /// Lines accumulate until one matches `start`, which closes the
    /// previous record and opens a new one.
    Multi { start: Regex },
}

impl MergeRule {
    pub fn compile(self) -> LineAssembler {
        match self {
            MergeRule::Single => LineAssembler::Single(Single::default()),
            MergeRule::Multi { start } => LineAssembler::Multi(Multi::new(start)),
        }
    }
}

/// Per-entry assembler state. One instance per [`crate::CompiledHandler`]
/// clone (i.e. per `FileEntry`), since it carries mutable buffering state.
#[derive(Debug, Clone)]
pub enum LineAssembler {
    Single(Single),
    Multi(Multi),
}

impl LineAssembler {
    /// Feed one physical line (no trailing newline). Returns `true` when a
    /// completed record is ready to be retrieved with [`Self::line`].
    pub fn append(&mut self, data: &[u8]) -> bool {
        match self {
            LineAssembler::Single(s) => s.append(data),
            LineAssembler::Multi(m) => m.append(data),
        }
    }

    /// Retrieve the record committed by the last `append` or `null` call
    /// that returned/reported readiness. Clears the retrieved record.
    pub fn line(&mut self) -> Vec<u8> {
        match self {
            LineAssembler::Single(s) => s.line(),
            LineAssembler::Multi(m) => m.line(),
        }
    }

    /// Call at end-of-scan. If buffered content remains, stages it for
    /// retrieval via [`Self::line`] and returns `false`; returns `true`
    /// when there was nothing buffered.
    pub fn null(&mut self) -> bool {
        match self {
            LineAssembler::Single(s) => s.null(),
            LineAssembler::Multi(m) => m.null(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Single {
    line: Option<Vec<u8>>,
}

impl Single {
    fn append(&mut self, data: &[u8]) -> bool {
        self.line = Some(data.to_vec());
        true
    }

    fn line(&mut self) -> Vec<u8> {
        self.line.take().unwrap_or_default()
    }

    fn null(&mut self) -> bool {
        self.line.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Multi {
    start: Regex,
    buf: Vec<u8>,
    pending: Option<Vec<u8>>,
}

impl Multi {
    fn new(start: Regex) -> Self {
        Self {
            start,
            buf: Vec::new(),
            pending: None,
        }
    }

    /// Mirrors the upstream project's `Multi.Append`: a line matching the
    /// start pattern finalizes any non-empty buffer as the previous
    /// record *before* the matching line itself is appended to the new
    /// buffer — so a record is emitted one start-line late.
    fn append(&mut self, data: &[u8]) -> bool {
        if self.start.is_match(data) && !self.buf.is_empty() {
            self.pending = Some(std::mem::take(&mut self.buf));
        }
        if !self.buf.is_empty() {
            self.buf.push(b'\n');
        }
        self.buf.extend_from_slice(data);
        self.pending.is_some()
    }

    fn line(&mut self) -> Vec<u8> {
        self.pending.take().unwrap_or_default()
    }

    fn null(&mut self) -> bool {
        if self.buf.is_empty() {
            true
        } else {
            self.pending = Some(std::mem::take(&mut self.buf));
            false
        }
    }
}

#[cfg(test)]
#[path = "assembler_tests.rs"]
mod tests;
