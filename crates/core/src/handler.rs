// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The compiled configuration applied to a registered path.
//!
//! Mutation happens only in [`HandlerBuilder`]; [`CompiledHandler`] is
//! immutable and cheap to clone (an `Arc` around its matcher and sinks),
//! so it can be shared across every `FileEntry` a directory registration
//! spawns while each entry keeps its own offset/expiry/assembler state.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use regex::Regex;

use crate::assembler::MergeRule;
use crate::matcher::Matcher;
use crate::pattern::{Pattern, PatternBuilder};
use crate::Error;

/// Persist-offset policy. Mirrors the upstream `change` field:
/// `-1` persists on every update, `0` falls back to a default threshold,
/// `n > 0` persists every `n` updates.
#[derive(Debug, Clone, Copy)]
pub enum PersistPolicy {
    Every,
    Default,
    EveryN(u32),
}

const DEFAULT_CHANGE_THRESHOLD: u32 = 100;

impl PersistPolicy {
    pub fn from_change(change: i32) -> Self {
        match change {
            n if n < 0 => PersistPolicy::Every,
            0 => PersistPolicy::Default,
            n => PersistPolicy::EveryN(n as u32),
        }
    }

    /// The effective threshold a counter must exceed before a forced
    /// write-through, or `None` for `Every`.
    pub fn threshold(&self) -> Option<u32> {
        match self {
            PersistPolicy::Every => None,
            PersistPolicy::Default => Some(DEFAULT_CHANGE_THRESHOLD),
            PersistPolicy::EveryN(n) => Some(*n),
        }
    }
}

/// Mutable, fluent builder for a [`CompiledHandler`].
pub struct HandlerBuilder {
    tail: bool,
    clean_offset: bool,
    loop_parse: bool,
    change: i32,
    expire_dur: Option<Duration>,
    expire_at: Option<SystemTime>,
    merge_rule: MergeRule,
    targets: Vec<PatternBuilder>,
    ext: String,
    need_collect: Option<Arc<dyn Fn(&str) -> bool + Send + Sync>>,
}

impl Default for HandlerBuilder {
    fn default() -> Self {
        Self {
            tail: true,
            clean_offset: false,
            loop_parse: false,
            change: 0,
            expire_dur: None,
            expire_at: None,
            merge_rule: MergeRule::Single,
            targets: Vec::new(),
            ext: String::new(),
            need_collect: None,
        }
    }
}

impl HandlerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tail(mut self, tail: bool) -> Self {
        self.tail = tail;
        self
    }

    /// One-shot: discard any prior persisted offset on first use.
    pub fn clean_offset(mut self, clean_offset: bool) -> Self {
        self.clean_offset = clean_offset;
        self
    }

    /// When true, `offset > size` is treated as truncation-restart
    /// rather than a no-op.
    pub fn loop_parse(mut self, loop_parse: bool) -> Self {
        self.loop_parse = loop_parse;
        self
    }

    pub fn change(mut self, change: i32) -> Self {
        self.change = change;
        self
    }

    pub fn expire_dur(mut self, dur: Duration) -> Self {
        self.expire_dur = Some(dur);
        self
    }

    /// Takes precedence over `expire_dur` when set.
    pub fn expire_at(mut self, at: SystemTime) -> Self {
        self.expire_at = Some(at);
        self
    }

    pub fn merge_single(mut self) -> Self {
        self.merge_rule = MergeRule::Single;
        self
    }

    pub fn merge_multi(mut self, start_pattern: &str) -> Result<Self, Error> {
        let start = Regex::new(start_pattern).map_err(Error::InvalidStartPattern)?;
        self.merge_rule = MergeRule::Multi { start };
        Ok(self)
    }

    pub fn target(mut self, target: PatternBuilder) -> Self {
        self.targets.push(target);
        self
    }

    pub fn ext(mut self, ext: impl Into<String>) -> Self {
        self.ext = ext.into();
        self
    }

    /// Required when this handler will be applied to a directory path;
    /// filters which filenames are instantiated as child entries.
    pub fn need_collect<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.need_collect = Some(Arc::new(f));
        self
    }

    pub fn build(self) -> Result<CompiledHandler, Error> {
        if self.targets.is_empty() {
            return Err(Error::NoTargets);
        }
        let mut compiled = Vec::with_capacity(self.targets.len());
        let mut no = 1usize;
        for target in self.targets {
            compiled.push(target.build(no)?);
            no += 1;
        }
        let target_list: Vec<Arc<Pattern>> = compiled.into_iter().map(Arc::new).collect();
        let matcher = Matcher::build(
            target_list
                .iter()
                .cloned()
                .map(|p| (p.content().to_vec(), p))
                .collect(),
        );
        Ok(CompiledHandler {
            inner: Arc::new(CompiledHandlerInner {
                tail: self.tail,
                clean_offset: self.clean_offset,
                loop_parse: self.loop_parse,
                persist_policy: PersistPolicy::from_change(self.change),
                expire_dur: self.expire_dur,
                expire_at: self.expire_at,
                merge_rule: self.merge_rule,
                targets: matcher,
                target_list,
                ext: self.ext,
                need_collect: self.need_collect,
            }),
        })
    }
}

struct CompiledHandlerInner {
    tail: bool,
    clean_offset: bool,
    loop_parse: bool,
    persist_policy: PersistPolicy,
    expire_dur: Option<Duration>,
    expire_at: Option<SystemTime>,
    merge_rule: MergeRule,
    targets: Matcher<Arc<Pattern>>,
    target_list: Vec<Arc<Pattern>>,
    ext: String,
    need_collect: Option<Arc<dyn Fn(&str) -> bool + Send + Sync>>,
}

/// Immutable, `Arc`-shared compiled handler. Clone is cheap (an `Arc`
/// bump); every `FileEntry` built from the same registration shares one
/// instance, with per-entry mutable state (offset, expiry, assembler)
/// held alongside it rather than inside it.
#[derive(Clone)]
pub struct CompiledHandler {
    inner: Arc<CompiledHandlerInner>,
}

impl CompiledHandler {
    pub fn tail(&self) -> bool {
        self.inner.tail
    }

    pub fn clean_offset(&self) -> bool {
        self.inner.clean_offset
    }

    pub fn loop_parse(&self) -> bool {
        self.inner.loop_parse
    }

    pub fn persist_policy(&self) -> PersistPolicy {
        self.inner.persist_policy
    }

    /// The entry's default expiry, computed from `now + expire_dur` when
    /// no absolute `expire_at` override was set. Call once per
    /// entry/child at creation time.
    pub fn default_expire_at(&self, now: SystemTime) -> SystemTime {
        self.inner
            .expire_at
            .unwrap_or_else(|| now + self.inner.expire_dur.unwrap_or(Duration::from_secs(3600)))
    }

    pub fn new_assembler(&self) -> crate::assembler::LineAssembler {
        self.inner.merge_rule.clone().compile()
    }

    pub fn targets(&self) -> &Matcher<Arc<Pattern>> {
        &self.inner.targets
    }

    /// Every compiled target, in registration order, for diagnostics
    /// (`Engine::list`) where `Matcher`'s search-only contract doesn't fit.
    pub fn target_list(&self) -> &[Arc<Pattern>] {
        &self.inner.target_list
    }

    pub fn ext(&self) -> &str {
        &self.inner.ext
    }

    pub fn need_collect(&self, filename: &str) -> Option<bool> {
        self.inner.need_collect.as_ref().map(|f| f(filename))
    }

    pub fn has_need_collect(&self) -> bool {
        self.inner.need_collect.is_some()
    }
}

impl std::fmt::Debug for CompiledHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledHandler")
            .field("tail", &self.inner.tail)
            .field("clean_offset", &self.inner.clean_offset)
            .field("loop_parse", &self.inner.loop_parse)
            .field("ext", &self.inner.ext)
            .finish()
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
