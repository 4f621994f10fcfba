// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation errors surfaced synchronously at handler-build time.

use thiserror::Error;

/// Errors from building or validating a [`crate::HandlerBuilder`] or
/// [`crate::PatternBuilder`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("pattern content must not be empty")]
    EmptyPatternContent,
    #[error("pattern {0:?} has no sinks")]
    NoSinks(String),
    #[error("handler must have at least one target")]
    NoTargets,
    #[error("invalid multi-line start pattern: {0}")]
    InvalidStartPattern(#[from] regex::Error),
}
