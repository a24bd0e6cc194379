//! The set of bound rows and the per-cycle render pass.

use std::str::FromStr;
use std::time::Instant;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::highlight::{DisplayState, Highlighter, RevertQueue};
use super::notify::ValueSet;
use super::path::{value_text, BindingKey, BindingKeyError, ResolveError, Resolver};

/// A row bound to a key in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Binding {
    pub key: BindingKey,
    /// Row caption; defaults to the key.
    #[serde(default)]
    pub label: Option<String>,
    /// Keep the previous value visible while the change is emphasised.
    #[serde(default)]
    pub previous: bool,
}

impl Binding {
    pub fn new(key: BindingKey) -> Self {
        Self {
            key,
            label: None,
            previous: false,
        }
    }

    pub fn caption(&self) -> &str {
        self.label.as_deref().unwrap_or(self.key.as_str())
    }
}

/// Command-line form: `key`, `key=Label` or `+key=Label` (the `+` keeps the
/// previous value visible).
impl FromStr for Binding {
    type Err = BindingKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (previous, s) = match s.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (key, label) = match s.split_once('=') {
            Some((key, label)) if !label.trim().is_empty() => {
                (key, Some(label.trim().to_string()))
            }
            Some((key, _)) => (key, None),
            None => (s, None),
        };
        Ok(Self {
            key: key.trim().parse()?,
            label,
            previous,
        })
    }
}

/// A bound row together with its rendered state.
#[derive(Debug, Clone)]
pub struct Row {
    pub binding: Binding,
    pub state: DisplayState,
    /// Number of times the row's text changed.
    pub changes: u64,
}

/// All bound rows, updated together once per cycle.
#[derive(Debug, Clone)]
pub struct Board {
    rows: Vec<Row>,
    resolver: Resolver,
    highlighter: Highlighter,
    reverts: RevertQueue,
}

impl Board {
    pub fn new(bindings: Vec<Binding>, resolver: Resolver, highlighter: Highlighter) -> Self {
        let rows = bindings
            .into_iter()
            .map(|binding| Row {
                binding,
                state: DisplayState::default(),
                changes: 0,
            })
            .collect();
        Self {
            rows,
            resolver,
            highlighter,
            reverts: RevertQueue::new(),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolve every binding against `snapshot` in one synchronous pass.
    ///
    /// Rows whose text changed are emphasised. On a resolve error (only
    /// possible under the `Fail` policy) the pass stops at that row: rows
    /// before it keep their new text, rows after it are left alone.
    pub fn apply(
        &mut self,
        snapshot: &Map<String, Value>,
        now: Instant,
    ) -> Result<ValueSet, ResolveError> {
        let mut values = ValueSet::new();

        for (index, row) in self.rows.iter_mut().enumerate() {
            let value = self.resolver.resolve(snapshot, &row.binding.key)?;
            let text = value_text(&value);

            if let Some(token) =
                self.highlighter.apply(index, &mut row.state, &text, row.binding.previous, now)
            {
                row.changes += 1;
                self.reverts.push(token);
            }

            values.insert(row.binding.key.to_string(), value);
        }

        Ok(values)
    }

    /// Clear emphasis for every revert whose deadline has passed.
    ///
    /// Returns the number of rows actually reverted; stale tokens are
    /// discarded without effect.
    pub fn expire(&mut self, now: Instant) -> usize {
        let mut reverted = 0;
        for token in self.reverts.due(now) {
            if let Some(row) = self.rows.get_mut(token.row) {
                if Highlighter::revert(&mut row.state, &token) {
                    reverted += 1;
                }
            }
        }
        reverted
    }
}
