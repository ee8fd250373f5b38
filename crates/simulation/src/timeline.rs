//! Linear undo/redo history of pool snapshots.
//!
//! Each committed operation appends a full snapshot after the cursor,
//! discarding any redo branch. Undo and redo only move the cursor.

use crate::quote::Quote;
use amm_sandbox_domain::{FeeTier, OperationKind, SwapDirection};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One recorded state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry<S> {
    pub id: u64,
    pub kind: OperationKind,
    pub label: String,
    /// Unix time in milliseconds.
    pub created_at: i64,
    pub snapshot: S,
}

/// Snapshot history with a cursor on the present state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline<S> {
    entries: Vec<TimelineEntry<S>>,
    cursor: usize,
    next_id: u64,
    selected_preset: Option<String>,
}

impl<S: Clone> Timeline<S> {
    /// Starts a history whose only entry is `initial`.
    pub fn new(initial: S, label: impl Into<String>) -> Self {
        Self {
            entries: vec![TimelineEntry {
                id: 0,
                kind: OperationKind::Init,
                label: label.into(),
                created_at: Utc::now().timestamp_millis(),
                snapshot: initial,
            }],
            cursor: 0,
            next_id: 1,
            selected_preset: None,
        }
    }

    /// Records the preset the history was started from.
    #[must_use]
    pub fn with_preset(mut self, preset_id: impl Into<String>) -> Self {
        self.selected_preset = Some(preset_id.into());
        self
    }

    /// Rebuilds a history from stored entries.
    ///
    /// Returns `None` for an empty entry list. An out-of-range cursor falls
    /// back to the last entry.
    pub fn from_parts(entries: Vec<TimelineEntry<S>>, cursor: usize, selected_preset: Option<String>) -> Option<Self> {
        let last = entries.len().checked_sub(1)?;
        let next_id = entries.iter().map(|entry| entry.id).max().unwrap_or(0) + 1;
        Some(Self {
            cursor: if cursor <= last { cursor } else { last },
            entries,
            next_id,
            selected_preset,
        })
    }

    pub fn entries(&self) -> &[TimelineEntry<S>] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected_preset(&self) -> Option<&str> {
        self.selected_preset.as_deref()
    }

    /// Entry under the cursor.
    pub fn current_entry(&self) -> &TimelineEntry<S> {
        // entries is never empty and cursor always indexes it
        &self.entries[self.cursor]
    }

    /// Snapshot under the cursor.
    pub fn current(&self) -> &S {
        &self.current_entry().snapshot
    }

    /// Appends `snapshot` after the cursor and moves onto it.
    pub fn commit(&mut self, kind: OperationKind, label: impl Into<String>, snapshot: S) -> &S {
        self.entries.truncate(self.cursor + 1);
        let entry = TimelineEntry {
            id: self.next_id,
            kind,
            label: label.into(),
            created_at: Utc::now().timestamp_millis(),
            snapshot,
        };
        debug!(id = entry.id, label = %entry.label, "Committed timeline entry");
        self.entries.push(entry);
        self.next_id += 1;
        self.cursor = self.entries.len() - 1;
        self.current()
    }

    /// Quotes against the present snapshot and commits the applied result
    /// when the quote succeeds. The quote is returned either way.
    pub fn execute<Q, FQ, FA>(&mut self, kind: OperationKind, label: impl Into<String>, quote_fn: FQ, apply_fn: FA) -> Quote<Q>
    where
        FQ: FnOnce(&S) -> Quote<Q>,
        FA: FnOnce(&S, &Quote<Q>) -> S,
    {
        let quote = quote_fn(self.current());
        if quote.is_ok() {
            let next = apply_fn(self.current(), &quote);
            self.commit(kind, label, next);
        }
        quote
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Steps back one entry. Returns whether the cursor moved.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Steps forward one entry. Returns whether the cursor moved.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Moves the cursor to `index`; out-of-range indices are ignored.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        self.cursor = index;
        true
    }
}

pub fn init_label(preset_label: &str) -> String {
    format!("Init ({preset_label})")
}

pub fn swap_label(direction: SwapDirection, symbol_x: &str, symbol_y: &str) -> String {
    match direction {
        SwapDirection::XToY => format!("Swap {symbol_x}->{symbol_y}"),
        SwapDirection::YToX => format!("Swap {symbol_y}->{symbol_x}"),
    }
}

pub fn add_liquidity_label(symbol_x: &str, symbol_y: &str) -> String {
    format!("Add Liquidity ({symbol_x}/{symbol_y})")
}

pub fn remove_liquidity_label(symbol_x: &str, symbol_y: &str) -> String {
    format!("Remove Liquidity ({symbol_x}/{symbol_y})")
}

pub fn fee_tier_label(fee_tier: FeeTier) -> String {
    format!("Update Fee Tier ({fee_tier})")
}

pub const FEE_RATE_LABEL: &str = "Update Fee Rate";
pub const TOKEN_META_LABEL: &str = "Update Token Meta";
