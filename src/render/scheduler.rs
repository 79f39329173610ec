//! Change-coalescing render scheduler.
//!
//! Callers describe what changed with a [`ChangeKind`] and a
//! [`ChangeScope`]. Requests are merged per scope, keeping the most severe
//! kind, and applied in one flush per tick. Nothing renders inside
//! [`ChangeScheduler::request_change`].

use crate::model::NodeId;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::trace;

/// What part of the display a change affects.
///
/// Ordered by severity: a more severe kind subsumes the work of every
/// less severe kind for the same scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Anything may have changed. Same as `Structure`.
    Any,
    /// Nodes were added, removed, expanded or collapsed.
    Structure,
    /// Column declarations or container width changed.
    Header,
    /// Rebuild a row entirely.
    Row,
    /// Title, icon or cell contents changed.
    Data,
    /// State classes changed (active, selected, loading).
    Status,
    /// Scroll offset changed.
    Vscroll,
}

impl ChangeKind {
    /// Severity rank, higher subsumes lower.
    pub fn severity(self) -> u8 {
        match self {
            Self::Vscroll => 0,
            Self::Status => 1,
            Self::Data => 2,
            Self::Row => 3,
            Self::Header => 4,
            Self::Structure | Self::Any => 5,
        }
    }

    /// Whether the change requires a full viewport rebuild.
    pub fn is_rebuild(self) -> bool {
        self.severity() >= Self::Structure.severity()
    }

    /// The more severe of two kinds. Ties keep `self`.
    pub fn max_severity(self, other: Self) -> Self {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }

    /// Whether the kind only makes sense for the whole tree.
    fn is_tree_wide(self) -> bool {
        matches!(self, Self::Vscroll | Self::Header) || self.is_rebuild()
    }
}

/// Target of a change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangeScope {
    /// Every materialized row.
    Tree,
    /// A single node's row.
    Node(NodeId),
}

impl ChangeScope {
    /// Scope the request applies to after normalization.
    ///
    /// Structure, header and scroll changes always affect the whole tree.
    pub fn normalized(self, kind: ChangeKind) -> Self {
        if kind.is_tree_wide() {
            Self::Tree
        } else {
            self
        }
    }
}

/// Work to perform in one flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushPlan {
    /// Re-resolve columns and regenerate every visible row.
    Rebuild,
    /// Apply requests in ascending severity.
    Partial(Vec<(ChangeScope, ChangeKind)>),
}

/// Counters for observing coalescing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Calls to `request_change`.
    pub requests: u64,
    /// Ticks scheduled.
    pub ticks_scheduled: u64,
    /// Deferred flushes performed.
    pub flushes: u64,
    /// Immediate flushes performed.
    pub immediate_flushes: u64,
    /// Flushes that rebuilt the viewport.
    pub rebuilds: u64,
}

/// Pending change requests for one tree.
#[derive(Debug, Clone, Default)]
pub struct ChangeScheduler {
    pending: BTreeMap<ChangeScope, ChangeKind>,
    deferred: BTreeMap<ChangeScope, ChangeKind>,
    tick_scheduled: bool,
    flushing: bool,
    stats: SchedulerStats,
}

impl ChangeScheduler {
    /// Create an idle scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change for the next flush.
    ///
    /// Returns `true` if this call scheduled a new tick. Requests arriving
    /// while a flush runs are held for the tick after it.
    pub fn request_change(&mut self, kind: ChangeKind, scope: ChangeScope) -> bool {
        self.stats.requests += 1;
        let scope = scope.normalized(kind);
        if self.flushing {
            merge(&mut self.deferred, scope, kind);
            trace!(?kind, ?scope, "change deferred until after current flush");
            return false;
        }
        merge(&mut self.pending, scope, kind);
        self.schedule_tick()
    }

    fn schedule_tick(&mut self) -> bool {
        if self.tick_scheduled {
            return false;
        }
        self.tick_scheduled = true;
        self.stats.ticks_scheduled += 1;
        true
    }

    /// Whether a flush is due on the next tick.
    pub fn is_tick_scheduled(&self) -> bool {
        self.tick_scheduled
    }

    /// Whether a flush is running.
    pub fn is_flushing(&self) -> bool {
        self.flushing
    }

    /// Pending kind for a scope.
    pub fn pending(&self, scope: ChangeScope) -> Option<ChangeKind> {
        self.pending.get(&scope).copied()
    }

    /// Number of pending scopes.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Coalescing counters.
    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    /// Start a deferred flush, taking all pending requests.
    ///
    /// Returns `None` when nothing is pending. Must be paired with
    /// [`end_flush`](Self::end_flush).
    pub fn begin_flush(&mut self) -> Option<FlushPlan> {
        self.tick_scheduled = false;
        if self.pending.is_empty() {
            return None;
        }
        let pending = std::mem::take(&mut self.pending);
        self.flushing = true;
        self.stats.flushes += 1;
        let plan = plan_flush(pending);
        if plan == FlushPlan::Rebuild {
            self.stats.rebuilds += 1;
        }
        Some(plan)
    }

    /// Finish a flush. Requests made during it become pending and a new
    /// tick is scheduled for them.
    pub fn end_flush(&mut self) {
        self.flushing = false;
        if self.deferred.is_empty() {
            return;
        }
        let deferred = std::mem::take(&mut self.deferred);
        for (scope, kind) in deferred {
            merge(&mut self.pending, scope, kind);
        }
        self.schedule_tick();
    }

    /// Take a single request for synchronous application.
    ///
    /// A pending request for the same scope that the immediate one
    /// subsumes is dropped. During a flush the request is deferred
    /// instead and `None` is returned.
    pub fn take_immediate(&mut self, kind: ChangeKind, scope: ChangeScope) -> Option<FlushPlan> {
        self.stats.requests += 1;
        let scope = scope.normalized(kind);
        if self.flushing {
            merge(&mut self.deferred, scope, kind);
            return None;
        }
        if kind.is_rebuild() {
            // A rebuild covers everything pending.
            self.pending.clear();
            self.stats.rebuilds += 1;
            self.stats.immediate_flushes += 1;
            return Some(FlushPlan::Rebuild);
        }
        if self
            .pending
            .get(&scope)
            .is_some_and(|pending| pending.severity() <= kind.severity())
        {
            self.pending.remove(&scope);
        }
        self.stats.immediate_flushes += 1;
        Some(FlushPlan::Partial(vec![(scope, kind)]))
    }
}

fn merge(map: &mut BTreeMap<ChangeScope, ChangeKind>, scope: ChangeScope, kind: ChangeKind) {
    map.entry(scope)
        .and_modify(|existing| *existing = existing.max_severity(kind))
        .or_insert(kind);
}

/// Turn merged requests into a flush plan.
///
/// Node entries already covered by an equal or more severe tree-wide
/// entry are dropped.
pub fn plan_flush(pending: BTreeMap<ChangeScope, ChangeKind>) -> FlushPlan {
    if pending.values().any(|kind| kind.is_rebuild()) {
        return FlushPlan::Rebuild;
    }
    let tree_severity = pending.get(&ChangeScope::Tree).map(|k| k.severity());
    let mut items: Vec<(ChangeScope, ChangeKind)> = pending
        .into_iter()
        .filter(|(scope, kind)| match (scope, tree_severity) {
            (ChangeScope::Node(_), Some(tree)) => kind.severity() > tree,
            _ => true,
        })
        .collect();
    // Stable sort keeps scope order within one severity.
    items.sort_by_key(|(_, kind)| kind.severity());
    FlushPlan::Partial(items)
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
