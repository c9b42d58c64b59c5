//! Rank reconciliation for column partitions.
//!
//! Every (owner, status) column keeps its tasks ranked `0..n` with no gaps and
//! no duplicates. The functions here are pure: they take a snapshot of the
//! affected column(s) and return the rank changes that restore that invariant
//! after an insertion, a move or a removal. Callers hold the column lock
//! while reading the snapshot, planning and writing the result back.
//!
//! Snapshots are ordered by `(rank, created_at, id)`, so a column that picked
//! up duplicate or skipped ranks (hand-edited data, an older writer) is
//! normalized the next time it is reconciled.

use crate::error::{BoardError, Result};
use crate::types::{ColumnId, Task, TaskId};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;

/// New placement for one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankChange {
    pub id: TaskId,
    pub status: ColumnId,
    pub rank: u32,
}

/// The set of placements a reconciliation must write
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Reconciliation {
    changes: Vec<RankChange>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankChange> {
        self.changes.iter()
    }

    /// New rank for `id`, if this reconciliation moves it
    pub fn rank_of(&self, id: &TaskId) -> Option<u32> {
        self.changes.iter().find(|c| &c.id == id).map(|c| c.rank)
    }

    /// The same reconciliation minus any placement of `id`
    pub fn without(&self, id: &TaskId) -> Reconciliation {
        Reconciliation {
            changes: self.changes.iter().filter(|c| &c.id != id).cloned().collect(),
        }
    }

    /// Apply the changes to an in-memory copy of the tasks
    pub fn apply_to(&self, tasks: &mut [Task]) {
        for change in &self.changes {
            if let Some(task) = tasks.iter_mut().find(|t| t.id == change.id) {
                task.status = change.status.clone();
                task.rank = change.rank;
            }
        }
    }

    /// Record a placement for every task in `ordered` whose rank or status differs
    fn renumber(&mut self, ordered: &[&Task], status: &ColumnId) {
        for (index, task) in ordered.iter().enumerate() {
            let rank = index as u32;
            if task.rank != rank || &task.status != status {
                self.changes.push(RankChange {
                    id: task.id.clone(),
                    status: status.clone(),
                    rank,
                });
            }
        }
    }
}

impl IntoIterator for Reconciliation {
    type Item = RankChange;
    type IntoIter = std::vec::IntoIter<RankChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

/// Sort a column into display order
pub fn sort_column(tasks: &mut [Task]) {
    tasks.sort_by(display_order);
}

fn display_order(a: &Task, b: &Task) -> Ordering {
    a.rank
        .cmp(&b.rank)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

fn ordered(tasks: &[Task]) -> Vec<&Task> {
    let mut refs: Vec<&Task> = tasks.iter().collect();
    refs.sort_by(|a, b| display_order(a, b));
    refs
}

/// Rank for a task appended to the end of `column`
pub fn append_rank(column: &[Task]) -> Result<u32> {
    match column.iter().map(|t| t.rank).max() {
        None => Ok(0),
        Some(max) => max
            .checked_add(1)
            .ok_or_else(|| BoardError::invalid_value("rank", "column has no rank left to append at")),
    }
}

/// Plan moving `id` to position `target_rank`.
///
/// `source` is the column the task currently sits in. `destination` is the
/// target column's status and tasks when the move crosses columns; `None` (or
/// a destination naming the source status) reorders within `source`.
/// `target_rank` counts positions among the destination's tasks after the
/// moving task has been taken out.
pub fn plan_move(
    id: &TaskId,
    source: &[Task],
    destination: Option<(&ColumnId, &[Task])>,
    target_rank: usize,
) -> Result<Reconciliation> {
    let mut remaining = ordered(source);
    let index = remaining
        .iter()
        .position(|t| &t.id == id)
        .ok_or_else(|| BoardError::TaskNotFound { id: id.to_string() })?;
    let moving = remaining.remove(index);
    let source_status = moving.status.clone();

    let mut plan = Reconciliation::default();
    match destination {
        Some((status, tasks)) if status != &source_status => {
            let mut target: Vec<&Task> = ordered(tasks)
                .into_iter()
                .filter(|t| &t.id != id)
                .collect();
            check_target(target_rank, target.len())?;
            target.insert(target_rank, moving);

            plan.renumber(&remaining, &source_status);
            plan.renumber(&target, status);
        }
        _ => {
            check_target(target_rank, remaining.len())?;
            remaining.insert(target_rank, moving);
            plan.renumber(&remaining, &source_status);
        }
    }

    tracing::debug!(
        task = %id,
        target_rank,
        changes = plan.len(),
        "planned move"
    );
    Ok(plan)
}

fn check_target(target_rank: usize, len: usize) -> Result<()> {
    if target_rank > len {
        return Err(BoardError::invalid_value(
            "order",
            format!("position {target_rank} is outside 0..={len}"),
        ));
    }
    Ok(())
}

/// Plan an explicit full ordering of `column`: rank = index in `order`.
///
/// `order` must name every task in the column exactly once.
pub fn plan_bulk(column: &[Task], status: &ColumnId, order: &[TaskId]) -> Result<Reconciliation> {
    let mut seen = HashSet::with_capacity(order.len());
    for id in order {
        if !seen.insert(id) {
            return Err(BoardError::invalid_reorder(format!("duplicate task id {id}")));
        }
    }

    let members: HashSet<&TaskId> = column.iter().map(|t| &t.id).collect();
    if let Some(extra) = order.iter().find(|id| !members.contains(id)) {
        return Err(BoardError::invalid_reorder(format!(
            "task {extra} is not in column {status}"
        )));
    }
    if let Some(missing) = column.iter().find(|t| !seen.contains(&t.id)) {
        return Err(BoardError::invalid_reorder(format!(
            "task {} is missing from the submitted order",
            missing.id
        )));
    }

    let reordered: Vec<&Task> = order
        .iter()
        .filter_map(|id| column.iter().find(|t| &t.id == id))
        .collect();

    let mut plan = Reconciliation::default();
    plan.renumber(&reordered, status);
    Ok(plan)
}

/// Plan closing the gap left by removing `removed` from `column`
pub fn plan_compact(column: &[Task], removed: &TaskId) -> Reconciliation {
    let remaining: Vec<&Task> = ordered(column)
        .into_iter()
        .filter(|t| &t.id != removed)
        .collect();

    let mut plan = Reconciliation::default();
    if let Some(first) = remaining.first() {
        let status = first.status.clone();
        plan.renumber(&remaining, &status);
    }
    plan
}
