//! Command ledger: reversible records of inventory transitions and the
//! undo/redo stacks that replay them.
//!
//! A command stores full before/after snapshots of the edits it touched, so
//! replay never depends on re-running the gesture that produced it. Replay
//! resolves ids against the live project; ids that disappeared in the
//! meantime are logged and skipped rather than failing the whole step.

#[cfg(test)]
#[path = "command_test.rs"]
mod command_test;

use crate::consts::HISTORY_LIMIT;
use crate::doc::{Edit, EditId};
use crate::inventory::{Owner, Project, Removed};

/// One reversible state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Edits replaced in place.
    UpdateEdits { owner: Owner, previous: Vec<Edit>, current: Vec<Edit> },
    /// Draw order replaced wholesale.
    ReorderEdits { owner: Owner, previous_order: Vec<EditId>, current_order: Vec<EditId> },
    /// New edits appended to `owner`.
    CreateEdits { owner: Owner, edits: Vec<Edit> },
    /// Edits removed, in removal order.
    DeleteEdits { owner: Owner, removed: Vec<Removed> },
}

impl Command {
    /// Short name for logs and audit text.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::UpdateEdits { .. } => "update",
            Self::ReorderEdits { .. } => "reorder",
            Self::CreateEdits { .. } => "create",
            Self::DeleteEdits { .. } => "delete",
        }
    }

    #[must_use]
    pub fn owner(&self) -> Owner {
        match self {
            Self::UpdateEdits { owner, .. }
            | Self::ReorderEdits { owner, .. }
            | Self::CreateEdits { owner, .. }
            | Self::DeleteEdits { owner, .. } => *owner,
        }
    }

    /// Number of edits the command touched.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::UpdateEdits { current, .. } => current.len(),
            Self::ReorderEdits { current_order, .. } => current_order.len(),
            Self::CreateEdits { edits, .. } => edits.len(),
            Self::DeleteEdits { removed, .. } => removed.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Restore the state before this command.
    pub fn revert(&self, project: &mut Project) {
        match self {
            Self::UpdateEdits { previous, .. } => {
                project.update_edits(previous);
            }
            Self::ReorderEdits { owner, previous_order, .. } => apply_order(project, *owner, previous_order),
            Self::CreateEdits { edits, .. } => {
                let ids: Vec<EditId> = edits.iter().map(Edit::id).collect();
                project.delete(&ids);
            }
            Self::DeleteEdits { removed, .. } => {
                for r in removed.iter().rev() {
                    if let Err(e) = project.restore(r) {
                        tracing::warn!(error = %e, edit_id = %r.edit.id(), "undo delete: restore skipped");
                    }
                }
            }
        }
    }

    /// Re-apply this command.
    pub fn apply(&self, project: &mut Project) {
        match self {
            Self::UpdateEdits { current, .. } => {
                project.update_edits(current);
            }
            Self::ReorderEdits { owner, current_order, .. } => apply_order(project, *owner, current_order),
            Self::CreateEdits { owner, edits } => {
                for edit in edits {
                    if let Err(e) = project.create(*owner, edit.clone()) {
                        tracing::warn!(error = %e, edit_id = %edit.id(), "redo create: insert skipped");
                    }
                }
            }
            Self::DeleteEdits { removed, .. } => {
                let ids: Vec<EditId> = removed.iter().map(|r| r.edit.id()).collect();
                project.delete(&ids);
            }
        }
    }
}

/// Apply a recorded order against the live inventory: recorded ids that no
/// longer exist are dropped, live ids the record lacks keep their relative
/// order at the end.
fn apply_order(project: &mut Project, owner: Owner, order: &[EditId]) {
    let live = project.ordered_ids(owner);
    let mut resolved: Vec<EditId> = order.iter().copied().filter(|id| live.contains(id)).collect();
    if resolved.len() != order.len() {
        tracing::warn!(?owner, missing = order.len() - resolved.len(), "reorder: recorded ids missing from inventory");
    }
    resolved.extend(live.iter().copied().filter(|id| !order.contains(id)));
    if let Err(e) = project.reorder(owner, &resolved) {
        tracing::warn!(error = %e, ?owner, "reorder replay skipped");
    }
}

/// Undo and redo stacks.
#[derive(Debug, Clone)]
pub struct History {
    /// Most recent last.
    undo: Vec<Command>,
    /// Most recent last.
    redo: Vec<Command>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }
}

impl History {
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self { undo: Vec::new(), redo: Vec::new(), limit: limit.max(1) }
    }

    /// Record a command that has already been applied. Clears redo.
    pub fn push(&mut self, command: Command) {
        self.redo.clear();
        self.undo.push(command);
        if self.undo.len() > self.limit {
            let excess = self.undo.len() - self.limit;
            self.undo.drain(..excess);
        }
    }

    /// Revert the latest command against `project`. Returns it, or `None`
    /// when there is nothing to undo.
    pub fn undo(&mut self, project: &mut Project) -> Option<&Command> {
        let command = self.undo.pop()?;
        command.revert(project);
        tracing::debug!(command = command.label(), "undo");
        self.redo.push(command);
        self.redo.last()
    }

    /// Re-apply the latest undone command against `project`.
    pub fn redo(&mut self, project: &mut Project) -> Option<&Command> {
        let command = self.redo.pop()?;
        command.apply(project);
        tracing::debug!(command = command.label(), "redo");
        self.undo.push(command);
        self.undo.last()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[must_use]
    pub fn undo_count(&self) -> usize {
        self.undo.len()
    }

    #[must_use]
    pub fn redo_count(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
