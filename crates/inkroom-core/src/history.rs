//! Snapshot undo/redo stacks.

use crate::elements::{Element, ElementId};
use std::collections::HashSet;

/// Maximum number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 100;

/// Undo/redo over full element snapshots.
///
/// `baseline` is the element state as of the last commit. Committing pushes the
/// baseline onto the undo stack, so undoing right after a commit restores the
/// state from before the committed action.
#[derive(Debug, Clone, Default)]
pub struct History {
    baseline: Vec<Element>,
    undo_stack: Vec<Vec<Element>>,
    redo_stack: Vec<Vec<Element>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `current` as the result of one action.
    pub fn commit(&mut self, current: &[Element]) {
        let previous = std::mem::replace(&mut self.baseline, current.to_vec());
        self.undo_stack.push(previous);
        self.redo_stack.clear();

        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Snapshot to restore, given the current state. `None` at the boundary.
    pub fn undo(&mut self, current: &[Element]) -> Option<Vec<Element>> {
        let snapshot = self.undo_stack.pop()?;
        self.redo_stack.push(current.to_vec());
        self.baseline = snapshot.clone();
        Some(snapshot)
    }

    pub fn redo(&mut self, current: &[Element]) -> Option<Vec<Element>> {
        let snapshot = self.redo_stack.pop()?;
        self.undo_stack.push(current.to_vec());
        self.baseline = snapshot.clone();
        Some(snapshot)
    }

    /// Carry a change made outside local history (`before` to `after`) into the
    /// baseline and every undo/redo entry, so restoring a snapshot never reverts it.
    pub fn merge_external(&mut self, before: &[Element], after: &[Element]) {
        let patch = ExternalPatch::between(before, after);
        if patch.is_empty() {
            return;
        }
        patch.apply(&mut self.baseline);
        for snapshot in self.undo_stack.iter_mut().chain(self.redo_stack.iter_mut()) {
            patch.apply(snapshot);
        }
    }

    /// Adopt `elements` as the baseline without recording an entry.
    pub fn rebase(&mut self, elements: &[Element]) {
        self.baseline = elements.to_vec();
    }

    pub fn reset(&mut self, elements: &[Element]) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.rebase(elements);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }
}

/// Element-level difference between two scene states.
struct ExternalPatch<'a> {
    after: &'a [Element],
    removed: HashSet<ElementId>,
    /// (before, after) pairs of elements present in both states.
    changed: Vec<(&'a Element, &'a Element)>,
    /// Indices into `after`.
    inserted: Vec<usize>,
}

impl<'a> ExternalPatch<'a> {
    fn between(before: &'a [Element], after: &'a [Element]) -> Self {
        let after_ids: HashSet<ElementId> = after.iter().map(Element::id).collect();
        let removed = before
            .iter()
            .map(Element::id)
            .filter(|id| !after_ids.contains(id))
            .collect();

        let mut changed = Vec::new();
        let mut inserted = Vec::new();
        for (index, new) in after.iter().enumerate() {
            match before.iter().find(|old| old.id() == new.id()) {
                Some(old) if old != new => changed.push((old, new)),
                Some(_) => {}
                None => inserted.push(index),
            }
        }
        Self {
            after,
            removed,
            changed,
            inserted,
        }
    }

    fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.changed.is_empty() && self.inserted.is_empty()
    }

    fn apply(&self, snapshot: &mut Vec<Element>) {
        snapshot.retain(|el| !self.removed.contains(&el.id()));

        // A snapshot holding its own version of the element keeps it.
        for (old, new) in &self.changed {
            if let Some(slot) = snapshot.iter_mut().find(|el| el.id() == new.id()) {
                if slot == *old {
                    *slot = (*new).clone();
                }
            }
        }

        for &index in &self.inserted {
            let element = &self.after[index];
            if snapshot.iter().any(|el| el.id() == element.id()) {
                continue;
            }
            // Right above the nearest element below it that the snapshot has.
            let position = self.after[..index]
                .iter()
                .rev()
                .find_map(|below| snapshot.iter().position(|el| el.id() == below.id()))
                .map_or(0, |i| i + 1);
            snapshot.insert(position, element.clone());
        }
    }
}
