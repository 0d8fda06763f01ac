//! The undoable/redoable record of applied change sets

use strand_foundation::{ChangeSet, ChangeSetInfo, StrandError, StrandResult};

/// Ordered, indexed record of applied and reverted change sets.
///
/// Both lists are kept most-recent-first, so index 0 is always the change a
/// bare undo/redo targets. Every index-taking operation validates the index
/// against the current list length before any mutation; out-of-range indices
/// are rejected with no side effects.
///
/// The two-phase undo/redo surface (`undo_entry` then `complete_undo`) lets
/// the caller apply the inverse through the engine between the bounds check
/// and the stack mutation — a failed apply leaves both stacks untouched.
#[derive(Debug, Default)]
pub struct ChangeHistory {
    undo_list: Vec<ChangeSet>,
    redo_list: Vec<ChangeSet>,
    max_depth: Option<usize>,
}

impl ChangeHistory {
    /// Create an empty history. `max_depth` caps the undo list; recording
    /// past the cap drops the oldest entries.
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            undo_list: Vec::new(),
            redo_list: Vec::new(),
            max_depth,
        }
    }

    /// Record a newly applied change set. Any redoable history is invalidated
    /// by a new forward action.
    pub fn record(&mut self, change_set: ChangeSet) {
        self.undo_list.insert(0, change_set);
        if let Some(depth) = self.max_depth {
            self.undo_list.truncate(depth);
        }
        self.redo_list.clear();
    }

    /// The undoable entry at `index`, most-recent-first.
    pub fn undo_entry(&self, index: usize) -> StrandResult<&ChangeSet> {
        Self::entry(&self.undo_list, index)
    }

    /// The redoable entry at `index`, most-recent-first.
    pub fn redo_entry(&self, index: usize) -> StrandResult<&ChangeSet> {
        Self::entry(&self.redo_list, index)
    }

    /// Finish an undo: drop the entry at `index` from the undo list and push
    /// the committed inverse onto the redo list.
    ///
    /// Callers must have obtained `index` from a successful [`undo_entry`]
    /// call under the same exclusive borrow.
    ///
    /// [`undo_entry`]: ChangeHistory::undo_entry
    pub fn complete_undo(&mut self, index: usize, inverse: ChangeSet) {
        self.undo_list.remove(index);
        self.redo_list.insert(0, inverse);
    }

    /// Finish a redo, symmetrically to [`complete_undo`].
    ///
    /// [`complete_undo`]: ChangeHistory::complete_undo
    pub fn complete_redo(&mut self, index: usize, inverse: ChangeSet) {
        self.redo_list.remove(index);
        self.undo_list.insert(0, inverse);
    }

    /// Descriptions of all undoable changes, most-recent-first.
    pub fn describe_undo_list(&self) -> Vec<String> {
        self.undo_list.iter().map(|cs| cs.description.clone()).collect()
    }

    /// Descriptions of all redoable changes, most-recent-first.
    pub fn describe_redo_list(&self) -> Vec<String> {
        self.redo_list.iter().map(|cs| cs.description.clone()).collect()
    }

    /// Full detail about the undoable entry at `index`.
    pub fn undo_info(&self, index: usize) -> StrandResult<ChangeSetInfo> {
        Self::entry(&self.undo_list, index).map(ChangeSetInfo::from)
    }

    /// Full detail about the redoable entry at `index`.
    pub fn redo_info(&self, index: usize) -> StrandResult<ChangeSetInfo> {
        Self::entry(&self.redo_list, index).map(ChangeSetInfo::from)
    }

    pub fn undo_len(&self) -> usize {
        self.undo_list.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_list.len()
    }

    /// Snapshot of both stacks, used by tests to verify failed operations
    /// leave the history untouched.
    pub fn snapshot(&self) -> (Vec<ChangeSet>, Vec<ChangeSet>) {
        (self.undo_list.clone(), self.redo_list.clone())
    }

    fn entry(list: &[ChangeSet], index: usize) -> StrandResult<&ChangeSet> {
        list.get(index).ok_or(StrandError::InvalidIndex {
            index,
            len: list.len(),
        })
    }
}
