//! Auto-save timing: a dirty flag plus a minimum interval between writes.

/// Default minimum time between two automatic saves.
pub const DEFAULT_AUTOSAVE_INTERVAL_MS: u64 = 1000;

/// Decides when the offline snapshot should be written.
#[derive(Debug, Clone)]
pub struct AutoSave {
    interval_ms: u64,
    last_save: Option<u64>,
    dirty: bool,
}

impl Default for AutoSave {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_INTERVAL_MS)
    }
}

impl AutoSave {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_save: None,
            dirty: false,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Mark the document as having unsaved changes.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Dirty and the interval has elapsed since the last save.
    pub fn should_save(&self, now_ms: u64) -> bool {
        if !self.dirty {
            return false;
        }
        match self.last_save {
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
            None => true,
        }
    }

    pub fn mark_saved(&mut self, now_ms: u64) {
        self.last_save = Some(now_ms);
        self.dirty = false;
    }
}
