use serde::{Deserialize, Serialize};

/// Candidates offered for the current word and the highlighted one.
///
/// An empty list means suggestions are inactive; `active_index` is then 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionSet {
    pub candidates: Vec<String>,
    pub active_index: usize,
}

impl SuggestionSet {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn active(&self) -> Option<&str> {
        self.candidates.get(self.active_index).map(String::as_str)
    }
}

/// Keyboard and pointer driven selection over a [`SuggestionSet`].
#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    set: SuggestionSet,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suggestions(&self) -> &SuggestionSet {
        &self.set
    }

    pub fn is_active(&self) -> bool {
        !self.set.is_empty()
    }

    pub fn set_candidates(&mut self, candidates: Vec<String>) {
        self.set = SuggestionSet {
            candidates,
            active_index: 0,
        };
    }

    pub fn clear(&mut self) -> bool {
        let had_candidates = self.is_active();
        self.set = SuggestionSet::default();
        had_candidates
    }

    pub fn move_up(&mut self) -> bool {
        if self.set.active_index == 0 {
            return false;
        }
        self.set.active_index -= 1;
        true
    }

    pub fn move_down(&mut self) -> bool {
        if self.set.active_index + 1 >= self.set.candidates.len() {
            return false;
        }
        self.set.active_index += 1;
        true
    }

    pub fn hover(&mut self, index: usize) -> bool {
        if index >= self.set.candidates.len() || index == self.set.active_index {
            return false;
        }
        self.set.active_index = index;
        true
    }

    /// Takes the highlighted candidate and clears the set.
    ///
    /// `None` when there is nothing to confirm; the caller then inserts a
    /// plain separator instead.
    pub fn confirm(&mut self) -> Option<String> {
        let set = std::mem::take(&mut self.set);
        let SuggestionSet {
            mut candidates,
            active_index,
        } = set;
        if active_index < candidates.len() {
            Some(candidates.swap_remove(active_index))
        } else {
            None
        }
    }
}
