//! Uncommitted selection state for pending choices.
//!
//! The store owns the per-choice selection sets for one editing
//! session. Constraint checks are queries (`is_disabled`,
//! `disabled_reason`) kept separate from the single mutation
//! (`toggle`); invalid toggles are silent no-ops, so the UI renders
//! from query results instead of attempting and catching.

use crate::choice::PendingChoice;
use std::collections::{HashMap, HashSet};

/// Why an option cannot be newly selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisabledReason {
    /// The character already has this option from elsewhere, e.g. a
    /// racial language.
    AlreadyKnown,
    /// The option is selected under a different pending choice.
    SelectedElsewhere,
}

impl DisabledReason {
    pub fn description(&self) -> &'static str {
        match self {
            DisabledReason::AlreadyKnown => "Already known",
            DisabledReason::SelectedElsewhere => "Already selected in another choice",
        }
    }
}

/// Per-session, per-choice selection sets.
///
/// Created once per editing session and discarded when the session
/// ends or the choice list is refreshed after a save.
#[derive(Debug, Default)]
pub struct SelectionStore {
    /// Choice id -> selected option ids.
    selections: HashMap<String, HashSet<String>>,
    /// Option ids the character possesses independent of any choice.
    granted: HashSet<String>,
}

impl SelectionStore {
    /// Create a store with the character's already-granted option ids.
    pub fn new(granted: HashSet<String>) -> Self {
        Self {
            selections: HashMap::new(),
            granted,
        }
    }

    /// Seed the store from a choice's committed selection.
    ///
    /// Only the first observation of a choice copies; later calls never
    /// clobber in-progress edits on re-render.
    pub fn seed(&mut self, choice: &PendingChoice) {
        if !self.selections.contains_key(&choice.id) {
            self.selections
                .insert(choice.id.clone(), choice.selected.iter().cloned().collect());
        }
    }

    /// Size of the selection set for a choice, 0 if unseeded.
    pub fn selected_count(&self, choice_id: &str) -> usize {
        self.selections.get(choice_id).map_or(0, HashSet::len)
    }

    pub fn is_selected(&self, choice_id: &str, option_id: &str) -> bool {
        self.selections
            .get(choice_id)
            .is_some_and(|set| set.contains(option_id))
    }

    /// True when the option cannot be newly selected under this choice.
    /// Deselection is never blocked.
    pub fn is_disabled(&self, choice_id: &str, option_id: &str) -> bool {
        self.disabled_reason(choice_id, option_id).is_some()
    }

    /// Why the option is disabled, if it is. `AlreadyKnown` takes
    /// precedence over `SelectedElsewhere`.
    pub fn disabled_reason(&self, choice_id: &str, option_id: &str) -> Option<DisabledReason> {
        if self.granted.contains(option_id) {
            return Some(DisabledReason::AlreadyKnown);
        }
        let elsewhere = self
            .selections
            .iter()
            .any(|(id, set)| id != choice_id && set.contains(option_id));
        if elsewhere {
            Some(DisabledReason::SelectedElsewhere)
        } else {
            None
        }
    }

    /// Toggle an option for a choice.
    ///
    /// Removing an existing selection always succeeds, even when the
    /// option would be disabled for new selection. Adding is silently
    /// refused when the option is disabled or the choice is already at
    /// quantity.
    pub fn toggle(&mut self, choice: &PendingChoice, option_id: &str) {
        self.seed(choice);

        if self.is_selected(&choice.id, option_id) {
            if let Some(set) = self.selections.get_mut(&choice.id) {
                set.remove(option_id);
            }
            return;
        }

        if self.is_disabled(&choice.id, option_id) {
            return;
        }
        if self.selected_count(&choice.id) >= choice.quantity as usize {
            return;
        }

        if let Some(set) = self.selections.get_mut(&choice.id) {
            set.insert(option_id.to_string());
        }
    }

    /// Locally computed outstanding count for a choice. The
    /// server-reported `remaining` field lags behind local edits.
    pub fn remaining_for(&self, choice: &PendingChoice) -> u32 {
        choice
            .quantity
            .saturating_sub(self.selected_count(&choice.id) as u32)
    }

    /// True when every choice in the list has reached its quantity.
    /// An empty list is vacuously complete.
    pub fn all_complete(&self, choices: &[PendingChoice]) -> bool {
        choices
            .iter()
            .all(|c| self.selected_count(&c.id) >= c.quantity as usize)
    }

    /// Read view of the per-choice selection sets, for the save path.
    pub fn selections(&self) -> &HashMap<String, HashSet<String>> {
        &self.selections
    }
}
