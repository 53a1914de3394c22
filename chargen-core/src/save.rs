//! Committing changed selections back to the character record.
//!
//! The coordinator diffs the local selection sets against each
//! choice's committed selection and commits only the choices that
//! changed, one call per choice, stopping at the first failure.

use crate::choice::PendingChoice;
use crate::selection::SelectionStore;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tomekeeper::ChoiceClient;

/// Errors from saving selections.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Commit failed: {0}")]
    Client(#[from] tomekeeper::Error),
}

/// Diffs local selections against committed state and issues commits.
pub struct SaveCoordinator {
    client: Arc<dyn ChoiceClient>,
    saving: AtomicBool,
}

impl SaveCoordinator {
    pub fn new(client: Arc<dyn ChoiceClient>) -> Self {
        Self {
            client,
            saving: AtomicBool::new(false),
        }
    }

    /// True while a save pass is running, so the UI can disable the
    /// save control.
    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::SeqCst)
    }

    /// Commit every choice whose local selection differs from its
    /// committed one.
    ///
    /// Choices with an empty local set, or a local set identical to
    /// the committed selection, are skipped. The pass stops at the
    /// first failed commit and propagates it; the busy flag is cleared
    /// either way. Concurrent invocations are not defended against and
    /// must be serialized by the caller.
    pub async fn save_all(
        &self,
        store: &SelectionStore,
        choices: &[PendingChoice],
    ) -> Result<(), SaveError> {
        self.saving.store(true, Ordering::SeqCst);
        let result = self.commit_changed(store, choices).await;
        self.saving.store(false, Ordering::SeqCst);
        result
    }

    async fn commit_changed(
        &self,
        store: &SelectionStore,
        choices: &[PendingChoice],
    ) -> Result<(), SaveError> {
        for choice in choices {
            let Some(local) = store.selections().get(&choice.id) else {
                continue;
            };
            if local.is_empty() {
                continue;
            }
            if matches_committed(local, &choice.selected) {
                continue;
            }

            // Sorted for a deterministic payload.
            let mut selected: Vec<String> = local.iter().cloned().collect();
            selected.sort();

            tracing::debug!(choice_id = %choice.id, count = selected.len(), "committing choice");
            self.client.commit_choice(&choice.id, &selected).await?;
        }
        Ok(())
    }
}

/// Same size and same membership, ignoring order.
fn matches_committed(local: &HashSet<String>, committed: &[String]) -> bool {
    local.len() == committed.len() && committed.iter().all(|id| local.contains(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice::{ChoiceKind, ChoiceSource};
    use crate::testing::MockClient;

    fn choice(id: &str, quantity: u32, selected: &[&str]) -> PendingChoice {
        PendingChoice {
            id: id.to_string(),
            kind: ChoiceKind::Language,
            subtype: None,
            source: ChoiceSource::Race,
            quantity,
            remaining: 0,
            selected: selected.iter().map(|s| s.to_string()).collect(),
            options: Vec::new(),
            options_endpoint: None,
        }
    }

    #[tokio::test]
    async fn test_no_commits_when_local_mirrors_committed() {
        let client = Arc::new(MockClient::new());
        let coordinator = SaveCoordinator::new(client.clone());

        let c = choice("langs", 2, &["elvish", "dwarvish"]);
        let mut store = SelectionStore::default();
        store.seed(&c);

        coordinator.save_all(&store, &[c]).await.unwrap();
        assert!(client.commits().is_empty());
    }

    #[tokio::test]
    async fn test_one_commit_per_changed_choice() {
        let client = Arc::new(MockClient::new());
        let coordinator = SaveCoordinator::new(client.clone());

        let unchanged = choice("a", 1, &["common"]);
        let changed = choice("b", 2, &["elvish"]);
        let untouched = choice("c", 1, &[]);

        let mut store = SelectionStore::default();
        store.seed(&unchanged);
        store.toggle(&changed, "dwarvish");

        coordinator
            .save_all(&store, &[unchanged, changed, untouched.clone()])
            .await
            .unwrap();

        let commits = client.commits();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].0, "b");
        assert_eq!(commits[0].1, vec!["dwarvish".to_string(), "elvish".to_string()]);
        // Empty local set for "c" was skipped entirely.
        assert_eq!(store.selected_count(&untouched.id), 0);
    }

    #[tokio::test]
    async fn test_aborts_on_first_failure() {
        let client = Arc::new(MockClient::new());
        client.fail_commit("a");
        let coordinator = SaveCoordinator::new(client.clone());

        let first = choice("a", 1, &[]);
        let second = choice("b", 1, &[]);
        let mut store = SelectionStore::default();
        store.toggle(&first, "one");
        store.toggle(&second, "two");

        let result = coordinator.save_all(&store, &[first, second]).await;
        assert!(matches!(result, Err(SaveError::Client(_))));

        // The second commit never went out.
        assert!(client.commits().is_empty());
    }

    #[tokio::test]
    async fn test_busy_flag_cleared_after_failure() {
        let client = Arc::new(MockClient::new());
        client.fail_commit("a");
        let coordinator = SaveCoordinator::new(client.clone());

        let c = choice("a", 1, &[]);
        let mut store = SelectionStore::default();
        store.toggle(&c, "one");

        assert!(!coordinator.is_saving());
        let _ = coordinator.save_all(&store, &[c]).await;
        assert!(!coordinator.is_saving());
    }

    #[tokio::test]
    async fn test_membership_comparison_ignores_order() {
        let client = Arc::new(MockClient::new());
        let coordinator = SaveCoordinator::new(client.clone());

        // Committed order differs from set iteration order; still equal.
        let c = choice("langs", 2, &["dwarvish", "elvish"]);
        let mut store = SelectionStore::default();
        store.seed(&c);

        coordinator.save_all(&store, &[c]).await.unwrap();
        assert!(client.commits().is_empty());
    }
}
