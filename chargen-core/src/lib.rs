//! Choice resolution and eligibility engine for character creation.
//!
//! This crate implements the selection workflow of the character
//! builder:
//! - Uncommitted selection state with quantity, cross-choice
//!   exclusivity, and already-granted constraints
//! - Ability-score prerequisite evaluation for multiclassing
//! - Preparation limits and cross-class lookups for prepared spells
//! - Lazy option-list fetching and diff-based saving
//!
//! Rendering, routing, and persistence live elsewhere; the engine only
//! manages the selection workflow up to handing finalized payloads to
//! the [`tomekeeper`] client.
//!
//! # Quick Start
//!
//! ```ignore
//! use chargen_core::{OptionResolver, SaveCoordinator, SelectionStore};
//! use std::sync::Arc;
//! use tomekeeper::TomekeeperClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(TomekeeperClient::from_env()?);
//!     let resolver = OptionResolver::new(client.clone());
//!     let coordinator = SaveCoordinator::new(client);
//!
//!     let mut store = SelectionStore::new(granted_ids);
//!     for choice in &pending_choices {
//!         store.seed(choice);
//!         resolver.fetch_options_if_needed(choice).await;
//!     }
//!
//!     store.toggle(&pending_choices[0], "elvish");
//!     if store.all_complete(&pending_choices) {
//!         coordinator.save_all(&store, &pending_choices).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod choice;
pub mod eligibility;
pub mod preparation;
pub mod resolver;
pub mod save;
pub mod selection;
pub mod testing;

// Primary public API
pub use choice::{ChoiceKind, ChoiceOption, ChoiceSource, PendingChoice};
pub use eligibility::{
    evaluate, Ability, AbilityScores, Combinator, Eligibility, Prerequisite,
    PrerequisiteExpression,
};
pub use preparation::{
    class_display_name, ClassSpellcasting, PreparationLimit, PreparationMethod,
    PreparationTracker, PreparedSpell, SpellSlotLevel, SpellcastingStats,
};
pub use resolver::OptionResolver;
pub use save::{SaveCoordinator, SaveError};
pub use selection::{DisabledReason, SelectionStore};
pub use testing::MockClient;
