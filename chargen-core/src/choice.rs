//! Pending choices and their options.
//!
//! A pending choice is a decision point the character must resolve
//! while being created or leveled up: a language, a skill or tool
//! proficiency, a spell, a subclass, or an ability score improvement.
//! The remote record reports each one with its already-committed
//! selection and either an inline option list or an endpoint the
//! options can be fetched from.

use serde::{Deserialize, Serialize};

/// What kind of decision a pending choice represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceKind {
    Language,
    Proficiency,
    Spell,
    Subclass,
    AbilityScore,
}

impl ChoiceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ChoiceKind::Language => "Language",
            ChoiceKind::Proficiency => "Proficiency",
            ChoiceKind::Spell => "Spell",
            ChoiceKind::Subclass => "Subclass",
            ChoiceKind::AbilityScore => "Ability Score",
        }
    }
}

/// Where a pending choice comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceSource {
    Race,
    Class,
    Background,
    Feat,
}

impl ChoiceSource {
    pub fn name(&self) -> &'static str {
        match self {
            ChoiceSource::Race => "Race",
            ChoiceSource::Class => "Class",
            ChoiceSource::Background => "Background",
            ChoiceSource::Feat => "Feat",
        }
    }
}

/// A selectable option, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Globally unique slug.
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A decision point the character must resolve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingChoice {
    /// Stable key, unique across all of a character's choices.
    pub id: String,

    #[serde(rename = "type")]
    pub kind: ChoiceKind,

    /// Finer-grained variant, e.g. "asi_or_feat" for ability score
    /// choices.
    #[serde(default)]
    pub subtype: Option<String>,

    pub source: ChoiceSource,

    /// Number of options this choice requires.
    pub quantity: u32,

    /// Server-reported outstanding count. May lag behind local edits;
    /// see [`crate::selection::SelectionStore::remaining_for`] for the
    /// live value.
    #[serde(default)]
    pub remaining: u32,

    /// Already-committed option ids, in commit order.
    #[serde(default)]
    pub selected: Vec<String>,

    /// Inline option list. Empty when the options live behind an
    /// endpoint.
    #[serde(default)]
    pub options: Vec<ChoiceOption>,

    /// Endpoint to fetch options from when `options` is empty.
    #[serde(default)]
    pub options_endpoint: Option<String>,
}

impl PendingChoice {
    /// True when this choice's option list must be fetched remotely.
    pub fn needs_fetch(&self) -> bool {
        self.options.is_empty() && self.options_endpoint.is_some()
    }
}
