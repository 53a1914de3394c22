//! Prepared-spell bookkeeping for single- and multiclass casters.
//!
//! Every count here is derived from the live prepared set the
//! character screen owns, never from a server-reported snapshot, so a
//! toggle is visible before its commit round-trip completes.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// How a spellcasting class obtains its castable spells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreparationMethod {
    /// Chosen from the full class list each day.
    Prepared,
    /// Fixed list learned on level-up.
    Known,
    /// Prepared from a personal spellbook.
    Spellbook,
}

impl PreparationMethod {
    pub fn name(&self) -> &'static str {
        match self {
            PreparationMethod::Prepared => "Prepared",
            PreparationMethod::Known => "Known",
            PreparationMethod::Spellbook => "Spellbook",
        }
    }

    /// Known casters never show preparation UI.
    pub fn tracks_preparation(&self) -> bool {
        matches!(
            self,
            PreparationMethod::Prepared | PreparationMethod::Spellbook
        )
    }
}

/// Per-class spellcasting metadata from the character record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSpellcasting {
    /// Namespaced class slug, e.g. "class:wizard".
    pub class: String,

    pub level: u32,

    /// Per-class method; absent entries fall back to the
    /// character-level method.
    #[serde(default)]
    pub method: Option<PreparationMethod>,

    #[serde(default)]
    pub preparation_limit: Option<u32>,
}

/// One spell-slot level with its current availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellSlotLevel {
    pub level: u8,
    pub available: u32,
}

/// Character-level spellcasting metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpellcastingStats {
    #[serde(default)]
    pub method: Option<PreparationMethod>,
    #[serde(default)]
    pub classes: Vec<ClassSpellcasting>,
    #[serde(default)]
    pub slots: Vec<SpellSlotLevel>,
}

/// One entry of the live prepared set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreparedSpell {
    /// Spell slug.
    pub spell: String,
    /// Namespaced class slug the spell is prepared under.
    pub class: String,
    /// Always-prepared spells (domain spells and the like) do not
    /// count against a preparation limit.
    #[serde(default)]
    pub always_prepared: bool,
}

impl PreparedSpell {
    pub fn new(spell: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            spell: spell.into(),
            class: class.into(),
            always_prepared: false,
        }
    }

    pub fn always(spell: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            always_prepared: true,
            ..Self::new(spell, class)
        }
    }
}

/// A derived per-class preparation limit. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreparationLimit {
    pub limit: u32,
    pub prepared: u32,
}

impl PreparationLimit {
    pub fn at_limit(&self) -> bool {
        self.prepared >= self.limit
    }
}

/// Display name for a namespaced class slug: "class:wizard" -> "Wizard".
pub fn class_display_name(slug: &str) -> String {
    let tail = slug.rsplit(':').next().unwrap_or(slug);
    let mut chars = tail.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Read-only view over a character's spellcasting metadata and the
/// live prepared set, which the caller owns.
pub struct PreparationTracker<'a> {
    stats: &'a SpellcastingStats,
    prepared: &'a HashSet<PreparedSpell>,
}

impl<'a> PreparationTracker<'a> {
    pub fn new(stats: &'a SpellcastingStats, prepared: &'a HashSet<PreparedSpell>) -> Self {
        Self { stats, prepared }
    }

    /// Character-level preparation method.
    pub fn preparation_method(&self) -> Option<PreparationMethod> {
        self.stats.method
    }

    /// True when any preparation UI applies at all.
    pub fn is_prepared_caster(&self) -> bool {
        self.stats
            .method
            .is_some_and(|m| m.tracks_preparation())
    }

    fn class_entry(&self, class: &str) -> Option<&ClassSpellcasting> {
        self.stats.classes.iter().find(|c| c.class == class)
    }

    /// Per-class method, falling back to the character-level method.
    /// Multiclass characters may mix known and prepared casting.
    pub fn class_preparation_method(&self, class: &str) -> Option<PreparationMethod> {
        self.class_entry(class)
            .and_then(|c| c.method)
            .or(self.stats.method)
    }

    /// Highest slot level with at least one slot available, 1 when the
    /// record carries no usable slot data.
    pub fn max_castable_level(&self) -> u8 {
        self.stats
            .slots
            .iter()
            .filter(|s| s.available > 0)
            .map(|s| s.level)
            .max()
            .unwrap_or(1)
    }

    /// Highest spell level the class can learn, from the full-caster
    /// progression ceil(level / 2), capped at 9. Half- and
    /// third-caster classes advance slower than this formula says.
    pub fn class_max_spell_level(&self, class: &str) -> u8 {
        let level = self.class_entry(class).map_or(0, |c| c.level);
        ((level + 1) / 2).min(9) as u8
    }

    /// Live count of spells prepared under a class, excluding
    /// always-prepared spells.
    pub fn class_prepared_count(&self, class: &str) -> u32 {
        self.prepared
            .iter()
            .filter(|p| p.class == class && !p.always_prepared)
            .count() as u32
    }

    pub fn class_limit(&self, class: &str) -> Option<u32> {
        self.class_entry(class).and_then(|c| c.preparation_limit)
    }

    /// True when the class has a limit and the live count has reached
    /// it.
    pub fn is_at_class_limit(&self, class: &str) -> bool {
        match self.class_limit(class) {
            Some(limit) => self.class_prepared_count(class) >= limit,
            None => false,
        }
    }

    /// Live count across all classes.
    pub fn total_prepared_count(&self) -> u32 {
        self.prepared.iter().filter(|p| !p.always_prepared).count() as u32
    }

    /// Combined limit across all classes, `None` when no class carries
    /// one.
    pub fn combined_limit(&self) -> Option<u32> {
        let limits: Vec<u32> = self
            .stats
            .classes
            .iter()
            .filter_map(|c| c.preparation_limit)
            .collect();
        if limits.is_empty() {
            None
        } else {
            Some(limits.iter().sum())
        }
    }

    /// Per-class limit paired with the live count.
    pub fn preparation_limit(&self, class: &str) -> Option<PreparationLimit> {
        self.class_limit(class).map(|limit| PreparationLimit {
            limit,
            prepared: self.class_prepared_count(class),
        })
    }

    /// Which class display name each currently prepared spell sits
    /// under.
    pub fn prepared_by_class(&self) -> HashMap<String, String> {
        self.prepared
            .iter()
            .map(|p| (p.spell.clone(), class_display_name(&p.class)))
            .collect()
    }

    /// The other class's display name when a spell is already prepared
    /// under a class different from `current_class`. Drives the
    /// "already prepared as X" warning in cross-class views.
    pub fn other_class_prepared(&self, spell: &str, current_class: &str) -> Option<String> {
        self.prepared
            .iter()
            .find(|p| p.spell == spell && p.class != current_class)
            .map(|p| class_display_name(&p.class))
    }

    /// The one spellcasting class (if any) that prepares from a
    /// spellbook.
    pub fn spellbook_class(&self) -> Option<&ClassSpellcasting> {
        self.stats
            .classes
            .iter()
            .find(|c| self.class_preparation_method(&c.class) == Some(PreparationMethod::Spellbook))
    }

    /// Spellbook class limit, falling back to the combined limit when
    /// no class prepares from a spellbook.
    pub fn spellbook_limit(&self) -> Option<u32> {
        match self.spellbook_class() {
            Some(c) => c.preparation_limit,
            None => self.combined_limit(),
        }
    }

    /// Spellbook class live count, falling back to the combined count.
    pub fn spellbook_prepared_count(&self) -> u32 {
        match self.spellbook_class() {
            Some(c) => self.class_prepared_count(&c.class),
            None => self.total_prepared_count(),
        }
    }
}
