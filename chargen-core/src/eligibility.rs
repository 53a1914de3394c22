//! Multiclassing eligibility against ability-score prerequisites.
//!
//! Evaluation is pure and deterministic, so the UI can re-run it for
//! every selectable class on each render to drive live highlighting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    #[serde(rename = "STR")]
    Strength,
    #[serde(rename = "DEX")]
    Dexterity,
    #[serde(rename = "CON")]
    Constitution,
    #[serde(rename = "INT")]
    Intelligence,
    #[serde(rename = "WIS")]
    Wisdom,
    #[serde(rename = "CHA")]
    Charisma,
}

impl Ability {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ability::Strength => "Strength",
            Ability::Dexterity => "Dexterity",
            Ability::Constitution => "Constitution",
            Ability::Intelligence => "Intelligence",
            Ability::Wisdom => "Wisdom",
            Ability::Charisma => "Charisma",
        }
    }

    pub fn all() -> [Ability; 6] {
        [
            Ability::Strength,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Charisma,
        ]
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// Ability scores container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: u8,
    pub dexterity: u8,
    pub constitution: u8,
    pub intelligence: u8,
    pub wisdom: u8,
    pub charisma: u8,
}

impl AbilityScores {
    pub fn new(str: u8, dex: u8, con: u8, int: u8, wis: u8, cha: u8) -> Self {
        Self {
            strength: str,
            dexterity: dex,
            constitution: con,
            intelligence: int,
            wisdom: wis,
            charisma: cha,
        }
    }

    pub fn get(&self, ability: Ability) -> u8 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10, 10)
    }
}

/// One ability-score requirement in a prerequisite expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prerequisite {
    pub ability: Ability,
    pub minimum_score: u8,
    /// True when the remote record flags this requirement as one
    /// branch of an either/or pair.
    #[serde(default)]
    pub is_alternative: bool,
}

impl Prerequisite {
    pub fn new(ability: Ability, minimum_score: u8) -> Self {
        Self {
            ability,
            minimum_score,
            is_alternative: false,
        }
    }

    /// Render as "Strength 13".
    pub fn description(&self) -> String {
        format!("{} {}", self.ability.name(), self.minimum_score)
    }

    pub fn met(&self, scores: &AbilityScores) -> bool {
        scores.get(self.ability) >= self.minimum_score
    }
}

/// How the requirements of an expression combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    And,
    Or,
}

/// A boolean prerequisite tree over ability scores.
///
/// A `None` combinator with a single requirement means that one
/// requirement must hold. An empty expression is vacuously satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrerequisiteExpression {
    #[serde(default, rename = "type")]
    pub combinator: Option<Combinator>,
    #[serde(default)]
    pub requirements: Vec<Prerequisite>,
}

impl PrerequisiteExpression {
    pub fn single(requirement: Prerequisite) -> Self {
        Self {
            combinator: None,
            requirements: vec![requirement],
        }
    }

    pub fn all_of(requirements: Vec<Prerequisite>) -> Self {
        Self {
            combinator: Some(Combinator::And),
            requirements,
        }
    }

    pub fn any_of(requirements: Vec<Prerequisite>) -> Self {
        Self {
            combinator: Some(Combinator::Or),
            requirements,
        }
    }
}

/// Result of evaluating a prerequisite expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eligibility {
    pub eligible: bool,
    /// Unmet requirement descriptions, in expression order. An OR
    /// expression with no branch met lists every branch, since the
    /// caller cannot know which one the user will raise.
    pub missing_requirements: Vec<String>,
    /// Full rendering, e.g. "Requires Strength 13 and Charisma 13".
    /// Rendered whether or not the character qualifies.
    pub requirement_text: String,
}

impl Eligibility {
    fn vacuous() -> Self {
        Self {
            eligible: true,
            missing_requirements: Vec::new(),
            requirement_text: String::new(),
        }
    }
}

/// Evaluate a character's scores against a class's multiclassing
/// prerequisites. An absent or empty expression is vacuously satisfied.
pub fn evaluate(scores: &AbilityScores, expr: Option<&PrerequisiteExpression>) -> Eligibility {
    let Some(expr) = expr else {
        return Eligibility::vacuous();
    };
    if expr.requirements.is_empty() {
        return Eligibility::vacuous();
    }

    let met: Vec<bool> = expr.requirements.iter().map(|r| r.met(scores)).collect();
    let descriptions: Vec<String> = expr
        .requirements
        .iter()
        .map(Prerequisite::description)
        .collect();

    let joiner = match expr.combinator {
        Some(Combinator::And) => " and ",
        Some(Combinator::Or) => " or ",
        None => "",
    };
    let requirement_text = format!("Requires {}", descriptions.join(joiner));

    let (eligible, missing_requirements) = match expr.combinator {
        None => {
            let ok = met[0];
            let missing = if ok {
                Vec::new()
            } else {
                vec![descriptions[0].clone()]
            };
            (ok, missing)
        }
        Some(Combinator::And) => {
            let ok = met.iter().all(|m| *m);
            let missing = descriptions
                .iter()
                .zip(&met)
                .filter(|(_, m)| !**m)
                .map(|(d, _)| d.clone())
                .collect();
            (ok, missing)
        }
        Some(Combinator::Or) => {
            let ok = met.iter().any(|m| *m);
            let missing = if ok { Vec::new() } else { descriptions.clone() };
            (ok, missing)
        }
    };

    Eligibility {
        eligible,
        missing_requirements,
        requirement_text,
    }
}
