use std::{collections::BTreeSet, fmt::Display};

use serde::{Deserialize, Serialize};

use crate::tagged::tagged_enum;

tagged_enum! {
    pub enum CardType {
        Spell = 0,
        Unit = 1,
        Ability = 2,
        Trap = 3,
        Landmark = 4,
        Equipment = 5,
    }
}

tagged_enum! {
    /// Keywords and special abilities printed on a card.
    pub enum CardKeyword {
        Burst = 0,
        QuickStrike = 1,
        Fast = 2,
        Support = 3,
        Lifesteal = 4,
        Elusive = 5,
        Imbue = 6,
        Ephemeral = 7,
        Slow = 8,
        Barrier = 9,
        Skill = 10,
        AuraVisualFakeKeyword = 11,
        Challenger = 12,
        Overwhelm = 13,
        Fearsome = 14,
        Regeneration = 15,
        CantBlock = 16,
        LastBreath = 17,
        SpellOverwhelm = 18,
        Fleeting = 19,
        Tough = 20,
        DoubleStrike = 21,
        Autoplay = 22,
        Focus = 23,
        Attune = 24,
        Deep = 25,
        Immobile = 26,
        Plunder = 27,
        Scout = 28,
        Vulnerable = 29,
        Flow = 30,
        LandmarkVisualOnly = 31,
        SpellShield = 32,
        Fury = 33,
        Augment = 34,
        Lurker = 35,
        Countdown = 36,
        Impact = 37,
        Attach = 38,
        Formidable = 39,
        Equipment = 40,
        Boon = 41,
        Evolve = 42,
        Brash = 43,
    }
}

/// Static definition of a card, identical across every match it appears in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameCard {
    pub name: String,
    pub card_code: String,
    pub cost: u32,
    pub attack: u32,
    pub health: u32,
    pub card_type: CardType,
    #[serde(default)]
    pub keywords: BTreeSet<CardKeyword>,
    #[serde(default)]
    pub description: String,
}

impl Display for GameCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Card({}({}) T: {} A: {} H: {})",
            self.name, self.cost, self.card_type, self.attack, self.health
        )
    }
}

impl GameCard {
    pub fn new(
        name: &str,
        card_code: &str,
        cost: u32,
        attack: u32,
        health: u32,
        card_type: CardType,
    ) -> Self {
        Self {
            name: name.to_string(),
            card_code: card_code.to_string(),
            cost,
            attack,
            health,
            card_type,
            keywords: BTreeSet::new(),
            description: String::new(),
        }
    }

    pub fn with_keywords(mut self, keywords: impl IntoIterator<Item = CardKeyword>) -> Self {
        self.keywords.extend(keywords);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn has_keyword(&self, keyword: CardKeyword) -> bool {
        self.keywords.contains(&keyword)
    }

    pub fn is_spell(&self) -> bool {
        self.card_type == CardType::Spell
    }
}
