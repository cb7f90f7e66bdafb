use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{in_game_card::InGameCard, tagged::tagged_enum, target::CardTargetSelector};

tagged_enum! {
    /// Discrete answer to "what now?" when the opponent acts or the attack
    /// token is available.
    pub enum GamePlayAction {
        Attack = 0,
        PlayCards = 1,
        Skip = 2,
    }
}

impl Default for GamePlayAction {
    fn default() -> Self {
        GamePlayAction::Skip
    }
}

/// Outcome of asking a strategy to play a card from hand.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayDecision {
    #[default]
    Pass,
    Play {
        card: InGameCard,
        target: Option<CardTargetSelector>,
    },
}

impl PlayDecision {
    pub fn play(card: InGameCard) -> Self {
        PlayDecision::Play { card, target: None }
    }

    pub fn play_targeted(card: InGameCard, target: CardTargetSelector) -> Self {
        PlayDecision::Play {
            card,
            target: Some(target),
        }
    }

    pub fn card(&self) -> Option<&InGameCard> {
        match self {
            PlayDecision::Pass => None,
            PlayDecision::Play { card, .. } => Some(card),
        }
    }
}

impl Display for PlayDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayDecision::Pass => write!(f, "Pass"),
            PlayDecision::Play { card, target: None } => write!(f, "Play {}", card.card),
            PlayDecision::Play {
                card,
                target: Some(target),
            } => write!(f, "Play {} targeting {target}", card.card),
        }
    }
}
