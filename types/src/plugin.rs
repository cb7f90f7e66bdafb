use std::{collections::HashMap, fmt::Debug};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    action::{GamePlayAction, PlayDecision},
    board::{BoardCards, GameBoardData},
    game_state::GameState,
    in_game_card::InGameCard,
    tagged::tagged_enum,
    target::CardTargetSelector,
};

/// Version of this contract. Plugins report the value they were built
/// against through [`PluginBase::sdk_version`].
pub const SDK_VERSION: u32 = 1;

tagged_enum! {
    /// Role a loaded plugin fulfils.
    pub enum PluginKind {
        Unknown = 0,
        Strategy = 1,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub kind: PluginKind,
    pub description: String,
    pub source_code_link: Option<String>,
    pub version: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to release plugin resources: {0}")]
pub struct DisposeError(pub String);

/// Capabilities shared by every plugin regardless of its role.
pub trait PluginBase: Debug + Send {
    fn plugin_information(&self) -> PluginInfo;

    fn sdk_version(&self) -> u32 {
        SDK_VERSION
    }

    /// Releases whatever the plugin acquired. The host calls this at most
    /// once, when the plugin is unloaded.
    fn dispose(&mut self) -> Result<(), DisposeError> {
        Ok(())
    }
}

/// Decision points a strategy answers during a match.
///
/// Every method may decline to act by returning an empty collection,
/// [`PlayDecision::Pass`] or [`GamePlayAction::Skip`]. Returned cards must be
/// taken from the inputs of the same call.
pub trait StrategyPlugin: PluginBase {
    /// Hand cards that can be paid for with the given mana.
    fn get_playable_hand_cards(
        &self,
        board_cards: &BoardCards,
        mana: u32,
        spell_mana: u32,
    ) -> Vec<InGameCard> {
        playable_hand_cards(board_cards, mana, spell_mana)
    }

    /// Cards to replace from the opening hand.
    fn mulligan(&mut self, mulligan_cards: &[InGameCard]) -> Vec<InGameCard>;

    fn play_hand_card(
        &mut self,
        board_data: &GameBoardData,
        game_state: GameState,
        mana: u32,
        spell_mana: u32,
    ) -> PlayDecision;

    /// Maps each opponent attacker to be blocked onto the local card that
    /// blocks it. Spells cast in support of the blocks go in `spells_to_use`.
    fn block(
        &mut self,
        board_data: &GameBoardData,
        spells_to_use: &mut Vec<CardTargetSelector>,
    ) -> HashMap<InGameCard, InGameCard>;

    fn respond_to_opponent_action(
        &mut self,
        board_data: &GameBoardData,
        game_state: GameState,
        mana: u32,
        spell_mana: u32,
    ) -> GamePlayAction;

    fn attack_token_usage(
        &mut self,
        board_data: &GameBoardData,
        mana: u32,
        spell_mana: u32,
    ) -> GamePlayAction;

    /// Board cards to send into the attack.
    fn attack(
        &mut self,
        board_data: &GameBoardData,
        player_board_cards: &[InGameCard],
    ) -> Vec<InGameCard>;
}

/// Units and other cards are paid from mana only; spells may also draw on
/// spell mana. Most expensive first.
pub fn playable_hand_cards(board_cards: &BoardCards, mana: u32, spell_mana: u32) -> Vec<InGameCard> {
    board_cards
        .cards_hand
        .iter()
        .filter(|card| {
            card.cost <= mana || (card.is_spell() && card.cost <= mana.saturating_add(spell_mana))
        })
        .sorted_by(|a, b| b.cost.cmp(&a.cost))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        card::{CardType, GameCard},
        in_game_card::InGameCardPosition,
    };

    fn hand_card(card_id: u32, cost: u32, card_type: CardType) -> InGameCard {
        InGameCard::new(
            GameCard::new("Card", "01XX000", cost, 1, 1, card_type),
            card_id,
            InGameCardPosition::Hand,
            true,
        )
    }

    #[derive(Debug, Default)]
    struct SkipEverything;

    impl PluginBase for SkipEverything {
        fn plugin_information(&self) -> PluginInfo {
            PluginInfo {
                name: "SkipEverything".to_string(),
                kind: PluginKind::Strategy,
                description: "Declines every decision".to_string(),
                source_code_link: None,
                version: "0.1.0".to_string(),
            }
        }
    }

    impl StrategyPlugin for SkipEverything {
        fn mulligan(&mut self, _mulligan_cards: &[InGameCard]) -> Vec<InGameCard> {
            vec![]
        }

        fn play_hand_card(
            &mut self,
            _board_data: &GameBoardData,
            _game_state: GameState,
            _mana: u32,
            _spell_mana: u32,
        ) -> PlayDecision {
            PlayDecision::Pass
        }

        fn block(
            &mut self,
            _board_data: &GameBoardData,
            _spells_to_use: &mut Vec<CardTargetSelector>,
        ) -> HashMap<InGameCard, InGameCard> {
            HashMap::new()
        }

        fn respond_to_opponent_action(
            &mut self,
            _board_data: &GameBoardData,
            _game_state: GameState,
            _mana: u32,
            _spell_mana: u32,
        ) -> GamePlayAction {
            GamePlayAction::Skip
        }

        fn attack_token_usage(
            &mut self,
            _board_data: &GameBoardData,
            _mana: u32,
            _spell_mana: u32,
        ) -> GamePlayAction {
            GamePlayAction::Skip
        }

        fn attack(
            &mut self,
            _board_data: &GameBoardData,
            _player_board_cards: &[InGameCard],
        ) -> Vec<InGameCard> {
            vec![]
        }
    }

    #[test]
    fn affordable_card_is_playable() {
        let card_a = hand_card(1, 2, CardType::Unit);
        let board = BoardCards::from_cards(vec![card_a.clone()]);
        let strategy = SkipEverything;

        assert_eq!(strategy.get_playable_hand_cards(&board, 3, 0), vec![card_a]);
        assert!(strategy.get_playable_hand_cards(&board, 1, 0).is_empty());
    }

    #[test]
    fn spell_mana_only_pays_for_spells() {
        let spell = hand_card(1, 3, CardType::Spell);
        let unit = hand_card(2, 3, CardType::Unit);
        let board = BoardCards::from_cards(vec![spell.clone(), unit]);

        assert_eq!(playable_hand_cards(&board, 1, 2), vec![spell]);
    }

    #[test]
    fn huge_spell_mana_saturates() {
        let spell = hand_card(1, 3, CardType::Spell);
        let unit = hand_card(2, 3, CardType::Unit);
        let board = BoardCards::from_cards(vec![spell.clone(), unit]);

        assert_eq!(playable_hand_cards(&board, 1, u32::MAX), vec![spell]);
    }

    #[test]
    fn playable_cards_are_most_expensive_first() {
        let board = BoardCards::from_cards(vec![
            hand_card(1, 1, CardType::Unit),
            hand_card(2, 4, CardType::Unit),
            hand_card(3, 2, CardType::Spell),
        ]);
        let ids: Vec<_> = playable_hand_cards(&board, 5, 0)
            .iter()
            .map(|c| c.card_id)
            .collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn plugin_kind_round_trips() {
        let strategy = SkipEverything;
        let info = strategy.plugin_information();
        assert_eq!(info.kind, PluginKind::Strategy);
        assert_eq!(u8::from(PluginKind::Strategy), 1);
        assert_eq!(PluginKind::try_from(1), Ok(PluginKind::Strategy));
        assert_eq!(PluginKind::try_from(0), Ok(PluginKind::Unknown));
    }

    #[test]
    fn default_dispose_is_repeatable() {
        let mut strategy = SkipEverything;
        assert_eq!(strategy.sdk_version(), SDK_VERSION);
        assert!(strategy.dispose().is_ok());
        assert!(strategy.dispose().is_ok());
    }
}
