pub mod input_strategy;

use std::collections::HashMap;

use itertools::Itertools;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use types::{
    CardKeyword, CardTargetSelector, GameBoardData, GamePlayAction, GameState, InGameCard,
    PlayDecision, PluginBase, PluginInfo, PluginKind, StrategyPlugin,
};

pub use crate::input_strategy::InputStrategy;

#[derive(Debug)]
pub struct RandomStrategy {
    rng: StdRng,
}

impl Default for RandomStrategy {
    fn default() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomStrategy {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn random_subset(&mut self, cards: &[InGameCard]) -> Vec<InGameCard> {
        cards
            .iter()
            .filter(|_| self.rng.gen_bool(0.5))
            .cloned()
            .collect()
    }

    fn random_action(&mut self) -> GamePlayAction {
        *GamePlayAction::ALL
            .choose(&mut self.rng)
            .expect("GamePlayAction has members")
    }
}

impl PluginBase for RandomStrategy {
    fn plugin_information(&self) -> PluginInfo {
        PluginInfo {
            name: "Random".to_string(),
            kind: PluginKind::Strategy,
            description: "Picks uniformly among the legal choices at every decision".to_string(),
            source_code_link: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl StrategyPlugin for RandomStrategy {
    fn mulligan(&mut self, mulligan_cards: &[InGameCard]) -> Vec<InGameCard> {
        self.random_subset(mulligan_cards)
    }

    fn play_hand_card(
        &mut self,
        board_data: &GameBoardData,
        _game_state: GameState,
        mana: u32,
        spell_mana: u32,
    ) -> PlayDecision {
        let playable = self.get_playable_hand_cards(&board_data.cards, mana, spell_mana);
        // one extra slot for passing
        let idx = self.rng.gen_range(0..=playable.len());
        playable
            .get(idx)
            .cloned()
            .map_or(PlayDecision::Pass, PlayDecision::play)
    }

    fn block(
        &mut self,
        board_data: &GameBoardData,
        _spells_to_use: &mut Vec<CardTargetSelector>,
    ) -> HashMap<InGameCard, InGameCard> {
        let mut blockers = board_data.cards.cards_board.clone();
        blockers.shuffle(&mut self.rng);
        board_data
            .cards
            .opponent_cards_attack_or_block
            .iter()
            .filter(|_| self.rng.gen_bool(0.5))
            .cloned()
            .zip(blockers)
            .collect()
    }

    fn respond_to_opponent_action(
        &mut self,
        _board_data: &GameBoardData,
        _game_state: GameState,
        _mana: u32,
        _spell_mana: u32,
    ) -> GamePlayAction {
        self.random_action()
    }

    fn attack_token_usage(
        &mut self,
        _board_data: &GameBoardData,
        _mana: u32,
        _spell_mana: u32,
    ) -> GamePlayAction {
        self.random_action()
    }

    fn attack(
        &mut self,
        _board_data: &GameBoardData,
        player_board_cards: &[InGameCard],
    ) -> Vec<InGameCard> {
        self.random_subset(player_board_cards)
    }
}

/// Plays the strongest affordable unit, blocks whatever it legally can and
/// swings with everything.
#[derive(Debug, Default)]
pub struct GenericStrategy {}

impl GenericStrategy {
    fn can_block(blocker: &InGameCard, attacker: &InGameCard) -> bool {
        if blocker.has_keyword(CardKeyword::CantBlock) {
            return false;
        }
        if attacker.has_keyword(CardKeyword::Elusive) && !blocker.has_keyword(CardKeyword::Elusive)
        {
            return false;
        }
        if attacker.has_keyword(CardKeyword::Fearsome) && blocker.attack < 3 {
            return false;
        }
        true
    }
}

impl PluginBase for GenericStrategy {
    fn plugin_information(&self) -> PluginInfo {
        PluginInfo {
            name: "Generic".to_string(),
            kind: PluginKind::Strategy,
            description: "Curve out with the hardest hitting unit and block every attacker it can"
                .to_string(),
            source_code_link: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl StrategyPlugin for GenericStrategy {
    fn mulligan(&mut self, mulligan_cards: &[InGameCard]) -> Vec<InGameCard> {
        mulligan_cards
            .iter()
            .filter(|card| card.cost > 3)
            .cloned()
            .collect()
    }

    fn play_hand_card(
        &mut self,
        board_data: &GameBoardData,
        _game_state: GameState,
        mana: u32,
        spell_mana: u32,
    ) -> PlayDecision {
        // cards with a play condition can't be judged from the snapshot
        self.get_playable_hand_cards(&board_data.cards, mana, spell_mana)
            .into_iter()
            .filter(|card| !card.is_spell())
            .filter(|card| card.cost <= mana && !card.description.starts_with("To play me"))
            .max_by_key(|card| card.attack)
            .map_or(PlayDecision::Pass, PlayDecision::play)
    }

    fn block(
        &mut self,
        board_data: &GameBoardData,
        _spells_to_use: &mut Vec<CardTargetSelector>,
    ) -> HashMap<InGameCard, InGameCard> {
        let cards = &board_data.cards;
        let mut blocks = HashMap::new();
        let mut next_attacker = 0;

        for blocker in &cards.cards_board {
            for (idx, attacker) in cards
                .opponent_cards_attack_or_block
                .iter()
                .enumerate()
                .skip(next_attacker)
            {
                if cards.is_engaged(attacker) {
                    next_attacker = idx + 1;
                    continue;
                }
                if !Self::can_block(blocker, attacker) {
                    continue;
                }

                log::debug!("{} blocks {}", blocker.name, attacker.name);
                blocks.insert(attacker.clone(), blocker.clone());
                next_attacker = idx + 1;
                break;
            }
        }
        blocks
    }

    fn respond_to_opponent_action(
        &mut self,
        _board_data: &GameBoardData,
        _game_state: GameState,
        _mana: u32,
        _spell_mana: u32,
    ) -> GamePlayAction {
        GamePlayAction::PlayCards
    }

    fn attack_token_usage(
        &mut self,
        board_data: &GameBoardData,
        _mana: u32,
        _spell_mana: u32,
    ) -> GamePlayAction {
        // open attack when nothing can block
        if board_data.cards.opponent_cards_board.is_empty() {
            GamePlayAction::Attack
        } else {
            GamePlayAction::PlayCards
        }
    }

    fn attack(
        &mut self,
        _board_data: &GameBoardData,
        player_board_cards: &[InGameCard],
    ) -> Vec<InGameCard> {
        // support units last
        player_board_cards
            .iter()
            .sorted_by_key(|card| (card.description.contains("Support:"), card.attack))
            .cloned()
            .collect()
    }
}
