use std::sync::Arc;

use itertools::Itertools;
use serde::Serialize;
use types::{
    CardTarget, CardTargetSelector, CardType, GameBoardData, GamePlayAction, GameState,
    InGameCard, PlayDecision,
};

use crate::{error::BotError, guard::GuardedStrategy, scenario::Scenario};

/// A card the bot decided to cast, by id, with its targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayedCard {
    pub card_id: u32,
    pub name: String,
    pub targets: Vec<(CardTarget, Option<u32>)>,
}

impl PlayedCard {
    fn new(card: &InGameCard, selector: Option<&CardTargetSelector>) -> Self {
        let targets = selector
            .map(|selector| {
                selector
                    .targets()
                    .iter()
                    .map(|(kind, target)| (*kind, target.as_ref().map(|c| c.card_id)))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            card_id: card.card_id,
            name: card.name.clone(),
            targets,
        }
    }
}

impl From<&CardTargetSelector> for PlayedCard {
    fn from(selector: &CardTargetSelector) -> Self {
        PlayedCard::new(selector.card(), Some(selector))
    }
}

/// What the bot ends up doing for one game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Nothing to decide in this state.
    Wait { game_state: GameState },
    Mulligan { replace: Vec<u32> },
    /// The opponent's spells resolve before anything else happens.
    PassSpellStack { spells: usize },
    Turn {
        action: GamePlayAction,
        played: Option<PlayedCard>,
        attackers: Vec<u32>,
    },
    Block {
        blocks: Vec<(u32, u32)>,
        spells: Vec<PlayedCard>,
    },
}

/// Drives one strategy through the states of a match.
#[derive(Debug, Clone)]
pub struct Bot {
    strategy: GuardedStrategy,
}

impl Bot {
    pub fn new(strategy: GuardedStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> &GuardedStrategy {
        &self.strategy
    }

    pub async fn process(
        &self,
        game_state: GameState,
        board_data: GameBoardData,
    ) -> Result<Step, BotError> {
        board_data.validate()?;
        log::info!("Current game state: {game_state}");

        let board_data = Arc::new(board_data);
        let step = match game_state {
            GameState::Mulligan => self.mulligan(&board_data).await,
            GameState::DefendTurn | GameState::AttackTurn => {
                self.take_turn(game_state, &board_data).await
            }
            GameState::Blocking => self.block(&board_data).await,
            _ => Step::Wait { game_state },
        };
        log::debug!("{step:?}");
        Ok(step)
    }

    /// Runs every frame of a scenario in order.
    pub async fn replay(&self, scenario: &Scenario) -> Result<Vec<Step>, BotError> {
        log::info!(
            "Replaying '{}' ({} frames) with {}",
            scenario.name,
            scenario.frames.len(),
            self.strategy.name()
        );
        let mut steps = Vec::with_capacity(scenario.frames.len());
        for frame in &scenario.frames {
            steps.push(self.process(frame.game_state, frame.board_data()).await?);
        }
        Ok(steps)
    }

    async fn mulligan(&self, board_data: &Arc<GameBoardData>) -> Step {
        let replaced = self
            .strategy
            .settle(self.strategy.mulligan(&board_data.cards.cards_mulligan).await);
        Step::Mulligan {
            replace: replaced.iter().map(|card| card.card_id).collect(),
        }
    }

    async fn take_turn(&self, game_state: GameState, board_data: &Arc<GameBoardData>) -> Step {
        let spell_stack = &board_data.cards.spell_stack;
        let only_spells = spell_stack
            .iter()
            .all(|card| matches!(card.card_type, CardType::Spell | CardType::Ability));
        if !spell_stack.is_empty() && only_spells {
            return Step::PassSpellStack {
                spells: spell_stack.len(),
            };
        }

        let (mana, spell_mana) = (board_data.mana, board_data.spell_mana);
        let action = if game_state == GameState::DefendTurn {
            let answer = self
                .strategy
                .respond_to_opponent_action(board_data, game_state, mana, spell_mana)
                .await;
            self.strategy.settle(answer)
        } else {
            let answer = self
                .strategy
                .attack_token_usage(board_data, mana, spell_mana)
                .await;
            self.strategy.settle(answer)
        };

        let mut played = None;
        if action == GamePlayAction::PlayCards {
            played = self.play_from_hand(game_state, board_data).await;
        }

        // a skipped turn or a played card ends the decision; otherwise the
        // attack token gets spent on an attack
        let mut attackers = Vec::new();
        if game_state == GameState::AttackTurn && action != GamePlayAction::Skip && played.is_none()
        {
            let answer = self
                .strategy
                .attack(board_data, &board_data.cards.cards_board)
                .await;
            attackers = self
                .strategy
                .settle(answer)
                .iter()
                .map(|card| card.card_id)
                .collect();
        }

        Step::Turn {
            action,
            played,
            attackers,
        }
    }

    async fn play_from_hand(
        &self,
        game_state: GameState,
        board_data: &Arc<GameBoardData>,
    ) -> Option<PlayedCard> {
        let (mana, spell_mana) = (board_data.mana, board_data.spell_mana);
        let playable = self.strategy.settle(
            self.strategy
                .get_playable_hand_cards(board_data, mana, spell_mana)
                .await,
        );
        if playable.is_empty() {
            log::debug!("Nothing playable with {mana} mana and {spell_mana} spell mana");
            return None;
        }

        let decision = self.strategy.settle(
            self.strategy
                .play_hand_card(board_data, game_state, mana, spell_mana)
                .await,
        );
        log::info!("{decision}");
        match decision {
            PlayDecision::Pass => None,
            PlayDecision::Play { card, target } => Some(PlayedCard::new(&card, target.as_ref())),
        }
    }

    async fn block(&self, board_data: &Arc<GameBoardData>) -> Step {
        let plan = self
            .strategy
            .settle(self.strategy.block(board_data).await);
        let cards = &board_data.cards;

        let blocks = plan
            .blocks
            .iter()
            .filter(|(attacker, _)| {
                let engaged = cards.is_engaged(attacker);
                if engaged {
                    log::debug!("{} is already blocked", attacker.name);
                }
                !engaged
            })
            .map(|(attacker, blocker)| (attacker.card_id, blocker.card_id))
            .sorted()
            .collect();

        Step::Block {
            blocks,
            spells: plan.spells.iter().map(PlayedCard::from).collect(),
        }
    }
}
