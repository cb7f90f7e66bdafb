use std::{
    collections::{HashMap, HashSet},
    fmt::{Debug, Display},
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use itertools::Itertools;
use serde::Serialize;
use types::{
    BoardCards, CardTarget, CardTargetSelector, GameBoardData, GamePlayAction, GameState,
    InGameCard, PlayDecision, StrategyPlugin,
};

use crate::{
    error::{ContractViolation, DecisionFailure},
    registry::SharedStrategy,
};

/// The decision points of a strategy, as named in logs and failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    PlayableHandCards,
    Mulligan,
    PlayHandCard,
    Block,
    RespondToOpponentAction,
    AttackTokenUsage,
    Attack,
}

impl Decision {
    fn violated(self, violation: ContractViolation) -> DecisionFailure {
        DecisionFailure::Violation {
            decision: self,
            violation,
        }
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Decision::PlayableHandCards => "get_playable_hand_cards",
            Decision::Mulligan => "mulligan",
            Decision::PlayHandCard => "play_hand_card",
            Decision::Block => "block",
            Decision::RespondToOpponentAction => "respond_to_opponent_action",
            Decision::AttackTokenUsage => "attack_token_usage",
            Decision::Attack => "attack",
        };
        write!(f, "{name}")
    }
}

/// Answer to [`StrategyPlugin::block`]: attacker to blocker, plus the
/// spells cast alongside.
#[derive(Debug, Clone, Default)]
pub struct BlockPlan {
    pub blocks: HashMap<InGameCard, InGameCard>,
    pub spells: Vec<CardTargetSelector>,
}

/// Runs a strategy's decisions on the blocking pool under a time budget and
/// checks every answer against the snapshot it was asked about.
#[derive(Debug, Clone)]
pub struct GuardedStrategy {
    name: String,
    strategy: SharedStrategy,
    budget: Duration,
}

impl GuardedStrategy {
    /// The name is passed in so building a guard never waits on a strategy
    /// that is still stuck in an earlier decision.
    pub fn new(name: impl Into<String>, strategy: SharedStrategy, budget: Duration) -> Self {
        Self {
            name: name.into(),
            strategy,
            budget,
        }
    }

    pub fn from_plugin(plugin: Box<dyn StrategyPlugin>, budget: Duration) -> Self {
        let name = plugin.plugin_information().name;
        Self::new(name, Arc::new(Mutex::new(plugin)), budget)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Unwraps a guarded answer, substituting the neutral one on failure.
    pub fn settle<T: Default + Debug>(&self, answer: Result<T, DecisionFailure>) -> T {
        match answer {
            Ok(answer) => answer,
            Err(failure) => {
                let neutral = T::default();
                log::warn!(
                    "Strategy '{}': {failure}; answering {neutral:?} instead",
                    self.name
                );
                neutral
            }
        }
    }

    async fn call<T, F>(&self, decision: Decision, ask: F) -> Result<T, DecisionFailure>
    where
        T: Send + 'static,
        F: FnOnce(&mut Box<dyn StrategyPlugin>) -> T + Send + 'static,
    {
        log::debug!("Asking '{}' for {decision}", self.name);
        let strategy = Arc::clone(&self.strategy);
        let task = tokio::task::spawn_blocking(move || {
            let mut plugin = strategy.lock().unwrap_or_else(PoisonError::into_inner);
            ask(&mut *plugin)
        });

        match tokio::time::timeout(self.budget, task).await {
            Ok(Ok(answer)) => Ok(answer),
            Ok(Err(join_error)) => Err(DecisionFailure::Panicked {
                decision,
                message: join_error.to_string(),
            }),
            Err(_) => Err(DecisionFailure::Timeout {
                decision,
                budget: self.budget,
            }),
        }
    }

    pub async fn get_playable_hand_cards(
        &self,
        board_data: &Arc<GameBoardData>,
        mana: u32,
        spell_mana: u32,
    ) -> Result<Vec<InGameCard>, DecisionFailure> {
        let input = Arc::clone(board_data);
        let playable = self
            .call(Decision::PlayableHandCards, move |s| {
                s.get_playable_hand_cards(&input.cards, mana, spell_mana)
            })
            .await?;
        check_subset(&board_data.cards.cards_hand, &playable)
            .map_err(|v| Decision::PlayableHandCards.violated(v))?;
        Ok(playable)
    }

    pub async fn mulligan(
        &self,
        mulligan_cards: &[InGameCard],
    ) -> Result<Vec<InGameCard>, DecisionFailure> {
        let offered = mulligan_cards.to_vec();
        let replaced = self
            .call(Decision::Mulligan, move |s| s.mulligan(&offered))
            .await?;
        check_subset(mulligan_cards, &replaced).map_err(|v| Decision::Mulligan.violated(v))?;
        Ok(replaced)
    }

    pub async fn play_hand_card(
        &self,
        board_data: &Arc<GameBoardData>,
        game_state: GameState,
        mana: u32,
        spell_mana: u32,
    ) -> Result<PlayDecision, DecisionFailure> {
        let input = Arc::clone(board_data);
        let decision = self
            .call(Decision::PlayHandCard, move |s| {
                s.play_hand_card(&input, game_state, mana, spell_mana)
            })
            .await?;
        check_play(&board_data.cards, mana, spell_mana, &decision)
            .map_err(|v| Decision::PlayHandCard.violated(v))?;
        Ok(decision)
    }

    pub async fn block(&self, board_data: &Arc<GameBoardData>) -> Result<BlockPlan, DecisionFailure> {
        let input = Arc::clone(board_data);
        let plan = self
            .call(Decision::Block, move |s| {
                let mut spells = Vec::new();
                let blocks = s.block(&input, &mut spells);
                BlockPlan { blocks, spells }
            })
            .await?;
        check_block(&board_data.cards, &plan).map_err(|v| Decision::Block.violated(v))?;
        Ok(plan)
    }

    pub async fn respond_to_opponent_action(
        &self,
        board_data: &Arc<GameBoardData>,
        game_state: GameState,
        mana: u32,
        spell_mana: u32,
    ) -> Result<GamePlayAction, DecisionFailure> {
        let input = Arc::clone(board_data);
        self.call(Decision::RespondToOpponentAction, move |s| {
            s.respond_to_opponent_action(&input, game_state, mana, spell_mana)
        })
        .await
    }

    pub async fn attack_token_usage(
        &self,
        board_data: &Arc<GameBoardData>,
        mana: u32,
        spell_mana: u32,
    ) -> Result<GamePlayAction, DecisionFailure> {
        let input = Arc::clone(board_data);
        self.call(Decision::AttackTokenUsage, move |s| {
            s.attack_token_usage(&input, mana, spell_mana)
        })
        .await
    }

    pub async fn attack(
        &self,
        board_data: &Arc<GameBoardData>,
        player_board_cards: &[InGameCard],
    ) -> Result<Vec<InGameCard>, DecisionFailure> {
        let input = Arc::clone(board_data);
        let offered = player_board_cards.to_vec();
        let attackers = self
            .call(Decision::Attack, move |s| s.attack(&input, &offered))
            .await?;
        check_subset(player_board_cards, &attackers).map_err(|v| Decision::Attack.violated(v))?;
        Ok(attackers)
    }
}

fn check_subset(offered: &[InGameCard], picked: &[InGameCard]) -> Result<(), ContractViolation> {
    let mut seen = HashSet::new();
    for card in picked {
        if !offered.contains(card) {
            return Err(ContractViolation::CardNotOffered {
                card_id: card.card_id,
            });
        }
        if !seen.insert(card.card_id) {
            return Err(ContractViolation::DuplicateCard {
                card_id: card.card_id,
            });
        }
    }
    Ok(())
}

fn check_play(
    cards: &BoardCards,
    mana: u32,
    spell_mana: u32,
    decision: &PlayDecision,
) -> Result<(), ContractViolation> {
    let PlayDecision::Play { card, target } = decision else {
        return Ok(());
    };
    // judge by the snapshot's copy, not whatever the strategy handed back
    let Some(in_hand) = cards.cards_hand.iter().find(|c| *c == card) else {
        return Err(ContractViolation::CardNotOffered {
            card_id: card.card_id,
        });
    };
    let affordable = in_hand.cost <= mana
        || (in_hand.is_spell() && in_hand.cost <= mana.saturating_add(spell_mana));
    if !affordable {
        return Err(ContractViolation::NotAffordable {
            card_id: in_hand.card_id,
            cost: in_hand.cost,
            mana,
            spell_mana,
        });
    }
    if let Some(selector) = target {
        if selector.card() != card {
            return Err(ContractViolation::SelectorMismatch {
                card_id: card.card_id,
                selector_card_id: selector.card().card_id,
            });
        }
        check_targets(cards, selector)?;
    }
    Ok(())
}

fn check_targets(cards: &BoardCards, selector: &CardTargetSelector) -> Result<(), ContractViolation> {
    for (kind, target_card) in selector.targets() {
        match (kind, target_card) {
            (CardTarget::Nexus | CardTarget::OpponentNexus, _) => {}
            (CardTarget::Card, Some(target_card)) => {
                if !cards.contains(target_card) {
                    return Err(ContractViolation::TargetNotInSnapshot {
                        card_id: target_card.card_id,
                    });
                }
            }
            (CardTarget::HandCard, Some(target_card)) => {
                let in_a_hand = cards.cards_hand.contains(target_card)
                    || cards.opponent_cards_hand.contains(target_card);
                if !in_a_hand {
                    return Err(ContractViolation::TargetNotInHand {
                        card_id: target_card.card_id,
                    });
                }
            }
            (kind, None) => {
                return Err(ContractViolation::MissingTargetCard { target: *kind });
            }
        }
    }
    Ok(())
}

fn check_block(cards: &BoardCards, plan: &BlockPlan) -> Result<(), ContractViolation> {
    let mut blockers = HashSet::new();
    for (attacker, blocker) in plan
        .blocks
        .iter()
        .sorted_by_key(|(attacker, _)| attacker.card_id)
    {
        if !cards.opponent_cards_attack_or_block.contains(attacker) {
            return Err(ContractViolation::NotAnAttacker {
                card_id: attacker.card_id,
            });
        }
        if !cards.cards_board.contains(blocker) {
            return Err(ContractViolation::NotABlocker {
                card_id: blocker.card_id,
            });
        }
        if !blockers.insert(blocker.card_id) {
            return Err(ContractViolation::DoubleBlock {
                card_id: blocker.card_id,
            });
        }
    }
    for spell in &plan.spells {
        if !cards.cards_hand.contains(spell.card()) {
            return Err(ContractViolation::SpellNotInHand {
                card_id: spell.card().card_id,
            });
        }
        check_targets(cards, spell)?;
    }
    Ok(())
}
