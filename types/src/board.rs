use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::in_game_card::{InGameCard, InGameCardPosition};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("Card {card_id} is listed twice in all_cards")]
    DuplicateCard { card_id: u32 },

    #[error("Card {card_id} is in {zone} but not in all_cards")]
    NotInAllCards { card_id: u32, zone: &'static str },

    #[error("Card {card_id} is in both {first} and {second}")]
    MultipleZones {
        card_id: u32,
        first: &'static str,
        second: &'static str,
    },

    #[error("Card {card_id} at {position} has is_local_player={is_local_player}")]
    OwnerMismatch {
        card_id: u32,
        position: InGameCardPosition,
        is_local_player: bool,
    },
}

/// Horizontal distance under which two cards face each other in combat.
pub const ENGAGED_DISTANCE: i32 = 10;

/// Every visible card of one snapshot, partitioned by zone.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardCards {
    pub all_cards: Vec<InGameCard>,
    pub cards_hand: Vec<InGameCard>,
    pub cards_board: Vec<InGameCard>,
    pub cards_mulligan: Vec<InGameCard>,
    pub cards_attack_or_block: Vec<InGameCard>,
    pub spell_stack: Vec<InGameCard>,
    pub opponent_cards_attack_or_block: Vec<InGameCard>,
    pub opponent_cards_board: Vec<InGameCard>,
    pub opponent_cards_hand: Vec<InGameCard>,
}

impl BoardCards {
    /// Builds the zone lists from a flat list using each card's position.
    /// Cards at an unknown position only land in `all_cards`.
    pub fn from_cards(cards: Vec<InGameCard>) -> Self {
        let mut board = BoardCards::default();
        for card in cards {
            match board.zone_mut(card.in_game_position) {
                Some(zone) => zone.push(card.clone()),
                None => log::debug!("{} has no zone, keeping it in all_cards only", card.card),
            }
            board.all_cards.push(card);
        }
        board.sort_by_position();
        board
    }

    pub fn zone(&self, position: InGameCardPosition) -> Option<&[InGameCard]> {
        let zone = match position {
            InGameCardPosition::Unknown => return None,
            InGameCardPosition::Mulligan => &self.cards_mulligan,
            InGameCardPosition::Hand => &self.cards_hand,
            InGameCardPosition::Board => &self.cards_board,
            InGameCardPosition::AttackOrBlock => &self.cards_attack_or_block,
            InGameCardPosition::SpellStack => &self.spell_stack,
            InGameCardPosition::OpponentAttackOrBlock => &self.opponent_cards_attack_or_block,
            InGameCardPosition::OpponentBoard => &self.opponent_cards_board,
            InGameCardPosition::OpponentHand => &self.opponent_cards_hand,
        };
        Some(zone.as_slice())
    }

    fn zone_mut(&mut self, position: InGameCardPosition) -> Option<&mut Vec<InGameCard>> {
        let zone = match position {
            InGameCardPosition::Unknown => return None,
            InGameCardPosition::Mulligan => &mut self.cards_mulligan,
            InGameCardPosition::Hand => &mut self.cards_hand,
            InGameCardPosition::Board => &mut self.cards_board,
            InGameCardPosition::AttackOrBlock => &mut self.cards_attack_or_block,
            InGameCardPosition::SpellStack => &mut self.spell_stack,
            InGameCardPosition::OpponentAttackOrBlock => {
                &mut self.opponent_cards_attack_or_block
            }
            InGameCardPosition::OpponentBoard => &mut self.opponent_cards_board,
            InGameCardPosition::OpponentHand => &mut self.opponent_cards_hand,
        };
        Some(zone)
    }

    fn zones(&self) -> [(&'static str, &[InGameCard]); 8] {
        [
            ("cards_hand", self.cards_hand.as_slice()),
            ("cards_board", self.cards_board.as_slice()),
            ("cards_mulligan", self.cards_mulligan.as_slice()),
            ("cards_attack_or_block", self.cards_attack_or_block.as_slice()),
            ("spell_stack", self.spell_stack.as_slice()),
            (
                "opponent_cards_attack_or_block",
                self.opponent_cards_attack_or_block.as_slice(),
            ),
            ("opponent_cards_board", self.opponent_cards_board.as_slice()),
            ("opponent_cards_hand", self.opponent_cards_hand.as_slice()),
        ]
    }

    pub fn find(&self, card_id: u32) -> Option<&InGameCard> {
        self.all_cards.iter().find(|card| card.card_id == card_id)
    }

    pub fn contains(&self, card: &InGameCard) -> bool {
        self.find(card.card_id).is_some()
    }

    /// Whether an opponent card already faces one of the local cards in the
    /// attack/block lane.
    pub fn is_engaged(&self, opponent_card: &InGameCard) -> bool {
        self.cards_attack_or_block.iter().any(|ally| {
            (ally.top_center_pos.x - opponent_card.top_center_pos.x).abs() < ENGAGED_DISTANCE
        })
    }

    pub fn clear(&mut self) {
        self.all_cards.clear();
        self.cards_hand.clear();
        self.cards_board.clear();
        self.cards_mulligan.clear();
        self.cards_attack_or_block.clear();
        self.spell_stack.clear();
        self.opponent_cards_attack_or_block.clear();
        self.opponent_cards_board.clear();
        self.opponent_cards_hand.clear();
    }

    /// Orders every zone left to right by screen position. `all_cards` keeps
    /// the order the producer gave it.
    pub fn sort_by_position(&mut self) {
        for zone in [
            &mut self.cards_hand,
            &mut self.cards_board,
            &mut self.cards_mulligan,
            &mut self.cards_attack_or_block,
            &mut self.spell_stack,
            &mut self.opponent_cards_attack_or_block,
            &mut self.opponent_cards_board,
            &mut self.opponent_cards_hand,
        ] {
            zone.sort_by_key(|card| card.position.x);
        }
    }

    /// Checks the partition invariants: every zoned card is in `all_cards`,
    /// no card sits in two zones, and owners agree with positions.
    pub fn validate(&self) -> Result<(), BoardError> {
        let mut seen_ids = HashSet::with_capacity(self.all_cards.len());
        for card in &self.all_cards {
            if !seen_ids.insert(card.card_id) {
                return Err(BoardError::DuplicateCard {
                    card_id: card.card_id,
                });
            }
            if !card.is_consistent() {
                return Err(BoardError::OwnerMismatch {
                    card_id: card.card_id,
                    position: card.in_game_position,
                    is_local_player: card.is_local_player,
                });
            }
        }

        let mut zone_of: HashMap<u32, &'static str> = HashMap::new();
        for (zone, cards) in self.zones() {
            for card in cards {
                if !seen_ids.contains(&card.card_id) {
                    return Err(BoardError::NotInAllCards {
                        card_id: card.card_id,
                        zone,
                    });
                }
                if let Some(first) = zone_of.insert(card.card_id, zone) {
                    return Err(BoardError::MultipleZones {
                        card_id: card.card_id,
                        first,
                        second: zone,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Full observable state handed to a single decision call.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GameBoardData {
    #[serde(default)]
    pub cards: BoardCards,
    pub mana: u32,
    pub spell_mana: u32,
    pub nexus_health: u32,
    pub opponent_nexus_health: u32,
}

impl GameBoardData {
    pub fn validate(&self) -> Result<(), BoardError> {
        self.cards.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        card::{CardType, GameCard},
        in_game_card::{Point, Size},
    };

    fn unit(card_id: u32, position: InGameCardPosition, local: bool, x: i32) -> InGameCard {
        InGameCard::new(
            GameCard::new("Legion Rearguard", "01NX006", 1, 3, 2, CardType::Unit),
            card_id,
            position,
            local,
        )
        .with_geometry(Point::new(x, 0), Size { width: 10, height: 10 })
    }

    #[test]
    fn attacker_facing_an_ally_is_engaged() {
        let board = BoardCards::from_cards(vec![unit(1, InGameCardPosition::AttackOrBlock, true, 200)]);
        let facing = unit(11, InGameCardPosition::OpponentAttackOrBlock, false, 205);
        let free = unit(12, InGameCardPosition::OpponentAttackOrBlock, false, 400);

        assert!(board.is_engaged(&facing));
        assert!(!board.is_engaged(&free));
    }

    #[test]
    fn from_cards_partitions_by_position() {
        let board = BoardCards::from_cards(vec![
            unit(1, InGameCardPosition::Hand, true, 300),
            unit(2, InGameCardPosition::Hand, true, 100),
            unit(3, InGameCardPosition::OpponentBoard, false, 50),
            unit(4, InGameCardPosition::Unknown, true, 0),
        ]);

        assert_eq!(board.all_cards.len(), 4);
        let hand_ids: Vec<_> = board.cards_hand.iter().map(|c| c.card_id).collect();
        assert_eq!(hand_ids, vec![2, 1]);
        assert_eq!(board.opponent_cards_board.len(), 1);
        assert!(board.zone(InGameCardPosition::Unknown).is_none());
        assert!(board.validate().is_ok());
    }

    #[test]
    fn validate_rejects_card_missing_from_all_cards() {
        let mut board = BoardCards::from_cards(vec![unit(1, InGameCardPosition::Hand, true, 0)]);
        board
            .cards_board
            .push(unit(9, InGameCardPosition::Board, true, 0));
        assert_eq!(
            board.validate(),
            Err(BoardError::NotInAllCards {
                card_id: 9,
                zone: "cards_board"
            })
        );
    }

    #[test]
    fn validate_rejects_card_in_two_zones() {
        let card = unit(1, InGameCardPosition::Board, true, 0);
        let mut board = BoardCards::from_cards(vec![card.clone()]);
        board.cards_attack_or_block.push(card);
        assert_eq!(
            board.validate(),
            Err(BoardError::MultipleZones {
                card_id: 1,
                first: "cards_board",
                second: "cards_attack_or_block"
            })
        );
    }

    #[test]
    fn validate_rejects_owner_mismatch() {
        let board =
            BoardCards::from_cards(vec![unit(5, InGameCardPosition::OpponentHand, true, 0)]);
        assert!(matches!(
            board.validate(),
            Err(BoardError::OwnerMismatch { card_id: 5, .. })
        ));
    }

    #[test]
    fn clear_empties_every_zone() {
        let mut board = BoardCards::from_cards(vec![
            unit(1, InGameCardPosition::Hand, true, 0),
            unit(2, InGameCardPosition::SpellStack, false, 0),
        ]);
        board.clear();
        assert!(board.all_cards.is_empty());
        assert!(board.cards_hand.is_empty());
        assert!(board.spell_stack.is_empty());
    }
}
