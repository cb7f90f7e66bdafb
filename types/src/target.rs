use std::fmt::Display;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{in_game_card::InGameCard, tagged::tagged_enum};

tagged_enum! {
    pub enum CardTarget {
        Card = 0,
        HandCard = 1,
        Nexus = 2,
        OpponentNexus = 3,
    }
}

/// Ordered declaration of where a played card's effect should land.
///
/// Targets are resolved in the order they were added. Nothing here checks
/// that a target is legal for the card; the host does that when it executes
/// the play.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardTargetSelector {
    card: InGameCard,
    targets: Vec<(CardTarget, Option<InGameCard>)>,
}

impl CardTargetSelector {
    pub fn new(card: InGameCard) -> Self {
        Self {
            card,
            targets: Vec::new(),
        }
    }

    /// Targets a card on the board.
    pub fn add_target(mut self, card: InGameCard) -> Self {
        self.targets.push((CardTarget::Card, Some(card)));
        self
    }

    pub fn add_target_nexus(mut self) -> Self {
        self.targets.push((CardTarget::Nexus, None));
        self
    }

    pub fn add_target_opponent_nexus(mut self) -> Self {
        self.targets.push((CardTarget::OpponentNexus, None));
        self
    }

    /// Targets a card while it is still in a hand.
    pub fn add_target_hand_card(mut self, card_in_hand: InGameCard) -> Self {
        self.targets.push((CardTarget::HandCard, Some(card_in_hand)));
        self
    }

    /// The card whose effect is being targeted.
    pub fn card(&self) -> &InGameCard {
        &self.card
    }

    pub fn targets(&self) -> &[(CardTarget, Option<InGameCard>)] {
        &self.targets
    }

    pub fn into_targets(self) -> Vec<(CardTarget, Option<InGameCard>)> {
        self.targets
    }
}

impl Display for CardTargetSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let targets = self
            .targets
            .iter()
            .map(|(kind, card)| match card {
                Some(card) => format!("{kind}:{}", card.card_id),
                None => kind.to_string(),
            })
            .join(", ");
        write!(f, "{} -> [{}]", self.card.name, targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        card::{CardType, GameCard},
        in_game_card::InGameCardPosition,
    };

    fn card(card_id: u32, name: &str, position: InGameCardPosition, local: bool) -> InGameCard {
        InGameCard::new(
            GameCard::new(name, "01NX000", 1, 0, 0, CardType::Spell),
            card_id,
            position,
            local,
        )
    }

    #[test]
    fn target_tags_are_stable() {
        assert_eq!(u8::from(CardTarget::Card), 0);
        assert_eq!(u8::from(CardTarget::HandCard), 1);
        assert_eq!(u8::from(CardTarget::Nexus), 2);
        assert_eq!(u8::from(CardTarget::OpponentNexus), 3);
        assert_eq!(CardTarget::ALL.len(), 4);
    }

    #[test]
    fn targets_keep_insertion_order() {
        let decimate = card(1, "Decimate", InGameCardPosition::Hand, true);
        let enemy = card(2, "Enemy", InGameCardPosition::OpponentBoard, false);

        let selector = CardTargetSelector::new(decimate.clone())
            .add_target_nexus()
            .add_target(enemy.clone());

        assert_eq!(selector.card(), &decimate);
        assert_eq!(
            selector.targets(),
            &[(CardTarget::Nexus, None), (CardTarget::Card, Some(enemy))]
        );
    }

    #[test]
    fn every_target_kind_is_recorded() {
        let source = card(1, "Mystic Shot", InGameCardPosition::Hand, true);
        let in_hand = card(3, "Poro", InGameCardPosition::Hand, true);

        let targets = CardTargetSelector::new(source)
            .add_target_opponent_nexus()
            .add_target_hand_card(in_hand.clone())
            .add_target_nexus()
            .into_targets();

        let kinds: Vec<_> = targets.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(
            kinds,
            vec![
                CardTarget::OpponentNexus,
                CardTarget::HandCard,
                CardTarget::Nexus
            ]
        );
        assert_eq!(targets[1].1.as_ref(), Some(&in_hand));
    }

    #[test]
    fn display_lists_targets() {
        let selector = CardTargetSelector::new(card(1, "Mystic Shot", InGameCardPosition::Hand, true))
            .add_target(card(4, "Enemy", InGameCardPosition::OpponentBoard, false))
            .add_target_opponent_nexus();
        assert_eq!(selector.to_string(), "Mystic Shot -> [Card:4, OpponentNexus]");
    }
}
