use std::{
    fmt::Display,
    hash::{Hash, Hasher},
    ops::Deref,
};

use serde::{Deserialize, Serialize};

use crate::{card::GameCard, tagged::tagged_enum};

tagged_enum! {
    /// Zone a card occupies on the client, from the local player's point of view.
    pub enum InGameCardPosition {
        Unknown = 0,
        Mulligan = 1,
        Hand = 2,
        Board = 3,
        AttackOrBlock = 4,
        SpellStack = 5,
        OpponentAttackOrBlock = 6,
        OpponentBoard = 7,
        OpponentHand = 8,
    }
}

impl InGameCardPosition {
    /// Which side a card in this zone must belong to. `None` when the zone
    /// does not tell (unknown position, or the shared spell stack).
    pub fn owner_is_local(self) -> Option<bool> {
        match self {
            InGameCardPosition::Mulligan
            | InGameCardPosition::Hand
            | InGameCardPosition::Board
            | InGameCardPosition::AttackOrBlock => Some(true),
            InGameCardPosition::OpponentAttackOrBlock
            | InGameCardPosition::OpponentBoard
            | InGameCardPosition::OpponentHand => Some(false),
            InGameCardPosition::Unknown | InGameCardPosition::SpellStack => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

/// A card as seen in one snapshot of a running match.
///
/// Two values are equal when they carry the same `card_id`; everything else
/// is positional state that the next snapshot may change.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InGameCard {
    #[serde(flatten)]
    pub card: GameCard,
    pub card_id: u32,
    pub in_game_position: InGameCardPosition,
    #[serde(default)]
    pub position: Point,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub top_center_pos: Point,
    #[serde(default)]
    pub bottom_center_pos: Point,
    pub is_local_player: bool,
}

impl InGameCard {
    pub fn new(
        card: GameCard,
        card_id: u32,
        in_game_position: InGameCardPosition,
        is_local_player: bool,
    ) -> Self {
        Self {
            card,
            card_id,
            in_game_position,
            position: Point::default(),
            size: Size::default(),
            top_center_pos: Point::default(),
            bottom_center_pos: Point::default(),
            is_local_player,
        }
    }

    /// Sets the on-screen rectangle; the anchor points are derived from it.
    pub fn with_geometry(mut self, position: Point, size: Size) -> Self {
        let center_x = position.x + size.width / 2;
        self.position = position;
        self.size = size;
        self.top_center_pos = Point::new(center_x, position.y);
        self.bottom_center_pos = Point::new(center_x, position.y + size.height);
        self
    }

    /// Whether the zone agrees with the owner flag.
    pub fn is_consistent(&self) -> bool {
        self.in_game_position
            .owner_is_local()
            .map_or(true, |local| local == self.is_local_player)
    }
}

impl Deref for InGameCard {
    type Target = GameCard;

    fn deref(&self) -> &Self::Target {
        &self.card
    }
}

impl PartialEq for InGameCard {
    fn eq(&self, other: &Self) -> bool {
        self.card_id == other.card_id
    }
}

impl Eq for InGameCard {}

impl Hash for InGameCard {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.card_id.hash(state);
    }
}

impl Display for InGameCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "InGameCard({} -- TopCenter: ({}); IsLocalPlayer: {})",
            self.card, self.top_center_pos, self.is_local_player
        )
    }
}
