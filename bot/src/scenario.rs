use std::path::Path;

use serde::{Deserialize, Serialize};
use types::{BoardCards, GameBoardData, GameState, InGameCard};

use crate::error::BotError;

fn full_nexus() -> u32 {
    20
}

/// One observed moment of a match: the game state plus every visible card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub game_state: GameState,
    #[serde(default)]
    pub mana: u32,
    #[serde(default)]
    pub spell_mana: u32,
    #[serde(default = "full_nexus")]
    pub nexus_health: u32,
    #[serde(default = "full_nexus")]
    pub opponent_nexus_health: u32,
    #[serde(default)]
    pub cards: Vec<InGameCard>,
}

impl Frame {
    pub fn board_data(&self) -> GameBoardData {
        GameBoardData {
            cards: BoardCards::from_cards(self.cards.clone()),
            mana: self.mana,
            spell_mana: self.spell_mana,
            nexus_health: self.nexus_health,
            opponent_nexus_health: self.opponent_nexus_health,
        }
    }
}

/// A recorded sequence of frames to replay through a strategy offline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    pub frames: Vec<Frame>,
}

impl Scenario {
    pub fn from_yaml_file(path: &Path) -> Result<Self, BotError> {
        let contents = std::fs::read_to_string(path)?;
        let mut scenario = Self::from_yaml_str(&contents)?;
        if scenario.name.is_empty() {
            scenario.name = path.display().to_string();
        }
        Ok(scenario)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, BotError> {
        Ok(serde_yaml::from_str(contents)?)
    }
}

#[cfg(test)]
mod tests {
    use types::{CardKeyword, CardType, InGameCardPosition};

    use super::*;

    const BLOCKING_FRAME: &str = r#"
name: one blocker
frames:
  - game_state: 11
    mana: 3
    cards:
      - name: Legion Rearguard
        card_code: 01NX006
        cost: 1
        attack: 3
        health: 2
        card_type: 1
        card_id: 4
        in_game_position: 3
        position: { x: 100, y: 500 }
        size: { width: 80, height: 120 }
        is_local_player: true
      - name: Elusive Sprite
        card_code: 01IO000
        cost: 1
        attack: 1
        health: 1
        card_type: 1
        keywords: [5]
        card_id: 11
        in_game_position: 6
        is_local_player: false
"#;

    #[test]
    fn frames_parse_from_yaml() {
        let scenario = Scenario::from_yaml_str(BLOCKING_FRAME).unwrap();
        assert_eq!(scenario.name, "one blocker");
        assert_eq!(scenario.frames.len(), 1);

        let frame = &scenario.frames[0];
        assert_eq!(frame.game_state, GameState::Blocking);
        assert_eq!(frame.nexus_health, 20);

        let board_data = frame.board_data();
        board_data.validate().unwrap();
        assert_eq!(board_data.mana, 3);
        assert_eq!(board_data.cards.cards_board.len(), 1);
        assert_eq!(board_data.cards.cards_board[0].card_type, CardType::Unit);

        let attacker = &board_data.cards.opponent_cards_attack_or_block[0];
        assert_eq!(attacker.in_game_position, InGameCardPosition::OpponentAttackOrBlock);
        assert!(attacker.has_keyword(CardKeyword::Elusive));
    }

    #[test]
    fn missing_frames_is_an_error() {
        assert!(matches!(
            Scenario::from_yaml_str("name: empty\n"),
            Err(BotError::Yaml(_))
        ));
    }
}
