use crate::tagged::tagged_enum;

tagged_enum! {
    /// Phase the client is in when a decision is requested.
    ///
    /// A session typically runs `NoneState -> Hold -> Menus -> MenusDeckSelected
    /// -> SearchGame -> UserInteractNotReady -> Mulligan`, then alternates
    /// between `OpponentTurn`/`AttackTurn` and `Attacking`/`Blocking`/`DefendTurn`
    /// until `End`, after which it returns to the menus. Nothing in this crate
    /// enforces that order; strategies only read the current value.
    pub enum GameState {
        NoneState = 0,
        Hold = 1,
        Menus = 2,
        MenusDeckSelected = 3,
        SearchGame = 4,
        UserInteractNotReady = 5,
        Mulligan = 6,
        OpponentTurn = 7,
        DefendTurn = 8,
        AttackTurn = 9,
        Attacking = 10,
        Blocking = 11,
        End = 12,
    }
}

impl GameState {
    /// Whether a match is in progress, mulligan included.
    pub fn in_match(self) -> bool {
        (GameState::Mulligan..=GameState::Blocking).contains(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_state_tags_are_stable() {
        let table = [
            ("NoneState", 0),
            ("Hold", 1),
            ("Menus", 2),
            ("MenusDeckSelected", 3),
            ("SearchGame", 4),
            ("UserInteractNotReady", 5),
            ("Mulligan", 6),
            ("OpponentTurn", 7),
            ("DefendTurn", 8),
            ("AttackTurn", 9),
            ("Attacking", 10),
            ("Blocking", 11),
            ("End", 12),
        ];
        assert_eq!(GameState::ALL.len(), table.len());
        for (state, (name, tag)) in GameState::ALL.iter().zip(table) {
            assert_eq!(state.name(), name);
            assert_eq!(u8::from(*state), tag);
            assert_eq!(GameState::try_from(tag), Ok(*state));
        }
    }

    #[test]
    fn states_order_by_tag() {
        assert!(GameState::Menus < GameState::Mulligan);
        assert!(GameState::Mulligan.in_match());
        assert!(GameState::Blocking.in_match());
        assert!(!GameState::End.in_match());
        assert!(!GameState::SearchGame.in_match());
    }
}
