pub mod action;
pub mod board;
pub mod card;
pub mod game_state;
pub mod in_game_card;
pub mod plugin;
pub mod tagged;
pub mod target;

pub use action::{GamePlayAction, PlayDecision};
pub use board::{BoardCards, BoardError, GameBoardData, ENGAGED_DISTANCE};
pub use card::{CardKeyword, CardType, GameCard};
pub use game_state::GameState;
pub use in_game_card::{InGameCard, InGameCardPosition, Point, Size};
pub use plugin::{
    playable_hand_cards, DisposeError, PluginBase, PluginInfo, PluginKind, StrategyPlugin,
    SDK_VERSION,
};
pub use tagged::UnknownTag;
pub use target::{CardTarget, CardTargetSelector};
