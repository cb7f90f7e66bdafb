use std::time::Duration;

use thiserror::Error;
use types::{BoardError, DisposeError};

use crate::guard::Decision;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid board snapshot: {0}")]
    Board(#[from] BoardError),

    #[error("Plugin not found: {0}")]
    PluginNotFound(String),

    #[error("Plugin '{id}' is not valid: {reason}")]
    PluginNotValid {
        id: String,
        reason: PluginNotValidReason,
    },

    #[error("Plugin already loaded: {0}")]
    AlreadyLoaded(String),

    #[error("Plugin '{id}' failed to unload: {source}")]
    Dispose {
        id: String,
        #[source]
        source: DisposeError,
    },

    #[error("Plugin '{0}' is still busy with a decision, disposal is deferred")]
    Busy(String),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginNotValidReason {
    #[error("can't create an instance of the plugin")]
    CanNotCreateInstance,

    #[error("can't detect the plugin type")]
    UnknownPluginType,

    #[error("plugin information has no name")]
    InfoNotFound,

    #[error("invalid source code link")]
    InvalidInfoSourceCodeLink,

    #[error("targets outdated SDK version {found} (host is {expected})")]
    OutdatedSdk { found: u32, expected: u32 },

    #[error("targets unsupported SDK version {found} (host is {expected})")]
    UnsupportedSdk { found: u32, expected: u32 },
}

/// A strategy answer that breaks the decision contract for the snapshot it
/// was given.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("card #{card_id} was not offered")]
    CardNotOffered { card_id: u32 },

    #[error("card #{card_id} was returned more than once")]
    DuplicateCard { card_id: u32 },

    #[error("card #{card_id} costs {cost} with {mana} mana and {spell_mana} spell mana")]
    NotAffordable {
        card_id: u32,
        cost: u32,
        mana: u32,
        spell_mana: u32,
    },

    #[error("target selector belongs to card #{selector_card_id}, not card #{card_id}")]
    SelectorMismatch { card_id: u32, selector_card_id: u32 },

    #[error("target card #{card_id} is not in the snapshot")]
    TargetNotInSnapshot { card_id: u32 },

    #[error("hand target card #{card_id} is not in a hand")]
    TargetNotInHand { card_id: u32 },

    #[error("{target} target is missing its card")]
    MissingTargetCard { target: types::CardTarget },

    #[error("card #{card_id} is not an opponent attacker")]
    NotAnAttacker { card_id: u32 },

    #[error("card #{card_id} is not on the local board")]
    NotABlocker { card_id: u32 },

    #[error("card #{card_id} blocks more than one attacker")]
    DoubleBlock { card_id: u32 },

    #[error("spell #{card_id} is not in hand")]
    SpellNotInHand { card_id: u32 },
}

/// Why a guarded decision fell back to its neutral answer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecisionFailure {
    #[error("{decision} broke the contract: {violation}")]
    Violation {
        decision: Decision,
        violation: ContractViolation,
    },

    #[error("{decision} took longer than {budget:?}")]
    Timeout { decision: Decision, budget: Duration },

    #[error("{decision} panicked: {message}")]
    Panicked { decision: Decision, message: String },
}
