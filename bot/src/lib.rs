pub mod config;
pub mod driver;
pub mod error;
pub mod guard;
pub mod registry;
pub mod scenario;

pub use config::{BotConfig, BotConfigFile};
pub use driver::{Bot, PlayedCard, Step};
pub use error::{BotError, ContractViolation, DecisionFailure, PluginNotValidReason};
pub use guard::{BlockPlan, Decision, GuardedStrategy};
pub use registry::{PluginRegistry, SharedStrategy, StrategyFactory};
pub use scenario::{Frame, Scenario};
