//! Core engine types: entities, players, state, RNG, configuration and the
//! game log.

pub mod entity;
pub mod player;
pub mod rng;
pub mod config;
pub mod log;
pub mod state;

pub use entity::EntityId;
pub use player::{Player, PlayerId, PlayerMap};
pub use rng::GameRng;
pub use config::{GameConfig, PlayerOptions};
pub use log::{GameLog, LogEntry};
pub use state::{GameState, LocationChange};
