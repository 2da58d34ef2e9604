//! Events and trigger windows.
//!
//! ## Key Components
//!
//! - [`GameEvent`] / [`EventArena`]: events, their typed parameters,
//!   handlers and sub-event links
//! - [`EventName`]: the closed set of event names; parsing an unknown name
//!   fails with `UnknownEvent`
//! - [`TriggerWindow`]: the staged resolution of a batch of simultaneous
//!   events
//!
//! The pipeline that drives windows lives in `crate::pipeline`.

pub mod event;
pub mod window;

pub use event::{
    DamageType, EventArena, EventCondition, EventContext, EventHandler, EventId, EventName,
    EventParams, GameEvent,
};
pub use window::{AbilityChoice, TriggerWindow, WindowId, WindowStage};
