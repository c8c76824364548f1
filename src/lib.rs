//! Channel betting bot core
//!
//! Ingests unstructured channel broadcasts, classifies game lifecycle
//! events, decides bets through user-configured draw-rule schemes, tracks
//! orders from dispatch through confirmation to settlement, and keeps
//! profit/loss ledgers with automatic risk cutoffs and scheme rotation.

pub mod config;
pub mod confirm;
pub mod context;
pub mod engine;
pub mod error;
pub mod game;
pub mod history;
pub mod odds;
pub mod orders;
pub mod risk;
pub mod scheme;
pub mod settlement;
pub mod stake;
pub mod store;
pub mod strategy;
pub mod transport;
pub mod types;

pub use config::Config;
pub use engine::Engine;
pub use error::BotError;
pub use odds::OddsTable;
pub use store::SchemeStore;
pub use types::{GameFamily, InboundMessage, Order, OrderStatus, PlayMode};
