//! Discord bot integration.
//!
//! Gateway events are converted to logger snapshots here and delivered
//! back to Discord as embeds.

pub mod client;
pub mod commands;
pub mod convert;
pub mod greeting;
pub mod handler;
pub mod sink;

pub use client::DiscordBotBuilder;
