//! scoutclaw - a scheduled research agent
//!
//! A run seeds a conversation with the user's instructions, then alternates
//! model turns and tool observations (web search, URL fetch) until the model
//! answers without requesting a tool or the iteration budget runs out.

pub mod agent;
pub mod config;
pub mod providers;
