//! WhatsApp Expense Agent
//!
//! A personal expense tracker driven entirely by chat:
//! - Receives inbound WhatsApp messages over a Twilio-style webhook
//! - Classifies intent by fixed keyword sets in priority order
//! - Extracts amounts (currency-token pass + number fallback) and categories
//! - Persists expenses and income in SQLite, replies with formatted text
//!
//! PIPELINE:
//! WEBHOOK → CLASSIFY → EXTRACT → STORE → REPLY

pub mod api;
pub mod classifier;
pub mod error;
pub mod extract;
pub mod interpreter;
pub mod models;
pub mod store;

pub use error::{BotError, Result};

// Re-export common types
pub use classifier::{Intent, IntentClassifier};
pub use models::*;
