pub mod anki;
pub mod cards;
pub mod cli;
pub mod config;
pub mod convert;
pub mod core;
pub mod document;
pub mod export;
pub mod gemini;
pub mod persistence;
pub mod sync;
pub mod vault;

pub use crate::core::AnkiMdError;
