//! coachbot - personalised training, nutrition and tactical plans for athletes
//!
//! Turns an athlete profile (sport, position, fitness, goals, injury and
//! dietary constraints) into deterministic prompts, sends them to a text
//! generation service (Gemini or any OpenAI-compatible endpoint) and caches
//! the answers per profile for the rest of the session.

pub mod cli;
pub mod coach;
pub mod config;
pub mod error;
pub mod export;
pub mod llm;
pub mod profile;
pub mod prompts;
pub mod session;
pub mod util;
