//! Boundary to the external text-generation service.

pub mod client;
pub mod client_impl;
pub mod factory;

pub use client::{GenerationRequest, LlmClient, MockLlmClient, ModelNotFound};
