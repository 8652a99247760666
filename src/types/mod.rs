// mediafocus shared type definitions
// Each submodule defines types used across the coordinator, tab agents and bridges.

pub mod config;
pub mod errors;
pub mod match_pattern;
pub mod media;
pub mod message;
pub mod settings;
pub mod tab;
