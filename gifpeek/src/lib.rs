// ABOUTME: Library exports for gifpeek modules for testing and external use
// ABOUTME: Makes internal modules available to integration tests and benchmarks

pub mod cli;
pub mod completions;
pub mod config;
pub mod constants;
pub mod extract;
pub mod image_protocols;
pub mod output;
pub mod preview;
pub mod tui;
