//! Shared test utilities for git-status-cache
//!
//! Integration tests run against real git repositories in temporary directories;
//! registry tests that need deterministic timing use the scripted runner instead.

pub mod assertions;
pub mod fixtures;
pub mod repository;
pub mod runner;
