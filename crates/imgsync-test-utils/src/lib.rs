//! Shared test utilities for the imgsync workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only: never published.
//!
//! # Modules
//!
//! - [`archive`]: tar archives standing in for firmware partition images
//! - [`git`]: bare remotes, seeded histories and remote inspection
//! - [`tools`]: shell scripts that impersonate 7z and apktool
//! - [`workspace`]: [`TestWorkspace`](workspace::TestWorkspace) tying the above together

pub mod archive;
pub mod git;
pub mod tools;
pub mod workspace;
