//! Opkit - Operator Lifecycle Manager package toolkit.
//!
//! This crate provides both a CLI application and a library for working with
//! OLM packages: importing manifests from disk, resolving channel update
//! graphs, validating versions and channels, and exporting bundle archives.
//!
//! The update graph resolver lives in [`graph`]; [`validation`] decides which
//! versions and channels are usable.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod catalog;
pub mod domain;
pub mod error;
pub mod export;
pub mod graph;
pub mod import;
pub mod range;
pub mod validation;

// Public CLI module (needed by binary)
pub mod cli;

// Command implementations
pub mod commands;

pub mod app;
pub mod config;
pub mod output;
