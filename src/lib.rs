//! apexcheck core library.
//!
//! This crate exposes programmatic APIs for parsing Apex sources and checking
//! files, directories and SFDX projects for syntax errors.
//!
//! High-level modules:
//! - `stream`: Character streams, including the case-folding adapter.
//! - `grammar`: Lexer, token stream, parser and parse trees.
//! - `listener`: Fail-fast, collect-all and counting error policies.
//! - `factory`: Lexer/token stream/parser construction.
//! - `project`: `sfdx-project.json` discovery and package resolution.
//! - `dispatch`: File extension to grammar entry point mapping.
//! - `check`: Batch checker for paths and projects.
//! - `models`: Result and descriptor data models.
//! - `config`: Discovery and effective configuration resolution.
//! - `cli`: CLI argument parsing (binary uses this).
//! - `output`: Human/JSON printers for check results.
//! - `error`: Processing failure type.
pub mod check;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod factory;
pub mod grammar;
pub mod listener;
pub mod models;
pub mod output;
pub mod project;
pub mod stream;
