// ABOUTME: Library root for lucidia: re-exports all modules for integration testing.
// ABOUTME: The binary entry point is in main.rs, which uses this crate as a library.

pub mod capture;
pub mod command;
pub mod config;
pub mod context;
pub mod logging;
pub mod session;
