// ABOUTME: Context module: the persisted per-workspace session document.
// ABOUTME: Provides the document schema and its load/save helpers.

pub mod document;
pub mod persistence;

pub use document::{ContextDocument, SettingValue, default_settings};
