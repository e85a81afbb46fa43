//! Student Portal: terminal front end for the support triage assistant.
//!
//! Stands in for the chat and complaint-form screens: the [`console`] module
//! runs the interactive session, [`render`] formats turns, drafts and
//! classification results.

#![allow(clippy::uninlined_format_args)]

pub mod console;
pub mod render;

pub use console::{ChatCommand, ConsoleError, FormCommand, Session};
