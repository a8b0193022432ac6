//! Use-case layer consumed by screens.
//!
//! # Responsibility
//! - Turn screen actions into store writes.
//! - Keep screens decoupled from storage details.

pub mod note_view_model;
