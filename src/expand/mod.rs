// src/expand/mod.rs

//! Macro expansion.
//!
//! - [`table`] collects `NAME := body` declarations.
//! - [`expander`] resolves `$(NAME)` references (including macros that
//!   reference other macros) and detects circular references.

pub mod expander;
pub mod table;

pub use expander::{Expander, RuleContext};
pub use table::MacroTable;
