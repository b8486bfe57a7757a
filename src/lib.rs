//! sse: sentence structure explorer
//!
//! Parses sentences annotated in the clause/phrase bracket notation into
//! syntax trees, indexes each node against the sentence text and computes
//! proportional bar layouts for display.
//!
//! Layers, innermost first:
//! - [`domain`]: notation parser, tree arena, metrics, text index, layout, hover
//! - [`application`]: corpus loading and batch validation
//! - [`infrastructure`]: filesystem boundary and service wiring
//! - [`cli`]: command line surface

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
