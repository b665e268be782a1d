//! This crate contains all configuration-relevant code, including
//! the full configuration structure as well as methods needed to load
//! and validate it.
//!
//! Your starting point should probably be [`Configuration::load_from_default_path`],
//! or [`Configuration::default`] when no configuration file is present.
//!
//! # Internals
//! The configuration structure is based on the concept of
//! unvalidated ("unresolved") and validated configuration structures.
//!
//! The configuration file is first deserialized into the `UnresolvedConfiguration`
//! structure, whose tables are then resolved into their validated versions
//! (e.g. logging filters are parsed, tree sources are turned into either a
//! built-in catalogue or a path relative to the configuration file).

#![allow(rustdoc::private_intra_doc_links)]

mod error;
mod structure;
mod traits;
mod utilities;

pub use error::*;
pub use structure::*;
pub use utilities::get_default_configuration_file_path;
