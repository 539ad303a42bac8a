//! Structured version bumping
//!
//! - [`version`]: Part chain and its bump/reset cascade
//! - [`config`]: JSON configuration file holding part records and their values
//! - [`files`]: Rewrites the version inside other text files
//! - [`cli`]: Command line interface

pub mod cli;
pub mod config;
pub mod files;
pub mod version;
