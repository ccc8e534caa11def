// Forklift - Maven monorepo fork & migration toolkit
// One-shot operator tools for rebranding, restructuring and splitting a forked build

pub mod cli;
pub mod config_patch;
pub mod github;
pub mod pom;
pub mod rebrand;
pub mod split;

pub use anyhow::{Context, Result};
pub use colored::Colorize;
