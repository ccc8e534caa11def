//! CLI command runners, one per subcommand.

pub mod copy_secrets;
pub mod patch_config;
pub mod post_split;
pub mod rebrand;
pub mod restructure;
pub mod split;
pub mod uncomment;
