//! Command handlers for the courserank CLI

pub mod matching;
pub mod target_groups;

pub use matching::handle_match_command;
pub use target_groups::handle_target_groups_command;
