//! Subcommands of the `qttt` binary

pub mod evaluate;
pub mod inspect;
pub mod maze;
pub mod merge;
pub mod train;
