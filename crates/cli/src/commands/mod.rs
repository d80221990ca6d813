//! CLI Commands

pub mod matching;
pub mod paths;
pub mod stable;
pub mod task;
