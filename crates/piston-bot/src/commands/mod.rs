//! Application command implementations

pub mod run;

pub use run::RunCommand;
