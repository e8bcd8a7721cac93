//! Shared wire types for the Piston code-runner Discord bot

pub mod execute;
pub mod interactions;
pub mod responses;

pub use execute::*;
pub use interactions::*;
pub use responses::*;
