pub mod agent;
pub mod board;
pub mod config;
pub mod constants;
pub mod error;
pub mod location;
pub mod policy;
pub mod protocol;
pub mod search;
pub mod world;

pub use agent::{run, Agent, TurnActions};
pub use config::*;
pub use error::*;
