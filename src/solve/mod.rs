mod agent;
mod moves;
mod statement;

pub use agent::{Agent, Inference};
pub use statement::Statement;
