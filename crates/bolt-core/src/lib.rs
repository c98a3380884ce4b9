pub mod actions;
pub mod config;
pub mod markup;
pub mod parser;
pub mod replay;
pub mod state;
pub mod verify;

pub use actions::*;
pub use parser::*;
pub use state::*;
