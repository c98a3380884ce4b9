pub mod completion;
pub mod contracts;
pub mod dispatcher;
pub mod runtime;

pub use completion::*;
pub use contracts::*;
pub use dispatcher::*;
pub use runtime::*;
