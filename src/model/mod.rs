pub mod header;
pub mod script;
pub mod settings;
pub mod task;
pub mod token;

pub use header::*;
pub use script::*;
pub use settings::*;
pub use task::*;
pub use token::*;
