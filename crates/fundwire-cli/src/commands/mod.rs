//! Command implementations.

mod parse;
mod reset;
mod run;
mod status;

pub use parse::execute_parse;
pub use reset::execute_reset;
pub use run::execute_run;
pub use status::execute_status;
