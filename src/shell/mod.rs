pub mod command;
pub mod executor;
pub mod parser;
mod readline;
mod shell;
mod signals;

pub use readline::LineSource;
pub use shell::Shell;
