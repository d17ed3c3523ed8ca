pub mod lexer;
mod parser;

pub use parser::Parser;
