pub mod ast;
pub mod cst;
pub mod grammar;
pub mod keywords;
pub mod parser;
pub mod scanner;
pub mod token;
pub mod transform;
