pub mod analyzer;
pub mod config;
pub mod parser;
pub mod plan;
pub mod progress;
pub mod sanitizer;
pub mod scanner;
pub mod source;
pub mod splitter;
