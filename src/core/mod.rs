pub mod app;
pub mod ast;
pub mod config;
pub mod message;
pub mod normalize;
pub mod parser;
pub mod paths;
pub mod translate;
