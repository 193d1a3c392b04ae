pub mod diagram;
pub mod parser;
pub mod render;
pub mod report;
pub mod resolver;
pub mod schema;
pub mod synth;
