pub mod builtin;
pub mod types;
pub mod yaml;
