pub mod commands;
pub mod landmarks;
