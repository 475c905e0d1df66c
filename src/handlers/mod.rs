pub mod access;
pub mod commands;
pub mod generate;
pub mod responses;
