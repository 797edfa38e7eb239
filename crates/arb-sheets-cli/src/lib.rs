#![doc = include_str!("../README.md")]

pub mod commands;
pub mod core;
pub mod sheets;
pub mod utils;
