#[macro_use]
extern crate diesel;

pub mod commands;
pub mod config;
pub mod db;
pub mod interpreter;
pub mod logging;
