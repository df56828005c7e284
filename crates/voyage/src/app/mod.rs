pub(crate) mod bootstrap;
pub(crate) mod cli;
mod config;
mod demo_map;
pub(crate) mod loop_runner;
mod session;
mod snapshot;
mod tmx;
