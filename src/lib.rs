pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod paths;
pub mod planner;
pub mod services;
pub mod session;
pub mod state;
pub mod validation;

#[cfg(test)]
mod testing;
