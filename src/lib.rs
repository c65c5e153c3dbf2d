// src/lib.rs
pub mod config;
pub mod proxy;
pub mod server;
