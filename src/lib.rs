pub mod config;
pub mod db;
pub mod environment;
pub mod errors;
pub mod filter;
pub mod level;
pub mod player;
pub mod routes;
pub mod service;
pub mod timestamp;
pub mod validation;
