pub mod config;
pub mod discord;
pub mod fetcher;
pub mod health;
pub mod models;
pub mod notifier;
pub mod parsers;
pub mod storage;
pub mod tracker;
pub mod utils;
