//! Core, platform independent networking code.

pub mod api;
pub mod check;
pub mod config;
pub mod dev;
pub mod link;
pub mod mock;
pub mod repr;
pub mod service;
pub mod socket;

pub use self::config::Config;
