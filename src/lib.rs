pub mod config;
pub mod festival;
pub mod http;
pub mod likes;
pub mod schedule;
pub mod time;
pub mod views;
