pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod remote;
pub mod schedule;
pub mod services;
pub mod state;
pub mod sync;
