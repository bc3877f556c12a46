pub mod candidates;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod hashing;
pub mod queries;
pub mod reconcile;
pub mod report;
pub mod types;
