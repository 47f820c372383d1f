//! Notekeep Core Library
//!
//! Core domain logic for the notekeep backend: analytics event ingestion,
//! aggregation over events and notes, note CRUD, and the storage layer
//! those operations run against.

pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod notes;
pub mod store;
pub mod time;
