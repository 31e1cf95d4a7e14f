//! Automation Hub: workflow marketplace back-end.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod auth;
pub mod builder;
pub mod carousel;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod dashboard;
pub mod requests;
pub mod roi;
pub mod simulator;
pub mod storage;
pub mod types;
