//! Integration tests module
//!
//! This module organizes all integration tests for the reflectobot application.

pub mod config_test;
pub mod coordinator_test;
pub mod progress_test;
