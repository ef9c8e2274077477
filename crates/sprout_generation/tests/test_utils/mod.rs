//! Shared test doubles and fixtures.

#![allow(dead_code)]

pub mod failing_store;
pub mod fixtures;
pub mod mock_model;
