//! Medallion Core
//!
//! Core types and abstractions for the Medallion pipeline launcher.
//!
//! This crate contains:
//! - Domain types: pipeline names, validated parameters, descriptors
//! - Store: the table store abstraction pipelines read from and write to

pub mod domain;
pub mod store;
