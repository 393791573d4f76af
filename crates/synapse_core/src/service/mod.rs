//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store and sync calls into use-case level APIs.
//! - Keep the CLI decoupled from storage and transport details.

pub mod capture_service;
