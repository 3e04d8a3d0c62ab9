//! Core components, types, and utilities for the lunch-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Common types, errors, and result handling.

pub mod config;
pub mod types;
