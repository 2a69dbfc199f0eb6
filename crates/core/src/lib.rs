//! Core library for jira2discord
//!
//! This crate implements the **Functional Core** of the jira2discord
//! application, following the Functional Core - Imperative Shell architectural
//! pattern.
//!
//! # Architecture Overview
//!
//! The project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`jira2discord_core`** (this crate): Pure transformation functions with zero I/O
//! - **`jira2discord`**: I/O operations and orchestration (the Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! All functions in this crate adhere to these principles:
//!
//! - **Pure functions**: Same input always produces the same output
//! - **No side effects**: No I/O operations, no external state mutations
//! - **Deterministic**: Behavior is predictable and reproducible
//! - **Testable**: Can be tested with simple fixture data, no mocking required
//!
//! # Module Organization
//!
//! - [`markup`]: Jira wiki markup to Discord markdown
//! - [`atlassian`]: Jira webhook payloads and ADF rendering
//! - [`discord`]: Discord webhook message model and embed limits
//! - [`users`]: Jira to Discord user directory
//! - [`compose`]: Webhook event to Discord message
//!
//! # Example Usage
//!
//! ```rust
//! use jira2discord_core::atlassian::jira::parse_webhook;
//! use jira2discord_core::compose::{to_discord_message, ComposeOptions};
//! use jira2discord_core::users::UserDirectory;
//!
//! let webhook = parse_webhook(
//!     r#"{ "issue": { "key": "PROJ-1", "fields": { "summary": "Fix *it*" } } }"#,
//! )
//! .unwrap();
//!
//! let message = to_discord_message(&webhook, &ComposeOptions::default(), &UserDirectory::default());
//!
//! assert_eq!(message.embeds[0].title, "PROJ-1: Fix *it*");
//! ```

pub mod atlassian;
pub mod compose;
pub mod discord;
pub mod error;
pub mod markup;
pub mod users;

pub use error::Error;
