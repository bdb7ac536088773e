//! Shared library for the events API Lambda functions.
//!
//! This crate provides the upstream client, property accessors, and event
//! normalization used by the Lambda handler.

pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod notion;
pub mod properties;

pub use config::Config;
pub use error::{Error, Result};
pub use events::{assemble, normalize, Event, EventsResponse};
pub use notion::{fetch_all_pages, NotionClient, Page, PageSource};
