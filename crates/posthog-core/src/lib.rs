// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the PostHog Tauri plugin.
//!
//! This crate provides the transient request payload shapes that cross the
//! webview boundary (capture, identify, alias, feature-flag queries) along
//! with the plugin configuration types. Every payload is a one-shot value:
//! constructed per call, forwarded, and discarded.
//!
//! There is no delivery, retry, or persistence logic here. These types are
//! consumed by `tauri-plugin-posthog`, which forwards them to the bundled
//! analytics SDK and the remote flags endpoint.
//!
//! # Example
//!
//! ```
//! use posthog_core::{CaptureRequest, Properties};
//!
//! let request = CaptureRequest::new("checkout_completed")
//!     .with_properties(Properties::new().insert("plan", "pro"))
//!     .with_distinct_id("user_123");
//!
//! assert!(request.validate().is_ok());
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod flags;
pub mod identify;
pub mod properties;

pub use config::PluginConfig;
pub use error::{CoreError, Result};
pub use event::{BatchCaptureRequest, CaptureRequest, EventIdentity, OutboundEvent};
pub use flags::{DecideRequest, FlagValue, FlagsRequest, FlagsResponse};
pub use identify::{AliasRequest, IdentifyRequest};
pub use properties::Properties;
