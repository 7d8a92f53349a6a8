// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for payload validation.

use thiserror::Error;

/// Errors raised while validating request payloads.
///
/// Validation happens before any boundary call, so an invalid payload
/// never reaches the analytics SDK or the flags endpoint.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
	/// A required field is empty or malformed.
	#[error("invalid payload: {0}")]
	InvalidPayload(String),

	/// The plugin configuration is unusable.
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),
}

/// Result type alias for payload validation.
pub type Result<T> = std::result::Result<T, CoreError>;
