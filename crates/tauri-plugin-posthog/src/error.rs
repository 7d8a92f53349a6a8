// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the plugin.
//!
//! Errors serialize as their display string so command failures cross the
//! webview boundary unchanged.

use serde::{ser::Serializer, Serialize};
use thiserror::Error;

/// Result type alias for plugin operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Plugin errors.
#[derive(Debug, Error)]
pub enum Error {
	/// A payload or configuration failed validation before the boundary call.
	#[error(transparent)]
	Validation(#[from] posthog_core::CoreError),

	/// The bundled analytics SDK rejected the request.
	#[error("analytics client error: {0}")]
	Client(posthog_rs::Error),

	/// SDK client options could not be assembled.
	#[error("client options error: {0}")]
	ClientOptions(String),

	/// The flag query could not reach the decide endpoint.
	#[error("flags request failed: {0}")]
	FlagsRequest(#[from] reqwest::Error),

	/// The decide endpoint returned a non-success status.
	#[error("flags endpoint returned status {status}")]
	FlagsStatus { status: u16 },

	/// alias() was called before any identity was available.
	#[error("cannot create an alias without a distinct ID; call identify() first")]
	AliasWithoutIdentity,

	/// No API key was found in the environment or `tauri.conf.json`.
	#[error("missing API key: set POSTHOG_API_KEY or configure apiKey in tauri.conf.json")]
	MissingApiKey,

	/// The machine-derived device identifier could not be read.
	#[error("failed to resolve device ID: {0}")]
	DeviceId(String),
}

impl Serialize for Error {
	fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(self.to_string().as_ref())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn alias_without_identity_is_descriptive() {
		let err = Error::AliasWithoutIdentity;
		let message = err.to_string();
		assert!(message.contains("identify()"), "message was: {message}");
	}

	#[test]
	fn missing_api_key_names_both_sources() {
		let message = Error::MissingApiKey.to_string();
		assert!(message.contains("POSTHOG_API_KEY"));
		assert!(message.contains("tauri.conf.json"));
	}

	#[test]
	fn errors_serialize_as_display_string() {
		let err = Error::FlagsStatus { status: 503 };
		let serialized = serde_json::to_value(&err).unwrap();
		assert_eq!(serialized, serde_json::json!("flags endpoint returned status 503"));
	}

	#[test]
	fn validation_errors_pass_through() {
		let core = posthog_core::CoreError::InvalidPayload("event name must not be empty".to_string());
		let err = Error::from(core);
		assert_eq!(err.to_string(), "invalid payload: event name must not be empty");
	}

	proptest! {
		#[test]
		fn flags_status_message_names_the_code(status in 400u16..600) {
			let err = Error::FlagsStatus { status };
			let serialized = serde_json::to_value(&err).unwrap();
			prop_assert!(serialized.as_str().unwrap().contains(&status.to_string()));
		}
	}
}
