// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Payload types for identity resolution operations.
//!
//! These types are used by the identify and alias boundary procedures.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::properties::Properties;

/// Payload for the identify operation, associating the session with a
/// distinct identifier.
///
/// When a user logs in, the webview calls identify to attribute subsequent
/// events to that user. Optional properties are forwarded as a `$identify`
/// event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyRequest {
	pub distinct_id: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub properties: Option<Properties>,
}

impl IdentifyRequest {
	/// Creates a new identify request.
	pub fn new(distinct_id: impl Into<String>) -> Self {
		Self {
			distinct_id: distinct_id.into(),
			properties: None,
		}
	}

	/// Sets properties to attach to the `$identify` event (builder pattern).
	pub fn with_properties(mut self, properties: impl Into<Properties>) -> Self {
		self.properties = Some(properties.into());
		self
	}

	/// Validates the payload before it reaches the boundary.
	pub fn validate(&self) -> Result<()> {
		if self.distinct_id.trim().is_empty() {
			return Err(CoreError::InvalidPayload(
				"distinct ID must not be empty".to_string(),
			));
		}
		Ok(())
	}
}

/// Payload for the alias operation, linking a new alias to the current
/// identity.
///
/// When `distinct_id` is absent the host uses the stored identity; if none
/// is available the operation fails, telling the caller to identify first.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasRequest {
	pub alias: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub distinct_id: Option<String>,
}

impl AliasRequest {
	/// Creates a new alias request against the stored identity.
	pub fn new(alias: impl Into<String>) -> Self {
		Self {
			alias: alias.into(),
			distinct_id: None,
		}
	}

	/// Sets an explicit distinct identifier to alias from.
	pub fn with_distinct_id(mut self, distinct_id: impl Into<String>) -> Self {
		self.distinct_id = Some(distinct_id.into());
		self
	}

	/// Validates the payload before it reaches the boundary.
	pub fn validate(&self) -> Result<()> {
		if self.alias.trim().is_empty() {
			return Err(CoreError::InvalidPayload(
				"alias must not be empty".to_string(),
			));
		}
		if matches!(self.distinct_id.as_deref(), Some(id) if id.trim().is_empty()) {
			return Err(CoreError::InvalidPayload(
				"distinct ID must not be empty when provided".to_string(),
			));
		}
		Ok(())
	}
}
