// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Payload types for feature-flag queries.
//!
//! Flag evaluation happens on the analytics service; these types only carry
//! the query across the boundary and the evaluated values back.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, Result};

/// Payload for a feature-flag query from the webview.
///
/// When `distinct_id` is absent the host resolves it from the stored
/// identity, falling back to the device identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagsRequest {
	pub key: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub distinct_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub groups: Option<HashMap<String, String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub person_properties: Option<HashMap<String, Value>>,
}

impl FlagsRequest {
	/// Creates a flag query for the given flag key.
	pub fn new(key: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			distinct_id: None,
			groups: None,
			person_properties: None,
		}
	}

	/// Sets an explicit distinct identifier for the query.
	pub fn with_distinct_id(mut self, distinct_id: impl Into<String>) -> Self {
		self.distinct_id = Some(distinct_id.into());
		self
	}

	/// Validates the payload before it reaches the boundary.
	pub fn validate(&self) -> Result<()> {
		if self.key.trim().is_empty() {
			return Err(CoreError::InvalidPayload(
				"flag key must not be empty".to_string(),
			));
		}
		Ok(())
	}
}

/// The request body forwarded to the service's decide endpoint.
///
/// The decide contract uses snake_case field names, unlike the webview
/// boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecideRequest {
	pub api_key: String,
	pub distinct_id: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub groups: Option<HashMap<String, String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub person_properties: Option<HashMap<String, Value>>,
}

impl DecideRequest {
	/// Builds the decide body from a flag query and a resolved identity.
	pub fn new(api_key: impl Into<String>, distinct_id: impl Into<String>, request: FlagsRequest) -> Self {
		Self {
			api_key: api_key.into(),
			distinct_id: distinct_id.into(),
			groups: request.groups,
			person_properties: request.person_properties,
		}
	}
}

/// The value the service evaluated for a flag.
///
/// Boolean flags come back as `true`/`false`; multivariate flags come back
/// as the variant key. A variant value means the flag is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
	Enabled(bool),
	Variant(String),
}

impl FlagValue {
	/// Returns true if the flag is on for this identity.
	pub fn is_enabled(&self) -> bool {
		match self {
			FlagValue::Enabled(enabled) => *enabled,
			FlagValue::Variant(_) => true,
		}
	}

	/// Returns the variant key for multivariate flags.
	pub fn variant(&self) -> Option<&str> {
		match self {
			FlagValue::Enabled(_) => None,
			FlagValue::Variant(variant) => Some(variant),
		}
	}
}

/// The decide endpoint's evaluated flag set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlagsResponse {
	pub feature_flags: HashMap<String, FlagValue>,
	pub feature_flag_payloads: HashMap<String, Value>,
	pub errors_while_computing_flags: bool,
}

impl FlagsResponse {
	/// Looks up the evaluated value for a flag key.
	pub fn flag(&self, key: &str) -> Option<&FlagValue> {
		self.feature_flags.get(key)
	}
}
