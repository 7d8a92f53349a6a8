// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Payload types for the capture operations.
//!
//! [`CaptureRequest`] and [`BatchCaptureRequest`] are the shapes the webview
//! sends across the boundary. [`OutboundEvent`] is a capture request after
//! identity resolution, ready for the analytics SDK.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::properties::Properties;

/// Payload for the capture operation.
///
/// Field naming follows the host boundary contract (camelCase on the wire).
/// Timestamps serialize as RFC 3339 text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRequest {
	pub event: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub properties: Option<Properties>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub distinct_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub groups: Option<HashMap<String, String>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub timestamp: Option<DateTime<Utc>>,
	#[serde(default)]
	pub anonymous: bool,
}

impl CaptureRequest {
	/// Creates a capture request for the given event name.
	pub fn new(event: impl Into<String>) -> Self {
		Self {
			event: event.into(),
			properties: None,
			distinct_id: None,
			groups: None,
			timestamp: None,
			anonymous: false,
		}
	}

	/// Creates an anonymous capture request.
	///
	/// Anonymous events never consult the stored or device-derived identity.
	pub fn anonymous(event: impl Into<String>) -> Self {
		Self {
			anonymous: true,
			..Self::new(event)
		}
	}

	/// Sets event properties (builder pattern).
	pub fn with_properties(mut self, properties: impl Into<Properties>) -> Self {
		self.properties = Some(properties.into());
		self
	}

	/// Sets an explicit distinct identifier for this event.
	pub fn with_distinct_id(mut self, distinct_id: impl Into<String>) -> Self {
		self.distinct_id = Some(distinct_id.into());
		self
	}

	/// Sets group associations for this event.
	pub fn with_groups(mut self, groups: HashMap<String, String>) -> Self {
		self.groups = Some(groups);
		self
	}

	/// Sets an explicit timestamp, for historical events.
	pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
		self.timestamp = Some(timestamp);
		self
	}

	/// Validates the payload before it reaches the boundary.
	pub fn validate(&self) -> Result<()> {
		if self.event.trim().is_empty() {
			return Err(CoreError::InvalidPayload(
				"event name must not be empty".to_string(),
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

/// Payload for the batch capture operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCaptureRequest {
	pub events: Vec<CaptureRequest>,
}

impl BatchCaptureRequest {
	/// Creates a batch capture request.
	pub fn new(events: Vec<CaptureRequest>) -> Self {
		Self { events }
	}

	/// Returns true if the batch contains no events.
	pub fn is_empty(&self) -> bool {
		self.events.is_empty()
	}

	/// Validates every event in the batch.
	pub fn validate(&self) -> Result<()> {
		for event in &self.events {
			event.validate()?;
		}
		Ok(())
	}
}

/// The identity an outbound event is attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventIdentity {
	/// Attributed to a distinct identifier.
	Identified(String),
	/// Not attributed to any identity.
	Anonymous,
}

impl EventIdentity {
	/// Returns the distinct identifier, if any.
	pub fn distinct_id(&self) -> Option<&str> {
		match self {
			EventIdentity::Identified(id) => Some(id),
			EventIdentity::Anonymous => None,
		}
	}
}

/// A capture request resolved against client state.
///
/// Identity fallback has already been applied by the caller and the stable
/// device identifier is stamped into the properties as `$device_id`.
#[derive(Debug, Clone)]
pub struct OutboundEvent {
	pub name: String,
	pub identity: EventIdentity,
	pub properties: Properties,
	pub groups: HashMap<String, String>,
	pub timestamp: Option<DateTime<Utc>>,
}

impl OutboundEvent {
	/// Assembles an outbound event from a capture request and a resolved
	/// identity.
	///
	/// The request's own `distinct_id`/`anonymous` fields are already folded
	/// into `identity`; only the event name, properties, groups, and
	/// timestamp are taken from the request.
	pub fn from_request(
		request: CaptureRequest,
		identity: EventIdentity,
		device_id: &str,
	) -> Self {
		let properties = Properties::new()
			.insert("$device_id", device_id)
			.merge(request.properties.unwrap_or_default());

		Self {
			name: request.event,
			identity,
			properties,
			groups: request.groups.unwrap_or_default(),
			timestamp: request.timestamp,
		}
	}
}
