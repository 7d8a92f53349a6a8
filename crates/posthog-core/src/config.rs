// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Plugin configuration types.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Configuration for the plugin.
///
/// Resolved once at startup from environment variables and the
/// `tauri.conf.json` plugin table. The ingestion endpoint is handed to the
/// bundled analytics SDK; the API host is used for feature-flag queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
	pub api_key: String,
	#[serde(default = "default_api_host")]
	pub api_host: String,
	#[serde(default = "default_api_endpoint")]
	pub api_endpoint: String,
	#[serde(default = "default_request_timeout")]
	pub request_timeout_seconds: u64,
	#[serde(default = "default_auto_identify")]
	pub auto_identify: bool,
}

impl PluginConfig {
	/// Creates a configuration with default endpoints for the given key.
	pub fn new(api_key: impl Into<String>) -> Self {
		Self {
			api_key: api_key.into(),
			api_host: default_api_host(),
			api_endpoint: default_api_endpoint(),
			request_timeout_seconds: default_request_timeout(),
			auto_identify: default_auto_identify(),
		}
	}

	/// The decide endpoint used for feature-flag queries.
	pub fn decide_endpoint(&self) -> String {
		format!("{}/decide/?v=3", self.api_host.trim_end_matches('/'))
	}

	/// Validates the configuration.
	pub fn validate(&self) -> Result<()> {
		if self.api_key.trim().is_empty() {
			return Err(CoreError::InvalidConfig(
				"api key must not be empty".to_string(),
			));
		}
		if !self.api_host.starts_with("http") {
			return Err(CoreError::InvalidConfig(
				"api host must be an http(s) URL".to_string(),
			));
		}
		Ok(())
	}
}

pub fn default_api_host() -> String {
	"https://us.i.posthog.com".to_string()
}

pub fn default_api_endpoint() -> String {
	"https://us.i.posthog.com/i/v0/e/".to_string()
}

fn default_request_timeout() -> u64 {
	30
}

fn default_auto_identify() -> bool {
	true
}
