// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration resolution.
//!
//! The effective configuration is resolved once from environment variables
//! and the `posthog` table in `tauri.conf.json`; environment variables win.

use posthog_core::PluginConfig;
use serde_json::Value;
use tauri::{AppHandle, Runtime};

use crate::error::{Error, Result};

/// Resolves the effective plugin configuration for this app.
pub fn resolve<R: Runtime>(app: &AppHandle<R>) -> Result<PluginConfig> {
	let plugin = app.config().plugins.0.get("posthog").cloned();
	from_sources(
		std::env::var("POSTHOG_API_KEY").ok(),
		std::env::var("POSTHOG_API_HOST").ok(),
		plugin.as_ref(),
	)
}

/// Merges the configuration sources, environment first.
fn from_sources(
	env_api_key: Option<String>,
	env_api_host: Option<String>,
	plugin: Option<&Value>,
) -> Result<PluginConfig> {
	let get_str = |key: &str| {
		plugin
			.and_then(|v| v.get(key))
			.and_then(Value::as_str)
			.map(str::to_owned)
	};

	let api_key = env_api_key
		.filter(|key| !key.trim().is_empty())
		.or_else(|| get_str("apiKey"))
		.ok_or(Error::MissingApiKey)?;

	let mut config = PluginConfig::new(api_key);

	if let Some(host) = env_api_host
		.filter(|host| !host.trim().is_empty())
		.or_else(|| get_str("apiHost"))
	{
		config.api_host = host;
	}
	if let Some(endpoint) = get_str("apiEndpoint") {
		config.api_endpoint = endpoint;
	}
	if let Some(timeout) = plugin
		.and_then(|v| v.get("requestTimeoutSeconds"))
		.and_then(Value::as_u64)
	{
		config.request_timeout_seconds = timeout;
	}
	if let Some(auto_identify) = plugin
		.and_then(|v| v.get("autoIdentify"))
		.and_then(Value::as_bool)
	{
		config.auto_identify = auto_identify;
	}

	Ok(config)
}
