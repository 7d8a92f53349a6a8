// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Forwarder for feature-flag queries.
//!
//! Flag evaluation lives on the analytics service; this client posts the
//! query to the decide endpoint and returns the evaluated values unchanged.

use std::time::Duration;

use posthog_core::{DecideRequest, FlagsResponse, PluginConfig};
use tracing::debug;

use crate::error::{Error, Result};

/// HTTP forwarder for the decide endpoint.
pub struct FlagsClient {
	http: reqwest::Client,
	decide_url: String,
}

impl FlagsClient {
	/// Builds the forwarder from the plugin configuration.
	pub fn new(config: &PluginConfig) -> Result<Self> {
		let http = reqwest::Client::builder()
			.timeout(Duration::from_secs(config.request_timeout_seconds))
			.build()?;

		Ok(Self {
			http,
			decide_url: config.decide_endpoint(),
		})
	}

	/// Forwards a flag query and returns the service's evaluation.
	pub async fn decide(&self, request: DecideRequest) -> Result<FlagsResponse> {
		debug!(distinct_id = %request.distinct_id, "forwarding feature flag query");

		let response = self
			.http
			.post(&self.decide_url)
			.json(&request)
			.send()
			.await?;

		let status = response.status();
		if !status.is_success() {
			return Err(Error::FlagsStatus {
				status: status.as_u16(),
			});
		}

		Ok(response.json().await?)
	}
}
