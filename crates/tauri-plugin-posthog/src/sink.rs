// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Boundary to the bundled analytics SDK.
//!
//! [`EventSink`] is the seam the client wrapper forwards resolved events
//! through. The production implementation hands them to the PostHog SDK,
//! which owns delivery, batching, and transport.

use async_trait::async_trait;
use posthog_core::{EventIdentity, OutboundEvent, PluginConfig};

use crate::error::{Error, Result};

/// Sink for resolved analytics events.
#[async_trait]
pub trait EventSink: Send + Sync {
	/// Forwards a single event.
	async fn capture(&self, event: OutboundEvent) -> Result<()>;

	/// Forwards a batch of events in one call.
	async fn capture_batch(&self, events: Vec<OutboundEvent>) -> Result<()>;
}

/// Production sink backed by the bundled PostHog SDK.
pub struct PostHogSink {
	client: posthog_rs::Client,
}

impl PostHogSink {
	/// Builds the SDK client from the plugin configuration.
	pub async fn connect(config: &PluginConfig) -> Result<Self> {
		let options = posthog_rs::ClientOptionsBuilder::default()
			.api_key(config.api_key.clone())
			.api_endpoint(config.api_endpoint.clone())
			.request_timeout_seconds(config.request_timeout_seconds)
			.build()
			.map_err(|e| Error::ClientOptions(e.to_string()))?;

		Ok(Self {
			client: posthog_rs::client(options).await,
		})
	}

	fn to_sdk_event(event: OutboundEvent) -> Result<posthog_rs::Event> {
		let mut sdk_event = match &event.identity {
			EventIdentity::Identified(distinct_id) => {
				posthog_rs::Event::new(&event.name, distinct_id)
			}
			EventIdentity::Anonymous => posthog_rs::Event::new_anon(&event.name),
		};

		for (key, value) in event.properties.into_map() {
			sdk_event.insert_prop(key, value).map_err(Error::Client)?;
		}

		for (group_type, group_id) in event.groups {
			sdk_event.add_group(&group_type, &group_id);
		}

		if let Some(timestamp) = event.timestamp {
			sdk_event.set_timestamp(timestamp).map_err(Error::Client)?;
		}

		Ok(sdk_event)
	}
}

#[async_trait]
impl EventSink for PostHogSink {
	async fn capture(&self, event: OutboundEvent) -> Result<()> {
		let sdk_event = Self::to_sdk_event(event)?;
		self.client.capture(sdk_event).await.map_err(Error::Client)
	}

	async fn capture_batch(&self, events: Vec<OutboundEvent>) -> Result<()> {
		let sdk_events = events
			.into_iter()
			.map(Self::to_sdk_event)
			.collect::<Result<Vec<_>>>()?;
		self.client
			.capture_batch(sdk_events)
			.await
			.map_err(Error::Client)
	}
}
