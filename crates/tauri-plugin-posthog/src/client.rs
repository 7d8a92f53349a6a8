// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared plugin state and request forwarding.
//!
//! [`PostHogState`] holds the resolved configuration, the stable device
//! identifier, and the current distinct identifier. Every operation is a
//! single round-trip: validate the payload, resolve identity, forward to
//! the SDK sink or the flags endpoint, and return or rethrow the response.

use std::sync::Arc;

use posthog_core::{
	AliasRequest, BatchCaptureRequest, CaptureRequest, DecideRequest, EventIdentity, FlagValue,
	FlagsRequest, IdentifyRequest, OutboundEvent, PluginConfig, Properties,
};
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::flags::FlagsClient;
use crate::sink::{EventSink, PostHogSink};

/// Shared analytics state managed by the plugin.
pub struct PostHogState {
	config: PluginConfig,
	device_id: String,
	distinct_id: RwLock<Option<String>>,
	sink: OnceCell<Arc<dyn EventSink>>,
	flags: FlagsClient,
}

impl PostHogState {
	/// Creates the plugin state from a resolved configuration.
	///
	/// The device identifier is read from the machine UID so it is stable
	/// across restarts. The SDK client itself is built lazily on first use.
	pub fn new(config: PluginConfig) -> Result<Self> {
		config.validate()?;

		let device_id = machine_uid::get().map_err(|e| Error::DeviceId(e.to_string()))?;
		let distinct_id = config
			.auto_identify
			.then(|| format!("$device:{device_id}"));
		let flags = FlagsClient::new(&config)?;

		info!(auto_identify = config.auto_identify, "analytics state initialized");

		Ok(Self {
			config,
			device_id,
			distinct_id: RwLock::new(distinct_id),
			sink: OnceCell::new(),
			flags,
		})
	}

	#[cfg(test)]
	fn with_sink(config: PluginConfig, device_id: &str, sink: Arc<dyn EventSink>) -> Self {
		let distinct_id = config
			.auto_identify
			.then(|| format!("$device:{device_id}"));
		let flags = FlagsClient::new(&config).expect("flags client");

		Self {
			config,
			device_id: device_id.to_string(),
			distinct_id: RwLock::new(distinct_id),
			sink: OnceCell::new_with(Some(sink)),
			flags,
		}
	}

	/// Returns the SDK sink, building it on first use.
	///
	/// Concurrent first calls coalesce into a single setup; a failed setup
	/// is retried on the next call.
	async fn sink(&self) -> Result<&Arc<dyn EventSink>> {
		self.sink
			.get_or_try_init(|| async {
				debug!("initializing analytics SDK client");
				let sink = PostHogSink::connect(&self.config).await?;
				Ok::<_, Error>(Arc::new(sink) as Arc<dyn EventSink>)
			})
			.await
	}

	/// Forwards a capture request to the SDK.
	pub async fn capture(&self, request: CaptureRequest) -> Result<()> {
		request.validate()?;
		let event = self.resolve(request).await;
		debug!(event = %event.name, "capturing analytics event");
		self.sink().await?.capture(event).await
	}

	/// Forwards a batch of capture requests as one SDK call.
	///
	/// An empty batch is a no-op success.
	pub async fn capture_batch(&self, request: BatchCaptureRequest) -> Result<()> {
		request.validate()?;
		if request.is_empty() {
			return Ok(());
		}

		let mut events = Vec::with_capacity(request.events.len());
		for event in request.events {
			events.push(self.resolve(event).await);
		}

		debug!(count = events.len(), "capturing analytics event batch");
		self.sink().await?.capture_batch(events).await
	}

	/// Stores the distinct identifier and forwards a `$identify` event when
	/// properties are supplied.
	pub async fn identify(&self, request: IdentifyRequest) -> Result<()> {
		request.validate()?;
		debug!(distinct_id = %request.distinct_id, "identifying user");
		*self.distinct_id.write().await = Some(request.distinct_id.clone());

		if let Some(properties) = request.properties {
			let capture = CaptureRequest::new("$identify")
				.with_distinct_id(request.distinct_id)
				.with_properties(properties);
			self.capture(capture).await?;
		}

		Ok(())
	}

	/// Links an alias to the current identity via a `$create_alias` event.
	///
	/// Fails with a descriptive error when no distinct identifier is
	/// available.
	pub async fn alias(&self, request: AliasRequest) -> Result<()> {
		request.validate()?;

		let distinct_id = match request.distinct_id {
			Some(id) => {
				*self.distinct_id.write().await = Some(id.clone());
				id
			}
			None => self
				.distinct_id
				.read()
				.await
				.clone()
				.ok_or(Error::AliasWithoutIdentity)?,
		};

		debug!(%distinct_id, alias = %request.alias, "creating alias");
		let capture = CaptureRequest::new("$create_alias")
			.with_distinct_id(distinct_id)
			.with_properties(Properties::new().insert("alias", request.alias));
		self.capture(capture).await
	}

	/// Clears the stored identity.
	///
	/// When auto-identify is enabled the device-derived identifier is
	/// restored instead of leaving the session unattributed.
	pub async fn reset(&self) {
		debug!("resetting analytics identity");
		*self.distinct_id.write().await = self
			.config
			.auto_identify
			.then(|| format!("$device:{}", self.device_id));
	}

	/// Returns the stored distinct identifier, if any.
	pub async fn distinct_id(&self) -> Option<String> {
		self.distinct_id.read().await.clone()
	}

	/// Returns the stable machine-derived device identifier.
	pub fn device_id(&self) -> &str {
		&self.device_id
	}

	/// Returns the resolved plugin configuration.
	pub fn config(&self) -> &PluginConfig {
		&self.config
	}

	/// Forwards a feature-flag query and returns the evaluated value.
	pub async fn feature_flag(&self, request: FlagsRequest) -> Result<Option<FlagValue>> {
		request.validate()?;

		let distinct_id = match request.distinct_id.clone() {
			Some(id) => id,
			None => self.effective_distinct_id().await,
		};

		let key = request.key.clone();
		let decide = DecideRequest::new(self.config.api_key.clone(), distinct_id, request);
		let response = self.flags.decide(decide).await?;
		Ok(response.flag(&key).cloned())
	}

	/// Returns true if the flag evaluates as enabled for this identity.
	///
	/// Unknown flags evaluate as disabled.
	pub async fn is_feature_enabled(&self, request: FlagsRequest) -> Result<bool> {
		Ok(self
			.feature_flag(request)
			.await?
			.map(|value| value.is_enabled())
			.unwrap_or(false))
	}

	/// The identity events fall back to: stored distinct identifier, then
	/// the device identifier.
	async fn effective_distinct_id(&self) -> String {
		self.distinct_id
			.read()
			.await
			.clone()
			.unwrap_or_else(|| self.device_id.clone())
	}

	async fn resolve(&self, request: CaptureRequest) -> OutboundEvent {
		let identity = if request.anonymous {
			EventIdentity::Anonymous
		} else {
			let distinct_id = match request.distinct_id.clone() {
				Some(id) => id,
				None => self.effective_distinct_id().await,
			};
			EventIdentity::Identified(distinct_id)
		};

		OutboundEvent::from_request(request, identity, &self.device_id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use tokio::sync::Mutex;
	use wiremock::matchers::{body_partial_json, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	#[derive(Default)]
	struct MockSink {
		captured: Mutex<Vec<OutboundEvent>>,
		batches: AtomicUsize,
	}

	impl MockSink {
		async fn events(&self) -> Vec<OutboundEvent> {
			self.captured.lock().await.clone()
		}
	}

	#[async_trait::async_trait]
	impl EventSink for MockSink {
		async fn capture(&self, event: OutboundEvent) -> Result<()> {
			self.captured.lock().await.push(event);
			Ok(())
		}

		async fn capture_batch(&self, events: Vec<OutboundEvent>) -> Result<()> {
			self.batches.fetch_add(1, Ordering::SeqCst);
			self.captured.lock().await.extend(events);
			Ok(())
		}
	}

	fn test_config(auto_identify: bool) -> PluginConfig {
		let mut config = PluginConfig::new("phc_test");
		config.auto_identify = auto_identify;
		config
	}

	fn test_state(auto_identify: bool) -> (PostHogState, Arc<MockSink>) {
		let sink = Arc::new(MockSink::default());
		let state = PostHogState::with_sink(
			test_config(auto_identify),
			"machine-abc",
			sink.clone(),
		);
		(state, sink)
	}

	#[tokio::test]
	async fn capture_uses_explicit_distinct_id() {
		let (state, sink) = test_state(true);

		state
			.capture(CaptureRequest::new("signup").with_distinct_id("user_1"))
			.await
			.unwrap();

		let events = sink.events().await;
		assert_eq!(events[0].identity.distinct_id(), Some("user_1"));
	}

	#[tokio::test]
	async fn capture_falls_back_to_stored_identity() {
		let (state, sink) = test_state(false);
		state.identify(IdentifyRequest::new("user_2")).await.unwrap();

		state.capture(CaptureRequest::new("signup")).await.unwrap();

		let events = sink.events().await;
		assert_eq!(events[0].identity.distinct_id(), Some("user_2"));
	}

	#[tokio::test]
	async fn capture_falls_back_to_device_id_last() {
		let (state, sink) = test_state(false);

		state.capture(CaptureRequest::new("signup")).await.unwrap();

		let events = sink.events().await;
		assert_eq!(events[0].identity.distinct_id(), Some("machine-abc"));
	}

	#[tokio::test]
	async fn auto_identify_seeds_device_identity() {
		let (state, sink) = test_state(true);

		assert_eq!(
			state.distinct_id().await,
			Some("$device:machine-abc".to_string())
		);

		state.capture(CaptureRequest::new("signup")).await.unwrap();
		let events = sink.events().await;
		assert_eq!(
			events[0].identity.distinct_id(),
			Some("$device:machine-abc")
		);
	}

	#[tokio::test]
	async fn anonymous_capture_ignores_identity() {
		let (state, sink) = test_state(true);
		state.identify(IdentifyRequest::new("user_1")).await.unwrap();

		state
			.capture(CaptureRequest::anonymous("page_viewed"))
			.await
			.unwrap();

		let events = sink.events().await;
		assert_eq!(events[0].identity, EventIdentity::Anonymous);
	}

	#[tokio::test]
	async fn capture_stamps_device_id_property() {
		let (state, sink) = test_state(true);

		state.capture(CaptureRequest::new("signup")).await.unwrap();

		let events = sink.events().await;
		assert_eq!(
			events[0].properties.get("$device_id"),
			Some(&json!("machine-abc"))
		);
	}

	#[tokio::test]
	async fn capture_preserves_timestamp() {
		let (state, sink) = test_state(true);
		let ts: chrono::DateTime<chrono::Utc> = "2024-01-15T10:30:00Z".parse().unwrap();

		state
			.capture(CaptureRequest::new("imported").with_timestamp(ts))
			.await
			.unwrap();

		let events = sink.events().await;
		assert_eq!(events[0].timestamp, Some(ts));
	}

	#[tokio::test]
	async fn capture_rejects_invalid_payload_before_the_sink() {
		let (state, sink) = test_state(true);

		let result = state.capture(CaptureRequest::new("")).await;

		assert!(matches!(result, Err(Error::Validation(_))));
		assert!(sink.events().await.is_empty());
	}

	#[tokio::test]
	async fn identify_stores_distinct_id_without_capture() {
		let (state, sink) = test_state(false);

		state.identify(IdentifyRequest::new("user_1")).await.unwrap();

		assert_eq!(state.distinct_id().await, Some("user_1".to_string()));
		assert!(sink.events().await.is_empty());
	}

	#[tokio::test]
	async fn identify_with_properties_sends_identify_event() {
		let (state, sink) = test_state(false);

		state
			.identify(
				IdentifyRequest::new("user_1")
					.with_properties(Properties::new().insert("plan", "pro")),
			)
			.await
			.unwrap();

		let events = sink.events().await;
		assert_eq!(events.len(), 1);
		assert_eq!(events[0].name, "$identify");
		assert_eq!(events[0].identity.distinct_id(), Some("user_1"));
		assert_eq!(events[0].properties.get("plan"), Some(&json!("pro")));
	}

	#[tokio::test]
	async fn alias_without_identity_fails() {
		let (state, sink) = test_state(false);

		let result = state.alias(AliasRequest::new("new-handle")).await;

		assert!(matches!(result, Err(Error::AliasWithoutIdentity)));
		assert!(sink.events().await.is_empty());
	}

	#[tokio::test]
	async fn alias_uses_stored_identity() {
		let (state, sink) = test_state(false);
		state.identify(IdentifyRequest::new("user_1")).await.unwrap();

		state.alias(AliasRequest::new("new-handle")).await.unwrap();

		let events = sink.events().await;
		assert_eq!(events[0].name, "$create_alias");
		assert_eq!(events[0].identity.distinct_id(), Some("user_1"));
		assert_eq!(events[0].properties.get("alias"), Some(&json!("new-handle")));
	}

	#[tokio::test]
	async fn alias_with_explicit_distinct_id_stores_it() {
		let (state, sink) = test_state(false);

		state
			.alias(AliasRequest::new("new-handle").with_distinct_id("user_9"))
			.await
			.unwrap();

		assert_eq!(state.distinct_id().await, Some("user_9".to_string()));
		let events = sink.events().await;
		assert_eq!(events[0].identity.distinct_id(), Some("user_9"));
	}

	#[tokio::test]
	async fn reset_restores_device_identity_when_auto_identify() {
		let (state, _sink) = test_state(true);
		state.identify(IdentifyRequest::new("user_1")).await.unwrap();

		state.reset().await;

		assert_eq!(
			state.distinct_id().await,
			Some("$device:machine-abc".to_string())
		);
	}

	#[tokio::test]
	async fn reset_clears_identity_when_auto_identify_disabled() {
		let (state, _sink) = test_state(false);
		state.identify(IdentifyRequest::new("user_1")).await.unwrap();

		state.reset().await;

		assert_eq!(state.distinct_id().await, None);
	}

	#[tokio::test]
	async fn empty_batch_never_reaches_the_sink() {
		let (state, sink) = test_state(true);

		state
			.capture_batch(BatchCaptureRequest::new(vec![]))
			.await
			.unwrap();

		assert_eq!(sink.batches.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn batch_resolves_each_event() {
		let (state, sink) = test_state(false);
		state.identify(IdentifyRequest::new("user_1")).await.unwrap();

		state
			.capture_batch(BatchCaptureRequest::new(vec![
				CaptureRequest::new("first"),
				CaptureRequest::new("second").with_distinct_id("user_2"),
			]))
			.await
			.unwrap();

		assert_eq!(sink.batches.load(Ordering::SeqCst), 1);
		let events = sink.events().await;
		assert_eq!(events[0].identity.distinct_id(), Some("user_1"));
		assert_eq!(events[1].identity.distinct_id(), Some("user_2"));
	}

	#[tokio::test]
	async fn feature_flag_uses_stored_identity() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/decide/"))
			.and(body_partial_json(json!({"distinct_id": "user_1"})))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"featureFlags": {"checkout.new_flow": "variant-a"},
			})))
			.mount(&server)
			.await;

		let mut config = test_config(false);
		config.api_host = server.uri();
		let state = PostHogState::with_sink(config, "machine-abc", Arc::new(MockSink::default()));
		state.identify(IdentifyRequest::new("user_1")).await.unwrap();

		let value = state
			.feature_flag(FlagsRequest::new("checkout.new_flow"))
			.await
			.unwrap();
		assert_eq!(value, Some(FlagValue::Variant("variant-a".to_string())));

		let enabled = state
			.is_feature_enabled(FlagsRequest::new("checkout.new_flow"))
			.await
			.unwrap();
		assert!(enabled);
	}

	#[tokio::test]
	async fn unknown_flag_is_disabled() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.and(path("/decide/"))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
			.mount(&server)
			.await;

		let mut config = test_config(false);
		config.api_host = server.uri();
		let state = PostHogState::with_sink(config, "machine-abc", Arc::new(MockSink::default()));

		let enabled = state
			.is_feature_enabled(FlagsRequest::new("missing.flag"))
			.await
			.unwrap();
		assert!(!enabled);
	}
}
