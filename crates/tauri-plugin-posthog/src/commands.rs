// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The boundary procedures exposed to the webview.
//!
//! Each command constructs nothing of its own: it hands the request payload
//! to the shared state and returns or rethrows the response.

use posthog_core::{
	AliasRequest, BatchCaptureRequest, CaptureRequest, FlagValue, FlagsRequest, IdentifyRequest,
	PluginConfig,
};
use tauri::{command, AppHandle, Runtime, State};

use crate::client::PostHogState;
use crate::config;
use crate::error::Result;

#[command]
pub async fn capture(request: CaptureRequest, state: State<'_, PostHogState>) -> Result<()> {
	state.capture(request).await
}

#[command]
pub async fn capture_batch(
	request: BatchCaptureRequest,
	state: State<'_, PostHogState>,
) -> Result<()> {
	state.capture_batch(request).await
}

#[command]
pub async fn identify(request: IdentifyRequest, state: State<'_, PostHogState>) -> Result<()> {
	state.identify(request).await
}

#[command]
pub async fn alias(request: AliasRequest, state: State<'_, PostHogState>) -> Result<()> {
	state.alias(request).await
}

#[command]
pub async fn reset(state: State<'_, PostHogState>) -> Result<()> {
	state.reset().await;
	Ok(())
}

#[command]
pub async fn get_distinct_id(state: State<'_, PostHogState>) -> Result<Option<String>> {
	Ok(state.distinct_id().await)
}

#[command]
pub async fn get_device_id(state: State<'_, PostHogState>) -> Result<String> {
	Ok(state.device_id().to_string())
}

#[command]
pub async fn get_config<R: Runtime>(app: AppHandle<R>) -> Result<PluginConfig> {
	config::resolve(&app)
}

#[command]
pub async fn get_feature_flag(
	request: FlagsRequest,
	state: State<'_, PostHogState>,
) -> Result<Option<FlagValue>> {
	state.feature_flag(request).await
}

#[command]
pub async fn is_feature_enabled(
	request: FlagsRequest,
	state: State<'_, PostHogState>,
) -> Result<bool> {
	state.is_feature_enabled(request).await
}
