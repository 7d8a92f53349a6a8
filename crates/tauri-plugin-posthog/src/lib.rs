// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! PostHog analytics plugin for Tauri applications.
//!
//! This plugin exposes the analytics boundary to the webview as a fixed set
//! of commands (capture, identify, alias, reset, feature-flag queries) and
//! forwards every request to the bundled PostHog SDK or the remote decide
//! endpoint. It is an adapter: there is no queueing, batching policy, retry,
//! or persistence here — delivery semantics belong to the SDK.
//!
//! # Features
//!
//! - **Capture**: single and batch event capture with identity fallback
//! - **Identity**: identify/alias/reset with a stable device identifier
//! - **Feature Flags**: queries forwarded to the service's decide endpoint
//! - **Configuration**: environment variables over `tauri.conf.json`
//!
//! # Example
//!
//! ```ignore
//! use tauri_plugin_posthog::{CaptureRequest, PostHogExt, Properties};
//!
//! tauri::Builder::default()
//!     .plugin(tauri_plugin_posthog::init())
//!     .setup(|app| {
//!         let handle = app.handle().clone();
//!         tauri::async_runtime::spawn(async move {
//!             let request = CaptureRequest::new("app_started")
//!                 .with_properties(Properties::new().insert("version", "1.2.0"));
//!             if let Err(e) = handle.posthog().capture(request).await {
//!                 eprintln!("analytics capture failed: {e}");
//!             }
//!         });
//!         Ok(())
//!     });
//! ```

use tauri::{
	plugin::{Builder, TauriPlugin},
	Manager, Runtime,
};

mod client;
mod commands;
mod config;
mod error;
mod flags;
mod sink;

pub use client::PostHogState;
pub use error::{Error, Result};

// Re-export the payload types for Rust-side callers
pub use posthog_core::{
	AliasRequest, BatchCaptureRequest, CaptureRequest, EventIdentity, FlagValue, FlagsRequest,
	IdentifyRequest, OutboundEvent, PluginConfig, Properties,
};

/// Extensions to [`tauri::App`], [`tauri::AppHandle`] and [`tauri::Window`]
/// to access the analytics APIs from Rust.
pub trait PostHogExt<R: Runtime> {
	fn posthog(&self) -> &PostHogState;
}

impl<R: Runtime, T: Manager<R>> PostHogExt<R> for T {
	fn posthog(&self) -> &PostHogState {
		self.state::<PostHogState>().inner()
	}
}

/// Initializes the plugin, resolving configuration from the environment and
/// `tauri.conf.json`.
pub fn init<R: Runtime>() -> TauriPlugin<R> {
	build(None)
}

/// Initializes the plugin with an explicit configuration, bypassing the
/// environment and `tauri.conf.json`.
pub fn init_with_config<R: Runtime>(config: PluginConfig) -> TauriPlugin<R> {
	build(Some(config))
}

fn build<R: Runtime>(config: Option<PluginConfig>) -> TauriPlugin<R> {
	Builder::new("posthog")
		.invoke_handler(tauri::generate_handler![
			commands::capture,
			commands::capture_batch,
			commands::identify,
			commands::alias,
			commands::reset,
			commands::get_distinct_id,
			commands::get_device_id,
			commands::get_config,
			commands::get_feature_flag,
			commands::is_feature_enabled,
		])
		.setup(move |app, _api| {
			let config = match config {
				Some(config) => config,
				None => config::resolve(app)?,
			};
			let state = PostHogState::new(config)?;
			app.manage(state);
			Ok(())
		})
		.build()
}
