// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

const COMMANDS: &[&str] = &[
	"capture",
	"capture_batch",
	"identify",
	"alias",
	"reset",
	"get_distinct_id",
	"get_device_id",
	"get_config",
	"get_feature_flag",
	"is_feature_enabled",
];

fn main() {
	tauri_plugin::Builder::new(COMMANDS).build();
}
