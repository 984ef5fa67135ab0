// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::ConfigData;
use crate::services::Services;
use std::sync::Arc;
use twilight_http::client::Client;
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;

/// Everything a handler needs, shared across all event tasks.
pub struct BotState {
	pub http_client: Arc<Client>,
	pub application_id: Id<ApplicationMarker>,
	pub config: Arc<ConfigData>,
	pub services: Arc<Services>,
}
