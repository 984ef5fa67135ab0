// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::state::BotState;
use twilight_model::id::Id;
use twilight_model::id::marker::ChannelMarker;

mod channels;

pub async fn route_channel_delete(channel_id: Id<ChannelMarker>, bot_state: &BotState) -> miette::Result<()> {
	channels::handle_channel_delete(channel_id, &bot_state.services).await
}
