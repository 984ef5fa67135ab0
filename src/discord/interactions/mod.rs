// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::state::BotState;
use super::utils::components::{CLOSE_TICKET_ID, OPEN_TICKET_ID};
use miette::bail;
use twilight_model::application::interaction::message_component::MessageComponentInteractionData;
use twilight_model::gateway::payload::incoming::InteractionCreate;

mod close_ticket;
mod open_ticket;

pub async fn route_interaction(
	interaction: &InteractionCreate,
	interaction_data: &MessageComponentInteractionData,
	bot_state: &BotState,
) -> miette::Result<()> {
	match interaction_data.custom_id.as_str() {
		OPEN_TICKET_ID => open_ticket::handle_open_ticket(interaction, bot_state).await,
		CLOSE_TICKET_ID => close_ticket::handle_close_ticket(interaction, bot_state).await,
		custom_id => bail!("Unknown component interaction: {}", custom_id),
	}
}
