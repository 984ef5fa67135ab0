// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::platform::delete_channel;
use crate::discord::state::BotState;
use crate::discord::utils::embeds::closing_notice;
use crate::discord::utils::permissions::require_staff_interaction;
use crate::discord::utils::responses::{ONLY_STAFF_CAN_CLOSE, respond, respond_ephemeral};
use crate::tickets::TicketKey;
use miette::{IntoDiagnostic, bail};
use tokio::time::{Duration, sleep};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_util::builder::InteractionResponseDataBuilder;

/// How long the closing notice stays up before the channel goes away
const CLOSE_DELAY: Duration = Duration::from_secs(5);

pub async fn handle_close_ticket(interaction: &InteractionCreate, bot_state: &BotState) -> miette::Result<()> {
	let http_client = &bot_state.http_client;
	let application_id = bot_state.application_id;

	if require_staff_interaction(interaction, &bot_state.config.discord.staff_roles).is_err() {
		return respond_ephemeral(interaction, http_client, application_id, ONLY_STAFF_CAN_CLOSE).await;
	}
	let Some(channel) = interaction.channel.as_ref() else {
		bail!("Close ticket button interaction had no channel");
	};
	let channel_id = channel.id;

	let embed = closing_notice().into_diagnostic()?;
	let data = InteractionResponseDataBuilder::new().embeds([embed]).build();
	respond(interaction, http_client, application_id, data).await?;

	sleep(CLOSE_DELAY).await;
	delete_channel(http_client, channel_id).await?;
	tracing::info!(channel = %channel_id, staff = ?interaction.author_id(), "Closed ticket");

	// The channel is already gone, so a failure here leaves a stale entry rather than failing the close.
	if let Err(error) = bot_state.services.tickets.close_ticket(TicketKey::Channel(channel_id)).await {
		tracing::warn!(
			source = ?error,
			channel = %channel_id,
			"Ticket channel was deleted but its entry couldn't be removed; it needs manual reconciliation"
		);
	}
	Ok(())
}
