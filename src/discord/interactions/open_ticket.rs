// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::platform::SupportTicketChannels;
use crate::discord::state::BotState;
use crate::discord::utils::components::close_ticket_button;
use crate::discord::utils::embeds::support_welcome;
use crate::discord::utils::responses::{defer_ephemeral, update_response_text};
use crate::tickets::TicketOutcome;
use miette::{IntoDiagnostic, bail};
use twilight_mention::Mention;
use twilight_model::channel::message::AllowedMentions;
use twilight_model::gateway::payload::incoming::InteractionCreate;

pub async fn handle_open_ticket(interaction: &InteractionCreate, bot_state: &BotState) -> miette::Result<()> {
	let Some(guild_id) = interaction.guild_id else {
		bail!("Ticket button was used outside of a guild");
	};
	let Some(user) = interaction.member.as_ref().and_then(|member| member.user.as_ref()) else {
		bail!("Ticket button interaction had no member user");
	};
	let http_client = &bot_state.http_client;
	let application_id = bot_state.application_id;

	// Checking for and creating the channel can take longer than the initial response window.
	defer_ephemeral(interaction, http_client, application_id).await?;

	let channels = SupportTicketChannels {
		http_client,
		guild_id,
		owner_id: user.id,
		owner_username: &user.name,
		category: bot_state.config.discord.ticket_category,
		staff_roles: &bot_state.config.discord.staff_roles,
	};
	let outcome = match bot_state.services.tickets.open_ticket(user.id, &channels).await {
		Ok(outcome) => outcome,
		Err(error) => {
			update_response_text(
				interaction,
				http_client,
				application_id,
				"Your ticket couldn't be created. Please try again later.",
			)
			.await?;
			return Err(error.into());
		}
	};

	match outcome {
		TicketOutcome::AlreadyOpen(channel_id) => {
			let message = format!("You already have a ticket open! Refer to: {}", channel_id.mention());
			update_response_text(interaction, http_client, application_id, &message).await
		}
		TicketOutcome::Created(channel_id) => {
			let message = format!(
				"Your Help & Support ticket has been created. Refer to: {}!",
				channel_id.mention()
			);
			update_response_text(interaction, http_client, application_id, &message).await?;

			let embed = support_welcome().into_diagnostic()?;
			let allowed_mentions = AllowedMentions {
				users: vec![user.id],
				..Default::default()
			};
			http_client
				.create_message(channel_id)
				.content(&format!("Welcome {}!", user.id.mention()))
				.embeds(&[embed])
				.components(&[close_ticket_button()])
				.allowed_mentions(Some(&allowed_mentions))
				.await
				.into_diagnostic()?;
			Ok(())
		}
	}
}
