// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::commands::{command_definitions, route_command};
use super::events::route_channel_delete;
use super::interactions::route_interaction;
use super::state::BotState;
use super::utils::components::open_ticket_button;
use super::utils::embeds::support_prompt;
use crate::config::ConfigData;
use crate::services::Services;
use miette::IntoDiagnostic;
use std::sync::Arc;
use twilight_gateway::{EventTypeFlags, Intents, Shard, ShardId, StreamExt};
use twilight_http::client::Client;
use twilight_model::application::interaction::InteractionData;
use twilight_model::gateway::event::Event;

pub fn set_up_client(config: &ConfigData) -> Arc<Client> {
	Arc::new(Client::new(config.discord.bot_token.clone()))
}

pub async fn run_bot(services: Arc<Services>, config: Arc<ConfigData>, http_client: Arc<Client>) -> miette::Result<()> {
	// Interactions arrive regardless of intents; GUILDS delivers channel deletions.
	let intents = Intents::GUILDS;

	let mut shard = Shard::new(ShardId::ONE, config.discord.bot_token.clone(), intents);

	let application_id = {
		let application_response = http_client.current_user_application().await.into_diagnostic()?;
		application_response.model().await.into_diagnostic()?.id
	};

	{
		let interaction_client = http_client.interaction(application_id);
		let commands = command_definitions();
		interaction_client
			.set_guild_commands(config.discord.guild, &commands)
			.await
			.into_diagnostic()?;
	}

	let bot_state = Arc::new(BotState {
		http_client,
		application_id,
		config,
		services,
	});

	while let Some(event) = shard.next_event(EventTypeFlags::all()).await {
		let event = match event {
			Ok(event) => event,
			Err(error) => {
				tracing::warn!(source = ?error, "error receiving event");
				continue;
			}
		};

		tokio::spawn(handle_event(event, Arc::clone(&bot_state)));
	}

	Ok(())
}

async fn handle_event(event: Event, bot_state: Arc<BotState>) {
	let event_result = handle_event_route(event, &bot_state).await;
	if let Err(error) = event_result {
		tracing::error!(source = ?error, "An error occurred handling a gateway event");
	}
}

async fn handle_event_route(event: Event, bot_state: &BotState) -> miette::Result<()> {
	tracing::debug!("Incoming gateway message: {:?}", event);
	match event {
		Event::InteractionCreate(interaction) => match &interaction.data {
			Some(InteractionData::ApplicationCommand(command_data)) => {
				route_command(&interaction, command_data, bot_state).await?;
			}
			Some(InteractionData::MessageComponent(interaction_data)) => {
				route_interaction(&interaction, interaction_data, bot_state).await?;
			}
			_ => (),
		},
		Event::ChannelDelete(channel) => route_channel_delete(channel.id, bot_state).await?,
		Event::Ready(_) => {
			tracing::info!("Discord gateway is ready");
			post_support_prompt(bot_state).await?;
		}
		_ => (),
	}
	Ok(())
}

/// Posts the message members use to open support tickets.
async fn post_support_prompt(bot_state: &BotState) -> miette::Result<()> {
	let embed = support_prompt().into_diagnostic()?;
	bot_state
		.http_client
		.create_message(bot_state.config.discord.support_channel)
		.embeds(&[embed])
		.components(&[open_ticket_button()])
		.await
		.into_diagnostic()?;
	Ok(())
}
