// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::platform::{create_private_channel, private_channel_overwrites, ticket_channel_name};
use crate::discord::state::BotState;
use crate::discord::utils::components::close_ticket_button;
use crate::discord::utils::embeds::summon_notice;
use crate::discord::utils::options::required_user_option;
use crate::discord::utils::responses::{Visibility, defer, update_response_text};
use crate::discord::utils::users::resolved_user_data;
use miette::{IntoDiagnostic, bail};
use twilight_mention::Mention;
use twilight_model::application::command::CommandOption;
use twilight_model::application::interaction::InteractionDataResolved;
use twilight_model::application::interaction::application_command::CommandDataOption;
use twilight_model::channel::message::AllowedMentions;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_util::builder::command::{SubCommandBuilder, UserBuilder};

pub fn subcommand_definition() -> CommandOption {
	let user_option = UserBuilder::new("user", "The member to summon").required(true).build();
	SubCommandBuilder::new("ticket", "Summon a member to a private moderation channel")
		.option(user_option)
		.build()
}

/// Moderation tickets are opened by staff on a member's behalf and aren't tracked with support tickets, so a member
/// can have any number of them.
pub async fn handle_subcommand(
	interaction: &InteractionCreate,
	options: &[CommandDataOption],
	resolved: Option<&InteractionDataResolved>,
	bot_state: &BotState,
) -> miette::Result<()> {
	let Some(guild_id) = interaction.guild_id else {
		bail!("Ticket command was used outside of a guild");
	};
	let Some(staff_id) = interaction.author_id() else {
		bail!("Ticket command wasn't sent by a user");
	};
	let user_id = required_user_option(options, "user")?;
	let user = resolved_user_data(resolved, user_id);
	let http_client = &bot_state.http_client;

	// The confirmation is posted where the command was used, for the rest of staff to see.
	defer(interaction, http_client, bot_state.application_id, Visibility::Public).await?;

	let overwrites = private_channel_overwrites(guild_id, user_id, &bot_state.config.discord.staff_roles);
	let channel_id = match create_private_channel(
		http_client,
		guild_id,
		&ticket_channel_name(&user.username),
		None,
		&overwrites,
	)
	.await
	{
		Ok(channel_id) => channel_id,
		Err(error) => {
			update_response_text(
				interaction,
				http_client,
				bot_state.application_id,
				"The moderation ticket couldn't be created.",
			)
			.await?;
			return Err(error.into());
		}
	};
	tracing::info!(channel = %channel_id, user = %user_id, staff = %staff_id, "Created moderation ticket");

	let embed = summon_notice().into_diagnostic()?;
	let allowed_mentions = AllowedMentions {
		users: vec![user_id],
		..Default::default()
	};
	http_client
		.create_message(channel_id)
		.content(&format!("{} has summoned {}.", staff_id.mention(), user_id.mention()))
		.embeds(&[embed])
		.components(&[close_ticket_button()])
		.allowed_mentions(Some(&allowed_mentions))
		.await
		.into_diagnostic()?;

	let message = format!(
		"Moderation ticket created successfully. Refer to: {}",
		channel_id.mention()
	);
	update_response_text(interaction, http_client, bot_state.application_id, &message).await
}
