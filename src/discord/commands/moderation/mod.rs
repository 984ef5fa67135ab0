// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::state::BotState;
use crate::discord::utils::permissions::require_staff_interaction;
use crate::discord::utils::responses::{NOT_STAFF, respond_ephemeral};
use miette::bail;
use twilight_model::application::command::{Command, CommandType};
use twilight_model::application::interaction::InteractionContextType;
use twilight_model::application::interaction::application_command::{CommandData, CommandOptionValue};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_util::builder::command::CommandBuilder;

mod ban;
mod clearwarn;
mod info;
mod ticket;
mod unban;
mod warn;

/// Longest reason accepted, so notices quoting it stay within embed title limits
const MAX_REASON_LENGTH: u16 = 180;

pub fn command_definition() -> Command {
	CommandBuilder::new("moderation", "Moderation commands.", CommandType::ChatInput)
		.contexts([InteractionContextType::Guild])
		.option(ban::subcommand_definition())
		.option(unban::subcommand_definition())
		.option(warn::subcommand_definition())
		.option(clearwarn::subcommand_definition())
		.option(info::subcommand_definition())
		.option(ticket::subcommand_definition())
		.build()
}

pub async fn handle_command(
	interaction: &InteractionCreate,
	command_data: &CommandData,
	bot_state: &BotState,
) -> miette::Result<()> {
	if require_staff_interaction(interaction, &bot_state.config.discord.staff_roles).is_err() {
		return respond_ephemeral(
			interaction,
			&bot_state.http_client,
			bot_state.application_id,
			NOT_STAFF,
		)
		.await;
	}

	let Some(subcommand_data) = command_data.options.first() else {
		bail!("Moderation command invoked with no subcommand");
	};
	let CommandOptionValue::SubCommand(options) = &subcommand_data.value else {
		bail!("Moderation command invoked with a non-subcommand option: {:?}", subcommand_data);
	};
	let resolved = command_data.resolved.as_ref();

	match subcommand_data.name.as_str() {
		"ban" => ban::handle_subcommand(interaction, options, resolved, bot_state).await,
		"unban" => unban::handle_subcommand(interaction, options, resolved, bot_state).await,
		"warn" => warn::handle_subcommand(interaction, options, resolved, bot_state).await,
		"clearwarn" => clearwarn::handle_subcommand(interaction, options, resolved, bot_state).await,
		"info" => info::handle_subcommand(interaction, options, resolved, bot_state).await,
		"ticket" => ticket::handle_subcommand(interaction, options, resolved, bot_state).await,
		_ => bail!("Unknown moderation subcommand: {}", subcommand_data.name),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use twilight_model::application::command::CommandOptionType;

	#[test]
	fn every_subcommand_is_registered() {
		let definition = command_definition();
		let names: Vec<&str> = definition.options.iter().map(|option| option.name.as_str()).collect();
		assert_eq!(names, ["ban", "unban", "warn", "clearwarn", "info", "ticket"]);
		assert!(
			definition
				.options
				.iter()
				.all(|option| option.kind == CommandOptionType::SubCommand)
		);
	}
}
