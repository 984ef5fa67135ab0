// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::MAX_REASON_LENGTH;
use crate::discord::state::BotState;
use crate::discord::utils::options::{required_string_option, required_user_option};
use crate::discord::utils::responses::{respond_ephemeral, respond_text};
use crate::discord::utils::users::resolved_user_data;
use miette::bail;
use twilight_http::request::AuditLogReason;
use twilight_model::application::command::CommandOption;
use twilight_model::application::interaction::InteractionDataResolved;
use twilight_model::application::interaction::application_command::CommandDataOption;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_util::builder::command::{StringBuilder, SubCommandBuilder, UserBuilder};

pub fn subcommand_definition() -> CommandOption {
	let user_option = UserBuilder::new("user", "The user to unban").required(true).build();
	let reason_option = StringBuilder::new("reason", "Why the user is being unbanned")
		.required(true)
		.max_length(MAX_REASON_LENGTH)
		.build();
	SubCommandBuilder::new("unban", "Unban a member")
		.option(user_option)
		.option(reason_option)
		.build()
}

pub async fn handle_subcommand(
	interaction: &InteractionCreate,
	options: &[CommandDataOption],
	resolved: Option<&InteractionDataResolved>,
	bot_state: &BotState,
) -> miette::Result<()> {
	let Some(guild_id) = interaction.guild_id else {
		bail!("Unban command was used outside of a guild");
	};
	let user_id = required_user_option(options, "user")?;
	let reason = required_string_option(options, "reason")?;
	let user = resolved_user_data(resolved, user_id);
	let http_client = &bot_state.http_client;

	let unban_result = http_client.delete_ban(guild_id, user_id).reason(reason).await;
	if let Err(error) = unban_result {
		tracing::error!(source = ?error, user = %user_id, "Failed to unban user");
		let message = format!("{} couldn't be unbanned. Are they banned?", user.display_name);
		return respond_ephemeral(interaction, http_client, bot_state.application_id, &message).await;
	}
	tracing::info!(user = %user_id, moderator = ?interaction.author_id(), "Unbanned user");

	let message = format!(
		"{} has been unbanned successfully. Reason: {}",
		user.display_name, reason
	);
	respond_text(interaction, http_client, bot_state.application_id, &message).await
}
