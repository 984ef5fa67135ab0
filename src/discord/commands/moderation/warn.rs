// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::MAX_REASON_LENGTH;
use crate::discord::state::BotState;
use crate::discord::utils::embeds::warning_notice;
use crate::discord::utils::notifications::{Notified, notify_user};
use crate::discord::utils::options::{required_string_option, required_user_option};
use crate::discord::utils::responses::{INTERNAL_ERROR, respond_ephemeral, respond_text};
use crate::discord::utils::users::resolved_user_data;
use miette::bail;
use twilight_model::application::command::CommandOption;
use twilight_model::application::interaction::InteractionDataResolved;
use twilight_model::application::interaction::application_command::CommandDataOption;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_util::builder::command::{StringBuilder, SubCommandBuilder, UserBuilder};

pub fn subcommand_definition() -> CommandOption {
	let user_option = UserBuilder::new("user", "The member to warn").required(true).build();
	let reason_option = StringBuilder::new("reason", "Why the member is being warned")
		.required(true)
		.max_length(MAX_REASON_LENGTH)
		.build();
	SubCommandBuilder::new("warn", "Warn a member")
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
	let Some(moderator_id) = interaction.author_id() else {
		bail!("Warn command wasn't sent by a user");
	};
	let user_id = required_user_option(options, "user")?;
	let reason = required_string_option(options, "reason")?;
	let user = resolved_user_data(resolved, user_id);
	let http_client = &bot_state.http_client;

	let warning = match bot_state
		.services
		.warnings
		.add_warning(user_id, reason, moderator_id)
		.await
	{
		Ok(warning) => warning,
		Err(error) => {
			respond_ephemeral(interaction, http_client, bot_state.application_id, INTERNAL_ERROR).await?;
			return Err(error.into());
		}
	};

	let notified = match warning_notice(&bot_state.config.moderation.server_name, reason) {
		Ok(embed) => notify_user(http_client, user_id, embed).await,
		Err(error) => {
			tracing::warn!(source = ?error, "Warning notice couldn't be built");
			Notified::No
		}
	};

	let message = format!(
		"{} has been warned successfully{}. Reason: {} (ID `{}`)",
		user.display_name,
		notified.confirmation_note(),
		reason,
		warning.warning_id
	);
	respond_text(interaction, http_client, bot_state.application_id, &message).await
}
