// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::state::BotState;
use crate::discord::utils::options::{required_user_option, string_option};
use crate::discord::utils::responses::{INTERNAL_ERROR, respond_ephemeral, respond_text};
use crate::discord::utils::users::resolved_user_data;
use twilight_model::application::command::CommandOption;
use twilight_model::application::interaction::InteractionDataResolved;
use twilight_model::application::interaction::application_command::CommandDataOption;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_util::builder::command::{StringBuilder, SubCommandBuilder, UserBuilder};

pub fn subcommand_definition() -> CommandOption {
	let user_option = UserBuilder::new("user", "The member whose warnings to remove")
		.required(true)
		.build();
	let warning_id_option = StringBuilder::new("warning_id", "The warning to remove; leave out to remove all").build();
	SubCommandBuilder::new("clearwarn", "Remove a warning OR all warnings from a member")
		.option(user_option)
		.option(warning_id_option)
		.build()
}

pub async fn handle_subcommand(
	interaction: &InteractionCreate,
	options: &[CommandDataOption],
	resolved: Option<&InteractionDataResolved>,
	bot_state: &BotState,
) -> miette::Result<()> {
	let user_id = required_user_option(options, "user")?;
	let warning_id = string_option(options, "warning_id")?;
	let user = resolved_user_data(resolved, user_id);
	let http_client = &bot_state.http_client;

	let cleared = match bot_state.services.warnings.clear_warning(user_id, warning_id).await {
		Ok(cleared) => cleared,
		Err(error) => {
			respond_ephemeral(interaction, http_client, bot_state.application_id, INTERNAL_ERROR).await?;
			return Err(error.into());
		}
	};

	let message = clear_message(&user.display_name, warning_id, cleared);
	respond_text(interaction, http_client, bot_state.application_id, &message).await
}

fn clear_message(display_name: &str, warning_id: Option<&str>, cleared: bool) -> String {
	match (cleared, warning_id) {
		(true, Some(warning_id)) => format!(
			"Warning ID {} for {} has been cleared successfully.",
			warning_id, display_name
		),
		(true, None) => format!("All warnings for {} have been cleared successfully.", display_name),
		(false, Some(_)) => format!("No warnings found for {} with the provided warning ID.", display_name),
		(false, None) => format!("No warnings found for {}.", display_name),
	}
}
