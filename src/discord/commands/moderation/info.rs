// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::state::BotState;
use crate::discord::utils::embeds::{MemberInfo, member_info};
use crate::discord::utils::options::required_user_option;
use crate::discord::utils::responses::{INTERNAL_ERROR, respond, respond_ephemeral};
use crate::discord::utils::timestamp::{epoch_secs_from_id, epoch_secs_from_timestamp};
use crate::discord::utils::users::resolved_user_data;
use miette::IntoDiagnostic;
use twilight_model::application::command::CommandOption;
use twilight_model::application::interaction::InteractionDataResolved;
use twilight_model::application::interaction::application_command::CommandDataOption;
use twilight_model::channel::message::AllowedMentions;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_util::builder::InteractionResponseDataBuilder;
use twilight_util::builder::command::{SubCommandBuilder, UserBuilder};

pub fn subcommand_definition() -> CommandOption {
	let user_option = UserBuilder::new("user", "The member to look up").required(true).build();
	SubCommandBuilder::new("info", "Show information about a member")
		.option(user_option)
		.build()
}

pub async fn handle_subcommand(
	interaction: &InteractionCreate,
	options: &[CommandDataOption],
	resolved: Option<&InteractionDataResolved>,
	bot_state: &BotState,
) -> miette::Result<()> {
	let user_id = required_user_option(options, "user")?;
	let user = resolved_user_data(resolved, user_id);
	let http_client = &bot_state.http_client;

	let warnings = match bot_state.services.warnings.get_warnings(user_id).await {
		Ok(warnings) => warnings,
		Err(error) => {
			respond_ephemeral(interaction, http_client, bot_state.application_id, INTERNAL_ERROR).await?;
			return Err(error.into());
		}
	};

	let roles = user.roles.as_deref().unwrap_or_default();
	let info = MemberInfo {
		user_id,
		username: &user.username,
		roles,
		warnings: &warnings,
		created_at: epoch_secs_from_id(user_id),
		joined_at: user.joined_at.as_ref().map(epoch_secs_from_timestamp),
	};
	let embed = member_info(&info).into_diagnostic()?;

	let data = InteractionResponseDataBuilder::new()
		.embeds([embed])
		.allowed_mentions(AllowedMentions::default())
		.build();
	respond(interaction, http_client, bot_state.application_id, data).await
}
