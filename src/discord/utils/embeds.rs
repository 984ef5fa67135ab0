// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::timestamp::DiscordTimestamp;
use crate::model::Warning;
use twilight_mention::fmt::Mention;
use twilight_model::channel::message::embed::Embed;
use twilight_model::id::Id;
use twilight_model::id::marker::{RoleMarker, UserMarker};
use twilight_util::builder::embed::{EmbedBuilder, EmbedFieldBuilder};
use twilight_validate::embed::{EmbedValidationError, FIELD_VALUE_LENGTH};

pub const EMBED_COLOR: u32 = 0x2B2D31;

/// The notice sent to a user when they're banned
pub fn ban_notice(
	server_name: &str,
	reason: &str,
	appeal_link: Option<&str>,
) -> Result<Embed, EmbedValidationError> {
	let appeal = match appeal_link {
		Some(link) => format!("If you think we made a mistake, please appeal using [this link]({}).", link),
		None => String::from("If you think we made a mistake, please contact the server staff."),
	};
	let description = format!(
		"This is a message to inform you that you have been banned from the server. {}",
		appeal
	);
	Ok(EmbedBuilder::new()
		.title(format!("You have been banned from {}. | Reason: {}", server_name, reason))
		.description(description)
		.color(EMBED_COLOR)
		.validate()?
		.build())
}

/// The notice sent to a user when they're warned
pub fn warning_notice(server_name: &str, reason: &str) -> Result<Embed, EmbedValidationError> {
	Ok(EmbedBuilder::new()
		.title(format!("You have been warned in {}. | Reason: {}", server_name, reason))
		.description("This is a message to inform you that you have been warned. No further actions needed. If you think we made a mistake, appeal by opening a Help & Support ticket in the server.")
		.color(EMBED_COLOR)
		.validate()?
		.build())
}

/// The message posted in the support channel with the button to open a ticket
pub fn support_prompt() -> Result<Embed, EmbedValidationError> {
	Ok(EmbedBuilder::new()
		.title("Help & Support")
		.description("After reading the instructions above, you can create a ticket by clicking the button below!")
		.color(EMBED_COLOR)
		.validate()?
		.build())
}

/// The first message in a newly opened support ticket
pub fn support_welcome() -> Result<Embed, EmbedValidationError> {
	Ok(EmbedBuilder::new()
		.title("Welcome to Help & Support")
		.description("Staff will be with you shortly. Please describe the issue in the meanwhile.")
		.color(EMBED_COLOR)
		.validate()?
		.build())
}

/// The first message in a channel staff opened to talk with a member
pub fn summon_notice() -> Result<Embed, EmbedValidationError> {
	Ok(EmbedBuilder::new()
		.title("You have been called here by staff.")
		.description("This could be due to a various number of reasons. Please wait for further assistance.")
		.color(EMBED_COLOR)
		.validate()?
		.build())
}

pub fn closing_notice() -> Result<Embed, EmbedValidationError> {
	Ok(EmbedBuilder::new()
		.title("Ticket will be deleted in 5 seconds.")
		.color(EMBED_COLOR)
		.validate()?
		.build())
}

/// What `/moderation info` shows about a member
pub struct MemberInfo<'a> {
	pub user_id: Id<UserMarker>,
	pub username: &'a str,
	pub roles: &'a [Id<RoleMarker>],
	pub warnings: &'a [Warning],
	pub created_at: i64,
	pub joined_at: Option<i64>,
}

pub fn member_info(info: &MemberInfo<'_>) -> Result<Embed, EmbedValidationError> {
	let roles = if info.roles.is_empty() {
		String::from("No roles")
	} else {
		let mentions: Vec<String> = info.roles.iter().map(|role| role.mention().to_string()).collect();
		truncate_field(&mentions.join(", "))
	};
	let joined = match info.joined_at {
		Some(joined_at) => format!(
			"{} ({})",
			DiscordTimestamp::long(joined_at),
			DiscordTimestamp::relative(joined_at)
		),
		None => String::from("Unknown"),
	};

	Ok(EmbedBuilder::new()
		.title(format!("{} ({})", info.username, info.user_id))
		.color(EMBED_COLOR)
		.field(EmbedFieldBuilder::new("Roles", roles).build())
		.field(EmbedFieldBuilder::new("Warnings", format_warnings(info.warnings)).build())
		.field(
			EmbedFieldBuilder::new(
				"Account Creation",
				format!(
					"{} ({})",
					DiscordTimestamp::long(info.created_at),
					DiscordTimestamp::relative(info.created_at)
				),
			)
			.build(),
		)
		.field(EmbedFieldBuilder::new("Joined Server", joined).build())
		.validate()?
		.build())
}

/// Lists warnings in the order given, cut down to fit in an embed field.
pub fn format_warnings(warnings: &[Warning]) -> String {
	if warnings.is_empty() {
		return String::from("*No warnings.*");
	}
	let entries: Vec<String> = warnings
		.iter()
		.map(|warning| {
			format!(
				"**ID `{}`** — {}\n> **Reason**: {}\n> **By**: {}",
				warning.warning_id,
				DiscordTimestamp::long(warning.issued_at),
				warning.reason,
				warning.get_moderator().mention()
			)
		})
		.collect();
	truncate_field(&entries.join("\n"))
}

fn truncate_field(value: &str) -> String {
	if value.chars().count() <= FIELD_VALUE_LENGTH {
		return value.to_owned();
	}
	let mut truncated: String = value.chars().take(FIELD_VALUE_LENGTH - 1).collect();
	truncated.push('…');
	truncated
}
