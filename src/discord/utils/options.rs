// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use miette::bail;
use twilight_model::application::interaction::application_command::{CommandDataOption, CommandOptionValue};
use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;

pub fn user_option(options: &[CommandDataOption], name: &str) -> miette::Result<Option<Id<UserMarker>>> {
	let Some(option) = options.iter().find(|option| option.name == name) else {
		return Ok(None);
	};
	let CommandOptionValue::User(user_id) = option.value else {
		bail!("Command option {} wasn't a user", name);
	};
	Ok(Some(user_id))
}

pub fn required_user_option(options: &[CommandDataOption], name: &str) -> miette::Result<Id<UserMarker>> {
	match user_option(options, name)? {
		Some(user_id) => Ok(user_id),
		None => bail!("Command received without required option {}", name),
	}
}

pub fn string_option<'a>(options: &'a [CommandDataOption], name: &str) -> miette::Result<Option<&'a str>> {
	let Some(option) = options.iter().find(|option| option.name == name) else {
		return Ok(None);
	};
	let CommandOptionValue::String(value) = &option.value else {
		bail!("Command option {} wasn't a string", name);
	};
	Ok(Some(value.as_str()))
}

pub fn required_string_option<'a>(options: &'a [CommandDataOption], name: &str) -> miette::Result<&'a str> {
	match string_option(options, name)? {
		Some(value) => Ok(value),
		None => bail!("Command received without required option {}", name),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn options() -> Vec<CommandDataOption> {
		vec![
			CommandDataOption {
				name: String::from("user"),
				value: CommandOptionValue::User(Id::new(42)),
			},
			CommandDataOption {
				name: String::from("reason"),
				value: CommandOptionValue::String(String::from("spam")),
			},
		]
	}

	#[test]
	fn reads_present_options() {
		let options = options();
		assert_eq!(required_user_option(&options, "user").unwrap(), Id::new(42));
		assert_eq!(required_string_option(&options, "reason").unwrap(), "spam");
	}

	#[test]
	fn absent_optional_option_is_none() {
		assert_eq!(string_option(&options(), "warning_id").unwrap(), None);
	}

	#[test]
	fn wrong_type_is_an_error() {
		assert!(user_option(&options(), "reason").is_err());
		assert!(required_string_option(&options(), "warning_id").is_err());
	}
}
