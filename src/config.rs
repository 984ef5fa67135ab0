// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use miette::{Diagnostic, IntoDiagnostic, Result};
use std::str::FromStr;
use thiserror::Error;
use tokio::fs::read_to_string;
use tracing::Level;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, RoleMarker};

#[derive(Debug, Diagnostic, Error)]
pub enum ConfigError {
	#[error("the configuration is missing `{0}`")]
	#[diagnostic(code(warden::config::missing))]
	Missing(&'static str),
	#[error("`{name}` must be {expected}")]
	#[diagnostic(code(warden::config::invalid))]
	Invalid { name: &'static str, expected: &'static str },
}

pub async fn parse_config(config_path: &str) -> Result<ConfigData> {
	let config_file_contents = read_to_string(config_path).await.into_diagnostic()?;
	parse_config_str(&config_file_contents)
}

pub fn parse_config_str(config_file_contents: &str) -> Result<ConfigData> {
	let document: KdlDocument = config_file_contents.parse()?;

	let discord = required_child(&document, "discord")?;
	let staff_roles = discord
		.nodes()
		.iter()
		.filter(|node| node.name().value() == "staff_role")
		.map(|node| node_id(node, "discord.staff_role"))
		.collect::<Result<Vec<Id<RoleMarker>>, ConfigError>>()?;
	if staff_roles.is_empty() {
		return Err(ConfigError::Missing("discord.staff_role").into());
	}
	let discord = DiscordConfig {
		bot_token: required_string(discord, "bot_token", "discord.bot_token")?,
		guild: required_id(discord, "guild", "discord.guild")?,
		staff_roles,
		support_channel: required_id(discord, "support_channel", "discord.support_channel")?,
		ticket_category: optional_id(discord, "ticket_category", "discord.ticket_category")?,
	};

	let database = match document.get("database").and_then(KdlNode::children) {
		Some(database) => DatabaseConfig {
			warnings: optional_string(database, "warnings", "database.warnings")?
				.unwrap_or_else(|| String::from(DEFAULT_WARNINGS_DATABASE)),
			tickets: optional_string(database, "tickets", "database.tickets")?
				.unwrap_or_else(|| String::from(DEFAULT_TICKETS_DATABASE)),
		},
		None => DatabaseConfig::default(),
	};

	let moderation = required_child(&document, "moderation")?;
	let moderation = ModerationConfig {
		server_name: required_string(moderation, "server_name", "moderation.server_name")?,
		appeal_link: optional_string(moderation, "appeal_link", "moderation.appeal_link")?,
	};

	let log_level = match optional_string(&document, "log_level", "log_level")? {
		Some(level) => Level::from_str(&level).map_err(|_| ConfigError::Invalid {
			name: "log_level",
			expected: "one of error, warn, info, debug, or trace",
		})?,
		None => Level::INFO,
	};

	Ok(ConfigData {
		discord,
		database,
		moderation,
		log_level,
	})
}

fn required_child<'a>(document: &'a KdlDocument, name: &'static str) -> Result<&'a KdlDocument, ConfigError> {
	document
		.get(name)
		.and_then(KdlNode::children)
		.ok_or(ConfigError::Missing(name))
}

fn first_argument<'a>(node: &'a KdlNode) -> Option<&'a KdlValue> {
	node.entries()
		.iter()
		.find(|entry| entry.name().is_none())
		.map(KdlEntry::value)
}

fn optional_string(
	document: &KdlDocument,
	key: &str,
	name: &'static str,
) -> Result<Option<String>, ConfigError> {
	let Some(node) = document.get(key) else {
		return Ok(None);
	};
	match first_argument(node).and_then(KdlValue::as_string) {
		Some(value) => Ok(Some(value.to_owned())),
		None => Err(ConfigError::Invalid {
			name,
			expected: "a string",
		}),
	}
}

fn required_string(document: &KdlDocument, key: &str, name: &'static str) -> Result<String, ConfigError> {
	optional_string(document, key, name)?.ok_or(ConfigError::Missing(name))
}

fn node_id<T>(node: &KdlNode, name: &'static str) -> Result<Id<T>, ConfigError> {
	first_argument(node)
		.and_then(KdlValue::as_integer)
		.and_then(|value| u64::try_from(value).ok())
		.and_then(Id::new_checked)
		.ok_or(ConfigError::Invalid {
			name,
			expected: "a nonzero Discord ID",
		})
}

fn optional_id<T>(document: &KdlDocument, key: &str, name: &'static str) -> Result<Option<Id<T>>, ConfigError> {
	document.get(key).map(|node| node_id(node, name)).transpose()
}

fn required_id<T>(document: &KdlDocument, key: &str, name: &'static str) -> Result<Id<T>, ConfigError> {
	optional_id(document, key, name)?.ok_or(ConfigError::Missing(name))
}

pub const DEFAULT_WARNINGS_DATABASE: &str = "warnings.db";
pub const DEFAULT_TICKETS_DATABASE: &str = "tickets.db";

#[derive(Debug)]
pub struct ConfigData {
	pub discord: DiscordConfig,
	pub database: DatabaseConfig,
	pub moderation: ModerationConfig,
	pub log_level: Level,
}

#[derive(Debug)]
pub struct DiscordConfig {
	pub bot_token: String,
	/// The server the bot moderates
	pub guild: Id<GuildMarker>,
	/// Members with any of these roles count as staff
	pub staff_roles: Vec<Id<RoleMarker>>,
	/// Where the "Create Ticket" message is posted on startup
	pub support_channel: Id<ChannelMarker>,
	/// The category new support tickets are created under, if any
	pub ticket_category: Option<Id<ChannelMarker>>,
}

/// File paths of the two SQLite stores
#[derive(Debug)]
pub struct DatabaseConfig {
	pub warnings: String,
	pub tickets: String,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			warnings: String::from(DEFAULT_WARNINGS_DATABASE),
			tickets: String::from(DEFAULT_TICKETS_DATABASE),
		}
	}
}

#[derive(Debug)]
pub struct ModerationConfig {
	/// The server name used in messages sent to moderated users
	pub server_name: String,
	/// Where banned users can appeal
	pub appeal_link: Option<String>,
}

#[cfg(test)]
mod tests {
	use super::*;

	const FULL_CONFIG: &str = r#"
discord {
	bot_token "token"
	guild 700000000000000001
	staff_role 711303603498778735
	staff_role 1338561595852460032
	support_channel 1363575626262384980
	ticket_category 1233319936915669012
}
database {
	warnings "/var/lib/warden/warnings.db"
}
moderation {
	server_name "Example Server"
	appeal_link "https://example.com/appeal"
}
log_level "debug"
"#;

	#[test]
	fn parses_full_config() {
		let config = parse_config_str(FULL_CONFIG).unwrap();
		assert_eq!(config.discord.bot_token, "token");
		assert_eq!(
			config.discord.staff_roles,
			[Id::new(711303603498778735), Id::new(1338561595852460032)]
		);
		assert_eq!(config.discord.ticket_category, Some(Id::new(1233319936915669012)));
		assert_eq!(config.database.warnings, "/var/lib/warden/warnings.db");
		assert_eq!(config.database.tickets, DEFAULT_TICKETS_DATABASE);
		assert_eq!(config.moderation.appeal_link.as_deref(), Some("https://example.com/appeal"));
		assert_eq!(config.log_level, Level::DEBUG);
	}

	#[test]
	fn optional_sections_default() {
		let config = parse_config_str(
			r#"
discord {
	bot_token "token"
	guild 1
	staff_role 2
	support_channel 3
}
moderation {
	server_name "Example Server"
}
"#,
		)
		.unwrap();
		assert_eq!(config.discord.ticket_category, None);
		assert_eq!(config.database.warnings, DEFAULT_WARNINGS_DATABASE);
		assert_eq!(config.log_level, Level::INFO);
	}

	#[test]
	fn missing_staff_role_is_rejected() {
		let error = parse_config_str(
			r#"
discord {
	bot_token "token"
	guild 1
	support_channel 3
}
moderation {
	server_name "Example Server"
}
"#,
		)
		.unwrap_err();
		assert!(error.to_string().contains("discord.staff_role"));
	}

	#[test]
	fn zero_id_is_rejected() {
		let error = parse_config_str(&FULL_CONFIG.replace("guild 700000000000000001", "guild 0")).unwrap_err();
		assert!(error.to_string().contains("discord.guild"));
	}
}
