// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Discord-backed channel operations for tickets.

use super::utils::permissions::ticket_member_permissions;
use crate::tickets::{ChannelOperationError, ChannelProvider};
use async_trait::async_trait;
use twilight_http::client::Client;
use twilight_http::error::ErrorType;
use twilight_http::response::StatusCode;
use twilight_model::channel::ChannelType;
use twilight_model::guild::Permissions;
use twilight_model::channel::permission_overwrite::{PermissionOverwrite, PermissionOverwriteType};
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, GuildMarker, RoleMarker, UserMarker};

/// Name given to ticket channels
pub fn ticket_channel_name(username: &str) -> String {
	format!("・{}", username)
}

/// Permission overwrites for a channel only the given member and staff can see.
pub fn private_channel_overwrites(
	guild_id: Id<GuildMarker>,
	member_id: Id<UserMarker>,
	staff_roles: &[Id<RoleMarker>],
) -> Vec<PermissionOverwrite> {
	// The @everyone role shares the guild's ID.
	let everyone = PermissionOverwrite {
		allow: Permissions::empty(),
		deny: Permissions::VIEW_CHANNEL,
		id: guild_id.cast(),
		kind: PermissionOverwriteType::Role,
	};
	let member = PermissionOverwrite {
		allow: ticket_member_permissions(),
		deny: Permissions::empty(),
		id: member_id.cast(),
		kind: PermissionOverwriteType::Member,
	};
	let staff = staff_roles.iter().map(|role_id| PermissionOverwrite {
		allow: ticket_member_permissions(),
		deny: Permissions::empty(),
		id: role_id.cast(),
		kind: PermissionOverwriteType::Role,
	});

	let mut overwrites = vec![everyone, member];
	overwrites.extend(staff);
	overwrites
}

/// Creates a text channel visible only to one member and staff.
pub async fn create_private_channel(
	http_client: &Client,
	guild_id: Id<GuildMarker>,
	name: &str,
	category: Option<Id<ChannelMarker>>,
	overwrites: &[PermissionOverwrite],
) -> Result<Id<ChannelMarker>, ChannelOperationError> {
	let mut request = http_client
		.create_guild_channel(guild_id, name)
		.kind(ChannelType::GuildText)
		.permission_overwrites(overwrites);
	if let Some(category) = category {
		request = request.parent_id(category);
	}
	let channel = request
		.await
		.map_err(|error| ChannelOperationError::new("create", error))?
		.model()
		.await
		.map_err(|error| ChannelOperationError::new("create", error))?;
	Ok(channel.id)
}

/// Deletes a channel. A channel that's already gone counts as deleted.
pub async fn delete_channel(http_client: &Client, channel_id: Id<ChannelMarker>) -> Result<(), ChannelOperationError> {
	match http_client.delete_channel(channel_id).await {
		Ok(_) => Ok(()),
		Err(error) if is_not_found(&error) => Ok(()),
		Err(error) => Err(ChannelOperationError::new("delete", error)),
	}
}

fn is_not_found(error: &twilight_http::Error) -> bool {
	matches!(error.kind(), ErrorType::Response { status, .. } if *status == StatusCode::NOT_FOUND)
}

/// Channel operations for one member's support ticket
pub struct SupportTicketChannels<'a> {
	pub http_client: &'a Client,
	pub guild_id: Id<GuildMarker>,
	pub owner_id: Id<UserMarker>,
	pub owner_username: &'a str,
	pub category: Option<Id<ChannelMarker>>,
	pub staff_roles: &'a [Id<RoleMarker>],
}

#[async_trait]
impl<'a> ChannelProvider for SupportTicketChannels<'a> {
	async fn resolve_channel(&self, channel_id: Id<ChannelMarker>) -> Result<bool, ChannelOperationError> {
		match self.http_client.channel(channel_id).await {
			Ok(_) => Ok(true),
			Err(error) if is_not_found(&error) => Ok(false),
			Err(error) => Err(ChannelOperationError::new("look up", error)),
		}
	}

	async fn create_channel(&self) -> Result<Id<ChannelMarker>, ChannelOperationError> {
		let overwrites = private_channel_overwrites(self.guild_id, self.owner_id, self.staff_roles);
		create_private_channel(
			self.http_client,
			self.guild_id,
			&ticket_channel_name(self.owner_username),
			self.category,
			&overwrites,
		)
		.await
	}

	async fn delete_channel(&self, channel_id: Id<ChannelMarker>) -> Result<(), ChannelOperationError> {
		delete_channel(self.http_client, channel_id).await
	}
}
