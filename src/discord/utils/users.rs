// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use twilight_model::application::interaction::InteractionDataResolved;
use twilight_model::id::Id;
use twilight_model::id::marker::{RoleMarker, UserMarker};
use twilight_model::util::datetime::Timestamp;

/// User data for a user passed as a command option, taken from the member data Discord resolved with the command,
/// falling back to the user data if the user isn't a member.
#[derive(Debug)]
pub struct UserData {
	pub id: Id<UserMarker>,
	pub username: String,
	pub display_name: String,
	/// Only present if the user is a member of the server
	pub roles: Option<Vec<Id<RoleMarker>>>,
	pub joined_at: Option<Timestamp>,
}

impl UserData {
	pub fn is_member(&self) -> bool {
		self.roles.is_some()
	}
}

/// Gets resolved data for a user option. Falls back to the bare ID if Discord didn't resolve the user.
pub fn resolved_user_data(resolved: Option<&InteractionDataResolved>, user_id: Id<UserMarker>) -> UserData {
	let user = resolved.and_then(|resolved| resolved.users.get(&user_id));
	let member = resolved.and_then(|resolved| resolved.members.get(&user_id));

	let username = match user {
		Some(user) => user.name.clone(),
		None => user_id.to_string(),
	};
	let global_name = user.and_then(|user| user.global_name.clone());
	let nick = member.and_then(|member| member.nick.clone());
	let display_name = nick.or(global_name).unwrap_or_else(|| username.clone());

	UserData {
		id: user_id,
		username,
		display_name,
		roles: member.map(|member| member.roles.clone()),
		joined_at: member.and_then(|member| member.joined_at),
	}
}
