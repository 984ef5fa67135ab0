// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use miette::Diagnostic;
use thiserror::Error;
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::guild::Permissions;
use twilight_model::id::Id;
use twilight_model::id::marker::RoleMarker;

/// Permissions granted in a ticket channel to its owner and to staff.
pub fn ticket_member_permissions() -> Permissions {
	Permissions::VIEW_CHANNEL | Permissions::READ_MESSAGE_HISTORY | Permissions::SEND_MESSAGES
}

#[derive(Debug, Diagnostic, Error)]
#[error("only staff may do this")]
#[diagnostic(code(warden::permissions::not_staff))]
pub struct PermissionDenied;

/// Passes if the member holds at least one of the staff roles.
pub fn require_staff(member_roles: &[Id<RoleMarker>], staff_roles: &[Id<RoleMarker>]) -> Result<(), PermissionDenied> {
	if member_roles.iter().any(|role| staff_roles.contains(role)) {
		Ok(())
	} else {
		Err(PermissionDenied)
	}
}

/// Applies [require_staff] to whoever triggered the interaction. Interactions without member data (such as
/// those from DMs) never pass.
pub fn require_staff_interaction(
	interaction: &InteractionCreate,
	staff_roles: &[Id<RoleMarker>],
) -> Result<(), PermissionDenied> {
	let member_roles: &[Id<RoleMarker>] = match &interaction.member {
		Some(member) => &member.roles,
		None => &[],
	};
	require_staff(member_roles, staff_roles)
}
