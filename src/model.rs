// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::schema::{tickets, warnings};
use diesel::prelude::*;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, UserMarker};

/// The database representation of a warning issued to a user by a staff member
#[derive(Clone, Debug, Eq, Insertable, PartialEq, Queryable, Selectable)]
#[diesel(table_name = warnings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Warning {
	/// The ID of the warned user.
	///
	/// To get a Discord-facing version of this more easily, use [Self::get_user].
	pub user_id: i64,
	/// The warning's ID, unique per user. Made of the local time the warning was issued (`DDMMYY-HH-MM-SS`) and a
	/// suffix counting warnings issued to the same user in the same second.
	pub warning_id: String,
	/// When the warning was stored, in seconds since the Unix epoch. This is read from the clock separately from
	/// the time in [Self::warning_id], so the two may disagree by a second at the edges.
	#[diesel(column_name = timestamp)]
	pub issued_at: i64,
	/// The reason given by the moderator
	pub reason: String,
	/// The ID of the moderator who issued the warning.
	///
	/// To get a Discord-facing version of this more easily, use [Self::get_moderator].
	pub moderator_id: i64,
}

impl Warning {
	/// Gets the warned user.
	///
	/// For the raw database representation, use [Self::user_id].
	pub fn get_user(&self) -> Id<UserMarker> {
		Id::new(discord_id_from_database_id(self.user_id))
	}

	/// Gets the moderator who issued the warning.
	///
	/// For the raw database representation, use [Self::moderator_id].
	pub fn get_moderator(&self) -> Id<UserMarker> {
		Id::new(discord_id_from_database_id(self.moderator_id))
	}
}

/// The database representation of an open support ticket
#[derive(Clone, Debug, Eq, Insertable, PartialEq, Queryable, Selectable)]
#[diesel(table_name = tickets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Ticket {
	/// The ID of the user who opened the ticket. Each user has at most one ticket.
	///
	/// To get a Discord-facing version of this more easily, use [Self::get_user].
	pub user_id: i64,
	/// The ID of the channel backing the ticket.
	///
	/// To get a Discord-facing version of this more easily, use [Self::get_channel].
	pub channel_id: i64,
}

impl Ticket {
	/// Gets the user who opened the ticket.
	///
	/// For the raw database representation, use [Self::user_id].
	pub fn get_user(&self) -> Id<UserMarker> {
		Id::new(discord_id_from_database_id(self.user_id))
	}

	/// Gets the channel backing the ticket.
	///
	/// For the raw database representation, use [Self::channel_id].
	pub fn get_channel(&self) -> Id<ChannelMarker> {
		Id::new(discord_id_from_database_id(self.channel_id))
	}
}

/// Converts an ID used with Discord (unsigned) to an ID for database use (signed)
pub fn database_id_from_discord_id(discord_id: u64) -> i64 {
	discord_id as i64
}

/// Converts an ID retrieved from the database (signed) to an ID for use with Discord (unsigned)
pub fn discord_id_from_database_id(database_id: i64) -> u64 {
	database_id as u64
}
