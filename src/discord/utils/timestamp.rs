// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;
use twilight_model::util::datetime::Timestamp;
use twilight_util::snowflake::Snowflake;

/// Gets the creation time embedded in an ID snowflake, in seconds since the Unix epoch.
pub fn epoch_secs_from_id(id: impl Snowflake) -> i64 {
	id.timestamp() / 1000
}

/// Gets the seconds since the Unix epoch for a timestamp from Discord.
pub fn epoch_secs_from_timestamp(timestamp: &Timestamp) -> i64 {
	timestamp.as_secs()
}

/// How Discord should render a [DiscordTimestamp] for each reader.
#[derive(Clone, Copy, Debug)]
pub enum TimestampStyle {
	/// Day of week, date, and time
	LongDateTime,
	/// "3 days ago"
	Relative,
}

/// A `<t:…>` timestamp markup that the Discord client renders in the reader's time zone.
#[derive(Clone, Copy, Debug)]
pub struct DiscordTimestamp {
	pub epoch_secs: i64,
	pub style: TimestampStyle,
}

impl DiscordTimestamp {
	pub fn long(epoch_secs: i64) -> Self {
		Self {
			epoch_secs,
			style: TimestampStyle::LongDateTime,
		}
	}

	pub fn relative(epoch_secs: i64) -> Self {
		Self {
			epoch_secs,
			style: TimestampStyle::Relative,
		}
	}
}

impl fmt::Display for DiscordTimestamp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let style = match self.style {
			TimestampStyle::LongDateTime => 'F',
			TimestampStyle::Relative => 'R',
		};
		write!(f, "<t:{}:{}>", self.epoch_secs, style)
	}
}
