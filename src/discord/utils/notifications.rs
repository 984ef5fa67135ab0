// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use miette::IntoDiagnostic;
use twilight_http::client::Client;
use twilight_model::channel::message::embed::Embed;
use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;

/// Whether a user was told about an action taken against them
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Notified {
	Yes,
	No,
}

impl Notified {
	/// The note added to staff-facing confirmations
	pub fn confirmation_note(self) -> &'static str {
		match self {
			Self::Yes => "",
			Self::No => " (DM message failed to send)",
		}
	}
}

/// Sends an embed to a user's DMs. Delivery failures (such as the user having DMs closed) are logged and reported
/// through the return value; they never stop the action the notice is about.
pub async fn notify_user(http_client: &Client, user_id: Id<UserMarker>, embed: Embed) -> Notified {
	match send_direct_embed(http_client, user_id, embed).await {
		Ok(()) => Notified::Yes,
		Err(error) => {
			tracing::info!(user = %user_id, source = ?error, "Couldn't send DM to user");
			Notified::No
		}
	}
}

async fn send_direct_embed(http_client: &Client, user_id: Id<UserMarker>, embed: Embed) -> miette::Result<()> {
	let channel = http_client
		.create_private_channel(user_id)
		.await
		.into_diagnostic()?
		.model()
		.await
		.into_diagnostic()?;
	http_client
		.create_message(channel.id)
		.embeds(&[embed])
		.await
		.into_diagnostic()?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn confirmation_mentions_failed_delivery() {
		assert_eq!(Notified::Yes.confirmation_note(), "");
		assert_eq!(Notified::No.confirmation_note(), " (DM message failed to send)");
	}
}
