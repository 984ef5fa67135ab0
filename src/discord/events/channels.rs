// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::services::Services;
use crate::tickets::TicketKey;
use twilight_model::id::Id;
use twilight_model::id::marker::ChannelMarker;

/// Drops the registry entry for a ticket channel as soon as Discord reports it deleted, instead of waiting for the
/// owner's next ticket request to find the orphan.
pub async fn handle_channel_delete(channel_id: Id<ChannelMarker>, services: &Services) -> miette::Result<()> {
	let removed = services.tickets.close_ticket(TicketKey::Channel(channel_id)).await?;
	if removed {
		tracing::debug!(channel = %channel_id, "Removed ticket for deleted channel");
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::DatabaseConfig;
	use crate::tickets::TicketOutcome;
	use crate::tickets::test_support::FakeChannels;

	#[tokio::test]
	async fn deleting_a_ticket_channel_frees_the_owner() {
		let directory = std::env::temp_dir();
		let id = cuid2::create_id();
		let database_config = DatabaseConfig {
			warnings: directory.join(format!("events-warnings-{}.db", id)).to_string_lossy().into_owned(),
			tickets: directory.join(format!("events-tickets-{}.db", id)).to_string_lossy().into_owned(),
		};
		let services = Services::initialize(&database_config).await.unwrap();
		let channels = FakeChannels::default();
		let user = Id::new(42);

		let channel = services.tickets.open_ticket(user, &channels).await.unwrap().channel();
		handle_channel_delete(channel, &services).await.unwrap();
		// Unrelated channels are ignored.
		handle_channel_delete(Id::new(9999), &services).await.unwrap();

		assert!(services.tickets.ticket_for_user(user).await.unwrap().is_none());
		let reopened = services.tickets.open_ticket(user, &channels).await.unwrap();
		assert!(matches!(reopened, TicketOutcome::Created(_)));

		let _ = std::fs::remove_file(&database_config.warnings);
		let _ = std::fs::remove_file(&database_config.tickets);
	}
}
