// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::config::DatabaseConfig;
use crate::database::{Store, StoreError};
use crate::ledger::WarningLedger;
use crate::tickets::TicketRegistry;

/// The bot's persistent state, constructed once at startup and shared with every handler.
///
/// Nothing here holds an open connection, so there is nothing to tear down: dropping the last reference is enough.
#[derive(Clone)]
pub struct Services {
	pub warnings: WarningLedger,
	pub tickets: TicketRegistry,
}

impl Services {
	/// Opens both stores and creates their tables if needed.
	pub async fn initialize(database_config: &DatabaseConfig) -> Result<Self, StoreError> {
		let services = Self {
			warnings: WarningLedger::new(Store::new(&database_config.warnings)),
			tickets: TicketRegistry::new(Store::new(&database_config.tickets)),
		};
		services.warnings.initialize().await?;
		services.tickets.initialize().await?;
		tracing::info!(
			warnings = %database_config.warnings,
			tickets = %database_config.tickets,
			"Storage initialized"
		);
		Ok(services)
	}
}
