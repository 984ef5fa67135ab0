// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use twilight_model::channel::message::component::{ActionRow, Button, ButtonStyle, Component};

pub const OPEN_TICKET_ID: &str = "open_ticket";
pub const CLOSE_TICKET_ID: &str = "close_ticket";

pub fn open_ticket_button() -> Component {
	let open_button = Button {
		custom_id: Some(String::from(OPEN_TICKET_ID)),
		disabled: false,
		emoji: None,
		label: Some(String::from("📩 Create Ticket")),
		style: ButtonStyle::Secondary,
		url: None,
		sku_id: None,
	};
	Component::ActionRow(ActionRow {
		components: vec![Component::Button(open_button)],
	})
}

pub fn close_ticket_button() -> Component {
	let close_button = Button {
		custom_id: Some(String::from(CLOSE_TICKET_ID)),
		disabled: false,
		emoji: None,
		label: Some(String::from("🔒 Delete Ticket")),
		style: ButtonStyle::Danger,
		url: None,
		sku_id: None,
	};
	Component::ActionRow(ActionRow {
		components: vec![Component::Button(close_button)],
	})
}
