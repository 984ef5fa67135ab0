// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use miette::IntoDiagnostic;
use twilight_http::client::Client;
use twilight_model::channel::message::{AllowedMentions, MessageFlags};
use twilight_model::gateway::payload::incoming::InteractionCreate;
use twilight_model::http::interaction::{InteractionResponse, InteractionResponseData, InteractionResponseType};
use twilight_model::id::Id;
use twilight_model::id::marker::ApplicationMarker;
use twilight_util::builder::InteractionResponseDataBuilder;

pub const NOT_STAFF: &str = "You need a staff role to use this.";
pub const ONLY_STAFF_CAN_CLOSE: &str = "Only staff can close this ticket.";
pub const INTERNAL_ERROR: &str = "An internal error occurred handling this request.";

/// Sends the initial response to an interaction as a new message.
pub async fn respond(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	data: InteractionResponseData,
) -> miette::Result<()> {
	let response = InteractionResponse {
		kind: InteractionResponseType::ChannelMessageWithSource,
		data: Some(data),
	};
	http_client
		.interaction(application_id)
		.create_response(interaction.id, &interaction.token, &response)
		.await
		.into_diagnostic()?;
	Ok(())
}

/// Responds with plain text that mentions nobody.
pub async fn respond_text(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	content: &str,
) -> miette::Result<()> {
	let data = InteractionResponseDataBuilder::new()
		.content(content)
		.allowed_mentions(AllowedMentions::default())
		.build();
	respond(interaction, http_client, application_id, data).await
}

/// Responds with text only the invoking user can see.
pub async fn respond_ephemeral(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	content: &str,
) -> miette::Result<()> {
	let data = InteractionResponseDataBuilder::new()
		.content(content)
		.flags(MessageFlags::EPHEMERAL)
		.allowed_mentions(AllowedMentions::default())
		.build();
	respond(interaction, http_client, application_id, data).await
}

/// Who can see a deferred response and whatever replaces it
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Visibility {
	Public,
	Ephemeral,
}

/// A "thinking" acknowledgement for work that may take longer than Discord's response window.
pub fn deferred_response(visibility: Visibility) -> InteractionResponse {
	let mut data = InteractionResponseDataBuilder::new();
	if visibility == Visibility::Ephemeral {
		data = data.flags(MessageFlags::EPHEMERAL);
	}
	InteractionResponse {
		kind: InteractionResponseType::DeferredChannelMessageWithSource,
		data: Some(data.build()),
	}
}

/// Acknowledges the interaction with [deferred_response]. Follow up with [update_response_text].
pub async fn defer(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	visibility: Visibility,
) -> miette::Result<()> {
	http_client
		.interaction(application_id)
		.create_response(interaction.id, &interaction.token, &deferred_response(visibility))
		.await
		.into_diagnostic()?;
	Ok(())
}

pub async fn defer_ephemeral(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
) -> miette::Result<()> {
	defer(interaction, http_client, application_id, Visibility::Ephemeral).await
}

pub async fn update_response_text(
	interaction: &InteractionCreate,
	http_client: &Client,
	application_id: Id<ApplicationMarker>,
	content: &str,
) -> miette::Result<()> {
	http_client
		.interaction(application_id)
		.update_response(&interaction.token)
		.content(Some(content))
		.allowed_mentions(Some(&AllowedMentions::default()))
		.await
		.into_diagnostic()?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn flags(response: &InteractionResponse) -> Option<MessageFlags> {
		response.data.as_ref().and_then(|data| data.flags)
	}

	#[test]
	fn public_deferral_is_visible_to_everyone() {
		let response = deferred_response(Visibility::Public);
		assert_eq!(response.kind, InteractionResponseType::DeferredChannelMessageWithSource);
		assert!(!flags(&response).unwrap_or_else(MessageFlags::empty).contains(MessageFlags::EPHEMERAL));
	}

	#[test]
	fn ephemeral_deferral_is_private() {
		let response = deferred_response(Visibility::Ephemeral);
		assert_eq!(flags(&response), Some(MessageFlags::EPHEMERAL));
	}
}
