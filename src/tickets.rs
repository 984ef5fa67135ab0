// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The ticket registry: which user owns which open support channel.
//!
//! A user's ticket slot moves between having no ticket and having one open. A third condition, where the row
//! still exists but its channel was deleted outside the bot, is cleaned up when the platform reports the deletion or,
//! failing that, the next time that user asks for a ticket.

use crate::database::{Store, StoreError, TICKETS_MIGRATIONS};
use crate::model::{Ticket, database_id_from_discord_id};
use crate::schema::tickets;
use async_trait::async_trait;
use diesel::prelude::*;
use miette::Diagnostic;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use thiserror::Error;
use tokio::sync::Mutex;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, UserMarker};

/// A failed call to the chat platform while managing a ticket channel.
#[derive(Debug, Diagnostic, Error)]
#[error("the platform failed to {operation} a ticket channel")]
#[diagnostic(code(warden::tickets::channel_operation))]
pub struct ChannelOperationError {
	pub operation: &'static str,
	#[source]
	pub source: Box<dyn Error + Send + Sync>,
}

impl ChannelOperationError {
	pub fn new(operation: &'static str, source: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
		Self {
			operation,
			source: source.into(),
		}
	}
}

#[derive(Debug, Diagnostic, Error)]
pub enum TicketError {
	#[error(transparent)]
	#[diagnostic(transparent)]
	Storage(#[from] StoreError),
	#[error(transparent)]
	#[diagnostic(transparent)]
	Channel(#[from] ChannelOperationError),
}

/// The platform capabilities the registry needs to manage the channels behind tickets.
#[async_trait]
pub trait ChannelProvider: Send + Sync {
	/// Checks whether a channel still exists.
	async fn resolve_channel(&self, channel_id: Id<ChannelMarker>) -> Result<bool, ChannelOperationError>;

	/// Creates a new private channel for the ticket.
	async fn create_channel(&self) -> Result<Id<ChannelMarker>, ChannelOperationError>;

	/// Deletes a channel.
	async fn delete_channel(&self, channel_id: Id<ChannelMarker>) -> Result<(), ChannelOperationError>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TicketOutcome {
	/// The user already has a ticket in this channel; nothing was created.
	AlreadyOpen(Id<ChannelMarker>),
	/// A new ticket was opened in this channel.
	Created(Id<ChannelMarker>),
}

impl TicketOutcome {
	pub fn channel(&self) -> Id<ChannelMarker> {
		match self {
			Self::AlreadyOpen(channel) | Self::Created(channel) => *channel,
		}
	}
}

/// Identifies the ticket to close.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TicketKey {
	User(Id<UserMarker>),
	Channel(Id<ChannelMarker>),
}

type UserLocks = StdMutex<HashMap<Id<UserMarker>, Arc<Mutex<()>>>>;

#[derive(Clone)]
pub struct TicketRegistry {
	store: Store,
	user_locks: Arc<UserLocks>,
}

/// One caller's claim on a user's lock. Dropping it (including when the caller's future is cancelled) removes the
/// map entry once nobody else holds or waits on the lock.
struct UserLockClaim<'a> {
	user: Id<UserMarker>,
	lock: Arc<Mutex<()>>,
	user_locks: &'a UserLocks,
}

impl<'a> UserLockClaim<'a> {
	fn new(user: Id<UserMarker>, user_locks: &'a UserLocks) -> Self {
		let lock = {
			let mut locks = user_locks.lock().unwrap_or_else(PoisonError::into_inner);
			Arc::clone(locks.entry(user).or_default())
		};
		Self { user, lock, user_locks }
	}
}

impl Drop for UserLockClaim<'_> {
	fn drop(&mut self) {
		let mut locks = self.user_locks.lock().unwrap_or_else(PoisonError::into_inner);
		// One reference in the map and one here means nobody else is waiting.
		if Arc::strong_count(&self.lock) == 2 {
			locks.remove(&self.user);
		}
	}
}

impl TicketRegistry {
	pub fn new(store: Store) -> Self {
		Self {
			store,
			user_locks: Arc::new(StdMutex::new(HashMap::new())),
		}
	}

	pub async fn initialize(&self) -> Result<(), StoreError> {
		self.store.initialize(TICKETS_MIGRATIONS).await
	}

	/// Opens a ticket for the user unless they already have one whose channel still exists.
	///
	/// Requests for the same user are handled one at a time, so a double-click creates at most one channel.
	pub async fn open_ticket<P>(&self, user: Id<UserMarker>, provider: &P) -> Result<TicketOutcome, TicketError>
	where
		P: ChannelProvider + ?Sized,
	{
		let claim = UserLockClaim::new(user, &self.user_locks);
		let _guard = claim.lock.lock().await;
		self.open_ticket_serialized(user, provider).await
	}

	async fn open_ticket_serialized<P>(
		&self,
		user: Id<UserMarker>,
		provider: &P,
	) -> Result<TicketOutcome, TicketError>
	where
		P: ChannelProvider + ?Sized,
	{
		if let Some(ticket) = self.ticket_for_user(user).await? {
			let channel = ticket.get_channel();
			if provider.resolve_channel(channel).await? {
				return Ok(TicketOutcome::AlreadyOpen(channel));
			}
			tracing::info!(user = %user, channel = %channel, "Removing ticket whose channel no longer exists");
			self.remove_orphan(ticket).await?;
		}

		let channel = provider.create_channel().await?;
		if let Some(existing) = self.insert_ticket(user, channel).await? {
			// Another process registered a ticket for this user between our lookup and insert.
			let existing_channel = existing.get_channel();
			tracing::warn!(
				user = %user,
				created_channel = %channel,
				existing_channel = %existing_channel,
				"Ticket for user was registered concurrently; removing the duplicate channel"
			);
			if let Err(error) = provider.delete_channel(channel).await {
				tracing::warn!(
					source = ?error,
					user = %user,
					channel = %channel,
					"Couldn't delete duplicate ticket channel; it needs removing by hand"
				);
			}
			return Ok(TicketOutcome::AlreadyOpen(existing_channel));
		}

		tracing::info!(user = %user, channel = %channel, "Opened ticket");
		Ok(TicketOutcome::Created(channel))
	}

	/// Removes the ticket's registry row, returning whether there was one. Closing a ticket that doesn't exist does
	/// nothing. The channel itself is left for the caller to tear down.
	pub async fn close_ticket(&self, key: TicketKey) -> Result<bool, StoreError> {
		let deleted = self
			.store
			.run(move |db_connection| {
				let deleted = match key {
					TicketKey::User(user) => diesel::delete(tickets::table)
						.filter(tickets::user_id.eq(database_id_from_discord_id(user.get())))
						.execute(db_connection)?,
					TicketKey::Channel(channel) => diesel::delete(tickets::table)
						.filter(tickets::channel_id.eq(database_id_from_discord_id(channel.get())))
						.execute(db_connection)?,
				};
				Ok(deleted)
			})
			.await?;
		if deleted > 0 {
			tracing::info!(?key, "Closed ticket");
		}
		Ok(deleted > 0)
	}

	pub async fn ticket_for_user(&self, user: Id<UserMarker>) -> Result<Option<Ticket>, StoreError> {
		let db_user_id = database_id_from_discord_id(user.get());
		self.store
			.run(move |db_connection| {
				let ticket: Option<Ticket> = tickets::table
					.find(db_user_id)
					.select(Ticket::as_select())
					.first(db_connection)
					.optional()?;
				Ok(ticket)
			})
			.await
	}

	pub async fn ticket_for_channel(&self, channel: Id<ChannelMarker>) -> Result<Option<Ticket>, StoreError> {
		let db_channel_id = database_id_from_discord_id(channel.get());
		self.store
			.run(move |db_connection| {
				let ticket: Option<Ticket> = tickets::table
					.filter(tickets::channel_id.eq(db_channel_id))
					.select(Ticket::as_select())
					.first(db_connection)
					.optional()?;
				Ok(ticket)
			})
			.await
	}

	/// Deletes the stale row, but only if it still points at the dead channel.
	async fn remove_orphan(&self, ticket: Ticket) -> Result<(), StoreError> {
		self.store
			.run(move |db_connection| {
				diesel::delete(tickets::table)
					.filter(tickets::user_id.eq(ticket.user_id))
					.filter(tickets::channel_id.eq(ticket.channel_id))
					.execute(db_connection)?;
				Ok(())
			})
			.await
	}

	/// Inserts the ticket if the user has none. On conflict, returns the row that won.
	async fn insert_ticket(
		&self,
		user: Id<UserMarker>,
		channel: Id<ChannelMarker>,
	) -> Result<Option<Ticket>, StoreError> {
		let new_ticket = Ticket {
			user_id: database_id_from_discord_id(user.get()),
			channel_id: database_id_from_discord_id(channel.get()),
		};
		self.store
			.run(move |db_connection| {
				let inserted = diesel::insert_or_ignore_into(tickets::table)
					.values(&new_ticket)
					.execute(db_connection)?;
				if inserted > 0 {
					return Ok(None);
				}
				let existing: Ticket = tickets::table
					.find(new_ticket.user_id)
					.select(Ticket::as_select())
					.first(db_connection)?;
				Ok(Some(existing))
			})
			.await
	}
}

#[cfg(test)]
pub(crate) mod test_support {
	use super::{ChannelOperationError, ChannelProvider};
	use async_trait::async_trait;
	use std::collections::HashSet;
	use std::sync::Mutex;
	use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
	use twilight_model::id::Id;
	use twilight_model::id::marker::ChannelMarker;

	/// An in-memory stand-in for the platform's channel list.
	#[derive(Default)]
	pub struct FakeChannels {
		pub live: Mutex<HashSet<Id<ChannelMarker>>>,
		next_id: AtomicU64,
		pub created: AtomicUsize,
		pub fail_create: bool,
		pub fail_resolve: bool,
		pub stall_create: bool,
	}

	impl FakeChannels {
		pub fn failing_create() -> Self {
			Self {
				fail_create: true,
				..Self::default()
			}
		}

		pub fn failing_resolve() -> Self {
			Self {
				fail_resolve: true,
				..Self::default()
			}
		}

		/// Channel creation never finishes, for cancelling callers mid-request.
		pub fn stalling_create() -> Self {
			Self {
				stall_create: true,
				..Self::default()
			}
		}

		/// Simulates someone deleting the channel outside the bot.
		pub fn destroy(&self, channel_id: Id<ChannelMarker>) {
			self.live.lock().unwrap().remove(&channel_id);
		}

		pub fn created_count(&self) -> usize {
			self.created.load(Ordering::SeqCst)
		}
	}

	#[async_trait]
	impl ChannelProvider for FakeChannels {
		async fn resolve_channel(&self, channel_id: Id<ChannelMarker>) -> Result<bool, ChannelOperationError> {
			if self.fail_resolve {
				return Err(ChannelOperationError::new("look up", "rate limited"));
			}
			Ok(self.live.lock().unwrap().contains(&channel_id))
		}

		async fn create_channel(&self) -> Result<Id<ChannelMarker>, ChannelOperationError> {
			if self.fail_create {
				return Err(ChannelOperationError::new("create", "missing permissions"));
			}
			if self.stall_create {
				std::future::pending::<()>().await;
			}
			// Yield so concurrent callers really interleave.
			tokio::task::yield_now().await;
			let channel_id = Id::new(1000 + self.next_id.fetch_add(1, Ordering::SeqCst));
			self.live.lock().unwrap().insert(channel_id);
			self.created.fetch_add(1, Ordering::SeqCst);
			Ok(channel_id)
		}

		async fn delete_channel(&self, channel_id: Id<ChannelMarker>) -> Result<(), ChannelOperationError> {
			self.live.lock().unwrap().remove(&channel_id);
			Ok(())
		}
	}
}

#[cfg(test)]
mod tests {
	use super::test_support::FakeChannels;
	use super::*;
	use crate::database::test_support::TempStore;
	use std::time::Duration;

	async fn registry(temp: &TempStore) -> TicketRegistry {
		let registry = TicketRegistry::new(temp.store.clone());
		registry.initialize().await.unwrap();
		registry
	}

	#[tokio::test]
	async fn second_open_returns_the_existing_channel() {
		let temp = TempStore::new("tickets-duplicate");
		let registry = registry(&temp).await;
		let channels = FakeChannels::default();
		let user = Id::new(42);

		let first = registry.open_ticket(user, &channels).await.unwrap();
		let second = registry.open_ticket(user, &channels).await.unwrap();

		let TicketOutcome::Created(channel) = first else {
			panic!("first open should create a ticket, got {:?}", first);
		};
		assert_eq!(second, TicketOutcome::AlreadyOpen(channel));
		assert_eq!(channels.created_count(), 1);
	}

	#[tokio::test]
	async fn orphaned_ticket_is_replaced() {
		let temp = TempStore::new("tickets-orphan");
		let registry = registry(&temp).await;
		let channels = FakeChannels::default();
		let user = Id::new(42);

		let original = registry.open_ticket(user, &channels).await.unwrap().channel();
		channels.destroy(original);

		let reopened = registry.open_ticket(user, &channels).await.unwrap();
		let TicketOutcome::Created(replacement) = reopened else {
			panic!("orphaned ticket should be replaced, got {:?}", reopened);
		};
		assert_ne!(replacement, original);
		assert_eq!(channels.created_count(), 2);

		let stored = registry.ticket_for_user(user).await.unwrap().unwrap();
		assert_eq!(stored.get_channel(), replacement);
		assert!(registry.ticket_for_channel(original).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn failed_channel_creation_leaves_no_row() {
		let temp = TempStore::new("tickets-create-fails");
		let registry = registry(&temp).await;
		let channels = FakeChannels::failing_create();
		let user = Id::new(42);

		let result = registry.open_ticket(user, &channels).await;
		assert!(matches!(result, Err(TicketError::Channel(_))));
		assert!(registry.ticket_for_user(user).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn failed_lookup_keeps_the_existing_row() {
		let temp = TempStore::new("tickets-resolve-fails");
		let registry = registry(&temp).await;
		let user = Id::new(42);

		let channel = registry
			.open_ticket(user, &FakeChannels::default())
			.await
			.unwrap()
			.channel();
		let result = registry.open_ticket(user, &FakeChannels::failing_resolve()).await;

		assert!(matches!(result, Err(TicketError::Channel(_))));
		let stored = registry.ticket_for_user(user).await.unwrap().unwrap();
		assert_eq!(stored.get_channel(), channel);
	}

	#[tokio::test]
	async fn close_is_idempotent() {
		let temp = TempStore::new("tickets-close");
		let registry = registry(&temp).await;
		let channels = FakeChannels::default();
		let user = Id::new(42);

		assert!(!registry.close_ticket(TicketKey::User(user)).await.unwrap());

		registry.open_ticket(user, &channels).await.unwrap();
		assert!(registry.close_ticket(TicketKey::User(user)).await.unwrap());
		assert!(!registry.close_ticket(TicketKey::User(user)).await.unwrap());
		assert!(registry.ticket_for_user(user).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn close_by_channel_frees_the_slot() {
		let temp = TempStore::new("tickets-close-channel");
		let registry = registry(&temp).await;
		let channels = FakeChannels::default();
		let user = Id::new(42);

		let channel = registry.open_ticket(user, &channels).await.unwrap().channel();
		assert!(registry.close_ticket(TicketKey::Channel(channel)).await.unwrap());

		let reopened = registry.open_ticket(user, &channels).await.unwrap();
		assert!(matches!(reopened, TicketOutcome::Created(_)));
	}

	#[tokio::test]
	async fn double_submission_creates_one_channel() {
		let temp = TempStore::new("tickets-race");
		let registry = registry(&temp).await;
		let channels = Arc::new(FakeChannels::default());
		let user = Id::new(42);

		let mut handles = Vec::new();
		for _ in 0..5 {
			let registry = registry.clone();
			let channels = Arc::clone(&channels);
			handles.push(tokio::spawn(async move {
				registry.open_ticket(user, channels.as_ref()).await
			}));
		}
		let mut outcomes = Vec::new();
		for handle in handles {
			outcomes.push(handle.await.unwrap().unwrap());
		}

		assert_eq!(channels.created_count(), 1);
		let created = outcomes
			.iter()
			.filter(|outcome| matches!(outcome, TicketOutcome::Created(_)))
			.count();
		assert_eq!(created, 1);
		let channel = outcomes[0].channel();
		assert!(outcomes.iter().all(|outcome| outcome.channel() == channel));
	}

	#[tokio::test]
	async fn conflicting_row_from_elsewhere_wins() {
		let temp = TempStore::new("tickets-conflict");
		let registry = registry(&temp).await;
		let channels = FakeChannels::default();
		let user = Id::new(42);

		// Another process sharing the file registered the user after our lookup.
		let winner = Id::new(77);
		assert!(registry.insert_ticket(user, winner).await.unwrap().is_none());
		let loser = channels.create_channel().await.unwrap();
		let existing = registry.insert_ticket(user, loser).await.unwrap().unwrap();

		assert_eq!(existing.get_channel(), winner);
	}

	/// Registers a competing ticket for the user while the channel is being created, then fails to delete the
	/// duplicate.
	struct RacingChannels {
		registry: TicketRegistry,
		user: Id<UserMarker>,
		winner: Id<ChannelMarker>,
	}

	#[async_trait]
	impl ChannelProvider for RacingChannels {
		async fn resolve_channel(&self, _channel_id: Id<ChannelMarker>) -> Result<bool, ChannelOperationError> {
			Ok(true)
		}

		async fn create_channel(&self) -> Result<Id<ChannelMarker>, ChannelOperationError> {
			self.registry
				.insert_ticket(self.user, self.winner)
				.await
				.map_err(|error| ChannelOperationError::new("create", error))?;
			Ok(Id::new(5000))
		}

		async fn delete_channel(&self, _channel_id: Id<ChannelMarker>) -> Result<(), ChannelOperationError> {
			Err(ChannelOperationError::new("delete", "missing permissions"))
		}
	}

	#[tokio::test]
	async fn failed_duplicate_cleanup_still_returns_the_existing_ticket() {
		let temp = TempStore::new("tickets-conflict-cleanup");
		let registry = registry(&temp).await;
		let user = Id::new(42);
		let channels = RacingChannels {
			registry: registry.clone(),
			user,
			winner: Id::new(77),
		};

		let outcome = registry.open_ticket(user, &channels).await.unwrap();

		assert_eq!(outcome, TicketOutcome::AlreadyOpen(Id::new(77)));
		let stored = registry.ticket_for_user(user).await.unwrap().unwrap();
		assert_eq!(stored.get_channel(), Id::new(77));
	}

	#[tokio::test]
	async fn user_lock_is_released_after_open() {
		let temp = TempStore::new("tickets-lock-release");
		let registry = registry(&temp).await;
		let user = Id::new(42);

		registry.open_ticket(user, &FakeChannels::default()).await.unwrap();
		assert!(registry.user_locks.lock().unwrap().is_empty());
	}

	#[tokio::test]
	async fn cancelled_open_releases_the_user_lock() {
		let temp = TempStore::new("tickets-lock-cancel");
		let registry = registry(&temp).await;
		let user = Id::new(42);

		let stalled = FakeChannels::stalling_create();
		let result = tokio::time::timeout(Duration::from_millis(100), registry.open_ticket(user, &stalled)).await;
		assert!(result.is_err());
		assert!(registry.user_locks.lock().unwrap().is_empty());

		let reopened = registry.open_ticket(user, &FakeChannels::default()).await.unwrap();
		assert!(matches!(reopened, TicketOutcome::Created(_)));
	}
}
