// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The warning ledger: an append-only record of the warnings staff have issued to each user.

use crate::database::{Store, StoreError, WARNINGS_MIGRATIONS};
use crate::model::{Warning, database_id_from_discord_id};
use crate::schema::warnings;
use chrono::{DateTime, Local};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DbError};
use std::sync::Arc;
use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;

/// Format of the time portion of a warning ID.
pub const WARNING_TIME_FORMAT: &str = "%d%m%y-%H-%M-%S";

/// Source of wall-clock time for the ledger.
pub trait Clock: Send + Sync {
	fn now(&self) -> DateTime<Local>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> DateTime<Local> {
		Local::now()
	}
}

#[derive(Clone)]
pub struct WarningLedger {
	store: Store,
	clock: Arc<dyn Clock>,
}

impl WarningLedger {
	pub fn new(store: Store) -> Self {
		Self::with_clock(store, Arc::new(SystemClock))
	}

	pub fn with_clock(store: Store, clock: Arc<dyn Clock>) -> Self {
		Self { store, clock }
	}

	pub async fn initialize(&self) -> Result<(), StoreError> {
		self.store.initialize(WARNINGS_MIGRATIONS).await
	}

	/// Records a new warning and returns the stored row.
	///
	/// The ID's suffix is one more than the number of warnings this user already has from the same second. The
	/// count and the insert share one write-locked transaction, so concurrent warnings for a user can't be handed
	/// the same ID; if the computed ID is still taken (an earlier warning from that second was cleared
	/// individually), the suffix keeps counting up until a free one is found.
	pub async fn add_warning(
		&self,
		user: Id<UserMarker>,
		reason: &str,
		moderator: Id<UserMarker>,
	) -> Result<Warning, StoreError> {
		let time_str = self.clock.now().format(WARNING_TIME_FORMAT).to_string();
		let clock = Arc::clone(&self.clock);
		let db_user_id = database_id_from_discord_id(user.get());
		let db_moderator_id = database_id_from_discord_id(moderator.get());
		let reason = reason.to_owned();

		let warning = self
			.store
			.run(move |db_connection| {
				let warning = db_connection.immediate_transaction(|db_connection| {
					let same_second: i64 = warnings::table
						.filter(warnings::user_id.eq(db_user_id))
						.filter(warnings::warning_id.like(format!("{}-%", time_str)))
						.count()
						.get_result(db_connection)?;

					let mut increment = same_second + 1;
					loop {
						let new_warning = Warning {
							user_id: db_user_id,
							warning_id: format!("{}-{}", time_str, increment),
							issued_at: clock.now().timestamp(),
							reason: reason.clone(),
							moderator_id: db_moderator_id,
						};
						let insert_result = diesel::insert_into(warnings::table)
							.values(&new_warning)
							.execute(db_connection);
						match insert_result {
							Ok(_) => break Ok::<Warning, DbError>(new_warning),
							Err(DbError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => increment += 1,
							Err(error) => break Err(error),
						}
					}
				})?;
				Ok(warning)
			})
			.await?;

		tracing::info!(
			user = %user,
			moderator = %moderator,
			warning_id = %warning.warning_id,
			"Recorded warning"
		);
		Ok(warning)
	}

	/// Removes one warning (when `warning_id` is given) or every warning for the user.
	///
	/// Returns whether anything was removed. Nothing matching is not an error.
	pub async fn clear_warning(&self, user: Id<UserMarker>, warning_id: Option<&str>) -> Result<bool, StoreError> {
		let db_user_id = database_id_from_discord_id(user.get());
		let warning_id = warning_id.map(str::to_owned);

		let deleted = self
			.store
			.run(move |db_connection| {
				let deleted = match warning_id {
					Some(warning_id) => diesel::delete(warnings::table)
						.filter(warnings::user_id.eq(db_user_id))
						.filter(warnings::warning_id.eq(warning_id))
						.execute(db_connection)?,
					None => diesel::delete(warnings::table)
						.filter(warnings::user_id.eq(db_user_id))
						.execute(db_connection)?,
				};
				Ok(deleted)
			})
			.await?;

		tracing::debug!(user = %user, deleted, "Cleared warnings");
		Ok(deleted > 0)
	}

	/// Lists a user's warnings sorted by warning ID as a string.
	///
	/// This is not chronological: the ID leads with the day, so warnings from different days or months sort by
	/// day-of-month first, and a `-10` suffix sorts ahead of `-9`.
	pub async fn get_warnings(&self, user: Id<UserMarker>) -> Result<Vec<Warning>, StoreError> {
		let db_user_id = database_id_from_discord_id(user.get());
		self.store
			.run(move |db_connection| {
				let user_warnings: Vec<Warning> = warnings::table
					.filter(warnings::user_id.eq(db_user_id))
					.order(warnings::warning_id.asc())
					.select(Warning::as_select())
					.load(db_connection)?;
				Ok(user_warnings)
			})
			.await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::database::test_support::TempStore;
	use chrono::{TimeDelta, TimeZone};
	use std::sync::Mutex;
	use std::sync::atomic::{AtomicUsize, Ordering};

	/// A clock that only moves when told to.
	struct FixedClock(Mutex<DateTime<Local>>);

	impl FixedClock {
		fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Arc<Self> {
			let time = Local
				.with_ymd_and_hms(year, month, day, hour, minute, second)
				.earliest()
				.unwrap();
			Arc::new(Self(Mutex::new(time)))
		}

		fn set(&self, time: DateTime<Local>) {
			*self.0.lock().unwrap() = time;
		}
	}

	impl Clock for FixedClock {
		fn now(&self) -> DateTime<Local> {
			*self.0.lock().unwrap()
		}
	}

	/// A clock that moves forward by a fixed step every time it's read.
	struct SteppingClock {
		next: Mutex<DateTime<Local>>,
		step: TimeDelta,
		reads: AtomicUsize,
	}

	impl Clock for SteppingClock {
		fn now(&self) -> DateTime<Local> {
			self.reads.fetch_add(1, Ordering::SeqCst);
			let mut next = self.next.lock().unwrap();
			let now = *next;
			*next = now + self.step;
			now
		}
	}

	async fn ledger_at(temp: &TempStore, clock: Arc<FixedClock>) -> WarningLedger {
		let ledger = WarningLedger::with_clock(temp.store.clone(), clock);
		ledger.initialize().await.unwrap();
		ledger
	}

	#[tokio::test]
	async fn warnings_in_the_same_second_get_increasing_suffixes() {
		let temp = TempStore::new("ledger-suffix");
		let ledger = ledger_at(&temp, FixedClock::at(2025, 3, 14, 9, 26, 53)).await;
		let user = Id::new(42);
		let moderator = Id::new(7);

		for _ in 0..3 {
			ledger.add_warning(user, "spam", moderator).await.unwrap();
		}

		let ids: Vec<String> = ledger
			.get_warnings(user)
			.await
			.unwrap()
			.into_iter()
			.map(|warning| warning.warning_id)
			.collect();
		assert_eq!(ids, ["140325-09-26-53-1", "140325-09-26-53-2", "140325-09-26-53-3"]);
	}

	#[tokio::test]
	async fn suffixes_are_counted_per_user() {
		let temp = TempStore::new("ledger-per-user");
		let ledger = ledger_at(&temp, FixedClock::at(2025, 3, 14, 9, 26, 53)).await;

		ledger.add_warning(Id::new(1), "one", Id::new(7)).await.unwrap();
		let other = ledger.add_warning(Id::new(2), "two", Id::new(7)).await.unwrap();

		assert_eq!(other.warning_id, "140325-09-26-53-1");
	}

	#[tokio::test]
	async fn suffix_skips_ids_left_behind_by_a_targeted_clear() {
		let temp = TempStore::new("ledger-gap");
		let ledger = ledger_at(&temp, FixedClock::at(2025, 3, 14, 9, 26, 53)).await;
		let user = Id::new(42);

		ledger.add_warning(user, "a", Id::new(7)).await.unwrap();
		ledger.add_warning(user, "b", Id::new(7)).await.unwrap();
		assert!(ledger.clear_warning(user, Some("140325-09-26-53-1")).await.unwrap());

		let third = ledger.add_warning(user, "c", Id::new(7)).await.unwrap();
		assert_eq!(third.warning_id, "140325-09-26-53-3");
	}

	#[tokio::test]
	async fn concurrent_warnings_never_share_an_id() {
		let temp = TempStore::new("ledger-concurrent");
		let ledger = ledger_at(&temp, FixedClock::at(2025, 3, 14, 9, 26, 53)).await;
		let user = Id::new(42);

		let mut handles = Vec::new();
		for _ in 0..8 {
			let ledger = ledger.clone();
			handles.push(tokio::spawn(async move {
				ledger.add_warning(user, "flood", Id::new(7)).await
			}));
		}
		for handle in handles {
			handle.await.unwrap().unwrap();
		}

		let mut ids: Vec<String> = ledger
			.get_warnings(user)
			.await
			.unwrap()
			.into_iter()
			.map(|warning| warning.warning_id)
			.collect();
		ids.sort();
		ids.dedup();
		assert_eq!(ids.len(), 8);
	}

	#[tokio::test]
	async fn listing_is_lexicographic_not_chronological() {
		let temp = TempStore::new("ledger-order");
		let clock = FixedClock::at(2025, 1, 1, 0, 0, 0);
		let ledger = ledger_at(&temp, Arc::clone(&clock)).await;
		let user = Id::new(42);

		for _ in 0..10 {
			ledger.add_warning(user, "same second", Id::new(7)).await.unwrap();
		}
		let listed = ledger.get_warnings(user).await.unwrap();
		assert_eq!(listed[0].warning_id, "010125-00-00-00-1");
		assert_eq!(listed[1].warning_id, "010125-00-00-00-10");
		assert_eq!(listed[2].warning_id, "010125-00-00-00-2");

		// A later date with a smaller day of month sorts first.
		clock.set(Local.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).earliest().unwrap());
		ledger.add_warning(user, "end of january", Id::new(7)).await.unwrap();
		clock.set(Local.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).earliest().unwrap());
		ledger.add_warning(user, "start of february", Id::new(7)).await.unwrap();

		let listed = ledger.get_warnings(user).await.unwrap();
		let february = listed.iter().position(|w| w.warning_id == "010225-00-00-00-1").unwrap();
		let january = listed.iter().position(|w| w.warning_id == "310125-00-00-00-1").unwrap();
		assert!(february < january);
	}

	#[tokio::test]
	async fn targeted_clear_removes_exactly_one() {
		let temp = TempStore::new("ledger-clear-one");
		let ledger = ledger_at(&temp, FixedClock::at(2025, 6, 2, 18, 0, 5)).await;
		let user = Id::new(42);

		let first = ledger.add_warning(user, "first", Id::new(7)).await.unwrap();
		ledger.add_warning(user, "second", Id::new(7)).await.unwrap();

		assert!(ledger.clear_warning(user, Some(&first.warning_id)).await.unwrap());
		assert!(!ledger.clear_warning(user, Some(&first.warning_id)).await.unwrap());

		let remaining = ledger.get_warnings(user).await.unwrap();
		assert_eq!(remaining.len(), 1);
		assert_eq!(remaining[0].reason, "second");
	}

	#[tokio::test]
	async fn targeted_clear_only_matches_the_given_user() {
		let temp = TempStore::new("ledger-clear-other");
		let ledger = ledger_at(&temp, FixedClock::at(2025, 6, 2, 18, 0, 5)).await;

		let warning = ledger.add_warning(Id::new(1), "mine", Id::new(7)).await.unwrap();
		assert!(!ledger.clear_warning(Id::new(2), Some(&warning.warning_id)).await.unwrap());
		assert_eq!(ledger.get_warnings(Id::new(1)).await.unwrap().len(), 1);
	}

	#[tokio::test]
	async fn bulk_clear_reports_whether_anything_existed() {
		let temp = TempStore::new("ledger-clear-all");
		let ledger = ledger_at(&temp, FixedClock::at(2025, 6, 2, 18, 0, 5)).await;
		let user = Id::new(42);
		let bystander = Id::new(43);

		assert!(!ledger.clear_warning(user, None).await.unwrap());

		ledger.add_warning(user, "a", Id::new(7)).await.unwrap();
		ledger.add_warning(user, "b", Id::new(7)).await.unwrap();
		ledger.add_warning(bystander, "c", Id::new(7)).await.unwrap();

		assert!(ledger.clear_warning(user, None).await.unwrap());
		assert!(ledger.get_warnings(user).await.unwrap().is_empty());
		assert_eq!(ledger.get_warnings(bystander).await.unwrap().len(), 1);
	}

	#[tokio::test]
	async fn stored_row_keeps_all_fields() {
		let temp = TempStore::new("ledger-row");
		let clock = FixedClock::at(2025, 6, 2, 18, 0, 5);
		let expected_epoch = clock.now().timestamp();
		let ledger = ledger_at(&temp, clock).await;

		ledger.add_warning(Id::new(42), "spam", Id::new(7)).await.unwrap();

		let listed = ledger.get_warnings(Id::new(42)).await.unwrap();
		assert_eq!(
			listed,
			[Warning {
				user_id: 42,
				warning_id: String::from("020625-18-00-05-1"),
				issued_at: expected_epoch,
				reason: String::from("spam"),
				moderator_id: 7,
			}]
		);
		assert_eq!(listed[0].get_moderator(), Id::new(7));
	}

	#[tokio::test]
	async fn id_and_issued_at_come_from_separate_clock_reads() {
		let temp = TempStore::new("ledger-two-reads");
		let start = Local
			.with_ymd_and_hms(2025, 1, 1, 23, 59, 59)
			.earliest()
			.unwrap() + TimeDelta::milliseconds(500);
		let clock = Arc::new(SteppingClock {
			next: Mutex::new(start),
			step: TimeDelta::milliseconds(600),
			reads: AtomicUsize::new(0),
		});
		let ledger = WarningLedger::with_clock(temp.store.clone(), clock.clone());
		ledger.initialize().await.unwrap();

		let warning = ledger.add_warning(Id::new(42), "spam", Id::new(7)).await.unwrap();

		// The first read names the warning; the second, now past midnight, stamps it.
		assert_eq!(warning.warning_id, "010125-23-59-59-1");
		assert_eq!(warning.issued_at, (start + TimeDelta::milliseconds(600)).timestamp());
		assert_eq!(warning.issued_at, start.timestamp() + 1);
		assert_eq!(clock.reads.load(Ordering::SeqCst), 2);

		let stored = ledger.get_warnings(Id::new(42)).await.unwrap();
		assert_eq!(stored, [warning]);
	}
}
