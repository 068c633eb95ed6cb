//! Availability checking and atomic reservation creation.

use chrono::NaiveDateTime;
use std::time::Duration;

use super::interval::parse_instant;
use super::policy::{CapacityPolicy, RestaurantConfig};
use super::store::{NewReservation, ReservationStore, ReservationTransaction, StoreError};
use super::verdict::Verdict;
use crate::services::timezone::RestaurantClock;
use crate::utils::logging::log_database_error;

/// Retry budget for serialization conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_step: Duration,
}

impl RetryPolicy {
    /// Linear backoff: the delay after zero-based attempt `n` is `(n + 1) * step`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_step * (attempt + 1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_millis(100),
        }
    }
}

/// Customer details for a booking request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub user_id: i64,
    pub name: String,
    pub phone: String,
}

enum CommitOutcome {
    Created(i64),
    Rejected(Verdict),
}

pub struct ReservationEngine<S> {
    store: S,
    policy: CapacityPolicy,
    clock: RestaurantClock,
    retry: RetryPolicy,
}

impl<S: ReservationStore> ReservationEngine<S> {
    pub fn new(store: S, config: RestaurantConfig, clock: RestaurantClock) -> Self {
        Self {
            store,
            policy: CapacityPolicy::new(config),
            clock,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn policy(&self) -> &CapacityPolicy {
        &self.policy
    }

    pub fn clock(&self) -> RestaurantClock {
        self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Checks whether a party of `guests_count` can be seated at the given
    /// date and time, reading a fresh, unlocked snapshot of the day.
    ///
    /// Suitable for pre-flight feedback only; [`Self::create_reservation`]
    /// repeats the check under the booking lock.
    pub async fn check_availability(&self, date_text: &str, time_text: &str, guests_count: i64) -> Verdict {
        let requested = match self.prepare(date_text, time_text, guests_count) {
            Ok(requested) => requested,
            Err(verdict) => return verdict,
        };

        match self.store.fetch_active_for_date(requested.date()).await {
            Ok(existing) => self.policy.evaluate_overlap(requested, guests_count, &existing),
            Err(e) => {
                log_database_error("SELECT", "reservations", &e.to_string(), Some(&format!("{date_text} {time_text}")));
                Verdict::Error { message: e.to_string() }
            }
        }
    }

    /// Creates a `pending` reservation if the slot is still available.
    ///
    /// Returns `None` when the slot is unavailable, when every attempt lost a
    /// serialization conflict, or on any other store failure.
    pub async fn create_reservation(
        &self,
        customer: &Customer,
        date_text: &str,
        time_text: &str,
        guests_count: i64,
    ) -> Option<i64> {
        for attempt in 0..self.retry.max_attempts {
            tracing::debug!(
                "Booking attempt {}/{} for user {}: {} {} x{}",
                attempt + 1,
                self.retry.max_attempts,
                customer.user_id,
                date_text,
                time_text,
                guests_count
            );

            match self.try_commit(customer, date_text, time_text, guests_count).await {
                Ok(CommitOutcome::Created(id)) => {
                    tracing::info!(
                        "Reservation #{} created for user {} on {} at {} ({} guests)",
                        id, customer.user_id, date_text, time_text, guests_count
                    );
                    return Some(id);
                }
                Ok(CommitOutcome::Rejected(verdict)) => {
                    tracing::warn!(
                        "Reservation for user {} on {} at {} no longer available: {}",
                        customer.user_id, date_text, time_text, verdict.reason()
                    );
                    return None;
                }
                Err(StoreError::Conflict(message)) => {
                    if attempt + 1 >= self.retry.max_attempts {
                        tracing::error!(
                            "Max retries ({}) exceeded for reservation by user {} on {} at {}: {}",
                            self.retry.max_attempts, customer.user_id, date_text, time_text, message
                        );
                        return None;
                    }
                    let wait = self.retry.backoff(attempt);
                    tracing::info!(
                        "Retrying reservation after serialization conflict (attempt {}, waiting {}ms): {}",
                        attempt + 1,
                        wait.as_millis(),
                        message
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(e) => {
                    log_database_error(
                        "BOOK",
                        "reservations",
                        &e.to_string(),
                        Some(&format!(
                            "attempt {} user {} {} {} x{}",
                            attempt + 1,
                            customer.user_id,
                            date_text,
                            time_text,
                            guests_count
                        )),
                    );
                    return None;
                }
            }
        }

        None
    }

    /// One transactional attempt. The transaction is committed only when a
    /// row was inserted; every other path rolls it back.
    async fn try_commit(
        &self,
        customer: &Customer,
        date_text: &str,
        time_text: &str,
        guests_count: i64,
    ) -> Result<CommitOutcome, StoreError> {
        let mut tx = self.store.begin_exclusive().await?;

        match self
            .decide_and_insert(tx.as_mut(), customer, date_text, time_text, guests_count)
            .await
        {
            Ok(CommitOutcome::Created(id)) => {
                tx.commit().await?;
                Ok(CommitOutcome::Created(id))
            }
            Ok(rejected) => {
                abandon(tx).await;
                Ok(rejected)
            }
            Err(e) => {
                abandon(tx).await;
                Err(e)
            }
        }
    }

    async fn decide_and_insert(
        &self,
        tx: &mut dyn ReservationTransaction,
        customer: &Customer,
        date_text: &str,
        time_text: &str,
        guests_count: i64,
    ) -> Result<CommitOutcome, StoreError> {
        let requested = match self.prepare(date_text, time_text, guests_count) {
            Ok(requested) => requested,
            Err(verdict) => return Ok(CommitOutcome::Rejected(verdict)),
        };

        let existing = tx.fetch_active_for_date(requested.date()).await?;
        let verdict = self.policy.evaluate_overlap(requested, guests_count, &existing);
        if !verdict.is_available() {
            return Ok(CommitOutcome::Rejected(verdict));
        }

        let id = tx
            .insert(&NewReservation {
                user_id: customer.user_id,
                date: requested.date(),
                time: requested.time(),
                guests_count,
                customer_name: customer.name.clone(),
                customer_phone: customer.phone.clone(),
                notes: None,
            })
            .await?;

        Ok(CommitOutcome::Created(id))
    }

    /// Parses the request and applies the basic conditions. `Err` carries
    /// the rejecting verdict.
    fn prepare(&self, date_text: &str, time_text: &str, guests_count: i64) -> Result<NaiveDateTime, Verdict> {
        let requested = parse_instant(date_text, time_text).map_err(|e| {
            tracing::warn!("Rejected reservation input '{} {}': {}", date_text, time_text, e);
            Verdict::Error { message: e.to_string() }
        })?;

        let basic = self
            .policy
            .check_basic_conditions(requested, guests_count, self.clock.now());
        if !basic.is_available() {
            return Err(basic);
        }

        Ok(requested)
    }
}

async fn abandon(tx: Box<dyn ReservationTransaction>) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!("Failed to roll back reservation transaction: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retry_schedule() {
        let retry = RetryPolicy::default();
        assert_eq!(retry.max_attempts, 3);
        let schedule: Vec<u128> = (0..retry.max_attempts).map(|a| retry.backoff(a).as_millis()).collect();
        assert_eq!(schedule, vec![100, 200, 300]);
    }
}
