use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::errors::{CoreError, CoreResult};
use crate::domain::repositories::users::UserRepository;
use crate::domain::value_objects::quotas::{QuotaDimension, QuotaLimits, Reservation};

/// Handles whose release reached storage, newest last. Older entries are
/// evicted once the window is full; duplicate releases of an evicted handle
/// fall through to the storage-level underflow guard.
const RELEASED_WINDOW: usize = 4096;

#[derive(Default)]
struct ReleasedWindow {
    set: HashSet<Uuid>,
    order: VecDeque<Uuid>,
}

impl ReleasedWindow {
    /// Records the handle; false when it was already present.
    fn insert(&mut self, id: Uuid) -> bool {
        if !self.set.insert(id) {
            return false;
        }
        self.order.push_back(id);
        while self.order.len() > RELEASED_WINDOW {
            if let Some(evicted) = self.order.pop_front() {
                self.set.remove(&evicted);
            }
        }
        true
    }

    /// Forgets a handle whose storage release did not go through.
    fn remove(&mut self, id: Uuid) {
        if self.set.remove(&id) {
            self.order.retain(|entry| *entry != id);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.set.len()
    }
}

/// Single point of truth for quota mutation. Every debit goes through the
/// repository's conditional update, so concurrent reservations against the
/// same user can never overcommit the balance.
pub struct QuotaLedger<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    released: Mutex<ReleasedWindow>,
}

impl<U> QuotaLedger<U>
where
    U: UserRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self {
            user_repo,
            released: Mutex::new(ReleasedWindow::default()),
        }
    }

    /// Debits `amount` from the dimension, failing with `InsufficientQuota`
    /// when `used + amount` would exceed the limit. Returns the handle the
    /// caller needs to release the debit again.
    pub async fn reserve(
        &self,
        user_id: Uuid,
        dimension: QuotaDimension,
        amount: i32,
    ) -> CoreResult<Reservation> {
        if amount <= 0 {
            return Err(CoreError::Internal(anyhow::anyhow!(
                "reservation amount must be positive, got {amount}"
            )));
        }

        let reserved = self
            .user_repo
            .try_reserve_quota(user_id, dimension, amount)
            .await?;

        if !reserved {
            let user = self
                .user_repo
                .find_by_id(user_id)
                .await?
                .ok_or(CoreError::UserNotFound)?;
            let remaining = match dimension {
                QuotaDimension::Credit => user.remaining_credit(),
                QuotaDimension::Capacity => user.remaining_capacity(),
            };
            warn!(
                %user_id,
                %dimension,
                requested = amount,
                remaining,
                "quota_ledger: reservation refused"
            );
            return Err(CoreError::InsufficientQuota {
                dimension,
                requested: amount,
                remaining,
            });
        }

        let reservation = Reservation {
            id: Uuid::new_v4(),
            user_id,
            dimension,
            amount,
        };
        debug!(
            %user_id,
            %dimension,
            amount,
            reservation_id = %reservation.id,
            "quota_ledger: reserved"
        );
        Ok(reservation)
    }

    /// Credits a reservation back. Idempotent: a handle that was already
    /// released is silently ignored so callers may retry. A handle is only
    /// recorded as released once the storage credit went through, so a retry
    /// after a transient repository error completes the refund instead of
    /// skipping it.
    pub async fn release(&self, reservation: &Reservation) -> CoreResult<()> {
        if !self.released_window()?.insert(reservation.id) {
            debug!(
                reservation_id = %reservation.id,
                "quota_ledger: reservation already released"
            );
            return Ok(());
        }

        let released = match self
            .user_repo
            .release_quota(reservation.user_id, reservation.dimension, reservation.amount)
            .await
        {
            Ok(released) => released,
            Err(err) => {
                // The refund did not reach storage; the handle must stay
                // retryable.
                self.released_window()?.remove(reservation.id);
                return Err(err.into());
            }
        };
        if !released {
            // The used counter was already below the reserved amount, which
            // can only happen when a cycle reset ran in between. The reset
            // already zeroed the counter, so there is nothing left to refund.
            warn!(
                user_id = %reservation.user_id,
                dimension = %reservation.dimension,
                amount = reservation.amount,
                reservation_id = %reservation.id,
                "quota_ledger: release skipped, counter already reset"
            );
        }
        Ok(())
    }

    fn released_window(&self) -> CoreResult<std::sync::MutexGuard<'_, ReleasedWindow>> {
        self.released
            .lock()
            .map_err(|_| CoreError::Internal(anyhow::anyhow!("released window poisoned")))
    }

    #[cfg(test)]
    fn released_len(&self) -> usize {
        self.released.lock().unwrap().len()
    }

    /// Replaces both limits, zeroes both used counters and stamps the reset
    /// time. Only the billing cycle manager calls this.
    pub async fn reset_cycle(&self, user_id: Uuid, limits: QuotaLimits) -> CoreResult<()> {
        let reset_at = Utc::now();
        self.user_repo
            .reset_quota_cycle(user_id, limits.credit, limits.capacity, reset_at)
            .await?;
        info!(
            %user_id,
            credit = limits.credit,
            capacity = limits.capacity,
            "quota_ledger: cycle reset"
        );
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    use crate::domain::entities::users::UserEntity;
    use crate::domain::repositories::users::UserRepository;
    use crate::domain::value_objects::enums::statuses::Status;
    use crate::domain::value_objects::quotas::QuotaDimension;

    /// Stateful fake with the same compare-and-set semantics the postgres
    /// repository provides via conditional UPDATEs.
    pub(crate) struct InMemoryUserRepository {
        users: Mutex<HashMap<Uuid, UserEntity>>,
    }

    impl InMemoryUserRepository {
        pub(crate) fn with_user(user: UserEntity) -> Self {
            let mut users = HashMap::new();
            users.insert(user.id, user);
            Self {
                users: Mutex::new(users),
            }
        }

        pub(crate) fn snapshot(&self, user_id: Uuid) -> UserEntity {
            self.users.lock().unwrap().get(&user_id).unwrap().clone()
        }
    }

    pub(crate) fn sample_user(credit: i32, credit_used: i32) -> UserEntity {
        let now = Utc::now();
        UserEntity {
            id: Uuid::new_v4(),
            email: "creator@example.com".to_string(),
            username: "creator".to_string(),
            credit,
            credit_used,
            capacity: 5,
            capacity_used: 0,
            last_reset_date: None,
            status: Status::Active.to_string(),
            pricing_plan_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Delegates to the in-memory repository but fails the first
    /// `release_quota` calls with a transient error.
    pub(crate) struct FlakyReleaseRepo {
        inner: Arc<InMemoryUserRepository>,
        failures_left: Mutex<u32>,
    }

    impl FlakyReleaseRepo {
        pub(crate) fn failing_once(inner: Arc<InMemoryUserRepository>) -> Self {
            Self {
                inner,
                failures_left: Mutex::new(1),
            }
        }
    }

    #[async_trait]
    impl UserRepository for FlakyReleaseRepo {
        async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>> {
            self.inner.find_by_id(user_id).await
        }

        async fn try_reserve_quota(
            &self,
            user_id: Uuid,
            dimension: QuotaDimension,
            amount: i32,
        ) -> Result<bool> {
            self.inner.try_reserve_quota(user_id, dimension, amount).await
        }

        async fn release_quota(
            &self,
            user_id: Uuid,
            dimension: QuotaDimension,
            amount: i32,
        ) -> Result<bool> {
            {
                let mut failures_left = self.failures_left.lock().unwrap();
                if *failures_left > 0 {
                    *failures_left -= 1;
                    anyhow::bail!("connection reset by peer");
                }
            }
            self.inner.release_quota(user_id, dimension, amount).await
        }

        async fn reset_quota_cycle(
            &self,
            user_id: Uuid,
            credit: i32,
            capacity: i32,
            reset_at: DateTime<Utc>,
        ) -> Result<()> {
            self.inner
                .reset_quota_cycle(user_id, credit, capacity, reset_at)
                .await
        }

        async fn set_pricing_plan(&self, user_id: Uuid, plan_id: Option<Uuid>) -> Result<()> {
            self.inner.set_pricing_plan(user_id, plan_id).await
        }
    }

    #[async_trait]
    impl UserRepository for InMemoryUserRepository {
        async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>> {
            Ok(self.users.lock().unwrap().get(&user_id).cloned())
        }

        async fn try_reserve_quota(
            &self,
            user_id: Uuid,
            dimension: QuotaDimension,
            amount: i32,
        ) -> Result<bool> {
            let mut users = self.users.lock().unwrap();
            let Some(user) = users.get_mut(&user_id) else {
                return Ok(false);
            };
            let (used, limit) = match dimension {
                QuotaDimension::Credit => (&mut user.credit_used, user.credit),
                QuotaDimension::Capacity => (&mut user.capacity_used, user.capacity),
            };
            if *used + amount > limit {
                return Ok(false);
            }
            *used += amount;
            Ok(true)
        }

        async fn release_quota(
            &self,
            user_id: Uuid,
            dimension: QuotaDimension,
            amount: i32,
        ) -> Result<bool> {
            let mut users = self.users.lock().unwrap();
            let Some(user) = users.get_mut(&user_id) else {
                return Ok(false);
            };
            let used = match dimension {
                QuotaDimension::Credit => &mut user.credit_used,
                QuotaDimension::Capacity => &mut user.capacity_used,
            };
            if *used < amount {
                return Ok(false);
            }
            *used -= amount;
            Ok(true)
        }

        async fn reset_quota_cycle(
            &self,
            user_id: Uuid,
            credit: i32,
            capacity: i32,
            reset_at: DateTime<Utc>,
        ) -> Result<()> {
            let mut users = self.users.lock().unwrap();
            if let Some(user) = users.get_mut(&user_id) {
                user.credit = credit;
                user.capacity = capacity;
                user.credit_used = 0;
                user.capacity_used = 0;
                user.last_reset_date = Some(reset_at);
            }
            Ok(())
        }

        async fn set_pricing_plan(&self, user_id: Uuid, plan_id: Option<Uuid>) -> Result<()> {
            let mut users = self.users.lock().unwrap();
            if let Some(user) = users.get_mut(&user_id) {
                user.pricing_plan_id = plan_id;
            }
            Ok(())
        }
    }
}
