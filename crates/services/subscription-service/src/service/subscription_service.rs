//! Subscription service - sustaining members, free hours and payments.
//!
//! A user is a sustaining member when they hold the role or have a recent
//! qualifying recurring payment. Upgrades are reported as an explicit
//! `bool` meaning "the role was granted by this call".

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{
    current_period_start, is_in_current_period, next_period_start, NewReservation,
    NewTransaction, Reservation, Role, SubscriptionPolicy, SubscriptionStats, SubscriptionSummary,
    Transaction, TransactionOutcome, User, MIN_NAME_LENGTH,
};

use crate::repository::{ReservationRepository, RoleStore, TransactionRepository, UserRepository};

/// Subscription service trait for dependency injection.
#[async_trait]
pub trait SubscriptionService: Send + Sync {
    /// Register a user with the member role
    async fn register_user(&self, email: String, name: String) -> AppResult<User>;

    /// Get user by ID
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// Get user by email
    async fn get_user_by_email(&self, email: &str) -> AppResult<User>;

    /// Role holder, or a qualifying recurring payment inside the window
    async fn is_sustaining_member(&self, user: &User) -> AppResult<bool>;

    /// Whole free hours a payment amount is worth
    fn calculate_free_hours(&self, amount: Decimal) -> u32;

    /// Monthly allocation: the policy value when sustaining, else 0
    async fn user_monthly_free_hours(&self, user: &User) -> AppResult<u32>;

    /// Monthly allocation minus free hours used this calendar month
    async fn remaining_free_hours(&self, user: &User) -> AppResult<Decimal>;

    /// Upgrade the payer if the payment qualifies; true when upgraded
    async fn process_transaction(&self, transaction: &Transaction) -> AppResult<bool>;

    /// Grant the sustaining role; false when the user already holds it
    async fn upgrade_to_sustaining_member(
        &self,
        user: &User,
        transaction: &Transaction,
    ) -> AppResult<bool>;

    /// Store a payment and process it
    async fn record_transaction(&self, transaction: NewTransaction) -> AppResult<TransactionOutcome>;

    /// Store a reservation against the user's free hours
    async fn record_reservation(
        &self,
        user: &User,
        reservation: NewReservation,
    ) -> AppResult<Reservation>;

    /// Sustaining flag, allocation and remaining hours together
    async fn subscription_summary(&self, user: &User) -> AppResult<SubscriptionSummary>;

    /// Collective-wide snapshot
    async fn subscription_stats(&self) -> AppResult<SubscriptionStats>;
}

/// Concrete implementation of SubscriptionService using repositories.
pub struct SubscriptionManager {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleStore>,
    transactions: Arc<dyn TransactionRepository>,
    reservations: Arc<dyn ReservationRepository>,
    policy: SubscriptionPolicy,
}

impl SubscriptionManager {
    /// Create new subscription service instance with repositories
    pub fn new(
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleStore>,
        transactions: Arc<dyn TransactionRepository>,
        reservations: Arc<dyn ReservationRepository>,
        policy: SubscriptionPolicy,
    ) -> Self {
        Self {
            users,
            roles,
            transactions,
            reservations,
            policy,
        }
    }

    pub fn policy(&self) -> &SubscriptionPolicy {
        &self.policy
    }

    /// Allocation left after this calendar month's usage, floored at zero
    async fn remaining_of(&self, user_id: Uuid, allocation: u32) -> AppResult<Decimal> {
        if allocation == 0 {
            return Ok(Decimal::ZERO);
        }

        let now = Utc::now();
        let used = self
            .reservations
            .free_hours_used_between(user_id, current_period_start(now), next_period_start(now))
            .await?;

        Ok((Decimal::from(allocation) - used).max(Decimal::ZERO))
    }
}

/// Emails are compared case-insensitively
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl SubscriptionService for SubscriptionManager {
    async fn register_user(&self, email: String, name: String) -> AppResult<User> {
        let email = normalize_email(&email);
        let name = name.trim().to_string();
        if !email.contains('@') {
            return Err(AppError::validation("Invalid email address"));
        }
        if name.chars().count() < MIN_NAME_LENGTH {
            return Err(AppError::validation("Name cannot be empty"));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Email"));
        }

        let user = self.users.create(email, name).await?;
        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.users.find_by_id(id).await?.ok_or_not_found("User")
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<User> {
        self.users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_not_found("User")
    }

    async fn is_sustaining_member(&self, user: &User) -> AppResult<bool> {
        if self.roles.has(user.id, Role::SustainingMember).await? {
            return Ok(true);
        }

        let now = Utc::now();
        self.transactions
            .has_qualifying(
                &normalize_email(&user.email),
                self.policy.minimum_qualifying_amount,
                self.policy.window_start(now),
                now,
            )
            .await
    }

    fn calculate_free_hours(&self, amount: Decimal) -> u32 {
        self.policy.calculate_free_hours(amount)
    }

    async fn user_monthly_free_hours(&self, user: &User) -> AppResult<u32> {
        let sustaining = self.is_sustaining_member(user).await?;
        Ok(self.policy.monthly_allocation(sustaining))
    }

    async fn remaining_free_hours(&self, user: &User) -> AppResult<Decimal> {
        let allocation = self.user_monthly_free_hours(user).await?;
        self.remaining_of(user.id, allocation).await
    }

    async fn process_transaction(&self, transaction: &Transaction) -> AppResult<bool> {
        let user = self
            .users
            .find_by_email(&normalize_email(&transaction.email))
            .await?
            .ok_or_else(|| AppError::UserNotFound(transaction.email.clone()))?;

        if !self.policy.qualifies(transaction.kind, transaction.amount) {
            debug!(transaction_id = %transaction.id, "Transaction does not qualify for upgrade");
            return Ok(false);
        }
        if !self.policy.is_within_window(transaction.occurred_at, Utc::now()) {
            debug!(transaction_id = %transaction.id, "Transaction is outside the qualifying window");
            return Ok(false);
        }

        self.upgrade_to_sustaining_member(&user, transaction).await
    }

    async fn upgrade_to_sustaining_member(
        &self,
        user: &User,
        transaction: &Transaction,
    ) -> AppResult<bool> {
        if self.roles.has(user.id, Role::SustainingMember).await? {
            debug!(user_id = %user.id, "Already a sustaining member");
            return Ok(false);
        }

        let assigned = self.roles.assign(user.id, Role::SustainingMember).await?;
        if assigned {
            info!(
                user_id = %user.id,
                transaction_id = %transaction.id,
                amount = %transaction.amount,
                "Upgraded to sustaining member"
            );
        }
        Ok(assigned)
    }

    async fn record_transaction(&self, transaction: NewTransaction) -> AppResult<TransactionOutcome> {
        if transaction.amount.is_sign_negative() {
            return Err(AppError::validation("Transaction amount cannot be negative"));
        }

        let transaction = self
            .transactions
            .create(NewTransaction {
                email: normalize_email(&transaction.email),
                ..transaction
            })
            .await?;

        let upgraded = match self.process_transaction(&transaction).await {
            Ok(upgraded) => upgraded,
            Err(AppError::UserNotFound(email)) => {
                info!(%email, "Payment stored before registration");
                false
            }
            Err(e) => return Err(e),
        };

        Ok(TransactionOutcome {
            transaction,
            upgraded,
        })
    }

    async fn record_reservation(
        &self,
        user: &User,
        reservation: NewReservation,
    ) -> AppResult<Reservation> {
        reservation.validate()?;

        if reservation.free_hours_used.is_zero() {
            return self.reservations.create(user.id, reservation).await;
        }

        let now = Utc::now();
        if let Some(reserved_at) = reservation.reserved_at {
            if !is_in_current_period(reserved_at, now) {
                return Err(AppError::validation(
                    "Free hours can only be used within the current month",
                ));
            }
        }

        let allocation = self.user_monthly_free_hours(user).await?;
        let requested = reservation.free_hours_used;
        let created = self
            .reservations
            .create_within_allowance(
                user.id,
                reservation,
                current_period_start(now),
                next_period_start(now),
                Decimal::from(allocation),
            )
            .await?;

        match created {
            Some(reservation) => Ok(reservation),
            None => {
                let remaining = self.remaining_of(user.id, allocation).await?;
                warn!(
                    user_id = %user.id,
                    %requested,
                    %remaining,
                    "Free hours exceed remaining allocation"
                );
                Err(AppError::validation(format!(
                    "Only {} free hours remain this month",
                    remaining
                )))
            }
        }
    }

    async fn subscription_summary(&self, user: &User) -> AppResult<SubscriptionSummary> {
        let is_sustaining_member = self.is_sustaining_member(user).await?;
        let monthly_free_hours = self.policy.monthly_allocation(is_sustaining_member);
        let remaining_free_hours = self.remaining_of(user.id, monthly_free_hours).await?;

        Ok(SubscriptionSummary {
            user_id: user.id,
            is_sustaining_member,
            monthly_free_hours,
            remaining_free_hours,
        })
    }

    async fn subscription_stats(&self) -> AppResult<SubscriptionStats> {
        let now = Utc::now();
        let minimum = self.policy.minimum_qualifying_amount;

        let (total_users, role_holders, recent, this_month) = futures::try_join!(
            self.users.count(),
            self.roles.holders(Role::SustainingMember),
            self.transactions
                .qualifying_between(minimum, self.policy.window_start(now), now),
            self.transactions
                .qualifying_between(minimum, current_period_start(now), now),
        )?;

        let payer_emails: BTreeSet<String> = recent.into_iter().map(|t| t.email).collect();
        let payers = if payer_emails.is_empty() {
            Vec::new()
        } else {
            self.users
                .ids_by_emails(payer_emails.into_iter().collect())
                .await?
        };

        let sustaining: HashSet<Uuid> = role_holders.into_iter().chain(payers).collect();
        let monthly_revenue: Decimal = this_month.iter().map(|t| t.amount).sum();

        Ok(SubscriptionStats::compute(
            total_users,
            sustaining.len() as u64,
            monthly_revenue,
            this_month.len() as u64,
            self.policy.monthly_free_hours,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use mockall::predicate::{always, eq};
    use rust_decimal_macros::dec;

    use crate::repository::{
        MockReservationRepository, MockRoleStore, MockTransactionRepository, MockUserRepository,
    };
    use domain::TransactionType;

    fn user(email: &str) -> User {
        User::new(Uuid::new_v4(), email.to_string(), "Test User".to_string())
    }

    fn transaction(email: &str, kind: TransactionType, amount: Decimal) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            email: email.to_string(),
            kind,
            amount,
            occurred_at: Utc::now(),
        }
    }

    struct Mocks {
        users: MockUserRepository,
        roles: MockRoleStore,
        transactions: MockTransactionRepository,
        reservations: MockReservationRepository,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                users: MockUserRepository::new(),
                roles: MockRoleStore::new(),
                transactions: MockTransactionRepository::new(),
                reservations: MockReservationRepository::new(),
            }
        }

        fn build(self) -> SubscriptionManager {
            SubscriptionManager::new(
                Arc::new(self.users),
                Arc::new(self.roles),
                Arc::new(self.transactions),
                Arc::new(self.reservations),
                SubscriptionPolicy::default(),
            )
        }
    }

    #[test]
    fn free_hours_follow_policy() {
        let service = Mocks::new().build();
        assert_eq!(service.calculate_free_hours(dec!(25.00)), 5);
        assert_eq!(service.calculate_free_hours(dec!(10.00)), 2);
        assert_eq!(service.calculate_free_hours(dec!(7.50)), 1);
        assert_eq!(service.calculate_free_hours(dec!(3.00)), 0);
        assert_eq!(service.calculate_free_hours(Decimal::ZERO), 0);
    }

    #[tokio::test]
    async fn role_holder_is_sustaining() {
        let mut mocks = Mocks::new();
        mocks
            .roles
            .expect_has()
            .with(always(), eq(Role::SustainingMember))
            .returning(|_, _| Ok(true));
        mocks.transactions.expect_has_qualifying().never();

        let service = mocks.build();
        assert!(service.is_sustaining_member(&user("role@example.com")).await.unwrap());
    }

    #[tokio::test]
    async fn recent_qualifying_payment_makes_user_sustaining() {
        let mut mocks = Mocks::new();
        mocks.roles.expect_has().returning(|_, _| Ok(false));
        mocks
            .transactions
            .expect_has_qualifying()
            .withf(|email, minimum, since, until| {
                email == "payer@example.com"
                    && *minimum == dec!(5.00)
                    && *until - *since == Duration::days(30)
            })
            .returning(|_, _, _, _| Ok(true));

        let service = mocks.build();
        assert!(service
            .is_sustaining_member(&user("Payer@Example.com"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn new_user_is_not_sustaining_and_gets_no_hours() {
        let mut mocks = Mocks::new();
        mocks.roles.expect_has().returning(|_, _| Ok(false));
        mocks
            .transactions
            .expect_has_qualifying()
            .returning(|_, _, _, _| Ok(false));

        let service = mocks.build();
        let new_user = user("new@example.com");
        assert!(!service.is_sustaining_member(&new_user).await.unwrap());
        assert_eq!(service.user_monthly_free_hours(&new_user).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn sustaining_member_gets_four_hours() {
        let mut mocks = Mocks::new();
        mocks.roles.expect_has().returning(|_, _| Ok(true));

        let service = mocks.build();
        assert_eq!(
            service
                .user_monthly_free_hours(&user("role@example.com"))
                .await
                .unwrap(),
            4
        );
    }

    #[tokio::test]
    async fn remaining_hours_subtract_this_months_usage() {
        let member = user("role@example.com");
        let member_id = member.id;

        let mut mocks = Mocks::new();
        mocks.roles.expect_has().returning(|_, _| Ok(true));
        mocks
            .reservations
            .expect_free_hours_used_between()
            .withf(move |user_id, since, until| {
                let now = Utc::now();
                *user_id == member_id
                    && *since == current_period_start(now)
                    && *until == next_period_start(now)
            })
            .returning(|_, _, _| Ok(dec!(2.5)));

        let service = mocks.build();
        assert_eq!(service.remaining_free_hours(&member).await.unwrap(), dec!(1.5));
    }

    #[tokio::test]
    async fn remaining_hours_never_go_negative() {
        let mut mocks = Mocks::new();
        mocks.roles.expect_has().returning(|_, _| Ok(true));
        mocks
            .reservations
            .expect_free_hours_used_between()
            .returning(|_, _, _| Ok(dec!(6)));

        let service = mocks.build();
        assert_eq!(
            service
                .remaining_free_hours(&user("role@example.com"))
                .await
                .unwrap(),
            Decimal::ZERO
        );
    }

    #[tokio::test]
    async fn upgrade_assigns_role_once() {
        let member = user("payer@example.com");
        let payment = transaction("payer@example.com", TransactionType::Recurring, dec!(25.00));

        let mut mocks = Mocks::new();
        mocks.roles.expect_has().times(1).returning(|_, _| Ok(false));
        mocks
            .roles
            .expect_assign()
            .with(eq(member.id), eq(Role::SustainingMember))
            .times(1)
            .returning(|_, _| Ok(true));

        let service = mocks.build();
        assert!(service
            .upgrade_to_sustaining_member(&member, &payment)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn upgrade_is_idempotent_for_existing_members() {
        let member = user("payer@example.com");
        let payment = transaction("payer@example.com", TransactionType::Recurring, dec!(25.00));

        let mut mocks = Mocks::new();
        mocks.roles.expect_has().returning(|_, _| Ok(true));
        mocks.roles.expect_assign().never();

        let service = mocks.build();
        assert!(!service
            .upgrade_to_sustaining_member(&member, &payment)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn concurrent_upgrade_loser_reports_false() {
        let member = user("payer@example.com");
        let payment = transaction("payer@example.com", TransactionType::Recurring, dec!(25.00));

        let mut mocks = Mocks::new();
        mocks.roles.expect_has().returning(|_, _| Ok(false));
        mocks.roles.expect_assign().returning(|_, _| Ok(false));

        let service = mocks.build();
        assert!(!service
            .upgrade_to_sustaining_member(&member, &payment)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn qualifying_payment_upgrades_existing_user() {
        let payer = user("payer@example.com");
        let payer_id = payer.id;

        let mut mocks = Mocks::new();
        mocks
            .users
            .expect_find_by_email()
            .withf(|email| email == "payer@example.com")
            .returning(move |_| Ok(Some(payer.clone())));
        mocks.roles.expect_has().returning(|_, _| Ok(false));
        mocks
            .roles
            .expect_assign()
            .with(eq(payer_id), eq(Role::SustainingMember))
            .times(1)
            .returning(|_, _| Ok(true));

        let service = mocks.build();
        let payment = transaction("payer@example.com", TransactionType::Recurring, dec!(25.00));
        assert!(service.process_transaction(&payment).await.unwrap());
    }

    #[tokio::test]
    async fn minimum_amount_payment_does_not_upgrade() {
        let payer = user("payer@example.com");

        let mut mocks = Mocks::new();
        mocks
            .users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(payer.clone())));
        mocks.roles.expect_assign().never();

        let service = mocks.build();
        let payment = transaction("payer@example.com", TransactionType::Recurring, dec!(5.00));
        assert!(!service.process_transaction(&payment).await.unwrap());
    }

    #[tokio::test]
    async fn one_time_payment_does_not_upgrade() {
        let payer = user("payer@example.com");

        let mut mocks = Mocks::new();
        mocks
            .users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(payer.clone())));
        mocks.roles.expect_assign().never();

        let service = mocks.build();
        let payment = transaction("payer@example.com", TransactionType::OneTime, dec!(50.00));
        assert!(!service.process_transaction(&payment).await.unwrap());
    }

    #[tokio::test]
    async fn stale_payment_does_not_upgrade() {
        let payer = user("payer@example.com");

        let mut mocks = Mocks::new();
        mocks
            .users
            .expect_find_by_email()
            .returning(move |_| Ok(Some(payer.clone())));
        mocks.roles.expect_has().never();
        mocks.roles.expect_assign().never();

        let service = mocks.build();
        let mut payment = transaction("payer@example.com", TransactionType::Recurring, dec!(25.00));
        payment.occurred_at = Utc::now() - Duration::days(60);
        assert!(!service.process_transaction(&payment).await.unwrap());
    }

    #[tokio::test]
    async fn unmatched_email_is_user_not_found() {
        let mut mocks = Mocks::new();
        mocks.users.expect_find_by_email().returning(|_| Ok(None));

        let service = mocks.build();
        let payment = transaction("ghost@example.com", TransactionType::Recurring, dec!(25.00));
        let result = service.process_transaction(&payment).await;

        assert!(matches!(result, Err(AppError::UserNotFound(email)) if email == "ghost@example.com"));
    }

    #[tokio::test]
    async fn recording_payment_before_registration_keeps_it() {
        let mut mocks = Mocks::new();
        mocks
            .transactions
            .expect_create()
            .withf(|t| t.email == "early@example.com")
            .times(1)
            .returning(|t| {
                Ok(Transaction {
                    id: Uuid::new_v4(),
                    email: t.email,
                    kind: t.kind,
                    amount: t.amount,
                    occurred_at: Utc::now(),
                })
            });
        mocks.users.expect_find_by_email().returning(|_| Ok(None));

        let service = mocks.build();
        let outcome = service
            .record_transaction(NewTransaction {
                email: " Early@Example.com ".to_string(),
                kind: TransactionType::Recurring,
                amount: dec!(25.00),
                occurred_at: None,
            })
            .await
            .unwrap();

        assert!(!outcome.upgraded);
        assert_eq!(outcome.transaction.email, "early@example.com");
    }

    #[tokio::test]
    async fn negative_payment_is_rejected() {
        let mut mocks = Mocks::new();
        mocks.transactions.expect_create().never();

        let result = mocks
            .build()
            .record_transaction(NewTransaction {
                email: "payer@example.com".to_string(),
                kind: TransactionType::Recurring,
                amount: dec!(-1),
                occurred_at: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn reservation_cannot_overspend_free_hours() {
        let mut mocks = Mocks::new();
        mocks.roles.expect_has().returning(|_, _| Ok(true));
        mocks
            .reservations
            .expect_create_within_allowance()
            .withf(|_, r, _, _, allowance| r.free_hours_used == dec!(2) && *allowance == dec!(4))
            .returning(|_, _, _, _, _| Ok(None));
        mocks
            .reservations
            .expect_free_hours_used_between()
            .returning(|_, _, _| Ok(dec!(3)));
        mocks.reservations.expect_create().never();

        let result = mocks
            .build()
            .record_reservation(
                &user("role@example.com"),
                NewReservation {
                    reserved_at: None,
                    hours_used: dec!(2),
                    free_hours_used: dec!(2),
                    cost: Decimal::ZERO,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(msg)) if msg.contains("Only 1 free hours")));
    }

    #[tokio::test]
    async fn free_hours_are_checked_and_stored_for_the_current_month() {
        let member = user("role@example.com");
        let member_id = member.id;

        let mut mocks = Mocks::new();
        mocks.roles.expect_has().returning(|_, _| Ok(true));
        mocks
            .reservations
            .expect_create_within_allowance()
            .withf(move |user_id, _, since, until, allowance| {
                let now = Utc::now();
                *user_id == member_id
                    && *since == current_period_start(now)
                    && *until == next_period_start(now)
                    && *allowance == dec!(4)
            })
            .times(1)
            .returning(|user_id, r, _, _, _| {
                Ok(Some(Reservation {
                    id: Uuid::new_v4(),
                    user_id,
                    reserved_at: Utc::now(),
                    hours_used: r.hours_used,
                    free_hours_used: r.free_hours_used,
                    cost: r.cost,
                }))
            });
        mocks.reservations.expect_create().never();

        let reservation = mocks
            .build()
            .record_reservation(
                &member,
                NewReservation {
                    reserved_at: None,
                    hours_used: dec!(2),
                    free_hours_used: dec!(1.5),
                    cost: Decimal::ZERO,
                },
            )
            .await
            .unwrap();

        assert_eq!(reservation.free_hours_used, dec!(1.5));
    }

    #[tokio::test]
    async fn free_hours_cannot_be_booked_into_next_month() {
        let mut mocks = Mocks::new();
        mocks.roles.expect_has().never();
        mocks.reservations.expect_create_within_allowance().never();
        mocks.reservations.expect_create().never();

        let result = mocks
            .build()
            .record_reservation(
                &user("role@example.com"),
                NewReservation {
                    reserved_at: Some(next_period_start(Utc::now()) + Duration::hours(1)),
                    hours_used: dec!(4),
                    free_hours_used: dec!(4),
                    cost: Decimal::ZERO,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn free_hours_cannot_be_booked_into_last_month() {
        let mut mocks = Mocks::new();
        mocks.roles.expect_has().never();
        mocks.reservations.expect_create_within_allowance().never();

        let result = mocks
            .build()
            .record_reservation(
                &user("role@example.com"),
                NewReservation {
                    reserved_at: Some(current_period_start(Utc::now()) - Duration::seconds(1)),
                    hours_used: dec!(1),
                    free_hours_used: dec!(1),
                    cost: Decimal::ZERO,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn paid_reservation_skips_allowance_check() {
        let member = user("plain@example.com");
        let member_id = member.id;

        let mut mocks = Mocks::new();
        mocks.roles.expect_has().never();
        mocks
            .reservations
            .expect_create()
            .with(eq(member_id), always())
            .returning(|user_id, r| {
                Ok(Reservation {
                    id: Uuid::new_v4(),
                    user_id,
                    reserved_at: Utc::now(),
                    hours_used: r.hours_used,
                    free_hours_used: r.free_hours_used,
                    cost: r.cost,
                })
            });

        let reservation = mocks
            .build()
            .record_reservation(
                &member,
                NewReservation {
                    reserved_at: None,
                    hours_used: dec!(2),
                    free_hours_used: Decimal::ZERO,
                    cost: dec!(30.00),
                },
            )
            .await
            .unwrap();

        assert_eq!(reservation.cost, dec!(30.00));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let mut mocks = Mocks::new();
        mocks
            .users
            .expect_find_by_email()
            .withf(|email| email == "taken@example.com")
            .returning(|email| Ok(Some(user(email))));
        mocks.users.expect_create().never();

        let result = mocks
            .build()
            .register_user("Taken@Example.com".to_string(), "Someone".to_string())
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn stats_combine_role_holders_and_payers() {
        let role_holder = Uuid::new_v4();
        let payer = Uuid::new_v4();

        let mut mocks = Mocks::new();
        mocks.users.expect_count().returning(|| Ok(4));
        mocks
            .roles
            .expect_holders()
            .with(eq(Role::SustainingMember))
            .returning(move |_| Ok(vec![role_holder, payer]));
        mocks
            .transactions
            .expect_qualifying_between()
            .returning(|_, _, _| {
                Ok(vec![transaction(
                    "payer@example.com",
                    TransactionType::Recurring,
                    dec!(25.00),
                )])
            });
        mocks
            .users
            .expect_ids_by_emails()
            .withf(|emails| emails == &vec!["payer@example.com".to_string()])
            .returning(move |_| Ok(vec![payer]));

        let stats = mocks.build().subscription_stats().await.unwrap();

        assert_eq!(stats.total_users, 4);
        assert_eq!(stats.sustaining_members, 2);
        assert_eq!(stats.sustaining_percentage, dec!(50));
        assert_eq!(stats.monthly_revenue, dec!(25.00));
        assert_eq!(stats.average_subscription, dec!(25.00));
        assert_eq!(stats.total_free_hours_allocated, 8);
    }

    #[tokio::test]
    async fn stats_with_no_payments_skip_email_lookup() {
        let mut mocks = Mocks::new();
        mocks.users.expect_count().returning(|| Ok(0));
        mocks.roles.expect_holders().returning(|_| Ok(vec![]));
        mocks
            .transactions
            .expect_qualifying_between()
            .returning(|_, _, _| Ok(vec![]));
        mocks.users.expect_ids_by_emails().never();

        let stats = mocks.build().subscription_stats().await.unwrap();

        assert_eq!(stats.sustaining_members, 0);
        assert_eq!(stats.sustaining_percentage, Decimal::ZERO);
        assert_eq!(stats.monthly_revenue, Decimal::ZERO);
    }

    #[tokio::test]
    async fn summary_for_regular_member() {
        let mut mocks = Mocks::new();
        mocks.roles.expect_has().returning(|_, _| Ok(false));
        mocks
            .transactions
            .expect_has_qualifying()
            .returning(|_, _, _, _| Ok(false));
        mocks.reservations.expect_free_hours_used_between().never();

        let member = user("plain@example.com");
        let summary = mocks.build().subscription_summary(&member).await.unwrap();

        assert_eq!(summary.user_id, member.id);
        assert!(!summary.is_sustaining_member);
        assert_eq!(summary.monthly_free_hours, 0);
        assert_eq!(summary.remaining_free_hours, Decimal::ZERO);
    }
}
