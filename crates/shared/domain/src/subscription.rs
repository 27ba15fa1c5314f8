//! Payments, reservations and the sustaining-member policy.

use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Months, NaiveTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{
    DEFAULT_FREE_HOUR_VALUE, DEFAULT_MINIMUM_QUALIFYING_AMOUNT, DEFAULT_MONTHLY_FREE_HOURS,
    DEFAULT_QUALIFYING_WINDOW_DAYS, TRANSACTION_TYPE_ONE_TIME, TRANSACTION_TYPE_RECURRING,
};
use crate::error::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum TransactionType {
    #[serde(rename = "recurring")]
    Recurring,
    #[serde(rename = "one-time")]
    OneTime,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Recurring => TRANSACTION_TYPE_RECURRING,
            TransactionType::OneTime => TRANSACTION_TYPE_ONE_TIME,
        }
    }
}

impl FromStr for TransactionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            TRANSACTION_TYPE_RECURRING => Ok(TransactionType::Recurring),
            TRANSACTION_TYPE_ONE_TIME => Ok(TransactionType::OneTime),
            other => Err(DomainError::validation(format!(
                "Unknown transaction type '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment record, matched to users by email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Transaction {
    pub id: Uuid,
    pub email: String,
    pub kind: TransactionType,
    pub amount: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Incoming payment before it is stored
#[derive(Debug, Clone, Deserialize)]
pub struct NewTransaction {
    pub email: String,
    pub kind: TransactionType,
    pub amount: Decimal,
    /// Defaults to now
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Room usage record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reserved_at: DateTime<Utc>,
    pub hours_used: Decimal,
    pub free_hours_used: Decimal,
    pub cost: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReservation {
    pub reserved_at: Option<DateTime<Utc>>,
    pub hours_used: Decimal,
    pub free_hours_used: Decimal,
    pub cost: Decimal,
}

impl NewReservation {
    pub fn validate(&self) -> DomainResult<()> {
        if self.hours_used.is_sign_negative()
            || self.free_hours_used.is_sign_negative()
            || self.cost.is_sign_negative()
        {
            return Err(DomainError::validation("Reservation quantities cannot be negative"));
        }
        if self.free_hours_used > self.hours_used {
            return Err(DomainError::validation(
                "Free hours used cannot exceed hours used",
            ));
        }
        Ok(())
    }
}

/// Thresholds deciding who is a sustaining member and what they receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionPolicy {
    /// Recurring payments must exceed this amount
    pub minimum_qualifying_amount: Decimal,
    /// Trailing window in days, boundary inclusive
    pub qualifying_window_days: i64,
    pub monthly_free_hours: u32,
    /// Payment that buys one free hour
    pub free_hour_value: Decimal,
}

impl Default for SubscriptionPolicy {
    fn default() -> Self {
        Self {
            minimum_qualifying_amount: DEFAULT_MINIMUM_QUALIFYING_AMOUNT,
            qualifying_window_days: DEFAULT_QUALIFYING_WINDOW_DAYS,
            monthly_free_hours: DEFAULT_MONTHLY_FREE_HOURS,
            free_hour_value: DEFAULT_FREE_HOUR_VALUE,
        }
    }
}

impl SubscriptionPolicy {
    /// Recurring and strictly above the minimum amount
    pub fn qualifies(&self, kind: TransactionType, amount: Decimal) -> bool {
        kind == TransactionType::Recurring && amount > self.minimum_qualifying_amount
    }

    /// Earliest `occurred_at` still inside the qualifying window
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.qualifying_window_days)
    }

    pub fn is_within_window(&self, occurred_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        occurred_at >= self.window_start(now) && occurred_at <= now
    }

    /// Whole hours a payment is worth: `floor(amount / free_hour_value)`
    pub fn calculate_free_hours(&self, amount: Decimal) -> u32 {
        if amount.is_sign_negative() {
            return 0;
        }
        amount
            .checked_div(self.free_hour_value)
            .map(|hours| hours.floor())
            .and_then(|hours| hours.to_u32())
            .unwrap_or(0)
    }

    pub fn monthly_allocation(&self, sustaining: bool) -> u32 {
        if sustaining {
            self.monthly_free_hours
        } else {
            0
        }
    }
}

/// First instant of the UTC calendar month containing `now`
pub fn current_period_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let date = now.date_naive();
    date.with_day(1)
        .unwrap_or(date)
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// First instant of the UTC calendar month after the one containing `now`
pub fn next_period_start(now: DateTime<Utc>) -> DateTime<Utc> {
    current_period_start(now)
        .checked_add_months(Months::new(1))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Whether `at` falls in the same UTC calendar month as `now`
pub fn is_in_current_period(at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    at >= current_period_start(now) && at < next_period_start(now)
}

/// Aggregate subscription snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubscriptionStats {
    pub total_users: u64,
    pub sustaining_members: u64,
    pub sustaining_percentage: Decimal,
    pub monthly_revenue: Decimal,
    pub average_subscription: Decimal,
    pub total_free_hours_allocated: u64,
}

impl SubscriptionStats {
    /// Derive percentages and averages from raw counts
    pub fn compute(
        total_users: u64,
        sustaining_members: u64,
        monthly_revenue: Decimal,
        subscription_count: u64,
        monthly_free_hours: u32,
    ) -> Self {
        let sustaining_percentage = if total_users == 0 {
            Decimal::ZERO
        } else {
            (Decimal::from(sustaining_members) * Decimal::ONE_HUNDRED / Decimal::from(total_users))
                .round_dp(2)
        };

        let average_subscription = if subscription_count == 0 {
            Decimal::ZERO
        } else {
            (monthly_revenue / Decimal::from(subscription_count)).round_dp(2)
        };

        Self {
            total_users,
            sustaining_members,
            sustaining_percentage,
            monthly_revenue,
            average_subscription,
            total_free_hours_allocated: sustaining_members * u64::from(monthly_free_hours),
        }
    }
}

/// Per-user subscription view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubscriptionSummary {
    pub user_id: Uuid,
    pub is_sustaining_member: bool,
    pub monthly_free_hours: u32,
    pub remaining_free_hours: Decimal,
}

/// Result of recording a payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TransactionOutcome {
    pub transaction: Transaction,
    /// True only when this payment granted the sustaining role
    pub upgraded: bool,
}
