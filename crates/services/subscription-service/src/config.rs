//! Subscription service configuration.

use std::env;

use rust_decimal::Decimal;

use domain::{
    SubscriptionPolicy, DEFAULT_FREE_HOUR_VALUE, DEFAULT_MINIMUM_QUALIFYING_AMOUNT,
    DEFAULT_MONTHLY_FREE_HOURS, DEFAULT_QUALIFYING_WINDOW_DAYS,
};

/// Subscription service configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionConfig {
    /// Recurring payments must exceed this to count
    pub minimum_amount: Decimal,
    /// Trailing window for qualifying payments, in days
    pub window_days: i64,
    /// Free hours granted monthly to sustaining members
    pub monthly_free_hours: u32,
    /// Payment amount worth one free hour
    pub free_hour_value: Decimal,
}

impl SubscriptionConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            minimum_amount: env::var("SUBSCRIPTION_MINIMUM_AMOUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MINIMUM_QUALIFYING_AMOUNT),
            window_days: env::var("SUBSCRIPTION_WINDOW_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|days| *days > 0)
                .unwrap_or(DEFAULT_QUALIFYING_WINDOW_DAYS),
            monthly_free_hours: env::var("SUBSCRIPTION_MONTHLY_FREE_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MONTHLY_FREE_HOURS),
            free_hour_value: env::var("SUBSCRIPTION_FREE_HOUR_VALUE")
                .ok()
                .and_then(|v| v.parse::<Decimal>().ok())
                .filter(|value| value.is_sign_positive() && !value.is_zero())
                .unwrap_or(DEFAULT_FREE_HOUR_VALUE),
        }
    }

    /// Policy handed to the service
    pub fn policy(&self) -> SubscriptionPolicy {
        SubscriptionPolicy {
            minimum_qualifying_amount: self.minimum_amount,
            qualifying_window_days: self.window_days,
            monthly_free_hours: self.monthly_free_hours,
            free_hour_value: self.free_hour_value,
        }
    }
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            minimum_amount: DEFAULT_MINIMUM_QUALIFYING_AMOUNT,
            window_days: DEFAULT_QUALIFYING_WINDOW_DAYS,
            monthly_free_hours: DEFAULT_MONTHLY_FREE_HOURS,
            free_hour_value: DEFAULT_FREE_HOUR_VALUE,
        }
    }
}
