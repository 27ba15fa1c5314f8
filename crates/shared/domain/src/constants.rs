//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// =============================================================================
// User Roles
// =============================================================================

/// Site administrator role
pub const ROLE_ADMIN: &str = "admin";

/// Default role assigned to registered users
pub const ROLE_MEMBER: &str = "member";

/// Role granting monthly free reservation hours
pub const ROLE_SUSTAINING_MEMBER: &str = "sustaining member";

// =============================================================================
// Band Membership
// =============================================================================

/// Band role with permission to invite members
pub const BAND_ROLE_ADMIN: &str = "admin";

/// Regular band role
pub const BAND_ROLE_MEMBER: &str = "member";

pub const MEMBERSHIP_STATUS_INVITED: &str = "invited";
pub const MEMBERSHIP_STATUS_ACTIVE: &str = "active";
pub const MEMBERSHIP_STATUS_DECLINED: &str = "declined";

// =============================================================================
// Transactions
// =============================================================================

pub const TRANSACTION_TYPE_RECURRING: &str = "recurring";
pub const TRANSACTION_TYPE_ONE_TIME: &str = "one-time";

// =============================================================================
// Subscription Policy
// =============================================================================

/// A recurring payment must be strictly greater than this to qualify
pub const DEFAULT_MINIMUM_QUALIFYING_AMOUNT: Decimal = dec!(5.00);

/// Trailing window (days) in which a qualifying payment counts
pub const DEFAULT_QUALIFYING_WINDOW_DAYS: i64 = 30;

/// Free hours granted each month to sustaining members
pub const DEFAULT_MONTHLY_FREE_HOURS: u32 = 4;

/// Payment amount that buys one free hour
pub const DEFAULT_FREE_HOUR_VALUE: Decimal = dec!(5.00);

// =============================================================================
// Validation
// =============================================================================

/// Minimum band name length
pub const MIN_BAND_NAME_LENGTH: usize = 1;

/// Maximum band name length
pub const MAX_BAND_NAME_LENGTH: usize = 100;

/// Minimum name length requirement
pub const MIN_NAME_LENGTH: usize = 1;
