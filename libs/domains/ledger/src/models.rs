use core_config::{ConfigError, FromEnv, env_parse_or_default};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const USERS: &str = "Users";
pub const ROOMS: &str = "Room";
pub const MEMBERS: &str = "Members";
pub const CONTRIBUTIONS: &str = "Contribution";
pub const EXPENSES: &str = "Expense";

/// Amount field of a contribution
pub const PAYMENT_FIELD: &str = "payment";
/// Amount field of an expense
pub const EXPENSE_AMOUNT_FIELD: &str = "e_amt";

/// Marks a profile whose account deletion is still pending
pub const DELETED_AT_FIELD: &str = "deleted_at";

/// Fields of a financial record that point at its room and user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinKeys {
    pub room: &'static str,
    pub user: &'static str,
}

impl Default for JoinKeys {
    fn default() -> Self {
        Self {
            room: "r_id",
            user: "uid",
        }
    }
}

/// Aggregator tuning
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Source documents joined at the same time
    pub join_concurrency: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            join_concurrency: 16,
        }
    }
}

impl FromEnv for LedgerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let join_concurrency: usize = env_parse_or_default("LEDGER_JOIN_CONCURRENCY", "16")?;
        if join_concurrency == 0 {
            return Err(ConfigError::ParseError {
                key: "LEDGER_JOIN_CONCURRENCY".to_string(),
                details: "must be at least 1".to_string(),
            });
        }
        Ok(Self { join_concurrency })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSum {
    pub payment_sum: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSum {
    pub expense_sum: i64,
}
