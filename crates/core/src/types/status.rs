//! Order status enum.

use serde::{Deserialize, Serialize};

/// Payment status of an order.
///
/// Transitions are forward-only: `Pending -> Paid` or `Pending -> Failed`.
/// There is no path out of a terminal state; a failed order is re-created,
/// not reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Awaiting payment confirmation.
    #[default]
    Pending,
    /// Payment confirmed; a download token may be minted.
    Paid,
    /// Payment declined or abandoned.
    Failed,
}

impl OrderStatus {
    /// Whether this status admits the given transition.
    ///
    /// Only `Pending -> Paid` and `Pending -> Failed` are legal.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self == Self::Pending && matches!(next, Self::Paid | Self::Failed)
    }

    /// Whether this status is terminal (no further transitions).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Paid | Self::Failed)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Paid => write!(f, "paid"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}
