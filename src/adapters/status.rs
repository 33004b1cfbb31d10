//! Order status canonicalization
//!
//! Every backend reports order progress in its own vocabulary. Each backend
//! module owns a [`StatusTable`] and maps native tokens through
//! [`canonicalize`]: lowercase, exact lookup, `Unknown` for anything else.
//! Tables are never shared between backends because the same word can mean
//! different things upstream.

use serde::{Deserialize, Serialize};

/// Canonical order status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    WaitingForDeposit,
    DepositReceived,
    Exchanging,
    Sending,
    Completed,
    Failed,
    Refunded,
    Expired,
    /// Native status not recognized. Not an error: poll again later.
    #[default]
    Unknown,
}

impl OrderStatus {
    /// True once the order will not progress any further.
    ///
    /// `Unknown` is never terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Failed | OrderStatus::Refunded | OrderStatus::Expired
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::New => "new",
            OrderStatus::WaitingForDeposit => "waiting_for_deposit",
            OrderStatus::DepositReceived => "deposit_received",
            OrderStatus::Exchanging => "exchanging",
            OrderStatus::Sending => "sending",
            OrderStatus::Completed => "completed",
            OrderStatus::Failed => "failed",
            OrderStatus::Refunded => "refunded",
            OrderStatus::Expired => "expired",
            OrderStatus::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Per-backend mapping from lowercase native token to canonical status
pub type StatusTable = &'static [(&'static str, OrderStatus)];

/// Map a native status token through `table`.
///
/// Total: unmapped tokens yield [`OrderStatus::Unknown`].
pub fn canonicalize(table: StatusTable, native: &str) -> OrderStatus {
    let token = native.to_lowercase();
    table
        .iter()
        .find(|(candidate, _)| *candidate == token)
        .map(|(_, status)| *status)
        .unwrap_or(OrderStatus::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TABLE: StatusTable = &[
        ("finished", OrderStatus::Completed),
        ("waiting", OrderStatus::WaitingForDeposit),
    ];

    #[test]
    fn test_exact_match_case_insensitive() {
        assert_eq!(canonicalize(TABLE, "finished"), OrderStatus::Completed);
        assert_eq!(canonicalize(TABLE, "FINISHED"), OrderStatus::Completed);
        assert_eq!(canonicalize(TABLE, "Waiting"), OrderStatus::WaitingForDeposit);
    }

    #[test]
    fn test_no_prefix_or_fuzzy_matching() {
        assert_eq!(canonicalize(TABLE, "finish"), OrderStatus::Unknown);
        assert_eq!(canonicalize(TABLE, "finished "), OrderStatus::Unknown);
        assert_eq!(canonicalize(TABLE, ""), OrderStatus::Unknown);
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Refunded.is_terminal());
        assert!(!OrderStatus::Sending.is_terminal());
        assert!(!OrderStatus::Unknown.is_terminal());
    }

    #[test]
    fn test_display_matches_serde() {
        for status in [
            OrderStatus::New,
            OrderStatus::WaitingForDeposit,
            OrderStatus::DepositReceived,
            OrderStatus::Unknown,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status));
        }
    }

    proptest! {
        #[test]
        fn prop_canonicalize_is_total(native in ".*") {
            let status = canonicalize(TABLE, &native);
            let lowered = native.to_lowercase();
            if lowered == "finished" {
                prop_assert_eq!(status, OrderStatus::Completed);
            } else if lowered == "waiting" {
                prop_assert_eq!(status, OrderStatus::WaitingForDeposit);
            } else {
                prop_assert_eq!(status, OrderStatus::Unknown);
            }
        }
    }
}
