//! # Transfer State Machine
//!
//! ```text
//!            approve                 complete
//! PENDING ─────────────► IN_TRANSIT ─────────────► COMPLETED
//!           source −qty              destination +qty
//!                                    received = qty
//! ```
//!
//! Forward only. There is no cancel and no way back. Each transition is a
//! compare-and-swap on the status column; the store applies the inventory
//! side of the transition in the same transaction.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::{Transfer, TransferStatus};

/// A transition a caller can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum TransferAction {
    Approve,
    Complete,
}

/// Which side of a transfer a transition moves stock on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferLeg {
    /// Decrement at the source location.
    Source,
    /// Increment at the destination location.
    Destination,
}

impl TransferAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferAction::Approve => "approve",
            TransferAction::Complete => "complete",
        }
    }

    /// Status the transfer must be in for this action.
    pub fn from_status(&self) -> TransferStatus {
        match self {
            TransferAction::Approve => TransferStatus::Pending,
            TransferAction::Complete => TransferStatus::InTransit,
        }
    }

    /// Status the transfer ends in.
    pub fn to_status(&self) -> TransferStatus {
        match self {
            TransferAction::Approve => TransferStatus::InTransit,
            TransferAction::Complete => TransferStatus::Completed,
        }
    }

    /// Where stock moves, and the sign applied to each item quantity.
    pub fn leg(&self) -> (TransferLeg, i64) {
        match self {
            TransferAction::Approve => (TransferLeg::Source, -1),
            TransferAction::Complete => (TransferLeg::Destination, 1),
        }
    }

    /// Location whose inventory this action changes.
    pub fn affected_location<'a>(&self, transfer: &'a Transfer) -> &'a str {
        match self.leg().0 {
            TransferLeg::Source => &transfer.from_location_id,
            TransferLeg::Destination => &transfer.to_location_id,
        }
    }

    /// Checks the transition against the transfer's current status.
    ///
    /// Used after a conditional update matched no row, to report why.
    pub fn check(&self, transfer_id: &str, current: TransferStatus) -> CoreResult<TransferStatus> {
        if current == self.from_status() {
            Ok(self.to_status())
        } else {
            Err(CoreError::InvalidTransferState {
                transfer_id: transfer_id.to_string(),
                status: current,
                action: self.as_str().to_string(),
            })
        }
    }
}

impl std::fmt::Display for TransferAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::Utc;

    #[test]
    fn test_forward_transitions() {
        assert_eq!(
            TransferAction::Approve
                .check("t", TransferStatus::Pending)
                .unwrap(),
            TransferStatus::InTransit
        );
        assert_eq!(
            TransferAction::Complete
                .check("t", TransferStatus::InTransit)
                .unwrap(),
            TransferStatus::Completed
        );
    }

    #[test]
    fn test_out_of_order_transitions_are_invalid_state() {
        let cases = [
            (TransferAction::Complete, TransferStatus::Pending),
            (TransferAction::Approve, TransferStatus::InTransit),
            (TransferAction::Approve, TransferStatus::Completed),
            (TransferAction::Complete, TransferStatus::Completed),
        ];
        for (action, status) in cases {
            let err = action.check("t-9", status).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidState);
        }
    }

    #[test]
    fn test_legs() {
        let transfer = Transfer {
            id: "t".to_string(),
            from_location_id: "kmg".to_string(),
            to_location_id: "stb".to_string(),
            status: TransferStatus::Pending,
            requested_by: "m".to_string(),
            requested_at: Utc::now(),
            approved_by: None,
            approved_at: None,
            completed_by: None,
            completed_at: None,
        };
        assert_eq!(TransferAction::Approve.affected_location(&transfer), "kmg");
        assert_eq!(TransferAction::Approve.leg().1, -1);
        assert_eq!(TransferAction::Complete.affected_location(&transfer), "stb");
        assert_eq!(TransferAction::Complete.leg().1, 1);
    }
}
