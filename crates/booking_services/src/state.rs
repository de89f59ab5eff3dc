use serde::{Deserialize, Serialize};

/// Lifecycle state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Awaiting the host's decision.
    Pending,
    /// Accepted by the host.
    Confirmed,
    /// Rejected by the host.
    Declined,
    /// Called off by either party before completion.
    Cancelled,
    /// The stay finished; reviews are now allowed.
    Completed,
}

/// The actor's relation to a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingParty {
    /// The booking's guest.
    Guest,
    /// The booking's host.
    Host,
    /// An administrator.
    Admin,
}

/// Why a requested transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    /// No edge exists between the two states.
    Undefined,
    /// The edge exists but this party may not drive it.
    Unauthorized,
}

impl BookingStatus {
    /// Parses a status from its database representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "declined" => Some(BookingStatus::Declined),
            "cancelled" => Some(BookingStatus::Cancelled),
            "completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    /// Database representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Declined => "declined",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// Whether an edge exists from `self` to `to`.
    pub fn can_transition(self, to: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, to),
            (Pending, Confirmed)
                | (Pending, Declined)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
                | (Confirmed, Completed)
        )
    }

    /// Whether no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BookingStatus::Declined | BookingStatus::Cancelled | BookingStatus::Completed
        )
    }
}

/// Checks a requested transition against the edge table and the per-edge
/// authority rules: confirm/decline and complete are host-or-admin moves,
/// cancellation is open to either party (and admins).
pub fn check_transition(
    from: BookingStatus,
    to: BookingStatus,
    party: BookingParty,
) -> Result<(), TransitionError> {
    if !from.can_transition(to) {
        return Err(TransitionError::Undefined);
    }

    let allowed = match to {
        BookingStatus::Confirmed | BookingStatus::Declined | BookingStatus::Completed => {
            matches!(party, BookingParty::Host | BookingParty::Admin)
        }
        BookingStatus::Cancelled => true,
        BookingStatus::Pending => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(TransitionError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use BookingParty::*;
    use BookingStatus::*;

    const ALL_STATUSES: [BookingStatus; 5] = [Pending, Confirmed, Declined, Cancelled, Completed];

    #[test]
    fn only_the_defined_edges_exist() {
        let defined = [
            (Pending, Confirmed),
            (Pending, Declined),
            (Pending, Cancelled),
            (Confirmed, Cancelled),
            (Confirmed, Completed),
        ];

        for from in ALL_STATUSES {
            for to in ALL_STATUSES {
                assert_eq!(
                    from.can_transition(to),
                    defined.contains(&(from, to)),
                    "unexpected edge {:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn terminal_states_have_no_outgoing_edges() {
        for from in [Declined, Cancelled, Completed] {
            assert!(from.is_terminal());
            for to in ALL_STATUSES {
                assert!(!from.can_transition(to));
            }
        }
    }

    #[test]
    fn host_and_admin_confirm_or_decline_pending_bookings() {
        for to in [Confirmed, Declined] {
            assert_eq!(check_transition(Pending, to, Host), Ok(()));
            assert_eq!(check_transition(Pending, to, Admin), Ok(()));
            assert_eq!(
                check_transition(Pending, to, Guest),
                Err(TransitionError::Unauthorized)
            );
        }
    }

    #[test]
    fn any_party_may_cancel() {
        for party in [Guest, Host, Admin] {
            assert_eq!(check_transition(Pending, Cancelled, party), Ok(()));
            assert_eq!(check_transition(Confirmed, Cancelled, party), Ok(()));
        }
    }

    #[test]
    fn completion_is_restricted_to_host_or_admin() {
        assert_eq!(check_transition(Confirmed, Completed, Host), Ok(()));
        assert_eq!(check_transition(Confirmed, Completed, Admin), Ok(()));
        assert_eq!(
            check_transition(Confirmed, Completed, Guest),
            Err(TransitionError::Unauthorized)
        );
    }

    #[test]
    fn undefined_edges_are_rejected_before_authority() {
        assert_eq!(
            check_transition(Completed, Cancelled, Admin),
            Err(TransitionError::Undefined)
        );
        assert_eq!(
            check_transition(Pending, Completed, Host),
            Err(TransitionError::Undefined)
        );
        assert_eq!(
            check_transition(Declined, Confirmed, Admin),
            Err(TransitionError::Undefined)
        );
    }

    #[test]
    fn status_round_trips_through_its_database_form() {
        for status in ALL_STATUSES {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BookingStatus::parse("archived"), None);
    }
}
