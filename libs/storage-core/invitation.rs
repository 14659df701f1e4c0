use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

use crate::todo::{AccountId, Collaborator, ShareRole, TodoId};

pub type InviteId = String;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Active,
    Expired,
}

/// Share-link record, resolved from the `/invite/{id}` path parameter.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Invitation {
    pub id: InviteId,
    pub created_by: AccountId,
    pub todo_ids: Vec<TodoId>,
    /// Role granted to every accepting user
    pub role: ShareRole,
    pub invited_users: Vec<AccountId>,
    pub accepted_users: Vec<Collaborator>,
    pub status: InvitationStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    /// An invitation is inert once its expiry passed or it was marked
    /// expired, whichever comes first.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        if self.status == InvitationStatus::Expired {
            return true;
        }
        match self.expires_at {
            Some(expires_at) => expires_at <= now,
            None => false,
        }
    }

    pub fn has_accepted(&self, account_id: &str) -> bool {
        self.accepted_users.iter().any(|c| c.account_id == account_id)
    }

    pub fn share_url(&self) -> String {
        format!("/invite/{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixture() -> Invitation {
        Invitation {
            id: "inv-1".to_owned(),
            created_by: "acc-1".to_owned(),
            todo_ids: vec!["a1".to_owned()],
            role: ShareRole::Editor,
            invited_users: Vec::new(),
            accepted_users: Vec::new(),
            status: InvitationStatus::Pending,
            expires_at: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn invitation_without_expiry_never_expires() {
        let invitation = fixture();
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

        assert!(!invitation.is_expired(now));
    }

    #[test]
    fn invitation_expires_once_its_date_passed() {
        let mut invitation = fixture();
        invitation.expires_at = Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());

        let before = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).unwrap();

        assert!(!invitation.is_expired(before));
        assert!(invitation.is_expired(after));
    }

    #[test]
    fn expired_status_wins_over_a_future_expiry() {
        let mut invitation = fixture();
        invitation.status = InvitationStatus::Expired;
        invitation.expires_at = Some(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());

        let now = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assert!(invitation.is_expired(now));
    }

    #[test]
    fn share_url_carries_the_invite_id() {
        assert_eq!(fixture().share_url(), "/invite/inv-1");
    }
}
