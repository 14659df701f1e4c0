use chrono::{DateTime, Utc};
use doable_storage::{
    Collaborator, Invitation, InvitationStatus, OriginalRef, ShareRole, Storage, StoreError, Todo,
    TodoId, TodoUpdate, WriteBatch,
};
use ulid::Ulid;

use crate::errors::{CoreError, Result};
use crate::validate::ValidationError;
use crate::Core;

/// Read-only view of a share link, also served to visitors that are
/// not signed in.
#[derive(Clone, Debug, PartialEq)]
pub struct InvitePreview {
    pub invitation: Invitation,
    pub todos: Vec<Todo>,
}

impl Core {
    /// Mint a share link over a set of owned todos. Every referenced
    /// todo must belong to the caller.
    pub async fn create_invitation(
        &self,
        todo_ids: Vec<TodoId>,
        role: ShareRole,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Invitation> {
        let profile = self.require_profile()?;
        if todo_ids.is_empty() {
            return Err(ValidationError::EmptyShare.into());
        }
        for todo_id in &todo_ids {
            // Fetching under the caller's own collection doubles as the
            // ownership check
            self.storage
                .get_todo(profile.account_id.clone(), todo_id.clone())
                .await?;
        }

        let invitation = Invitation {
            id: Ulid::new().to_string(),
            created_by: profile.account_id,
            todo_ids,
            role,
            invited_users: Vec::new(),
            accepted_users: Vec::new(),
            status: InvitationStatus::Pending,
            expires_at,
            created_at: Utc::now(),
        };
        self.storage.put_invitation(invitation.clone()).await?;

        tracing::info!(invite_id = %invitation.id, "created share link");
        Ok(invitation)
    }

    /// Resolve a share link into its preview. A missing or expired
    /// invitation short-circuits into a terminal error, there is no
    /// recovery beyond navigating away.
    pub async fn resolve_invitation(&self, invite_id: &str) -> Result<InvitePreview> {
        let invitation = self
            .storage
            .get_invitation(invite_id.to_owned())
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("invitation '{invite_id}'")))?;

        if invitation.is_expired(Utc::now()) {
            return Err(CoreError::InvitationExpired(invitation.id));
        }

        let mut todos = Vec::new();
        for todo_id in &invitation.todo_ids {
            match self
                .storage
                .get_todo(invitation.created_by.clone(), todo_id.clone())
                .await
            {
                Ok(todo) => todos.push(todo),
                Err(StoreError::NotFound(_)) => {
                    tracing::warn!(todo_id = %todo_id, "shared todo no longer resolves, skipped");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(InvitePreview { invitation, todos })
    }

    /// Accept a share link for the signed-in account. The copies, the
    /// shared-with updates on the originals and the invitation update
    /// are applied as one atomic batch: a failure leaves no visible
    /// effect and the whole acceptance can be retried.
    pub async fn accept_invitation(&self, invite_id: &str) -> Result<Vec<Todo>> {
        let profile = self.require_profile()?;
        let preview = self.resolve_invitation(invite_id).await?;
        let mut invitation = preview.invitation;

        if invitation.has_accepted(&profile.account_id) {
            return Ok(Vec::new());
        }

        let now = Utc::now();
        let mut batch = WriteBatch::new();
        let mut copies = Vec::new();

        for original in preview.todos {
            let copy = Todo {
                id: Ulid::new().to_string(),
                owner_id: profile.account_id.clone(),
                original: Some(OriginalRef {
                    todo_id: original.id.clone(),
                    owner_id: original.owner_id.clone(),
                }),
                shared_with: Vec::new(),
                created_at: now,
                updated_at: now,
                ..original.clone()
            };

            let mut shared_with = original.shared_with.clone();
            shared_with.push(Collaborator {
                account_id: profile.account_id.clone(),
                role: invitation.role,
            });
            batch = batch.create_todo(copy.clone()).update_todo(
                original.owner_id.clone(),
                original.id.clone(),
                TodoUpdate::default().set_shared_with(shared_with),
            );
            copies.push(copy);
        }

        invitation.accepted_users.push(Collaborator {
            account_id: profile.account_id.clone(),
            role: invitation.role,
        });
        invitation.status = InvitationStatus::Active;
        batch = batch.put_invitation(invitation);

        match self.storage.commit_batch(batch).await {
            Ok(()) => {
                tracing::info!(
                    invite_id = %invite_id,
                    copies = copies.len(),
                    "accepted invitation"
                );
                Ok(copies)
            }
            Err(e) => {
                tracing::warn!(invite_id = %invite_id, "acceptance batch refused as a whole");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use doable_storage::backend::{MemIdentity, MemStorage, MemStorageConfig};
    use doable_storage::{IdentityBox, Profile, StorageBox};

    use crate::validate::TodoDraft;

    async fn core_for(
        storage: &MemStorage,
        email: &str,
        name: &str,
    ) -> (Core, Profile) {
        let identity = MemIdentity::new();
        identity.register(email, "pw", name).unwrap();
        let core = Core::new(
            StorageBox::new(storage.clone()),
            IdentityBox::new(identity),
        );
        let profile = core.sign_in_with_password(email, "pw").await.unwrap();
        (core, profile)
    }

    fn draft(title: &str) -> TodoDraft {
        TodoDraft {
            title: title.to_owned(),
            start_time: Some(Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap()),
            ..TodoDraft::default()
        }
    }

    async fn shared_setup() -> (MemStorage, Core, Profile, Core, Profile, Invitation) {
        let storage = MemStorage::new(MemStorageConfig::default());
        let (owner_core, owner) = core_for(&storage, "ada@example.com", "Ada").await;
        let (guest_core, guest) = core_for(&storage, "grace@example.com", "Grace").await;

        let first = owner_core.create_todo(draft("shared plan")).await.unwrap();
        let second = owner_core.create_todo(draft("shared list")).await.unwrap();
        let invitation = owner_core
            .create_invitation(vec![first.id, second.id], ShareRole::Editor, None)
            .await
            .unwrap();

        (storage, owner_core, owner, guest_core, guest, invitation)
    }

    #[tokio::test]
    async fn creating_an_invitation_requires_owned_todos() {
        let storage = MemStorage::new(MemStorageConfig::default());
        let (core, _) = core_for(&storage, "ada@example.com", "Ada").await;

        let err = core
            .create_invitation(vec!["not-mine".to_owned()], ShareRole::Viewer, None)
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn empty_share_is_rejected() {
        let storage = MemStorage::new(MemStorageConfig::default());
        let (core, _) = core_for(&storage, "ada@example.com", "Ada").await;

        let err = core
            .create_invitation(Vec::new(), ShareRole::Viewer, None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::EmptyShare)
        ));
    }

    #[tokio::test]
    async fn previews_resolve_without_a_signed_in_account() {
        let (storage, _, _, _, _, invitation) = shared_setup().await;
        let visitor = Core::new(
            StorageBox::new(storage.clone()),
            IdentityBox::new(MemIdentity::new()),
        );

        let preview = visitor.resolve_invitation(&invitation.id).await.unwrap();

        assert_eq!(preview.invitation.id, invitation.id);
        assert_eq!(preview.todos.len(), 2);
    }

    #[tokio::test]
    async fn missing_invitation_is_not_found() {
        let storage = MemStorage::new(MemStorageConfig::default());
        let (core, _) = core_for(&storage, "ada@example.com", "Ada").await;

        let err = core.resolve_invitation("nope").await.unwrap_err();

        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn expired_invitation_short_circuits() {
        let (storage, owner_core, _, guest_core, _, _) = shared_setup().await;
        let todo = owner_core.create_todo(draft("late share")).await.unwrap();
        let mut invitation = owner_core
            .create_invitation(vec![todo.id], ShareRole::Viewer, None)
            .await
            .unwrap();
        invitation.expires_at = Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        storage.put_invitation(invitation.clone()).await.unwrap();

        let err = guest_core
            .accept_invitation(&invitation.id)
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::InvitationExpired(_)));
    }

    #[tokio::test]
    async fn acceptance_requires_a_signed_in_account() {
        let (storage, _, _, _, _, invitation) = shared_setup().await;
        let visitor = Core::new(
            StorageBox::new(storage.clone()),
            IdentityBox::new(MemIdentity::new()),
        );

        let err = visitor.accept_invitation(&invitation.id).await.unwrap_err();

        assert!(matches!(err, CoreError::NotAuthenticated));
    }

    #[tokio::test]
    async fn acceptance_copies_todos_and_links_them_back() {
        let (storage, _, owner, guest_core, guest, invitation) = shared_setup().await;

        let copies = guest_core.accept_invitation(&invitation.id).await.unwrap();

        assert_eq!(copies.len(), 2);
        for copy in &copies {
            assert_eq!(copy.owner_id, guest.account_id);
            assert!(copy.shared_with.is_empty());
            let origin = copy.original.as_ref().unwrap();
            assert_eq!(origin.owner_id, owner.account_id);

            // the original now lists the guest as an editor
            let original = storage
                .get_todo(owner.account_id.clone(), origin.todo_id.clone())
                .await
                .unwrap();
            assert_eq!(
                original.collaborator_role(&guest.account_id),
                Some(ShareRole::Editor)
            );
        }

        let stored = storage
            .get_invitation(invitation.id.clone())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, InvitationStatus::Active);
        assert!(stored.has_accepted(&guest.account_id));
    }

    #[tokio::test]
    async fn failed_acceptance_leaves_no_trace() {
        let (storage, _, owner, guest_core, guest, invitation) = shared_setup().await;

        storage.reject_next_write("store unavailable");
        let err = guest_core
            .accept_invitation(&invitation.id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Store(StoreError::WriteRejected(_))
        ));

        // no copy was created for the guest
        let guest_todos = storage.list_todos(guest.account_id.clone()).await.unwrap();
        assert!(guest_todos.is_empty());

        // the invitation and the originals are untouched
        let stored = storage
            .get_invitation(invitation.id.clone())
            .await
            .unwrap()
            .unwrap();
        assert!(stored.accepted_users.is_empty());
        assert_eq!(stored.status, InvitationStatus::Pending);
        for todo in storage.list_todos(owner.account_id.clone()).await.unwrap() {
            assert!(todo.shared_with.is_empty());
        }
    }

    #[tokio::test]
    async fn accepting_twice_changes_nothing() {
        let (storage, _, _, guest_core, guest, invitation) = shared_setup().await;

        let first = guest_core.accept_invitation(&invitation.id).await.unwrap();
        let second = guest_core.accept_invitation(&invitation.id).await.unwrap();

        assert_eq!(first.len(), 2);
        assert!(second.is_empty());
        let stored = storage
            .get_invitation(invitation.id.clone())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            stored
                .accepted_users
                .iter()
                .filter(|c| c.account_id == guest.account_id)
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn dangling_todo_references_are_skipped_in_previews() {
        let (storage, _, owner, guest_core, _, invitation) = shared_setup().await;
        // the owner deletes one of the shared todos before acceptance
        storage
            .delete_todo(owner.account_id.clone(), invitation.todo_ids[0].clone())
            .await
            .unwrap();

        let copies = guest_core.accept_invitation(&invitation.id).await.unwrap();

        assert_eq!(copies.len(), 1);
    }
}
