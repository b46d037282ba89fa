//! Role directory: read-only projection over the per-role account tables.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use fieldflow_core::{AccountId, DisciplineId, WorkflowError, WorkflowResult};

use crate::role::ReviewRole;

/// Resolves role membership, scoped by discipline.
///
/// Both operations are pure queries with no retries or mutation; an empty
/// recipient list is a valid answer, not an error. Infrastructure failures
/// surface as `WorkflowError::DependencyFailure`.
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    /// The discipline `account` is licensed to act on as `role`, if any.
    /// Accounts that are inactive (or, for line reviewers, not entitled to
    /// approve) resolve to `None`.
    async fn resolve_discipline(
        &self,
        account: &AccountId,
        role: ReviewRole,
    ) -> WorkflowResult<Option<DisciplineId>>;

    /// Every account licensed to act as `role` for `discipline`.
    async fn resolve_recipients(
        &self,
        discipline: DisciplineId,
        role: ReviewRole,
    ) -> WorkflowResult<Vec<AccountId>>;
}

#[derive(Debug, Clone)]
struct Membership {
    discipline: DisciplineId,
    active: bool,
    can_approve: bool,
}

/// In-memory role directory for tests and single-process setups.
///
/// Mirrors the shape of the Postgres-backed directory: one membership per
/// (role, account), with active and approval-entitlement flags.
#[derive(Debug, Default)]
pub struct StaticRoleDirectory {
    members: RwLock<HashMap<(ReviewRole, AccountId), Membership>>,
}

impl StaticRoleDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an active, approval-entitled member.
    pub fn insert(&self, role: ReviewRole, account: AccountId, discipline: DisciplineId) {
        self.insert_with_flags(role, account, discipline, true, true);
    }

    pub fn insert_with_flags(
        &self,
        role: ReviewRole,
        account: AccountId,
        discipline: DisciplineId,
        active: bool,
        can_approve: bool,
    ) {
        let mut members = self
            .members
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        members.insert(
            (role, account),
            Membership {
                discipline,
                active,
                can_approve,
            },
        );
    }

    fn eligible(role: ReviewRole, m: &Membership) -> bool {
        // Inspectors only need to be active; line reviewers additionally need
        // the approval entitlement.
        m.active && (role == ReviewRole::Inspector || m.can_approve)
    }
}

#[async_trait]
impl RoleDirectory for StaticRoleDirectory {
    async fn resolve_discipline(
        &self,
        account: &AccountId,
        role: ReviewRole,
    ) -> WorkflowResult<Option<DisciplineId>> {
        let members = self
            .members
            .read()
            .map_err(|_| WorkflowError::dependency("role directory lock poisoned"))?;
        Ok(members
            .get(&(role, account.clone()))
            .filter(|m| Self::eligible(role, m))
            .map(|m| m.discipline))
    }

    async fn resolve_recipients(
        &self,
        discipline: DisciplineId,
        role: ReviewRole,
    ) -> WorkflowResult<Vec<AccountId>> {
        let members = self
            .members
            .read()
            .map_err(|_| WorkflowError::dependency("role directory lock poisoned"))?;
        let mut recipients: Vec<AccountId> = members
            .iter()
            .filter(|((r, _), m)| *r == role && m.discipline == discipline && Self::eligible(role, m))
            .map(|((_, account), _)| account.clone())
            .collect();
        recipients.sort();
        Ok(recipients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piping() -> DisciplineId {
        DisciplineId::new(1)
    }

    fn concrete() -> DisciplineId {
        DisciplineId::new(2)
    }

    #[tokio::test]
    async fn resolves_the_licensed_discipline_per_role() {
        let dir = StaticRoleDirectory::new();
        dir.insert(ReviewRole::LineReviewer, AccountId::new("rev-x"), piping());
        dir.insert(ReviewRole::Inspector, AccountId::new("insp-z"), concrete());

        assert_eq!(
            dir.resolve_discipline(&AccountId::new("rev-x"), ReviewRole::LineReviewer)
                .await
                .unwrap(),
            Some(piping())
        );
        // Same account id is not implicitly licensed for the other role.
        assert_eq!(
            dir.resolve_discipline(&AccountId::new("rev-x"), ReviewRole::Inspector)
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn recipients_match_the_underlying_table_filters() {
        let dir = StaticRoleDirectory::new();
        dir.insert(ReviewRole::Inspector, AccountId::new("insp-1"), piping());
        dir.insert(ReviewRole::Inspector, AccountId::new("insp-2"), piping());
        dir.insert(ReviewRole::Inspector, AccountId::new("insp-3"), concrete());
        dir.insert_with_flags(
            ReviewRole::Inspector,
            AccountId::new("insp-4"),
            piping(),
            false,
            true,
        );

        let recipients = dir
            .resolve_recipients(piping(), ReviewRole::Inspector)
            .await
            .unwrap();
        assert_eq!(
            recipients,
            vec![AccountId::new("insp-1"), AccountId::new("insp-2")]
        );
    }

    #[tokio::test]
    async fn line_reviewers_without_approval_entitlement_are_excluded() {
        let dir = StaticRoleDirectory::new();
        dir.insert_with_flags(
            ReviewRole::LineReviewer,
            AccountId::new("rev-1"),
            piping(),
            true,
            false,
        );

        assert_eq!(
            dir.resolve_discipline(&AccountId::new("rev-1"), ReviewRole::LineReviewer)
                .await
                .unwrap(),
            None
        );
        assert!(
            dir.resolve_recipients(piping(), ReviewRole::LineReviewer)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn zero_recipients_is_an_empty_list_not_an_error() {
        let dir = StaticRoleDirectory::new();
        let recipients = dir
            .resolve_recipients(piping(), ReviewRole::LineReviewer)
            .await
            .unwrap();
        assert!(recipients.is_empty());
    }
}
