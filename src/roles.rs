//! Role-gated access: a closed set of roles and an explicit
//! capability check, instead of inheritance-based access control.

use rustc_hash::FxHashMap;

use crate::types::Account;

/// The closed set of privileged roles. Permissionless operations
/// (bidding, post-window auction opening) require no role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    /// May grant/revoke roles and perform any gated operation.
    Admin,
    /// May start and end rebalances.
    RebalanceManager,
    /// May open auctions during the exclusivity window and close
    /// them at any time.
    AuctionLauncher,
}

/// Role assignments, keyed by account.
#[derive(Clone, Debug, Default)]
pub struct Roles {
    grants: FxHashMap<Account, Vec<Role>>,
}

impl Roles {
    /// A fresh table with `admin` holding the Admin role.
    pub fn with_admin(admin: Account) -> Self {
        let mut roles = Self::default();
        roles.grant(admin, Role::Admin);
        roles
    }

    pub fn grant(&mut self, account: Account, role: Role) {
        let entry = self.grants.entry(account).or_default();
        if !entry.contains(&role) {
            entry.push(role);
        }
    }

    pub fn revoke(&mut self, account: Account, role: Role) {
        if let Some(entry) = self.grants.get_mut(&account) {
            entry.retain(|r| *r != role);
        }
    }

    /// True if `account` holds `role`. Admin implies every role.
    pub fn allows(&self, account: Account, role: Role) -> bool {
        match self.grants.get(&account) {
            Some(held) => held.contains(&role) || held.contains(&Role::Admin),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_implies_everything() {
        let roles = Roles::with_admin(Account(1));
        assert!(roles.allows(Account(1), Role::Admin));
        assert!(roles.allows(Account(1), Role::RebalanceManager));
        assert!(roles.allows(Account(1), Role::AuctionLauncher));
        assert!(!roles.allows(Account(2), Role::AuctionLauncher));
    }

    #[test]
    fn grant_and_revoke() {
        let mut roles = Roles::with_admin(Account(1));
        roles.grant(Account(2), Role::AuctionLauncher);
        assert!(roles.allows(Account(2), Role::AuctionLauncher));
        assert!(!roles.allows(Account(2), Role::RebalanceManager));

        roles.revoke(Account(2), Role::AuctionLauncher);
        assert!(!roles.allows(Account(2), Role::AuctionLauncher));
    }

    #[test]
    fn duplicate_grant_is_idempotent() {
        let mut roles = Roles::default();
        roles.grant(Account(3), Role::RebalanceManager);
        roles.grant(Account(3), Role::RebalanceManager);
        roles.revoke(Account(3), Role::RebalanceManager);
        assert!(!roles.allows(Account(3), Role::RebalanceManager));
    }
}
