// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Static credential store.
//!
//! An opaque lookup of username → password and username → role. The store
//! is built once at startup and never mutated.

use std::collections::HashMap;

use super::Role;

#[derive(Debug, Clone)]
struct Account {
    password: String,
    role: Role,
}

#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    accounts: HashMap<String, Account>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts every node deployment starts with.
    pub fn seeded() -> Self {
        Self::new()
            .with_account("student1", "pass123", Role::Student)
            .with_account("student2", "pass123", Role::Student)
            .with_account("faculty1", "pass123", Role::Faculty)
    }

    pub fn with_account(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
        role: Role,
    ) -> Self {
        self.accounts.insert(
            username.into(),
            Account {
                password: password.into(),
                role,
            },
        );
        self
    }

    /// Role for `username` if the password matches.
    ///
    /// Unknown users and wrong passwords both return `None`.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<Role> {
        self.accounts
            .get(username)
            .filter(|account| account.password == password)
            .map(|account| account.role)
    }
}

#[cfg(test)]
impl CredentialStore {
    pub fn role_of(&self, username: &str) -> Option<Role> {
        self.accounts.get(username).map(|account| account.role)
    }

    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.accounts.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_accounts_resolve_roles() {
        let store = CredentialStore::seeded();
        assert_eq!(store.authenticate("student1", "pass123"), Some(Role::Student));
        assert_eq!(store.authenticate("faculty1", "pass123"), Some(Role::Faculty));
        assert_eq!(store.role_of("student2"), Some(Role::Student));
    }

    #[test]
    fn wrong_password_and_unknown_user_look_the_same() {
        let store = CredentialStore::seeded();
        assert_eq!(store.authenticate("student1", "nope"), None);
        assert_eq!(store.authenticate("ghost", "pass123"), None);
        assert_eq!(store.authenticate("", ""), None);
    }
}
