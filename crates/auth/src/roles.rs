//! Role sets used for authorization decisions.

use std::collections::HashSet;
use std::fmt;

use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Superuser marker role. If present in a set, authorization checks that
/// would otherwise require a specific role are bypassed.
pub const ROLE_ADMIN: &str = "admin";

/// A mutable set of role names, safe for concurrent readers and writers.
///
/// Every operation goes through the set's own readers/writer lock, so a
/// `RoleSet` can be shared across request-handling contexts through `&self`.
/// Mutators return `&Self` to allow chaining.
///
/// Serialization is a comma-joined list with no escaping; a role name
/// containing a comma is unrepresentable. Member order is unspecified:
/// callers may rely on round-trip semantics only, never on byte-stable
/// output.
#[derive(Debug, Default)]
pub struct RoleSet {
    inner: RwLock<HashSet<String>>,
}

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add roles to the set. Adding an existing role is a no-op.
    pub fn add<I>(&self, roles: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut set = self.inner.write();
        for role in roles {
            set.insert(role.into());
        }
        self
    }

    /// Remove roles from the set. Removing an absent role is a no-op.
    pub fn remove<I>(&self, roles: I) -> &Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut set = self.inner.write();
        for role in roles {
            set.remove(role.as_ref());
        }
        self
    }

    /// Check if the role is in the set.
    pub fn has(&self, role: &str) -> bool {
        self.inner.read().contains(role)
    }

    /// Check if any of the given roles is in the set.
    /// An empty argument list yields `false`.
    pub fn has_any<I>(&self, roles: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let set = self.inner.read();
        roles.into_iter().any(|r| set.contains(r.as_ref()))
    }

    /// Check if all of the given roles are in the set.
    /// An empty argument list yields `true` (vacuous truth).
    pub fn has_all<I>(&self, roles: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let set = self.inner.read();
        roles.into_iter().all(|r| set.contains(r.as_ref()))
    }

    /// Whether the superuser marker is present.
    pub fn is_admin(&self) -> bool {
        self.has(ROLE_ADMIN)
    }

    /// Member role names, in no defined order.
    pub fn list(&self) -> Vec<String> {
        self.inner.read().iter().cloned().collect()
    }

    /// Replace the entire set with the comma-split tokens of `s`.
    ///
    /// An empty string yields the single empty-string role. That quirk is
    /// preserved on purpose: the journal format round-trips through this
    /// method and existing files depend on it.
    pub fn load_from(&self, s: &str) -> &Self {
        let mut set = self.inner.write();
        set.clear();
        for role in s.split(',') {
            set.insert(role.to_string());
        }
        self
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.list().join(","))
    }
}

impl Clone for RoleSet {
    fn clone(&self) -> Self {
        Self {
            inner: RwLock::new(self.inner.read().clone()),
        }
    }
}

impl PartialEq for RoleSet {
    fn eq(&self, other: &Self) -> bool {
        // Snapshot first so comparing a set with itself cannot deadlock.
        let mine = self.inner.read().clone();
        let theirs = other.inner.read();
        mine == *theirs
    }
}

impl Eq for RoleSet {}

impl Serialize for RoleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RoleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let set = RoleSet::new();
        set.load_from(&s);
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_remove_are_idempotent() {
        let set = RoleSet::new();
        set.add(["reader", "reader", "writer"]).add(["reader"]);
        let mut roles = set.list();
        roles.sort();
        assert_eq!(roles, vec!["reader", "writer"]);

        set.remove(["reader"]).remove(["reader", "missing"]);
        assert_eq!(set.list(), vec!["writer"]);
    }

    #[test]
    fn has_any_with_no_arguments_is_false() {
        let set = RoleSet::new();
        set.add(["reader"]);
        assert!(!set.has_any(Vec::<String>::new()));
        assert!(set.has_any(["writer", "reader"]));
        assert!(!set.has_any(["writer"]));
    }

    #[test]
    fn has_all_with_no_arguments_is_true() {
        let set = RoleSet::new();
        assert!(set.has_all(Vec::<String>::new()));

        set.add(["a", "b"]);
        assert!(set.has_all(["a", "b"]));
        assert!(!set.has_all(["a", "b", "c"]));
    }

    #[test]
    fn round_trip_through_string_form() {
        let set = RoleSet::new();
        set.add(["reader", "writer", "auditor"]);

        let reloaded = RoleSet::new();
        reloaded.load_from(&set.to_string());
        assert_eq!(set, reloaded);
    }

    #[test]
    fn load_from_empty_string_yields_empty_string_role() {
        let set = RoleSet::new();
        set.load_from("");
        assert_eq!(set.list(), vec![String::new()]);
    }

    #[test]
    fn load_from_replaces_existing_members() {
        let set = RoleSet::new();
        set.add(["old"]);
        set.load_from("a,b");
        let mut roles = set.list();
        roles.sort();
        assert_eq!(roles, vec!["a", "b"]);
        assert!(!set.has("old"));
    }

    #[test]
    fn admin_marker() {
        let set = RoleSet::new();
        assert!(!set.is_admin());
        set.add([ROLE_ADMIN]);
        assert!(set.is_admin());
    }

    #[test]
    fn concurrent_readers_and_writers() {
        use std::sync::Arc;

        let set = Arc::new(RoleSet::new());
        let mut handles = Vec::new();
        for i in 0..4 {
            let set = Arc::clone(&set);
            handles.push(std::thread::spawn(move || {
                for j in 0..100 {
                    set.add([format!("role-{i}-{j}")]);
                    let _ = set.has("role-0-0");
                    let _ = set.list();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(set.list().len(), 400);
    }
}
