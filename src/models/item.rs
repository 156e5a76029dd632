//! Item references and target keys shared by planning and batching.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the entity receiving reassigned or escalated items
///
/// Equality is plain string identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetKey(String);

impl TargetKey {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetKey {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TargetKey {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Kind of access a review item grants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessKind {
    Entitlement,
    AccessProfile,
    Role,
}

/// Access granted by a review item, with the ownership data the service
/// denormalizes onto it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRef {
    pub kind: AccessKind,
    pub id: String,
    pub name: Option<String>,
    pub source_id: Option<String>,
    pub owner_id: Option<String>,
}

impl AccessRef {
    pub fn new(kind: AccessKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            name: None,
            source_id: None,
            owner_id: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_source(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }
}

/// A reviewable item (certification or review item) as the engine sees it
///
/// `name` and `email` exist for operator-facing messages only. `assignee` is
/// the reviewer currently holding the item; a plan never hands an item back to
/// its assignee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReference {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub assignee: Option<TargetKey>,
    pub access: Option<AccessRef>,
    /// Identity whose access is under review
    pub identity_id: Option<String>,
}

impl ItemReference {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
            assignee: None,
            access: None,
            identity_id: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<TargetKey>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn with_access(mut self, access: AccessRef) -> Self {
        self.access = Some(access);
        self
    }

    pub fn with_identity(mut self, identity_id: impl Into<String>) -> Self {
        self.identity_id = Some(identity_id.into());
        self
    }

    /// Name for operator messages, falling back to the id
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Items the planner can check for self-assignment
pub trait Assignable {
    fn item_id(&self) -> &str;

    fn current_assignee(&self) -> Option<&TargetKey>;

    fn display_name(&self) -> &str {
        self.item_id()
    }
}

impl Assignable for ItemReference {
    fn item_id(&self) -> &str {
        &self.id
    }

    fn current_assignee(&self) -> Option<&TargetKey> {
        self.assignee.as_ref()
    }

    fn display_name(&self) -> &str {
        ItemReference::display_name(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_key_value_equality() {
        assert_eq!(TargetKey::from("m1"), TargetKey::new(String::from("m1")));
        assert_ne!(TargetKey::from("m1"), TargetKey::from("M1"));
        assert_eq!(TargetKey::from("m1").to_string(), "m1");
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let named = ItemReference::new("c1").with_name("Q3 review: Alice");
        let bare = ItemReference::new("c2");

        assert_eq!(named.display_name(), "Q3 review: Alice");
        assert_eq!(bare.display_name(), "c2");
    }

    #[test]
    fn test_access_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&AccessKind::AccessProfile).unwrap(),
            "\"ACCESS_PROFILE\""
        );
    }
}
