//! Key model.
//!
//! A key names one entity: a kind, an identifier (string name or integer id),
//! an optional parent key and an optional namespace. The engine never looks
//! inside keys; this type exists for the bundled oracles.

use serde::{Deserialize, Serialize};

/// Identifier part of a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyId {
    Name(String),
    Id(i64),
}

impl std::fmt::Display for KeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyId::Name(name) => write!(f, "{name}"),
            KeyId::Id(id) => write!(f, "{id}"),
        }
    }
}

/// An entity key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    pub kind: String,
    pub id: KeyId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<Key>>,

    /// None means the default namespace.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl Key {
    /// Key with a string name, e.g. `Key::name("Book", "dune")`.
    pub fn name(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: KeyId::Name(name.into()),
            parent: None,
            namespace: None,
        }
    }

    /// Key with an integer id.
    pub fn id(kind: impl Into<String>, id: i64) -> Self {
        Self {
            kind: kind.into(),
            id: KeyId::Id(id),
            parent: None,
            namespace: None,
        }
    }

    pub fn with_parent(mut self, parent: Key) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Namespace name, with the default namespace as `""`.
    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or("")
    }

    /// Encoded ancestor path, root first: `Author:'frank'/Book:42`.
    ///
    /// Names are quoted and integer ids are bare, so `Book:'42'` and
    /// `Book:42` stay distinct. Separator characters inside kinds and names
    /// are percent-escaped; two keys share a path only if they are equal
    /// (namespace aside).
    pub fn path(&self) -> String {
        let segment = match self.id {
            KeyId::Name(ref name) => format!("{}:'{}'", escape(&self.kind), escape(name)),
            KeyId::Id(id) => format!("{}:{id}", escape(&self.kind)),
        };
        match self.parent {
            Some(ref parent) => format!("{}/{segment}", parent.path()),
            None => segment,
        }
    }
}

/// Percent-escape the characters that carry structure in a key path.
fn escape(part: &str) -> String {
    let mut out = String::with_capacity(part.len());
    for c in part.chars() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            ':' => out.push_str("%3A"),
            '\'' => out.push_str("%27"),
            _ => out.push(c),
        }
    }
    out
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.namespace {
            Some(ref ns) if !ns.is_empty() => write!(f, "{ns}::{}", self.path()),
            _ => write!(f, "{}", self.path()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_includes_ancestors_root_first() {
        let key = Key::id("Book", 42).with_parent(Key::name("Author", "frank"));
        assert_eq!(key.path(), "Author:'frank'/Book:42");
    }

    #[test]
    fn name_and_integer_id_paths_differ() {
        assert_ne!(Key::name("Book", "42").path(), Key::id("Book", 42).path());
    }

    #[test]
    fn separators_in_names_do_not_fake_a_parent() {
        let flat = Key::name("A", "x/B:1");
        let nested = Key::name("B", "1").with_parent(Key::name("A", "x"));
        assert_ne!(flat.path(), nested.path());
        assert_eq!(flat.path(), "A:'x%2FB%3A1'");
    }

    #[test]
    fn separators_in_kinds_and_quotes_are_escaped() {
        assert_ne!(
            Key::name("A:B", "c").path(),
            Key::name("A", "B:c").path()
        );
        assert_ne!(Key::name("A", "x'").path(), Key::name("A", "x%27").path());
        assert_eq!(Key::name("A", "50%").path(), "A:'50%25'");
    }

    #[test]
    fn display_prefixes_non_default_namespace() {
        let key = Key::name("Book", "dune").in_namespace("library");
        assert_eq!(key.to_string(), "library::Book:'dune'");
        assert_eq!(Key::name("Book", "dune").to_string(), "Book:'dune'");
    }

    #[test]
    fn default_namespace_is_empty() {
        assert_eq!(Key::name("Book", "dune").namespace(), "");
        assert_eq!(Key::name("Book", "dune").in_namespace("x").namespace(), "x");
    }
}
