//! Index key conventions
//!
//! Every entity is addressed as `<kind>:<id>`, groupings as
//! `<kind>:<id>:<relation>` or by the name of a global set:
//!
//! * `image:1234` - info for image 1234
//! * `image:1234:tags` - tags of image 1234
//! * `tag:foo:images` - images tagged with "foo"
//! * `owner:12@N01:images` - images uploaded by organization `12@N01`
//! * `comments` - every comment in the index

use std::{fmt::{self, Display}, str::FromStr};

use enum_iterator::Sequence;
use serde::{Serialize, Deserialize};
use thiserror::Error;

#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Debug, Hash, Sequence)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Image,
    Tag,
    Note,
    Comment,
    Set,
    Owner,
    Author,
}

impl EntityKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            EntityKind::Image => "image",
            EntityKind::Tag => "tag",
            EntityKind::Note => "note",
            EntityKind::Comment => "comment",
            EntityKind::Set => "set",
            EntityKind::Owner => "owner",
            EntityKind::Author => "author",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        enum_iterator::all::<Self>().find(|k| k.prefix() == prefix)
    }

    /// Relations that can be listed for an entity of this kind
    pub fn relations(&self) -> &'static [Relation] {
        match self {
            EntityKind::Image => &[
                Relation::Tags,
                Relation::Notes,
                Relation::Comments,
                Relation::Sets,
            ],
            EntityKind::Tag => &[Relation::Images, Relation::Authors],
            EntityKind::Set | EntityKind::Owner => &[Relation::Images],
            EntityKind::Note | EntityKind::Comment | EntityKind::Author => &[],
        }
    }
}

/// Named grouping hanging off an entity key
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Debug, Sequence)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Images,
    Tags,
    Notes,
    Comments,
    Sets,
    Authors,
}

impl Relation {
    pub fn name(&self) -> &'static str {
        match self {
            Relation::Images => "images",
            Relation::Tags => "tags",
            Relation::Notes => "notes",
            Relation::Comments => "comments",
            Relation::Sets => "sets",
            Relation::Authors => "authors",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        enum_iterator::all::<Self>().find(|r| r.name() == name)
    }

    /// Kind of entities listed by this relation
    pub fn member_kind(&self) -> EntityKind {
        match self {
            Relation::Images => EntityKind::Image,
            Relation::Tags => EntityKind::Tag,
            Relation::Notes => EntityKind::Note,
            Relation::Comments => EntityKind::Comment,
            Relation::Sets => EntityKind::Set,
            Relation::Authors => EntityKind::Author,
        }
    }
}

/// Index-wide entity collections
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Debug, Sequence)]
pub enum GlobalSet {
    Images,
    Tags,
    MachineTags,
    Notes,
    Comments,
    Sets,
    Owners,
    Authors,
}

impl GlobalSet {
    pub fn name(&self) -> &'static str {
        match self {
            GlobalSet::Images => "images",
            GlobalSet::Tags => "tags",
            GlobalSet::MachineTags => "machinetags",
            GlobalSet::Notes => "notes",
            GlobalSet::Comments => "comments",
            GlobalSet::Sets => "sets",
            GlobalSet::Owners => "owners",
            GlobalSet::Authors => "authors",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        enum_iterator::all::<Self>().find(|s| s.name() == name)
    }

    pub fn member_kind(&self) -> EntityKind {
        match self {
            GlobalSet::Images => EntityKind::Image,
            GlobalSet::Tags | GlobalSet::MachineTags => EntityKind::Tag,
            GlobalSet::Notes => EntityKind::Note,
            GlobalSet::Comments => EntityKind::Comment,
            GlobalSet::Sets => EntityKind::Set,
            GlobalSet::Owners => EntityKind::Owner,
            GlobalSet::Authors => EntityKind::Author,
        }
    }
}

/// `<kind>:<id>`
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug, Hash)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityKey {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }

    pub fn image(id: impl Into<String>) -> Self { Self::new(EntityKind::Image, id) }
    pub fn tag(name: impl Into<String>) -> Self { Self::new(EntityKind::Tag, name) }
    pub fn owner(id: impl Into<String>) -> Self { Self::new(EntityKind::Owner, id) }
    pub fn author(id: impl Into<String>) -> Self { Self::new(EntityKind::Author, id) }
}

impl Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.prefix(), self.id)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum KeyError {
    #[error("empty key")]
    Empty,
    #[error("unknown key kind `{0}`")]
    UnknownKind(String),
    #[error("key `{0}` has no id")]
    MissingId(String),
}

/// Parsed lookup key
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum KeyPattern {
    /// `images`, `tags`, ...
    Global(GlobalSet),
    /// `image:1234`
    Entity(EntityKey),
    /// `image:1234:tags`
    Related(EntityKey, Relation),
}

impl FromStr for KeyPattern {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KeyError::Empty);
        }

        if let Some(set) = GlobalSet::from_name(s) {
            return Ok(Self::Global(set));
        }

        let Some((prefix, rest)) = s.split_once(':') else {
            return Err(KeyError::UnknownKind(s.to_string()));
        };
        let kind = EntityKind::from_prefix(prefix)
            .ok_or_else(|| KeyError::UnknownKind(prefix.to_string()))?;

        // Tag names may contain `:` themselves (machine tags), so the suffix
        // is a relation only if this kind has one by that name
        let related = rest
            .rsplit_once(':')
            .and_then(|(id, rel)| Some((id, Relation::from_name(rel)?)))
            .filter(|(id, rel)| !id.is_empty() && kind.relations().contains(rel));

        match related {
            Some((id, rel)) => Ok(Self::Related(EntityKey::new(kind, id), rel)),
            None if rest.is_empty() => Err(KeyError::MissingId(s.to_string())),
            None => Ok(Self::Entity(EntityKey::new(kind, rest))),
        }
    }
}

impl Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPattern::Global(set) => f.write_str(set.name()),
            KeyPattern::Entity(key) => key.fmt(f),
            KeyPattern::Related(key, rel) => write!(f, "{key}:{}", rel.name()),
        }
    }
}
