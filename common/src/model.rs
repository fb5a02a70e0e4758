use enum_iterator::Sequence;
use indexmap::IndexMap;
use serde::{Serialize, Deserialize};

/// Photo archived from an organization's photostream
#[cfg_attr(feature = "backend", derive(sqlx::FromRow))]
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct Image {
    /// Flickr photo id
    pub id: String,
    /// View count at the time of the dump
    pub views: i64,
    pub title: String,
    /// Upload time (unix timestamp)
    pub created: i64,
    /// Owning organization (nsid), absent in dumps without owner block
    pub owner_id: Option<String>,
}

/// Tag attached to an image by some author
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct ImageTag {
    pub image_id: String,
    /// Raw tag text, used as tag id
    pub tag: String,
    pub author_id: String,
    /// Tag was generated programmatically
    pub machine: bool,
}

/// Tag as stored in the index
#[cfg_attr(feature = "backend", derive(sqlx::FromRow))]
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct Tag {
    pub name: String,
    /// Set once any source marks the tag as a machine tag
    pub machine: bool,
}

/// Annotation drawn over a region of an image
#[cfg_attr(feature = "backend", derive(sqlx::FromRow))]
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct Note {
    pub id: String,
    pub image_id: String,
    pub author_id: String,
    pub content: String,
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

#[cfg_attr(feature = "backend", derive(sqlx::FromRow))]
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct Comment {
    pub id: String,
    /// Commented image
    pub image_id: String,
    pub author_id: String,
    pub content: String,
    /// Creation time (unix timestamp)
    pub created: i64,
}

/// Photo album the image is a member of
#[cfg_attr(feature = "backend", derive(sqlx::FromRow))]
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Debug)]
pub struct PhotoSet {
    pub id: String,
    pub title: String,
    pub views: i64,
}

/// Index summary: member count of every global set
#[cfg_attr(feature = "backend", derive(sqlx::FromRow))]
#[derive(Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Debug, Default)]
pub struct Summary {
    pub images: u32,
    pub tags: u32,
    pub machine_tags: u32,
    pub notes: u32,
    pub comments: u32,
    pub sets: u32,
    pub owners: u32,
    pub authors: u32,
}

/// Organization category.
///
/// Declaration order is the report column order
#[derive(
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Clone,
    Copy,
    Debug,
    Sequence,
)]
pub enum OrgType {
    #[serde(rename = "M")]
    Museum,
    #[serde(rename = "L")]
    Library,
    #[serde(rename = "A")]
    Archive,
}

impl OrgType {
    /// Name of the aggregate bucket for this type
    pub fn bucket(&self) -> &'static str {
        match self {
            OrgType::Museum => "M",
            OrgType::Library => "L",
            OrgType::Archive => "A",
        }
    }
}

/// Entry of the organization mapping
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
pub struct Organization {
    #[serde(rename = "type")]
    pub org_type: OrgType,
    /// Display name, not used for bucketing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Organization id -> organization, in file order
pub type Organizations = IndexMap<String, Organization>;

impl Image {
    /// Image key fields as `(field, value)` pairs
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("views", self.views.to_string()),
            ("title", self.title.clone()),
            ("created", self.created.to_string()),
            ("owner", self.owner_id
                .as_ref()
                .map(|o| crate::EntityKey::owner(o).to_string())
                .unwrap_or_default()),
        ]
    }
}

impl Note {
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("author", crate::EntityKey::author(&self.author_id).to_string()),
            ("content", self.content.clone()),
            ("x", self.x.to_string()),
            ("y", self.y.to_string()),
            ("w", self.w.to_string()),
            ("h", self.h.to_string()),
            ("image", crate::EntityKey::image(&self.image_id).to_string()),
        ]
    }
}

impl Comment {
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("content", self.content.clone()),
            ("author", crate::EntityKey::author(&self.author_id).to_string()),
            ("image", crate::EntityKey::image(&self.image_id).to_string()),
            ("created", self.created.to_string()),
        ]
    }
}

impl PhotoSet {
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("title", self.title.clone()),
            ("views", self.views.to_string()),
        ]
    }
}

impl Tag {
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![("machine", (self.machine as u8).to_string())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn organizations_keep_file_order() {
        let orgs: Organizations = serde_json::from_str(r#"{
            "zz@N01": {"type": "A", "name": "Zeta Archive"},
            "aa@N02": {"type": "M"},
            "mm@N03": {"type": "L"}
        }"#).unwrap();

        let ids: Vec<_> = orgs.keys().map(String::as_str).collect();
        assert_eq!(ids, ["zz@N01", "aa@N02", "mm@N03"]);
        assert_eq!(orgs["aa@N02"].org_type, OrgType::Museum);
        assert_eq!(orgs["zz@N01"].name.as_deref(), Some("Zeta Archive"));
    }

    #[test]
    fn unknown_org_type_is_rejected() {
        let res: Result<Organizations, _> = serde_json::from_str(r#"{"x": {"type": "Q"}}"#);
        assert!(res.is_err());
    }

    #[test]
    fn type_buckets_in_column_order() {
        let buckets: Vec<_> = enum_iterator::all::<OrgType>()
            .map(|t| t.bucket())
            .collect();
        assert_eq!(buckets, ["M", "L", "A"]);
    }
}
