pub use flarchive_common::{
    Image, ImageTag, Tag, Note, Comment, PhotoSet, Summary,
    OrgType, Organization, Organizations,
    EntityKey, EntityKind, GlobalSet, Relation, KeyPattern,
};

/// Dated entity attributed to the owner of an image.
///
/// For an upload `image_id == id`, for a comment it is the commented image
#[derive(sqlx::FromRow, Debug, PartialEq, Eq, Clone)]
pub struct Activity {
    /// Id of the image or comment
    pub id: String,
    pub image_id: String,
    /// Owner of the image, `None` if the image is unknown or has no owner
    pub owner_id: Option<String>,
    /// Unix timestamp
    pub created: i64,
}
