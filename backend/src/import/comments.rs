use std::path::Path;

use flarchive_common::document::CommentsDocument;
use tracing::debug;

use crate::{dao::StorageBackend, util};

/// Index comments of an image.
/// A document without comment list is fine, there is just nothing to do
pub async fn index(store: &StorageBackend, path: &Path) -> anyhow::Result<()> {
    let doc: CommentsDocument = util::read_json(path)?;
    let comments = doc.into_comments();

    for comment in &comments {
        store.put_comment(comment).await?;
    }

    debug!(path = %path.display(), count = comments.len(), "indexed comments");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{
        dao::Sqlite,
        import::tests::write_doc,
        model::{EntityKey, GlobalSet, Relation, Summary},
    };

    use super::*;

    #[tokio::test]
    async fn comments_are_linked_to_image() {
        let root = tempfile::tempdir().unwrap();
        let path = write_doc(root.path(), "org1", "111-c.json", r#"{
            "comments": {
                "photo_id": "111",
                "comment": [
                    {"id": "c1", "author": "a1", "datecreate": "1140004800", "_content": "Nice"},
                    {"id": "c2", "author": "a2", "datecreate": "1140436800", "_content": "Where is this?"}
                ]
            }
        }"#);
        let store = Sqlite::in_memory().await;

        index(&store, &path).await.unwrap();

        let c2 = store.comment("c2").await.unwrap().unwrap();
        assert_eq!(c2.image_id, "111");
        assert_eq!(c2.created, 1140436800);
        assert_eq!(c2.fields()[1], ("author", "author:a2".to_string()));
        assert_eq!(
            store.related(&EntityKey::image("111"), Relation::Comments).await.unwrap(),
            ["c1", "c2"]
        );
        assert_eq!(store.members(GlobalSet::Comments).await.unwrap(), ["c1", "c2"]);
        assert_eq!(store.members(GlobalSet::Authors).await.unwrap(), ["a1", "a2"]);
    }

    #[tokio::test]
    async fn missing_comment_list_is_a_no_op() {
        let root = tempfile::tempdir().unwrap();
        let store = Sqlite::in_memory().await;

        for (i, json) in [
            r#"{"stat": "ok"}"#,
            r#"{"comments": {"photo_id": "111"}}"#,
            r#"{"comments": {}}"#,
        ].into_iter().enumerate() {
            let path = write_doc(root.path(), "org1", &format!("{i}-c.json"), json);
            index(&store, &path).await.unwrap();
        }

        assert_eq!(store.get_summary().await.unwrap(), Summary::default());
    }
}
