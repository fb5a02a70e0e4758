//! `flickr.photos.comments.getList` dump (`<photo id>-c.json`)

use serde::Deserialize;

use crate::Comment;

#[derive(Deserialize, Debug)]
pub struct CommentsDocument {
    comments: Option<CommentList>,
}

#[derive(Deserialize, Debug)]
struct CommentList {
    #[serde(default, deserialize_with = "super::opt_text")]
    photo_id: Option<String>,
    comment: Option<Vec<RawComment>>,
}

#[derive(Deserialize, Debug)]
struct RawComment {
    #[serde(deserialize_with = "super::text")]
    id: String,
    #[serde(deserialize_with = "super::text")]
    author: String,
    #[serde(rename = "_content", default)]
    content: String,
    #[serde(deserialize_with = "super::int")]
    datecreate: i64,
}

impl CommentsDocument {
    /// Comments of the photo.
    ///
    /// Empty if the document has no comment list or doesn't say which photo
    /// the comments belong to
    pub fn into_comments(self) -> Vec<Comment> {
        let Some(CommentList { photo_id: Some(image_id), comment: Some(list) }) = self.comments
        else {
            return vec![]
        };

        list.into_iter()
            .map(|c| Comment {
                id: c.id,
                image_id: image_id.clone(),
                author_id: c.author,
                content: c.content,
                created: c.datecreate,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comments(json: &str) -> Vec<Comment> {
        serde_json::from_str::<CommentsDocument>(json).unwrap().into_comments()
    }

    #[test]
    fn comment_list() {
        let list = comments(r#"{
            "comments": {
                "photo_id": "111",
                "comment": [
                    {"id": "c1", "author": "a1", "authorname": "x", "datecreate": "1139000000",
                     "permalink": "http://...", "_content": "Nice"},
                    {"id": "c2", "author": "a2", "datecreate": 1139000100, "_content": "Great"}
                ]
            },
            "stat": "ok"
        }"#);

        assert_eq!(list, vec![
            Comment {
                id: "c1".into(),
                image_id: "111".into(),
                author_id: "a1".into(),
                content: "Nice".into(),
                created: 1139000000,
            },
            Comment {
                id: "c2".into(),
                image_id: "111".into(),
                author_id: "a2".into(),
                content: "Great".into(),
                created: 1139000100,
            },
        ]);
    }

    #[test]
    fn missing_structure_means_no_comments() {
        assert!(comments(r#"{"stat": "ok"}"#).is_empty());
        assert!(comments(r#"{"comments": {"photo_id": "111"}}"#).is_empty());
        assert!(comments(r#"{"comments": {"comment": [
            {"id": "c1", "author": "a1", "datecreate": 1}
        ]}}"#).is_empty());
    }
}
