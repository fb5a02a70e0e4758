//! `flickr.photos.getInfo` dump (`<photo id>-i.json`)

use serde::Deserialize;

use crate::{Image, ImageTag, Note};

#[derive(Deserialize, Debug)]
pub struct InfoDocument {
    photo: Photo,
}

#[derive(Deserialize, Debug)]
struct Photo {
    #[serde(deserialize_with = "super::text")]
    id: String,
    #[serde(default, deserialize_with = "super::int")]
    views: i64,
    #[serde(default, deserialize_with = "super::text")]
    title: String,
    #[serde(deserialize_with = "super::int")]
    dateuploaded: i64,
    owner: Option<Owner>,
    #[serde(default)]
    tags: Tags,
    #[serde(default)]
    notes: Notes,
}

#[derive(Deserialize, Debug)]
struct Owner {
    #[serde(deserialize_with = "super::text")]
    nsid: String,
}

#[derive(Deserialize, Debug, Default)]
struct Tags {
    #[serde(default)]
    tag: Vec<RawTag>,
}

#[derive(Deserialize, Debug)]
struct RawTag {
    #[serde(deserialize_with = "super::text")]
    raw: String,
    #[serde(deserialize_with = "super::text")]
    author: String,
    #[serde(default, deserialize_with = "super::flag")]
    machine_tag: bool,
}

#[derive(Deserialize, Debug, Default)]
struct Notes {
    #[serde(default)]
    note: Vec<RawNote>,
}

#[derive(Deserialize, Debug)]
struct RawNote {
    #[serde(deserialize_with = "super::text")]
    id: String,
    #[serde(deserialize_with = "super::text")]
    author: String,
    #[serde(rename = "_content", default)]
    content: String,
    #[serde(deserialize_with = "super::int")]
    x: i64,
    #[serde(deserialize_with = "super::int")]
    y: i64,
    #[serde(deserialize_with = "super::int")]
    w: i64,
    #[serde(deserialize_with = "super::int")]
    h: i64,
}

/// Everything an info document says about one image
#[derive(Debug, PartialEq)]
pub struct PhotoRecords {
    pub image: Image,
    pub tags: Vec<ImageTag>,
    pub notes: Vec<Note>,
}

impl InfoDocument {
    pub fn into_records(self) -> PhotoRecords {
        let Photo { id, views, title, dateuploaded, owner, tags, notes } = self.photo;

        let tags = tags.tag
            .into_iter()
            .map(|t| ImageTag {
                image_id: id.clone(),
                tag: t.raw,
                author_id: t.author,
                machine: t.machine_tag,
            })
            .collect();

        let notes = notes.note
            .into_iter()
            .map(|n| Note {
                id: n.id,
                image_id: id.clone(),
                author_id: n.author,
                content: n.content,
                x: n.x,
                y: n.y,
                w: n.w,
                h: n.h,
            })
            .collect();

        PhotoRecords {
            image: Image {
                id,
                views,
                title,
                created: dateuploaded,
                owner_id: owner.map(|o| o.nsid),
            },
            tags,
            notes,
        }
    }
}
