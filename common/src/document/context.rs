//! `flickr.photos.getAllContexts` dump (`<photo id>-ctx.json`)
//!
//! The document itself doesn't name the photo, the id comes from file name.

use serde::Deserialize;

use crate::PhotoSet;

#[derive(Deserialize, Debug)]
pub struct ContextDocument {
    set: Option<Vec<RawSet>>,
}

#[derive(Deserialize, Debug)]
struct RawSet {
    #[serde(deserialize_with = "super::text")]
    id: String,
    #[serde(default, deserialize_with = "super::text")]
    title: String,
    #[serde(default, deserialize_with = "super::int")]
    view_count: i64,
}

impl ContextDocument {
    /// Sets the photo belongs to, empty if document has no set list
    pub fn into_sets(self) -> Vec<PhotoSet> {
        self.set
            .unwrap_or_default()
            .into_iter()
            .map(|s| PhotoSet {
                id: s.id,
                title: s.title,
                views: s.view_count,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_memberships() {
        let doc: ContextDocument = serde_json::from_str(r#"{
            "set": [
                {"id": "72157603", "title": "Bridges", "view_count": "120"},
                {"id": "72157604", "title": "Rivers", "view_count": 3}
            ],
            "pool": [{"id": "pool1", "title": "Some group"}],
            "stat": "ok"
        }"#).unwrap();

        assert_eq!(doc.into_sets(), vec![
            PhotoSet { id: "72157603".into(), title: "Bridges".into(), views: 120 },
            PhotoSet { id: "72157604".into(), title: "Rivers".into(), views: 3 },
        ]);
    }

    #[test]
    fn no_set_list() {
        let doc: ContextDocument = serde_json::from_str(r#"{"pool": [], "stat": "ok"}"#).unwrap();
        assert!(doc.into_sets().is_empty());
    }
}
