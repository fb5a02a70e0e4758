//! Document indexing
//!
//! Each organization directory holds three kinds of documents per photo,
//! told apart by file name suffix:
//!
//!     2163445674-i.json     photo info, tags and notes
//!     2163445674-c.json     comments
//!     2163445674-ctx.json   sets the photo belongs to

use std::path::Path;

use tracing::{debug, error};
use walkdir::WalkDir;

use crate::{config::Suffixes, dao::StorageBackend};

mod info;
mod comments;
mod context;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    Info,
    Comments,
    Context,
}

impl DocumentKind {
    /// Decide document type by file name
    pub fn detect(file_name: &str, suffixes: &Suffixes) -> Option<Self> {
        match () {
            _ if file_name.ends_with(&suffixes.context) => Some(Self::Context),
            _ if file_name.ends_with(&suffixes.comments) => Some(Self::Comments),
            _ if file_name.ends_with(&suffixes.info) => Some(Self::Info),
            _ => None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DocumentKind::Info => "info",
            DocumentKind::Comments => "comments",
            DocumentKind::Context => "context",
        }
    }
}

/// Counters of an indexing run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Indexed info documents
    pub info: u32,
    /// Indexed comment documents
    pub comments: u32,
    /// Indexed context documents
    pub context: u32,
    /// Documents skipped because of an error
    pub failed: u32,
    /// Files without known suffix
    pub ignored: u32,
}

impl IndexStats {
    fn record(&mut self, kind: DocumentKind) {
        match kind {
            DocumentKind::Info => self.info += 1,
            DocumentKind::Comments => self.comments += 1,
            DocumentKind::Context => self.context += 1,
        }
    }

    /// Count of successfully indexed documents
    pub fn indexed(&self) -> u32 {
        self.info + self.comments + self.context
    }
}

/// Parse document and write everything it contains to the index.
///
/// Writes issued before an error are kept
pub async fn index_document(
    store: &StorageBackend,
    path: &Path,
    kind: DocumentKind,
    suffixes: &Suffixes
) -> anyhow::Result<()> {
    match kind {
        DocumentKind::Info => info::index(store, path).await,
        DocumentKind::Comments => comments::index(store, path).await,
        DocumentKind::Context => context::index(store, path, &suffixes.context).await,
    }
}

/// Index every document found under `dir`.
/// Failed documents are logged and skipped
pub async fn index_directory(
    store: &StorageBackend,
    dir: &Path,
    suffixes: &Suffixes,
    stats: &mut IndexStats
) {
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                error!(?e, "failed to get entry");
                continue;
            },
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let kind = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| DocumentKind::detect(n, suffixes));

        let Some(kind) = kind else {
            debug!(path = %path.display(), "not a document, ignoring");
            stats.ignored += 1;
            continue;
        };

        match index_document(store, path, kind, suffixes).await {
            Ok(()) => stats.record(kind),
            Err(e) => {
                error!(path = %path.display(), kind = kind.name(), ?e, "failed to index document");
                stats.failed += 1;
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::path::{Path, PathBuf};

    use crate::{dao::Sqlite, model::{EntityKey, GlobalSet, Relation}};

    use super::*;

    /// Write document under `root/<org>/<name>`
    pub fn write_doc(root: &Path, org: &str, name: &str, json: &str) -> PathBuf {
        let dir = root.join(org);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, json).unwrap();
        path
    }

    pub fn info_json(id: &str, owner: &str, uploaded: i64) -> String {
        format!(r#"{{
            "photo": {{
                "id": "{id}",
                "views": "5",
                "title": {{"_content": "Photo {id}"}},
                "dateuploaded": "{uploaded}",
                "owner": {{"nsid": "{owner}"}},
                "tags": {{"tag": [{{"raw": "bridge", "author": "a1", "machine_tag": 0}}]}},
                "notes": {{"note": []}}
            }}
        }}"#)
    }

    #[test]
    fn detect_kinds() {
        let s = Suffixes::default();
        assert_eq!(DocumentKind::detect("111-i.json", &s), Some(DocumentKind::Info));
        assert_eq!(DocumentKind::detect("111-c.json", &s), Some(DocumentKind::Comments));
        assert_eq!(DocumentKind::detect("111-ctx.json", &s), Some(DocumentKind::Context));
        assert_eq!(DocumentKind::detect("111.jpg", &s), None);
        assert_eq!(DocumentKind::detect("README", &s), None);
    }

    #[tokio::test]
    async fn directory_walk_skips_broken_documents() {
        let root = tempfile::tempdir().unwrap();
        write_doc(root.path(), "org1", "111-i.json", &info_json("111", "org1", 1140004800));
        write_doc(root.path(), "org1", "112-i.json", "{ \"photo\": ");
        write_doc(root.path(), "org1", "111-c.json", r#"{"comments": {"photo_id": "111"}}"#);
        write_doc(root.path(), "org1", "111-ctx.json", r#"{"set": [{"id": "s1", "title": "Bridges", "view_count": 1}]}"#);
        write_doc(root.path(), "org1", "notes.txt", "hello");

        let store = Sqlite::in_memory().await;
        let mut stats = IndexStats::default();
        index_directory(&store, &root.path().join("org1"), &Suffixes::default(), &mut stats).await;

        assert_eq!(stats, IndexStats {
            info: 1,
            comments: 1,
            context: 1,
            failed: 1,
            ignored: 1,
        });
        assert_eq!(store.members(GlobalSet::Images).await.unwrap(), ["111"]);
        assert_eq!(
            store.related(&EntityKey::image("111"), Relation::Sets).await.unwrap(),
            ["s1"]
        );
    }
}
