use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use enum_iterator::all;
use itertools::Itertools;
use tracing::{error, info, warn};

use crate::{
    config::Config,
    dao::StorageBackend,
    engagement::{self, Report, Stats},
    import::{self, IndexStats},
    model::{EntityKey, EntityKind, GlobalSet, KeyPattern, Organizations},
    util,
};

/// Which organizations to index
pub enum Selection<'a> {
    /// Every organization directory except excluded ones
    All { exclude: &'a [String] },
    /// One organization by id
    Single(&'a str),
}

/// Organization directories under `data_dir`, sorted by name
fn organization_dirs(data_dir: &Path) -> anyhow::Result<Vec<(String, PathBuf)>> {
    let dirs = std::fs::read_dir(data_dir)
        .with_context(|| format!("failed to read data dir {}", data_dir.display()))?
        .filter_map(|e| match e {
            Ok(e) => Some(e.path()),
            Err(e) => {
                warn!(?e, "failed to get entry");
                None
            }
        })
        .filter(|path| path.is_dir())
        .filter_map(|path| {
            let org = path.file_name()?.to_str()?.to_string();
            Some((org, path))
        })
        .sorted()
        .collect();

    Ok(dirs)
}

/// Index documents of selected organizations
pub async fn index(
    store: &StorageBackend,
    cfg: &Config,
    selection: Selection<'_>
) -> anyhow::Result<IndexStats> {
    let orgs = match selection {
        Selection::Single(org) => {
            let dir = cfg.data_dir.join(org);
            if !dir.is_dir() {
                bail!("no directory for organization `{org}` in {}", cfg.data_dir.display());
            }
            vec![(org.to_string(), dir)]
        },
        Selection::All { exclude } => organization_dirs(&cfg.data_dir)?
            .into_iter()
            .filter(|(org, _)| {
                let skip = exclude.contains(org);
                if skip {
                    info!(org = %org, "excluded, skipping");
                }
                !skip
            })
            .collect(),
    };

    let mut stats = IndexStats::default();
    for (org, dir) in orgs {
        info!(org = %org, "indexing organization");
        let before = stats;

        import::index_directory(store, &dir, &cfg.suffixes, &mut stats).await;

        info!(
            org = %org,
            indexed = stats.indexed() - before.indexed(),
            failed = stats.failed - before.failed,
            "indexed organization"
        );
    }

    info!(
        info = stats.info,
        comments = stats.comments,
        context = stats.context,
        failed = stats.failed,
        ignored = stats.ignored,
        "indexing done"
    );

    Ok(stats)
}

/// Build engagement stats, save snapshot to `cfg.stats_file` and render table.
///
/// Failure to save the snapshot is logged, the table is still returned
pub async fn engagement(store: &StorageBackend, cfg: &Config) -> anyhow::Result<String> {
    let orgs: Organizations = util::read_json(&cfg.orgs_file)?;
    let stats = engagement::collect(store, &orgs).await?;
    let table = Report { stats: &stats, orgs: &orgs }.to_string();

    match save_stats(&stats, &cfg.stats_file) {
        Ok(()) => info!(path = %cfg.stats_file.display(), orgs = orgs.len(), "saved engagement stats"),
        Err(e) => error!(?e, path = %cfg.stats_file.display(), "failed to save engagement stats"),
    }

    Ok(table)
}

fn save_stats(stats: &Stats, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(stats)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write {}", path.display()))
}

/// `name\tcount` line for every global set
pub async fn summary(store: &StorageBackend) -> anyhow::Result<Vec<String>> {
    let s = store.get_summary().await?;

    let lines = all::<GlobalSet>()
        .map(|set| {
            let count = match set {
                GlobalSet::Images => s.images,
                GlobalSet::Tags => s.tags,
                GlobalSet::MachineTags => s.machine_tags,
                GlobalSet::Notes => s.notes,
                GlobalSet::Comments => s.comments,
                GlobalSet::Sets => s.sets,
                GlobalSet::Owners => s.owners,
                GlobalSet::Authors => s.authors,
            };
            format!("{}\t{count}", set.name())
        })
        .collect();

    Ok(lines)
}

fn field_lines(fields: Vec<(&str, String)>) -> Vec<String> {
    fields.into_iter()
        .map(|(field, value)| format!("{field}\t{value}"))
        .collect()
}

/// Resolve key the way it is written in the index conventions.
///
/// Sets print member keys, records print `field\tvalue` lines,
/// identity-only entities print their own key
pub async fn lookup(store: &StorageBackend, pattern: &KeyPattern) -> anyhow::Result<Vec<String>> {
    let keys = |kind: EntityKind, ids: Vec<String>| -> Vec<String> {
        ids.into_iter()
            .map(|id| EntityKey::new(kind, id).to_string())
            .collect()
    };

    let lines = match pattern {
        KeyPattern::Global(set) => keys(set.member_kind(), store.members(*set).await?),
        KeyPattern::Related(key, rel) => keys(rel.member_kind(), store.related(key, *rel).await?),
        KeyPattern::Entity(key) => {
            let id = key.id.as_str();
            let fields = match key.kind {
                EntityKind::Image => store.image(id).await?.map(|r| r.fields()),
                EntityKind::Tag => store.tag(id).await?.map(|r| r.fields()),
                EntityKind::Note => store.note(id).await?.map(|r| r.fields()),
                EntityKind::Comment => store.comment(id).await?.map(|r| r.fields()),
                EntityKind::Set => store.photo_set(id).await?.map(|r| r.fields()),
                EntityKind::Owner => store.contains(GlobalSet::Owners, id).await?
                    .then(Vec::new),
                EntityKind::Author => store.contains(GlobalSet::Authors, id).await?
                    .then(Vec::new),
            };

            match fields {
                Some(f) if f.is_empty() => vec![key.to_string()],
                Some(f) => field_lines(f),
                None => vec![],
            }
        },
    };

    if lines.is_empty() {
        warn!(key = %pattern, "nothing found");
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::filter::LevelFilter;

    use crate::{config::Suffixes, dao::Sqlite, import::tests::{info_json, write_doc}};

    use super::*;

    fn config(root: &Path) -> Config {
        Config {
            db_url: "sqlite::memory:".into(),
            data_dir: root.join("data"),
            orgs_file: root.join("orgs.json"),
            stats_file: root.join("stats.json"),
            log_file: root.join("flarchive.log"),
            log_level: LevelFilter::INFO,
            exclude: vec![],
            suffixes: Suffixes::default(),
        }
    }

    /// Three organizations with one image each
    fn data_tree(root: &Path) {
        let data = root.join("data");
        for (org, image) in [("org-a", "1"), ("org-b", "2"), ("org-c", "3")] {
            write_doc(&data, org, &format!("{image}-i.json"), &info_json(image, org, 1140004800));
        }
        // Stray file next to organization directories
        std::fs::write(data.join("README"), "metadata dump").unwrap();
    }

    #[tokio::test]
    async fn index_all_but_excluded() {
        let root = tempfile::tempdir().unwrap();
        data_tree(root.path());
        let cfg = config(root.path());
        let store = Sqlite::in_memory().await;

        let exclude = vec!["org-b".to_string()];
        let stats = index(&store, &cfg, Selection::All { exclude: &exclude }).await.unwrap();

        assert_eq!(stats.info, 2);
        assert_eq!(store.members(GlobalSet::Images).await.unwrap(), ["1", "3"]);
        assert_eq!(store.members(GlobalSet::Owners).await.unwrap(), ["org-a", "org-c"]);
    }

    #[tokio::test]
    async fn index_single_org() {
        let root = tempfile::tempdir().unwrap();
        data_tree(root.path());
        let cfg = config(root.path());
        let store = Sqlite::in_memory().await;

        let stats = index(&store, &cfg, Selection::Single("org-b")).await.unwrap();
        assert_eq!(stats.indexed(), 1);
        assert_eq!(store.members(GlobalSet::Images).await.unwrap(), ["2"]);

        assert!(index(&store, &cfg, Selection::Single("org-z")).await.is_err());
    }

    #[tokio::test]
    async fn engagement_writes_snapshot() {
        let root = tempfile::tempdir().unwrap();
        data_tree(root.path());
        let cfg = config(root.path());
        std::fs::write(&cfg.orgs_file, r#"{"org-a": {"type": "M"}, "org-c": {"type": "A"}}"#).unwrap();
        let store = Sqlite::in_memory().await;
        index(&store, &cfg, Selection::All { exclude: &[] }).await.unwrap();

        let table = engagement(&store, &cfg).await.unwrap();

        let saved: Stats = util::read_json(&cfg.stats_file).unwrap();
        let orgs: Organizations = util::read_json(&cfg.orgs_file).unwrap();
        assert_eq!(table, Report { stats: &saved, orgs: &orgs }.to_string());
        assert_eq!(engagement::count(&saved.images, "org-a", "2006-02"), 1);
        // org-b is not in the mapping
        assert_eq!(engagement::count(&saved.images, "M", "2006-02"), 1);
        assert!(!saved.images.contains_key("org-b"));
    }

    #[tokio::test]
    async fn engagement_table_survives_unwritable_snapshot() {
        let root = tempfile::tempdir().unwrap();
        data_tree(root.path());
        let mut cfg = config(root.path());
        cfg.stats_file = root.path().join("missing/dir/stats.json");
        std::fs::write(&cfg.orgs_file, r#"{"org-a": {"type": "M"}}"#).unwrap();
        let store = Sqlite::in_memory().await;
        index(&store, &cfg, Selection::Single("org-a")).await.unwrap();

        let table = engagement(&store, &cfg).await.unwrap();

        assert!(!cfg.stats_file.exists());
        assert_eq!(table.lines().count(), 97);
        let feb = table.lines().find(|l| l.starts_with("2006-02")).unwrap();
        //                        M     L     A     org-a
        assert_eq!(feb, "2006-02\t0\t1\t0\t0\t0\t0\t0\t1");
    }

    #[tokio::test]
    async fn summary_lines() {
        let root = tempfile::tempdir().unwrap();
        data_tree(root.path());
        let store = Sqlite::in_memory().await;
        index(&store, &config(root.path()), Selection::Single("org-a")).await.unwrap();

        let lines = summary(&store).await.unwrap();
        assert_eq!(lines, [
            "images\t1",
            "tags\t1",
            "machinetags\t0",
            "notes\t0",
            "comments\t0",
            "sets\t0",
            "owners\t1",
            "authors\t1",
        ]);
    }

    #[tokio::test]
    async fn lookup_keys() {
        let root = tempfile::tempdir().unwrap();
        data_tree(root.path());
        let store = Sqlite::in_memory().await;
        index(&store, &config(root.path()), Selection::All { exclude: &[] }).await.unwrap();

        let get = |key: &str| {
            let pattern: KeyPattern = key.parse().unwrap();
            let store = &store;
            async move { lookup(store, &pattern).await.unwrap() }
        };

        assert_eq!(get("images").await, ["image:1", "image:2", "image:3"]);
        assert_eq!(get("tag:bridge:images").await, ["image:1", "image:2", "image:3"]);
        assert_eq!(get("image:2:tags").await, ["tag:bridge"]);
        assert_eq!(get("owner:org-b:images").await, ["image:2"]);
        assert_eq!(get("image:1").await, [
            "views\t5",
            "title\tPhoto 1",
            "created\t1140004800",
            "owner\towner:org-a",
        ]);
        assert_eq!(get("author:a1").await, ["author:a1"]);
        assert_eq!(get("tag:bridge").await, ["machine\t0"]);
        assert!(get("image:404").await.is_empty());
        assert!(get("owner:nobody").await.is_empty());
    }
}
