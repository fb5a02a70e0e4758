use std::path::Path;

use anyhow::Context;
use flarchive_common::document::ContextDocument;
use tracing::debug;

use crate::{dao::StorageBackend, util};

/// Image id is the file name without the context suffix: `<id>-ctx.json`
pub fn image_id_from_path<'p>(path: &'p Path, suffix: &str) -> Option<&'p str> {
    let id = path
        .file_name()?
        .to_str()?
        .strip_suffix(suffix)?
        .trim_end_matches(&['-', '_'][..]);

    (!id.is_empty()).then_some(id)
}

/// Index set memberships of an image
pub async fn index(store: &StorageBackend, path: &Path, suffix: &str) -> anyhow::Result<()> {
    let image_id = image_id_from_path(path, suffix)
        .context("failed to derive image id from file name")?;

    let doc: ContextDocument = util::read_json(path)?;
    let sets = doc.into_sets();

    for set in &sets {
        store.put_set_membership(set, image_id).await?;
    }

    debug!(image = image_id, sets = sets.len(), "indexed context");
    Ok(())
}
