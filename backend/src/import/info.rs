use std::path::Path;

use flarchive_common::document::{InfoDocument, PhotoRecords};
use tracing::debug;

use crate::{dao::StorageBackend, util};

/// Index image, its tags and notes
pub async fn index(store: &StorageBackend, path: &Path) -> anyhow::Result<()> {
    let doc: InfoDocument = util::read_json(path)?;
    let PhotoRecords { image, tags, notes } = doc.into_records();

    store.put_image(&image).await?;
    for tag in &tags {
        store.put_image_tag(tag).await?;
    }
    for note in &notes {
        store.put_note(note).await?;
    }

    debug!(image = %image.id, tags = tags.len(), notes = notes.len(), "indexed info");
    Ok(())
}
