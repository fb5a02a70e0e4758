//! Engagement report: comments correlated to uploads over time, for each
//! organization and summed up for museums, libraries and archives.

use std::{collections::BTreeMap, fmt::{self, Display}};

use enum_iterator::all;
use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

use crate::{
    dao::StorageBackend,
    model::{Activity, OrgType, Organization, Organizations},
    util,
};

/// Month (`YYYY-MM`) -> count
pub type MonthCounts = BTreeMap<String, u32>;

/// Bucket (organization id or type) -> counts
pub type Table = BTreeMap<String, MonthCounts>;

/// Engagement snapshot, saved as JSON
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct Stats {
    pub comments: Table,
    pub images: Table,
}

impl Default for Stats {
    /// Type buckets are always present, even if empty
    fn default() -> Self {
        let buckets: Table = all::<OrgType>()
            .map(|t| (t.bucket().to_string(), MonthCounts::new()))
            .collect();

        Self {
            comments: buckets.clone(),
            images: buckets,
        }
    }
}

/// Count for bucket and month, 0 if absent
pub fn count(table: &Table, bucket: &str, month: &str) -> u32 {
    table
        .get(bucket)
        .and_then(|months| months.get(month))
        .copied()
        .unwrap_or(0)
}

fn tally(table: &mut Table, org_id: &str, org: &Organization, month: &str) {
    for bucket in [org_id, org.org_type.bucket()] {
        *table
            .entry(bucket.to_string())
            .or_default()
            .entry(month.to_string())
            .or_default() += 1;
    }
}

/// Find owning organization and month of activity.
/// Logs and returns `None` if activity can't be attributed
fn attribute<'o>(
    activity: &Activity,
    orgs: &'o Organizations,
    what: &str
) -> Option<(&'o str, &'o Organization, String)> {
    let org = activity.owner_id
        .as_deref()
        .and_then(|id| orgs.get_key_value(id));

    let Some((org_id, org)) = org else {
        warn!(
            what,
            id = %activity.id,
            image = %activity.image_id,
            org = ?activity.owner_id,
            "don't know about org"
        );
        return None;
    };

    let Some(month) = util::month_key(activity.created) else {
        warn!(what, id = %activity.id, created = activity.created, "timestamp out of range");
        return None;
    };

    debug!(what, id = %activity.id, org = %org_id, month = %month, "counted");
    Some((org_id.as_str(), org, month))
}

/// Bucket comments and uploads by month, organization and organization type
pub async fn collect(store: &StorageBackend, orgs: &Organizations) -> anyhow::Result<Stats> {
    let mut stats = Stats::default();

    for comment in store.comment_activity().await? {
        if let Some((org_id, org, month)) = attribute(&comment, orgs, "comment") {
            tally(&mut stats.comments, org_id, org, &month);
        }
    }

    for upload in store.uploads().await? {
        if let Some((org_id, org, month)) = attribute(&upload, orgs, "image") {
            tally(&mut stats.images, org_id, org, &month);
        }
    }

    Ok(stats)
}

/// Tab separated engagement table.
///
/// One row per month of [util::REPORT_YEARS], columns are type buckets
/// followed by organizations in mapping order, each with comment and upload
/// counts
pub struct Report<'a> {
    pub stats: &'a Stats,
    pub orgs: &'a Organizations,
}

impl Report<'_> {
    pub fn columns(&self) -> Vec<&str> {
        all::<OrgType>()
            .map(|t| t.bucket())
            .chain(self.orgs.keys().map(String::as_str))
            .collect()
    }
}

impl Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self.columns();

        writeln!(f, "date\tcomments\tuploads")?;
        for month in util::report_months() {
            write!(f, "{month}")?;
            for col in &columns {
                write!(
                    f,
                    "\t{}\t{}",
                    count(&self.stats.comments, col, &month),
                    count(&self.stats.images, col, &month)
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
