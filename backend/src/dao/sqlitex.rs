use std::str::FromStr;

use anyhow::bail;
use sqlx::SqliteConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::model::{
    Activity, Comment, EntityKey, EntityKind, GlobalSet, Image, ImageTag, Note,
    PhotoSet, Relation, Summary, Tag,
};

/// Entity index backed by SQLite.
///
/// Scalar attributes are upserted (last write wins), memberships are only
/// ever added, so indexing the same document again changes nothing.
pub struct Sqlite {
    pool: SqlitePool,
}

pub type StorageError = anyhow::Error;

/// `(table, id column, filter)` holding members of a global set
fn global_source(set: GlobalSet) -> (&'static str, &'static str, &'static str) {
    match set {
        GlobalSet::Images => ("image", "id", "1"),
        GlobalSet::Tags => ("tag", "name", "1"),
        GlobalSet::MachineTags => ("tag", "name", "machine = 1"),
        GlobalSet::Notes => ("note", "id", "1"),
        GlobalSet::Comments => ("comment", "id", "1"),
        GlobalSet::Sets => ("photo_set", "id", "1"),
        GlobalSet::Owners => ("owner", "id", "1"),
        GlobalSet::Authors => ("author", "id", "1"),
    }
}

/// `(table, member column, key column)` of an entity relation
fn relation_source(
    kind: EntityKind,
    relation: Relation
) -> Option<(&'static str, &'static str, &'static str)> {
    Some(match (kind, relation) {
        (EntityKind::Image, Relation::Tags) => ("image_tag", "tag", "image_id"),
        (EntityKind::Image, Relation::Notes) => ("note", "id", "image_id"),
        (EntityKind::Image, Relation::Comments) => ("comment", "id", "image_id"),
        (EntityKind::Image, Relation::Sets) => ("set_image", "set_id", "image_id"),
        (EntityKind::Tag, Relation::Images) => ("image_tag", "image_id", "tag"),
        (EntityKind::Tag, Relation::Authors) => ("tag_author", "author_id", "tag"),
        (EntityKind::Set, Relation::Images) => ("set_image", "image_id", "set_id"),
        (EntityKind::Owner, Relation::Images) => ("owner_image", "image_id", "owner_id"),
        _ => return None,
    })
}

/// Private methods and associated functions
impl Sqlite {
    async fn add_owner_conn(conn: &mut SqliteConnection, id: &str) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO owner (id) VALUES (?) ON CONFLICT (id) DO NOTHING")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    async fn add_author_conn(conn: &mut SqliteConnection, id: &str) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO author (id) VALUES (?) ON CONFLICT (id) DO NOTHING")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    async fn fetch_ids(&self, sql: &str, bind: Option<&str>) -> Result<Vec<String>, StorageError> {
        let mut query = sqlx::query_scalar::<sqlx::Sqlite, String>(sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }
}

/// Public API
impl Sqlite {
    /// Connect to url and init storage
    pub async fn init(url: &str) -> Result<Self, StorageError> {
        // Create if not exists
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true);

        // Single connection that is never recycled: writes are issued one by
        // one, and an in-memory database lives only as long as its connection
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        // Apply migrations if needed
        sqlx::migrate!().run(&pool).await?;

        Ok(Self { pool })
    }

    /// Wait for pending writes and close the database
    pub async fn close(&self) {
        self.pool.close().await
    }

    /// Record image attributes, add it to `images` and to its owner's images.
    /// An image indexed under another owner stays in the previous owner's images
    pub async fn put_image(&self, image: &Image) -> Result<(), StorageError> {
        let mut conn = self.pool.acquire().await?;

        if let Some(owner) = &image.owner_id {
            Self::add_owner_conn(&mut conn, owner).await?;
        }

        // Owner is kept if a later document doesn't mention it
        sqlx::query(
            "INSERT INTO image (id, views, title, created, owner_id)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                views = excluded.views,
                title = excluded.title,
                created = excluded.created,
                owner_id = coalesce(excluded.owner_id, image.owner_id)"
        )
        .bind(&image.id)
        .bind(image.views)
        .bind(&image.title)
        .bind(image.created)
        .bind(&image.owner_id)
        .execute(&mut *conn)
        .await?;

        if let Some(owner) = &image.owner_id {
            sqlx::query(
                "INSERT INTO owner_image (owner_id, image_id) VALUES (?, ?)
                ON CONFLICT (owner_id, image_id) DO NOTHING"
            )
            .bind(owner)
            .bind(&image.id)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Link image and tag both ways, record tag author
    pub async fn put_image_tag(&self, tag: &ImageTag) -> Result<(), StorageError> {
        let mut conn = self.pool.acquire().await?;

        // Machine flag is sticky
        sqlx::query(
            "INSERT INTO tag (name, machine) VALUES (?, ?)
            ON CONFLICT (name) DO UPDATE SET machine = max(tag.machine, excluded.machine)"
        )
        .bind(&tag.tag)
        .bind(tag.machine)
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            "INSERT INTO image_tag (image_id, tag) VALUES (?, ?)
            ON CONFLICT (image_id, tag) DO NOTHING"
        )
        .bind(&tag.image_id)
        .bind(&tag.tag)
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            "INSERT INTO tag_author (tag, author_id) VALUES (?, ?)
            ON CONFLICT (tag, author_id) DO NOTHING"
        )
        .bind(&tag.tag)
        .bind(&tag.author_id)
        .execute(&mut *conn)
        .await?;

        Self::add_author_conn(&mut conn, &tag.author_id).await
    }

    pub async fn put_note(&self, note: &Note) -> Result<(), StorageError> {
        let mut conn = self.pool.acquire().await?;

        sqlx::query(
            "INSERT INTO note (id, image_id, author_id, content, x, y, w, h)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                image_id = excluded.image_id,
                author_id = excluded.author_id,
                content = excluded.content,
                x = excluded.x,
                y = excluded.y,
                w = excluded.w,
                h = excluded.h"
        )
        .bind(&note.id)
        .bind(&note.image_id)
        .bind(&note.author_id)
        .bind(&note.content)
        .bind(note.x)
        .bind(note.y)
        .bind(note.w)
        .bind(note.h)
        .execute(&mut *conn)
        .await?;

        Self::add_author_conn(&mut conn, &note.author_id).await
    }

    pub async fn put_comment(&self, comment: &Comment) -> Result<(), StorageError> {
        let mut conn = self.pool.acquire().await?;

        sqlx::query(
            "INSERT INTO comment (id, image_id, author_id, content, created)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                image_id = excluded.image_id,
                author_id = excluded.author_id,
                content = excluded.content,
                created = excluded.created"
        )
        .bind(&comment.id)
        .bind(&comment.image_id)
        .bind(&comment.author_id)
        .bind(&comment.content)
        .bind(comment.created)
        .execute(&mut *conn)
        .await?;

        Self::add_author_conn(&mut conn, &comment.author_id).await
    }

    /// Record set attributes and link set and image both ways
    pub async fn put_set_membership(
        &self,
        set: &PhotoSet,
        image_id: &str
    ) -> Result<(), StorageError> {
        let mut conn = self.pool.acquire().await?;

        sqlx::query(
            "INSERT INTO photo_set (id, title, views) VALUES (?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                title = excluded.title,
                views = excluded.views"
        )
        .bind(&set.id)
        .bind(&set.title)
        .bind(set.views)
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            "INSERT INTO set_image (set_id, image_id) VALUES (?, ?)
            ON CONFLICT (set_id, image_id) DO NOTHING"
        )
        .bind(&set.id)
        .bind(image_id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn image(&self, id: &str) -> Result<Option<Image>, StorageError> {
        let image = sqlx::query_as(
            "SELECT id, views, title, created, owner_id FROM image WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(image)
    }

    pub async fn tag(&self, name: &str) -> Result<Option<Tag>, StorageError> {
        let tag = sqlx::query_as("SELECT name, machine FROM tag WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tag)
    }

    pub async fn note(&self, id: &str) -> Result<Option<Note>, StorageError> {
        let note = sqlx::query_as(
            "SELECT id, image_id, author_id, content, x, y, w, h FROM note WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(note)
    }

    pub async fn comment(&self, id: &str) -> Result<Option<Comment>, StorageError> {
        let comment = sqlx::query_as(
            "SELECT id, image_id, author_id, content, created FROM comment WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(comment)
    }

    pub async fn photo_set(&self, id: &str) -> Result<Option<PhotoSet>, StorageError> {
        let set = sqlx::query_as("SELECT id, title, views FROM photo_set WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(set)
    }

    /// Ids of all members of a global set, sorted
    pub async fn members(&self, set: GlobalSet) -> Result<Vec<String>, StorageError> {
        let (table, col, filter) = global_source(set);
        let sql = format!("SELECT {col} FROM {table} WHERE {filter} ORDER BY {col}");
        self.fetch_ids(&sql, None).await
    }

    /// Check if global set has member with id
    pub async fn contains(&self, set: GlobalSet, id: &str) -> Result<bool, StorageError> {
        let (table, col, filter) = global_source(set);
        let sql = format!("SELECT count(*) FROM {table} WHERE {filter} AND {col} = ?");
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Ids of entities related to `key`, sorted.
    /// The kind of returned ids is `relation.member_kind()`
    pub async fn related(
        &self,
        key: &EntityKey,
        relation: Relation
    ) -> Result<Vec<String>, StorageError> {
        let Some((table, member, by)) = relation_source(key.kind, relation) else {
            bail!("`{}` has no `{}` relation", key.kind.prefix(), relation.name());
        };
        let sql = format!("SELECT {member} FROM {table} WHERE {by} = ? ORDER BY {member}");
        self.fetch_ids(&sql, Some(&key.id)).await
    }

    /// Every image as an upload by its owner
    pub async fn uploads(&self) -> Result<Vec<Activity>, StorageError> {
        let uploads = sqlx::query_as(
            "SELECT id, id AS image_id, owner_id, created FROM image ORDER BY id"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(uploads)
    }

    /// Every comment, attributed to the owner of the commented image
    pub async fn comment_activity(&self) -> Result<Vec<Activity>, StorageError> {
        let comments = sqlx::query_as(
            "SELECT
                comment.id AS id,
                comment.image_id AS image_id,
                image.owner_id AS owner_id,
                comment.created AS created
            FROM comment
            LEFT JOIN image ON image.id = comment.image_id
            ORDER BY comment.id"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    pub async fn get_summary(&self) -> Result<Summary, StorageError> {
        let summary = sqlx::query_as(
            "SELECT
                (SELECT count(*) FROM image) AS images,
                (SELECT count(*) FROM tag) AS tags,
                (SELECT count(*) FROM tag WHERE machine = 1) AS machine_tags,
                (SELECT count(*) FROM note) AS notes,
                (SELECT count(*) FROM comment) AS comments,
                (SELECT count(*) FROM photo_set) AS sets,
                (SELECT count(*) FROM owner) AS owners,
                (SELECT count(*) FROM author) AS authors"
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(summary)
    }
}

#[cfg(test)]
impl Sqlite {
    pub async fn in_memory() -> Self {
        Self::init("sqlite::memory:").await.unwrap()
    }
}
