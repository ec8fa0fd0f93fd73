//! Repository for the `media` and `media_spaces` tables.

use sqlx::{PgExecutor, PgPool};
use hearth_core::types::DbId;

use crate::models::media::{CreateMedia, Media, SpaceMedia, UpdateMedia};

const COLUMNS: &str = "id, storage_path, public_url, content_type, file_size_bytes, caption, \
                        category, tags, uploaded_by, created_at, updated_at";

/// Same columns qualified with the `m` alias for joins.
const M_COLUMNS: &str = "m.id, m.storage_path, m.public_url, m.content_type, m.file_size_bytes, \
                          m.caption, m.category, m.tags, m.uploaded_by, m.created_at, m.updated_at";

pub struct MediaRepo;

impl MediaRepo {
    /// Insert a media row. Tags must already be normalised.
    pub async fn create(pool: &PgPool, input: &CreateMedia) -> Result<Media, sqlx::Error> {
        Self::insert(pool, input).await
    }

    /// Insert a media row and, when `space_id` is given, link it at the end
    /// of that space's display order. Both writes commit together.
    pub async fn create_linked(
        pool: &PgPool,
        input: &CreateMedia,
        space_id: Option<DbId>,
    ) -> Result<Media, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let media = Self::insert(&mut *tx, input).await?;
        if let Some(space_id) = space_id {
            Self::insert_link(&mut *tx, media.id, space_id).await?;
        }
        tx.commit().await?;
        Ok(media)
    }

    async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        input: &CreateMedia,
    ) -> Result<Media, sqlx::Error> {
        let query = format!(
            "INSERT INTO media
                (storage_path, public_url, content_type, file_size_bytes, caption, category, tags, uploaded_by)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 'spaces'), $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Media>(&query)
            .bind(&input.storage_path)
            .bind(&input.public_url)
            .bind(&input.content_type)
            .bind(input.file_size_bytes)
            .bind(&input.caption)
            .bind(&input.category)
            .bind(&input.tags)
            .bind(input.uploaded_by)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Media>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM media WHERE id = $1");
        sqlx::query_as::<_, Media>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List media newest first, optionally filtered by category and a single tag.
    pub async fn list(
        pool: &PgPool,
        category: Option<&str>,
        tag: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Media>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM media
             WHERE ($1::TEXT IS NULL OR category = $1)
               AND ($2::TEXT IS NULL OR $2 = ANY(tags))
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Media>(&query)
            .bind(category)
            .bind(tag)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMedia,
    ) -> Result<Option<Media>, sqlx::Error> {
        let query = format!(
            "UPDATE media SET
                caption = COALESCE($2, caption),
                category = COALESCE($3, category),
                tags = COALESCE($4, tags)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Media>(&query)
            .bind(id)
            .bind(&input.caption)
            .bind(&input.category)
            .bind(&input.tags)
            .fetch_optional(pool)
            .await
    }

    /// Delete a media row, returning it so the caller can remove the stored object.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Media>, sqlx::Error> {
        let query = format!("DELETE FROM media WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Media>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    // -- space links ---------------------------------------------------------

    /// Link media to a space at the end of its display order.
    ///
    /// Returns `false` if the link already existed.
    pub async fn link_space(
        pool: &PgPool,
        media_id: DbId,
        space_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        Self::insert_link(pool, media_id, space_id).await
    }

    async fn insert_link<'e, E: PgExecutor<'e>>(
        executor: E,
        media_id: DbId,
        space_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO media_spaces (media_id, space_id, display_order)
             SELECT $1, $2, COALESCE(MAX(display_order) + 1, 0)
             FROM media_spaces WHERE space_id = $2
             ON CONFLICT (media_id, space_id) DO NOTHING",
        )
        .bind(media_id)
        .bind(space_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn unlink_space(
        pool: &PgPool,
        media_id: DbId,
        space_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM media_spaces WHERE media_id = $1 AND space_id = $2")
            .bind(media_id)
            .bind(space_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Media linked to a space, in display order.
    pub async fn list_for_space(
        pool: &PgPool,
        space_id: DbId,
    ) -> Result<Vec<SpaceMedia>, sqlx::Error> {
        let query = format!(
            "SELECT {M_COLUMNS}, ms.display_order
             FROM media_spaces ms
             JOIN media m ON m.id = ms.media_id
             WHERE ms.space_id = $1
             ORDER BY ms.display_order, m.id"
        );
        sqlx::query_as::<_, SpaceMedia>(&query)
            .bind(space_id)
            .fetch_all(pool)
            .await
    }

    /// Ids of media linked to a space, in display order.
    pub async fn linked_ids(pool: &PgPool, space_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT media_id FROM media_spaces WHERE space_id = $1 ORDER BY display_order, media_id",
        )
        .bind(space_id)
        .fetch_all(pool)
        .await
    }

    /// Rewrite `display_order` for a space so `media_ids[i]` gets position `i`.
    ///
    /// Runs in one transaction with the space's links locked. Returns
    /// `false` and rolls back if the set of linked media changed since the
    /// caller validated `media_ids`.
    pub async fn reorder(
        pool: &PgPool,
        space_id: DbId,
        media_ids: &[DbId],
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let linked: Vec<DbId> = sqlx::query_scalar(
            "SELECT media_id FROM media_spaces WHERE space_id = $1 ORDER BY media_id FOR UPDATE",
        )
        .bind(space_id)
        .fetch_all(&mut *tx)
        .await?;

        let mut requested = media_ids.to_vec();
        requested.sort_unstable();
        if linked != requested {
            return Ok(false);
        }

        for (position, &media_id) in media_ids.iter().enumerate() {
            sqlx::query(
                "UPDATE media_spaces SET display_order = $3 WHERE space_id = $1 AND media_id = $2",
            )
            .bind(space_id)
            .bind(media_id)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}
