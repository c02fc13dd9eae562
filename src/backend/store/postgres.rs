//! PostgreSQL store
//!
//! `ChatStore` over a sqlx `PgPool`. Schema lives in `migrations/`.
//! Multi-statement writes (`resolve_friend_request`, `insert_group`,
//! `save_group`) run in a single transaction.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::collections::BTreeSet;

use super::{ChatStore, FriendPair, StoreResult};
use crate::backend::error::StoreError;
use crate::shared::messaging::{
    DirectDraft, DirectMessage, FriendRequest, FriendRequestStatus, Group, GroupDraft, GroupMessage,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and bring the schema up to date
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url).await?;
        tracing::info!("[Store] Database connection pool created");
        sqlx::migrate!().run(&pool).await?;
        tracing::info!("[Store] Database migrations completed");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn request_from_row(row: &PgRow) -> StoreResult<FriendRequest> {
    let status: String = row.try_get("status")?;
    let status = FriendRequestStatus::parse(&status)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown friend request status '{}'", status)))?;
    Ok(FriendRequest {
        id: row.try_get("id")?,
        sender: row.try_get("sender")?,
        receiver: row.try_get("receiver")?,
        status,
        created_at: row.try_get("created_at")?,
        responded_at: row.try_get("responded_at")?,
    })
}

fn group_from_row(row: &PgRow) -> StoreResult<Group> {
    let members: Vec<String> = row.try_get("members")?;
    Ok(Group {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        owner: row.try_get("owner")?,
        members: members.into_iter().collect(),
    })
}

fn direct_from_row(row: &PgRow) -> StoreResult<DirectMessage> {
    Ok(DirectMessage {
        id: row.try_get("id")?,
        sender: row.try_get("sender")?,
        receiver: row.try_get("receiver")?,
        content: row.try_get("content")?,
        timestamp: row.try_get("created_at")?,
    })
}

fn group_message_from_row(row: &PgRow) -> StoreResult<GroupMessage> {
    Ok(GroupMessage {
        id: row.try_get("id")?,
        group_id: row.try_get("group_id")?,
        sender: row.try_get("sender")?,
        content: row.try_get("content")?,
        timestamp: row.try_get("created_at")?,
    })
}

const REQUEST_COLUMNS: &str = "id, sender, receiver, status, created_at, responded_at";

#[async_trait]
impl ChatStore for PgStore {
    async fn ensure_user(&self, username: &str) -> StoreResult<()> {
        sqlx::query("INSERT INTO users (username) VALUES ($1) ON CONFLICT (username) DO NOTHING")
            .bind(username)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn user_exists(&self, username: &str) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn find_pending_request(
        &self,
        sender: &str,
        receiver: &str,
    ) -> StoreResult<Option<FriendRequest>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM friend_requests WHERE sender = $1 AND receiver = $2 AND status = 'pending'",
            REQUEST_COLUMNS
        ))
        .bind(sender)
        .bind(receiver)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(request_from_row).transpose()
    }

    async fn insert_friend_request(&self, sender: &str, receiver: &str) -> StoreResult<FriendRequest> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO friend_requests (sender, receiver, status, created_at)
            VALUES ($1, $2, 'pending', $3)
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(sender)
        .bind(receiver)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        request_from_row(&row)
    }

    async fn resolve_friend_request(
        &self,
        request_id: i64,
        status: FriendRequestStatus,
    ) -> StoreResult<Option<FriendRequest>> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE friend_requests
            SET status = $1, responded_at = $2
            WHERE id = $3 AND status = 'pending'
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(status.as_str())
        .bind(now)
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };
        let request = request_from_row(&row)?;

        if status == FriendRequestStatus::Accepted {
            let pair = FriendPair::new(&request.sender, &request.receiver);
            sqlx::query(
                r#"
                INSERT INTO friendships (user_a, user_b, created_at)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_a, user_b) DO NOTHING
                "#,
            )
            .bind(pair.first())
            .bind(pair.second())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(request))
    }

    async fn pending_requests_for(&self, receiver: &str) -> StoreResult<Vec<FriendRequest>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM friend_requests
            WHERE receiver = $1 AND status = 'pending'
            ORDER BY created_at DESC, id DESC
            "#,
            REQUEST_COLUMNS
        ))
        .bind(receiver)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(request_from_row).collect()
    }

    async fn are_friends(&self, a: &str, b: &str) -> StoreResult<bool> {
        let pair = FriendPair::new(a, b);
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM friendships WHERE user_a = $1 AND user_b = $2)",
        )
        .bind(pair.first())
        .bind(pair.second())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn remove_friendship(&self, a: &str, b: &str) -> StoreResult<bool> {
        let pair = FriendPair::new(a, b);
        let result = sqlx::query("DELETE FROM friendships WHERE user_a = $1 AND user_b = $2")
            .bind(pair.first())
            .bind(pair.second())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn friends_of(&self, username: &str) -> StoreResult<Vec<String>> {
        let mut friends: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT CASE WHEN user_a = $1 THEN user_b ELSE user_a END
            FROM friendships
            WHERE user_a = $1 OR user_b = $1
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;
        // Rust ordering, independent of the database collation
        friends.sort();
        Ok(friends)
    }

    async fn insert_group(
        &self,
        name: &str,
        owner: &str,
        members: &BTreeSet<String>,
    ) -> StoreResult<Group> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO chat_groups (name, owner, created_at) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(name)
        .bind(owner)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        let usernames: Vec<String> = members.iter().cloned().collect();
        sqlx::query("INSERT INTO group_members (group_id, username) SELECT $1, UNNEST($2::text[])")
            .bind(id)
            .bind(&usernames)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Group {
            id,
            name: name.to_string(),
            owner: owner.to_string(),
            members: members.clone(),
        })
    }

    async fn get_group(&self, group_id: i64) -> StoreResult<Option<Group>> {
        let row = sqlx::query(
            r#"
            SELECT g.id, g.name, g.owner,
                   COALESCE(array_agg(m.username) FILTER (WHERE m.username IS NOT NULL), '{}') AS members
            FROM chat_groups g
            LEFT JOIN group_members m ON m.group_id = g.id
            WHERE g.id = $1
            GROUP BY g.id
            "#,
        )
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(group_from_row).transpose()
    }

    async fn save_group(&self, group: &Group) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE chat_groups SET name = $1, owner = $2 WHERE id = $3")
            .bind(&group.name)
            .bind(&group.owner)
            .bind(group.id)
            .execute(&mut *tx)
            .await?;

        let usernames: Vec<String> = group.members.iter().cloned().collect();
        sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND NOT (username = ANY($2::text[]))")
            .bind(group.id)
            .bind(&usernames)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO group_members (group_id, username)
            SELECT $1, UNNEST($2::text[])
            ON CONFLICT (group_id, username) DO NOTHING
            "#,
        )
        .bind(group.id)
        .bind(&usernames)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete_group(&self, group_id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM chat_groups WHERE id = $1")
            .bind(group_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn groups_for(&self, username: &str) -> StoreResult<Vec<Group>> {
        let rows = sqlx::query(
            r#"
            SELECT g.id, g.name, g.owner, array_agg(m.username) AS members
            FROM chat_groups g
            JOIN group_members m ON m.group_id = g.id
            WHERE g.id IN (SELECT group_id FROM group_members WHERE username = $1)
            GROUP BY g.id
            ORDER BY g.id
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(group_from_row).collect()
    }

    async fn append_direct(&self, draft: &DirectDraft) -> StoreResult<DirectMessage> {
        let row = sqlx::query(
            r#"
            INSERT INTO direct_messages (sender, receiver, content, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, sender, receiver, content, created_at
            "#,
        )
        .bind(&draft.sender)
        .bind(&draft.receiver)
        .bind(&draft.content)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        direct_from_row(&row)
    }

    async fn append_group(&self, draft: &GroupDraft) -> StoreResult<GroupMessage> {
        let row = sqlx::query(
            r#"
            INSERT INTO group_messages (group_id, sender, content, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, group_id, sender, content, created_at
            "#,
        )
        .bind(draft.group_id)
        .bind(&draft.sender)
        .bind(&draft.content)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        group_message_from_row(&row)
    }

    async fn direct_history(&self, a: &str, b: &str) -> StoreResult<Vec<DirectMessage>> {
        let rows = sqlx::query(
            r#"
            SELECT id, sender, receiver, content, created_at
            FROM direct_messages
            WHERE (sender = $1 AND receiver = $2) OR (sender = $2 AND receiver = $1)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(direct_from_row).collect()
    }

    async fn group_history(&self, group_id: i64) -> StoreResult<Vec<GroupMessage>> {
        let rows = sqlx::query(
            r#"
            SELECT id, group_id, sender, content, created_at
            FROM group_messages
            WHERE group_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(group_message_from_row).collect()
    }

    async fn recent_direct(&self, username: &str) -> StoreResult<Vec<DirectMessage>> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT ON (partner) id, sender, receiver, content, created_at,
                   CASE WHEN sender = $1 THEN receiver ELSE sender END AS partner
            FROM direct_messages
            WHERE sender = $1 OR receiver = $1
            ORDER BY partner, created_at DESC, id DESC
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;
        let mut recent = rows
            .iter()
            .map(direct_from_row)
            .collect::<StoreResult<Vec<_>>>()?;
        recent.sort_by(|a, b| (b.timestamp, b.id).cmp(&(a.timestamp, a.id)));
        Ok(recent)
    }
}
