//! PostgreSQL adapter for the graph store.
//!
//! Nodes and relationships live in plain tables. Relationships reference
//! their nodes with `ON DELETE CASCADE` foreign keys, which is what gives
//! `delete_node` and `delete_container` their detach-delete semantics.

use crate::model::{EdgeRecord, GraphStats, NodeRecord, StoreId};
use crate::traits::{GraphStore, GraphTransaction};
use crate::{StorageError, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Row, Transaction};
use std::collections::BTreeSet;
use supergraph_types::{ContainerId, ContainerKind, ContainerRecord, EdgeKey, NodeKind, Uid};
use tracing::{debug, info};
use uuid::Uuid;

/// PostgreSQL-backed graph store.
#[derive(Clone)]
pub struct PostgresGraphStore {
    pool: PgPool,
    id: StoreId,
}

impl PostgresGraphStore {
    /// Connect to PostgreSQL and initialize required schema.
    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        Self::connect_with_options(database_url, 10, 5).await
    }

    /// Connect with explicit pool parameters.
    pub async fn connect_with_options(
        database_url: &str,
        max_connections: u32,
        connect_timeout_secs: u64,
    ) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(std::time::Duration::from_secs(connect_timeout_secs))
            .connect(database_url)
            .await
            .map_err(|e| StorageError::Backend(format!("failed to connect postgres: {e}")))?;
        Self::from_pool(pool).await
    }

    /// Create adapter from an existing pool.
    pub async fn from_pool(pool: PgPool) -> StorageResult<Self> {
        init_schema(&pool).await?;
        let id = load_store_id(&pool).await?;
        info!(store = %id, "postgres graph store ready");
        Ok(Self { pool, id })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl GraphStore for PostgresGraphStore {
    fn store_id(&self) -> StoreId {
        self.id
    }

    async fn install_schema(&self) -> StorageResult<()> {
        init_schema(&self.pool).await
    }

    async fn begin(&self) -> StorageResult<Box<dyn GraphTransaction>> {
        let tx = self.pool.begin().await.map_err(backend)?;
        Ok(Box::new(PostgresTransaction { tx }))
    }
}

async fn init_schema(pool: &PgPool) -> StorageResult<()> {
    let ddl = [
        r#"
        CREATE TABLE IF NOT EXISTS supergraph_meta (
            singleton BOOLEAN PRIMARY KEY DEFAULT TRUE CHECK (singleton),
            store_id UUID NOT NULL,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS supergraph_containers (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('root', 'fragment')),
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS supergraph_fragments (
            root_id UUID NOT NULL REFERENCES supergraph_containers(id) ON DELETE CASCADE,
            fragment_id UUID NOT NULL REFERENCES supergraph_containers(id) ON DELETE CASCADE,
            PRIMARY KEY (root_id, fragment_id)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS supergraph_nodes (
            kind TEXT NOT NULL CHECK (kind IN ('vertex', 'port', 'group')),
            uid TEXT NOT NULL,
            properties JSONB NOT NULL,
            meta JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            PRIMARY KEY (kind, uid)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS supergraph_ownership (
            container_id UUID NOT NULL REFERENCES supergraph_containers(id) ON DELETE CASCADE,
            kind TEXT NOT NULL,
            uid TEXT NOT NULL,
            PRIMARY KEY (container_id, kind, uid),
            FOREIGN KEY (kind, uid) REFERENCES supergraph_nodes(kind, uid) ON DELETE CASCADE
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS supergraph_port_links (
            vertex_kind TEXT NOT NULL DEFAULT 'vertex' CHECK (vertex_kind = 'vertex'),
            vertex_uid TEXT NOT NULL,
            port_kind TEXT NOT NULL DEFAULT 'port' CHECK (port_kind = 'port'),
            port_uid TEXT NOT NULL,
            PRIMARY KEY (vertex_uid, port_uid),
            FOREIGN KEY (vertex_kind, vertex_uid) REFERENCES supergraph_nodes(kind, uid) ON DELETE CASCADE,
            FOREIGN KEY (port_kind, port_uid) REFERENCES supergraph_nodes(kind, uid) ON DELETE CASCADE
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS supergraph_edges (
            start_kind TEXT NOT NULL DEFAULT 'port' CHECK (start_kind = 'port'),
            start_uid TEXT NOT NULL,
            end_kind TEXT NOT NULL DEFAULT 'port' CHECK (end_kind = 'port'),
            end_uid TEXT NOT NULL,
            meta JSONB NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            PRIMARY KEY (start_uid, end_uid),
            FOREIGN KEY (start_kind, start_uid) REFERENCES supergraph_nodes(kind, uid) ON DELETE CASCADE,
            FOREIGN KEY (end_kind, end_uid) REFERENCES supergraph_nodes(kind, uid) ON DELETE CASCADE
        )
        "#,
        "CREATE INDEX IF NOT EXISTS supergraph_ownership_node_idx ON supergraph_ownership (kind, uid)",
        "CREATE INDEX IF NOT EXISTS supergraph_fragments_fragment_idx ON supergraph_fragments (fragment_id)",
        "CREATE INDEX IF NOT EXISTS supergraph_port_links_port_idx ON supergraph_port_links (port_uid)",
        "CREATE INDEX IF NOT EXISTS supergraph_edges_end_idx ON supergraph_edges (end_uid)",
    ];

    for stmt in ddl {
        sqlx::query(stmt)
            .execute(pool)
            .await
            .map_err(|e| StorageError::Backend(format!("schema init failed: {e}")))?;
    }

    sqlx::query(
        r#"
        INSERT INTO supergraph_meta (singleton, store_id, created_at)
        VALUES (TRUE, $1, $2)
        ON CONFLICT (singleton) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(Utc::now())
    .execute(pool)
    .await
    .map_err(|e| StorageError::Backend(format!("schema init failed: {e}")))?;

    debug!("postgres graph schema installed");
    Ok(())
}

async fn load_store_id(pool: &PgPool) -> StorageResult<StoreId> {
    let row = sqlx::query("SELECT store_id FROM supergraph_meta WHERE singleton")
        .fetch_one(pool)
        .await
        .map_err(backend)?;
    let id: Uuid = row.try_get("store_id").map_err(backend)?;
    Ok(StoreId::from_uuid(id))
}

/// Transaction over a [`PostgresGraphStore`].
pub struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl GraphTransaction for PostgresTransaction {
    async fn insert_container(&mut self, record: &ContainerRecord) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO supergraph_containers (id, name, kind, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(*record.id.as_uuid())
        .bind(&record.name)
        .bind(record.kind.as_str())
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn container(&mut self, id: ContainerId) -> StorageResult<Option<ContainerRecord>> {
        let row = sqlx::query(
            "SELECT id, name, kind, created_at, updated_at FROM supergraph_containers WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(backend)?;
        row.map(container_row_to_record).transpose()
    }

    async fn containers(
        &mut self,
        kind: Option<ContainerKind>,
    ) -> StorageResult<Vec<ContainerRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, kind, created_at, updated_at
              FROM supergraph_containers
             WHERE $1::TEXT IS NULL OR kind = $1
             ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(kind.map(|k| k.as_str()))
        .fetch_all(&mut *self.tx)
        .await
        .map_err(backend)?;
        rows.into_iter().map(container_row_to_record).collect()
    }

    async fn rename_container(
        &mut self,
        id: ContainerId,
        name: &str,
        at: DateTime<Utc>,
    ) -> StorageResult<()> {
        let result =
            sqlx::query("UPDATE supergraph_containers SET name = $1, updated_at = $2 WHERE id = $3")
                .bind(name)
                .bind(at)
                .bind(*id.as_uuid())
                .execute(&mut *self.tx)
                .await
                .map_err(backend)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("container {id} not found")));
        }
        Ok(())
    }

    async fn touch_container(&mut self, id: ContainerId, at: DateTime<Utc>) -> StorageResult<()> {
        let result = sqlx::query("UPDATE supergraph_containers SET updated_at = $1 WHERE id = $2")
            .bind(at)
            .bind(*id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(backend)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("container {id} not found")));
        }
        Ok(())
    }

    async fn delete_container(&mut self, id: ContainerId) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM supergraph_containers WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn link_fragment(
        &mut self,
        root: ContainerId,
        fragment: ContainerId,
    ) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO supergraph_fragments (root_id, fragment_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(*root.as_uuid())
        .bind(*fragment.as_uuid())
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn fragments(&mut self, root: ContainerId) -> StorageResult<Vec<ContainerId>> {
        let rows = sqlx::query(
            "SELECT fragment_id FROM supergraph_fragments WHERE root_id = $1 ORDER BY fragment_id",
        )
        .bind(*root.as_uuid())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(backend)?;
        rows.iter().map(|row| container_id(row, "fragment_id")).collect()
    }

    async fn roots_of(&mut self, fragment: ContainerId) -> StorageResult<Vec<ContainerId>> {
        let rows = sqlx::query(
            "SELECT root_id FROM supergraph_fragments WHERE fragment_id = $1 ORDER BY root_id",
        )
        .bind(*fragment.as_uuid())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(backend)?;
        rows.iter().map(|row| container_id(row, "root_id")).collect()
    }

    async fn node(&mut self, kind: NodeKind, uid: &Uid) -> StorageResult<Option<NodeRecord>> {
        let row = sqlx::query(
            r#"
            SELECT kind, uid, properties, meta, created_at, updated_at
              FROM supergraph_nodes
             WHERE kind = $1 AND uid = $2
            "#,
        )
        .bind(kind.as_str())
        .bind(uid.as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(backend)?;
        row.map(node_row_to_record).transpose()
    }

    async fn create_node(&mut self, record: &NodeRecord) -> StorageResult<()> {
        let properties = serde_json::to_value(&record.properties)?;
        sqlx::query(
            r#"
            INSERT INTO supergraph_nodes (kind, uid, properties, meta, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.kind.as_str())
        .bind(record.uid.as_str())
        .bind(properties)
        .bind(&record.meta)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn update_node(&mut self, record: &NodeRecord) -> StorageResult<()> {
        let properties = serde_json::to_value(&record.properties)?;
        let result = sqlx::query(
            r#"
            UPDATE supergraph_nodes
               SET properties = $1,
                   meta = $2,
                   updated_at = $3
             WHERE kind = $4 AND uid = $5
            "#,
        )
        .bind(properties)
        .bind(&record.meta)
        .bind(record.updated_at)
        .bind(record.kind.as_str())
        .bind(record.uid.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(backend)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!(
                "{} {} not found",
                record.kind, record.uid
            )));
        }
        Ok(())
    }

    async fn delete_node(&mut self, kind: NodeKind, uid: &Uid) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM supergraph_nodes WHERE kind = $1 AND uid = $2")
            .bind(kind.as_str())
            .bind(uid.as_str())
            .execute(&mut *self.tx)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn owned(
        &mut self,
        container: ContainerId,
        kind: NodeKind,
    ) -> StorageResult<Vec<NodeRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT n.kind, n.uid, n.properties, n.meta, n.created_at, n.updated_at
              FROM supergraph_ownership o
              JOIN supergraph_nodes n ON n.kind = o.kind AND n.uid = o.uid
             WHERE o.container_id = $1 AND o.kind = $2
             ORDER BY n.uid
            "#,
        )
        .bind(*container.as_uuid())
        .bind(kind.as_str())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(backend)?;
        rows.into_iter().map(node_row_to_record).collect()
    }

    async fn owners(&mut self, kind: NodeKind, uid: &Uid) -> StorageResult<Vec<ContainerId>> {
        let rows = sqlx::query(
            r#"
            SELECT container_id FROM supergraph_ownership
             WHERE kind = $1 AND uid = $2
             ORDER BY container_id
            "#,
        )
        .bind(kind.as_str())
        .bind(uid.as_str())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(backend)?;
        rows.iter().map(|row| container_id(row, "container_id")).collect()
    }

    async fn own(
        &mut self,
        container: ContainerId,
        kind: NodeKind,
        uid: &Uid,
    ) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO supergraph_ownership (container_id, kind, uid)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(*container.as_uuid())
        .bind(kind.as_str())
        .bind(uid.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn disown(
        &mut self,
        container: ContainerId,
        kind: NodeKind,
        uid: &Uid,
    ) -> StorageResult<bool> {
        let result = sqlx::query(
            "DELETE FROM supergraph_ownership WHERE container_id = $1 AND kind = $2 AND uid = $3",
        )
        .bind(*container.as_uuid())
        .bind(kind.as_str())
        .bind(uid.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn ports_of(&mut self, vertex: &Uid) -> StorageResult<Vec<NodeRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT n.kind, n.uid, n.properties, n.meta, n.created_at, n.updated_at
              FROM supergraph_port_links l
              JOIN supergraph_nodes n ON n.kind = l.port_kind AND n.uid = l.port_uid
             WHERE l.vertex_uid = $1
             ORDER BY n.uid
            "#,
        )
        .bind(vertex.as_str())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(backend)?;
        rows.into_iter().map(node_row_to_record).collect()
    }

    async fn attach_port(&mut self, vertex: &Uid, port: &Uid) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO supergraph_port_links (vertex_uid, port_uid)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(vertex.as_str())
        .bind(port.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn detach_port(&mut self, vertex: &Uid, port: &Uid) -> StorageResult<bool> {
        let result = sqlx::query(
            "DELETE FROM supergraph_port_links WHERE vertex_uid = $1 AND port_uid = $2",
        )
        .bind(vertex.as_str())
        .bind(port.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn edges_among(&mut self, ports: &BTreeSet<Uid>) -> StorageResult<Vec<EdgeRecord>> {
        if ports.is_empty() {
            return Ok(Vec::new());
        }
        let uids: Vec<String> = ports.iter().map(|p| p.0.clone()).collect();
        let rows = sqlx::query(
            r#"
            SELECT start_uid, end_uid, meta, created_at, updated_at
              FROM supergraph_edges
             WHERE start_uid = ANY($1) AND end_uid = ANY($1)
             ORDER BY start_uid, end_uid
            "#,
        )
        .bind(&uids)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(backend)?;
        rows.into_iter().map(edge_row_to_record).collect()
    }

    async fn edge(&mut self, key: &EdgeKey) -> StorageResult<Option<EdgeRecord>> {
        let row = sqlx::query(
            r#"
            SELECT start_uid, end_uid, meta, created_at, updated_at
              FROM supergraph_edges
             WHERE start_uid = $1 AND end_uid = $2
            "#,
        )
        .bind(key.start.as_str())
        .bind(key.end.as_str())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(backend)?;
        row.map(edge_row_to_record).transpose()
    }

    async fn create_edge(&mut self, record: &EdgeRecord) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO supergraph_edges (start_uid, end_uid, meta, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.key.start.as_str())
        .bind(record.key.end.as_str())
        .bind(&record.meta)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn update_edge(&mut self, record: &EdgeRecord) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE supergraph_edges
               SET meta = $1,
                   updated_at = $2
             WHERE start_uid = $3 AND end_uid = $4
            "#,
        )
        .bind(&record.meta)
        .bind(record.updated_at)
        .bind(record.key.start.as_str())
        .bind(record.key.end.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(backend)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!(
                "edge {} not found",
                record.key
            )));
        }
        Ok(())
    }

    async fn delete_edge(&mut self, key: &EdgeKey) -> StorageResult<bool> {
        let result =
            sqlx::query("DELETE FROM supergraph_edges WHERE start_uid = $1 AND end_uid = $2")
                .bind(key.start.as_str())
                .bind(key.end.as_str())
                .execute(&mut *self.tx)
                .await
                .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn stats(&mut self) -> StorageResult<GraphStats> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM supergraph_containers WHERE kind = 'root') AS roots,
                (SELECT COUNT(*) FROM supergraph_containers WHERE kind = 'fragment') AS fragments,
                (SELECT COUNT(*) FROM supergraph_nodes WHERE kind = 'vertex') AS vertices,
                (SELECT COUNT(*) FROM supergraph_nodes WHERE kind = 'port') AS ports,
                (SELECT COUNT(*) FROM supergraph_nodes WHERE kind = 'group') AS "groups",
                (SELECT COUNT(*) FROM supergraph_edges) AS edges,
                (SELECT COUNT(*) FROM supergraph_fragments) AS fragment_links,
                (SELECT COUNT(*) FROM supergraph_ownership) AS ownership_links,
                (SELECT COUNT(*) FROM supergraph_port_links) AS port_links
            "#,
        )
        .fetch_one(&mut *self.tx)
        .await
        .map_err(backend)?;

        let count = |column: &str| -> StorageResult<u64> {
            let value: i64 = row.try_get(column).map_err(backend)?;
            u64::try_from(value)
                .map_err(|_| StorageError::Backend(format!("negative count in {column}")))
        };

        Ok(GraphStats {
            roots: count("roots")?,
            fragments: count("fragments")?,
            vertices: count("vertices")?,
            ports: count("ports")?,
            groups: count("groups")?,
            edges: count("edges")?,
            fragment_links: count("fragment_links")?,
            ownership_links: count("ownership_links")?,
            port_links: count("port_links")?,
        })
    }

    async fn commit(self: Box<Self>) -> StorageResult<()> {
        self.tx.commit().await.map_err(backend)
    }

    async fn rollback(self: Box<Self>) -> StorageResult<()> {
        self.tx.rollback().await.map_err(backend)
    }
}

fn container_row_to_record(row: PgRow) -> StorageResult<ContainerRecord> {
    let id: Uuid = row.try_get("id").map_err(backend)?;
    let kind: String = row.try_get("kind").map_err(backend)?;
    Ok(ContainerRecord {
        id: ContainerId::from_uuid(id),
        name: row.try_get("name").map_err(backend)?,
        kind: kind.parse().map_err(StorageError::Serialization)?,
        created_at: row.try_get("created_at").map_err(backend)?,
        updated_at: row.try_get("updated_at").map_err(backend)?,
    })
}

fn node_row_to_record(row: PgRow) -> StorageResult<NodeRecord> {
    let kind: String = row.try_get("kind").map_err(backend)?;
    let uid: String = row.try_get("uid").map_err(backend)?;
    let properties: Value = row.try_get("properties").map_err(backend)?;
    Ok(NodeRecord {
        kind: parse_node_kind(&kind)?,
        uid: Uid::from(uid),
        properties: serde_json::from_value(properties)?,
        meta: row.try_get("meta").map_err(backend)?,
        created_at: row.try_get("created_at").map_err(backend)?,
        updated_at: row.try_get("updated_at").map_err(backend)?,
    })
}

fn edge_row_to_record(row: PgRow) -> StorageResult<EdgeRecord> {
    let start: String = row.try_get("start_uid").map_err(backend)?;
    let end: String = row.try_get("end_uid").map_err(backend)?;
    Ok(EdgeRecord {
        key: EdgeKey::new(start, end),
        meta: row.try_get("meta").map_err(backend)?,
        created_at: row.try_get("created_at").map_err(backend)?,
        updated_at: row.try_get("updated_at").map_err(backend)?,
    })
}

fn container_id(row: &PgRow, column: &str) -> StorageResult<ContainerId> {
    let id: Uuid = row.try_get(column).map_err(backend)?;
    Ok(ContainerId::from_uuid(id))
}

fn parse_node_kind(raw: &str) -> StorageResult<NodeKind> {
    match raw {
        "vertex" => Ok(NodeKind::Vertex),
        "port" => Ok(NodeKind::Port),
        "group" => Ok(NodeKind::Group),
        _ => Err(StorageError::Serialization(format!(
            "unknown node kind `{raw}`"
        ))),
    }
}

fn backend(err: sqlx::Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => return StorageError::Conflict(db_err.message().to_string()),
            Some("23503") => return StorageError::NotFound(db_err.message().to_string()),
            _ => {}
        }
    }
    StorageError::Backend(err.to_string())
}
