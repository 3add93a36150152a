// ==========================================
// Estimate reconciliation engine - work volume repository
// ==========================================
// Read access to the bill-of-quantities ledger, optionally scoped to one
// structural element (construct).
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::work_volume::WorkVolume;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct WorkVolumeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WorkVolumeRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Insert a ledger row (id is assigned by the database).
    pub fn insert(&self, volume: &WorkVolume) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO work_volumes (
                project_id, construct_id, work_code, work_name, unit,
                planned_volume, actual_volume, planned_amount
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                volume.project_id,
                volume.construct_id,
                volume.work_code,
                volume.work_name,
                volume.unit,
                volume.planned_volume,
                volume.actual_volume,
                volume.planned_amount,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Ledger rows of a project, optionally filtered by construct, in
    /// insertion order (stable across reruns).
    pub fn find_by_project(
        &self,
        project_id: i64,
        construct_id: Option<i64>,
    ) -> RepositoryResult<Vec<WorkVolume>> {
        let conn = self.get_conn()?;

        match construct_id {
            Some(cid) => {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, project_id, construct_id, work_code, work_name, unit,
                           planned_volume, actual_volume, planned_amount
                    FROM work_volumes
                    WHERE project_id = ?1 AND construct_id = ?2
                    ORDER BY id ASC
                    "#,
                )?;
                let volumes = stmt
                    .query_map(params![project_id, cid], map_work_volume_row)?
                    .collect::<SqliteResult<Vec<_>>>()?;
                Ok(volumes)
            }
            None => {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, project_id, construct_id, work_code, work_name, unit,
                           planned_volume, actual_volume, planned_amount
                    FROM work_volumes
                    WHERE project_id = ?1
                    ORDER BY id ASC
                    "#,
                )?;
                let volumes = stmt
                    .query_map(params![project_id], map_work_volume_row)?
                    .collect::<SqliteResult<Vec<_>>>()?;
                Ok(volumes)
            }
        }
    }
}

fn map_work_volume_row(row: &Row<'_>) -> SqliteResult<WorkVolume> {
    Ok(WorkVolume {
        id: row.get(0)?,
        project_id: row.get(1)?,
        construct_id: row.get(2)?,
        work_code: row.get(3)?,
        work_name: row.get(4)?,
        unit: row.get(5)?,
        planned_volume: row.get(6)?,
        actual_volume: row.get(7)?,
        planned_amount: row.get(8)?,
    })
}
