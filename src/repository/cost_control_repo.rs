// ==========================================
// Estimate reconciliation engine - cost control repository
// ==========================================
// Append-only time series. The engine inserts new rows and reads history;
// nothing here ever updates or deletes.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::cost_control::CostControl;
use crate::domain::types::CostControlStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct CostControlRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CostControlRepository {
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

    /// Append one snapshot row; returns it with the assigned id.
    pub fn insert(&self, control: &CostControl) -> RepositoryResult<CostControl> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO cost_control (
                estimate_id, contract_id, control_date,
                planned_amount, actual_amount, deviation_amount, deviation_percentage,
                materials_planned, materials_actual,
                labor_planned, labor_actual,
                equipment_planned, equipment_actual,
                related_costs_planned, related_costs_actual,
                status, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
            "#,
            params![
                control.estimate_id,
                control.contract_id,
                control.control_date,
                control.planned_amount,
                control.actual_amount,
                control.deviation_amount,
                control.deviation_percentage,
                control.materials_planned,
                control.materials_actual,
                control.labor_planned,
                control.labor_actual,
                control.equipment_planned,
                control.equipment_actual,
                control.related_costs_planned,
                control.related_costs_actual,
                control.status.as_str(),
                control.notes,
                control.created_at,
            ],
        )?;

        let mut persisted = control.clone();
        persisted.id = conn.last_insert_rowid();
        Ok(persisted)
    }

    /// History of an estimate, most recent control date first.
    pub fn find_by_estimate(&self, estimate_id: i64) -> RepositoryResult<Vec<CostControl>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, estimate_id, contract_id, control_date,
                   planned_amount, actual_amount, deviation_amount, deviation_percentage,
                   materials_planned, materials_actual,
                   labor_planned, labor_actual,
                   equipment_planned, equipment_actual,
                   related_costs_planned, related_costs_actual,
                   status, notes, created_at
            FROM cost_control
            WHERE estimate_id = ?1
            ORDER BY control_date DESC, id DESC
            "#,
        )?;

        let controls = stmt
            .query_map(params![estimate_id], map_cost_control_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(controls)
    }
}

fn map_cost_control_row(row: &Row<'_>) -> SqliteResult<CostControl> {
    let status_raw: String = row.get(16)?;
    let status = CostControlStatus::parse(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            16,
            rusqlite::types::Type::Text,
            format!("unknown cost control status: {}", status_raw).into(),
        )
    })?;

    Ok(CostControl {
        id: row.get(0)?,
        estimate_id: row.get(1)?,
        contract_id: row.get(2)?,
        control_date: row.get(3)?,
        planned_amount: row.get(4)?,
        actual_amount: row.get(5)?,
        deviation_amount: row.get(6)?,
        deviation_percentage: row.get(7)?,
        materials_planned: row.get(8)?,
        materials_actual: row.get(9)?,
        labor_planned: row.get(10)?,
        labor_actual: row.get(11)?,
        equipment_planned: row.get(12)?,
        equipment_actual: row.get(13)?,
        related_costs_planned: row.get(14)?,
        related_costs_actual: row.get(15)?,
        status,
        notes: row.get(17)?,
        created_at: row.get(18)?,
    })
}
