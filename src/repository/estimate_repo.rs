// ==========================================
// Estimate reconciliation engine - estimate repository
// ==========================================
// Data access for estimates and their line items. No business logic here;
// all queries are parameterized.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::estimate::{Estimate, EstimateItem, SummaryTotals};
use crate::domain::types::EstimateType;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// EstimateRepository
// ==========================================
pub struct EstimateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EstimateRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Build a repository over an already opened shared connection.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Insert an estimate (id is assigned by the database).
    pub fn insert(&self, estimate: &Estimate) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO estimates (
                project_id, estimate_type, number, name,
                total_amount, materials_cost, labor_cost, equipment_cost, related_costs,
                is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                estimate.project_id,
                estimate.estimate_type.as_str(),
                estimate.number,
                estimate.name,
                estimate.total_amount,
                estimate.materials_cost,
                estimate.labor_cost,
                estimate.equipment_cost,
                estimate.related_costs,
                estimate.is_active,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Insert a line item for an estimate.
    pub fn insert_item(&self, item: &EstimateItem) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO estimate_items (
                estimate_id, work_name, quantity,
                total_price, materials_price, labor_price, equipment_price
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                item.estimate_id,
                item.work_name,
                item.quantity,
                item.total_price,
                item.materials_price,
                item.labor_price,
                item.equipment_price,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Find an estimate by id.
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Estimate>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, project_id, estimate_type, number, name,
                   total_amount, materials_cost, labor_cost, equipment_cost, related_costs,
                   is_active, created_at
            FROM estimates
            WHERE id = ?1
            "#,
        )?;

        let result = stmt.query_row(params![id], map_estimate_row);
        match result {
            Ok(estimate) => Ok(Some(estimate)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Line items of an estimate, in insertion order.
    ///
    /// The order matters: the matcher builds its name index by first
    /// occurrence, so iteration must be stable across runs.
    pub fn find_items(&self, estimate_id: i64) -> RepositoryResult<Vec<EstimateItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, estimate_id, work_name, quantity,
                   total_price, materials_price, labor_price, equipment_price
            FROM estimate_items
            WHERE estimate_id = ?1
            ORDER BY id ASC
            "#,
        )?;

        let items = stmt
            .query_map(params![estimate_id], |row| {
                Ok(EstimateItem {
                    id: row.get(0)?,
                    estimate_id: row.get(1)?,
                    work_name: row.get(2)?,
                    quantity: row.get(3)?,
                    total_price: row.get(4)?,
                    materials_price: row.get(5)?,
                    labor_price: row.get(6)?,
                    equipment_price: row.get(7)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(items)
    }

    /// Active LOCAL/OBJECT estimates of a project (roll-up children).
    pub fn find_active_children(&self, project_id: i64) -> RepositoryResult<Vec<Estimate>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, project_id, estimate_type, number, name,
                   total_amount, materials_cost, labor_cost, equipment_cost, related_costs,
                   is_active, created_at
            FROM estimates
            WHERE project_id = ?1
              AND estimate_type IN ('local', 'object')
              AND is_active = 1
            ORDER BY id ASC
            "#,
        )?;

        let estimates = stmt
            .query_map(params![project_id], map_estimate_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(estimates)
    }

    /// Overwrite the aggregate cost fields of a SUMMARY estimate.
    ///
    /// The caller (roll-up) has already checked the estimate type; this is a
    /// plain overwrite, not an append.
    pub fn update_summary_costs(
        &self,
        estimate_id: i64,
        totals: &SummaryTotals,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let updated = conn.execute(
            r#"
            UPDATE estimates
            SET total_amount = ?2,
                materials_cost = ?3,
                labor_cost = ?4,
                equipment_cost = ?5,
                related_costs = ?6
            WHERE id = ?1
            "#,
            params![
                estimate_id,
                totals.total_amount,
                totals.materials_cost,
                totals.labor_cost,
                totals.equipment_cost,
                totals.related_costs,
            ],
        )?;

        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Estimate".to_string(),
                id: estimate_id.to_string(),
            });
        }
        Ok(())
    }

    /// Toggle the is_active flag (used to exclude a child from future roll-ups).
    pub fn set_active(&self, estimate_id: i64, is_active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let updated = conn.execute(
            "UPDATE estimates SET is_active = ?2 WHERE id = ?1",
            params![estimate_id, is_active],
        )?;
        if updated == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Estimate".to_string(),
                id: estimate_id.to_string(),
            });
        }
        Ok(())
    }
}

// ==========================================
// Row mapping
// ==========================================

fn map_estimate_row(row: &Row<'_>) -> SqliteResult<Estimate> {
    let type_raw: String = row.get(2)?;
    let estimate_type = parse_estimate_type_col(&type_raw)?;

    Ok(Estimate {
        id: row.get(0)?,
        project_id: row.get(1)?,
        estimate_type,
        number: row.get(3)?,
        name: row.get(4)?,
        total_amount: row.get(5)?,
        materials_cost: row.get(6)?,
        labor_cost: row.get(7)?,
        equipment_cost: row.get(8)?,
        related_costs: row.get(9)?,
        is_active: row.get(10)?,
        created_at: row.get(11)?,
    })
}

/// Reject unknown stored estimate types instead of defaulting.
fn parse_estimate_type_col(s: &str) -> SqliteResult<EstimateType> {
    EstimateType::parse(s).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown estimate_type: {}", s).into(),
        )
    })
}
