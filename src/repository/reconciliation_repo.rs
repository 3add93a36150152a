// ==========================================
// Estimate reconciliation engine - reconciliation result repository
// ==========================================
// Owns the two derived tables rebuilt on every recompute:
// volume_project_match and estimate_validation.
//
// The replace is one transaction: delete both row sets for the estimate,
// insert the fresh sets, commit. A failure rolls everything back, so the
// stored snapshot is never partially purged and a reader never observes a
// transiently empty match set.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::reconciliation::{EstimateValidation, VolumeProjectMatch};
use crate::domain::types::{MatchStatus, ValidationRule, ValidationStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct ReconciliationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReconciliationRepository {
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

    /// Replace the full reconciliation snapshot of an estimate.
    ///
    /// Deletes every existing match and validation row for the estimate and
    /// inserts the freshly computed sets, all inside one transaction.
    ///
    /// Returns the inserted matches with their database-assigned ids.
    pub fn replace_results(
        &self,
        estimate_id: i64,
        matches: &[VolumeProjectMatch],
        validations: &[EstimateValidation],
    ) -> RepositoryResult<Vec<VolumeProjectMatch>> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute(
            "DELETE FROM volume_project_match WHERE estimate_id = ?1",
            params![estimate_id],
        )?;
        tx.execute(
            "DELETE FROM estimate_validation WHERE estimate_id = ?1",
            params![estimate_id],
        )?;

        let mut persisted = Vec::with_capacity(matches.len());
        for m in matches {
            tx.execute(
                r#"
                INSERT INTO volume_project_match (
                    project_id, construct_id, work_volume_id, estimate_id,
                    work_code, work_name,
                    project_volume, estimated_volume, actual_volume,
                    deviation_estimate, deviation_actual, deviation_percentage,
                    status, checked_date
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                "#,
                params![
                    m.project_id,
                    m.construct_id,
                    m.work_volume_id,
                    m.estimate_id,
                    m.work_code,
                    m.work_name,
                    m.project_volume,
                    m.estimated_volume,
                    m.actual_volume,
                    m.deviation_estimate,
                    m.deviation_actual,
                    m.deviation_percentage,
                    m.status.as_str(),
                    m.checked_date,
                ],
            )?;
            let mut row = m.clone();
            row.id = tx.last_insert_rowid();
            persisted.push(row);
        }

        for v in validations {
            tx.execute(
                r#"
                INSERT INTO estimate_validation (
                    estimate_id, validation_type, rule, status,
                    description, expected_value, actual_value,
                    deviation_percentage, is_critical, checked_date
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
                params![
                    v.estimate_id,
                    v.validation_type,
                    v.rule.as_str(),
                    v.status.as_str(),
                    v.description,
                    v.expected_value,
                    v.actual_value,
                    v.deviation_percentage,
                    v.is_critical,
                    v.checked_date,
                ],
            )?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(persisted)
    }

    /// Current match snapshot of an estimate.
    pub fn find_matches_by_estimate(
        &self,
        estimate_id: i64,
    ) -> RepositoryResult<Vec<VolumeProjectMatch>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE estimate_id = ?1 ORDER BY id ASC",
            MATCH_SELECT
        ))?;
        let matches = stmt
            .query_map(params![estimate_id], map_match_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(matches)
    }

    /// All match rows of a project (presentation-layer view across estimates).
    pub fn find_matches_by_project(
        &self,
        project_id: i64,
    ) -> RepositoryResult<Vec<VolumeProjectMatch>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE project_id = ?1 ORDER BY id ASC",
            MATCH_SELECT
        ))?;
        let matches = stmt
            .query_map(params![project_id], map_match_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(matches)
    }

    /// Rule verdicts of an estimate.
    pub fn find_validations(&self, estimate_id: i64) -> RepositoryResult<Vec<EstimateValidation>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, estimate_id, validation_type, rule, status,
                   description, expected_value, actual_value,
                   deviation_percentage, is_critical, checked_date
            FROM estimate_validation
            WHERE estimate_id = ?1
            ORDER BY id ASC
            "#,
        )?;
        let validations = stmt
            .query_map(params![estimate_id], map_validation_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(validations)
    }
}

// ==========================================
// Row mapping
// ==========================================

const MATCH_SELECT: &str = r#"
    SELECT id, project_id, construct_id, work_volume_id, estimate_id,
           work_code, work_name,
           project_volume, estimated_volume, actual_volume,
           deviation_estimate, deviation_actual, deviation_percentage,
           status, checked_date
    FROM volume_project_match
"#;

fn map_match_row(row: &Row<'_>) -> SqliteResult<VolumeProjectMatch> {
    let status_raw: String = row.get(13)?;
    let status = MatchStatus::parse(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            13,
            rusqlite::types::Type::Text,
            format!("unknown match status: {}", status_raw).into(),
        )
    })?;

    Ok(VolumeProjectMatch {
        id: row.get(0)?,
        project_id: row.get(1)?,
        construct_id: row.get(2)?,
        work_volume_id: row.get(3)?,
        estimate_id: row.get(4)?,
        work_code: row.get(5)?,
        work_name: row.get(6)?,
        project_volume: row.get(7)?,
        estimated_volume: row.get(8)?,
        actual_volume: row.get(9)?,
        deviation_estimate: row.get(10)?,
        deviation_actual: row.get(11)?,
        deviation_percentage: row.get(12)?,
        status,
        checked_date: row.get(14)?,
    })
}

fn map_validation_row(row: &Row<'_>) -> SqliteResult<EstimateValidation> {
    let rule_raw: String = row.get(3)?;
    let rule = ValidationRule::parse(&rule_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown validation rule: {}", rule_raw).into(),
        )
    })?;
    let status_raw: String = row.get(4)?;
    let status = ValidationStatus::parse(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown validation status: {}", status_raw).into(),
        )
    })?;

    Ok(EstimateValidation {
        id: row.get(0)?,
        estimate_id: row.get(1)?,
        validation_type: row.get(2)?,
        rule,
        status,
        description: row.get(5)?,
        expected_value: row.get(6)?,
        actual_value: row.get(7)?,
        deviation_percentage: row.get(8)?,
        is_critical: row.get(9)?,
        checked_date: row.get(10)?,
    })
}
