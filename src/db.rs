// ==========================================
// Estimate reconciliation engine - SQLite connection setup
// ==========================================
// Goals:
// - unify PRAGMA behavior across every Connection::open (foreign keys on everywhere)
// - unify busy_timeout to reduce sporadic busy errors under concurrent writes
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// Default busy_timeout (milliseconds)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Schema version expected by the current code.
///
/// Used for warning only (no automatic migration), so the engine never runs
/// silently against an older database layout.
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Apply the unified PRAGMA set to a SQLite connection.
///
/// foreign_keys and busy_timeout are per-connection settings and must be
/// re-applied on every open.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the unified configuration applied.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Read the schema version (None if the table does not exist yet).
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// Create all tables and indexes used by the engine.
///
/// Idempotent (CREATE TABLE IF NOT EXISTS), used by the binary on startup and
/// by the integration tests against a fresh temp database.
///
/// Source tables (estimates, estimate_items, work_volumes, contracts) are
/// owned by the surrounding record stores; the engine reads them. Derived
/// tables (volume_project_match, estimate_validation, cost_control,
/// estimate_contract_link) are written only by the engine.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS estimates (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id INTEGER NOT NULL,
            estimate_type TEXT NOT NULL,
            number TEXT NOT NULL,
            name TEXT NOT NULL,
            total_amount REAL NOT NULL DEFAULT 0,
            materials_cost REAL NOT NULL DEFAULT 0,
            labor_cost REAL NOT NULL DEFAULT 0,
            equipment_cost REAL NOT NULL DEFAULT 0,
            related_costs REAL NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_estimates_project ON estimates(project_id);

        CREATE TABLE IF NOT EXISTS estimate_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            estimate_id INTEGER NOT NULL REFERENCES estimates(id) ON DELETE CASCADE,
            work_name TEXT NOT NULL,
            quantity REAL NOT NULL,
            total_price REAL,
            materials_price REAL,
            labor_price REAL,
            equipment_price REAL
        );
        CREATE INDEX IF NOT EXISTS idx_estimate_items_estimate ON estimate_items(estimate_id);

        CREATE TABLE IF NOT EXISTS work_volumes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id INTEGER NOT NULL,
            construct_id INTEGER,
            work_code TEXT,
            work_name TEXT NOT NULL,
            unit TEXT,
            planned_volume REAL NOT NULL,
            actual_volume REAL NOT NULL DEFAULT 0,
            planned_amount REAL
        );
        CREATE INDEX IF NOT EXISTS idx_work_volumes_project ON work_volumes(project_id);

        CREATE TABLE IF NOT EXISTS contracts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            number TEXT NOT NULL,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS volume_project_match (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            project_id INTEGER NOT NULL,
            construct_id INTEGER,
            work_volume_id INTEGER NOT NULL REFERENCES work_volumes(id),
            estimate_id INTEGER NOT NULL REFERENCES estimates(id),
            work_code TEXT,
            work_name TEXT NOT NULL,
            project_volume REAL NOT NULL,
            estimated_volume REAL NOT NULL,
            actual_volume REAL NOT NULL,
            deviation_estimate REAL NOT NULL,
            deviation_actual REAL,
            deviation_percentage REAL NOT NULL,
            status TEXT NOT NULL,
            checked_date TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_vpm_estimate ON volume_project_match(estimate_id);
        CREATE INDEX IF NOT EXISTS idx_vpm_project ON volume_project_match(project_id);

        CREATE TABLE IF NOT EXISTS estimate_validation (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            estimate_id INTEGER NOT NULL REFERENCES estimates(id),
            validation_type TEXT NOT NULL,
            rule TEXT NOT NULL,
            status TEXT NOT NULL,
            description TEXT,
            expected_value TEXT,
            actual_value TEXT,
            deviation_percentage REAL,
            is_critical INTEGER NOT NULL DEFAULT 0,
            checked_date TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_validation_estimate ON estimate_validation(estimate_id);

        CREATE TABLE IF NOT EXISTS cost_control (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            estimate_id INTEGER NOT NULL REFERENCES estimates(id),
            contract_id INTEGER REFERENCES contracts(id),
            control_date TEXT NOT NULL,
            planned_amount REAL NOT NULL,
            actual_amount REAL NOT NULL DEFAULT 0,
            deviation_amount REAL NOT NULL,
            deviation_percentage REAL NOT NULL,
            materials_planned REAL,
            materials_actual REAL,
            labor_planned REAL,
            labor_actual REAL,
            equipment_planned REAL,
            equipment_actual REAL,
            related_costs_planned REAL,
            related_costs_actual REAL,
            status TEXT NOT NULL,
            notes TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_cost_control_estimate ON cost_control(estimate_id);

        CREATE TABLE IF NOT EXISTS estimate_contract_link (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            estimate_id INTEGER NOT NULL REFERENCES estimates(id),
            contract_id INTEGER NOT NULL REFERENCES contracts(id),
            is_primary INTEGER NOT NULL DEFAULT 0,
            usage_type TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE (estimate_id, contract_id)
        );
        -- At most one primary estimate per contract, enforced structurally.
        CREATE UNIQUE INDEX IF NOT EXISTS idx_link_primary_per_contract
            ON estimate_contract_link(contract_id) WHERE is_primary = 1;

        INSERT OR IGNORE INTO schema_version (version) VALUES (1);
        "#,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }
}
