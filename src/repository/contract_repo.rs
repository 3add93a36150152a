// ==========================================
// Estimate reconciliation engine - contract link repository
// ==========================================
// Contracts are read-only source rows. Links carry the single-primary
// invariant: clearing the old primary and setting the new one happen in the
// same transaction, backed by the partial unique index on
// (contract_id) WHERE is_primary = 1.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::contract::{Contract, EstimateContractLink};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct ContractRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ContractRepository {
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

    /// Insert a contract (id is assigned by the database).
    pub fn insert(&self, contract: &Contract) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO contracts (number, name) VALUES (?1, ?2)",
            params![contract.number, contract.name],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Contract>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT id, number, name FROM contracts WHERE id = ?1",
            params![id],
            |row| {
                Ok(Contract {
                    id: row.get(0)?,
                    number: row.get(1)?,
                    name: row.get(2)?,
                })
            },
        );
        match result {
            Ok(contract) => Ok(Some(contract)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Upsert an estimate-contract link.
    ///
    /// When the link is primary, every other link of the contract loses its
    /// primary flag first; both steps commit as one transaction so the
    /// invariant (at most one primary per contract) holds at every point a
    /// reader can observe.
    pub fn upsert_link(
        &self,
        link: &EstimateContractLink,
    ) -> RepositoryResult<EstimateContractLink> {
        let conn = self.get_conn()?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        if link.is_primary {
            tx.execute(
                "UPDATE estimate_contract_link SET is_primary = 0 WHERE contract_id = ?1",
                params![link.contract_id],
            )?;
        }

        tx.execute(
            r#"
            INSERT INTO estimate_contract_link (
                estimate_id, contract_id, is_primary, usage_type, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(estimate_id, contract_id) DO UPDATE SET
                is_primary = excluded.is_primary,
                usage_type = excluded.usage_type
            "#,
            params![
                link.estimate_id,
                link.contract_id,
                link.is_primary,
                link.usage_type,
                link.created_at,
            ],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        // Re-read through the connection already held here to pick up the id
        // regardless of insert-vs-update path. get_conn() must not be called
        // again while this guard is alive (the mutex is not reentrant).
        let result = conn.query_row(
            &format!(
                "{} WHERE estimate_id = ?1 AND contract_id = ?2",
                LINK_SELECT
            ),
            params![link.estimate_id, link.contract_id],
            map_link_row,
        );
        match result {
            Ok(stored) => Ok(stored),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(RepositoryError::NotFound {
                entity: "EstimateContractLink".to_string(),
                id: format!("{}/{}", link.estimate_id, link.contract_id),
            }),
            Err(e) => Err(e.into()),
        }
    }

    pub fn find_link(
        &self,
        estimate_id: i64,
        contract_id: i64,
    ) -> RepositoryResult<Option<EstimateContractLink>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            &format!(
                "{} WHERE estimate_id = ?1 AND contract_id = ?2",
                LINK_SELECT
            ),
            params![estimate_id, contract_id],
            map_link_row,
        );
        match result {
            Ok(link) => Ok(Some(link)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All links of a contract, in insertion order.
    pub fn find_links_by_contract(
        &self,
        contract_id: i64,
    ) -> RepositoryResult<Vec<EstimateContractLink>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE contract_id = ?1 ORDER BY id ASC",
            LINK_SELECT
        ))?;
        let links = stmt
            .query_map(params![contract_id], map_link_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(links)
    }
}

const LINK_SELECT: &str = r#"
    SELECT id, estimate_id, contract_id, is_primary, usage_type, created_at
    FROM estimate_contract_link
"#;

fn map_link_row(row: &Row<'_>) -> SqliteResult<EstimateContractLink> {
    Ok(EstimateContractLink {
        id: row.get(0)?,
        estimate_id: row.get(1)?,
        contract_id: row.get(2)?,
        is_primary: row.get(3)?,
        usage_type: row.get(4)?,
        created_at: row.get(5)?,
    })
}
