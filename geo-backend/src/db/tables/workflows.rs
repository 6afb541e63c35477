//! Workflow definitions and execution history
//!
//! Step lists and step results are stored as JSON blobs; rows that fail to
//! deserialize are surfaced as sqlite errors rather than silently dropped.

use rusqlite::Result as SqliteResult;

use super::parse_ts;
use crate::db::Database;
use crate::models::{ExecutionStatus, Workflow, WorkflowExecution};

fn json_column_err(e: serde_json::Error) -> rusqlite::Error {
    rusqlite::Error::ToSqlConversionFailure(Box::new(e))
}

impl Database {
    /// INSERT OR REPLACE so saving an existing id overwrites the definition.
    pub fn save_workflow(&self, workflow: &Workflow) -> SqliteResult<()> {
        let steps = serde_json::to_string(&workflow.steps).map_err(json_column_err)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO workflows (id, name, brand, steps, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                workflow.id,
                workflow.name,
                workflow.brand,
                steps,
                workflow.created_at.to_rfc3339(),
                workflow.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_workflow(&self, id: &str) -> SqliteResult<Option<Workflow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, brand, steps, created_at, updated_at
             FROM workflows WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map([id], map_workflow)?;
        rows.next().transpose()
    }

    pub fn list_workflows(&self, brand: Option<&str>) -> SqliteResult<Vec<Workflow>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, brand, steps, created_at, updated_at
             FROM workflows
             WHERE (?1 IS NULL OR brand = ?1)
             ORDER BY updated_at DESC",
        )?;
        let rows = stmt.query_map([brand], map_workflow)?;
        rows.collect()
    }

    /// Returns true when a row was actually removed.
    pub fn delete_workflow(&self, id: &str) -> SqliteResult<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute("DELETE FROM workflows WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    pub fn save_workflow_execution(&self, execution: &WorkflowExecution) -> SqliteResult<()> {
        let step_results =
            serde_json::to_string(&execution.step_results).map_err(json_column_err)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO workflow_executions
                 (id, workflow_id, status, step_results, started_at, finished_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                execution.id,
                execution.workflow_id,
                execution.status.as_str(),
                step_results,
                execution.started_at.to_rfc3339(),
                execution.finished_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    pub fn list_workflow_executions(
        &self,
        workflow_id: Option<&str>,
    ) -> SqliteResult<Vec<WorkflowExecution>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, workflow_id, status, step_results, started_at, finished_at
             FROM workflow_executions
             WHERE (?1 IS NULL OR workflow_id = ?1)
             ORDER BY started_at DESC",
        )?;
        let rows = stmt.query_map([workflow_id], |row| {
            let status: String = row.get(2)?;
            let step_results: String = row.get(3)?;
            let started_at: String = row.get(4)?;
            let finished_at: Option<String> = row.get(5)?;
            Ok(WorkflowExecution {
                id: row.get(0)?,
                workflow_id: row.get(1)?,
                status: ExecutionStatus::from_str(&status).unwrap_or(ExecutionStatus::Failed),
                step_results: serde_json::from_str(&step_results).unwrap_or_default(),
                started_at: parse_ts(&started_at),
                finished_at: finished_at.map(|t| parse_ts(&t)),
            })
        })?;
        rows.collect()
    }
}

fn map_workflow(row: &rusqlite::Row<'_>) -> SqliteResult<Workflow> {
    let steps: String = row.get(3)?;
    let created_at: String = row.get(4)?;
    let updated_at: String = row.get(5)?;
    Ok(Workflow {
        id: row.get(0)?,
        name: row.get(1)?,
        brand: row.get(2)?,
        steps: serde_json::from_str(&steps).unwrap_or_default(),
        created_at: parse_ts(&created_at),
        updated_at: parse_ts(&updated_at),
    })
}
