use chrono::{Local, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension, Row};
use shared::Task;
use tracing::instrument;

use crate::store::database::Database;
use crate::store::error::StoreError;

/// Persistence contract for tasks.
///
/// Identity and timestamps are owned here: `insert` assigns the id and both
/// timestamps, `replace` keeps `created` and refreshes `last_upd`.
pub trait TaskRepository: Send + Sync {
    /// All tasks, ascending by id.
    fn find_all(&self) -> Result<Vec<Task>, StoreError>;

    fn find_by_id(&self, id: i64) -> Result<Option<Task>, StoreError>;

    /// Store a new row. `task.id` is ignored.
    fn insert(&self, task: Task) -> Result<Task, StoreError>;

    /// Overwrite every mutable column of the row with `task.id`.
    /// `None` when no such row exists; nothing is written then.
    fn replace(&self, task: Task) -> Result<Option<Task>, StoreError>;

    /// Deleting a missing id is not an error.
    fn delete_by_id(&self, id: i64) -> Result<(), StoreError>;
}

const SELECT_COLUMNS: &str =
    "SELECT id, created, last_upd, title, description, due_date, completed FROM task";

pub struct SqliteTaskRepository {
    db: Database,
}

impl SqliteTaskRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl TaskRepository for SqliteTaskRepository {
    #[instrument(skip(self))]
    fn find_all(&self) -> Result<Vec<Task>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id"))?;
            let rows = stmt
                .query_map([], task_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    #[instrument(skip(self))]
    fn find_by_id(&self, id: i64) -> Result<Option<Task>, StoreError> {
        self.db.with_conn(|conn| select_one(conn, id))
    }

    #[instrument(skip(self, task))]
    fn insert(&self, task: Task) -> Result<Task, StoreError> {
        let now = now();
        self.db.with_tx(|tx| {
            tx.execute(
                "INSERT INTO task (created, last_upd, title, description, due_date, completed)
                 VALUES (?1, ?1, ?2, ?3, ?4, ?5)",
                params![now, task.title, task.description, task.due_date, task.completed],
            )?;
            let id = tx.last_insert_rowid();
            select_one(tx, id)?
                .ok_or_else(|| StoreError::Database(format!("task {id} vanished after insert")))
        })
    }

    #[instrument(skip(self, task), fields(task_id = task.id))]
    fn replace(&self, task: Task) -> Result<Option<Task>, StoreError> {
        let now = now();
        self.db.with_tx(|tx| {
            let changed = tx.execute(
                "UPDATE task SET
                    last_upd = ?2,
                    title = ?3,
                    description = ?4,
                    due_date = ?5,
                    completed = ?6
                 WHERE id = ?1",
                params![
                    task.id,
                    now,
                    task.title,
                    task.description,
                    task.due_date,
                    task.completed
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            select_one(tx, task.id)
        })
    }

    #[instrument(skip(self))]
    fn delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        self.db.with_tx(|tx| {
            tx.execute("DELETE FROM task WHERE id = ?1", [id])?;
            Ok(())
        })
    }
}

fn select_one(conn: &Connection, id: i64) -> Result<Option<Task>, StoreError> {
    let task = conn
        .query_row(&format!("{SELECT_COLUMNS} WHERE id = ?1"), [id], task_from_row)
        .optional()?;
    Ok(task)
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        created: row.get(1)?,
        last_upd: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        due_date: row.get(5)?,
        completed: row.get(6)?,
    })
}

// Tasks carry local wall-clock times, like their due dates.
fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
