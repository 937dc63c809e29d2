use crate::schema::*;
use diesel::prelude::*;
use diesel::result::Error as DBError;
use diesel::{Insertable, Queryable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[table_name = "todos"]
pub struct NewTodo<'a> {
    pub title: &'a str,
    pub completed: bool,
    pub created_at: chrono::NaiveDateTime,
}

impl<'a> NewTodo<'a> {
    pub fn from_title(title: &'a str) -> Self {
        Self {
            title,
            completed: false,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Which todos a listing returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoFilter {
    All,
    Completed,
    Uncompleted,
}

impl TodoFilter {
    /// Anything other than `completed` or `uncompleted` lists everything
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("completed") => TodoFilter::Completed,
            Some("uncompleted") => TodoFilter::Uncompleted,
            _ => TodoFilter::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TodoFilter::All => "all",
            TodoFilter::Completed => "completed",
            TodoFilter::Uncompleted => "uncompleted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoStats {
    pub total: i64,
    pub completed: i64,
    pub uncompleted: i64,
}

/// List todos, newest first
pub fn list_todos(conn: &SqliteConnection, filter: TodoFilter) -> QueryResult<Vec<Todo>> {
    use crate::schema::todos::dsl::*;

    let mut query: crate::schema::todos::BoxedQuery<'_, diesel::sqlite::Sqlite> =
        todos.into_boxed();

    match filter {
        TodoFilter::Completed => query = query.filter(completed.eq(true)),
        TodoFilter::Uncompleted => query = query.filter(completed.eq(false)),
        TodoFilter::All => {}
    }

    query.order((created_at.desc(), id.desc())).load::<Todo>(conn)
}

/// Count all todos and the completed ones from one snapshot
pub fn todo_stats(conn: &SqliteConnection) -> QueryResult<TodoStats> {
    use crate::schema::todos::dsl::*;

    conn.transaction(|| {
        let total: i64 = todos.count().get_result(conn)?;
        let done: i64 = todos.filter(completed.eq(true)).count().get_result(conn)?;

        Ok(TodoStats {
            total,
            completed: done,
            uncompleted: total - done,
        })
    })
}

/// Insert a todo and read back the stored row
pub fn insert_todo(conn: &SqliteConnection, new_title: &str) -> QueryResult<Todo> {
    use crate::schema::todos::dsl::*;

    let new_todo = NewTodo::from_title(new_title);

    // sqlite has no RETURNING here, the freshest id is ours while we hold the write lock
    conn.immediate_transaction(|| {
        diesel::insert_into(todos).values(&new_todo).execute(conn)?;

        todos.order(id.desc()).first::<Todo>(conn)
    })
}

/// Flip `completed` on a todo.
///
/// Writes take the lock up front with `BEGIN IMMEDIATE`, a deferred
/// transaction upgrading from a read lock gets SQLITE_BUSY without waiting.
pub fn toggle_todo(conn: &SqliteConnection, todo_id: i64) -> QueryResult<Todo> {
    use crate::schema::todos::dsl::*;

    conn.immediate_transaction(|| {
        let update_count = diesel::update(todos.find(todo_id))
            .set(completed.eq(diesel::dsl::not(completed)))
            .execute(conn)?;

        if update_count == 0 {
            return Err(DBError::NotFound);
        }

        todos.find(todo_id).first::<Todo>(conn)
    })
}

/// Replace the title of a todo
pub fn update_todo_title(
    conn: &SqliteConnection,
    todo_id: i64,
    new_title: &str,
) -> QueryResult<Todo> {
    use crate::schema::todos::dsl::*;

    conn.immediate_transaction(|| {
        let update_count = diesel::update(todos.find(todo_id))
            .set(title.eq(new_title))
            .execute(conn)?;

        if update_count == 0 {
            return Err(DBError::NotFound);
        }

        todos.find(todo_id).first::<Todo>(conn)
    })
}

/// Remove a todo
pub fn delete_todo(conn: &SqliteConnection, todo_id: i64) -> QueryResult<()> {
    use crate::schema::todos::dsl::*;

    let delete_count = diesel::delete(todos.find(todo_id)).execute(conn)?;

    if delete_count > 0 {
        Ok(())
    } else {
        Err(DBError::NotFound)
    }
}

/// Remove every completed todo, returning how many went away
pub fn clear_completed(conn: &SqliteConnection) -> QueryResult<usize> {
    use crate::schema::todos::dsl::*;

    diesel::delete(todos.filter(completed.eq(true))).execute(conn)
}
