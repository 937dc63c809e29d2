use actix_web::{web, HttpResponse};
use diesel::{QueryResult, SqliteConnection};

use super::dtos::response::{created, ok, ok_empty};
use super::dtos::todo::{ClearCompletedDTO, ListTodosQuery, TodoTitleDTO};
use super::errors::TodoApiError;
use crate::models::todo_model::{self, TodoFilter};
use crate::models::Pool;

/// Run one store operation on a pooled connection off the async workers.
/// The connection goes back to the pool when the closure returns.
async fn with_connection<T, F>(pool: web::Data<Pool>, op: F) -> Result<T, TodoApiError>
where
    F: FnOnce(&SqliteConnection) -> QueryResult<T> + Send + 'static,
    T: Send + 'static,
{
    web::block(move || -> Result<T, TodoApiError> {
        let conn = pool.get()?;

        Ok(op(&*conn)?)
    })
    .await?
}

/// List todos, optionally only completed or uncompleted ones
pub async fn get_todos(
    query: web::Query<ListTodosQuery>,
    pool: web::Data<Pool>,
) -> Result<HttpResponse, TodoApiError> {
    let filter = TodoFilter::from_query(query.filter.as_deref());

    let list = with_connection(pool, move |conn| todo_model::list_todos(conn, filter)).await?;

    log::info!(
        "Listed todos | filter: {} | count: {}",
        filter.as_str(),
        list.len()
    );

    Ok(ok("Todos fetched", list))
}

/// Totals of all, completed and uncompleted todos
pub async fn get_todo_stats(pool: web::Data<Pool>) -> Result<HttpResponse, TodoApiError> {
    let stats = with_connection(pool, todo_model::todo_stats).await?;

    Ok(ok("Stats fetched", stats))
}

/// Create a new todo
pub async fn create_todo(
    request_data: web::Json<TodoTitleDTO>,
    pool: web::Data<Pool>,
) -> Result<HttpResponse, TodoApiError> {
    let title = request_data.into_inner().into_title()?;

    let inserted =
        with_connection(pool, move |conn| todo_model::insert_todo(conn, &title)).await?;

    log::info!("Todo created | id: {}", inserted.id);

    Ok(created("Todo created", inserted))
}

/// Flip a todo between completed and uncompleted
pub async fn toggle_todo(
    todo_id: web::Path<i64>,
    pool: web::Data<Pool>,
) -> Result<HttpResponse, TodoApiError> {
    let todo_id = todo_id.into_inner();

    let updated =
        with_connection(pool, move |conn| todo_model::toggle_todo(conn, todo_id)).await?;

    log::info!(
        "Todo toggled | id: {} | completed: {}",
        updated.id,
        updated.completed
    );

    Ok(ok("Todo status updated", updated))
}

/// Change the title of a todo
pub async fn edit_todo(
    todo_id: web::Path<i64>,
    request_data: web::Json<TodoTitleDTO>,
    pool: web::Data<Pool>,
) -> Result<HttpResponse, TodoApiError> {
    let todo_id = todo_id.into_inner();
    let title = request_data.into_inner().into_title()?;

    let updated = with_connection(pool, move |conn| {
        todo_model::update_todo_title(conn, todo_id, &title)
    })
    .await?;

    log::info!("Todo edited | id: {}", updated.id);

    Ok(ok("Todo updated", updated))
}

/// Api to Delete a TODO
pub async fn delete_todo(
    todo_id: web::Path<i64>,
    pool: web::Data<Pool>,
) -> Result<HttpResponse, TodoApiError> {
    let todo_id = todo_id.into_inner();

    with_connection(pool, move |conn| todo_model::delete_todo(conn, todo_id)).await?;

    log::info!("Todo deleted | id: {}", todo_id);

    Ok(ok_empty("Todo deleted"))
}

/// Remove all completed todos at once
pub async fn clear_completed(pool: web::Data<Pool>) -> Result<HttpResponse, TodoApiError> {
    let deleted_count = with_connection(pool, todo_model::clear_completed).await?;

    log::info!("Cleared completed todos | count: {}", deleted_count);

    Ok(ok(
        format!("Deleted {} completed todos", deleted_count),
        ClearCompletedDTO { deleted_count },
    ))
}
