use actix_web::{
    self,
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    guard, middleware, web, App, HttpRequest, HttpResponse, HttpServer,
};

use crate::{config::Config, models};

use super::{errors::TodoApiError, health_handler, todos_handler};

/// Register every `/api` route. Fixed paths come before `/todos/{id}`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        TodoApiError::BadRequest(format!("Invalid request body: {}", err)).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|_err, _req| {
        TodoApiError::BadRequest(String::from("Invalid Todo Id")).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        TodoApiError::BadRequest(format!("Invalid query string: {}", err)).into()
    }))
    .service(
        web::scope("/api")
            .route("/health", web::get().to(health_handler::health_check))
            .service(
                web::scope("/todos")
                    .route("", web::get().to(todos_handler::get_todos))
                    .route("", web::post().to(todos_handler::create_todo))
                    .route("/stats", web::get().to(todos_handler::get_todo_stats))
                    .route(
                        "/clear-completed",
                        web::delete().to(todos_handler::clear_completed),
                    )
                    .route("/{id}", web::delete().to(todos_handler::delete_todo))
                    .route("/{id}/toggle", web::put().to(todos_handler::toggle_todo))
                    .route("/{id}/edit", web::put().to(todos_handler::edit_todo)),
            ),
    );
}

/// Headers letting any origin call the api from a browser
fn cors_headers() -> middleware::DefaultHeaders {
    middleware::DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Headers", "Content-Type"))
        .add((
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, DELETE, OPTIONS",
        ))
}

async fn preflight() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

async fn not_found(req: HttpRequest) -> HttpResponse {
    TodoApiError::NotFound(format!("Route {}", req.path())).to_response()
}

/// The full application: state, routes, logging and CORS headers
pub fn build_app(
    pool: models::Pool,
    config: Config,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(pool))
        .app_data(web::Data::new(config))
        .wrap(cors_headers())
        .wrap(middleware::Logger::default())
        .service(
            web::resource("/{tail:.*}")
                .guard(guard::Options())
                .to(preflight),
        )
        .configure(configure)
        .default_service(web::to(not_found))
}

pub async fn start_server(
    config: Config,
    pool: models::Pool,
    workers: Option<usize>,
) -> std::io::Result<()> {
    let bind_address = config.bind_address();

    log::info!(
        "Starting server on {}:{} | platform: {} | store: {}",
        bind_address.0,
        bind_address.1,
        config.platform,
        config.db_path_display()
    );

    let mut server = HttpServer::new(move || build_app(pool.clone(), config.clone()));

    if let Some(workers) = workers {
        server = server.workers(workers); // Num of threads
    }

    server.bind(bind_address)?.run().await
}

#[cfg(test)]
mod tests {
    use actix_web::{http::Method, http::StatusCode, test};
    use serde_json::{json, Value};

    use super::*;
    use crate::api::dtos::response::ApiResponse;
    use crate::api::dtos::health::HealthDTO;
    use crate::api::dtos::todo::ClearCompletedDTO;
    use crate::models::todo_model::{Todo, TodoStats};

    fn test_config() -> Config {
        Config::resolve(|_| None)
    }

    macro_rules! test_app {
        () => {
            test::init_service(build_app(models::test_pool(), test_config())).await
        };
    }

    fn get(uri: &str) -> test::TestRequest {
        test::TestRequest::get().uri(uri)
    }

    fn put(uri: &str) -> test::TestRequest {
        test::TestRequest::put().uri(uri)
    }

    fn delete(uri: &str) -> test::TestRequest {
        test::TestRequest::delete().uri(uri)
    }

    fn post_todo(title: &str) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/todos")
            .set_json(json!({ "title": title }))
    }

    #[actix_web::test]
    async fn health_reports_configuration() {
        let app = test_app!();

        let resp = test::call_service(&app, get("/api/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: ApiResponse<HealthDTO> = test::read_body_json(resp).await;
        let data = body.data.unwrap();
        assert_eq!(body.code, 200);
        assert_eq!(data.port, 5000);
        assert_eq!(data.db_path, "./todos.db");
        assert_eq!(data.platform, "Local");
    }

    #[actix_web::test]
    async fn create_returns_201_with_new_todo() {
        let app = test_app!();

        let resp = test::call_service(&app, post_todo("buy milk").to_request()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: ApiResponse<Todo> = test::read_body_json(resp).await;
        let todo = body.data.unwrap();
        assert_eq!(body.code, 201);
        assert_eq!(todo.id, 1);
        assert_eq!(todo.title, "buy milk");
        assert!(!todo.completed);
    }

    #[actix_web::test]
    async fn create_with_blank_title_is_rejected_and_not_stored() {
        let app = test_app!();

        for body in [json!({ "title": "   " }), json!({ "title": "" }), json!({})] {
            let req = test::TestRequest::post()
                .uri("/api/todos")
                .set_json(body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

            let body: ApiResponse<Value> = test::read_body_json(resp).await;
            assert_eq!(body.code, 400);
            assert!(body.data.is_none());
        }

        let resp = test::call_service(&app, get("/api/todos/stats").to_request()).await;
        let body: ApiResponse<TodoStats> = test::read_body_json(resp).await;
        assert_eq!(body.data.unwrap().total, 0);
    }

    #[actix_web::test]
    async fn malformed_json_is_a_400_envelope() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/api/todos")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ApiResponse<Value> = test::read_body_json(resp).await;
        assert_eq!(body.code, 400);
    }

    #[actix_web::test]
    async fn unknown_ids_are_404() {
        let app = test_app!();

        let requests = vec![
            put("/api/todos/99/toggle").to_request(),
            test::TestRequest::put()
                .uri("/api/todos/99/edit")
                .set_json(json!({ "title": "x" }))
                .to_request(),
            delete("/api/todos/99").to_request(),
        ];

        for req in requests {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);

            let body: ApiResponse<Value> = test::read_body_json(resp).await;
            assert_eq!(body.code, 404);
            assert_eq!(body.msg, "Todo Not Found");
        }
    }

    #[actix_web::test]
    async fn edit_with_empty_title_is_400_not_404() {
        let app = test_app!();
        test::call_service(&app, post_todo("keep").to_request()).await;

        let req = test::TestRequest::put()
            .uri("/api/todos/1/edit")
            .set_json(json!({ "title": " " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::put()
            .uri("/api/todos/404/edit")
            .set_json(json!({ "title": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn non_numeric_id_is_400() {
        let app = test_app!();

        let resp = test::call_service(&app, put("/api/todos/abc/toggle").to_request()).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn list_filters_and_clear_completed() {
        let app = test_app!();

        for title in ["a", "b", "c"] {
            test::call_service(&app, post_todo(title).to_request()).await;
        }
        test::call_service(&app, put("/api/todos/1/toggle").to_request()).await;
        test::call_service(&app, put("/api/todos/3/toggle").to_request()).await;

        let resp = test::call_service(&app, get("/api/todos?filter=completed").to_request()).await;
        let body: ApiResponse<Vec<Todo>> = test::read_body_json(resp).await;
        let ids: Vec<i64> = body.data.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 1]);

        let resp = test::call_service(&app, get("/api/todos?filter=uncompleted").to_request()).await;
        let body: ApiResponse<Vec<Todo>> = test::read_body_json(resp).await;
        let ids: Vec<i64> = body.data.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2]);

        let resp = test::call_service(&app, get("/api/todos?filter=whatever").to_request()).await;
        let body: ApiResponse<Vec<Todo>> = test::read_body_json(resp).await;
        assert_eq!(body.data.unwrap().len(), 3);

        let resp = test::call_service(&app, delete("/api/todos/clear-completed").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: ApiResponse<ClearCompletedDTO> = test::read_body_json(resp).await;
        assert_eq!(body.data.unwrap().deleted_count, 2);

        let resp = test::call_service(&app, delete("/api/todos/clear-completed").to_request()).await;
        let body: ApiResponse<ClearCompletedDTO> = test::read_body_json(resp).await;
        assert_eq!(body.data.unwrap().deleted_count, 0);

        let resp = test::call_service(&app, get("/api/todos").to_request()).await;
        let body: ApiResponse<Vec<Todo>> = test::read_body_json(resp).await;
        let left = body.data.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].title, "b");
    }

    #[actix_web::test]
    async fn full_lifecycle() {
        let app = test_app!();

        let resp = test::call_service(&app, post_todo("buy milk").to_request()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: ApiResponse<Todo> = test::read_body_json(resp).await;
        let created = body.data.unwrap();
        assert_eq!(created.id, 1);
        assert!(!created.completed);

        let resp = test::call_service(&app, get("/api/todos").to_request()).await;
        let body: ApiResponse<Vec<Todo>> = test::read_body_json(resp).await;
        assert_eq!(body.data.unwrap(), vec![created.clone()]);

        let resp = test::call_service(&app, put("/api/todos/1/toggle").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: ApiResponse<Todo> = test::read_body_json(resp).await;
        assert!(body.data.unwrap().completed);

        let req = test::TestRequest::put()
            .uri("/api/todos/1/edit")
            .set_json(json!({ "title": "buy oat milk" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: ApiResponse<Todo> = test::read_body_json(resp).await;
        let edited = body.data.unwrap();
        assert_eq!(edited.title, "buy oat milk");
        assert!(edited.completed);
        assert_eq!(edited.created_at, created.created_at);

        let resp = test::call_service(&app, delete("/api/todos/1").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: ApiResponse<Value> = test::read_body_json(resp).await;
        assert_eq!(body.code, 200);
        assert!(body.data.is_none());

        let resp = test::call_service(&app, get("/api/todos").to_request()).await;
        let body: ApiResponse<Vec<Todo>> = test::read_body_json(resp).await;
        assert!(body.data.unwrap().is_empty());

        let resp = test::call_service(&app, get("/api/todos/stats").to_request()).await;
        let body: ApiResponse<TodoStats> = test::read_body_json(resp).await;
        assert_eq!(
            body.data.unwrap(),
            TodoStats {
                total: 0,
                completed: 0,
                uncompleted: 0
            }
        );
    }

    #[actix_web::test]
    async fn cors_headers_and_preflight() {
        let app = test_app!();

        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/api/todos")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );

        let resp = test::call_service(&app, get("/api/todos").to_request()).await;
        assert_eq!(
            resp.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
    }

    #[actix_web::test]
    async fn store_failure_is_a_500_envelope() {
        // no init_database, so the todos table is missing
        let pool = models::build_pool(":memory:", 1).unwrap();
        let app = test::init_service(build_app(pool, test_config())).await;

        for req in [
            get("/api/todos").to_request(),
            get("/api/todos/stats").to_request(),
            post_todo("lost").to_request(),
            put("/api/todos/1/toggle").to_request(),
        ] {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

            let body: ApiResponse<Value> = test::read_body_json(resp).await;
            assert_eq!(body.code, 500);
            assert_eq!(body.msg, "Internal Server Error");
            assert!(body.data.is_none());
        }
    }

    #[actix_web::test]
    async fn ids_beyond_32_bits_are_looked_up() {
        let app = test_app!();

        let uri = format!("/api/todos/{}/toggle", i64::from(i32::MAX) + 1);
        let resp = test::call_service(&app, put(&uri).to_request()).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn unknown_route_is_enveloped_404() {
        let app = test_app!();

        let resp = test::call_service(&app, get("/nope").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: ApiResponse<Value> = test::read_body_json(resp).await;
        assert_eq!(body.code, 404);
    }
}
