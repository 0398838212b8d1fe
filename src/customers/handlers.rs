use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{error::AppError, state::AppState};

use super::dto::CustomerRequest;
use super::repo_types::Customer;
use super::services;

fn path_param<T>(path: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    path.map(|Path(v)| v)
        .map_err(|e| AppError::Validation(e.body_text()))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route("/customers/count", get(count_customers))
        .route("/customers/nic/:nic", get(get_customer_by_nic))
        .route(
            "/customers/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

#[instrument(skip(state))]
pub async fn list_customers(State(state): State<AppState>) -> Result<Json<Vec<Customer>>, AppError> {
    let customers = services::list_customers(state.store.as_ref()).await?;
    Ok(Json(customers))
}

#[instrument(skip(state, path))]
pub async fn get_customer(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Customer>, AppError> {
    let id = path_param(path)?;
    Ok(Json(services::get_customer(state.store.as_ref(), id).await?))
}

#[instrument(skip(state, path))]
pub async fn get_customer_by_nic(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Customer>, AppError> {
    let nic = path_param(path)?;
    Ok(Json(services::get_customer_by_nic(state.store.as_ref(), &nic).await?))
}

/// POST /customers { name, nicNumber, dateOfBirth }
#[instrument(skip(state, payload))]
pub async fn create_customer(
    State(state): State<AppState>,
    payload: Result<Json<CustomerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let input = body.validate()?;

    let customer = services::create_customer(state.store.as_ref(), input).await?;
    let location = format!("/api/customers/{}", customer.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(customer)))
}

#[instrument(skip(state, path, payload))]
pub async fn update_customer(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CustomerRequest>, JsonRejection>,
) -> Result<Json<Customer>, AppError> {
    let id = path_param(path)?;
    let Json(body) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let input = body.validate()?;

    Ok(Json(services::update_customer(state.store.as_ref(), id, input).await?))
}

#[instrument(skip(state, path))]
pub async fn delete_customer(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = path_param(path)?;
    services::delete_customer(state.store.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn count_customers(State(state): State<AppState>) -> Result<Json<i64>, AppError> {
    Ok(Json(services::count_customers(state.store.as_ref()).await?))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, Response},
    };
    use serde_json::{json, Value};
    use time::{format_description::well_known::Rfc3339, OffsetDateTime};
    use tower::ServiceExt;

    use super::*;
    use crate::app::build_app;

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response<Body> {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        app.clone().oneshot(req.body(body).unwrap()).await.unwrap()
    }

    async fn json_body(res: Response<Body>) -> Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn timestamp(v: &Value) -> OffsetDateTime {
        OffsetDateTime::parse(v.as_str().unwrap(), &Rfc3339).unwrap()
    }

    #[tokio::test]
    async fn customer_lifecycle_scenario() {
        let app = build_app(AppState::fake());

        let res = send(
            &app,
            "POST",
            "/api/customers",
            Some(json!({"name": "Alice", "nicNumber": "NIC001", "dateOfBirth": "1990-01-01"})),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.headers()[header::LOCATION], "/api/customers/1");
        let created = json_body(res).await;
        assert_eq!(created["id"], 1);
        assert_eq!(created["dateOfBirth"], "1990-01-01");
        assert_eq!(created["createdAt"], created["updatedAt"]);

        let res = send(
            &app,
            "POST",
            "/api/customers",
            Some(json!({"name": "Bob", "nicNumber": "NIC001", "dateOfBirth": "1985-05-05"})),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let res = send(
            &app,
            "PUT",
            "/api/customers/1",
            Some(json!({"name": "Alice B.", "nicNumber": "NIC001", "dateOfBirth": "1990-01-01"})),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let updated = json_body(res).await;
        assert_eq!(updated["name"], "Alice B.");
        assert_eq!(updated["createdAt"], created["createdAt"]);
        assert!(timestamp(&updated["updatedAt"]) >= timestamp(&created["updatedAt"]));

        let res = send(&app, "DELETE", "/api/customers/1", None).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let res = send(&app, "GET", "/api/customers/1", None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_count_and_lookup_by_nic() {
        let app = build_app(AppState::fake());
        for (name, nic) in [("Alice", "NIC001"), ("Bob", "NIC002")] {
            let res = send(
                &app,
                "POST",
                "/api/customers",
                Some(json!({"name": name, "nicNumber": nic, "dateOfBirth": "1990-01-01"})),
            )
            .await;
            assert_eq!(res.status(), StatusCode::CREATED);
        }

        let res = send(&app, "GET", "/api/customers", None).await;
        assert_eq!(res.status(), StatusCode::OK);
        let list = json_body(res).await;
        assert_eq!(list.as_array().map(Vec::len), Some(2));

        let res = send(&app, "GET", "/api/customers/count", None).await;
        assert_eq!(json_body(res).await, json!(2));

        let res = send(&app, "GET", "/api/customers/nic/NIC002", None).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["name"], "Bob");

        let res = send(&app, "GET", "/api/customers/nic/NIC999", None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_bodies_are_bad_requests() {
        let app = build_app(AppState::fake());

        let res = send(
            &app,
            "POST",
            "/api/customers",
            Some(json!({"name": "", "nicNumber": "NIC001", "dateOfBirth": "1990-01-01"})),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = send(
            &app,
            "POST",
            "/api/customers",
            Some(json!({"name": "Alice", "nicNumber": "NIC001"})),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let req = Request::builder()
            .method("POST")
            .uri("/api/customers")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = send(&app, "GET", "/api/customers/count", None).await;
        assert_eq!(json_body(res).await, json!(0));
    }

    #[tokio::test]
    async fn update_and_delete_unknown_ids_are_not_found() {
        let app = build_app(AppState::fake());
        let res = send(
            &app,
            "PUT",
            "/api/customers/7",
            Some(json!({"name": "Ghost", "nicNumber": "NIC404", "dateOfBirth": "1990-01-01"})),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = send(&app, "DELETE", "/api/customers/7", None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_ids_are_bad_requests_without_detail() {
        let app = build_app(AppState::fake());
        for (method, uri) in [
            ("GET", "/api/customers/abc"),
            ("GET", "/api/customers/99999999999999999999"),
            ("DELETE", "/api/customers/abc"),
        ] {
            let res = send(&app, method, uri, None).await;
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{method} {uri}");
            let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
            assert!(bytes.is_empty(), "{method} {uri} leaked {bytes:?}");
        }

        let res = send(
            &app,
            "PUT",
            "/api/customers/abc",
            Some(json!({"name": "Alice", "nicNumber": "NIC001", "dateOfBirth": "1990-01-01"})),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = build_app(AppState::fake());
        let res = send(&app, "GET", "/api/health", None).await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}
