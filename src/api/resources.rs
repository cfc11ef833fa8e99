// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Generic CRUD handlers shared by every portfolio resource.
//!
//! Each resource type is mounted at `/v1/{collection}` by
//! [`resource_routes`]; the handlers are the same code instantiated per
//! type, so status codes and ownership rules cannot differ between them.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, MethodRouter},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{
    openapi::{
        path::{HttpMethod, Operation, OperationBuilder, ParameterBuilder, ParameterIn, PathItemBuilder},
        request_body::RequestBodyBuilder,
        schema::{Array, Object, Type},
        security::SecurityRequirement,
        Content, OpenApi, Ref, RefOr, Required, ResponseBuilder, Schema,
    },
    IntoParams, ToSchema,
};

use crate::{
    auth::Auth,
    error::ApiError,
    state::AppState,
    storage::{Record, Resource},
};

/// Query parameters for list endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Maximum number of records to return
    #[serde(default, alias = "limits")]
    pub limit: Option<usize>,
}

/// Body returned by create and update.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MutationResponse {
    pub message: String,
    pub id: String,
}

/// Mount the five CRUD routes of `R` onto `router`.
///
/// The collection path is served with and without a trailing slash.
pub fn resource_routes<R: Resource>(router: Router<AppState>) -> Router<AppState> {
    let base = format!("/{}", R::COLLECTION);
    let collection: MethodRouter<AppState> = get(list::<R>).post(create::<R>);
    let item: MethodRouter<AppState> = get(fetch::<R>).patch(update::<R>).delete(remove::<R>);

    router
        .route(&base, collection.clone())
        .route(&format!("{base}/"), collection)
        .route(&format!("{base}/{{id}}"), item)
}

/// Add the CRUD paths of `R` to an OpenAPI document.
pub fn document_resource<R: Resource + ToSchema>(openapi: &mut OpenApi) {
    let schema = <R as ToSchema>::name();
    let record = || -> RefOr<Schema> { Ref::from_schema_name(schema.clone()).into() };
    let json = |body: RefOr<Schema>| Content::new(Some(body));
    let mutation = || {
        RefOr::T(
            ResponseBuilder::new()
                .description(format!("{} written", R::LABEL))
                .content("application/json", json(RefOr::from(Ref::from_schema_name("MutationResponse"))))
                .build(),
        )
    };
    let operation = |verb: &str, summary: String| {
        OperationBuilder::new()
            .tag(R::LABEL)
            .operation_id(Some(format!("{verb}_{}", R::COLLECTION)))
            .summary(Some(summary))
            .security(SecurityRequirement::new("bearer", Vec::<String>::new()))
            .response("401", RefOr::T(ResponseBuilder::new().description("Missing or invalid token").build()))
    };
    let body = || {
        Some(
            RequestBodyBuilder::new()
                .required(Some(Required::True))
                .content("application/json", json(record()))
                .build(),
        )
    };

    let list: Operation = operation("list", format!("List the caller's {}", R::COLLECTION))
        .parameters(Some(ListQuery::into_params(|| Some(ParameterIn::Query))))
        .response(
            "200",
            RefOr::T(
                ResponseBuilder::new()
                    .description(format!("{} owned by the caller", R::COLLECTION))
                    .content("application/json", json(RefOr::T(Schema::Array(Array::new(record())))))
                    .build(),
            ),
        )
        .response("400", RefOr::T(ResponseBuilder::new().description("Invalid query").build()))
        .build();
    let create: Operation = operation("create", format!("Create a {}", R::LABEL))
        .request_body(body())
        .response("201", mutation())
        .response("400", RefOr::T(ResponseBuilder::new().description("Invalid payload").build()))
        .response("409", RefOr::T(ResponseBuilder::new().description("Duplicate record").build()))
        .build();

    let id = || {
        ParameterBuilder::new()
            .name("id")
            .parameter_in(ParameterIn::Path)
            .required(Required::True)
            .schema(Some(RefOr::T(Schema::Object(Object::with_type(Type::String)))))
            .build()
    };
    let fetch: Operation = operation("get", format!("Get a {}", R::LABEL))
        .parameter(id())
        .response(
            "200",
            RefOr::T(
                ResponseBuilder::new()
                    .description(format!("The {}", R::LABEL))
                    .content("application/json", json(record()))
                    .build(),
            ),
        )
        .response("403", RefOr::T(ResponseBuilder::new().description("Owned by another user").build()))
        .response("404", RefOr::T(ResponseBuilder::new().description("No such record").build()))
        .build();
    let update: Operation = operation("update", format!("Update a {}", R::LABEL))
        .parameter(id())
        .request_body(body())
        .response("200", mutation())
        .response("403", RefOr::T(ResponseBuilder::new().description("Owned by another user").build()))
        .response("404", RefOr::T(ResponseBuilder::new().description("No such record").build()))
        .build();
    let remove: Operation = operation("delete", format!("Delete a {}", R::LABEL))
        .parameter(id())
        .response("204", RefOr::T(ResponseBuilder::new().description("Deleted").build()))
        .response("403", RefOr::T(ResponseBuilder::new().description("Owned by another user").build()))
        .response("404", RefOr::T(ResponseBuilder::new().description("No such record").build()))
        .build();

    let paths = &mut openapi.paths.paths;
    paths.insert(
        format!("/v1/{}", R::COLLECTION),
        PathItemBuilder::new()
            .operation(HttpMethod::Get, list)
            .operation(HttpMethod::Post, create)
            .build(),
    );
    paths.insert(
        format!("/v1/{}/{{id}}", R::COLLECTION),
        PathItemBuilder::new()
            .operation(HttpMethod::Get, fetch)
            .operation(HttpMethod::Patch, update)
            .operation(HttpMethod::Delete, remove)
            .build(),
    );
}

pub async fn create<R: Resource>(
    State(state): State<AppState>,
    Auth(principal): Auth,
    payload: Result<Json<R>, JsonRejection>,
) -> Result<(StatusCode, Json<MutationResponse>), ApiError> {
    let Json(data) = payload?;
    let record = state.repository::<R>().create(&principal, data)?;

    Ok((
        StatusCode::CREATED,
        Json(MutationResponse {
            message: format!("{} created successfully", R::LABEL),
            id: record.id,
        }),
    ))
}

pub async fn list<R: Resource>(
    State(state): State<AppState>,
    Auth(principal): Auth,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Record<R>>>, ApiError> {
    let Query(query) = query?;
    let records = state.repository::<R>().list(&principal, query.limit)?;
    Ok(Json(records))
}

pub async fn fetch<R: Resource>(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(id): Path<String>,
) -> Result<Json<Record<R>>, ApiError> {
    let record = state.repository::<R>().get(&principal, &id)?;
    Ok(Json(record))
}

pub async fn update<R: Resource>(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(id): Path<String>,
    patch: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<MutationResponse>, ApiError> {
    let Json(patch) = patch?;
    let record = state.repository::<R>().update(&principal, &id, &patch)?;

    Ok(Json(MutationResponse {
        message: format!("{} updated successfully", R::LABEL),
        id: record.id,
    }))
}

pub async fn remove<R: Resource>(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.repository::<R>().delete(&principal, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::state::test_state;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request},
        response::Response,
    };
    use serde_json::json;
    use tower::ServiceExt;

    async fn token_for(state: &AppState, username: &str) -> String {
        let hash = state.gate().hasher().hash("s3cret!!").unwrap();
        let principal = state
            .principals()
            .create(username, &format!("{username}@example.com"), hash)
            .unwrap();
        state.gate().issue_token(&principal).unwrap()
    }

    async fn send(state: &AppState, method: &str, uri: &str, token: &str, body: Option<Value>) -> Response {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"));
        let body = match body {
            Some(body) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };
        router(state.clone(), None)
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn create_then_fetch_skill() {
        let (state, _dir) = test_state();
        let token = token_for(&state, "alice").await;

        let response = send(&state, "POST", "/v1/skills/", &token, Some(json!({"name": "Go"}))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        assert_eq!(created["message"], "Skill created successfully");
        let id = created["id"].as_str().unwrap().to_string();

        let response = send(&state, "GET", &format!("/v1/skills/{id}"), &token, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let record = json_body(response).await;
        assert_eq!(record["name"], "Go");
        assert_eq!(record["owner"], "alice");
        assert_eq!(record["id"], id.as_str());
    }

    #[tokio::test]
    async fn requests_without_token_are_401() {
        let (state, _dir) = test_state();
        let response = router(state, None)
            .oneshot(Request::get("/v1/skills").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");
    }

    #[tokio::test]
    async fn duplicate_create_is_409() {
        let (state, _dir) = test_state();
        let token = token_for(&state, "alice").await;

        let first = send(&state, "POST", "/v1/interests", &token, Some(json!({"name": "Chess"}))).await;
        assert_eq!(first.status(), StatusCode::CREATED);
        let second = send(&state, "POST", "/v1/interests", &token, Some(json!({"name": "Chess"}))).await;
        assert_eq!(second.status(), StatusCode::CONFLICT);

        let listed = json_body(send(&state, "GET", "/v1/interests", &token, None).await).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_payloads_are_400() {
        let (state, _dir) = test_state();
        let token = token_for(&state, "alice").await;

        let missing_field = send(&state, "POST", "/v1/references", &token, Some(json!({"name": "Bob"}))).await;
        assert_eq!(missing_field.status(), StatusCode::BAD_REQUEST);

        let bad_email = send(
            &state,
            "POST",
            "/v1/references",
            &token,
            Some(json!({"name": "Bob", "email": "not-an-email"})),
        )
        .await;
        assert_eq!(bad_email.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(bad_email).await["detail"]
            .as_str()
            .unwrap()
            .contains("e-mail"));
    }

    #[tokio::test]
    async fn malformed_id_is_400_and_unknown_id_is_404() {
        let (state, _dir) = test_state();
        let token = token_for(&state, "alice").await;

        let malformed = send(&state, "GET", "/v1/awards/not-an-id", &token, None).await;
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(malformed).await["detail"], "Invalid object ID.");

        let unknown = uuid::Uuid::new_v4();
        let missing = send(&state, "GET", &format!("/v1/awards/{unknown}"), &token, None).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn other_owner_gets_403_everywhere() {
        let (state, _dir) = test_state();
        let alice = token_for(&state, "alice").await;
        let bob = token_for(&state, "bobby").await;

        let created = json_body(
            send(&state, "POST", "/v1/skills", &alice, Some(json!({"name": "Rust"}))).await,
        )
        .await;
        let uri = format!("/v1/skills/{}", created["id"].as_str().unwrap());

        assert_eq!(send(&state, "GET", &uri, &bob, None).await.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            send(&state, "PATCH", &uri, &bob, Some(json!({"level": "Expert"}))).await.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(send(&state, "DELETE", &uri, &bob, None).await.status(), StatusCode::FORBIDDEN);

        let listed = json_body(send(&state, "GET", "/v1/skills", &bob, None).await).await;
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn patch_merges_and_reports_id() {
        let (state, _dir) = test_state();
        let token = token_for(&state, "alice").await;

        let created = json_body(
            send(
                &state,
                "POST",
                "/v1/skills",
                &token,
                Some(json!({"name": "Rust", "level": "Intermediate", "keywords": ["async"]})),
            )
            .await,
        )
        .await;
        let id = created["id"].as_str().unwrap();
        let uri = format!("/v1/skills/{id}");

        let response = send(&state, "PATCH", &uri, &token, Some(json!({"level": "Advanced", "owner": "bobby"}))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Skill updated successfully");
        assert_eq!(body["id"], id);

        let record = json_body(send(&state, "GET", &uri, &token, None).await).await;
        assert_eq!(record["level"], "Advanced");
        assert_eq!(record["keywords"], json!(["async"]));
        assert_eq!(record["owner"], "alice");
    }

    #[tokio::test]
    async fn patch_with_non_object_body_is_400() {
        let (state, _dir) = test_state();
        let token = token_for(&state, "alice").await;
        let created = json_body(
            send(&state, "POST", "/v1/skills", &token, Some(json!({"name": "Rust"}))).await,
        )
        .await;
        let uri = format!("/v1/skills/{}", created["id"].as_str().unwrap());

        let response = send(&state, "PATCH", &uri, &token, Some(json!(["level"]))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_is_204_then_404() {
        let (state, _dir) = test_state();
        let token = token_for(&state, "alice").await;
        let created = json_body(
            send(&state, "POST", "/v1/skills", &token, Some(json!({"name": "Rust"}))).await,
        )
        .await;
        let uri = format!("/v1/skills/{}", created["id"].as_str().unwrap());

        assert_eq!(send(&state, "DELETE", &uri, &token, None).await.status(), StatusCode::NO_CONTENT);
        assert_eq!(send(&state, "DELETE", &uri, &token, None).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(send(&state, "GET", &uri, &token, None).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn projects_list_is_capped_unless_limit_given() {
        let (state, _dir) = test_state();
        let token = token_for(&state, "alice").await;
        for i in 0..12 {
            let response = send(
                &state,
                "POST",
                "/v1/projects",
                &token,
                Some(json!({"name": format!("project-{i}")})),
            )
            .await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let default = json_body(send(&state, "GET", "/v1/projects", &token, None).await).await;
        assert_eq!(default.as_array().unwrap().len(), 10);

        let wider = json_body(send(&state, "GET", "/v1/projects?limits=20", &token, None).await).await;
        assert_eq!(wider.as_array().unwrap().len(), 12);

        let narrow = json_body(send(&state, "GET", "/v1/projects?limit=3", &token, None).await).await;
        assert_eq!(narrow.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn non_numeric_limit_is_a_json_400() {
        let (state, _dir) = test_state();
        let token = token_for(&state, "alice").await;

        let response = send(&state, "GET", "/v1/skills?limit=abc", &token, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let body = json_body(response).await;
        assert!(body["detail"].as_str().unwrap().contains("query string"));
    }

    #[tokio::test]
    async fn every_resource_collection_is_mounted() {
        let (state, _dir) = test_state();
        let token = token_for(&state, "alice").await;

        for collection in [
            "awards",
            "basicinfo",
            "certifications",
            "educations",
            "experiences",
            "interests",
            "projects",
            "publications",
            "references",
            "skills",
        ] {
            let response = send(&state, "GET", &format!("/v1/{collection}"), &token, None).await;
            assert_eq!(response.status(), StatusCode::OK, "{collection}");
            assert_eq!(json_body(response).await, json!([]), "{collection}");
        }
    }
}
