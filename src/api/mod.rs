// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    resources::{
        Award, BasicInfo, Certification, Education, Experience, Interest, Profile, Project,
        Publication, Reference, Skill,
    },
    state::AppState,
};

pub mod auth;
pub mod health;
pub mod middleware;
pub mod resources;
pub mod users;

use self::resources::{document_resource, resource_routes};

pub fn router(state: AppState, client_origin: Option<&str>) -> Router {
    let v1_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/users", post(users::register))
        .route("/users/", post(users::register))
        .route("/users/count", get(users::count_users))
        .route("/users/me", get(users::get_current_user))
        .route(
            "/users/{id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        );

    let mounts: [fn(Router<AppState>) -> Router<AppState>; 10] = [
        resource_routes::<Award>,
        resource_routes::<BasicInfo>,
        resource_routes::<Certification>,
        resource_routes::<Education>,
        resource_routes::<Experience>,
        resource_routes::<Interest>,
        resource_routes::<Project>,
        resource_routes::<Publication>,
        resource_routes::<Reference>,
        resource_routes::<Skill>,
    ];
    let v1_routes = mounts
        .into_iter()
        .fold(v1_routes, |router, mount| mount(router));

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/v1", v1_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(axum::middleware::from_fn(middleware::process_time))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(middleware::cors_layer(client_origin))
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Documents the generic CRUD routes of every resource collection.
struct ResourcePaths;

impl Modify for ResourcePaths {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let documents: [fn(&mut utoipa::openapi::OpenApi); 10] = [
            document_resource::<Award>,
            document_resource::<BasicInfo>,
            document_resource::<Certification>,
            document_resource::<Education>,
            document_resource::<Experience>,
            document_resource::<Interest>,
            document_resource::<Project>,
            document_resource::<Publication>,
            document_resource::<Reference>,
            document_resource::<Skill>,
        ];
        for document in documents {
            document(openapi);
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Portfolio API"),
    paths(
        health::root,
        health::health,
        health::liveness,
        health::readiness,
        auth::login,
        users::register,
        users::count_users,
        users::get_current_user,
        users::get_user,
        users::update_user,
        users::delete_user
    ),
    components(
        schemas(
            auth::LoginForm,
            auth::TokenResponse,
            users::RegisterRequest,
            users::UpdateUserRequest,
            users::UserResponse,
            users::CountResponse,
            resources::MutationResponse,
            Award,
            BasicInfo,
            Profile,
            Certification,
            Education,
            Experience,
            Interest,
            Project,
            Publication,
            Reference,
            Skill
        )
    ),
    modifiers(&BearerAuth, &ResourcePaths),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Auth", description = "Token issuance"),
        (name = "Users", description = "Registration and account management")
    )
)]
struct ApiDoc;
