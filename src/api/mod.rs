// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{
        permissions::{DELETE_DRINKS, GET_DRINKS_DETAIL, PATCH_DRINKS, POST_DRINKS},
        require_permission,
    },
    error::{not_found_fallback, ErrorBody},
    models::{
        CreateDrinkRequest, DeleteDrinkResponse, Drink, DrinkSummariesResponse, DrinkSummary,
        DrinksResponse, RecipeInput, RecipePart, RecipeSummary, UpdateDrinkRequest,
    },
    state::AppState,
};

pub mod drinks;
pub mod health;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route(
            "/drinks",
            get(drinks::list_drinks).merge(require_permission(
                state.guard(POST_DRINKS),
                post(drinks::create_drink),
            )),
        )
        .route(
            "/drinks-detail",
            require_permission(state.guard(GET_DRINKS_DETAIL), get(drinks::get_drinks_detail)),
        )
        .route(
            "/drinks/{id}",
            require_permission(state.guard(PATCH_DRINKS), patch(drinks::update_drink)).merge(
                require_permission(state.guard(DELETE_DRINKS), delete(drinks::delete_drink)),
            ),
        )
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(not_found_fallback)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        drinks::list_drinks,
        drinks::get_drinks_detail,
        drinks::create_drink,
        drinks::update_drink,
        drinks::delete_drink,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            Drink,
            DrinkSummary,
            RecipePart,
            RecipeSummary,
            RecipeInput,
            CreateDrinkRequest,
            UpdateDrinkRequest,
            DrinksResponse,
            DrinkSummariesResponse,
            DeleteDrinkResponse,
            ErrorBody
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "Drinks", description = "Coffee shop menu"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
