// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};

use crate::{
    auth::ClaimSet,
    error::{ApiError, ErrorBody},
    models::{
        CreateDrinkRequest, DeleteDrinkResponse, DrinkSummariesResponse, DrinksResponse,
        UpdateDrinkRequest,
    },
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/drinks",
    tag = "Drinks",
    responses((status = 200, body = DrinkSummariesResponse))
)]
pub async fn list_drinks(State(state): State<AppState>) -> Json<DrinkSummariesResponse> {
    let store = state.store.read().await;
    Json(DrinkSummariesResponse {
        success: true,
        drinks: store.list_drinks().iter().map(|drink| drink.short()).collect(),
    })
}

#[utoipa::path(
    get,
    path = "/drinks-detail",
    tag = "Drinks",
    security(("bearer_auth" = ["get:drinks-detail"])),
    responses(
        (status = 200, body = DrinksResponse),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody)
    )
)]
pub async fn get_drinks_detail(
    Extension(claims): Extension<ClaimSet>,
    State(state): State<AppState>,
) -> Json<DrinksResponse> {
    tracing::debug!(sub = %claims.sub, "listing drink details");
    let store = state.store.read().await;
    Json(DrinksResponse {
        success: true,
        drinks: store.list_drinks().iter().map(|drink| drink.long()).collect(),
    })
}

#[utoipa::path(
    post,
    path = "/drinks",
    request_body = CreateDrinkRequest,
    tag = "Drinks",
    security(("bearer_auth" = ["post:drinks"])),
    responses(
        (status = 200, body = DrinksResponse),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody),
        (status = 422, body = ErrorBody)
    )
)]
pub async fn create_drink(
    Extension(claims): Extension<ClaimSet>,
    State(state): State<AppState>,
    payload: Result<Json<CreateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse>, ApiError> {
    let Json(request) = payload.map_err(|_| ApiError::unprocessable())?;

    let title = request.title.filter(|t| !t.is_empty());
    let recipe = request.recipe.map(|r| r.into_parts()).filter(|r| !r.is_empty());
    let (Some(title), Some(recipe)) = (title, recipe) else {
        return Err(ApiError::unprocessable());
    };

    let drink = state.store.write().await.insert_drink(title, recipe)?;
    tracing::info!(sub = %claims.sub, drink_id = drink.id, "drink created");

    Ok(Json(DrinksResponse {
        success: true,
        drinks: vec![drink.long()],
    }))
}

#[utoipa::path(
    patch,
    path = "/drinks/{id}",
    params(("id" = u64, Path, description = "Identifier of the drink to update")),
    request_body = UpdateDrinkRequest,
    tag = "Drinks",
    security(("bearer_auth" = ["patch:drinks"])),
    responses(
        (status = 200, body = DrinksResponse),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody),
        (status = 422, body = ErrorBody)
    )
)]
pub async fn update_drink(
    Extension(claims): Extension<ClaimSet>,
    id: Result<Path<u64>, PathRejection>,
    State(state): State<AppState>,
    payload: Result<Json<UpdateDrinkRequest>, JsonRejection>,
) -> Result<Json<DrinksResponse>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::not_found())?;
    let Json(request) = payload.map_err(|_| ApiError::unprocessable())?;

    let title = request.title.filter(|t| !t.is_empty());
    let recipe = request.recipe.map(|r| r.into_parts()).filter(|r| !r.is_empty());

    let drink = state.store.write().await.update_drink(id, title, recipe)?;
    tracing::info!(sub = %claims.sub, drink_id = drink.id, "drink updated");

    Ok(Json(DrinksResponse {
        success: true,
        drinks: vec![drink.long()],
    }))
}

#[utoipa::path(
    delete,
    path = "/drinks/{id}",
    params(("id" = u64, Path, description = "Identifier of the drink to delete")),
    tag = "Drinks",
    security(("bearer_auth" = ["delete:drinks"])),
    responses(
        (status = 200, body = DeleteDrinkResponse),
        (status = 401, body = ErrorBody),
        (status = 403, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn delete_drink(
    Extension(claims): Extension<ClaimSet>,
    id: Result<Path<u64>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<DeleteDrinkResponse>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::not_found())?;
    state.store.write().await.delete_drink(id)?;
    tracing::info!(sub = %claims.sub, drink_id = id, "drink deleted");

    Ok(Json(DeleteDrinkResponse {
        success: true,
        delete: id,
    }))
}
