// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the drinks API. All types derive
//! `ToSchema` for the OpenAPI document.
//!
//! A [`Drink`] has two public representations:
//!
//! - **short**: recipe parts reduced to color and proportion, for the public
//!   menu
//! - **long**: the full recipe including ingredient names, for staff

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Drink
// =============================================================================

/// One ingredient of a drink.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RecipePart {
    /// Ingredient name.
    pub name: String,
    /// Display color of the ingredient layer.
    pub color: String,
    /// Relative amount of this ingredient.
    pub parts: u32,
}

/// Ingredient as shown on the public menu (no name).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RecipeSummary {
    pub color: String,
    pub parts: u32,
}

/// A drink on the menu. Serializes as the long representation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Drink {
    /// Store-assigned identifier.
    pub id: u64,
    /// Unique drink name.
    pub title: String,
    /// Full recipe.
    pub recipe: Vec<RecipePart>,
}

/// Public menu representation of a drink.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DrinkSummary {
    pub id: u64,
    pub title: String,
    pub recipe: Vec<RecipeSummary>,
}

impl Drink {
    pub fn short(&self) -> DrinkSummary {
        DrinkSummary {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|part| RecipeSummary {
                    color: part.color.clone(),
                    parts: part.parts,
                })
                .collect(),
        }
    }

    pub fn long(&self) -> Drink {
        self.clone()
    }
}

// =============================================================================
// Requests
// =============================================================================

/// A recipe in a request body: a single part or a list of parts.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<RecipePart>),
    One(RecipePart),
}

impl RecipeInput {
    /// Normalize to a list of parts.
    pub fn into_parts(self) -> Vec<RecipePart> {
        match self {
            RecipeInput::Many(parts) => parts,
            RecipeInput::One(part) => vec![part],
        }
    }
}

/// Request to add a drink to the menu.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateDrinkRequest {
    /// Unique drink name (required, non-empty).
    #[serde(default)]
    pub title: Option<String>,
    /// Recipe (required, non-empty).
    #[serde(default)]
    pub recipe: Option<RecipeInput>,
}

/// Partial update of a drink. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateDrinkRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub recipe: Option<RecipeInput>,
}

// =============================================================================
// Responses
// =============================================================================

/// `GET /drinks` response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DrinkSummariesResponse {
    pub success: bool,
    pub drinks: Vec<DrinkSummary>,
}

/// Response carrying long drink representations.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DrinksResponse {
    pub success: bool,
    pub drinks: Vec<Drink>,
}

/// `DELETE /drinks/{id}` response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteDrinkResponse {
    pub success: bool,
    /// Identifier of the deleted drink.
    pub delete: u64,
}
