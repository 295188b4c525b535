// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory drinks store.
//!
//! Drinks are kept in a `BTreeMap` keyed by id, so listings come back in
//! insertion order. Titles are unique across the menu.

use std::collections::BTreeMap;

use crate::error::ApiError;
use crate::models::{Drink, RecipePart};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    drinks: BTreeMap<u64, Drink>,
    next_id: u64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store reset to the seeded menu.
    pub fn seeded() -> Self {
        let mut store = Self::new();
        store.reset();
        store
    }

    /// Drop every drink and seed the menu with plain water.
    pub fn reset(&mut self) {
        let water = Drink {
            id: 1,
            title: "water".to_string(),
            recipe: vec![RecipePart {
                name: "water".to_string(),
                color: "blue".to_string(),
                parts: 1,
            }],
        };
        self.drinks = BTreeMap::from([(water.id, water)]);
        self.next_id = 1;
    }

    pub fn list_drinks(&self) -> Vec<Drink> {
        self.drinks.values().cloned().collect()
    }

    pub fn insert_drink(&mut self, title: String, recipe: Vec<RecipePart>) -> Result<Drink, ApiError> {
        if self.title_taken(&title, None) {
            return Err(ApiError::unprocessable());
        }

        self.next_id += 1;
        let drink = Drink {
            id: self.next_id,
            title,
            recipe,
        };
        self.drinks.insert(drink.id, drink.clone());
        Ok(drink)
    }

    pub fn update_drink(
        &mut self,
        id: u64,
        title: Option<String>,
        recipe: Option<Vec<RecipePart>>,
    ) -> Result<Drink, ApiError> {
        if !self.drinks.contains_key(&id) {
            return Err(ApiError::not_found());
        }
        if title.as_deref().is_some_and(|t| self.title_taken(t, Some(id))) {
            return Err(ApiError::unprocessable());
        }

        let drink = self.drinks.get_mut(&id).ok_or_else(ApiError::not_found)?;
        if let Some(title) = title {
            drink.title = title;
        }
        if let Some(recipe) = recipe {
            drink.recipe = recipe;
        }
        Ok(drink.clone())
    }

    pub fn delete_drink(&mut self, id: u64) -> Result<(), ApiError> {
        if self.drinks.remove(&id).is_some() {
            Ok(())
        } else {
            Err(ApiError::not_found())
        }
    }

    fn title_taken(&self, title: &str, except: Option<u64>) -> bool {
        self.drinks
            .values()
            .any(|drink| drink.title == title && Some(drink.id) != except)
    }
}
