// Copyright 2023 Remi Bernotavicius

use crate::database;
use crate::database::models::{Favorite, Recipe, RecipeId, ShoppingCart, UserId};
use crate::database::schema::{favorites, ingredients, ingredients_in_recipe, recipes, shopping_carts};
use crate::error::Result;
use diesel::ExpressionMethods as _;
use diesel::JoinOnDsl as _;
use diesel::QueryDsl as _;
use diesel::RunQueryDsl as _;
use diesel::SelectableHelper as _;
use std::collections::BTreeMap;
use std::fmt;

pub fn add_favorite(
    conn: &mut database::Connection,
    user: UserId,
    recipe: RecipeId,
) -> Result<Favorite> {
    Ok(diesel::insert_into(favorites::table)
        .values((
            favorites::user_id.eq(user),
            favorites::recipe_id.eq(recipe),
            favorites::created.eq(super::now()),
        ))
        .returning(Favorite::as_returning())
        .get_result(conn)?)
}

pub fn remove_favorite(
    conn: &mut database::Connection,
    user: UserId,
    recipe: RecipeId,
) -> Result<bool> {
    let deleted = diesel::delete(
        favorites::table
            .filter(favorites::user_id.eq(user))
            .filter(favorites::recipe_id.eq(recipe)),
    )
    .execute(conn)?;
    Ok(deleted > 0)
}

pub fn is_favorited(conn: &mut database::Connection, user: UserId, recipe: RecipeId) -> Result<bool> {
    Ok(diesel::select(diesel::dsl::exists(
        favorites::table
            .filter(favorites::user_id.eq(user))
            .filter(favorites::recipe_id.eq(recipe)),
    ))
    .get_result(conn)?)
}

/// The user's favorite recipes, most recently favorited first.
pub fn favorites(conn: &mut database::Connection, user: UserId) -> Result<Vec<Recipe>> {
    Ok(recipes::table
        .inner_join(favorites::table)
        .filter(favorites::user_id.eq(user))
        .select(Recipe::as_select())
        .order((favorites::created.desc(), favorites::id.desc()))
        .load(conn)?)
}

pub fn add_to_shopping_cart(
    conn: &mut database::Connection,
    user: UserId,
    recipe: RecipeId,
) -> Result<ShoppingCart> {
    Ok(diesel::insert_into(shopping_carts::table)
        .values((
            shopping_carts::user_id.eq(user),
            shopping_carts::recipe_id.eq(recipe),
            shopping_carts::created.eq(super::now()),
        ))
        .returning(ShoppingCart::as_returning())
        .get_result(conn)?)
}

pub fn remove_from_shopping_cart(
    conn: &mut database::Connection,
    user: UserId,
    recipe: RecipeId,
) -> Result<bool> {
    let deleted = diesel::delete(
        shopping_carts::table
            .filter(shopping_carts::user_id.eq(user))
            .filter(shopping_carts::recipe_id.eq(recipe)),
    )
    .execute(conn)?;
    Ok(deleted > 0)
}

pub fn is_in_shopping_cart(
    conn: &mut database::Connection,
    user: UserId,
    recipe: RecipeId,
) -> Result<bool> {
    Ok(diesel::select(diesel::dsl::exists(
        shopping_carts::table
            .filter(shopping_carts::user_id.eq(user))
            .filter(shopping_carts::recipe_id.eq(recipe)),
    ))
    .get_result(conn)?)
}

pub fn shopping_cart(conn: &mut database::Connection, user: UserId) -> Result<Vec<Recipe>> {
    Ok(recipes::table
        .inner_join(shopping_carts::table)
        .filter(shopping_carts::user_id.eq(user))
        .select(Recipe::as_select())
        .order((shopping_carts::created.desc(), shopping_carts::id.desc()))
        .load(conn)?)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub total: i64,
}

impl fmt::Display for ShoppingListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) - {}", self.name, self.measurement_unit, self.total)
    }
}

/// Sums the ingredient amounts of every recipe in the user's cart, grouped by
/// ingredient name and unit, sorted by name.
pub fn shopping_list(
    conn: &mut database::Connection,
    user: UserId,
) -> Result<Vec<ShoppingListItem>> {
    let rows: Vec<(String, String, i32)> = ingredients_in_recipe::table
        .inner_join(ingredients::table)
        .inner_join(
            shopping_carts::table
                .on(shopping_carts::recipe_id.eq(ingredients_in_recipe::recipe_id)),
        )
        .filter(shopping_carts::user_id.eq(user))
        .select((
            ingredients::name,
            ingredients::measurement_unit,
            ingredients_in_recipe::amount,
        ))
        .load(conn)?;

    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
    for (name, measurement_unit, amount) in rows {
        *totals.entry((name, measurement_unit)).or_default() += i64::from(amount);
    }

    Ok(totals
        .into_iter()
        .map(|((name, measurement_unit), total)| ShoppingListItem {
            name,
            measurement_unit,
            total,
        })
        .collect())
}
