// Copyright 2023 Remi Bernotavicius

use crate::database;
use crate::database::models::{Ingredient, IngredientId, NewIngredient, NewTag, Tag, TagId};
use crate::database::schema::{ingredients, tags};
use crate::error::Result;
use crate::validate::Validate as _;
use diesel::prelude::OptionalExtension as _;
use diesel::ExpressionMethods as _;
use diesel::QueryDsl as _;
use diesel::RunQueryDsl as _;
use diesel::SelectableHelper as _;

pub fn create_tag(conn: &mut database::Connection, new_tag: &NewTag<'_>) -> Result<Tag> {
    new_tag.validate()?;
    insert_tag(conn, new_tag)
}

/// Inserts the tag as given. Only the database constraints apply.
pub(crate) fn insert_tag(conn: &mut database::Connection, new_tag: &NewTag<'_>) -> Result<Tag> {
    Ok(diesel::insert_into(tags::table)
        .values(new_tag)
        .returning(Tag::as_returning())
        .get_result(conn)?)
}

pub fn list_tags(conn: &mut database::Connection) -> Result<Vec<Tag>> {
    Ok(tags::table
        .select(Tag::as_select())
        .order(tags::name)
        .load(conn)?)
}

pub fn get_tag(conn: &mut database::Connection, id: TagId) -> Result<Tag> {
    Ok(tags::table.find(id).select(Tag::as_select()).first(conn)?)
}

pub fn tag_by_slug(conn: &mut database::Connection, slug: &str) -> Result<Option<Tag>> {
    Ok(tags::table
        .filter(tags::slug.eq(slug))
        .select(Tag::as_select())
        .first(conn)
        .optional()?)
}

pub fn delete_tag(conn: &mut database::Connection, id: TagId) -> Result<bool> {
    let deleted = diesel::delete(tags::table.find(id)).execute(conn)?;
    Ok(deleted > 0)
}

pub fn create_ingredient(
    conn: &mut database::Connection,
    new_ingredient: &NewIngredient<'_>,
) -> Result<Ingredient> {
    new_ingredient.validate()?;

    Ok(diesel::insert_into(ingredients::table)
        .values(new_ingredient)
        .returning(Ingredient::as_returning())
        .get_result(conn)?)
}

pub fn list_ingredients(conn: &mut database::Connection) -> Result<Vec<Ingredient>> {
    Ok(ingredients::table
        .select(Ingredient::as_select())
        .order((ingredients::name, ingredients::id))
        .load(conn)?)
}

pub fn get_ingredient(conn: &mut database::Connection, id: IngredientId) -> Result<Ingredient> {
    Ok(ingredients::table
        .find(id)
        .select(Ingredient::as_select())
        .first(conn)?)
}

pub fn update_ingredient(
    conn: &mut database::Connection,
    id: IngredientId,
    edit: &NewIngredient<'_>,
) -> Result<Ingredient> {
    edit.validate()?;

    Ok(diesel::update(ingredients::table.find(id))
        .set((
            ingredients::name.eq(edit.name),
            ingredients::measurement_unit.eq(edit.measurement_unit),
        ))
        .returning(Ingredient::as_returning())
        .get_result(conn)?)
}

/// Also removes the ingredient from every recipe that used it.
pub fn delete_ingredient(conn: &mut database::Connection, id: IngredientId) -> Result<bool> {
    let deleted = diesel::delete(ingredients::table.find(id)).execute(conn)?;
    Ok(deleted > 0)
}
