// Copyright 2023 Remi Bernotavicius

use crate::database;
use crate::database::models::{
    Ingredient, IngredientId, IngredientInRecipe, NewRecipe, Recipe, RecipeId, RecipeIngredient,
    Tag, TagId, UserId,
};
use crate::database::schema::{ingredients, ingredients_in_recipe, recipe_tags, recipes, tags};
use crate::error::{Error, Result};
use crate::validate::{self, Validate};
use diesel::prelude::Connection as _;
use diesel::ExpressionMethods as _;
use diesel::QueryDsl as _;
use diesel::RunQueryDsl as _;
use diesel::SelectableHelper as _;
use std::collections::BTreeSet;

/// Everything needed to create or replace a recipe.
#[derive(Debug, Clone)]
pub struct RecipeInput<'a> {
    pub recipe: NewRecipe<'a>,
    /// `(ingredient, amount)`. The same ingredient may appear more than once.
    pub ingredients: Vec<(IngredientId, i32)>,
    pub tags: Vec<TagId>,
}

impl Validate for RecipeInput<'_> {
    fn validate(&self) -> Result<()> {
        self.recipe.validate()?;
        for &(_, amount) in &self.ingredients {
            validate::amount(amount)?;
        }
        Ok(())
    }
}

fn insert_components(
    conn: &mut database::Connection,
    recipe_id: RecipeId,
    input: &RecipeInput<'_>,
) -> Result<()> {
    let ingredient_rows: Vec<_> = input
        .ingredients
        .iter()
        .map(|&(ingredient_id, amount)| {
            (
                ingredients_in_recipe::recipe_id.eq(recipe_id),
                ingredients_in_recipe::ingredient_id.eq(ingredient_id),
                ingredients_in_recipe::amount.eq(amount),
            )
        })
        .collect();
    if !ingredient_rows.is_empty() {
        diesel::insert_into(ingredients_in_recipe::table)
            .values(ingredient_rows)
            .execute(conn)?;
    }

    // Tags are a set; asking for one twice is not an error.
    let tag_ids: BTreeSet<TagId> = input.tags.iter().copied().collect();
    let tag_rows: Vec<_> = tag_ids
        .into_iter()
        .map(|tag_id| {
            (
                recipe_tags::recipe_id.eq(recipe_id),
                recipe_tags::tag_id.eq(tag_id),
            )
        })
        .collect();
    if !tag_rows.is_empty() {
        diesel::insert_into(recipe_tags::table)
            .values(tag_rows)
            .execute(conn)?;
    }

    Ok(())
}

/// Creates the recipe, its ingredient amounts and its tags in one
/// transaction.
pub fn create_recipe(
    conn: &mut database::Connection,
    author: UserId,
    input: &RecipeInput<'_>,
) -> Result<Recipe> {
    input.validate()?;

    conn.transaction::<_, Error, _>(|conn| {
        let recipe = diesel::insert_into(recipes::table)
            .values((
                &input.recipe,
                recipes::author_id.eq(author),
                recipes::created.eq(super::now()),
            ))
            .returning(Recipe::as_returning())
            .get_result(conn)?;
        insert_components(conn, recipe.id, input)?;
        log::debug!("created recipe {:?} ({})", recipe.name, recipe.id);
        Ok(recipe)
    })
}

/// Replaces the recipe's fields, ingredient amounts and tags. Author and
/// creation time are kept.
pub fn update_recipe(
    conn: &mut database::Connection,
    id: RecipeId,
    input: &RecipeInput<'_>,
) -> Result<Recipe> {
    input.validate()?;

    conn.transaction::<_, Error, _>(|conn| {
        let recipe = diesel::update(recipes::table.find(id))
            .set(&input.recipe)
            .returning(Recipe::as_returning())
            .get_result(conn)?;

        diesel::delete(ingredients_in_recipe::table.filter(ingredients_in_recipe::recipe_id.eq(id)))
            .execute(conn)?;
        diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(id))).execute(conn)?;
        insert_components(conn, id, input)?;
        Ok(recipe)
    })
}

pub fn get_recipe(conn: &mut database::Connection, id: RecipeId) -> Result<Recipe> {
    Ok(recipes::table
        .find(id)
        .select(Recipe::as_select())
        .first(conn)?)
}

/// All recipes, newest first.
pub fn list_recipes(conn: &mut database::Connection) -> Result<Vec<Recipe>> {
    Ok(recipes::table
        .select(Recipe::as_select())
        .order((recipes::created.desc(), recipes::id.desc()))
        .load(conn)?)
}

/// Ingredient rows of the recipe in the order they were added.
pub fn recipe_ingredients(
    conn: &mut database::Connection,
    id: RecipeId,
) -> Result<Vec<RecipeIngredient>> {
    let rows: Vec<(IngredientInRecipe, Ingredient)> = ingredients_in_recipe::table
        .inner_join(ingredients::table)
        .filter(ingredients_in_recipe::recipe_id.eq(id))
        .select((IngredientInRecipe::as_select(), Ingredient::as_select()))
        .order(ingredients_in_recipe::id)
        .load(conn)?;
    Ok(rows
        .into_iter()
        .map(|(usage, ingredient)| RecipeIngredient { usage, ingredient })
        .collect())
}

pub fn recipe_tags(conn: &mut database::Connection, id: RecipeId) -> Result<Vec<Tag>> {
    Ok(tags::table
        .inner_join(recipe_tags::table)
        .filter(recipe_tags::recipe_id.eq(id))
        .select(Tag::as_select())
        .order(tags::name)
        .load(conn)?)
}

/// Removes the recipe with its ingredient rows, tag links, favorites and cart
/// entries.
pub fn delete_recipe(conn: &mut database::Connection, id: RecipeId) -> Result<bool> {
    let deleted = diesel::delete(recipes::table.find(id)).execute(conn)?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::{favorites, shopping_carts};
    use crate::database::test_connection;
    use crate::query::{collections, fixtures, users};

    fn input<'a>(
        cooking_time: i32,
        ingredients: Vec<(IngredientId, i32)>,
        tags: Vec<TagId>,
    ) -> RecipeInput<'a> {
        RecipeInput {
            recipe: NewRecipe {
                name: "Pancakes",
                image: "recipes/pancakes.png",
                text: "Whisk, then fry.",
                cooking_time,
            },
            ingredients,
            tags,
        }
    }

    macro_rules! count {
        ($conn:expr, $table:expr) => {
            $table.count().get_result::<i64>($conn).unwrap()
        };
    }

    #[test]
    fn cooking_time_is_bounded() {
        let mut conn = test_connection();
        let chef = fixtures::user(&mut conn, "chef");

        for cooking_time in [0, 361] {
            let err = create_recipe(&mut conn, chef.id, &input(cooking_time, vec![], vec![]))
                .unwrap_err();
            assert!(err.is_validation(), "{err}");
        }
        for cooking_time in [1, 360] {
            let recipe =
                create_recipe(&mut conn, chef.id, &input(cooking_time, vec![], vec![])).unwrap();
            assert_eq!(recipe.cooking_time, cooking_time);
        }
    }

    #[test]
    fn database_rejects_out_of_range_values() {
        let mut conn = test_connection();
        let chef = fixtures::user(&mut conn, "chef");
        let milk = fixtures::ingredient(&mut conn, "milk", "ml");
        let recipe = fixtures::recipe(&mut conn, &chef, "Porridge", &[]);

        let res = diesel::insert_into(recipes::table)
            .values((
                recipes::author_id.eq(chef.id),
                recipes::name.eq("Raw"),
                recipes::text.eq("Raw"),
                recipes::cooking_time.eq(0),
                recipes::created.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(&mut conn);
        assert!(res.is_err());

        let res = diesel::insert_into(ingredients_in_recipe::table)
            .values((
                ingredients_in_recipe::recipe_id.eq(recipe.id),
                ingredients_in_recipe::ingredient_id.eq(milk.id),
                ingredients_in_recipe::amount.eq(101),
            ))
            .execute(&mut conn);
        assert!(res.is_err());
    }

    #[test]
    fn amount_is_bounded() {
        let mut conn = test_connection();
        let chef = fixtures::user(&mut conn, "chef");
        let milk = fixtures::ingredient(&mut conn, "milk", "ml");

        assert!(
            create_recipe(&mut conn, chef.id, &input(10, vec![(milk.id, 0)], vec![]))
                .unwrap_err()
                .is_validation()
        );
        assert!(
            create_recipe(&mut conn, chef.id, &input(10, vec![(milk.id, 101)], vec![]))
                .unwrap_err()
                .is_validation()
        );
        create_recipe(&mut conn, chef.id, &input(10, vec![(milk.id, 100)], vec![])).unwrap();
    }

    #[test]
    fn components_are_stored() {
        let mut conn = test_connection();
        let chef = fixtures::user(&mut conn, "chef");
        let milk = fixtures::ingredient(&mut conn, "milk", "ml");
        let flour = fixtures::ingredient(&mut conn, "flour", "g");
        let breakfast = fixtures::tag(&mut conn, "breakfast");

        let recipe = create_recipe(
            &mut conn,
            chef.id,
            &input(
                20,
                vec![(milk.id, 30), (flour.id, 50), (milk.id, 20)],
                vec![breakfast.id, breakfast.id],
            ),
        )
        .unwrap();
        assert_eq!(recipe.author_id, chef.id);
        assert_eq!(recipe.to_string(), "Pancakes");

        let rows: Vec<_> = recipe_ingredients(&mut conn, recipe.id)
            .unwrap()
            .into_iter()
            .map(|i| i.to_string())
            .collect();
        // Repeated ingredients are kept as separate rows.
        assert_eq!(rows, ["milk: 30", "flour: 50", "milk: 20"]);
        assert_eq!(recipe_tags(&mut conn, recipe.id).unwrap(), vec![breakfast]);
    }

    #[test]
    fn failed_create_leaves_nothing_behind() {
        let mut conn = test_connection();
        let chef = fixtures::user(&mut conn, "chef");
        let milk = fixtures::ingredient(&mut conn, "milk", "ml");

        let missing_tag = TagId::from(42);
        assert!(create_recipe(
            &mut conn,
            chef.id,
            &input(10, vec![(milk.id, 1)], vec![missing_tag])
        )
        .is_err());
        assert_eq!(list_recipes(&mut conn).unwrap(), vec![]);
        assert_eq!(count!(&mut conn, ingredients_in_recipe::table), 0);
    }

    #[test]
    fn update_replaces_components() {
        let mut conn = test_connection();
        let chef = fixtures::user(&mut conn, "chef");
        let milk = fixtures::ingredient(&mut conn, "milk", "ml");
        let eggs = fixtures::ingredient(&mut conn, "eggs", "pcs");
        let breakfast = fixtures::tag(&mut conn, "breakfast");
        let dinner = fixtures::tag(&mut conn, "dinner");

        let recipe = create_recipe(
            &mut conn,
            chef.id,
            &input(20, vec![(milk.id, 30)], vec![breakfast.id]),
        )
        .unwrap();

        let mut edit = input(45, vec![(eggs.id, 3)], vec![dinner.id]);
        edit.recipe.name = "Omelette";
        let updated = update_recipe(&mut conn, recipe.id, &edit).unwrap();

        assert_eq!(updated.id, recipe.id);
        assert_eq!(updated.created, recipe.created);
        assert_eq!(updated.name, "Omelette");
        assert_eq!(updated.cooking_time, 45);
        let rows: Vec<_> = recipe_ingredients(&mut conn, recipe.id)
            .unwrap()
            .into_iter()
            .map(|i| i.to_string())
            .collect();
        assert_eq!(rows, ["eggs: 3"]);
        assert_eq!(recipe_tags(&mut conn, recipe.id).unwrap(), vec![dinner]);
    }

    #[test]
    fn listing_is_newest_first() {
        let mut conn = test_connection();
        let chef = fixtures::user(&mut conn, "chef");
        let first = fixtures::recipe(&mut conn, &chef, "First", &[]);
        let second = fixtures::recipe(&mut conn, &chef, "Second", &[]);

        assert_eq!(list_recipes(&mut conn).unwrap(), vec![second, first]);
    }

    #[test]
    fn deleting_recipe_cascades() {
        let mut conn = test_connection();
        let chef = fixtures::user(&mut conn, "chef");
        let milk = fixtures::ingredient(&mut conn, "milk", "ml");
        let breakfast = fixtures::tag(&mut conn, "breakfast");
        let recipe = create_recipe(
            &mut conn,
            chef.id,
            &input(20, vec![(milk.id, 30)], vec![breakfast.id]),
        )
        .unwrap();
        let kept = fixtures::recipe(&mut conn, &chef, "Kept", &[&breakfast]);

        collections::add_favorite(&mut conn, chef.id, recipe.id).unwrap();
        collections::add_to_shopping_cart(&mut conn, chef.id, recipe.id).unwrap();
        collections::add_favorite(&mut conn, chef.id, kept.id).unwrap();

        assert!(delete_recipe(&mut conn, recipe.id).unwrap());
        assert!(!delete_recipe(&mut conn, recipe.id).unwrap());

        assert_eq!(count!(&mut conn, ingredients_in_recipe::table), 0);
        assert_eq!(count!(&mut conn, shopping_carts::table), 0);
        assert_eq!(count!(&mut conn, favorites::table), 1);
        assert_eq!(count!(&mut conn, recipe_tags::table), 1);
        // Reference data survives.
        assert_eq!(count!(&mut conn, ingredients::table), 1);
        assert_eq!(count!(&mut conn, tags::table), 1);
    }

    #[test]
    fn deleting_author_cascades_to_recipes() {
        let mut conn = test_connection();
        let chef = fixtures::user(&mut conn, "chef");
        let fan = fixtures::user(&mut conn, "fan");
        let recipe = fixtures::recipe(&mut conn, &chef, "Soup", &[]);
        collections::add_favorite(&mut conn, fan.id, recipe.id).unwrap();

        users::delete_user(&mut conn, chef.id).unwrap();
        assert_eq!(list_recipes(&mut conn).unwrap(), vec![]);
        assert_eq!(collections::favorites(&mut conn, fan.id).unwrap(), vec![]);
    }

    #[test]
    fn deleting_ingredient_removes_it_from_recipes() {
        let mut conn = test_connection();
        let chef = fixtures::user(&mut conn, "chef");
        let milk = fixtures::ingredient(&mut conn, "milk", "ml");
        let recipe =
            create_recipe(&mut conn, chef.id, &input(5, vec![(milk.id, 1)], vec![])).unwrap();

        crate::query::catalog::delete_ingredient(&mut conn, milk.id).unwrap();
        assert_eq!(recipe_ingredients(&mut conn, recipe.id).unwrap(), vec![]);
        assert_eq!(get_recipe(&mut conn, recipe.id).unwrap(), recipe);
    }
}
