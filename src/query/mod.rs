// Copyright 2023 Remi Bernotavicius

//! Create/read/update/delete operations over every table. Each function takes
//! the connection explicitly and returns database errors unmodified.

pub mod catalog;
pub mod collections;
pub mod recipes;
pub mod users;

/// Creation timestamp for new rows. Kept at sub-second precision so "newest
/// first" orderings are stable within a single second.
fn now() -> chrono::NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::database::models::{
        Ingredient, NewIngredient, NewRecipe, NewTag, NewUser, Recipe, Tag, User,
    };
    use crate::database::Connection;
    use crate::query::{catalog, recipes, users};

    pub fn user(conn: &mut Connection, username: &str) -> User {
        let email = format!("{username}@example.com");
        users::create_user(
            conn,
            &NewUser::new(username, &email, "First", "Last", "hash"),
        )
        .unwrap()
    }

    pub fn tag(conn: &mut Connection, slug: &str) -> Tag {
        let color = format!("#{slug}");
        catalog::create_tag(
            conn,
            &NewTag {
                name: slug,
                color: &color,
                slug,
            },
        )
        .unwrap()
    }

    pub fn ingredient(conn: &mut Connection, name: &str, measurement_unit: &str) -> Ingredient {
        catalog::create_ingredient(
            conn,
            &NewIngredient {
                name,
                measurement_unit,
            },
        )
        .unwrap()
    }

    pub fn recipe(conn: &mut Connection, author: &User, name: &str, tags: &[&Tag]) -> Recipe {
        let input = recipes::RecipeInput {
            recipe: NewRecipe {
                name,
                image: "",
                text: "Mix everything.",
                cooking_time: 10,
            },
            ingredients: vec![],
            tags: tags.iter().map(|t| t.id).collect(),
        };
        recipes::create_recipe(conn, author.id, &input).unwrap()
    }
}
