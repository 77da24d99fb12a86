// Copyright 2023 Remi Bernotavicius

use derive_more::Display;
use diesel::associations::{Associations, Identifiable};
use diesel::deserialize::Queryable;
use diesel::expression::Selectable;
use diesel::prelude::{AsChangeset, Insertable};
use diesel_derive_newtype::DieselNewType;
use std::fmt;
use std::ops::RangeInclusive;

macro_rules! id_type {
    ($name:ident) => {
        #[derive(DieselNewType, Debug, Display, Hash, PartialEq, Eq, PartialOrd, Ord, Copy, Clone)]
        pub struct $name(i32);

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }
    };
}

id_type!(UserId);
id_type!(SubscriptionId);
id_type!(TagId);
id_type!(IngredientId);
id_type!(RecipeId);
id_type!(IngredientInRecipeId);
id_type!(FavoriteId);
id_type!(ShoppingCartId);

/// Minutes, inclusive.
pub const COOKING_TIME: RangeInclusive<i32> = 1..=360;

/// Units of the ingredient's measurement, inclusive.
pub const AMOUNT: RangeInclusive<i32> = 1..=100;

#[derive(Queryable, Selectable, Identifiable, Debug, Display, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::database::schema::users)]
#[display("{username}")]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: chrono::NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::database::schema::users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password: &'a str,
    pub is_staff: bool,
    pub is_active: bool,
}

impl<'a> NewUser<'a> {
    /// A regular active account.
    pub fn new(
        username: &'a str,
        email: &'a str,
        first_name: &'a str,
        last_name: &'a str,
        password: &'a str,
    ) -> Self {
        Self {
            username,
            email,
            first_name,
            last_name,
            password,
            is_staff: false,
            is_active: true,
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::database::schema::subscriptions)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub author_id: UserId,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Display, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::database::schema::tags)]
#[display("{name}")]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::database::schema::tags)]
pub struct NewTag<'a> {
    pub name: &'a str,
    pub color: &'a str,
    pub slug: &'a str,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Display, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::database::schema::ingredients)]
#[display("{name}")]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::database::schema::ingredients)]
pub struct NewIngredient<'a> {
    pub name: &'a str,
    pub measurement_unit: &'a str,
}

#[derive(Associations, Queryable, Selectable, Identifiable, Debug, Display, Clone, PartialEq, Eq)]
#[diesel(belongs_to(User, foreign_key = author_id))]
#[diesel(table_name = crate::database::schema::recipes)]
#[display("{name}")]
pub struct Recipe {
    pub id: RecipeId,
    pub author_id: UserId,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub created: chrono::NaiveDateTime,
}

/// The scalar part of a recipe. Ingredients and tags travel alongside it in
/// [`crate::query::recipes::RecipeInput`].
#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::database::schema::recipes)]
pub struct NewRecipe<'a> {
    pub name: &'a str,
    pub image: &'a str,
    pub text: &'a str,
    pub cooking_time: i32,
}

#[derive(Associations, Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(belongs_to(Recipe))]
#[diesel(belongs_to(Ingredient))]
#[diesel(table_name = crate::database::schema::ingredients_in_recipe)]
pub struct IngredientInRecipe {
    pub id: IngredientInRecipeId,
    pub recipe_id: RecipeId,
    pub ingredient_id: IngredientId,
    pub amount: i32,
}

/// An ingredient row of a recipe joined with the ingredient it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeIngredient {
    pub usage: IngredientInRecipe,
    pub ingredient: Ingredient,
}

impl fmt::Display for RecipeIngredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.ingredient.name, self.usage.amount)
    }
}

#[derive(Associations, Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(belongs_to(User))]
#[diesel(belongs_to(Recipe))]
#[diesel(table_name = crate::database::schema::favorites)]
pub struct Favorite {
    pub id: FavoriteId,
    pub user_id: UserId,
    pub recipe_id: RecipeId,
    pub created: chrono::NaiveDateTime,
}

#[derive(Associations, Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(belongs_to(User))]
#[diesel(belongs_to(Recipe))]
#[diesel(table_name = crate::database::schema::shopping_carts)]
pub struct ShoppingCart {
    pub id: ShoppingCartId,
    pub user_id: UserId,
    pub recipe_id: RecipeId,
    pub created: chrono::NaiveDateTime,
}
