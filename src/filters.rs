// Copyright 2023 Remi Bernotavicius

//! Request-time filters for the recipe and ingredient listings.
//!
//! Each listing has a table mapping a query parameter name to the predicate
//! that narrows the query. Parameters without an entry, and values a
//! predicate can't make sense of, leave the listing untouched.

use crate::database;
use crate::database::lower_unicode;
use crate::database::models::{Ingredient, Recipe, RecipeId, UserId};
use crate::database::schema::{favorites, ingredients, recipe_tags, recipes, shopping_carts, tags};
use crate::error::Result;
use diesel::expression_methods::EscapeExpressionMethods as _;
use diesel::expression_methods::TextExpressionMethods as _;
use diesel::sqlite::Sqlite;
use diesel::ExpressionMethods as _;
use diesel::QueryDsl as _;
use diesel::RunQueryDsl as _;
use diesel::SelectableHelper as _;
use std::convert::Infallible;
use std::str::FromStr;

/// Who a listing is evaluated for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Requester {
    #[default]
    Anonymous,
    User(UserId),
}

impl Requester {
    pub fn user(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::User(id) => Some(*id),
        }
    }
}

impl From<Option<UserId>> for Requester {
    fn from(user: Option<UserId>) -> Self {
        user.map_or(Self::Anonymous, Self::User)
    }
}

/// Query parameters in the order given. A name may repeat.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parses `a=1&b=2&b=3`. `+` decodes to a space and percent escapes are
    /// decoded; a pair that fails to decode is kept as written.
    pub fn parse(query: &str) -> Self {
        fn decode(raw: &str) -> String {
            let raw = raw.replace('+', " ");
            match urlencoding::decode(&raw) {
                Ok(decoded) => decoded.into_owned(),
                Err(_) => raw,
            }
        }

        let query = query.strip_prefix('?').unwrap_or(query);
        Self {
            pairs: query
                .split('&')
                .filter(|pair| !pair.is_empty())
                .map(|pair| {
                    let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
                    (decode(name), decode(value))
                })
                .collect(),
        }
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// The last value given for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(n, _)| n.as_str())
    }
}

impl FromStr for QueryParams {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// `true`/`1` and `false`/`0`, ignoring case. Anything else is unset.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

type FilterFn<Q> = fn(&mut database::Connection, Q, &Requester, &[&str]) -> Result<Q>;

fn apply_filters<Q>(
    conn: &mut database::Connection,
    mut query: Q,
    filters: &[(&'static str, FilterFn<Q>)],
    params: &QueryParams,
    requester: &Requester,
) -> Result<Q> {
    for name in params.names() {
        if !filters.iter().any(|(n, _)| *n == name) {
            log::debug!("ignoring unknown filter parameter {name:?}");
        }
    }
    for (name, filter) in filters {
        let values = params.get_all(name);
        if values.is_empty() {
            continue;
        }
        log::debug!("applying filter {name} = {values:?}");
        query = filter(conn, query, requester, &values)?;
    }
    Ok(query)
}

type RecipeQuery = recipes::BoxedQuery<'static, Sqlite>;

pub const RECIPE_FILTERS: &[(&str, FilterFn<RecipeQuery>)] = &[
    ("tags", filter_by_tags),
    ("author", filter_by_author),
    ("is_favorited", filter_is_favorited),
    ("is_in_shopping_cart", filter_is_in_shopping_cart),
];

/// Recipes carrying any of the given tag slugs.
fn filter_by_tags(
    conn: &mut database::Connection,
    query: RecipeQuery,
    _requester: &Requester,
    values: &[&str],
) -> Result<RecipeQuery> {
    let slugs: Vec<&str> = values.iter().copied().filter(|v| !v.is_empty()).collect();
    if slugs.is_empty() {
        return Ok(query);
    }
    let ids: Vec<RecipeId> = recipe_tags::table
        .inner_join(tags::table)
        .filter(tags::slug.eq_any(slugs))
        .select(recipe_tags::recipe_id)
        .distinct()
        .load(conn)?;
    Ok(query.filter(recipes::id.eq_any(ids)))
}

fn filter_by_author(
    _conn: &mut database::Connection,
    query: RecipeQuery,
    _requester: &Requester,
    values: &[&str],
) -> Result<RecipeQuery> {
    let Some(value) = values.last().filter(|v| !v.is_empty()) else {
        return Ok(query);
    };
    match value.parse::<i32>() {
        Ok(id) => Ok(query.filter(recipes::author_id.eq(UserId::from(id)))),
        Err(_) => {
            log::warn!("ignoring non-numeric author {value:?}");
            Ok(query)
        }
    }
}

/// The user a membership filter applies to, or `None` when it should be
/// skipped: unset or false values, and anonymous requesters.
fn membership_user(requester: &Requester, values: &[&str]) -> Option<UserId> {
    let wanted = values.last().and_then(|v| parse_bool(v)).unwrap_or(false);
    if !wanted {
        return None;
    }
    requester.user()
}

fn filter_is_favorited(
    conn: &mut database::Connection,
    query: RecipeQuery,
    requester: &Requester,
    values: &[&str],
) -> Result<RecipeQuery> {
    let Some(user) = membership_user(requester, values) else {
        return Ok(query);
    };
    let ids: Vec<RecipeId> = favorites::table
        .filter(favorites::user_id.eq(user))
        .select(favorites::recipe_id)
        .load(conn)?;
    Ok(query.filter(recipes::id.eq_any(ids)))
}

fn filter_is_in_shopping_cart(
    conn: &mut database::Connection,
    query: RecipeQuery,
    requester: &Requester,
    values: &[&str],
) -> Result<RecipeQuery> {
    let Some(user) = membership_user(requester, values) else {
        return Ok(query);
    };
    let ids: Vec<RecipeId> = shopping_carts::table
        .filter(shopping_carts::user_id.eq(user))
        .select(shopping_carts::recipe_id)
        .load(conn)?;
    Ok(query.filter(recipes::id.eq_any(ids)))
}

/// The recipe listing narrowed by `params`, newest first.
pub fn filter_recipes(
    conn: &mut database::Connection,
    params: &QueryParams,
    requester: &Requester,
) -> Result<Vec<Recipe>> {
    let query = apply_filters(
        conn,
        recipes::table.into_boxed(),
        RECIPE_FILTERS,
        params,
        requester,
    )?;
    Ok(query
        .select(Recipe::as_select())
        .order((recipes::created.desc(), recipes::id.desc()))
        .load(conn)?)
}

type IngredientQuery = ingredients::BoxedQuery<'static, Sqlite>;

pub const INGREDIENT_FILTERS: &[(&str, FilterFn<IngredientQuery>)] = &[("name", filter_by_name)];

fn like_prefix(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 1);
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Case-insensitive prefix match on the ingredient name.
fn filter_by_name(
    _conn: &mut database::Connection,
    query: IngredientQuery,
    _requester: &Requester,
    values: &[&str],
) -> Result<IngredientQuery> {
    let Some(value) = values.last().filter(|v| !v.is_empty()) else {
        return Ok(query);
    };
    let pattern = like_prefix(&value.to_lowercase());
    Ok(query.filter(lower_unicode(ingredients::name).like(pattern).escape('\\')))
}

/// The ingredient listing narrowed by `params`, by name.
pub fn filter_ingredients(
    conn: &mut database::Connection,
    params: &QueryParams,
) -> Result<Vec<Ingredient>> {
    let query = apply_filters(
        conn,
        ingredients::table.into_boxed(),
        INGREDIENT_FILTERS,
        params,
        &Requester::Anonymous,
    )?;
    Ok(query
        .select(Ingredient::as_select())
        .order((ingredients::name, ingredients::id))
        .load(conn)?)
}
