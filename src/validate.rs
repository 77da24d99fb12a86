// Copyright 2023 Remi Bernotavicius

//! Field validation run before any row is written. The same bounds are also
//! declared as constraints in the migration, so rows written around these
//! checks are still rejected by the database.

use crate::database::models::{
    NewIngredient, NewRecipe, NewTag, NewUser, AMOUNT, COOKING_TIME,
};
use crate::error::{Error, Result};
use std::ops::RangeInclusive;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn required(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "this field may not be blank"));
    }
    Ok(())
}

fn max_length(field: &'static str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(Error::validation(
            field,
            format!("ensure this value has at most {max} characters (it has {len})"),
        ));
    }
    Ok(())
}

pub fn in_range(field: &'static str, value: i32, range: RangeInclusive<i32>) -> Result<()> {
    if !range.contains(&value) {
        return Err(Error::validation(
            field,
            format!(
                "{value} is outside of {}..={}",
                range.start(),
                range.end()
            ),
        ));
    }
    Ok(())
}

fn slug(field: &'static str, value: &str) -> Result<()> {
    let valid = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(Error::validation(
            field,
            format!("{value:?} may only contain letters, numbers, underscores or hyphens"),
        ));
    }
    Ok(())
}

fn username(field: &'static str, value: &str) -> Result<()> {
    let valid = value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-'));
    if !valid {
        return Err(Error::validation(
            field,
            format!("{value:?} may only contain letters, digits and @/./+/-/_"),
        ));
    }
    Ok(())
}

fn email(field: &'static str, value: &str) -> Result<()> {
    let valid = match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    };
    if !valid {
        return Err(Error::validation(
            field,
            format!("{value:?} is not a valid email address"),
        ));
    }
    Ok(())
}

impl Validate for NewUser<'_> {
    fn validate(&self) -> Result<()> {
        required("username", self.username)?;
        max_length("username", self.username, 150)?;
        username("username", self.username)?;
        required("email", self.email)?;
        max_length("email", self.email, 254)?;
        email("email", self.email)?;
        required("first_name", self.first_name)?;
        max_length("first_name", self.first_name, 150)?;
        required("last_name", self.last_name)?;
        max_length("last_name", self.last_name, 150)?;
        max_length("password", self.password, 128)?;
        Ok(())
    }
}

impl Validate for NewTag<'_> {
    fn validate(&self) -> Result<()> {
        required("name", self.name)?;
        max_length("name", self.name, 255)?;
        required("color", self.color)?;
        max_length("color", self.color, 255)?;
        required("slug", self.slug)?;
        max_length("slug", self.slug, 255)?;
        slug("slug", self.slug)?;
        Ok(())
    }
}

impl Validate for NewIngredient<'_> {
    fn validate(&self) -> Result<()> {
        required("name", self.name)?;
        max_length("name", self.name, 255)?;
        required("measurement_unit", self.measurement_unit)?;
        max_length("measurement_unit", self.measurement_unit, 15)?;
        Ok(())
    }
}

impl Validate for NewRecipe<'_> {
    fn validate(&self) -> Result<()> {
        required("name", self.name)?;
        max_length("name", self.name, 255)?;
        max_length("image", self.image, 100)?;
        required("text", self.text)?;
        in_range("cooking_time", self.cooking_time, COOKING_TIME)?;
        Ok(())
    }
}

pub fn amount(value: i32) -> Result<()> {
    in_range("amount", value, AMOUNT)
}
