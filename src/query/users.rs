// Copyright 2023 Remi Bernotavicius

use crate::database;
use crate::database::models::{NewUser, Subscription, User, UserId};
use crate::database::schema::{subscriptions, users};
use crate::error::Result;
use crate::validate::Validate as _;
use diesel::prelude::OptionalExtension as _;
use diesel::ExpressionMethods as _;
use diesel::JoinOnDsl as _;
use diesel::QueryDsl as _;
use diesel::RunQueryDsl as _;
use diesel::SelectableHelper as _;

pub fn create_user(conn: &mut database::Connection, new_user: &NewUser<'_>) -> Result<User> {
    new_user.validate()?;

    let user = diesel::insert_into(users::table)
        .values((new_user, users::date_joined.eq(super::now())))
        .returning(User::as_returning())
        .get_result(conn)?;
    log::debug!("created user {} ({})", user.username, user.id);
    Ok(user)
}

pub fn get_user(conn: &mut database::Connection, id: UserId) -> Result<User> {
    Ok(users::table
        .find(id)
        .select(User::as_select())
        .first(conn)?)
}

pub fn get_user_by_username(
    conn: &mut database::Connection,
    username: &str,
) -> Result<Option<User>> {
    Ok(users::table
        .filter(users::username.eq(username))
        .select(User::as_select())
        .first(conn)
        .optional()?)
}

pub fn list_users(conn: &mut database::Connection) -> Result<Vec<User>> {
    Ok(users::table
        .select(User::as_select())
        .order(users::id)
        .load(conn)?)
}

/// Removes the user together with their recipes, subscriptions (both
/// directions), favorites and cart entries.
pub fn delete_user(conn: &mut database::Connection, id: UserId) -> Result<bool> {
    let deleted = diesel::delete(users::table.find(id)).execute(conn)?;
    Ok(deleted > 0)
}

/// Makes `user` follow `author`. Following oneself is not rejected.
pub fn subscribe(
    conn: &mut database::Connection,
    user: UserId,
    author: UserId,
) -> Result<Subscription> {
    Ok(diesel::insert_into(subscriptions::table)
        .values((
            subscriptions::user_id.eq(user),
            subscriptions::author_id.eq(author),
        ))
        .returning(Subscription::as_returning())
        .get_result(conn)?)
}

pub fn unsubscribe(conn: &mut database::Connection, user: UserId, author: UserId) -> Result<bool> {
    let deleted = diesel::delete(
        subscriptions::table
            .filter(subscriptions::user_id.eq(user))
            .filter(subscriptions::author_id.eq(author)),
    )
    .execute(conn)?;
    Ok(deleted > 0)
}

pub fn is_subscribed(conn: &mut database::Connection, user: UserId, author: UserId) -> Result<bool> {
    Ok(diesel::select(diesel::dsl::exists(
        subscriptions::table
            .filter(subscriptions::user_id.eq(user))
            .filter(subscriptions::author_id.eq(author)),
    ))
    .get_result(conn)?)
}

/// Authors `user` is subscribed to, by username.
pub fn following(conn: &mut database::Connection, user: UserId) -> Result<Vec<User>> {
    Ok(users::table
        .inner_join(subscriptions::table.on(subscriptions::author_id.eq(users::id)))
        .filter(subscriptions::user_id.eq(user))
        .select(User::as_select())
        .order(users::username)
        .load(conn)?)
}

/// Users subscribed to `author`, by username.
pub fn followers(conn: &mut database::Connection, author: UserId) -> Result<Vec<User>> {
    Ok(users::table
        .inner_join(subscriptions::table.on(subscriptions::user_id.eq(users::id)))
        .filter(subscriptions::author_id.eq(author))
        .select(User::as_select())
        .order(users::username)
        .load(conn)?)
}
