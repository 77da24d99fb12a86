// Copyright 2023 Remi Bernotavicius

//! Read-only back-office listings with free text search.

use crate::database;
use crate::database::lower_unicode;
use crate::database::models::{Subscription, User, UserId};
use crate::database::schema::{subscriptions, users};
use crate::error::{Error, Result};
use diesel::expression_methods::EscapeExpressionMethods as _;
use diesel::expression_methods::TextExpressionMethods as _;
use diesel::BoolExpressionMethods as _;
use diesel::ExpressionMethods as _;
use diesel::QueryDsl as _;
use diesel::RunQueryDsl as _;
use diesel::SelectableHelper as _;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

pub const EMPTY_VALUE_DISPLAY: &str = "-empty-";

/// A lowercased `LIKE` pattern, to be matched against `lower_unicode` columns.
fn like_contains(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn search_terms(search: &str) -> impl Iterator<Item = &str> {
    search.split_whitespace()
}

/// Rows of display strings under a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminTable {
    pub headers: &'static [&'static str],
    pub rows: Vec<Vec<String>>,
}

impl AdminTable {
    fn cell(value: &str) -> String {
        if value.is_empty() {
            EMPTY_VALUE_DISPLAY.into()
        } else {
            value.into()
        }
    }
}

fn write_row<'a>(
    f: &mut fmt::Formatter<'_>,
    widths: &[usize],
    cells: impl Iterator<Item = &'a str>,
) -> fmt::Result {
    let line: Vec<String> = cells
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    writeln!(f, "{}", line.join("  ").trim_end())
}

impl fmt::Display for AdminTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        write_row(f, &widths, self.headers.iter().copied())?;
        for row in &self.rows {
            write_row(f, &widths, row.iter().map(String::as_str))?;
        }
        Ok(())
    }
}

/// Users whose first name, last name or email contains every search term,
/// newest account first.
pub fn search_users(conn: &mut database::Connection, search: &str) -> Result<Vec<User>> {
    let mut query = users::table.into_boxed();
    for term in search_terms(search) {
        let pattern = like_contains(term);
        query = query.filter(
            lower_unicode(users::first_name)
                .like(pattern.clone())
                .escape('\\')
                .or(lower_unicode(users::last_name)
                    .like(pattern.clone())
                    .escape('\\'))
                .or(lower_unicode(users::email).like(pattern).escape('\\')),
        );
    }
    Ok(query
        .select(User::as_select())
        .order(users::id.desc())
        .load(conn)?)
}

pub fn users_table(users: &[User]) -> AdminTable {
    AdminTable {
        headers: &["first name", "last name", "email"],
        rows: users
            .iter()
            .map(|u| {
                vec![
                    AdminTable::cell(&u.first_name),
                    AdminTable::cell(&u.last_name),
                    AdminTable::cell(&u.email),
                ]
            })
            .collect(),
    }
}

/// A subscription with both of its users already loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRow {
    pub subscription: Subscription,
    pub user: User,
    pub author: User,
}

impl fmt::Display for SubscriptionRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} follows {}", self.user, self.author)
    }
}

/// Subscriptions where every search term is contained in the subscriber's or
/// the author's username. Users are fetched in one query for the whole page.
pub fn search_subscriptions(
    conn: &mut database::Connection,
    search: &str,
) -> Result<Vec<SubscriptionRow>> {
    let mut query = subscriptions::table.into_boxed();
    for term in search_terms(search) {
        let matching: Vec<UserId> = users::table
            .filter(
                lower_unicode(users::username)
                    .like(like_contains(term))
                    .escape('\\'),
            )
            .select(users::id)
            .load(conn)?;
        query = query.filter(
            subscriptions::user_id
                .eq_any(matching.clone())
                .or(subscriptions::author_id.eq_any(matching)),
        );
    }
    let found: Vec<Subscription> = query
        .select(Subscription::as_select())
        .order(subscriptions::id.desc())
        .load(conn)?;

    let ids: BTreeSet<UserId> = found
        .iter()
        .flat_map(|s| [s.user_id, s.author_id])
        .collect();
    let by_id: HashMap<UserId, User> = users::table
        .filter(users::id.eq_any(ids))
        .select(User::as_select())
        .load(conn)?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    found
        .into_iter()
        .map(|subscription| {
            let lookup = |id: UserId| {
                by_id.get(&id).cloned().ok_or(Error::Database(
                    diesel::result::Error::NotFound,
                ))
            };
            Ok(SubscriptionRow {
                user: lookup(subscription.user_id)?,
                author: lookup(subscription.author_id)?,
                subscription,
            })
        })
        .collect()
}

pub fn subscriptions_table(rows: &[SubscriptionRow]) -> AdminTable {
    AdminTable {
        headers: &["author", "user"],
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    AdminTable::cell(&r.author.to_string()),
                    AdminTable::cell(&r.user.to_string()),
                ]
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewUser;
    use crate::database::test_connection;
    use crate::query::users::{create_user, subscribe};

    fn user(conn: &mut database::Connection, username: &str, first: &str, last: &str) -> User {
        let email = format!("{username}@example.com");
        create_user(conn, &NewUser::new(username, &email, first, last, "hash")).unwrap()
    }

    fn usernames(users: &[User]) -> Vec<&str> {
        users.iter().map(|u| u.username.as_str()).collect()
    }

    #[test]
    fn user_search_requires_every_term() {
        let mut conn = test_connection();
        user(&mut conn, "ivan", "Ivan", "Petrov");
        user(&mut conn, "petr", "Petr", "Ivanov");
        user(&mut conn, "olga", "Olga", "Sidorova");

        assert_eq!(
            usernames(&search_users(&mut conn, "ivan").unwrap()),
            ["petr", "ivan"]
        );
        assert_eq!(
            usernames(&search_users(&mut conn, "IVAN petrov").unwrap()),
            ["ivan"]
        );
        assert_eq!(
            usernames(&search_users(&mut conn, "olga@example").unwrap()),
            ["olga"]
        );
        assert_eq!(search_users(&mut conn, "ivan olga").unwrap(), vec![]);
        assert_eq!(search_users(&mut conn, "  ").unwrap().len(), 3);
        assert_eq!(search_users(&mut conn, "%").unwrap(), vec![]);
    }

    #[test]
    fn user_search_folds_cyrillic() {
        let mut conn = test_connection();
        user(&mut conn, "ivan", "Иван", "Петров");
        user(&mut conn, "olga", "Ольга", "Сидорова");

        assert_eq!(usernames(&search_users(&mut conn, "иван").unwrap()), ["ivan"]);
        assert_eq!(
            usernames(&search_users(&mut conn, "ПЕТРОВ иВаН").unwrap()),
            ["ivan"]
        );
        assert_eq!(usernames(&search_users(&mut conn, "сидоР").unwrap()), ["olga"]);
    }

    #[test]
    fn users_table_rendering() {
        let mut conn = test_connection();
        let ivan = user(&mut conn, "ivan", "Ivan", "Petrov");
        let table = users_table(&[ivan]);
        assert_eq!(
            table.rows,
            vec![vec![
                "Ivan".to_string(),
                "Petrov".to_string(),
                "ivan@example.com".to_string()
            ]]
        );
        assert_eq!(
            table.to_string(),
            "first name  last name  email\nIvan        Petrov     ivan@example.com\n"
        );
        assert_eq!(AdminTable::cell(""), EMPTY_VALUE_DISPLAY);
    }

    #[test]
    fn subscription_search_by_either_username() {
        let mut conn = test_connection();
        let ivan = user(&mut conn, "ivan", "Ivan", "Petrov");
        let petr = user(&mut conn, "petr", "Petr", "Ivanov");
        let chef = user(&mut conn, "chef", "Gordon", "Ramsay");

        subscribe(&mut conn, ivan.id, chef.id).unwrap();
        subscribe(&mut conn, petr.id, chef.id).unwrap();
        subscribe(&mut conn, petr.id, ivan.id).unwrap();

        let rendered = |rows: Vec<SubscriptionRow>| -> Vec<String> {
            rows.into_iter().map(|r| r.to_string()).collect()
        };

        assert_eq!(
            rendered(search_subscriptions(&mut conn, "").unwrap()),
            ["petr follows ivan", "petr follows chef", "ivan follows chef"]
        );
        assert_eq!(
            rendered(search_subscriptions(&mut conn, "ivan").unwrap()),
            ["petr follows ivan", "ivan follows chef"]
        );
        assert_eq!(
            rendered(search_subscriptions(&mut conn, "che").unwrap()),
            ["petr follows chef", "ivan follows chef"]
        );
        assert_eq!(
            rendered(search_subscriptions(&mut conn, "petr chef").unwrap()),
            ["petr follows chef"]
        );

        let rows = search_subscriptions(&mut conn, "ivan").unwrap();
        assert_eq!(
            rendered(search_subscriptions(&mut conn, "CHEF").unwrap()),
            ["petr follows chef", "ivan follows chef"]
        );

        let table = subscriptions_table(&rows);
        assert_eq!(table.headers, ["author", "user"]);
        assert_eq!(table.rows[0], ["ivan", "petr"]);
    }
}
