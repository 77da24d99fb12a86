// Copyright 2023 Remi Bernotavicius

use clap::Parser;
use clap::Subcommand;
use foodgram::database::models::UserId;
use foodgram::filters::{self, QueryParams, Requester};
use foodgram::query::{collections, recipes};
use foodgram::{admin, database, import};
use std::path::PathBuf;

type Error = Box<dyn std::error::Error + Send + Sync + 'static>;
type Result<T> = std::result::Result<T, Error>;

#[derive(Parser, Debug)]
#[command(version, about = "Recipe sharing backend")]
struct Args {
    /// SQLite database file. Defaults to one in the user data directory.
    #[arg(long, env = "FOODGRAM_DATABASE", global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Insert the tags listed in a JSON seed file.
    LoadTags {
        #[arg(long, default_value = import::DEFAULT_TAGS_PATH)]
        path: PathBuf,
    },
    /// List recipes narrowed by a query string, e.g. `tags=lunch&is_favorited=1`.
    Recipes {
        #[arg(long, default_value = "")]
        query: String,
        /// Evaluate the listing as this user instead of anonymously.
        #[arg(long)]
        user: Option<i32>,
    },
    /// List ingredients, optionally by name prefix.
    Ingredients {
        #[arg(long)]
        name: Option<String>,
    },
    /// Print the summed ingredients of a user's shopping cart.
    ShoppingList {
        #[arg(long)]
        user: i32,
    },
    Admin {
        #[command(subcommand)]
        view: AdminView,
    },
}

#[derive(Debug, Subcommand)]
enum AdminView {
    Users {
        #[arg(long, default_value = "")]
        search: String,
    },
    Subscriptions {
        #[arg(long, default_value = "")]
        search: String,
    },
}

/// This is where the database lives on-disk unless told otherwise. On Linux it should be like:
/// `~/.local/share/foodgram/`
fn data_path() -> Result<PathBuf> {
    let dirs = directories::BaseDirs::new().ok_or("failed to get user home directory")?;
    let path = dirs.data_dir().join("foodgram");
    std::fs::create_dir_all(&path)?;
    Ok(path)
}

fn database_path(arg: Option<PathBuf>) -> Result<PathBuf> {
    match arg {
        Some(path) => Ok(path),
        None => Ok(data_path()?.join("db.sqlite3")),
    }
}

fn list_recipes(conn: &mut database::Connection, query: &str, user: Option<i32>) -> Result<()> {
    let params = QueryParams::parse(query);
    let requester = Requester::from(user.map(UserId::from));
    for recipe in filters::filter_recipes(conn, &params, &requester)? {
        let tags: Vec<String> = recipes::recipe_tags(conn, recipe.id)?
            .into_iter()
            .map(|t| t.slug)
            .collect();
        println!(
            "{}\t{}\t{} min\tauthor {}\t[{}]",
            recipe.id,
            recipe,
            recipe.cooking_time,
            recipe.author_id,
            tags.join(", ")
        );
        for ingredient in recipes::recipe_ingredients(conn, recipe.id)? {
            println!("\t{ingredient} {}", ingredient.ingredient.measurement_unit);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()?;

    let args = Args::parse();
    let path = database_path(args.database)?;
    log::debug!("using database {}", path.display());
    let mut conn = database::establish_connection(path)?;

    match args.commands {
        Commands::LoadTags { path } => {
            import::load_tags(&mut conn, path)?;
        }
        Commands::Recipes { query, user } => list_recipes(&mut conn, &query, user)?,
        Commands::Ingredients { name } => {
            let params = QueryParams::from_pairs(name.map(|n| ("name", n)));
            for ingredient in filters::filter_ingredients(&mut conn, &params)? {
                println!(
                    "{}\t{}\t{}",
                    ingredient.id, ingredient, ingredient.measurement_unit
                );
            }
        }
        Commands::ShoppingList { user } => {
            for item in collections::shopping_list(&mut conn, UserId::from(user))? {
                println!("{item}");
            }
        }
        Commands::Admin { view } => match view {
            AdminView::Users { search } => {
                let users = admin::search_users(&mut conn, &search)?;
                print!("{}", admin::users_table(&users));
            }
            AdminView::Subscriptions { search } => {
                let rows = admin::search_subscriptions(&mut conn, &search)?;
                print!("{}", admin::subscriptions_table(&rows));
            }
        },
    }
    Ok(())
}
