// Copyright 2023 Remi Bernotavicius

//! One-shot seeding of reference data.

use crate::database;
use crate::database::models::NewTag;
use crate::query::catalog;
use crate::Result;
use std::path::Path;

mod json;

/// Where the tag seed file lives relative to the working directory.
pub const DEFAULT_TAGS_PATH: &str = "data/tags.json";

impl json::Tag {
    fn import(&self) -> NewTag<'_> {
        NewTag {
            name: &self.name,
            color: &self.color,
            slug: &self.slug,
        }
    }
}

/// Inserts tags in file order, as written. Every insert commits on its own,
/// so when one fails the ones before it stay. There is no check for tags
/// already present; loading twice fails on the first duplicate.
pub struct TagImporter {
    tags: std::vec::IntoIter<json::Tag>,
    num_attempted: usize,
    num_imported: usize,
    total_num_tags: usize,
}

impl TagImporter {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let tags = json::decode_tags_from_path(path)?;
        let total_num_tags = tags.len();

        Ok(Self {
            tags: tags.into_iter(),
            num_attempted: 0,
            num_imported: 0,
            total_num_tags,
        })
    }

    /// Every record has been tried, whether or not it went in.
    pub fn done(&self) -> bool {
        self.num_attempted == self.total_num_tags
    }

    pub fn num_imported(&self) -> usize {
        self.num_imported
    }

    pub fn percent_done(&self) -> f32 {
        if self.total_num_tags == 0 {
            return 1.0;
        }
        self.num_attempted as f32 / self.total_num_tags as f32
    }

    pub fn import_one(&mut self, conn: &mut database::Connection) -> Result<()> {
        assert!(!self.done());

        let Some(tag) = self.tags.next() else {
            return Ok(());
        };
        self.num_attempted += 1;
        let new_tag = catalog::insert_tag(conn, &tag.import())?;
        log::debug!("imported tag {new_tag} ({})", new_tag.slug);
        self.num_imported += 1;
        Ok(())
    }
}

/// Returns the number of tags inserted.
pub fn load_tags(conn: &mut database::Connection, path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let mut importer = TagImporter::new(path)?;

    while !importer.done() {
        importer.import_one(conn)?;
        log::info!("imported {:.0}%", importer.percent_done() * 100.0);
    }

    log::info!(
        "loaded {} tags from {}",
        importer.num_imported(),
        path.display()
    );
    Ok(importer.num_imported())
}
