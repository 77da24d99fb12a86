// Copyright 2023 Remi Bernotavicius

use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tag {
    pub name: String,
    pub color: String,
    pub slug: String,
}

pub fn decode_tags_from_path(path: impl AsRef<Path>) -> crate::Result<Vec<Tag>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[test]
fn decode_tags() {
    let tags: Vec<Tag> = serde_json::from_str(
        r##"[
            {"name": "Breakfast", "color": "#E26C2D", "slug": "breakfast"},
            {"name": "Lunch", "color": "#49B64E", "slug": "lunch", "extra": 1}
        ]"##,
    )
    .unwrap();
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[1].slug, "lunch");

    let missing_color = serde_json::from_str::<Vec<Tag>>(r#"[{"name": "x", "slug": "x"}]"#);
    assert!(missing_color.is_err());
}
