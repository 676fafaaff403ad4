use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::model::SourceCategory;

#[derive(Debug, Clone, Copy)]
enum Field {
    Slug,
    Name,
    Parent,
}

/// Read the category taxonomy from a WordPress export (WXR) file.
pub fn load_categories(path: &Path) -> Result<Vec<SourceCategory>> {
    let xml = fs::read_to_string(path)
        .with_context(|| format!("Failed to read export {}", path.display()))?;
    let categories = parse_categories(&xml)
        .with_context(|| format!("Failed to parse categories from {}", path.display()))?;

    info!(count = categories.len(), "Loaded export categories");
    Ok(categories)
}

/// Collect `<wp:category>` terms in document order.
///
/// Terms without a nicename are dropped since they cannot be matched.
pub fn parse_categories(xml: &str) -> Result<Vec<SourceCategory>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut categories = Vec::new();
    let mut current: Option<SourceCategory> = None;
    let mut field: Option<Field> = None;

    loop {
        let text = match reader.read_event()? {
            Event::Start(e) => {
                match e.name().as_ref() {
                    b"wp:category" => {
                        current = Some(SourceCategory {
                            term_slug: String::new(),
                            term_name: Vec::new(),
                            term_parent: String::new(),
                        });
                    }
                    b"wp:category_nicename" => field = Some(Field::Slug),
                    b"wp:category_parent" => field = Some(Field::Parent),
                    b"wp:cat_name" => {
                        field = Some(Field::Name);
                        if let Some(category) = current.as_mut() {
                            category.term_name.push(String::new());
                        }
                    }
                    _ => {}
                }
                continue;
            }
            Event::End(e) => {
                if e.name().as_ref() == b"wp:category" {
                    if let Some(category) = current.take() {
                        if !category.term_slug.is_empty() {
                            categories.push(category);
                        }
                    }
                }
                field = None;
                continue;
            }
            Event::Text(t) => t.unescape()?.into_owned(),
            Event::CData(t) => String::from_utf8_lossy(&t.into_inner()).into_owned(),
            Event::Eof => break,
            _ => continue,
        };

        let (Some(category), Some(field)) = (current.as_mut(), field) else {
            continue;
        };
        match field {
            Field::Slug => category.term_slug.push_str(&text),
            Field::Parent => category.term_parent.push_str(&text),
            Field::Name => {
                if let Some(name) = category.term_name.last_mut() {
                    name.push_str(&text);
                }
            }
        }
    }

    Ok(categories)
}
