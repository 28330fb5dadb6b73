// src/template.rs
use anyhow::{Context, Result};
use chrono::Datelike;
use handlebars::Handlebars;
use serde_json::{json, Value};

use crate::ingest::types::Item;

const TEMPLATE_NAME: &str = "path";

/// A key/path template evaluated against an item.
///
/// Supports dotted field access over the item plus calendar accessors on the
/// publish timestamp, e.g.
/// `{{ published_parsed.utc.year }}/{{ published_parsed.utc.month }}/{{ published_parsed.utc.day }}`.
/// Parsed once at sink construction; rendering an item without a parseable
/// publish date against a timestamp-referencing template is an error the
/// caller reports per sink.
pub struct PathTemplate {
    registry: Handlebars<'static>,
}

impl PathTemplate {
    pub fn new(format: &str) -> Result<Self> {
        let mut registry = Handlebars::new();
        // Missing fields are errors, not silent empty segments.
        registry.set_strict_mode(true);
        // These render into keys and paths, not HTML.
        registry.register_escape_fn(handlebars::no_escape);
        registry
            .register_template_string(TEMPLATE_NAME, format)
            .with_context(|| format!("parsing template {format:?}"))?;
        Ok(Self { registry })
    }

    pub fn render(&self, item: &Item) -> Result<String> {
        let ctx = context(item)?;
        self.registry
            .render(TEMPLATE_NAME, &ctx)
            .context("rendering template against item")
    }
}

/// Template context: the item's fields, with `published_parsed` replaced by
/// calendar accessors in UTC. Month is the English month name, so a format
/// of year/month/day expands to e.g. `2024/August/30`.
fn context(item: &Item) -> Result<Value> {
    let mut ctx = serde_json::to_value(item)?;
    ctx["published_parsed"] = match item.published_parsed {
        Some(ts) => json!({
            "utc": {
                "year": ts.year(),
                "month": ts.format("%B").to_string(),
                "day": ts.day(),
            }
        }),
        None => Value::Null,
    };
    Ok(ctx)
}
