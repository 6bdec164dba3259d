// crates/adapt/src/render.rs

//! Page rendering for a selected template set.
//!
//! Templates are read from disk on every call; nothing is cached.

use crate::Error;
use domain::template::ThemeSelection;
use handlebars::{html_escape, Handlebars};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Page template, relative to a template-set directory.
pub const PAGE_TEMPLATE: &str = "templates/index.hbs";

#[derive(Debug, Serialize)]
struct PageModel<'a> {
    path: &'a str,
    template: &'a str,
    stylesheet: &'a str,
    microsite: Option<&'a str>,
}

/// Locate the page template for the selected stylesheet in the first root
/// that has one.
pub fn find_page_template(selection: &ThemeSelection, roots: &[PathBuf]) -> Option<PathBuf> {
    roots
        .iter()
        .map(|root| root.join(&selection.stylesheet).join(PAGE_TEMPLATE))
        .find(|p| p.is_file())
}

/// Render the page for `path` with the selected template set.
///
/// Falls back to a minimal built-in page when the template set has no page
/// template.
#[tracing::instrument(skip_all, fields(stylesheet = %selection.stylesheet))]
pub fn render_page(selection: &ThemeSelection, roots: &[PathBuf], path: &str) -> Result<String, Error> {
    let model = PageModel {
        path,
        template: &selection.template,
        stylesheet: &selection.stylesheet,
        microsite: selection.microsite.as_deref(),
    };

    match find_page_template(selection, roots) {
        Some(template_path) => render_file(&template_path, &model),
        None => {
            tracing::debug!("no page template; using built-in page");
            Ok(fallback_page(&model))
        }
    }
}

fn render_file(template_path: &Path, model: &PageModel<'_>) -> Result<String, Error> {
    let src = fs::read_to_string(template_path)?;
    let hbs = Handlebars::new();
    Ok(hbs.render_template(&src, model)?)
}

fn fallback_page(model: &PageModel<'_>) -> String {
    format!(
        "<!doctype html>\n<html><head><title>{path}</title></head>\
         <body data-template=\"{template}\" data-stylesheet=\"{stylesheet}\">\
         <p>/{path}</p></body></html>\n",
        path = html_escape(model.path),
        template = html_escape(model.template),
        stylesheet = html_escape(model.stylesheet),
    )
}
