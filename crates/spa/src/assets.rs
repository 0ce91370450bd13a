// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::{collections::HashSet, fmt::Write as _};

use indexmap::{IndexMap, map::Entry};
use v_htmlescape::escape;

/// A script to include in the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDirective {
    /// Unique identifier of the script
    pub handle: String,

    /// URL of the script
    pub src: String,

    /// Handles of the scripts which must be loaded before this one
    pub dependencies: Vec<String>,

    /// Version appended to the URL, `None` when the file name already carries
    /// a content hash
    pub version: Option<String>,

    /// Whether the script is included at the end of the page
    pub in_footer: bool,
}

/// A stylesheet to include in the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDirective {
    /// Unique identifier of the stylesheet
    pub handle: String,

    /// URL of the stylesheet. `None` for a registration which only pulls in
    /// its dependencies
    pub src: Option<String>,

    /// Handles of the stylesheets which must be loaded before this one
    pub dependencies: Vec<String>,
}

/// Something which collects script and style inclusions
pub trait AssetQueue {
    /// Include a script
    fn enqueue_script(&mut self, script: ScriptDirective);

    /// Include a stylesheet
    fn enqueue_style(&mut self, style: StyleDirective);
}

/// In-memory [`AssetQueue`], which renders the collected directives as HTML
/// tags.
///
/// Enqueuing a second directive with an existing handle is a no-op: the first
/// registration is kept.
#[derive(Debug, Clone, Default)]
pub struct Assets {
    scripts: IndexMap<String, ScriptDirective>,
    styles: IndexMap<String, StyleDirective>,
}

impl AssetQueue for Assets {
    fn enqueue_script(&mut self, script: ScriptDirective) {
        match self.scripts.entry(script.handle.clone()) {
            Entry::Occupied(_) => {
                tracing::debug!(handle = %script.handle, src = %script.src, "Script handle already enqueued, ignoring");
            }
            Entry::Vacant(entry) => {
                entry.insert(script);
            }
        }
    }

    fn enqueue_style(&mut self, style: StyleDirective) {
        match self.styles.entry(style.handle.clone()) {
            Entry::Occupied(_) => {
                tracing::debug!(handle = %style.handle, "Style handle already enqueued, ignoring");
            }
            Entry::Vacant(entry) => {
                entry.insert(style);
            }
        }
    }
}

/// Sort items so that every dependency known to the queue comes before its
/// dependents. Dependencies not in the queue are provided by the host and
/// ignored. Cycles are broken at the first item visited twice.
fn dependency_order<'a, T>(
    items: &'a IndexMap<String, T>,
    dependencies: impl Fn(&T) -> &[String],
) -> Vec<&'a T> {
    fn visit<'a, T>(
        handle: &str,
        items: &'a IndexMap<String, T>,
        dependencies: &impl Fn(&T) -> &[String],
        seen: &mut HashSet<String>,
        out: &mut Vec<&'a T>,
    ) {
        let Some(item) = items.get(handle) else {
            return;
        };

        if !seen.insert(handle.to_owned()) {
            return;
        }

        for dependency in dependencies(item) {
            visit(dependency, items, dependencies, seen, out);
        }

        out.push(item);
    }

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for handle in items.keys() {
        visit(handle, items, &dependencies, &mut seen, &mut out);
    }
    out
}

impl Assets {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether nothing was enqueued
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty() && self.styles.is_empty()
    }

    /// Look up a script by its handle
    #[must_use]
    pub fn script(&self, handle: &str) -> Option<&ScriptDirective> {
        self.scripts.get(handle)
    }

    /// Look up a stylesheet by its handle
    #[must_use]
    pub fn style(&self, handle: &str) -> Option<&StyleDirective> {
        self.styles.get(handle)
    }

    /// The scripts, in dependency order
    #[must_use]
    pub fn scripts(&self) -> Vec<&ScriptDirective> {
        dependency_order(&self.scripts, |script| &script.dependencies)
    }

    /// The stylesheets, in dependency order
    #[must_use]
    pub fn styles(&self) -> Vec<&StyleDirective> {
        dependency_order(&self.styles, |style| &style.dependencies)
    }

    /// Render the tags which go in the `<head>` of the page: stylesheets and
    /// scripts not placed in the footer
    #[must_use]
    pub fn render_head(&self) -> String {
        let mut out = String::new();

        for style in self.styles() {
            let Some(src) = &style.src else {
                continue;
            };

            let _ = writeln!(
                out,
                r#"<link rel="stylesheet" id="{}-css" href="{}" />"#,
                escape(&style.handle),
                escape(src),
            );
        }

        for script in self.scripts().into_iter().filter(|s| !s.in_footer) {
            render_script(&mut out, script);
        }

        out
    }

    /// Render the tags which go at the end of the page
    #[must_use]
    pub fn render_footer(&self) -> String {
        let mut out = String::new();
        for script in self.scripts().into_iter().filter(|s| s.in_footer) {
            render_script(&mut out, script);
        }
        out
    }
}

fn render_script(out: &mut String, script: &ScriptDirective) {
    let src = match &script.version {
        Some(version) => {
            let separator = if script.src.contains('?') { '&' } else { '?' };
            format!("{}{separator}ver={version}", script.src)
        }
        None => script.src.clone(),
    };

    let _ = writeln!(
        out,
        r#"<script id="{}-js" src="{}" defer></script>"#,
        escape(&script.handle),
        escape(&src),
    );
}
