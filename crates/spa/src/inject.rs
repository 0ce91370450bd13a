// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::sync::LazyLock;

use indexmap::IndexSet;
use regex::Regex;

use crate::{
    assets::{AssetQueue, ScriptDirective, StyleDirective},
    uri::to_uri,
};

static PRIMARY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("(runtime|bundle)").expect("valid regex"));

/// What kind of file a manifest entry points to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// A `.js` file
    Script,

    /// A `.css` file
    Style,

    /// Anything else: source maps, images, fonts…
    Ignored,
}

impl AssetKind {
    /// Classify a reference by its file extension
    #[must_use]
    pub fn classify(reference: &str) -> Self {
        if reference.ends_with(".js") {
            Self::Script
        } else if reference.ends_with(".css") {
            Self::Style
        } else {
            Self::Ignored
        }
    }
}

/// Whether a bundle is the one loaded first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetRole {
    /// The runtime bundle, which others implicitly depend on
    Primary,

    /// Any other bundle
    Secondary,
}

impl AssetRole {
    /// Detect the runtime bundle by its name
    #[must_use]
    pub fn detect(reference: &str) -> Self {
        if PRIMARY_PATTERN.is_match(reference) {
            Self::Primary
        } else {
            Self::Secondary
        }
    }
}

/// A manifest entry, resolved to a URL and a handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    /// The URL of the asset
    pub uri: String,

    /// The kind of asset
    pub kind: AssetKind,

    /// The role of the asset
    pub role: AssetRole,

    /// The handle under which it is enqueued
    pub handle: String,
}

/// Options of [`inject`]
#[derive(Debug, Clone, Default)]
pub struct InjectOptions {
    /// URL prepended to relative references
    pub base_url: String,

    /// Handle of the primary bundle, and prefix of the others
    pub handle: String,

    /// Scripts every bundle depends on
    pub script_dependencies: Vec<String>,

    /// Stylesheets every bundle depends on
    pub style_dependencies: Vec<String>,
}

/// Turn a file name into a handle-safe key: lowercase, and only
/// `[a-z0-9_-]`
#[must_use]
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .collect()
}

fn basename(reference: &str) -> &str {
    reference
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(reference)
}

fn dedup<'a>(values: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    values
        .into_iter()
        .cloned()
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Classify the manifest references and compute their URLs and handles.
///
/// Ignored references are kept in the output so callers can report them.
#[must_use]
pub fn resolve<S: AsRef<str>>(references: &[S], options: &InjectOptions) -> Vec<ResolvedAsset> {
    references
        .iter()
        .map(|reference| {
            let reference = reference.as_ref();
            let role = AssetRole::detect(reference);
            let handle = match role {
                AssetRole::Primary => options.handle.clone(),
                AssetRole::Secondary => format!(
                    "{}-{}",
                    options.handle,
                    sanitize_key(basename(reference))
                ),
            };

            ResolvedAsset {
                uri: to_uri(reference, &options.base_url),
                kind: AssetKind::classify(reference),
                role,
                handle,
            }
        })
        .collect()
}

/// Enqueue the scripts and stylesheets of a local build.
///
/// Scripts are placed in the footer and get no version, as the file names
/// already carry a content hash. When the manifest contains a runtime bundle,
/// every other script depends on it. If the manifest has no stylesheet at all,
/// an empty stylesheet is still registered so that the style dependencies get
/// loaded.
pub fn inject<Q, S>(references: &[S], options: &InjectOptions, queue: &mut Q)
where
    Q: AssetQueue + ?Sized,
    S: AsRef<str>,
{
    let script_dependencies = dedup(&options.script_dependencies);
    let assets = resolve(references, options);

    let has_primary_script = assets
        .iter()
        .any(|asset| asset.kind == AssetKind::Script && asset.role == AssetRole::Primary);

    let mut has_style = false;

    for asset in assets {
        match asset.kind {
            AssetKind::Ignored => {
                tracing::trace!(uri = %asset.uri, "Skipping asset");
            }

            AssetKind::Script => {
                let mut dependencies = script_dependencies.clone();
                if has_primary_script
                    && asset.role == AssetRole::Secondary
                    && !dependencies.contains(&options.handle)
                {
                    dependencies.push(options.handle.clone());
                }

                queue.enqueue_script(ScriptDirective {
                    handle: asset.handle,
                    src: asset.uri,
                    dependencies,
                    version: None,
                    in_footer: true,
                });
            }

            AssetKind::Style => {
                has_style = true;
                queue.enqueue_style(StyleDirective {
                    handle: asset.handle,
                    src: Some(asset.uri),
                    dependencies: options.style_dependencies.clone(),
                });
            }
        }
    }

    if !has_style {
        queue.enqueue_style(StyleDirective {
            handle: options.handle.clone(),
            src: None,
            dependencies: options.style_dependencies.clone(),
        });
    }
}

/// Enqueue the assets listed by a remote manifest.
///
/// Every asset is enqueued on its own, under a handle derived from its file
/// name, with no dependency.
pub fn inject_remote<Q, S>(urls: &[S], queue: &mut Q)
where
    Q: AssetQueue + ?Sized,
    S: AsRef<str>,
{
    for url in urls {
        let url = url.as_ref();
        let handle = sanitize_key(basename(url));

        match AssetKind::classify(url) {
            AssetKind::Script => queue.enqueue_script(ScriptDirective {
                handle,
                src: url.to_owned(),
                dependencies: Vec::new(),
                version: None,
                in_footer: true,
            }),
            AssetKind::Style => queue.enqueue_style(StyleDirective {
                handle,
                src: Some(url.to_owned()),
                dependencies: Vec::new(),
            }),
            AssetKind::Ignored => {}
        }
    }
}
