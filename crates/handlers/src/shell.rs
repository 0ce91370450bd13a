// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use mountpoint_spa::Assets;
use v_htmlescape::escape;

use crate::PageShell;

/// A bare HTML document, used when the host has no theme of its own
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultShell {
    title: String,
    lang: String,
    home_url: String,
}

impl Default for DefaultShell {
    fn default() -> Self {
        Self::new("", "en", "/")
    }
}

impl DefaultShell {
    /// Create a new shell
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        lang: impl Into<String>,
        home_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            lang: lang.into(),
            home_url: home_url.into(),
        }
    }
}

impl PageShell for DefaultShell {
    fn header(&self, assets: &Assets) -> String {
        format!(
            "<!DOCTYPE html>\n\
             <html lang=\"{lang}\">\n\
             <head>\n\
             <meta charset=\"utf-8\" />\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n\
             <title>{title}</title>\n\
             {head}\
             </head>\n\
             <body>\n",
            lang = escape(&self.lang),
            title = escape(&self.title),
            head = assets.render_head(),
        )
    }

    fn footer(&self, assets: &Assets) -> String {
        format!("\n{}</body>\n</html>\n", assets.render_footer())
    }

    fn home_url(&self) -> &str {
        &self.home_url
    }
}

#[cfg(test)]
mod tests {
    use mountpoint_spa::{AssetQueue, ScriptDirective, StyleDirective};

    use super::*;

    #[test]
    fn test_empty_page() {
        let shell = DefaultShell::new("Tom & Jerry", "en-GB", "/");
        let assets = Assets::new();

        insta::assert_snapshot!(format!("{}<div id='root'></div>{}", shell.header(&assets), shell.footer(&assets)), @r#"
        <!DOCTYPE html>
        <html lang="en-GB">
        <head>
        <meta charset="utf-8" />
        <meta name="viewport" content="width=device-width, initial-scale=1" />
        <title>Tom &amp; Jerry</title>
        </head>
        <body>
        <div id='root'></div>
        </body>
        </html>
        "#);
    }

    #[test]
    fn test_assets_placement() {
        let shell = DefaultShell::default();
        let mut assets = Assets::new();
        assets.enqueue_style(StyleDirective {
            handle: "app".to_owned(),
            src: Some("/main.css".to_owned()),
            dependencies: Vec::new(),
        });
        assets.enqueue_script(ScriptDirective {
            handle: "app".to_owned(),
            src: "/main.js".to_owned(),
            dependencies: Vec::new(),
            version: None,
            in_footer: true,
        });

        let header = shell.header(&assets);
        let footer = shell.footer(&assets);
        assert!(header.contains(r#"<link rel="stylesheet" id="app-css""#));
        assert!(!header.contains("<script"));
        assert!(footer.contains(r#"<script id="app-js""#));
        assert_eq!(shell.home_url(), "/");
    }
}
