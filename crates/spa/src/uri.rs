// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use camino::Utf8Path;
use url::Url;

/// Make sure the given URL or path ends with exactly one `/`
#[must_use]
pub fn trailing_slash(value: &str) -> String {
    format!("{}/", value.trim_end_matches('/'))
}

/// Turn a manifest reference into a URL the browser can fetch.
///
/// References which are already absolute are returned as-is, others are
/// appended to the base URL.
#[must_use]
pub fn to_uri(reference: &str, base_url: &str) -> String {
    if reference.contains("://") {
        return reference.to_owned();
    }

    let mut uri = trailing_slash(base_url);
    uri.push_str(reference);
    uri
}

/// Infer the public URL of a local application directory, assuming it is
/// served under the host's asset base URL using its directory name.
#[must_use]
pub fn infer_base_url(directory: &Utf8Path, assets_base: &Url) -> String {
    let name = directory.file_name().unwrap_or_default();
    let mut url = trailing_slash(assets_base.as_str());
    url.push_str(name);
    trailing_slash(&url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_references_are_kept() {
        assert_eq!(
            to_uri("https://cdn.example/x.js", "https://base/"),
            "https://cdn.example/x.js"
        );
    }

    #[test]
    fn test_relative_references_use_one_separator() {
        assert_eq!(
            to_uri("static/x.js", "https://base"),
            "https://base/static/x.js"
        );
        assert_eq!(
            to_uri("static/x.js", "https://base/"),
            "https://base/static/x.js"
        );
        assert_eq!(
            to_uri("static/x.js", "https://base//"),
            "https://base/static/x.js"
        );
    }

    #[test]
    fn test_infer_base_url() {
        let assets_base = Url::parse("https://example.com/wp-content/plugins").unwrap();
        assert_eq!(
            infer_base_url(Utf8Path::new("/srv/plugins/dashboard/"), &assets_base),
            "https://example.com/wp-content/plugins/dashboard/"
        );

        let assets_base = Url::parse("https://example.com/assets/").unwrap();
        assert_eq!(
            infer_base_url(Utf8Path::new("apps/dashboard"), &assets_base),
            "https://example.com/assets/dashboard/"
        );
    }
}
