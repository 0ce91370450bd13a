// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use mountpoint_data_model::{Mount, MountRegistry, QueryMode};
use thiserror::Error;

use crate::{QueryVariables, QueryVars, RewriteRule, RouteTable};

/// Error returned when the rules of a mount can't be built
#[derive(Debug, Error)]
#[error("could not build the rewrite rules of mount {slug:?}")]
pub struct RouteError {
    slug: String,

    #[source]
    source: regex::Error,
}

/// The rewrite rules capturing the requests of a mount
#[derive(Debug, Clone)]
pub struct MountRoutes {
    /// The query variable flagging the requests of the mount
    pub marker: String,

    /// Matches the slug itself, inserted in front of every other rule
    pub exact: RewriteRule,

    /// Matches everything under the slug except the excluded sub-paths
    pub catch_all: RewriteRule,
}

impl MountRoutes {
    /// Build the rules of a mount
    ///
    /// # Errors
    ///
    /// Returns an error if the rules could not be compiled
    pub fn for_mount(mount: &Mount) -> Result<Self, RouteError> {
        let marker = mount.marker();
        let slug = regex::escape(&mount.slug);
        let error = |source| RouteError {
            slug: mount.slug.clone(),
            source,
        };

        let exact = RewriteRule::new(&format!("^{slug}/?$"), [(marker.as_str(), "1")])
            .map_err(error)?;

        let mut catch_all = RewriteRule::new(&format!("^{slug}/(.*)$"), [(marker.as_str(), "1")])
            .map_err(error)?;

        let excluded: Vec<_> = mount
            .excluded_subpaths
            .iter()
            .map(|subpath| subpath.trim_matches('/'))
            .filter(|subpath| !subpath.is_empty())
            .map(regex::escape)
            .collect();

        if !excluded.is_empty() {
            let excluded = excluded.join("|");
            catch_all = catch_all
                .with_exclusion(&format!("^{slug}/(?:{excluded})"))
                .map_err(error)?;
        }

        Ok(Self {
            marker,
            exact,
            catch_all,
        })
    }
}

impl MountRoutes {
    /// Install the rules in the host's tables: the marker becomes a public
    /// query variable, the exact rule goes in front of every other rule and
    /// the catch-all rule on top of the host's own rules
    pub fn install<H>(self, host: &mut H)
    where
        H: RouteTable + QueryVariables + ?Sized,
    {
        tracing::debug!(
            marker = %self.marker,
            exact = %self.exact,
            catch_all = %self.catch_all,
            "Installing mount rewrite rules",
        );

        host.register(&self.marker);
        host.prepend(self.exact);
        host.add_top(self.catch_all);
    }
}

/// Install the rules of a mount in the host's tables
///
/// # Errors
///
/// Returns an error if the rules could not be compiled
pub fn register_mount<H>(mount: &Mount, host: &mut H) -> Result<(), RouteError>
where
    H: RouteTable + QueryVariables + ?Sized,
{
    MountRoutes::for_mount(mount)?.install(host);
    Ok(())
}

/// Install the rules of every registered mount.
///
/// Every rule is built before the first one is installed, so the host's
/// tables are left untouched on error.
///
/// # Errors
///
/// Returns an error if the rules of a mount could not be compiled
pub fn register_all<H>(registry: &MountRegistry, host: &mut H) -> Result<(), RouteError>
where
    H: RouteTable + QueryVariables + ?Sized,
{
    let routes = registry
        .iter()
        .map(MountRoutes::for_mount)
        .collect::<Result<Vec<_>, _>>()?;

    for routes in routes {
        routes.install(host);
    }

    Ok(())
}

/// In collapsed mode, reduce the query variables of a request captured by the
/// mount to the marker alone.
///
/// Returns `None` when the request isn't captured by the mount, or when the
/// mount preserves the host's variables.
#[must_use]
pub fn collapse_query(mount: &Mount, vars: &QueryVars) -> Option<QueryVars> {
    if mount.query_mode != QueryMode::Collapse {
        return None;
    }

    let marker = mount.marker();
    vars.is_truthy(&marker).then(|| vars.only(&marker))
}

/// The canonical shape of a path captured by a mount: a leading `/`, no empty
/// segment, no trailing `/`
#[must_use]
pub fn canonical_path(path: &str) -> String {
    let segments: Vec<_> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use mountpoint_data_model::{Access, MountSource};

    use super::*;
    use crate::{QueryVarNames, RewriteRules};

    #[derive(Default)]
    struct Host {
        rules: RewriteRules,
        vars: QueryVarNames,
    }

    impl RouteTable for Host {
        fn prepend(&mut self, rule: RewriteRule) {
            self.rules.prepend(rule);
        }

        fn add_top(&mut self, rule: RewriteRule) {
            self.rules.add_top(rule);
        }
    }

    impl QueryVariables for Host {
        fn register(&mut self, name: &str) {
            self.vars.register(name);
        }
    }

    fn mount(slug: &str) -> Mount {
        Mount::new(slug, "root", MountSource::parse("/srv/app"), Access::Public)
    }

    fn install(registry: &MountRegistry) -> (RewriteRules, QueryVarNames) {
        let mut host = Host::default();
        host.rules
            .add_host(RewriteRule::new("^(.+?)/?$", [("pagename", "1")]).unwrap());
        register_all(registry, &mut host).unwrap();
        (host.rules, host.vars)
    }

    fn captures(rules: &RewriteRules, path: &str, marker: &str) -> bool {
        rules.resolve(path).is_some_and(|vars| vars.is_truthy(marker))
    }

    #[test]
    fn test_slug_and_children_are_captured() {
        let mut registry = MountRegistry::new();
        registry
            .register(mount("app").with_excluded_subpaths(["admin-page", "/about/"]))
            .unwrap();
        let (rules, vars) = install(&registry);

        assert!(vars.contains("spa_mount_app"));

        assert!(captures(&rules, "/app", "spa_mount_app"));
        assert!(captures(&rules, "/app/", "spa_mount_app"));
        assert!(captures(&rules, "/app/settings/profile", "spa_mount_app"));

        // Excluded sub-paths fall through to the host
        assert!(!captures(&rules, "/app/admin-page", "spa_mount_app"));
        assert!(!captures(&rules, "/app/about", "spa_mount_app"));
        assert!(rules.resolve("/app/admin-page").unwrap().is_truthy("pagename"));

        // Other paths are left alone
        assert!(!captures(&rules, "/application", "spa_mount_app"));
        assert!(!captures(&rules, "/blog/app", "spa_mount_app"));
    }

    #[test]
    fn test_slug_is_escaped() {
        let mut registry = MountRegistry::new();
        registry.register(mount("v1.0")).unwrap();
        let (rules, _) = install(&registry);

        assert!(captures(&rules, "/v1.0/x", "spa_mount_v1_0"));
        assert!(!captures(&rules, "/v1x0/x", "spa_mount_v1_0"));
    }

    #[test]
    fn test_nested_mounts() {
        let mut registry = MountRegistry::new();
        registry
            .register(mount("app").with_excluded_subpaths(["admin"]))
            .unwrap();
        registry.register(mount("app/admin")).unwrap();
        let (rules, _) = install(&registry);

        assert!(captures(&rules, "/app/admin/users", "spa_mount_app_admin"));
        assert!(captures(&rules, "/app/admin", "spa_mount_app_admin"));
        assert!(captures(&rules, "/app/home", "spa_mount_app"));
    }

    #[test]
    fn test_collapse_query() {
        let remote = Mount::new(
            "app",
            "root",
            MountSource::parse("https://apps.example.com/app"),
            Access::Public,
        );
        let vars: QueryVars = [("paged", "2"), ("spa_mount_app", "1"), ("p", "12")]
            .into_iter()
            .collect();

        let collapsed = collapse_query(&remote, &vars).unwrap();
        assert_eq!(collapsed.iter().collect::<Vec<_>>(), [("spa_mount_app", "1")]);

        // Not captured
        let other: QueryVars = [("paged", "2")].into_iter().collect();
        assert!(collapse_query(&remote, &other).is_none());

        // Preserving mount
        let local = remote.with_query_mode(QueryMode::Preserve);
        assert!(collapse_query(&local, &vars).is_none());
    }

    #[test]
    fn test_canonical_path() {
        assert_eq!(canonical_path("/app/"), "/app");
        assert_eq!(canonical_path("/app//users/12/"), "/app/users/12");
        assert_eq!(canonical_path("app"), "/app");
        assert_eq!(canonical_path("/app/users"), "/app/users");
    }
}
