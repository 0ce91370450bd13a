// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

use std::{fmt::Write as _, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use figment::Figment;
use mountpoint_config::{ConfigurationSection, RootConfig};
use mountpoint_handlers::{Outcome, Viewer};
use tokio::io::AsyncWriteExt;
use tracing::{info, info_span};

use crate::util::pipeline_from_config;

#[derive(Parser, Debug)]
pub(super) struct Options {
    #[command(subcommand)]
    subcommand: Subcommand,
}

#[derive(Parser, Debug)]
enum Subcommand {
    /// Print the installed rewrite rules, in priority order
    Routes,

    /// Show which mount captures a request path
    Match {
        /// The request path, with an optional query string
        path: String,
    },

    /// Resolve the assets of a mount and print the tags which would be
    /// included in the page
    Assets {
        /// The slug of the mount
        slug: String,
    },

    /// Handle a request and print the rendered page
    Render {
        /// The request path, with an optional query string
        path: String,

        /// Roles of the viewer
        #[arg(long = "role", action = clap::ArgAction::Append)]
        roles: Vec<String>,
    },
}

async fn print(output: &str) -> anyhow::Result<()> {
    tokio::io::stdout().write_all(output.as_bytes()).await?;
    Ok(())
}

impl Options {
    #[tracing::instrument(skip_all)]
    pub async fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        use Subcommand as SC;

        let config = RootConfig::extract(figment)
            .map_err(anyhow::Error::from_boxed)
            .context("could not load the configuration")?;
        let (pipeline, controller) = pipeline_from_config(&config)?;

        match self.subcommand {
            SC::Routes => {
                let _span = info_span!("cli.debug.routes").entered();

                let mut output = String::new();
                for rule in pipeline.rules().iter() {
                    writeln!(output, "{rule}")?;
                }
                print(&output).await?;
            }

            SC::Match { path } => {
                let _span = info_span!("cli.debug.match").entered();

                let request = pipeline.parse(&path, Viewer::anonymous());
                let Some(mount) = controller.matched(&request.vars) else {
                    info!(path = %request.path, "No mount captures this path");
                    return Ok(ExitCode::FAILURE);
                };

                let mut output = format!("mount: {}\n", mount.slug);
                for (name, value) in request.vars.iter() {
                    writeln!(output, "{name}={value}")?;
                }
                print(&output).await?;
            }

            SC::Assets { slug } => {
                let _span = info_span!("cli.debug.assets", %slug).entered();

                let mount = controller
                    .registry()
                    .get(slug.trim_matches('/'))
                    .with_context(|| format!("no mount with the slug {slug:?}"))?;

                let assets = controller.assets(mount).await;
                if assets.is_empty() {
                    info!("No asset found for this mount");
                }

                let mut output = assets.render_head();
                output.push_str(&assets.render_footer());
                print(&output).await?;
            }

            SC::Render { path, roles } => {
                let _span = info_span!("cli.debug.render").entered();

                match pipeline.handle(&path, Viewer::with_roles(roles)).await {
                    Outcome::Pass => {
                        info!("No mount captures this path, the host would handle it");
                        return Ok(ExitCode::FAILURE);
                    }
                    Outcome::Redirect { location } => {
                        info!(%location, "Request redirected");
                        print(&format!("{location}\n")).await?;
                    }
                    Outcome::Render { body } => print(&body).await?,
                }
            }
        }

        Ok(ExitCode::SUCCESS)
    }
}
