//! `vine popular-reverse-deps` implementation.
//!
//! Fetches the dependent packages reported by the popularity API, applies
//! the download and recency filters, then confirms each candidate by
//! resolving its latest manifest and checking that it really declares the
//! dependency. Failures for individual candidates are warned about and
//! skipped, never fatal.

use chrono::{DateTime, Utc};
use futures_util::future::join_all;

use vine_core::error::VineResult;
use vine_registry::popularity::RegistryPackage;
use vine_resolver::engine::PackageResolver;

use super::CommandContext;

pub async fn execute(
    package: &str,
    recent_update: Option<DateTime<Utc>>,
    downloads: Option<u64>,
    max_results: usize,
    ctx: &CommandContext,
) -> VineResult<()> {
    let dependents = ctx
        .popularity
        .fetch_dependent_packages(package, max_results)
        .await?;

    let candidates: Vec<RegistryPackage> = dependents
        .into_iter()
        .filter(|pkg| super::passes_filters(pkg, downloads, recent_update))
        .collect();

    if candidates.is_empty() {
        ctx.output.result(&format!(
            "\"{package}\" doesn't appear to have any popular reverse dependencies."
        ));
        ctx.output
            .info("Note that the ecosyste.ms API doesn't seem to return accurate results,");
        ctx.output.info("so this may omit many packages.");
        return Ok(());
    }

    ctx.output.info(&format!(
        "Fetched {} packages. Resolving dependencies...",
        candidates.len()
    ));

    // The dependent list is advisory; confirm each candidate against its
    // actual latest manifest.
    let checks = candidates.iter().map(|pkg| async {
        match ctx.registry.resolve(&pkg.name, "latest").await {
            Ok(resolution) => resolution
                .manifest
                .is_some_and(|manifest| manifest.declares_dependency(package)),
            Err(_) => {
                ctx.output
                    .warn(&format!("Error fetching metadata for {}", pkg.name));
                false
            }
        }
    });
    let confirmed = join_all(checks).await;

    let real_dependents: Vec<&RegistryPackage> = candidates
        .iter()
        .zip(confirmed)
        .filter_map(|(pkg, is_real)| is_real.then_some(pkg))
        .collect();

    if real_dependents.is_empty() {
        ctx.output.result(&format!(
            "None of the candidates actually depend on \"{package}\"."
        ));
        return Ok(());
    }

    for pkg in &real_dependents {
        ctx.output.result(&describe_package(pkg));
    }
    ctx.output.success(&format!(
        "{} package{} depend{} on \"{package}\".",
        real_dependents.len(),
        if real_dependents.len() == 1 { "" } else { "s" },
        if real_dependents.len() == 1 { "s" } else { "" },
    ));

    Ok(())
}

fn describe_package(pkg: &RegistryPackage) -> String {
    let mut line = pkg.name.clone();
    if let Some(downloads) = pkg.downloads {
        line.push_str(&format!(" ({downloads} downloads)"));
    }
    if let Some(published) = pkg.published_at() {
        line.push_str(&format!(", updated {}", published.format("%Y-%m-%d")));
    }
    line
}
