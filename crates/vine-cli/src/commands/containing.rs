//! `vine popular-packages-containing` implementation.
//!
//! Fetches the most popular packages, resolves each one's full dependency
//! tree concurrently, and reports every tree that contains the searched
//! package anywhere in it, along with the dependency paths leading there.

use chrono::{DateTime, Utc};
use futures_util::stream::{FuturesUnordered, StreamExt};

use vine_core::error::VineResult;
use vine_registry::popularity::RegistryPackage;
use vine_resolver::engine::resolve_tree;
use vine_resolver::tree::DepGraph;

use super::CommandContext;
use crate::output::progress::ProgressBar;

pub async fn execute(
    package: &str,
    recent_update: Option<DateTime<Utc>>,
    downloads: Option<u64>,
    max_results: usize,
    ctx: &CommandContext,
) -> VineResult<()> {
    let popular = ctx.popularity.fetch_popular_packages(max_results).await?;

    let candidates: Vec<RegistryPackage> = popular
        .into_iter()
        .filter(|pkg| super::passes_filters(pkg, downloads, recent_update))
        .collect();

    if candidates.is_empty() {
        ctx.output
            .result("No popular packages matched the given filters.");
        return Ok(());
    }

    ctx.output.info(&format!(
        "Resolving {} popular package trees...",
        candidates.len()
    ));

    let mut progress = ProgressBar::new(candidates.len() as u64, "Resolving".to_string());
    let mut pending: FuturesUnordered<_> = candidates
        .iter()
        .map(|pkg| async move { (pkg, resolve_tree(&ctx.registry, &pkg.name, "latest").await) })
        .collect();

    let mut afflicted: Vec<DepGraph> = Vec::new();
    let mut failed: Vec<&str> = Vec::new();
    while let Some((pkg, result)) = pending.next().await {
        match result {
            Ok(tree) if tree.contains_package(package) => afflicted.push(tree),
            Ok(_) => {}
            Err(_) => failed.push(&pkg.name),
        }
        progress.increment();
    }
    progress.finish();

    for name in failed {
        ctx.output
            .warn(&format!("Error fetching metadata for {name}"));
    }

    if afflicted.is_empty() {
        ctx.output.result(&format!(
            "\"{package}\" doesn't appear to be contained in any popular packages."
        ));
        return Ok(());
    }

    for tree in &afflicted {
        let root_name = tree.root_manifest().map_or(tree.root(), |root| root.name());
        ctx.output.result(&format!("{root_name}:"));
        for path in tree.find_paths_to(package) {
            ctx.output.result(&format!("    {}", path.join(" -> ")));
        }
    }

    Ok(())
}
