//! `vine depsearch` implementation.
//!
//! Resolves the full dependency tree of the haystack package and prints
//! every path from the root to any version of the needle package.

use vine_core::error::VineResult;
use vine_resolver::engine::resolve_tree;

use super::CommandContext;

pub async fn execute(needle: &str, haystack: &str, ctx: &CommandContext) -> VineResult<()> {
    let (name, version) = super::parse_package_spec(haystack)?;

    ctx.output.info("Resolving...");
    let tree = resolve_tree(&ctx.registry, &name, &version).await?;

    ctx.output.info("Finding paths...");
    let paths = tree.find_paths_to(needle);

    if paths.is_empty() {
        ctx.output
            .result(&format!("\"{needle}\" was not found in \"{haystack}\"."));
        return Ok(());
    }

    for path in &paths {
        ctx.output.result(&path.join(" -> "));
    }
    ctx.output.success(&format!(
        "Found {} path{} to \"{needle}\".",
        paths.len(),
        if paths.len() == 1 { "" } else { "s" }
    ));

    Ok(())
}
