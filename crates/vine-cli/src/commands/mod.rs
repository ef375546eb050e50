//! Command implementations and dispatch logic.
//!
//! This module contains all command handlers and the central dispatch system.
//! Each command is implemented as an async function that takes a CommandContext.

use chrono::{DateTime, Months, Utc};
use tracing::info;

use vine_core::error::{VineError, VineResult};
use vine_registry::client::RegistryClient;
use vine_registry::popularity::{PopularityClient, RegistryPackage};

pub mod containing;
pub mod depsearch;
pub mod reverse_deps;

#[cfg(test)]
mod tests;

use crate::output::OutputHandler;
use crate::{config, Commands};

/// Shared context for all commands
pub struct CommandContext {
    pub output: OutputHandler,
    pub registry: RegistryClient,
    pub popularity: PopularityClient,
}

impl CommandContext {
    /// Create a new command context
    pub fn new() -> VineResult<Self> {
        let output = OutputHandler::new();
        let registry = RegistryClient::new()?;
        let popularity = PopularityClient::new(config::popularity_cache_path())?;

        Ok(Self {
            output,
            registry,
            popularity,
        })
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> VineResult<()> {
    match command {
        Commands::Depsearch { needle, haystack } => {
            info!("Searching for {} within {}", needle, haystack);
            depsearch::execute(&needle, &haystack, ctx).await
        }
        Commands::PopularReverseDeps {
            package,
            recent_update,
            downloads,
            max_results,
        } => {
            info!("Searching reverse dependencies of {}", package);
            reverse_deps::execute(&package, recent_update, downloads, max_results, ctx).await
        }
        Commands::PopularPackagesContaining {
            package,
            recent_update,
            downloads,
            max_results,
        } => {
            info!("Searching popular packages containing {}", package);
            containing::execute(&package, recent_update, downloads, max_results, ctx).await
        }
    }
}

/// Split a `name[@version]` argument into name and version spec.
///
/// The version defaults to `latest`. Scoped packages keep their leading
/// `@`, so only an `@` past the first character separates the version:
/// `@types/node@20.0.0` splits into `@types/node` and `20.0.0`.
pub fn parse_package_spec(input: &str) -> VineResult<(String, String)> {
    let split = match input.rfind('@') {
        Some(idx) if idx > 0 => {
            let (name, version) = input.split_at(idx);
            (name, &version[1..])
        }
        _ => (input, "latest"),
    };

    let (name, version) = split;
    if name.is_empty() || name == "@" {
        return Err(VineError::InvalidPackageSpec {
            spec: input.to_string(),
            reason: "missing package name".to_string(),
        });
    }
    if version.is_empty() {
        return Err(VineError::InvalidPackageSpec {
            spec: input.to_string(),
            reason: "missing version after '@'".to_string(),
        });
    }

    Ok((name.to_string(), version.to_string()))
}

/// Clap value parser for `--recent-update` periods like `2y`, `6m`, `3w`,
/// or `10d`, yielding the cutoff timestamp.
pub fn parse_recency(value: &str) -> Result<DateTime<Utc>, String> {
    recency_cutoff(value, Utc::now())
}

fn recency_cutoff(value: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, String> {
    let value = value.trim();
    let (amount, unit) = value.split_at(value.len().saturating_sub(1));
    let n: u32 = amount
        .parse()
        .map_err(|_| format!("'{value}' is not a relative time like 2y, 6m, 3w, or 10d"))?;

    let cutoff = match unit {
        "y" | "Y" => now.checked_sub_months(Months::new(n * 12)),
        "m" | "M" => now.checked_sub_months(Months::new(n)),
        "w" | "W" => now.checked_sub_signed(chrono::Duration::weeks(i64::from(n))),
        "d" | "D" => now.checked_sub_signed(chrono::Duration::days(i64::from(n))),
        _ => return Err(format!("unknown time unit '{unit}' (expected y, m, w, or d)")),
    };

    cutoff.ok_or_else(|| format!("'{value}' is out of range"))
}

/// Apply the shared `--downloads` and `--recent-update` filters.
///
/// Packages missing the filtered field always pass; the filters only
/// exclude packages the API positively reports as below threshold or
/// older than the cutoff.
pub fn passes_filters(
    package: &RegistryPackage,
    min_downloads: Option<u64>,
    updated_since: Option<DateTime<Utc>>,
) -> bool {
    if let (Some(threshold), Some(downloads)) = (min_downloads, package.downloads) {
        if downloads < threshold {
            return false;
        }
    }

    if let (Some(cutoff), Some(published)) = (updated_since, package.published_at()) {
        if published < cutoff {
            return false;
        }
    }

    true
}
