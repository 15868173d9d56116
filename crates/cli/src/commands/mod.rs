pub mod gstr2a;
pub mod headers;
pub mod statement;

use std::path::Path;

use anyhow::{Context, Result};
use ledgerbridge_import::{DocumentKind, ImportProfile, MappingChoices, TargetField};

/// The profile at `path`, or defaults for `kind`. A profile written for the
/// other document kind is rejected.
pub fn load_profile(path: Option<&Path>, kind: DocumentKind) -> Result<ImportProfile> {
    let Some(path) = path else {
        return Ok(ImportProfile::for_kind(kind));
    };
    let profile = ImportProfile::load(path)
        .with_context(|| format!("Failed to load profile {}", path.display()))?;
    anyhow::ensure!(
        profile.kind == kind,
        "Profile '{}' is for {}, not {}",
        profile.name,
        profile.kind,
        kind
    );
    Ok(profile)
}

pub fn choices_from(map: Vec<(TargetField, String)>) -> MappingChoices {
    map.into_iter().collect()
}
