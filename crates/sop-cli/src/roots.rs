use std::env;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::CliResult;

pub const ALLOWED_ROOTS_VAR: &str = "SOP_EXPORT_ALLOWED_ROOTS";

/// Directories exports may be written under.
#[derive(Debug, Clone)]
pub struct AllowedRoots {
    roots: Vec<PathBuf>,
}

impl AllowedRoots {
    /// Reads `SOP_EXPORT_ALLOWED_ROOTS` (colon separated). Falls back to the
    /// current directory when the variable is unset or lists nothing.
    pub fn from_env() -> CliResult<Self> {
        let configured: Vec<PathBuf> = env::var_os(ALLOWED_ROOTS_VAR)
            .map(|value| {
                env::split_paths(&value)
                    .filter(|root| !root.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default();

        if configured.is_empty() {
            Self::new([env::current_dir()?])
        } else {
            Self::new(configured)
        }
    }

    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> CliResult<Self> {
        let roots = roots
            .into_iter()
            .map(|root| resolve_path(&root))
            .collect::<io::Result<Vec<_>>>()?;
        Ok(Self { roots })
    }

    /// Resolves `target` and accepts it only when it lies inside a root.
    pub fn check(&self, target: &Path) -> CliResult<PathBuf> {
        let resolved = resolve_path(target)?;
        match self.roots.iter().find(|root| resolved.starts_with(root)) {
            Some(root) => {
                debug!(dir = %resolved.display(), root = %root.display(), "output directory allowed");
                Ok(resolved)
            }
            None => Err(format!(
                "output directory '{}' is outside the allowed roots ({}); set {} to widen them",
                resolved.display(),
                env::join_paths(&self.roots)
                    .map(|joined| joined.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                ALLOWED_ROOTS_VAR,
            )
            .into()),
        }
    }
}

/// Canonical form of a path that may not exist yet: the deepest existing
/// ancestor is canonicalized and the missing tail appended. A tail that
/// climbs with `..` is refused.
fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()?.join(path)
    };

    let existing = absolute
        .ancestors()
        .find(|ancestor| ancestor.exists())
        .unwrap_or(Path::new("/"));
    let tail = absolute.strip_prefix(existing).map_err(io::Error::other)?;

    if tail
        .components()
        .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir))
    {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("'{}' climbs out of an unresolved directory", path.display()),
        ));
    }

    Ok(existing.canonicalize()?.join(tail))
}
