use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::EvalError;

/// One enumerated fixture: named input/output file paths. Always expected to
/// carry a `SRC` entry once validated by [`crate::plan_evaluations`].
pub type FixtureBundle = HashMap<String, PathBuf>;

/// The evaluation harness's index-file schema is undocumented upstream and
/// is deliberately never parsed by this crate. A caller supplies an
/// implementation that knows how to enumerate one `index_file` into its
/// fixture bundles; this crate only consumes the result.
pub trait FixtureIndex {
    fn enumerate(&self, index_file: &Path) -> Result<Vec<FixtureBundle>, EvalError>;
}

impl<F> FixtureIndex for F
where
    F: Fn(&Path) -> Result<Vec<FixtureBundle>, EvalError>,
{
    fn enumerate(&self, index_file: &Path) -> Result<Vec<FixtureBundle>, EvalError> {
        self(index_file)
    }
}

/// Copy every file referenced by `bundle` into `dest_dir`, preserving file
/// names, and return a bundle pointing at the copies. The evaluation planner
/// always runs against a host-visible copy rather than the index's own
/// paths, which may not be reachable from wherever the launch plan executes.
pub fn copy_fixture_files(bundle: &FixtureBundle, dest_dir: &Path) -> Result<FixtureBundle, EvalError> {
    std::fs::create_dir_all(dest_dir)?;
    let mut copied = FixtureBundle::new();
    for (key, path) in bundle {
        let file_name = path.file_name().ok_or_else(|| EvalError::InvalidFixturePath { path: path.clone() })?;
        let dest = dest_dir.join(file_name);
        std::fs::copy(path, &dest)?;
        copied.insert(key.clone(), dest);
    }
    Ok(copied)
}

/// A fixed list of bundles, for tests and for harnesses that enumerate
/// fixtures up front rather than lazily.
#[derive(Debug, Clone, Default)]
pub struct StaticFixtureIndex {
    bundles: Vec<FixtureBundle>,
}

impl StaticFixtureIndex {
    pub fn new(bundles: Vec<FixtureBundle>) -> StaticFixtureIndex {
        StaticFixtureIndex { bundles }
    }
}

impl FixtureIndex for StaticFixtureIndex {
    fn enumerate(&self, _index_file: &Path) -> Result<Vec<FixtureBundle>, EvalError> {
        Ok(self.bundles.clone())
    }
}
