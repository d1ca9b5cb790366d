//! A concrete [`FixtureIndex`] for the CLI's `eval` subcommand.
//!
//! The evaluation harness's index-file schema is undeclared upstream (see
//! `pipeline-eval`'s own `FixtureIndex` trait); this is simply *a* format
//! the CLI knows how to read so the `eval` subcommand has something real to
//! drive -- a JSON array of objects, each mapping a bundle key (`SRC`, and
//! whatever else a component's fixtures carry) to a path relative to the
//! testset directory.

use std::collections::HashMap;
use std::io::{Error as IoError, ErrorKind};
use std::path::{Path, PathBuf};

use pipeline_eval::{EvalError, FixtureBundle, FixtureIndex};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RawBundle(HashMap<String, String>);

pub struct JsonFixtureIndex {
    testset_dir: PathBuf,
}

impl JsonFixtureIndex {
    pub fn new(testset_dir: PathBuf) -> JsonFixtureIndex {
        JsonFixtureIndex { testset_dir }
    }
}

impl FixtureIndex for JsonFixtureIndex {
    fn enumerate(&self, index_file: &Path) -> Result<Vec<FixtureBundle>, EvalError> {
        let path = self.testset_dir.join(index_file);
        let text = std::fs::read_to_string(&path)?;
        let raw: Vec<RawBundle> =
            serde_json::from_str(&text).map_err(|source| EvalError::Io(IoError::new(ErrorKind::InvalidData, source)))?;

        Ok(raw
            .into_iter()
            .map(|RawBundle(fields)| {
                fields
                    .into_iter()
                    .map(|(key, value)| (key, self.testset_dir.join(value)))
                    .collect()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_bundle_paths_relative_to_testset_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("clip.wav"), b"fake audio").unwrap();
        std::fs::write(dir.path().join("index.json"), r#"[{"SRC": "clip.wav"}]"#).unwrap();

        let index = JsonFixtureIndex::new(dir.path().to_path_buf());
        let bundles = index.enumerate(Path::new("index.json")).unwrap();

        assert_eq!(bundles.len(), 1);
        assert_eq!(bundles[0]["SRC"], dir.path().join("clip.wav"));
    }
}
