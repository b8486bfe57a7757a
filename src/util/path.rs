use std::ffi::OsStr;
use std::path::Path;

/// Extension of corpus source files.
pub const CORPUS_EXTENSION: &str = "txt";

pub trait PathExt {
    fn is_corpus_file(&self) -> bool;
}

impl PathExt for Path {
    fn is_corpus_file(&self) -> bool {
        self.extension() == Some(OsStr::new(CORPUS_EXTENSION))
    }
}

/// Expand environment variables in a path string.
///
/// Supports `$VAR`, `${VAR}` and `~`. Unresolvable input is returned unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
