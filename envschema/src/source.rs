//! Environment snapshots
//!
//! Loading never reads the process environment implicitly: facades take an
//! [`EnvSnapshot`], so tests can supply synthetic environments without
//! touching global state.

use crate::error::SourceError;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// An immutable copy of environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Snapshot the current process environment.
    ///
    /// Entries whose key or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }

    /// Parse the contents of a `.env` file.
    ///
    /// Supports blank lines, `#` comments, an optional `export ` prefix and
    /// single- or double-quoted values.
    ///
    /// # Errors
    ///
    /// [`SourceError::Syntax`] for a line without `=` or with an empty key.
    pub fn from_dotenv_str(contents: &str) -> Result<Self, SourceError> {
        let mut vars = BTreeMap::new();

        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=').ok_or_else(|| SourceError::Syntax {
                line: index + 1,
                message: "expected KEY=VALUE".to_string(),
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(SourceError::Syntax {
                    line: index + 1,
                    message: "empty key".to_string(),
                });
            }
            vars.insert(key.to_string(), unquote(value.trim()).to_string());
        }

        Ok(Self { vars })
    }

    /// Read and parse a `.env` file.
    ///
    /// # Errors
    ///
    /// [`SourceError::FileRead`] if the file cannot be read, or any error of
    /// [`EnvSnapshot::from_dotenv_str`].
    pub fn from_dotenv_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| SourceError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_dotenv_str(&contents)
    }

    /// Layer `other` on top of this snapshot; its values win.
    pub fn overlay(mut self, other: &EnvSnapshot) -> Self {
        self.vars
            .extend(other.vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Value of `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Number of variables
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Whether the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate over all variables, sorted by key
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for EnvSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

fn unquote(value: &str) -> &str {
    ['"', '\'']
        .iter()
        .find_map(|q| value.strip_prefix(*q)?.strip_suffix(*q))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    fn test_from_iter() {
        let env: EnvSnapshot = [("PORT", "8080"), ("HOST", "localhost")].into_iter().collect();
        assert_eq!(env.get("PORT"), Some("8080"));
        assert_eq!(env.len(), 2);
        assert_eq!(env.get("MISSING"), None);
    }

    #[test]
    fn test_dotenv_parsing() {
        let env = EnvSnapshot::from_dotenv_str(
            r#"
# database
DATABASE_URL=postgres://localhost/db
export PORT = 8080
GREETING="hello world"
SINGLE='quoted'
EMPTY=
EQUALS=a=b
"#,
        )
        .unwrap();

        assert_eq!(env.get("DATABASE_URL"), Some("postgres://localhost/db"));
        assert_eq!(env.get("PORT"), Some("8080"));
        assert_eq!(env.get("GREETING"), Some("hello world"));
        assert_eq!(env.get("SINGLE"), Some("quoted"));
        assert_eq!(env.get("EMPTY"), Some(""));
        assert_eq!(env.get("EQUALS"), Some("a=b"));
    }

    #[test]
    fn test_dotenv_syntax_error() {
        let result = EnvSnapshot::from_dotenv_str("OK=1\nNOT A PAIR\n");
        assert!(matches!(result, Err(SourceError::Syntax { line: 2, .. })));

        let result = EnvSnapshot::from_dotenv_str("=value");
        assert!(matches!(result, Err(SourceError::Syntax { line: 1, .. })));
    }

    #[test]
    fn test_dotenv_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "API_KEY=secret_value").unwrap();

        let env = EnvSnapshot::from_dotenv_file(temp_file.path()).unwrap();
        assert_eq!(env.get("API_KEY"), Some("secret_value"));
    }

    #[test]
    fn test_dotenv_file_not_found() {
        let result = EnvSnapshot::from_dotenv_file("/nonexistent/file/path/.env");
        assert!(matches!(result, Err(SourceError::FileRead { .. })));
    }

    #[test]
    fn test_overlay_prefers_other() {
        let file: EnvSnapshot = [("PORT", "3000"), ("HOST", "file")].into_iter().collect();
        let process: EnvSnapshot = [("PORT", "8080")].into_iter().collect();

        let merged = file.overlay(&process);
        assert_eq!(merged.get("PORT"), Some("8080"));
        assert_eq!(merged.get("HOST"), Some("file"));
    }

    #[test]
    #[serial]
    fn test_from_process() {
        env::set_var("ENVSCHEMA_SNAPSHOT_TEST", "present");
        let env = EnvSnapshot::from_process();
        assert_eq!(env.get("ENVSCHEMA_SNAPSHOT_TEST"), Some("present"));
        env::remove_var("ENVSCHEMA_SNAPSHOT_TEST");
    }
}
