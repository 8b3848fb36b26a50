use crate::core::config::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct AliasRow {
    reported: String,
    canonical: String,
}

/// Caller-supplied residue aliases, e.g. a local spelling of a nucleotide.
/// Names are stored trimmed and upper-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidueAliasTable {
    aliases: HashMap<String, String>,
}

fn key(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

impl ResidueAliasTable {
    /// Loads a CSV file with a `reported,canonical` header.
    pub fn load_csv(path: &Path) -> Result<Self, ConfigError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| ConfigError::Csv {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let mut aliases = HashMap::new();
        for result in reader.deserialize::<AliasRow>() {
            let row = result.map_err(|e| ConfigError::Csv {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
            aliases.insert(key(&row.reported), key(&row.canonical));
        }
        Ok(Self { aliases })
    }

    pub fn get(&self, reported: &str) -> Option<&str> {
        self.aliases.get(&key(reported)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, S)> for ResidueAliasTable {
    fn from_iter<I: IntoIterator<Item = (S, S)>>(iter: I) -> Self {
        Self {
            aliases: iter
                .into_iter()
                .map(|(reported, canonical)| (key(reported.as_ref()), key(canonical.as_ref())))
                .collect(),
        }
    }
}
