use anyhow::{Context, Result};
use gainz_core::ScaffoldTable;
use std::fs;
use std::path::{Path, PathBuf};

/// Data files shared with the web front-end.
#[derive(Debug, Clone, Default)]
pub struct TesterAssets {
    pub scaffolds: ScaffoldTable,
}

impl TesterAssets {
    pub fn load_default() -> Self {
        let scaffolds = Self::load_scaffolds(&Self::assets_data_root().join("scaffolds.json"))
            .unwrap_or_else(|err| {
                log::warn!("using empty scaffold table: {err:#}");
                ScaffoldTable::default()
            });
        Self { scaffolds }
    }

    fn assets_data_root() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("gainz-web")
            .join("static")
            .join("data")
    }

    fn load_scaffolds(path: &Path) -> Result<ScaffoldTable> {
        let json =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        ScaffoldTable::from_json(&json).with_context(|| format!("parsing {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gainz_core::ManualScaffold;

    #[test]
    fn loads_bundled_scaffolds() {
        let assets = TesterAssets::load_default();
        assert!(assets.scaffolds.scaffolds.contains_key(&ManualScaffold::Candy));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(TesterAssets::load_scaffolds(Path::new("/nonexistent/scaffolds.json")).is_err());
    }
}
