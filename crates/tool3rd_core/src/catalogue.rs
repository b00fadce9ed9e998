use serde::Deserialize;

/// One series directory of the remote catalogue listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogueSeries {
    pub name: String,
    #[serde(default)]
    pub children: Vec<CatalogueSpec>,
}

/// A specification directory; `children` are the version file names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogueSpec {
    pub name: String,
    #[serde(default)]
    pub children: Vec<String>,
}

pub(crate) fn contains(catalogue: &[CatalogueSeries], series: &str, spec: &str, version: &str) -> bool {
    catalogue
        .iter()
        .filter(|s| s.name == series)
        .flat_map(|s| s.children.iter())
        .filter(|s| s.name == spec)
        .any(|s| s.children.iter().any(|v| v == version))
}
