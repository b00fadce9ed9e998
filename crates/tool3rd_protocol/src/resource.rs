use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Asn1,
    Tabular,
}

/// The wire-safe projection of a loaded resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
}

/// One addressable information element inside a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IeEntry {
    pub name: String,
    pub key: String,
}

/// A UI-curated selection of one IE to be rendered into its own sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: String,
    pub name: String,
    pub key: String,
    pub expand: bool,
}

/// Human readable form of a resource name: `38.331-h00.asn1` becomes
/// `38.331-h00 (asn1)`. A trailing `.json` is ignored.
pub fn readable_name(name: &str) -> String {
    let stem = name.strip_suffix(".json").unwrap_or(name);
    match stem.rsplit_once('.') {
        Some((base, kind)) if !base.is_empty() && !kind.is_empty() => format!("{base} ({kind})"),
        _ => stem.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readable_name_splits_on_last_dot() {
        assert_eq!(readable_name("38.331-h00.asn1"), "38.331-h00 (asn1)");
        assert_eq!(readable_name("38.473-h10.tabular.json"), "38.473-h10 (tabular)");
        assert_eq!(readable_name("plain"), "plain");
    }
}
