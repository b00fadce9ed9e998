use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tool3rd_protocol::{IeEntry, ResourceType};

const ASN1_TAGS: [&str; 2] = ["modulesTag", "modules"];
const TABULAR_TAG: &str = "definitionList";
const VALUE_ASSIGNMENT_TAG: &str = "valueAssignmentTag";

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("serialized resource is not a json object")]
    NotAnObject,
    #[error("serialized resource matches no known specification format")]
    UnknownShape,
}

/// A parsed specification document. The variant is decided once, at load time.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainModel {
    Asn1(Asn1Model),
    Tabular(TabularModel),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Asn1Model {
    pub modules: Vec<Asn1Module>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Asn1Module {
    pub name: String,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

/// A type or value assignment. Everything except the name is kept as the
/// opaque body produced by the parser.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Assignment {
    pub name: String,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TabularModel {
    #[serde(rename = "definitionList")]
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Definition {
    #[serde(rename = "sectionNumber")]
    pub section_number: String,
    pub name: String,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl DomainModel {
    /// Deserializes a resource by probing its structural tags in priority
    /// order: multi-module ASN.1 first, then the flat definition list.
    pub fn from_serialized(serialized: &str) -> Result<Self, ModelError> {
        let value: Value = serde_json::from_str(serialized)?;
        let Value::Object(object) = &value else {
            return Err(ModelError::NotAnObject);
        };
        if ASN1_TAGS.iter().all(|tag| object.contains_key(*tag)) {
            return Ok(DomainModel::Asn1(serde_json::from_value(value)?));
        }
        if object.contains_key(TABULAR_TAG) {
            return Ok(DomainModel::Tabular(serde_json::from_value(value)?));
        }
        Err(ModelError::UnknownShape)
    }

    pub fn resource_type(&self) -> ResourceType {
        match self {
            DomainModel::Asn1(_) => ResourceType::Asn1,
            DomainModel::Tabular(_) => ResourceType::Tabular,
        }
    }

    /// Every addressable IE. ASN.1 keys are `<module>.<assignment>` and value
    /// assignments are left out; tabular keys are section numbers.
    pub fn ie_list(&self) -> Vec<IeEntry> {
        match self {
            DomainModel::Asn1(model) => model
                .type_assignments()
                .map(|(module, assignment)| IeEntry {
                    name: assignment.name.clone(),
                    key: format!("{module}.{}", assignment.name),
                })
                .collect(),
            DomainModel::Tabular(model) => model
                .definitions
                .iter()
                .map(|definition| IeEntry {
                    name: definition.name.clone(),
                    key: definition.section_number.clone(),
                })
                .collect(),
        }
    }
}

impl Assignment {
    pub fn is_value_assignment(&self) -> bool {
        self.body.contains_key(VALUE_ASSIGNMENT_TAG)
    }
}

impl Asn1Model {
    /// `(module name, assignment)` for every non-value assignment, in
    /// document order.
    pub fn type_assignments(&self) -> impl Iterator<Item = (&str, &Assignment)> {
        self.modules.iter().flat_map(|module| {
            module
                .assignments
                .iter()
                .filter(|assignment| !assignment.is_value_assignment())
                .map(move |assignment| (module.name.as_str(), assignment))
        })
    }

    pub fn find_assignment(&self, module_name: &str, name: &str) -> Option<&Assignment> {
        self.modules
            .iter()
            .filter(|module| module.name == module_name)
            .flat_map(|module| module.assignments.iter())
            .find(|assignment| assignment.name == name)
    }

    /// First type assignment with `name` in any module.
    pub fn find_type(&self, name: &str) -> Option<&Assignment> {
        self.type_assignments()
            .map(|(_, assignment)| assignment)
            .find(|assignment| assignment.name == name)
    }
}

impl TabularModel {
    pub fn find_definition(&self, section_number: &str) -> Option<&Definition> {
        self.definitions
            .iter()
            .find(|definition| definition.section_number == section_number)
    }
}
