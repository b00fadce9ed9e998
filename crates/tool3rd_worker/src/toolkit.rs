use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::diff::{render_diff_report, DiffError};
use crate::model::{Asn1Model, DomainModel};

/// Rows for one formatted IE; `title` names its sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRows {
    pub title: String,
    pub rows: Vec<Vec<String>>,
}

/// Domain algorithms the worker drives but does not own.
pub trait Toolkit: Send + Sync {
    /// Sheet content for the IE addressed by `key`, or `None` when the key
    /// does not name a formattable IE.
    fn sheet_rows(&self, model: &DomainModel, key: &str, expand: bool) -> Option<SheetRows>;

    fn diff_report(
        &self,
        old_name: &str,
        old: &DomainModel,
        new_name: &str,
        new: &DomainModel,
    ) -> Result<String, DiffError>;
}

/// Flattens IE bodies into indented rows and renders the HTML diff report.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinToolkit;

impl Toolkit for BuiltinToolkit {
    fn sheet_rows(&self, model: &DomainModel, key: &str, expand: bool) -> Option<SheetRows> {
        match model {
            DomainModel::Asn1(asn1) => {
                let (module_name, name) = key.split_once('.')?;
                let assignment = asn1.find_assignment(module_name, name)?;
                if assignment.is_value_assignment() {
                    return None;
                }
                let mut flattener = Flattener::new(expand.then_some(asn1));
                flattener.visiting.insert(assignment.name.clone());
                flattener.rows.push(vec![assignment.name.clone()]);
                flattener.object(&assignment.body, 0);
                Some(SheetRows {
                    title: assignment.name.clone(),
                    rows: flattener.rows,
                })
            }
            DomainModel::Tabular(tabular) => {
                let definition = tabular.find_definition(key)?;
                let mut flattener = Flattener::new(None);
                flattener
                    .rows
                    .push(vec![definition.section_number.clone(), definition.name.clone()]);
                flattener.object(&definition.body, 0);
                Some(SheetRows {
                    title: definition.name.clone(),
                    rows: flattener.rows,
                })
            }
        }
    }

    fn diff_report(
        &self,
        old_name: &str,
        old: &DomainModel,
        new_name: &str,
        new: &DomainModel,
    ) -> Result<String, DiffError> {
        render_diff_report(old_name, old, new_name, new)
    }
}

/// Walks a JSON body depth first. Each field becomes one row indented by its
/// depth. With an ASN.1 model to expand against, a string naming another type
/// assignment is followed into that assignment's body; `visiting` breaks
/// recursive references.
struct Flattener<'a> {
    expand_with: Option<&'a Asn1Model>,
    visiting: HashSet<String>,
    rows: Vec<Vec<String>>,
}

impl<'a> Flattener<'a> {
    fn new(expand_with: Option<&'a Asn1Model>) -> Self {
        Self {
            expand_with,
            visiting: HashSet::new(),
            rows: Vec::new(),
        }
    }

    fn object(&mut self, fields: &Map<String, Value>, depth: usize) {
        for (field, value) in fields {
            self.field(field, value, depth);
        }
    }

    fn field(&mut self, label: &str, value: &Value, depth: usize) {
        match value {
            Value::Object(fields) => {
                self.push_row(depth, label, None);
                self.object(fields, depth + 1);
            }
            Value::Array(items) => {
                self.push_row(depth, label, None);
                for (index, item) in items.iter().enumerate() {
                    self.field(&format!("[{index}]"), item, depth + 1);
                }
            }
            Value::String(text) => {
                self.push_row(depth, label, Some(text.clone()));
                self.expand_reference(text, depth + 1);
            }
            scalar => self.push_row(depth, label, Some(scalar.to_string())),
        }
    }

    fn expand_reference(&mut self, name: &str, depth: usize) {
        let Some(model) = self.expand_with else {
            return;
        };
        let Some(referenced) = model.find_type(name) else {
            return;
        };
        if !self.visiting.insert(referenced.name.clone()) {
            return;
        }
        self.object(&referenced.body, depth);
        self.visiting.remove(&referenced.name);
    }

    fn push_row(&mut self, depth: usize, label: &str, value: Option<String>) {
        let mut row = vec![String::new(); depth];
        row.push(label.to_string());
        row.extend(value);
        self.rows.push(row);
    }
}
