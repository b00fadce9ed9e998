use std::collections::BTreeMap;

use minijinja::{context, Environment};
use serde::Serialize;
use thiserror::Error;

use crate::model::{Asn1Model, DomainModel};

const DIFF_TEMPLATE: &str = include_str!("templates/diff.html");

#[derive(Debug, Error)]
pub enum DiffError {
    #[error("only ASN.1 resources can be compared")]
    UnsupportedType,
    #[error("failed to serialize assignment: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to render diff report: {0}")]
    Render(#[from] minijinja::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub module: String,
    pub name: String,
    pub kind: ChangeKind,
    pub old: Option<String>,
    pub new: Option<String>,
}

/// Assignment-level changes between two ASN.1 models, ordered by module then
/// assignment name.
pub fn diff_models(old: &Asn1Model, new: &Asn1Model) -> Result<Vec<Change>, DiffError> {
    let old_index = index(old)?;
    let mut new_index = index(new)?;

    let mut changes = Vec::new();
    for ((module, name), old_text) in old_index {
        match new_index.remove(&(module.clone(), name.clone())) {
            Some(new_text) if new_text == old_text => {}
            Some(new_text) => changes.push(Change {
                module,
                name,
                kind: ChangeKind::Modified,
                old: Some(old_text),
                new: Some(new_text),
            }),
            None => changes.push(Change {
                module,
                name,
                kind: ChangeKind::Removed,
                old: Some(old_text),
                new: None,
            }),
        }
    }
    changes.extend(new_index.into_iter().map(|((module, name), new_text)| Change {
        module,
        name,
        kind: ChangeKind::Added,
        old: None,
        new: Some(new_text),
    }));
    changes.sort_by(|a, b| (&a.module, &a.name).cmp(&(&b.module, &b.name)));
    Ok(changes)
}

/// Renders the HTML diff report between two resources.
pub fn render_diff_report(
    old_name: &str,
    old: &DomainModel,
    new_name: &str,
    new: &DomainModel,
) -> Result<String, DiffError> {
    let (DomainModel::Asn1(old), DomainModel::Asn1(new)) = (old, new) else {
        return Err(DiffError::UnsupportedType);
    };
    let changes = diff_models(old, new)?;

    let mut env = Environment::new();
    env.add_template("diff.html", DIFF_TEMPLATE)?;
    let template = env.get_template("diff.html")?;
    Ok(template.render(context! {
        spec_old => old_name,
        spec_new => new_name,
        changes => changes,
    })?)
}

fn index(model: &Asn1Model) -> Result<BTreeMap<(String, String), String>, DiffError> {
    let mut map = BTreeMap::new();
    for module in &model.modules {
        for assignment in &module.assignments {
            let text = serde_json::to_string_pretty(&assignment.body)?;
            map.insert((module.name.clone(), assignment.name.clone()), text);
        }
    }
    Ok(map)
}
