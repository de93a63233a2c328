use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::string_enum;
use crate::errors::{DomainError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number,
    Select,
    Multiselect,
    Date,
    Checkbox,
    Textarea,
    File,
    Barcode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Client-side hint only; not evaluated on the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// One entry of a template's ordered field list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormTemplate {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub version: i32,
    pub is_active: bool,
    pub fields: Vec<FormField>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewFormTemplate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    pub fields: Vec<FormField>,
}

impl NewFormTemplate {
    pub fn into_template(self, created_by: Option<String>, now: DateTime<Utc>) -> FormTemplate {
        FormTemplate {
            id: Uuid::now_v7(),
            name: self.name.trim().to_string(),
            description: self.description,
            category: self.category,
            version: 1,
            is_active: self.is_active.unwrap_or(true),
            fields: self.fields,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormTemplatePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub fields: Option<Vec<FormField>>,
}

/// Checks that a field list is usable as a template schema.
pub fn validate_fields(fields: &[FormField]) -> Result<()> {
    let mut seen = HashSet::new();
    for field in fields {
        if field.id.trim().is_empty() {
            return Err(DomainError::validation("form field id must not be empty"));
        }
        if !seen.insert(field.id.as_str()) {
            return Err(DomainError::validation(format!("duplicate form field id `{}`", field.id)));
        }
        if field.label.trim().is_empty() {
            return Err(DomainError::validation(format!("form field `{}` needs a label", field.id)));
        }
        let needs_options = matches!(field.kind, FieldType::Select | FieldType::Multiselect);
        if needs_options && field.options.as_ref().is_none_or(|o| o.is_empty()) {
            return Err(DomainError::validation(format!(
                "form field `{}` is a {:?} field without options",
                field.id, field.kind
            )));
        }
    }
    Ok(())
}

impl FormTemplate {
    /// Applies a patch and bumps `version` when the field list changes.
    pub fn apply(&mut self, patch: FormTemplatePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(category) = patch.category {
            self.category = Some(category);
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        if let Some(fields) = patch.fields {
            if fields != self.fields {
                self.fields = fields;
                self.version += 1;
            }
        }
    }

    /// Loose conformance: declared fields are checked, unknown keys pass
    /// through untouched.
    pub fn validate_submission(&self, data: &Map<String, Value>) -> Result<()> {
        for field in &self.fields {
            let value = data.get(&field.id).filter(|v| !is_blank(v));
            let Some(value) = value else {
                if field.required {
                    return Err(DomainError::validation(format!("`{}` is required", field.label)));
                }
                continue;
            };
            check_value(field, value)?;
        }
        Ok(())
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn check_value(field: &FormField, value: &Value) -> Result<()> {
    let options = field.options.as_deref().unwrap_or_default();
    match field.kind {
        FieldType::Number => {
            let number = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }
            .filter(|n| n.is_finite())
            .ok_or_else(|| DomainError::validation(format!("`{}` must be a number", field.label)))?;

            if let Some(rules) = &field.validation {
                if rules.min.is_some_and(|min| number < min) || rules.max.is_some_and(|max| number > max) {
                    return Err(DomainError::validation(format!("`{}` is out of range", field.label)));
                }
            }
        }
        FieldType::Select => {
            let chosen = value.as_str().unwrap_or_default();
            if !options.iter().any(|o| o == chosen) {
                return Err(DomainError::validation(format!("`{}` has an unknown option", field.label)));
            }
        }
        FieldType::Multiselect => {
            let all_known = value
                .as_array()
                .is_some_and(|items| items.iter().all(|v| v.as_str().is_some_and(|s| options.iter().any(|o| o == s))));
            if !all_known {
                return Err(DomainError::validation(format!("`{}` has an unknown option", field.label)));
            }
        }
        FieldType::Checkbox => {
            let Some(checked) = value.as_bool() else {
                return Err(DomainError::validation(format!("`{}` must be true or false", field.label)));
            };
            // A required checkbox is an acknowledgement.
            if field.required && !checked {
                return Err(DomainError::validation(format!("`{}` must be checked", field.label)));
            }
        }
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    #[default]
    Submitted,
    Approved,
    Rejected,
}

string_enum!(SubmissionStatus {
    Submitted => "submitted",
    Approved => "approved",
    Rejected => "rejected",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSubmission {
    pub id: Uuid,
    pub template_id: Uuid,
    pub product_id: Option<Uuid>,
    pub data: Map<String, Value>,
    pub submitted_by: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub status: SubmissionStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFormSubmission {
    pub template_id: Uuid,
    #[serde(default)]
    pub product_id: Option<Uuid>,
    pub data: Map<String, Value>,
}
