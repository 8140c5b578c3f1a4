//! The type-definition document exchanged between `json2type` and `json2rs`.
//!
//! ```text
//! types:
//! - typeName: Friends
//!   fields:
//!   - fieldName: id
//!     systemType: Int64
//!     objectName: null
//!     isArray: false
//! dataFiles:
//! - file: json/test01.json
//!   rootModel: Base
//!   fieldTypeMap:
//!     friends[0].id: Int64
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

use heck::ToUpperCamelCase;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Result, TypeGenError};

/// Scalar kind of a field, or of an array field's elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemType {
    Int64,
    Float64,
    String,
    Bool,
    Object,
    /// Only `null` (or nothing) was ever seen.
    Unknown,
}

impl SystemType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null | Value::Array(_) => SystemType::Unknown,
            Value::Bool(_) => SystemType::Bool,
            Value::Number(n) if n.is_f64() => SystemType::Float64,
            Value::Number(_) => SystemType::Int64,
            Value::String(_) => SystemType::String,
            Value::Object(_) => SystemType::Object,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SystemType::Int64 => "Int64",
            SystemType::Float64 => "Float64",
            SystemType::String => "String",
            SystemType::Bool => "Bool",
            SystemType::Object => "Object",
            SystemType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for SystemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub field_name: String,
    pub system_type: SystemType,
    /// Set iff `system_type` is [`SystemType::Object`].
    #[serde(default)]
    pub object_name: Option<String>,
    #[serde(default)]
    pub is_array: bool,
}

impl FieldDef {
    /// Classify one sampled value. Arrays are typed by their first non-null
    /// element; object fields name a type after the field itself.
    pub fn from_value(field_name: &str, value: &Value) -> Self {
        let (element, is_array) = match value {
            Value::Array(items) => (items.iter().find(|item| !item.is_null()), true),
            other => (Some(other), false),
        };
        let system_type = element.map_or(SystemType::Unknown, SystemType::of);
        let object_name =
            (system_type == SystemType::Object).then(|| field_name.to_upper_camel_case());
        Self {
            field_name: field_name.to_string(),
            system_type,
            object_name,
            is_array,
        }
    }

    /// The object type name for object fields, the system type otherwise.
    pub fn type_name(&self) -> &str {
        match (&self.system_type, &self.object_name) {
            (SystemType::Object, Some(name)) => name,
            (system_type, _) => system_type.as_str(),
        }
    }

    /// Whether this sample tells more about the field than `existing` does.
    ///
    /// The first sample wins except that a known type replaces `Unknown`, an
    /// array of unknowns replaces a bare `null`, and floats widen integers.
    pub fn refines(&self, existing: &FieldDef) -> bool {
        match (existing.system_type, self.system_type) {
            (SystemType::Unknown, SystemType::Unknown) => self.is_array && !existing.is_array,
            (SystemType::Unknown, _) => true,
            (SystemType::Int64, SystemType::Float64) => self.is_array == existing.is_array,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDef {
    pub type_name: String,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl TypeDef {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.field_name == name)
    }

    /// Union of both field sets; fields new to `self` are appended in order.
    pub fn merge(&mut self, other: TypeDef) {
        for field in other.fields {
            match self
                .fields
                .iter_mut()
                .find(|f| f.field_name == field.field_name)
            {
                Some(existing) => {
                    if field.refines(existing) {
                        *existing = field;
                    }
                }
                None => self.fields.push(field),
            }
        }
    }
}

/// One sampled JSON file: where it came from and the type of every
/// primitive leaf, keyed by its path (`friends[1].name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFileDef {
    pub file: String,
    pub root_model: String,
    #[serde(default)]
    pub field_type_map: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDefinitions {
    #[serde(default)]
    pub types: Vec<TypeDef>,
    #[serde(default)]
    pub data_files: Vec<DataFileDef>,
}

impl TypeDefinitions {
    pub fn get(&self, type_name: &str) -> Option<&TypeDef> {
        self.types.iter().find(|t| t.type_name == type_name)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| TypeGenError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }
}
