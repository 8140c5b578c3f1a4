//! Record types inferred from sample JSON files.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use heck::ToUpperCamelCase;
use serde_json::{Map, Value};

use crate::schema::{DataFileDef, FieldDef, TypeDef, TypeDefinitions};
use crate::{Result, TypeGenError};

/// Accumulates type definitions over any number of sample files.
///
/// Every file's root object is typed as the model; nested objects are typed
/// after the field that holds them. Types seen more than once, in several
/// files or in several elements of one array, are merged field by field.
pub struct TypeInferrer {
    model: String,
    types: Vec<TypeDef>,
    index: HashMap<String, usize>,
    data_files: Vec<DataFileDef>,
    file_names: HashSet<String>,
}

impl TypeInferrer {
    pub fn new(model: &str) -> Result<Self> {
        let model = model.to_upper_camel_case();
        if model.is_empty() {
            return Err(TypeGenError::InvalidModel);
        }
        Ok(Self {
            model,
            types: Vec::new(),
            index: HashMap::new(),
            data_files: Vec::new(),
            file_names: HashSet::new(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn add_file(&mut self, path: &Path) -> Result<()> {
        let text = fs::read_to_string(path).map_err(|source| TypeGenError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&text).map_err(|source| TypeGenError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        self.add_value(&path.to_string_lossy(), &value)
    }

    /// Add one parsed sample. `file` labels it in the output and its base
    /// name must be unique among the samples.
    pub fn add_value(&mut self, file: &str, value: &Value) -> Result<()> {
        let name = Path::new(file)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.to_string());
        if self.file_names.contains(&name) {
            return Err(TypeGenError::DuplicateFile { name });
        }
        let Value::Object(root) = value else {
            return Err(TypeGenError::NotAnObject {
                file: file.to_string(),
                path: "$".to_string(),
            });
        };

        let mut data_file = DataFileDef {
            file: file.to_string(),
            root_model: self.model.clone(),
            field_type_map: Default::default(),
        };
        self.walk(&mut data_file, self.model.clone(), root, "")?;
        tracing::debug!(
            file,
            leaves = data_file.field_type_map.len(),
            types = self.types.len(),
            "sampled"
        );
        self.file_names.insert(name);
        self.data_files.push(data_file);
        Ok(())
    }

    /// Definitions in first-completed order: a nested type precedes the
    /// type that holds it.
    pub fn finish(self) -> TypeDefinitions {
        TypeDefinitions {
            types: self.types,
            data_files: self.data_files,
        }
    }

    fn walk(
        &mut self,
        data_file: &mut DataFileDef,
        type_name: String,
        object: &Map<String, Value>,
        path: &str,
    ) -> Result<()> {
        let mut def = TypeDef::new(type_name);
        for (key, value) in object {
            let field_path = if path.is_empty() {
                key.clone()
            } else {
                format!("{path}.{key}")
            };
            let field = FieldDef::from_value(key, value);

            match (&field.object_name, value) {
                (Some(child), Value::Object(inner)) => {
                    self.walk(data_file, child.clone(), inner, &field_path)?;
                }
                (Some(child), Value::Array(items)) => {
                    for (i, item) in items.iter().enumerate() {
                        let item_path = format!("{field_path}[{i}]");
                        match item {
                            Value::Object(inner) => {
                                self.walk(data_file, child.clone(), inner, &item_path)?
                            }
                            Value::Null => {}
                            _ => {
                                return Err(TypeGenError::NotAnObject {
                                    file: data_file.file.clone(),
                                    path: item_path,
                                })
                            }
                        }
                    }
                }
                _ => {
                    data_file
                        .field_type_map
                        .insert(field_path, field.type_name().to_string());
                }
            }
            def.fields.push(field);
        }
        self.put_type(def);
        Ok(())
    }

    fn put_type(&mut self, def: TypeDef) {
        match self.index.get(&def.type_name) {
            Some(&i) => self.types[i].merge(def),
            None => {
                self.index.insert(def.type_name.clone(), self.types.len());
                self.types.push(def);
            }
        }
    }
}
