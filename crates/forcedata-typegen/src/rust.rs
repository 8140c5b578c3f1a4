//! Rust model source from type definitions.
//!
//! Every type becomes a serde struct whose fields are all nullable, the same
//! shape as the hand-written fixture models:
//! - `Unknown` becomes a bare `serde_json::Value` (which already holds `null`)
//! - primitive arrays hold nullable elements (`Option<Vec<Option<i64>>>`)
//! - object arrays hold records (`Option<Vec<Friends>>`)
//!
//! JSON keys that are not valid snake_case identifiers keep their wire name
//! through `#[serde(rename)]`.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use heck::{ToSnakeCase, ToUpperCamelCase};

use crate::schema::{FieldDef, SystemType, TypeDef, TypeDefinitions};
use crate::{Result, TypeGenError};

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "box", "break", "const", "continue", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "static", "struct", "trait", "true", "try", "type", "unsafe", "use", "where",
    "while", "yield",
];

/// Keywords that cannot be raw identifiers.
const RESERVED: &[&str] = &["crate", "self", "Self", "super"];

pub fn render_rust(defs: &TypeDefinitions) -> Result<String> {
    validate(defs)?;
    let eq_types = eq_types(defs);
    let needs_value = defs
        .types
        .iter()
        .flat_map(|t| &t.fields)
        .any(|f| f.system_type == SystemType::Unknown);

    let mut out = String::new();
    writeln!(&mut out, "//! Fixture record types generated by `forcedata json2rs`.")?;
    writeln!(&mut out, "//!")?;
    writeln!(&mut out, "//! Regenerate rather than edit by hand.")?;
    writeln!(&mut out)?;
    writeln!(&mut out, "use serde::{{Deserialize, Serialize}};")?;
    if needs_value {
        writeln!(&mut out, "use serde_json::Value;")?;
    }

    for def in &defs.types {
        writeln!(&mut out)?;
        render_struct(&mut out, def, eq_types.contains(def.type_name.as_str()))?;
    }
    Ok(out)
}

fn render_struct(out: &mut String, def: &TypeDef, derive_eq: bool) -> Result<()> {
    let eq = if derive_eq { "Eq, " } else { "" };
    writeln!(
        out,
        "#[derive(Debug, Clone, Default, PartialEq, {eq}Serialize, Deserialize)]"
    )?;
    if def.fields.is_empty() {
        writeln!(out, "pub struct {} {{}}", type_ident(&def.type_name))?;
        return Ok(());
    }

    writeln!(out, "pub struct {} {{", type_ident(&def.type_name))?;
    let mut used: HashMap<String, usize> = HashMap::new();
    for field in &def.fields {
        let mut ident = field_ident(&field.field_name);
        let seen = used.entry(ident.clone()).or_insert(0);
        *seen += 1;
        if *seen > 1 {
            ident = format!("{ident}_{seen}");
        }
        if ident.trim_start_matches("r#") != field.field_name {
            writeln!(out, "    #[serde(rename = {:?})]", field.field_name)?;
        }
        writeln!(out, "    pub {ident}: {},", field_type(field))?;
    }
    writeln!(out, "}}")?;
    Ok(())
}

fn validate(defs: &TypeDefinitions) -> Result<()> {
    for def in &defs.types {
        for field in &def.fields {
            if field.system_type != SystemType::Object {
                continue;
            }
            let Some(object) = &field.object_name else {
                return Err(TypeGenError::MissingObjectName {
                    type_name: def.type_name.clone(),
                    field: field.field_name.clone(),
                });
            };
            if defs.get(object).is_none() {
                return Err(TypeGenError::UndefinedType {
                    type_name: def.type_name.clone(),
                    field: field.field_name.clone(),
                    object: object.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Types that can derive `Eq`: no floats, no untyped values, and only
/// nested types that can derive it too.
fn eq_types(defs: &TypeDefinitions) -> HashSet<&str> {
    let mut eq: HashSet<&str> = defs.types.iter().map(|t| t.type_name.as_str()).collect();
    loop {
        let before = eq.len();
        for def in &defs.types {
            let ok = def.fields.iter().all(|f| match f.system_type {
                SystemType::Float64 | SystemType::Unknown => false,
                SystemType::Object => f
                    .object_name
                    .as_deref()
                    .is_some_and(|name| eq.contains(name)),
                _ => true,
            });
            if !ok {
                eq.remove(def.type_name.as_str());
            }
        }
        if eq.len() == before {
            return eq;
        }
    }
}

fn type_ident(name: &str) -> String {
    let ident = name.to_upper_camel_case();
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        format!("T{ident}")
    } else {
        ident
    }
}

fn field_ident(name: &str) -> String {
    let mut ident = name.to_snake_case();
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert_str(0, "field_");
    }
    if RESERVED.contains(&ident.as_str()) {
        ident.push('_');
    } else if KEYWORDS.contains(&ident.as_str()) {
        ident.insert_str(0, "r#");
    }
    ident
}

fn field_type(field: &FieldDef) -> String {
    let scalar = match field.system_type {
        SystemType::Int64 => "i64".to_string(),
        SystemType::Float64 => "f64".to_string(),
        SystemType::String => "String".to_string(),
        SystemType::Bool => "bool".to_string(),
        SystemType::Unknown => "Value".to_string(),
        SystemType::Object => type_ident(field.type_name()),
    };
    match (field.system_type, field.is_array) {
        (SystemType::Unknown, false) => scalar,
        (SystemType::Unknown | SystemType::Object, true) => format!("Option<Vec<{scalar}>>"),
        (_, true) => format!("Option<Vec<Option<{scalar}>>>"),
        (_, false) => format!("Option<{scalar}>"),
    }
}
