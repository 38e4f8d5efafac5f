//! Policy-type schemas
//!
//! A schema is a JSON-Schema-shaped document whose properties are each
//! restricted to `integer` or `boolean`. Validation happens once, when the
//! definition is turned into a [`ValidSchema`]; stored schemas are re-checked
//! on deserialization.

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

pub const DEFAULT_SCHEMA_URI: &str = "http://json-schema.org/draft-07/schema#";

/// Allowed property types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Integer,
    #[serde(alias = "bool")]
    Boolean,
}

impl PropertyType {
    /// Parse a descriptor's `type` field. `bool` is accepted for `boolean`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "integer" => Some(PropertyType::Integer),
            "boolean" | "bool" => Some(PropertyType::Boolean),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PropertyType::Integer => "integer",
            PropertyType::Boolean => "boolean",
        }
    }

    /// Exact runtime type match, no coercion.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            PropertyType::Integer => value.is_i64() || value.is_u64(),
            PropertyType::Boolean => value.is_boolean(),
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Schema document as submitted by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    #[serde(rename = "$schema", default = "default_schema_uri")]
    pub schema_uri: String,

    #[serde(rename = "type", default = "default_object_type")]
    pub kind: String,

    /// Property name to descriptor; each descriptor needs a `type` field.
    #[serde(default)]
    pub properties: Map<String, Value>,

    #[serde(rename = "additionalProperties", default)]
    pub additional_properties: bool,
}

fn default_schema_uri() -> String {
    DEFAULT_SCHEMA_URI.to_string()
}

fn default_object_type() -> String {
    "object".to_string()
}

impl Default for SchemaDefinition {
    fn default() -> Self {
        Self {
            schema_uri: default_schema_uri(),
            kind: default_object_type(),
            properties: Map::new(),
            additional_properties: false,
        }
    }
}

impl SchemaDefinition {
    /// Build a definition from `(name, type)` pairs, in declaration order.
    pub fn with_properties<'a>(
        properties: impl IntoIterator<Item = (&'a str, PropertyType)>,
    ) -> Self {
        let properties = properties
            .into_iter()
            .map(|(name, ty)| {
                let mut descriptor = Map::new();
                descriptor.insert("type".to_string(), Value::from(ty.as_str()));
                (name.to_string(), Value::Object(descriptor))
            })
            .collect();
        Self {
            properties,
            ..Self::default()
        }
    }
}

/// A schema that passed [`validate_schema_definition`].
///
/// Serializes back to the exact definition it was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SchemaDefinition", into = "SchemaDefinition")]
pub struct ValidSchema {
    definition: SchemaDefinition,
    types: BTreeMap<String, PropertyType>,
}

impl ValidSchema {
    pub fn definition(&self) -> &SchemaDefinition {
        &self.definition
    }

    pub fn property_type(&self, name: &str) -> Option<PropertyType> {
        self.types.get(name).copied()
    }

    /// Declared properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, PropertyType)> + '_ {
        self.definition
            .properties
            .keys()
            .filter_map(|name| Some((name.as_str(), self.property_type(name)?)))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl TryFrom<SchemaDefinition> for ValidSchema {
    type Error = SchemaError;

    fn try_from(definition: SchemaDefinition) -> Result<Self, Self::Error> {
        validate_schema_definition(definition)
    }
}

impl From<ValidSchema> for SchemaDefinition {
    fn from(schema: ValidSchema) -> Self {
        schema.definition
    }
}

/// Check that every declared property has a `type` of `integer` or `boolean`.
///
/// The definition is returned unchanged; only its static type changes.
pub fn validate_schema_definition(
    definition: SchemaDefinition,
) -> Result<ValidSchema, SchemaError> {
    let mut types = BTreeMap::new();

    for (property, descriptor) in &definition.properties {
        let declared = descriptor.get("type");
        let property_type = declared
            .and_then(Value::as_str)
            .and_then(PropertyType::parse)
            .ok_or_else(|| SchemaError::InvalidPropertyType {
                property: property.clone(),
                found: declared.map(|value| match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                }),
            })?;
        types.insert(property.clone(), property_type);
    }

    Ok(ValidSchema { definition, types })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition(properties: Value) -> SchemaDefinition {
        serde_json::from_value(json!({ "properties": properties })).unwrap()
    }

    #[test]
    fn test_accepts_integer_and_boolean() {
        let schema = validate_schema_definition(definition(json!({
            "threshold": { "type": "integer" },
            "enabled": { "type": "boolean" },
        })))
        .unwrap();

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.property_type("threshold"), Some(PropertyType::Integer));
        assert_eq!(schema.property_type("enabled"), Some(PropertyType::Boolean));
        assert_eq!(schema.definition().schema_uri, DEFAULT_SCHEMA_URI);
        assert!(!schema.definition().additional_properties);
    }

    #[test]
    fn test_bool_alias_is_accepted() {
        let schema = validate_schema_definition(definition(json!({
            "enabled": { "type": "bool" },
        })))
        .unwrap();

        assert_eq!(schema.property_type("enabled"), Some(PropertyType::Boolean));
        // definition is kept verbatim
        assert_eq!(schema.definition().properties["enabled"]["type"], "bool");
    }

    #[test]
    fn test_rejects_unsupported_type() {
        let err = validate_schema_definition(definition(json!({
            "ratio": { "type": "number" },
        })))
        .unwrap_err();

        assert_eq!(
            err,
            SchemaError::InvalidPropertyType {
                property: "ratio".to_string(),
                found: Some("number".to_string()),
            }
        );
    }

    #[test]
    fn test_rejects_missing_type() {
        let err = validate_schema_definition(definition(json!({
            "ratio": { "minimum": 0 },
        })))
        .unwrap_err();

        assert_eq!(
            err,
            SchemaError::InvalidPropertyType {
                property: "ratio".to_string(),
                found: None,
            }
        );
    }

    #[test]
    fn test_empty_schema_is_legal() {
        let schema = validate_schema_definition(SchemaDefinition::default()).unwrap();
        assert!(schema.is_empty());
    }

    #[test]
    fn test_properties_keep_declaration_order() {
        let schema = validate_schema_definition(SchemaDefinition::with_properties([
            ("zeta", PropertyType::Integer),
            ("alpha", PropertyType::Boolean),
        ]))
        .unwrap();

        let names: Vec<&str> = schema.properties().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_deserializing_rechecks_schema() {
        let bad = json!({
            "$schema": DEFAULT_SCHEMA_URI,
            "type": "object",
            "properties": { "name": { "type": "string" } },
            "additionalProperties": false,
        });
        assert!(serde_json::from_value::<ValidSchema>(bad).is_err());

        let good = json!({ "properties": { "count": { "type": "integer" } } });
        let schema: ValidSchema = serde_json::from_value(good).unwrap();
        let round = serde_json::to_value(&schema).unwrap();
        assert_eq!(round["properties"]["count"]["type"], "integer");
        assert_eq!(round["type"], "object");
    }
}
