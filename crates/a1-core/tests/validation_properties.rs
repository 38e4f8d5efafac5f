//! Property tests for schema and instance validation

use a1_core::{
    validate_instance, validate_schema_definition, InstanceError, PolicyPayload, PropertyType,
    SchemaDefinition, SchemaError,
};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn property_type() -> impl Strategy<Value = PropertyType> {
    prop_oneof![Just(PropertyType::Integer), Just(PropertyType::Boolean)]
}

fn declared_properties() -> impl Strategy<Value = Vec<(String, PropertyType)>> {
    prop::collection::btree_map("[a-z][a-z0-9_]{0,11}", property_type(), 0..8)
        .prop_map(|map| map.into_iter().collect::<Vec<_>>())
}

fn schema_from(properties: &[(String, PropertyType)]) -> SchemaDefinition {
    SchemaDefinition::with_properties(properties.iter().map(|(name, ty)| (name.as_str(), *ty)))
}

fn conforming_value(ty: PropertyType) -> BoxedStrategy<Value> {
    match ty {
        PropertyType::Integer => any::<i64>().prop_map(Value::from).boxed(),
        PropertyType::Boolean => any::<bool>().prop_map(Value::from).boxed(),
    }
}

fn wrong_value(ty: PropertyType) -> BoxedStrategy<Value> {
    let common = prop_oneof![
        Just(Value::Null),
        "[a-z]{0,6}".prop_map(Value::from),
        Just(json!([])),
        Just(json!({})),
        // floats never count as integers, even when integral
        (-1.0e6f64..1.0e6f64).prop_map(|f| json!(f.trunc() + 0.5)),
        Just(json!(5.0)),
    ];
    match ty {
        PropertyType::Integer => prop_oneof![common, any::<bool>().prop_map(Value::from)].boxed(),
        PropertyType::Boolean => prop_oneof![common, any::<i64>().prop_map(Value::from)].boxed(),
    }
}

/// A schema plus a payload that uses a subset of its properties correctly.
fn schema_and_conforming_payload() -> impl Strategy<Value = (SchemaDefinition, PolicyPayload)> {
    declared_properties().prop_flat_map(|properties| {
        let values: Vec<_> = properties
            .iter()
            .map(|(name, ty)| {
                let name = name.clone();
                prop::option::of(conforming_value(*ty)).prop_map(move |v| (name.clone(), v))
            })
            .collect();
        let schema = schema_from(&properties);
        values.prop_map(move |fields| {
            let payload: Map<String, Value> = fields
                .into_iter()
                .filter_map(|(name, value)| Some((name, value?)))
                .collect();
            (schema.clone(), payload)
        })
    })
}

proptest! {
    #[test]
    fn integer_and_boolean_schemas_always_validate(properties in declared_properties()) {
        let schema = validate_schema_definition(schema_from(&properties));
        prop_assert!(schema.is_ok());
        prop_assert_eq!(schema.unwrap().len(), properties.len());
    }

    #[test]
    fn any_other_property_type_is_rejected(
        properties in declared_properties(),
        bad_type in "[a-z]{1,10}".prop_filter("allowed type", |t| !matches!(t.as_str(), "integer" | "boolean" | "bool")),
    ) {
        let mut definition = schema_from(&properties);
        definition.properties.insert("offender".to_string(), json!({ "type": bad_type.clone() }));

        let err = validate_schema_definition(definition).unwrap_err();
        prop_assert_eq!(
            err,
            SchemaError::InvalidPropertyType {
                property: "offender".to_string(),
                found: Some(bad_type),
            }
        );
    }

    #[test]
    fn conforming_payloads_validate_and_revalidate((definition, payload) in schema_and_conforming_payload()) {
        let schema = validate_schema_definition(definition).unwrap();
        prop_assert!(validate_instance(&schema, &payload).is_ok());
        // idempotent
        prop_assert!(validate_instance(&schema, &payload).is_ok());
    }

    #[test]
    fn wrongly_typed_field_is_reported(
        (properties, index, value) in declared_properties()
            .prop_filter("need a property", |p| !p.is_empty())
            .prop_flat_map(|properties| {
                let len = properties.len();
                (Just(properties), 0..len)
            })
            .prop_flat_map(|(properties, index)| {
                let ty = properties[index].1;
                (Just(properties), Just(index), wrong_value(ty))
            }),
    ) {
        let schema = validate_schema_definition(schema_from(&properties)).unwrap();
        let (name, expected) = properties[index].clone();
        let mut payload = PolicyPayload::new();
        payload.insert(name.clone(), value);

        match validate_instance(&schema, &payload) {
            Err(InstanceError::TypeMismatch { field, expected: reported, .. }) => {
                prop_assert_eq!(field, name);
                prop_assert_eq!(reported, expected);
            }
            other => prop_assert!(false, "expected type mismatch, got {:?}", other),
        }
    }

    #[test]
    fn undeclared_fields_are_reported(
        properties in declared_properties(),
        extra in "[A-Z]{1,8}",
    ) {
        let schema = validate_schema_definition(schema_from(&properties)).unwrap();
        let mut payload = PolicyPayload::new();
        payload.insert(extra.clone(), json!(1));

        prop_assert_eq!(
            validate_instance(&schema, &payload),
            Err(InstanceError::UnknownField(extra))
        );
    }
}
