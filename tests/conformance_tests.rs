//! Conformance Tests
//!
//! Validates instances against the vehicle fixture model.

use familiar_conformance::{
    ConformanceConfig, ModelError, ModelGraph, NotFoundReason, ValidationError, ValidationOptions,
    Validator, Value,
};
use rstest::rstest;
use tracing_subscriber::EnvFilter;

const VEHICLE: &str = "org.acme@1.0.0.Vehicle";
const CAR: &str = "org.acme@1.0.0.Car";
const TRUCK: &str = "org.acme@1.0.0.Truck";
const PERSON: &str = "org.acme@1.0.0.Person";
const ADDRESS: &str = "org.acme@1.0.0.Address";
const PART: &str = "org.acme@1.0.0.Part";
const NODE: &str = "org.acme@1.0.0.Node";
const MECHANIC: &str = "org.garage@1.0.0.Mechanic";
const TIRE: &str = "org.garage@1.0.0.Tire";
const INSPECTION: &str = "org.garage@1.0.0.Inspection";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn graph() -> ModelGraph {
    init_tracing();
    ModelGraph::from_json_str(include_str!("fixtures/vehicles.json")).unwrap()
}

fn car(vin: &str) -> Value {
    Value::resource(CAR, vin).with("vin", vin).with("model", "Roadster")
}

fn check(graph: &ModelGraph, value: &mut Value) -> Result<(), ValidationError> {
    Validator::new(graph, ValidationOptions::default()).validate_instance(value)
}

// =============================================================================
// Primitive Fields
// =============================================================================

#[test]
fn test_number_for_string_field() {
    let graph = graph();
    let mut value = car("V1").with("model", 123);

    let err = check(&graph, &mut value).unwrap_err();
    assert_eq!(err.kind(), "TypeMismatch");
    assert!(err.to_string().contains(
        r#"has a value of "123" (type of value: "number"). Expected type of value: "String""#
    ));
    assert!(err.to_string().starts_with(
        r#"Model violation in the "org.acme@1.0.0.Car#V1" instance. The field "model""#
    ));
}

#[test]
fn test_missing_required_field() {
    let graph = graph();
    let mut value = Value::resource(CAR, "V1").with("vin", "V1");

    match check(&graph, &mut value).unwrap_err() {
        ValidationError::TypeMismatch {
            property,
            actual_type,
            ..
        } => {
            assert_eq!(property, "model");
            assert_eq!(actual_type, "undefined");
        }
        other => panic!("Expected TypeMismatch, got {:?}", other),
    }
}

#[test]
fn test_optional_fields_may_be_absent() {
    let graph = graph();
    check(&graph, &mut car("V1")).unwrap();
}

#[test]
fn test_not_a_number_is_a_type_mismatch() {
    let graph = graph();
    let mut value = Value::resource(TRUCK, "T1")
        .with("vin", "T1")
        .with("model", "Hauler")
        .with("payload", f64::NAN);

    let err = check(&graph, &mut value).unwrap_err();
    assert_eq!(err.kind(), "TypeMismatch");
    assert!(err.to_string().contains(r#"has a value of "NaN""#));
}

// =============================================================================
// Arrays
// =============================================================================

#[test]
fn test_first_failing_array_element_reported() {
    let graph = graph();
    let mut value = car("V1").with("serviceHistory", vec![Value::from("FOO"), Value::from(1)]);

    let err = check(&graph, &mut value).unwrap_err();
    assert!(err.to_string().contains(
        r#"has a value of "1" (type of value: "number"). Expected type of value: "String[]""#
    ));
}

#[test]
fn test_scalar_for_array_field() {
    let graph = graph();
    let mut value = car("V1").with("serviceHistory", "FOO");

    match check(&graph, &mut value).unwrap_err() {
        ValidationError::TypeMismatch {
            property,
            actual_type,
            expected_type,
            ..
        } => {
            assert_eq!(property, "serviceHistory");
            assert_eq!(actual_type, "string");
            assert_eq!(expected_type, "String[]");
        }
        other => panic!("Expected TypeMismatch, got {:?}", other),
    }
}

#[test]
fn test_empty_array_accepted() {
    let graph = graph();
    let mut value = car("V1").with("serviceHistory", Vec::<Value>::new());
    check(&graph, &mut value).unwrap();
}

// =============================================================================
// Inheritance
// =============================================================================

#[test]
fn test_subtype_accepted_for_declared_type() {
    let graph = graph();
    let validator = Validator::new(&graph, ValidationOptions::default());
    let vehicle = graph.declaration(VEHICLE).unwrap();

    validator.validate(vehicle, &mut car("V1"), None).unwrap();

    let tire = Value::concept(TIRE).with("name", "front").with("size", 17);
    let mut value = car("V2").with("parts", vec![tire]);
    validator.validate_instance(&mut value).unwrap();
}

#[test]
fn test_unrelated_type_rejected() {
    let graph = graph();
    let validator = Validator::new(&graph, ValidationOptions::default());
    let vehicle = graph.declaration(VEHICLE).unwrap();
    let mut person = Value::resource(PERSON, "p@x").with("email", "p@x");

    match validator.validate(vehicle, &mut person, Some("p@x")).unwrap_err() {
        ValidationError::TypeMismatch {
            property,
            actual_type,
            expected_type,
            ..
        } => {
            assert_eq!(property, "$class");
            assert_eq!(actual_type, PERSON);
            assert_eq!(expected_type, VEHICLE);
        }
        other => panic!("Expected TypeMismatch, got {:?}", other),
    }
}

#[test]
fn test_embedded_concept_of_wrong_type() {
    let graph = graph();
    let mut value = car("V1").with("garage", Value::concept(PART).with("name", "bolt"));

    match check(&graph, &mut value).unwrap_err() {
        ValidationError::TypeMismatch {
            property,
            actual_type,
            expected_type,
            ..
        } => {
            assert_eq!(property, "garage");
            assert_eq!(actual_type, PART);
            assert_eq!(expected_type, ADDRESS);
        }
        other => panic!("Expected TypeMismatch, got {:?}", other),
    }
}

#[test]
fn test_supertype_rejected_for_embedded_subtype() {
    let graph = graph();
    let spare = Value::concept(PART).with("name", "x");
    let mut value = Value::concept(INSPECTION).with("spare", spare);

    match check(&graph, &mut value).unwrap_err() {
        ValidationError::TypeMismatch {
            property,
            actual_type,
            expected_type,
            ..
        } => {
            assert_eq!(property, "spare");
            assert_eq!(actual_type, PART);
            assert_eq!(expected_type, TIRE);
        }
        other => panic!("Expected TypeMismatch, got {:?}", other),
    }

    let tire = Value::concept(TIRE).with("name", "spare").with("size", 16);
    let mut value = Value::concept(INSPECTION).with("spare", tire);
    check(&graph, &mut value).unwrap();
}

#[test]
fn test_embedded_concept_fields_checked() {
    let graph = graph();
    let mut value = car("V1").with("garage", Value::concept(ADDRESS).with("city", 7));

    let err = check(&graph, &mut value).unwrap_err();
    assert!(err.to_string().contains(r#"The field "city" has a value of "7""#));
}

#[test]
fn test_abstract_class_rejected() {
    let graph = graph();
    let mut value = Value::resource(VEHICLE, "V1").with("vin", "V1").with("model", "Generic");

    let err = check(&graph, &mut value).unwrap_err();
    assert_eq!(
        err.to_string(),
        "The class \"org.acme@1.0.0.Vehicle\" is abstract. Should not have an instance!"
    );
}

#[test]
fn test_resource_where_concept_expected() {
    let graph = graph();
    let address = Value::resource(ADDRESS, "a1").with("city", "Oslo");
    let mut value = car("V1").with("garage", address);

    let err = check(&graph, &mut value).unwrap_err();
    assert_eq!(err.kind(), "NotAResourceOrConcept");
}

// =============================================================================
// Properties and Identifiers
// =============================================================================

#[test]
fn test_undeclared_property() {
    let graph = graph();
    let mut value = car("V1").with("wheels", 4);

    match check(&graph, &mut value).unwrap_err() {
        ValidationError::UndeclaredProperty {
            property, class_name, ..
        } => {
            assert_eq!(property, "wheels");
            assert_eq!(class_name, CAR);
        }
        other => panic!("Expected UndeclaredProperty, got {:?}", other),
    }
}

#[test]
fn test_sibling_field_is_undeclared() {
    let graph = graph();
    let mut value = Value::resource(TRUCK, "T1")
        .with("vin", "T1")
        .with("model", "Hauler")
        .with("doors", 2);

    let err = check(&graph, &mut value).unwrap_err();
    assert_eq!(err.kind(), "UndeclaredProperty");
}

#[test]
fn test_identifier_key_always_permitted() {
    let graph = graph();
    let mut value = car("V1").with("$identifier", "V1");
    check(&graph, &mut value).unwrap();
}

#[test]
fn test_identifier_normalization_is_idempotent() {
    let graph = graph();
    let mut value = Value::bare_resource(CAR).with("vin", "V9").with("model", "Roadster");

    check(&graph, &mut value).unwrap();
    let first = match &value {
        Value::Resource(resource) => resource.identifier.clone(),
        other => panic!("Expected Resource, got {:?}", other),
    };
    check(&graph, &mut value).unwrap();
    let second = match &value {
        Value::Resource(resource) => resource.identifier.clone(),
        other => panic!("Expected Resource, got {:?}", other),
    };

    assert_eq!(first.as_deref(), Some("V9"));
    assert_eq!(first, second);
}

#[test]
fn test_empty_identifier_field_filled_from_shadow() {
    let graph = graph();
    let mut value = Value::resource(CAR, "V7").with("vin", "").with("model", "Roadster");

    check(&graph, &mut value).unwrap();
    assert_eq!(value.get("vin"), Some(&Value::from("V7")));
}

#[test]
fn test_empty_identifier_rejected() {
    let graph = graph();
    let mut value = Value::resource(CAR, "  ").with("vin", "").with("model", "Roadster");

    let err = check(&graph, &mut value).unwrap_err();
    assert_eq!(err.to_string(), "Instance \"undefined\" has an empty identifier.");
}

// =============================================================================
// Enums
// =============================================================================

#[rstest]
#[case("RED")]
#[case("GREEN")]
#[case("BLUE")]
fn test_enum_literals_accepted(#[case] literal: &str) {
    let graph = graph();
    let mut value = car("V1").with("color", Value::enum_value(literal));
    check(&graph, &mut value).unwrap();
}

#[rstest]
#[case("PURPLE")]
#[case("red")]
#[case("")]
fn test_enum_literals_rejected(#[case] literal: &str) {
    let graph = graph();
    let mut value = car("V1").with("color", literal);

    match check(&graph, &mut value).unwrap_err() {
        ValidationError::InvalidEnumValue { value, enum_name, .. } => {
            assert_eq!(value, literal);
            assert_eq!(enum_name, "org.acme@1.0.0.Color");
        }
        other => panic!("Expected InvalidEnumValue, got {:?}", other),
    }
}

// =============================================================================
// Relationships
// =============================================================================

#[test]
fn test_relationship_accepted() {
    let graph = graph();
    let mut value = car("V1").with("owner", Value::relationship(PERSON, "p@x"));
    check(&graph, &mut value).unwrap();

    let mut value = car("V2").with("owner", Value::relationship(MECHANIC, "m@x"));
    check(&graph, &mut value).unwrap();
}

#[test]
fn test_relationship_to_unrelated_type() {
    let graph = graph();
    let mut value = car("V1").with("owner", Value::relationship(CAR, "V2"));

    match check(&graph, &mut value).unwrap_err() {
        ValidationError::RelationshipTypeMismatch {
            property,
            actual_type,
            expected_type,
            ..
        } => {
            assert_eq!(property, "owner");
            assert_eq!(actual_type, CAR);
            assert_eq!(expected_type, PERSON);
        }
        other => panic!("Expected RelationshipTypeMismatch, got {:?}", other),
    }
}

#[test]
fn test_supertype_relationship_rejected() {
    let graph = graph();
    let inspector = Value::relationship(PERSON, "p@x");
    let mut value = Value::concept(INSPECTION).with("inspector", inspector);

    match check(&graph, &mut value).unwrap_err() {
        ValidationError::RelationshipTypeMismatch {
            actual_type,
            expected_type,
            ..
        } => {
            assert_eq!(actual_type, PERSON);
            assert_eq!(expected_type, MECHANIC);
        }
        other => panic!("Expected RelationshipTypeMismatch, got {:?}", other),
    }

    let mut value =
        Value::concept(INSPECTION).with("inspector", Value::relationship(MECHANIC, "m@x"));
    check(&graph, &mut value).unwrap();
}

#[test]
fn test_relationship_array_requires_array() {
    let graph = graph();
    let mut value = car("V1").with("drivers", Value::relationship(PERSON, "p@x"));

    match check(&graph, &mut value).unwrap_err() {
        ValidationError::TypeMismatch {
            property,
            expected_type,
            ..
        } => {
            assert_eq!(property, "drivers");
            assert_eq!(expected_type, "org.acme@1.0.0.Person[]");
        }
        other => panic!("Expected TypeMismatch, got {:?}", other),
    }
}

#[test]
fn test_relationship_array_elements_checked() {
    let graph = graph();
    let drivers = vec![
        Value::relationship(PERSON, "p@x"),
        Value::relationship(MECHANIC, "m@x"),
    ];
    check(&graph, &mut car("V1").with("drivers", drivers)).unwrap();

    let drivers = vec![
        Value::relationship(PERSON, "p@x"),
        Value::relationship(CAR, "V2"),
    ];
    match check(&graph, &mut car("V1").with("drivers", drivers)).unwrap_err() {
        ValidationError::RelationshipTypeMismatch {
            property,
            actual_type,
            ..
        } => {
            assert_eq!(property, "drivers");
            assert_eq!(actual_type, CAR);
        }
        other => panic!("Expected RelationshipTypeMismatch, got {:?}", other),
    }
}

#[test]
fn test_resource_for_relationship_rejected_by_default() {
    let graph = graph();
    let owner = Value::resource(PERSON, "p@x").with("email", "p@x");
    let mut value = car("V1").with("owner", owner);

    let err = check(&graph, &mut value).unwrap_err();
    assert_eq!(err.kind(), "RelationshipTypeMismatch");
    assert!(err.to_string().contains("resource org.acme@1.0.0.Person"));
}

#[rstest]
#[case(true, false)]
#[case(false, true)]
fn test_resource_for_relationship_with_options(#[case] convert: bool, #[case] permit: bool) {
    let graph = graph();
    let options = ValidationOptions {
        convert_resources_to_relationships: convert,
        permit_resources_for_relationships: permit,
        ..ValidationOptions::default()
    };
    let owner = Value::resource(PERSON, "p@x").with("email", "p@x");
    let mut value = car("V1").with("owner", owner);

    Validator::new(&graph, options).validate_instance(&mut value).unwrap();
}

#[test]
fn test_options_from_config() {
    let graph = graph();
    let mut config = ConformanceConfig::default();
    config.validation.permit_resources_for_relationships = true;
    let owner = Value::resource(PERSON, "p@x").with("email", "p@x");
    let mut value = car("V1").with("owner", owner);

    Validator::from_config(&graph, &config)
        .validate_instance(&mut value)
        .unwrap();
}

// =============================================================================
// Graph Mutation
// =============================================================================

#[test]
fn test_deleted_namespace_surfaces_type_not_found() {
    let mut graph = graph();
    let mut mechanic = Value::resource(MECHANIC, "m@x").with("email", "m@x");
    let tire = Value::concept(TIRE).with("name", "front").with("size", 17);
    let mut value = car("V1").with("parts", vec![tire]);
    check(&graph, &mut mechanic).unwrap();
    check(&graph, &mut value).unwrap();

    graph.remove_namespace("org.garage@1.0.0").unwrap();

    for instance in [&mut mechanic, &mut value] {
        match check(&graph, instance).unwrap_err() {
            ValidationError::TypeNotFound(not_found) => {
                assert_eq!(not_found.namespace, "org.garage@1.0.0");
                assert_eq!(not_found.reason, NotFoundReason::NamespaceNotLoaded);
            }
            other => panic!("Expected TypeNotFound, got {:?}", other),
        }
    }
}

#[test]
fn test_type_not_found_is_schema_error() {
    let graph = graph();
    let mut value = Value::concept("org.other@2.0.0.Widget");

    let err = check(&graph, &mut value).unwrap_err();
    assert!(err.is_schema_error());
    assert!(err.to_string().contains(r#"not found in namespace "org.other@2.0.0""#));
}

#[test]
fn test_namespace_in_use_not_removed() {
    let mut graph = graph();
    let err = graph.remove_namespace("org.acme@1.0.0").unwrap_err();
    assert!(matches!(err, ModelError::NamespaceInUse { .. }));
    assert!(graph.has_namespace("org.acme@1.0.0"));
}

// =============================================================================
// Depth Limit
// =============================================================================

fn node_chain(depth: usize) -> Value {
    let mut node = Value::concept(NODE).with("label", format!("n{depth}"));
    for i in (0..depth).rev() {
        node = Value::concept(NODE).with("label", format!("n{i}")).with("child", node);
    }
    node
}

#[test]
fn test_depth_limit() {
    let graph = graph();
    let node = graph.declaration(NODE).unwrap();

    let options = ValidationOptions {
        max_depth: 3,
        ..ValidationOptions::default()
    };
    let err = Validator::new(&graph, options)
        .validate(node, &mut node_chain(5), None)
        .unwrap_err();
    assert!(matches!(err, ValidationError::DepthLimitExceeded { limit: 3, .. }));

    Validator::new(&graph, ValidationOptions::default())
        .validate(node, &mut node_chain(5), None)
        .unwrap();
}
