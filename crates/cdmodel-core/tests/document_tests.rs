//! Integration tests against the fixture schema documents

use cdmodel_core::{
    DataType, Document, DocumentError, Entity, JsonObject, JsonShape, LocalEntity, ModelError, NamedReferenceOrDefinition,
    Purpose,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::path::PathBuf;

fn fixture(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fixtures").join(relative)
}

fn fixture_json(relative: &str) -> Value {
    let contents = std::fs::read_to_string(fixture(relative)).unwrap();
    serde_json::from_str(&contents).unwrap()
}

#[test]
fn fixture_documents_roundtrip() {
    for name in ["schemaDocuments/foundations.cdm.json", "schemaDocuments/Customer.cdm.json"] {
        let raw = fixture_json(name);
        let document = Document::from_json(&raw).unwrap();
        assert_eq!(document.to_json(), raw, "round-trip of {}", name);

        let reparsed = Document::from_json(&document.to_json()).unwrap();
        assert_eq!(reparsed, document);
    }
}

#[test]
fn pretty_text_roundtrip() {
    let document = Document::from_file(&fixture("schemaDocuments/Customer.cdm.json")).unwrap();
    let text = document.to_string_pretty().unwrap();
    assert_eq!(Document::from_str(&text).unwrap(), document);
}

#[test]
fn resolve_three_level_purpose_chain() {
    let document = Document::from_file(&fixture("schemaDocuments/foundations.cdm.json")).unwrap();
    let effective = document.resolve_purpose("identifiedBy").unwrap();

    assert_eq!(effective.chain, vec!["identifiedBy", "hasA", "meaningOf"]);
    assert_eq!(effective.names(), vec!["is.required", "is.identifiedBy", "is.constrained"]);

    let constrained = effective.get("is.constrained").unwrap().as_definition().unwrap();
    assert_eq!(constrained.argument("maximumLength"), Some(&json!(64)));
}

#[test]
fn resolve_inline_parent_from_fixture() {
    let document = Document::from_file(&fixture("schemaDocuments/foundations.cdm.json")).unwrap();
    let effective = document.resolve_purpose("ordinal").unwrap();
    assert_eq!(effective.names(), vec!["is.ordered", "is.required"]);
    assert_eq!(effective.chain, vec!["ordinal", "position"]);
}

#[test]
fn resolve_trait_parameters_from_fixture() {
    let document = Document::from_file(&fixture("schemaDocuments/foundations.cdm.json")).unwrap();
    let effective = document.resolve_trait("is.constrained.length").unwrap();

    assert_eq!(effective.names(), vec!["minimumValue", "maximumValue", "maximumLength"]);
    assert_eq!(effective.get("maximumLength").unwrap().default_value, Some(json!(256)));
    assert_eq!(effective.get("maximumLength").unwrap().required, Some(true));
}

#[test]
fn resolution_does_not_change_the_document() {
    let document = Document::from_file(&fixture("schemaDocuments/foundations.cdm.json")).unwrap();
    let before = document.to_json();

    document.resolve_purpose("identifiedBy").unwrap();
    document.resolve_trait("is.constrained.length").unwrap();

    assert_eq!(document.to_json(), before);
}

#[test]
fn customer_entity_composition() {
    let document = Document::from_file(&fixture("schemaDocuments/Customer.cdm.json")).unwrap();

    assert_eq!(document.imports[1].moniker.as_deref(), Some("catalog"));

    let customer = document.entity("Customer").and_then(Entity::as_local).unwrap();
    assert_eq!(customer.attribute_names(), vec!["customerId", "fullName", "createdOn", "creditLimit"]);
    assert_eq!(customer.find_attribute("creditLimit").unwrap().data_type, Some(DataType::Decimal));
    assert_eq!(customer.partitions[0].csv_settings().unwrap().delimiter(), ";");
    assert_eq!(customer.partitions[1].location.as_deref(), Some("Customer/archive/"));
    assert_eq!(customer.imports[0].moniker.as_deref(), Some("base"));
    assert!(customer.header.exhibits_traits[0].is_definition());

    let product = document.entity("Product").unwrap();
    assert_eq!(product.as_referenced().unwrap().source, "CatalogItem");
}

#[test]
fn cyclic_fixture_fails_resolution_from_both_ends() {
    let document = Document::from_file(&fixture("invalid/cyclicPurposes.cdm.json")).unwrap();

    for name in ["A", "B"] {
        assert!(matches!(
            document.resolve_purpose(name),
            Err(ModelError::CyclicInheritance { .. })
        ));
    }
}

#[test]
fn duplicate_attribute_fixture_fails_to_load() {
    let err = Document::from_file(&fixture("invalid/duplicateAttribute.cdm.json")).unwrap_err();
    match err {
        DocumentError::Model(ModelError::DuplicateAttribute { entity, attribute }) => {
            assert_eq!(entity, "Account");
            assert_eq!(attribute, "id");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn numeric_reference_fixture_fails_to_load() {
    let err = Document::from_file(&fixture("invalid/numericReference.cdm.json")).unwrap_err();
    match err {
        DocumentError::Model(ModelError::InvalidReferenceShape { field, shape }) => {
            assert_eq!(field, "document.definitions[0].exhibitsTraits[1]");
            assert_eq!(shape, JsonShape::Number);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn missing_file_is_an_io_error() {
    assert!(matches!(
        Document::from_file(&fixture("does-not-exist.cdm.json")),
        Err(DocumentError::IoError(_, _))
    ));
}

#[test]
fn reference_discrimination_at_each_position() {
    let purpose = Purpose::from_json(&json!({
        "purposeName": "p",
        "extendsPurpose": "Foo.Bar",
        "exhibitsTraits": [{ "traitName": "X" }, "Y"]
    }))
    .unwrap();

    assert_eq!(purpose.extends_purpose, Some(NamedReferenceOrDefinition::Name("Foo.Bar".into())));
    assert!(purpose.exhibits_traits[0].is_definition());
    assert_eq!(purpose.exhibits_traits[1].as_name(), Some("Y"));

    let inline = Purpose::from_json(&json!({ "purposeName": "q", "extendsPurpose": { "purposeName": "X" } })).unwrap();
    let parent = inline.extends_purpose.unwrap();
    assert_eq!(parent.as_definition().unwrap(), &Purpose::new("X"));
}

#[test]
fn saved_document_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Lead.cdm.json");

    let document = Document::new().with_definition(Entity::from(LocalEntity::new("Lead")));
    document.save_to_file(&path).unwrap();

    assert_eq!(Document::from_file(&path).unwrap(), document);
}
