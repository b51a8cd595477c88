use super::{FieldPath, FieldPathSegment};

#[test]
fn root_renders_as_dollar() {
    let path = FieldPath::root();
    assert!(path.is_root());
    assert_eq!(path.to_string(), "$");
}

#[test]
fn builder_appends_keys_and_indexes() {
    let path = FieldPath::root().key("nodes").index(2).key("parameters");
    assert_eq!(
        path.segments(),
        &[
            FieldPathSegment::Key("nodes".to_string()),
            FieldPathSegment::Index(2),
            FieldPathSegment::Key("parameters".to_string()),
        ]
    );
    assert_eq!(path.to_string(), "$.nodes[2].parameters");
}

#[test]
fn keys_with_separators_are_quoted() {
    let path = FieldPath::root().key("mappings").key("bet/in_file");
    assert_eq!(path.to_string(), "$.mappings[\"bet/in_file\"]");
}
