use blob_record_ingest::IngestError;
use blob_record_ingest::ingestion::json::{json_records, parse_json_str};
use blob_record_ingest::types::KeySchema;

#[test]
fn parse_json_fixture_happy_path() {
    let input = std::fs::read_to_string("tests/fixtures/locations.json").unwrap();
    let records = parse_json_str(&input, &KeySchema::default()).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get("LocationAbbr"), Some("NY"));
    assert_eq!(records[0].get("SortKey"), Some("s1"));
    assert_eq!(records[1].get("LocationDesc"), Some("California"));
}

#[test]
fn parse_json_stringifies_scalars() {
    let input = std::fs::read_to_string("tests/fixtures/locations.json").unwrap();
    let records = parse_json_str(&input, &KeySchema::default()).unwrap();

    assert_eq!(records[0].get("Year"), Some("2020"));
    assert_eq!(records[1].get("Flagged"), Some("true"));
    assert_eq!(records[1].get("Notes"), Some(""));
}

#[test]
fn parse_json_preserves_object_field_order() {
    let records = parse_json_str(r#"[{"z":"1","LocationAbbr":"CA","a":"2"}]"#, &KeySchema::default()).unwrap();
    assert_eq!(records[0].field_names().collect::<Vec<_>>(), vec!["z", "LocationAbbr", "a"]);
}

#[test]
fn parse_json_nested_values_become_json_text() {
    let records = parse_json_str(
        r#"[{"LocationAbbr":"CA","tags":["a","b"],"geo":{"lat":1.5}}]"#,
        &KeySchema::default(),
    )
    .unwrap();
    assert_eq!(records[0].get("tags"), Some(r#"["a","b"]"#));
    assert_eq!(records[0].get("geo"), Some(r#"{"lat":1.5}"#));
}

#[test]
fn parse_json_empty_array_yields_no_records() {
    assert!(parse_json_str("[]", &KeySchema::default()).unwrap().is_empty());
}

#[test]
fn parse_json_errors_on_malformed_document() {
    let err = parse_json_str(r#"[{"LocationAbbr": "CA""#, &KeySchema::default()).unwrap_err();
    assert!(matches!(err, IngestError::Json(_)));
    assert!(err.is_parse_error());
    assert!(err.to_string().contains("json error"));
}

#[test]
fn parse_json_errors_when_top_level_is_not_an_array() {
    let err = parse_json_str(r#"{"LocationAbbr": "CA"}"#, &KeySchema::default()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("malformed payload"));
    assert!(msg.contains("found object"));
}

#[test]
fn parse_json_errors_on_non_object_element() {
    let err = parse_json_str(r#"[{"LocationAbbr": "CA"}, 42]"#, &KeySchema::default()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("record 2 is not a json object"));
    assert!(msg.contains("number"));
}

#[test]
fn json_records_yields_records_before_a_bad_element() {
    let keys = KeySchema::default();
    let mut stream = json_records(r#"[{"LocationAbbr":"CA"}, "oops"]"#, &keys).unwrap();
    assert_eq!(stream.next().unwrap().unwrap().get("LocationAbbr"), Some("CA"));
    assert!(matches!(stream.next().unwrap(), Err(IngestError::MalformedPayload { .. })));
}

#[test]
fn parse_json_rejects_non_string_partition_key() {
    let err = parse_json_str(r#"[{"LocationAbbr": 7, "Value": "x"}]"#, &KeySchema::default()).unwrap_err();
    match err {
        IngestError::InvalidFieldType { record, field, found } => {
            assert_eq!(record, 1);
            assert_eq!(field, "LocationAbbr");
            assert_eq!(found, "number");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn parse_json_rejects_non_string_sort_key() {
    let err = parse_json_str(r#"[{"LocationAbbr": "CA", "SortKey": {"x": 1}}]"#, &KeySchema::default()).unwrap_err();
    assert!(matches!(err, IngestError::InvalidFieldType { found: "object", .. }));
}

#[test]
fn parse_json_key_type_check_follows_configured_names() {
    let keys = KeySchema::new("pk", "sk");
    // Numeric value under the default name is an ordinary field here.
    let records = parse_json_str(r#"[{"pk": "a", "LocationAbbr": 7}]"#, &keys).unwrap();
    assert_eq!(records[0].get("LocationAbbr"), Some("7"));

    let err = parse_json_str(r#"[{"pk": true}]"#, &keys).unwrap_err();
    assert!(matches!(err, IngestError::InvalidFieldType { found: "bool", .. }));
}

#[test]
fn parse_json_null_key_is_allowed_as_blank() {
    let records = parse_json_str(r#"[{"LocationAbbr": "CA", "SortKey": null}]"#, &KeySchema::default()).unwrap();
    assert_eq!(records[0].get("SortKey"), Some(""));
}
