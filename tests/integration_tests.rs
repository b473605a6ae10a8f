use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use toml_cursor::{
    from_str, parse, parse_incremental, stringify, stringify_with_options, to_string, to_value,
    Datetime, Error, ErrorKind, StringifyError, StringifyOptions, Table, Value, ValueKind,
};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct User {
    id: u32,
    name: String,
    active: bool,
    tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Product {
    sku: String,
    price: f64,
    quantity: u32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Order {
    order_id: u32,
    customer: User,
    items: Vec<Product>,
    total: f64,
}

fn order() -> Order {
    Order {
        order_id: 12345,
        customer: User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["vip".to_string()],
        },
        items: vec![
            Product {
                sku: "WIDGET-001".to_string(),
                price: 29.99,
                quantity: 2,
            },
            Product {
                sku: "GADGET-002".to_string(),
                price: 49.99,
                quantity: 1,
            },
        ],
        total: 109.97,
    }
}

#[test]
fn test_simple_struct() {
    let user = User {
        id: 123,
        name: "Alice".to_string(),
        active: true,
        tags: vec!["admin".to_string(), "developer".to_string()],
    };

    let text = to_string(&user).unwrap();
    let user_back: User = from_str(&text).unwrap();
    assert_eq!(user, user_back);
}

#[test]
fn test_nested_struct_layout() {
    let text = to_string(&order()).unwrap();
    assert_eq!(
        text,
        "order_id = 12345\n\
         total = 109.97\n\
         \n\
         [customer]\n\
         id = 123\n\
         name = \"Alice\"\n\
         active = true\n\
         tags = [ \"vip\" ]\n\
         \n\
         [[items]]\n\
         sku = \"WIDGET-001\"\n\
         price = 29.99\n\
         quantity = 2\n\
         \n\
         [[items]]\n\
         sku = \"GADGET-002\"\n\
         price = 49.99\n\
         quantity = 1\n"
    );

    let order_back: Order = from_str(&text).unwrap();
    assert_eq!(order_back, order());
}

#[test]
fn test_headers_build_nested_tables() {
    let doc = parse("title = \"demo\"\n[a.b]\nc = 1\n").unwrap();

    let mut b = Table::new();
    b.insert("c".to_string(), Value::Integer(1));
    let mut a = Table::new();
    a.insert("b".to_string(), Value::Table(b));
    let mut expected = Table::new();
    expected.insert("title".to_string(), Value::from("demo"));
    expected.insert("a".to_string(), Value::Table(a));

    assert_eq!(doc, expected);
}

#[test]
fn test_array_of_tables_structure() {
    let doc = parse("[[a]]\nx = 1\n[[a]]\nx = 2\n[[a.b]]\ny = 3\n").unwrap();
    let a = doc["a"].as_array().unwrap();
    assert_eq!(a.len(), 2);
    assert_eq!(doc["a"].kind(), ValueKind::List);
    assert!(a[0].get("b").is_none());
    assert_eq!(a[1]["b"][0]["y"], Value::Integer(3));
    assert_eq!(a[1]["b"].as_array().map(|b| b.len()), Some(1));
}

#[test]
fn test_duplicate_key_rejected() {
    let err = parse("a = 1\nb = 2\na = 2\n").unwrap_err();
    assert_eq!(err.kind, ErrorKind::KeyRedefinition { key: "a".to_string() });
    assert_eq!(err.line, 3);
}

#[test]
fn test_year_digits_boundary() {
    let doc = parse("d = 0001-01-01").unwrap();
    assert_eq!(doc["d"], Value::Datetime("0001-01-01".parse().unwrap()));
    assert!(matches!(doc["d"].as_datetime(), Some(Datetime::LocalDate(_))));

    let err = parse("d = 001-01-01").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidDateTime(_)), "{:?}", err);
}

#[test]
fn test_integer_past_i64_is_bigint() {
    let doc = parse("big = 9223372036854775808\nmax = 9223372036854775807").unwrap();
    assert!(matches!(doc["big"], Value::BigInt(_)));
    assert_eq!(doc["big"].to_string(), "9223372036854775808");
    assert_eq!(doc["max"], Value::Integer(i64::MAX));
    assert_eq!(doc["big"].kind(), ValueKind::Integer);
}

#[test]
fn test_mixed_array_rejected() {
    let err = parse("arr = [1, 2, \"x\"]").unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::MixedArrayTypes {
            expected: ValueKind::Integer,
            found: ValueKind::String,
        }
    );
}

#[test]
fn test_zoned_and_floating_datetimes() {
    let doc = parse("x = 1979-05-27T07:32:00Z\ny = 1979-05-27T07:32:00\n").unwrap();
    match doc["x"].as_datetime() {
        Some(Datetime::OffsetDateTime(dt)) => assert_eq!(dt.timestamp(), 296_638_320),
        other => panic!("expected zoned date-time, got {:?}", other),
    }
    assert!(matches!(
        doc["y"].as_datetime(),
        Some(Datetime::LocalDateTime(_))
    ));
    assert_ne!(doc["x"], doc["y"]);
}

#[test]
fn test_split_feed_equivalence() {
    let text = "# config\n[server]\nhost = \"ex\\u00e9mple\"\nports = [ 8080, 0x1F ]\n\
                [[db]]\nurl = '''\nfirst\nsecond'''\nwhen = 2024-01-02 03:04:05.678+01:00\n";
    let whole = parse(text).unwrap();
    let chars: Vec<char> = text.chars().collect();
    for split in 0..=chars.len() {
        let (head, tail): (String, String) = (
            chars[..split].iter().collect(),
            chars[split..].iter().collect(),
        );
        let mut parser = parse_incremental();
        parser.feed(&head).unwrap();
        parser.feed(&tail).unwrap();
        assert_eq!(parser.finish().unwrap(), whole, "split at {}", split);
    }
}

#[test]
fn test_round_trip_through_stringify() {
    let text = "name = \"toml\"\nratio = 0.5\nflags = [ true, false ]\n\
                point = { x = 1, y = -2 }\n[deps.serde]\nversion = \"1.0\"\n";
    let doc = parse(text).unwrap();
    let written = stringify(&doc).unwrap();
    assert_eq!(parse(&written).unwrap(), doc);
    assert_eq!(stringify(&parse(&written).unwrap()).unwrap(), written);
}

#[test]
fn test_stringify_rejects_mixed_arrays() {
    let mut table = Table::new();
    table.insert(
        "mixed".to_string(),
        Value::from(vec![Value::from(1), Value::from("one")]),
    );
    let err = stringify(&table).unwrap_err();
    assert_eq!(
        err,
        StringifyError::MixedArrayTypes {
            path: "mixed".to_string(),
            expected: ValueKind::Integer,
            found: ValueKind::String,
        }
    );
}

#[test]
fn test_stringify_promotes_numeric_arrays() {
    let mut table = Table::new();
    table.insert(
        "nums".to_string(),
        Value::from(vec![Value::from(1), Value::from(2.5)]),
    );
    assert_eq!(stringify(&table).unwrap(), "nums = [ 1.0, 2.5 ]\n");
}

#[test]
fn test_options_flow_through() {
    let doc = parse("[a]\nx = 1\n[a.b]\ny = 1234567\n").unwrap();
    let options = StringifyOptions::new().with_indent(4).with_group_digits(true);
    let text = stringify_with_options(&doc, options).unwrap();
    assert_eq!(text, "[a]\nx = 1\n\n    [a.b]\n    y = 1_234_567\n");
    assert_eq!(parse(&text).unwrap(), doc);
}

#[test]
fn test_none_fields_are_omitted() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Maybe {
        present: Option<i32>,
        absent: Option<i32>,
    }

    let value = Maybe {
        present: Some(1),
        absent: None,
    };
    let text = to_string(&value).unwrap();
    assert_eq!(text, "present = 1\n");
    assert_eq!(from_str::<Maybe>(&text).unwrap(), value);
}

#[test]
fn test_to_value_of_table() {
    let doc = parse("a = [1, 2]").unwrap();
    let value = to_value(&doc).unwrap();
    assert_eq!(value, Value::Table(doc));
}

#[test]
fn test_type_mismatch_reported() {
    #[derive(Deserialize, Debug)]
    struct Port {
        #[allow(dead_code)]
        port: u16,
    }
    let err = from_str::<Port>("port = 'eighty'").unwrap_err();
    assert!(!matches!(err, Error::Parse(_)), "{:?}", err);
}

#[test]
fn test_datetime_field_from_string() {
    #[derive(Deserialize, Debug)]
    struct Stamp {
        when: Datetime,
    }
    let stamp: Stamp = from_str("when = \"1979-05-27 07:32:00\"").unwrap();
    assert!(matches!(stamp.when, Datetime::LocalDateTime(_)));

    let err = from_str::<Stamp>("when = \"2024-01-01\u{e9}x\"").unwrap_err();
    assert!(err.to_string().contains("2024-01-01"), "{}", err);
}
