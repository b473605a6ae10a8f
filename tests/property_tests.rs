//! Property-based tests for the parse/stringify guarantees.
//!
//! Generated documents stay within what the stringifier can write back:
//! finite floats, arrays of one kind (or integers mixed with floats, which
//! come back as floats) and string keys. Tables nest through both `[path]`
//! and `[[path]]` blocks.

use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone};
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use toml_cursor::{
    from_str, parse, parse_incremental, stringify, to_string, Array, Datetime, Table, Value,
};

fn key() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-z][a-z0-9_-]{0,8}",
        1 => "[ -~]{1,6}",
    ]
}

fn text() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[ -~]{0,16}",
        1 => "[ -~\n\t]{0,16}",
        1 => "\\PC{0,8}",
    ]
}

fn float() -> impl Strategy<Value = f64> {
    prop_oneof![
        any::<f64>().prop_filter("finite", |f| f.is_finite()),
        -1.0e6..1.0e6f64,
        1.0e16..1.0e300f64,
        -1.0e-5..1.0e-5f64,
    ]
}

fn date() -> impl Strategy<Value = NaiveDate> {
    (1i32..=9999, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn time() -> impl Strategy<Value = NaiveTime> {
    let nanos = prop_oneof![
        Just(0u32),
        (0u32..1_000).prop_map(|ms| ms * 1_000_000),
        (0u32..1_000_000).prop_map(|us| us * 1_000),
        0u32..1_000_000_000,
    ];
    (0u32..24, 0u32..60, 0u32..60, nanos)
        .prop_map(|(h, m, s, n)| NaiveTime::from_hms_nano_opt(h, m, s, n).unwrap())
}

fn datetime() -> impl Strategy<Value = Datetime> {
    let offset = prop_oneof![Just(0i32), -1439i32..=1439]
        .prop_map(|minutes| FixedOffset::east_opt(minutes * 60).unwrap());
    prop_oneof![
        (date(), time(), offset).prop_map(|(d, t, offset)| {
            Datetime::from(offset.from_local_datetime(&d.and_time(t)).single().unwrap())
        }),
        (date(), time()).prop_map(|(d, t)| Datetime::from(d.and_time(t))),
        date().prop_map(Datetime::from),
        time().prop_map(Datetime::from),
    ]
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Integer),
        float().prop_map(Value::Float),
        any::<bool>().prop_map(Value::Boolean),
        text().prop_map(Value::String),
        datetime().prop_map(Value::Datetime),
    ]
}

fn array() -> impl Strategy<Value = Value> {
    let number = prop_oneof![
        (-1_000_000i64..1_000_000).prop_map(Value::Integer),
        float().prop_map(Value::Float),
    ];
    prop_oneof![
        vec(any::<i64>().prop_map(Value::Integer), 0..6),
        vec(float().prop_map(Value::Float), 0..6),
        vec(number, 0..6),
        vec(text().prop_map(Value::String), 0..6),
        vec(any::<bool>().prop_map(Value::Boolean), 0..6),
        vec(datetime().prop_map(Value::Datetime), 0..4),
    ]
    .prop_map(Value::from)
}

fn flat_table() -> impl Strategy<Value = Table> {
    btree_map(key(), prop_oneof![3 => scalar(), 1 => array()], 0..6)
        .prop_map(|entries| entries.into_iter().collect())
}

fn document() -> impl Strategy<Value = Table> {
    flat_table().prop_recursive(3, 24, 4, |inner| {
        (
            flat_table(),
            btree_map(key(), inner.clone(), 0..3),
            btree_map(key(), vec(inner, 1..3), 0..2),
        )
            .prop_map(|(mut root, nested, lists)| {
                for (k, table) in nested {
                    root.insert(k, Value::Table(table));
                }
                for (k, tables) in lists {
                    let array: Array = tables.into_iter().map(Value::Table).collect();
                    root.insert(k, Value::Array(array));
                }
                root
            })
    })
}

/// What a parse of the written text yields: integers sharing an array with
/// floats are read back as floats.
fn promoted(value: &Value) -> Value {
    match value {
        Value::Array(array) => {
            let mixed = array.iter().any(Value::is_float)
                && array.iter().any(|v| matches!(v, Value::Integer(_)));
            let array: Array = array
                .iter()
                .map(|v| match v {
                    Value::Integer(i) if mixed => Value::Float(*i as f64),
                    other => promoted(other),
                })
                .collect();
            Value::Array(array)
        }
        Value::Table(table) => Value::Table(promoted_table(table)),
        other => other.clone(),
    }
}

fn promoted_table(table: &Table) -> Table {
    table
        .iter()
        .map(|(k, v)| (k.clone(), promoted(v)))
        .collect()
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Record {
    id: i64,
    label: String,
    enabled: bool,
    scores: Vec<i32>,
    parent: Option<Box<Record>>,
}

fn record() -> impl Strategy<Value = Record> {
    let leaf = (any::<i64>(), text(), any::<bool>(), vec(any::<i32>(), 0..4)).prop_map(
        |(id, label, enabled, scores)| Record {
            id,
            label,
            enabled,
            scores,
            parent: None,
        },
    );
    leaf.prop_recursive(3, 8, 1, |inner| {
        (inner, any::<i64>(), text()).prop_map(|(parent, id, label)| Record {
            id,
            label,
            enabled: true,
            scores: vec![],
            parent: Some(Box::new(parent)),
        })
    })
}

proptest! {
    #[test]
    fn prop_stringify_then_parse_round_trips(doc in document()) {
        let written = stringify(&doc).unwrap();
        let parsed = parse(&written);
        prop_assert!(parsed.is_ok(), "{:?}\n{}", parsed, written);
        prop_assert_eq!(parsed.unwrap(), promoted_table(&doc));
    }

    #[test]
    fn prop_stringify_is_idempotent(doc in document()) {
        let first = stringify(&doc).unwrap();
        let second = stringify(&parse(&first).unwrap()).unwrap();
        prop_assert_eq!(second, first);
    }

    #[test]
    fn prop_split_feed_matches_whole(doc in document(), split in any::<prop::sample::Index>()) {
        let written = stringify(&doc).unwrap();
        let chars: Vec<char> = written.chars().collect();
        let at = split.index(chars.len() + 1);
        let head: String = chars[..at].iter().collect();
        let tail: String = chars[at..].iter().collect();

        let mut parser = parse_incremental();
        parser.feed(&head).unwrap();
        parser.feed(&tail).unwrap();
        prop_assert_eq!(parser.finish().unwrap(), parse(&written).unwrap());
    }

    #[test]
    fn prop_datetime_display_parses_back(dt in datetime()) {
        let text = dt.to_string();
        prop_assert_eq!(text.parse::<Datetime>().unwrap(), dt);
        let doc = parse(&format!("when = {}", text)).unwrap();
        prop_assert_eq!(doc.get("when"), Some(&Value::Datetime(dt)));
    }

    #[test]
    fn prop_serde_round_trips(value in record()) {
        let written = to_string(&value).unwrap();
        let back: Record = from_str(&written).unwrap();
        prop_assert_eq!(back, value);
    }
}
