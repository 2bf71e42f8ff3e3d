//! Conversion between elements, JSON records and Loro values.

use super::Record;
use crate::elements::Element;
use loro::{Container, LoroList, LoroMap, LoroResult, LoroValue, ValueOrContainer};
use serde_json::{Number, Value};

pub fn element_to_record(element: &Element) -> Record {
    match serde_json::to_value(element) {
        Ok(Value::Object(map)) => map,
        // Elements always serialize to objects.
        _ => Record::new(),
    }
}

/// `None` for records that do not describe a valid element.
pub fn element_from_record(record: &Record) -> Option<Element> {
    match serde_json::from_value(Value::Object(record.clone())) {
        Ok(element) => Some(element),
        Err(err) => {
            log::warn!("skipping malformed element record: {err}");
            None
        }
    }
}

fn scalar(value: &Value) -> Option<LoroValue> {
    Some(match value {
        Value::Null => LoroValue::Null,
        Value::Bool(b) => LoroValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => LoroValue::I64(i),
            None => LoroValue::Double(n.as_f64().unwrap_or(0.0)),
        },
        Value::String(s) => LoroValue::from(s.as_str()),
        Value::Array(_) | Value::Object(_) => return None,
    })
}

/// Write one field into a Loro map, nesting containers for arrays and objects.
pub(crate) fn write_field(map: &LoroMap, key: &str, value: &Value) -> LoroResult<()> {
    match value {
        Value::Array(items) => {
            let list = map.insert_container(key, LoroList::new())?;
            for item in items {
                push_item(&list, item)?;
            }
        }
        Value::Object(fields) => {
            let child = map.insert_container(key, LoroMap::new())?;
            for (k, v) in fields {
                write_field(&child, k, v)?;
            }
        }
        _ => {
            if let Some(v) = scalar(value) {
                map.insert(key, v)?;
            }
        }
    }
    Ok(())
}

/// Overwrite one field of an existing record. A list that only grew keeps its
/// container and gets just the new items appended.
pub(crate) fn update_field(map: &LoroMap, key: &str, value: &Value) -> LoroResult<()> {
    if let (Value::Array(items), Some(ValueOrContainer::Container(Container::List(list)))) = (value, map.get(key)) {
        let stored: Vec<Value> = match list.get_deep_value() {
            LoroValue::List(stored) => stored.iter().map(json_from_loro).collect(),
            _ => Vec::new(),
        };
        if stored.len() <= items.len() && stored[..] == items[..stored.len()] {
            for item in &items[stored.len()..] {
                push_item(&list, item)?;
            }
            return Ok(());
        }
    }
    write_field(map, key, value)
}

fn push_item(list: &LoroList, value: &Value) -> LoroResult<()> {
    match value {
        Value::Array(items) => {
            let child = list.insert_container(list.len(), LoroList::new())?;
            for item in items {
                push_item(&child, item)?;
            }
        }
        Value::Object(fields) => {
            let child = list.insert_container(list.len(), LoroMap::new())?;
            for (k, v) in fields {
                write_field(&child, k, v)?;
            }
        }
        _ => {
            if let Some(v) = scalar(value) {
                list.push(v)?;
            }
        }
    }
    Ok(())
}

/// Deep Loro value to JSON. Binary and unresolved containers become `null`.
pub fn json_from_loro(value: &LoroValue) -> Value {
    match value {
        LoroValue::Null => Value::Null,
        LoroValue::Bool(b) => Value::Bool(*b),
        LoroValue::Double(d) => Number::from_f64(*d).map(Value::Number).unwrap_or(Value::Null),
        LoroValue::I64(i) => Value::Number((*i).into()),
        LoroValue::String(s) => Value::String(s.to_string()),
        LoroValue::List(items) => Value::Array(items.iter().map(json_from_loro).collect()),
        LoroValue::Map(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.to_string(), json_from_loro(v)))
                .collect(),
        ),
        _ => Value::Null,
    }
}

/// Deep Loro map value to a record; `None` if it is not a map.
pub(crate) fn record_from_loro(value: &LoroValue) -> Option<Record> {
    match json_from_loro(value) {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{ElementKind, ElementStyle, Pen, SerializableColor};
    use kurbo::Point;
    use loro::{ContainerTrait, LoroDoc};
    use serde_json::json;

    #[test]
    fn test_element_record_roundtrip() {
        let mut pen = Pen::new(Point::new(1.0, 2.0));
        pen.push(Point::new(3.5, 4.0));
        let mut style = ElementStyle::new(SerializableColor::rgb(9, 8, 7), 3.0);
        style.fill = Some(SerializableColor::white());
        let el = Element::new(ElementKind::Pen(pen), style);

        let record = element_to_record(&el);
        assert_eq!(record["type"], "pen");
        assert_eq!(element_from_record(&record), Some(el));
    }

    #[test]
    fn test_malformed_record_is_skipped() {
        let record = json!({ "type": "rect", "id": "nope" });
        let Value::Object(record) = record else { unreachable!() };
        assert!(element_from_record(&record).is_none());
    }

    #[test]
    fn test_nested_fields_through_loro() {
        let doc = LoroDoc::new();
        let map = doc.get_map("m");
        let value = json!({
            "points": [{ "x": 1.0, "y": 2.5 }, { "x": 3.0, "y": -4.0 }],
            "fill": null,
            "bold": true,
            "count": 3,
            "name": "hi",
        });
        let Value::Object(fields) = &value else { unreachable!() };
        for (k, v) in fields {
            write_field(&map, k, v).unwrap();
        }
        doc.commit();

        let back = json_from_loro(&map.get_deep_value());
        assert_eq!(back, value);
    }

    fn list_id(map: &LoroMap, key: &str) -> loro::ContainerID {
        match map.get(key) {
            Some(ValueOrContainer::Container(Container::List(list))) => list.id(),
            _ => panic!("expected a list at {key}"),
        }
    }

    #[test]
    fn test_update_field_appends_grown_list() {
        let doc = LoroDoc::new();
        let map = doc.get_map("m");
        write_field(&map, "points", &json!([{ "x": 1.0, "y": 1.0 }])).unwrap();
        let before = list_id(&map, "points");

        let grown = json!([{ "x": 1.0, "y": 1.0 }, { "x": 2.0, "y": 3.0 }, { "x": 4.5, "y": 3.0 }]);
        update_field(&map, "points", &grown).unwrap();
        doc.commit();
        assert_eq!(list_id(&map, "points"), before);
        assert_eq!(json_from_loro(&map.get_deep_value())["points"], grown);

        // Anything other than growth replaces the list.
        let moved = json!([{ "x": 9.0, "y": 9.0 }]);
        update_field(&map, "points", &moved).unwrap();
        doc.commit();
        assert_ne!(list_id(&map, "points"), before);
        assert_eq!(json_from_loro(&map.get_deep_value())["points"], moved);
    }

    #[test]
    fn test_integral_numbers_read_as_f64() {
        let record = json!({ "x": 3 });
        let Value::Object(record) = record else { unreachable!() };
        let x: f64 = serde_json::from_value(record["x"].clone()).unwrap();
        assert_eq!(x, 3.0);
    }
}
