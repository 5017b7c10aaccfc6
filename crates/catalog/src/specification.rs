//! Schema-less technical specifications.
//!
//! Products carry an open attribute bag (`"horsepower": {"value": 120, "unit": "hp"}`,
//! `"engine_type": "Diesel"`). The key set differs per product family, so the
//! bag is kept ordered as stored and every value is normalised through
//! [`SpecValue::from_json`] into an explicit variant before it is compared or
//! rendered.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

use agrocat_core::{Language, ValueObject};

/// A bare, comparable attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecScalar {
    Number(Decimal),
    Text(String),
    Flag(bool),
}

impl SpecScalar {
    fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Null => None,
            JsonValue::Bool(b) => Some(SpecScalar::Flag(*b)),
            JsonValue::Number(n) => {
                let raw = n.to_string();
                let parsed = Decimal::from_str(&raw).or_else(|_| Decimal::from_scientific(&raw));
                Some(match parsed {
                    Ok(d) => SpecScalar::Number(d),
                    Err(_) => SpecScalar::Text(raw),
                })
            }
            JsonValue::String(s) => Some(SpecScalar::Text(s.clone())),
            other => Some(SpecScalar::Text(other.to_string())),
        }
    }

    fn to_json(&self) -> JsonValue {
        match self {
            SpecScalar::Number(d) => serde_json::from_str(&d.to_string())
                .unwrap_or_else(|_| JsonValue::String(d.to_string())),
            SpecScalar::Text(s) => JsonValue::String(s.clone()),
            SpecScalar::Flag(b) => JsonValue::Bool(*b),
        }
    }

    /// Numeric view: numbers as-is, text gets exactly one parse attempt.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            SpecScalar::Number(d) => Some(*d),
            SpecScalar::Text(s) => Decimal::from_str(s.trim()).ok(),
            SpecScalar::Flag(_) => None,
        }
    }
}

impl fmt::Display for SpecScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecScalar::Number(d) => write!(f, "{d}"),
            SpecScalar::Text(s) => f.write_str(s),
            SpecScalar::Flag(b) => write!(f, "{b}"),
        }
    }
}

/// A stored attribute value: either a bare scalar or a `{value, unit}` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecValue {
    Scalar(Option<SpecScalar>),
    WithUnit {
        value: Option<SpecScalar>,
        unit: Option<String>,
    },
}

impl SpecValue {
    pub fn number(value: Decimal) -> Self {
        SpecValue::Scalar(Some(SpecScalar::Number(value)))
    }

    pub fn text(value: impl Into<String>) -> Self {
        SpecValue::Scalar(Some(SpecScalar::Text(value.into())))
    }

    pub fn with_unit(value: Decimal, unit: impl Into<String>) -> Self {
        SpecValue::WithUnit {
            value: Some(SpecScalar::Number(value)),
            unit: Some(unit.into()),
        }
    }

    /// Total conversion from stored JSON.
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Object(obj) => SpecValue::WithUnit {
                value: obj.get("value").and_then(SpecScalar::from_json),
                unit: obj
                    .get("unit")
                    .and_then(JsonValue::as_str)
                    .map(str::trim)
                    .filter(|u| !u.is_empty())
                    .map(str::to_string),
            },
            other => SpecValue::Scalar(SpecScalar::from_json(other)),
        }
    }

    /// The bare value, whichever form it was stored in.
    pub fn scalar(&self) -> Option<&SpecScalar> {
        match self {
            SpecValue::Scalar(v) => v.as_ref(),
            SpecValue::WithUnit { value, .. } => value.as_ref(),
        }
    }

    /// Display form: `"120 hp"` for a pair, `"120"` for a bare scalar.
    pub fn display(&self) -> String {
        let value = self.scalar().map(ToString::to_string).unwrap_or_default();
        match self {
            SpecValue::WithUnit { unit: Some(unit), .. } => format!("{value} {unit}").trim().to_string(),
            _ => value,
        }
    }
}

impl ValueObject for SpecValue {}

fn scalar_json(value: Option<&SpecScalar>) -> JsonValue {
    value.map(SpecScalar::to_json).unwrap_or(JsonValue::Null)
}

/// Writes `{"value": .., "unit": ..}` in that order.
impl Serialize for SpecValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SpecValue::Scalar(v) => scalar_json(v.as_ref()).serialize(serializer),
            SpecValue::WithUnit { value, unit } => {
                let mut map = serializer.serialize_map(Some(1 + usize::from(unit.is_some())))?;
                map.serialize_entry("value", &scalar_json(value.as_ref()))?;
                if let Some(unit) = unit {
                    map.serialize_entry("unit", unit)?;
                }
                map.end()
            }
        }
    }
}

/// Ordered attribute bag (`name → value`), kept in stored order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Specifications(Vec<(String, SpecValue)>);

impl Specifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an attribute, keeping its original position on replace.
    pub fn insert(&mut self, name: impl Into<String>, value: SpecValue) {
        let name = name.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: SpecValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&SpecValue> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SpecValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Specifications {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Specifications {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SpecsVisitor;

        impl<'de> Visitor<'de> for SpecsVisitor {
            type Value = Specifications;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of specification name to value")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut specs = Specifications::new();
                while let Some((key, value)) = access.next_entry::<String, JsonValue>()? {
                    specs.insert(key, SpecValue::from_json(&value));
                }
                Ok(specs)
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(Specifications::new())
            }
        }

        deserializer.deserialize_any(SpecsVisitor)
    }
}

/// One rendered attribute row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecificationLine {
    pub key: String,
    pub label: String,
    pub value: String,
}

/// Read view over one product's specifications.
#[derive(Debug, Clone, Copy)]
pub struct SpecificationIndex<'a> {
    specs: &'a Specifications,
}

impl<'a> SpecificationIndex<'a> {
    pub fn new(specs: &'a Specifications) -> Self {
        Self { specs }
    }

    /// Bare value of an attribute; unknown names and JSON nulls are absent.
    pub fn value_of(&self, name: &str) -> Option<&'a SpecScalar> {
        self.specs.get(name).and_then(SpecValue::scalar)
    }

    /// Inclusive range check. Absent or non-numeric values never match.
    pub fn in_range(&self, name: &str, min: Option<Decimal>, max: Option<Decimal>) -> bool {
        let Some(value) = self.value_of(name).and_then(SpecScalar::as_decimal) else {
            return false;
        };
        min.is_none_or(|m| value >= m) && max.is_none_or(|m| value <= m)
    }

    pub fn render(&self, lang: Language) -> Vec<SpecificationLine> {
        self.specs
            .iter()
            .map(|(key, value)| SpecificationLine {
                key: key.to_string(),
                label: label_for(key, lang)
                    .map(str::to_string)
                    .unwrap_or_else(|| humanize(key)),
                value: value.display(),
            })
            .collect()
    }
}

fn label_for(key: &str, lang: Language) -> Option<&'static str> {
    let (ru, uz, en) = match key {
        "horsepower" => ("Мощность", "Quvvat", "Power"),
        "engine_type" => ("Двигатель", "Dvigatel", "Engine"),
        "transmission" => ("КПП", "Uzatma", "Transmission"),
        "fuel_capacity" => ("Топливный бак", "Yoqilg'i sig'imi", "Fuel Tank"),
        "working_width" => ("Рабочая ширина", "Ish kengligi", "Working Width"),
        "weight" => ("Вес", "Og'irlik", "Weight"),
        _ => return None,
    };
    Some(match lang {
        Language::Ru => ru,
        Language::Uz => uz,
        Language::En => en,
    })
}

/// `"max_lift_capacity"` → `"Max Lift Capacity"`.
fn humanize(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut prev_alpha = false;
    for c in key.chars().map(|c| if c == '_' { ' ' } else { c }) {
        if prev_alpha {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_alpha = c.is_alphabetic();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Specifications {
        serde_json::from_str(
            r#"{
                "horsepower": {"value": 120, "unit": "hp"},
                "engine_type": {"value": "Дизель YTO 4-цилиндра"},
                "fuel_capacity": {"value": "200", "unit": "л"},
                "cylinders": 4,
                "max_lift_capacity": "2.5 t",
                "serial": null
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn normalises_both_forms_to_bare_value() {
        let specs = sample();
        let index = SpecificationIndex::new(&specs);
        assert_eq!(index.value_of("horsepower"), Some(&SpecScalar::Number(Decimal::from(120))));
        assert_eq!(index.value_of("cylinders"), Some(&SpecScalar::Number(Decimal::from(4))));
        assert_eq!(
            index.value_of("engine_type"),
            Some(&SpecScalar::Text("Дизель YTO 4-цилиндра".to_string()))
        );
        assert_eq!(index.value_of("serial"), None);
        assert_eq!(index.value_of("unknown"), None);
    }

    #[test]
    fn range_is_inclusive_and_absent_is_false() {
        let specs = sample();
        let index = SpecificationIndex::new(&specs);
        assert!(index.in_range("horsepower", Some(Decimal::from(120)), Some(Decimal::from(120))));
        assert!(index.in_range("horsepower", Some(Decimal::from(80)), None));
        assert!(!index.in_range("horsepower", None, Some(Decimal::from(119))));
        assert!(!index.in_range("unknown", None, None));
        assert!(!index.in_range("serial", Some(Decimal::ZERO), None));
    }

    #[test]
    fn text_values_get_a_single_parse_attempt() {
        let specs = sample();
        let index = SpecificationIndex::new(&specs);
        // "200" parses.
        assert!(index.in_range("fuel_capacity", Some(Decimal::from(150)), None));
        // "2.5 t" does not, and is treated as absent.
        assert!(!index.in_range("max_lift_capacity", None, Some(Decimal::from(10))));
    }

    #[test]
    fn renders_value_with_unit_and_bare_scalar() {
        let specs = Specifications::new()
            .with("horsepower", SpecValue::with_unit(Decimal::from(120), "hp"))
            .with("cylinders", SpecValue::number(Decimal::from(120)));
        let lines = SpecificationIndex::new(&specs).render(Language::En);
        assert_eq!(lines[0].value, "120 hp");
        assert_eq!(lines[0].label, "Power");
        assert_eq!(lines[1].value, "120");
    }

    #[test]
    fn renders_in_stored_order_with_labels_and_humanised_keys() {
        let specs = sample();
        let lines = SpecificationIndex::new(&specs).render(Language::Ru);
        let keys: Vec<_> = lines.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(
            keys,
            ["horsepower", "engine_type", "fuel_capacity", "cylinders", "max_lift_capacity", "serial"]
        );
        assert_eq!(lines[0].label, "Мощность");
        assert_eq!(lines[1].value, "Дизель YTO 4-цилиндра");
        assert_eq!(lines[2].value, "200 л");
        assert_eq!(lines[4].label, "Max Lift Capacity");
        assert_eq!(lines[5].value, "");
    }

    #[test]
    fn uzbek_labels_come_from_the_table() {
        let specs = Specifications::new().with("working_width", SpecValue::with_unit(Decimal::from(3), "m"));
        let lines = SpecificationIndex::new(&specs).render(Language::Uz);
        assert_eq!(lines[0].label, "Ish kengligi");
    }

    #[test]
    fn serialization_keeps_order_and_shape() {
        let specs = Specifications::new()
            .with("weight", SpecValue::with_unit(Decimal::new(45, 1), "t"))
            .with("engine_type", SpecValue::text("Diesel"));
        let json = serde_json::to_string(&specs).unwrap();
        assert_eq!(json, r#"{"weight":{"value":4.5,"unit":"t"},"engine_type":"Diesel"}"#);

        let back: Specifications = serde_json::from_str(&json).unwrap();
        assert_eq!(back, specs);
    }

    #[test]
    fn unit_follows_value_in_a_single_pair() {
        let pair = SpecValue::with_unit(Decimal::from(120), "hp");
        assert_eq!(serde_json::to_string(&pair).unwrap(), r#"{"value":120,"unit":"hp"}"#);

        let bare = SpecValue::WithUnit { value: None, unit: None };
        assert_eq!(serde_json::to_string(&bare).unwrap(), r#"{"value":null}"#);
    }

    #[test]
    fn humanize_title_cases_words() {
        assert_eq!(humanize("rated_rpm"), "Rated Rpm");
        assert_eq!(humanize("pto_speed_2"), "Pto Speed 2");
    }
}
