use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::models::message::ChatId;

/// Typed value envelope used by the result store, e.g. `{"S": "person"}` or `{"N": "42"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    #[serde(rename = "S")]
    String(String),
    /// Numbers travel as strings to keep full precision.
    #[serde(rename = "N")]
    Number(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    #[serde(rename = "L")]
    List(Vec<AttributeValue>),
    #[serde(rename = "M")]
    Map(BTreeMap<String, AttributeValue>),
    #[serde(rename = "SS")]
    StringSet(Vec<String>),
    #[serde(rename = "NS")]
    NumberSet(Vec<String>),
}

/// A stored record: attribute name to enveloped value.
pub type Item = BTreeMap<String, AttributeValue>;

impl AttributeValue {
    /// Strip the envelope, recursively, producing a plain JSON value.
    pub fn into_plain(self) -> Value {
        match self {
            AttributeValue::String(s) => Value::String(s),
            AttributeValue::Number(n) => number_value(&n),
            AttributeValue::Bool(b) => Value::Bool(b),
            AttributeValue::Null(_) => Value::Null,
            AttributeValue::List(items) => {
                Value::Array(items.into_iter().map(AttributeValue::into_plain).collect())
            }
            AttributeValue::Map(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, v.into_plain()))
                    .collect(),
            ),
            AttributeValue::StringSet(values) => {
                Value::Array(values.into_iter().map(Value::String).collect())
            }
            AttributeValue::NumberSet(values) => {
                Value::Array(values.iter().map(|n| number_value(n)).collect())
            }
        }
    }
}

fn number_value(raw: &str) -> Value {
    if let Ok(int) = raw.parse::<i64>() {
        return Value::from(int);
    }
    raw.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

/// Flatten a stored item into a plain key to value mapping.
pub fn flatten_item(item: Item) -> Map<String, Value> {
    item.into_iter().map(|(k, v)| (k, v.into_plain())).collect()
}

/// Detection results for one prediction, written by the detection consumer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultRecord {
    pub prediction_id: String,
    #[serde(deserialize_with = "lenient")]
    pub chat_id: ChatId,
    /// Detected objects in the order the detector reported them.
    #[serde(default)]
    pub labels: Vec<DetectedLabel>,
    #[serde(default)]
    pub original_img_path: Option<String>,
    #[serde(default)]
    pub predicted_img_path: Option<String>,
    /// When the consumer stored the result, kept as written (timestamp text or epoch number).
    #[serde(default, deserialize_with = "text_or_number")]
    pub time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DetectedLabel {
    pub class: String,
    #[serde(default, deserialize_with = "lenient_option")]
    pub cx: Option<f64>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub cy: Option<f64>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub width: Option<f64>,
    #[serde(default, deserialize_with = "lenient_option")]
    pub height: Option<f64>,
}

impl ResultRecord {
    /// Decode a record from its stored, enveloped form.
    pub fn from_item(item: Item) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(flatten_item(item)))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString<T> {
    Number(T),
    Text(String),
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    match NumberOrString::<T>::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s.trim().parse().map_err(de::Error::custom),
    }
}

fn lenient_option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    match Option::<NumberOrString<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(s)) => s.trim().parse().map(Some).map_err(de::Error::custom),
    }
}

fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!("unexpected time value: {other}"))),
    }
}
