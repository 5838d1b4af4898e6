use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const CONTENT_ATTRIBUTE: &str = "content";

/// Host-side summary of a task block touched by a change.
///
/// Eligibility fields decode leniently: a value of the wrong JSON type reads as absent, so
/// the block is skipped later instead of failing the whole batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskBlock {
    /// Entity id used by change records.
    pub id: i64,
    /// Address used when writing the block back.
    #[serde(default)]
    pub uuid: String,
    #[serde(rename = "repeated?", default, deserialize_with = "lenient_flag")]
    pub repeated: bool,
    #[serde(default, deserialize_with = "lenient_number")]
    pub scheduled: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub format: String,
    #[serde(default, deserialize_with = "lenient_optional_text")]
    pub content: Option<String>,
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_bool() == Some(true))
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_i64()
        .or_else(|| value.as_f64().map(|number| number as i64)))
}

fn lenient_optional_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(Some(text)),
        _ => Ok(None),
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_optional_text(deserializer)?.unwrap_or_default())
}

impl TaskBlock {
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

type Datom = (i64, String, Value, i64, bool);

/// One low-level mutation: `[entity, attribute, value, tx, added]` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Datom", into = "Datom")]
pub struct ChangeRecord {
    pub entity: i64,
    pub attribute: String,
    pub value: Value,
    pub tx: i64,
    /// `true` asserts the value, `false` retracts it.
    pub added: bool,
}

impl ChangeRecord {
    pub fn retract(entity: i64, attribute: &str, value: impl Into<Value>, tx: i64) -> Self {
        Self {
            entity,
            attribute: attribute.to_string(),
            value: value.into(),
            tx,
            added: false,
        }
    }

    pub fn assert(entity: i64, attribute: &str, value: impl Into<Value>, tx: i64) -> Self {
        Self {
            entity,
            attribute: attribute.to_string(),
            value: value.into(),
            tx,
            added: true,
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.value.as_str()
    }
}

impl From<Datom> for ChangeRecord {
    fn from((entity, attribute, value, tx, added): Datom) -> Self {
        Self {
            entity,
            attribute,
            value,
            tx,
            added,
        }
    }
}

impl From<ChangeRecord> for Datom {
    fn from(record: ChangeRecord) -> Self {
        (
            record.entity,
            record.attribute,
            record.value,
            record.tx,
            record.added,
        )
    }
}

/// Everything the host reports for one document change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeBatch {
    #[serde(default)]
    pub blocks: Vec<TaskBlock>,
    #[serde(rename = "txData", default)]
    pub tx_data: Vec<ChangeRecord>,
}

impl ChangeBatch {
    /// Content records for `entity`, in delivery order.
    pub fn content_records(&self, entity: i64) -> Vec<&ChangeRecord> {
        self.tx_data
            .iter()
            .filter(|record| record.attribute == CONTENT_ATTRIBUTE && record.entity == entity)
            .collect()
    }
}
