//! JSON to BOSE.

use crate::bose::{Bose, BoseBuf, BoseResult};
use crate::builder::{BuildError, BuildResult};
use crate::cursor::Cursor;
use crate::memo::MemoTable;
use crate::prefix;
use crate::vec::VecExt;
use crate::DataType;
use serde_json::Value as JsonValue;

impl TryFrom<&JsonValue> for BoseBuf {
    type Error = BuildError;

    #[inline]
    fn try_from(value: &JsonValue) -> Result<Self, Self::Error> {
        let mut bytes = Vec::new();
        write_value(value, &mut bytes)?;
        Ok(unsafe { BoseBuf::new_unchecked(bytes) })
    }
}

impl BoseBuf {
    /// Parses a JSON string to `BoseBuf`.
    #[inline]
    pub fn parse<T: AsRef<str>>(s: T) -> BuildResult<Self> {
        let json: JsonValue = serde_json::from_str(s.as_ref()).map_err(BuildError::JsonError)?;
        BoseBuf::try_from(&json)
    }
}

impl Bose {
    /// Converts the encoded value to a `serde_json::Value`. With duplicate
    /// object keys, the first binding wins, matching forward-scan lookup.
    #[inline]
    pub fn to_json(&self) -> BoseResult<JsonValue> {
        json_value(self)
    }
}

fn write_value(value: &JsonValue, out: &mut Vec<u8>) -> BuildResult<()> {
    match value {
        JsonValue::Null => out.push_prefix(prefix::NULL),
        JsonValue::Bool(true) => out.push_prefix(prefix::TRUE),
        JsonValue::Bool(false) => out.push_prefix(prefix::FALSE),
        JsonValue::Number(number) => {
            if let Some(value) = number.as_i64() {
                out.push_integer(value);
            } else if let Some(value) = number.as_u64() {
                out.push_unsigned(value);
            } else {
                // no float ("unum") encodings
                return Err(BuildError::UnsupportedNumber(number.to_string()));
            }
        }
        JsonValue::String(s) => out.push_str_utf8(s)?,
        JsonValue::Array(values) => {
            let mut payload = Vec::new();
            for value in values {
                write_value(value, &mut payload)?;
            }
            out.push_container(prefix::ARRAY_N, &payload, values.len())?;
        }
        JsonValue::Object(map) => {
            let mut payload = Vec::new();
            for (key, value) in map {
                payload.push_str_utf8(key)?;
                write_value(value, &mut payload)?;
            }
            out.push_container(prefix::OBJECT_N, &payload, map.len())?;
        }
    }
    Ok(())
}

fn json_value(bose: &Bose) -> BoseResult<JsonValue> {
    let value = match bose.data_type()? {
        DataType::Null => JsonValue::Null,
        DataType::Boolean => JsonValue::from(bose.boolean()?),
        DataType::Number => {
            let mut memo = MemoTable::new();
            let mut cursor = Cursor::new(bose.as_bytes());
            cursor.parse_integer(&mut memo)?;
            if cursor.info.is_negative() {
                JsonValue::from(cursor.value as i64)
            } else {
                JsonValue::from(cursor.value)
            }
        }
        DataType::String => JsonValue::from(bose.string()?),
        DataType::Array => {
            let array = bose.array()?;
            let mut values = Vec::new();
            for item in array.iter()? {
                values.push(json_value(item?)?);
            }
            JsonValue::from(values)
        }
        DataType::Object => {
            let object = bose.object()?;
            let mut map = serde_json::Map::new();
            for entry in object.iter()? {
                let (key, value) = entry?;
                if !map.contains_key(&key) {
                    map.insert(key, json_value(value)?);
                }
            }
            JsonValue::from(map)
        }
    };
    Ok(value)
}
