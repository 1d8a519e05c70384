use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

const PAGINATION_KEY: &str = "pagination";
const ITEMS_KEY: &str = "items";

/// Paging metadata attached to every list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_records: u64,
    pub limit: u32,
}

impl PaginationMeta {
    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// One page of a list endpoint.
///
/// The backend names the item array after the resource (`albums`, `movies`,
/// `tracks`, `artists`, ...). Decoding takes `items` when present, otherwise
/// the array beside `pagination` that best looks like the payload: a
/// non-empty array of objects, then any non-empty array, then an empty one.
/// A bare top-level array decodes with no metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Option<PaginationMeta>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pagination: None,
        }
    }
}

impl<T: DeserializeOwned> Page<T> {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    /// Decode items from an explicitly named array key.
    pub fn from_slice_with_key(bytes: &[u8], key: &str) -> Result<Self, serde_json::Error> {
        let mut value: Value = serde_json::from_slice(bytes)?;
        let pagination = take_pagination(&mut value)?;
        let items = match value.get_mut(key).map(Value::take) {
            Some(items) => serde_json::from_value(items)?,
            None => {
                return Err(serde_json::Error::custom(format!(
                    "missing field `{key}`"
                )))
            }
        };
        Ok(Self { items, pagination })
    }

    pub fn from_value(mut value: Value) -> Result<Self, serde_json::Error> {
        if value.is_array() {
            return Ok(Self {
                items: serde_json::from_value(value)?,
                pagination: None,
            });
        }
        let pagination = take_pagination(&mut value)?;
        let Value::Object(map) = value else {
            return Err(serde_json::Error::custom(
                "expected a JSON object or array for a page",
            ));
        };

        let items = map
            .get(ITEMS_KEY)
            .filter(|v| v.is_array())
            .or_else(|| pick_items(&map))
            .cloned()
            .ok_or_else(|| serde_json::Error::custom("no item array in page"))?;

        Ok(Self {
            items: serde_json::from_value(items)?,
            pagination,
        })
    }
}

fn take_pagination(value: &mut Value) -> Result<Option<PaginationMeta>, serde_json::Error> {
    match value.as_object_mut().and_then(|map| map.remove(PAGINATION_KEY)) {
        Some(Value::Null) | None => Ok(None),
        Some(meta) => serde_json::from_value(meta).map(Some),
    }
}

fn pick_items(map: &Map<String, Value>) -> Option<&Value> {
    let arrays: Vec<(&Value, &Vec<Value>)> = map
        .values()
        .filter_map(|v| v.as_array().map(|arr| (v, arr)))
        .collect();
    arrays
        .iter()
        .find(|(_, arr)| arr.first().is_some_and(Value::is_object))
        .or_else(|| arrays.iter().find(|(_, arr)| !arr.is_empty()))
        .or_else(|| arrays.first())
        .map(|(v, _)| *v)
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Page<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Page::from_value(value).map_err(D::Error::custom)
    }
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
