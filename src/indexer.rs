//! Parameter indexing.
//!
//! Turns a record's `parameters` list into an object keyed by lowercase
//! parameter name. The indexed record is built fresh from the parsed one.

use crate::error::IndexError;
use crate::models::{CollisionPolicy, IndexedRecord, Record, NAME_FIELD, PARAMETERS_FIELD};
use serde_json::{Map, Value};
use tracing::debug;

/// Index a record's parameters by lowercase name.
///
/// A missing `parameters` field becomes an empty map. Parameters that share a
/// lowercase name are resolved according to `policy`.
pub fn index_parameters(
    mut record: Record,
    policy: CollisionPolicy,
) -> Result<IndexedRecord, IndexError> {
    let parameters = match record.get_mut(PARAMETERS_FIELD).map(Value::take) {
        None => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(IndexError::ParametersNotArray),
    };

    let by_name = index_list(parameters, policy)?;

    // Replacing the value keeps the field at its original position.
    record.insert(PARAMETERS_FIELD.to_string(), Value::Object(by_name));
    Ok(IndexedRecord::new(record))
}

/// Index a JSON value that should hold a record.
pub fn index_value(value: Value, policy: CollisionPolicy) -> Result<IndexedRecord, IndexError> {
    match value {
        Value::Object(record) => index_parameters(record, policy),
        _ => Err(IndexError::RecordNotObject),
    }
}

fn index_list(parameters: Vec<Value>, policy: CollisionPolicy) -> Result<Map<String, Value>, IndexError> {
    let mut by_name = Map::new();

    for (position, parameter) in parameters.into_iter().enumerate() {
        let key = lowercase_name(&parameter, position)?;

        if by_name.contains_key(&key) {
            match policy {
                CollisionPolicy::LastWins => debug!("Parameter '{}' redefined, keeping last", key),
                CollisionPolicy::FailFast => {
                    return Err(IndexError::DuplicateParameter { name: key });
                }
            }
        }

        by_name.insert(key, parameter);
    }

    Ok(by_name)
}

fn lowercase_name(parameter: &Value, position: usize) -> Result<String, IndexError> {
    let fields = parameter
        .as_object()
        .ok_or(IndexError::ParameterNotObject { position })?;

    match fields.get(NAME_FIELD) {
        Some(Value::String(name)) => Ok(name.to_lowercase()),
        Some(_) => Err(IndexError::NameNotString { position }),
        None => Err(IndexError::MissingName { position }),
    }
}
