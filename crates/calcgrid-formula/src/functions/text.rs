use calcgrid_common::{CellError, Value};

/// CONCAT / CONCATENATE - Concatenate strings
pub fn concat(values: &[Value]) -> Value {
    let mut result = String::new();

    for value in values {
        match value {
            Value::Error(e) => return Value::Error(*e),
            _ => result.push_str(&value.as_text()),
        }
    }

    Value::Text(result)
}

/// LEN - Length of text
pub fn len(values: &[Value]) -> Value {
    if values.is_empty() {
        return Value::Error(CellError::Value);
    }

    match &values[0] {
        Value::Error(e) => Value::Error(*e),
        value => Value::Number(value.as_text().chars().count() as f64),
    }
}

/// UPPER - Convert to uppercase
pub fn upper(values: &[Value]) -> Value {
    if values.is_empty() {
        return Value::Error(CellError::Value);
    }

    match &values[0] {
        Value::Error(e) => Value::Error(*e),
        value => Value::Text(value.as_text().to_uppercase()),
    }
}

/// LOWER - Convert to lowercase
pub fn lower(values: &[Value]) -> Value {
    if values.is_empty() {
        return Value::Error(CellError::Value);
    }

    match &values[0] {
        Value::Error(e) => Value::Error(*e),
        value => Value::Text(value.as_text().to_lowercase()),
    }
}

/// TRIM - Remove leading/trailing whitespace
pub fn trim(values: &[Value]) -> Value {
    if values.is_empty() {
        return Value::Error(CellError::Value);
    }

    match &values[0] {
        Value::Error(e) => Value::Error(*e),
        value => Value::Text(value.as_text().trim().to_string()),
    }
}
