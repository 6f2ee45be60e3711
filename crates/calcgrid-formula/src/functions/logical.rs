use calcgrid_common::{CellError, Value};

// Logical results are numbers: 1 for true, 0 for false.

fn truthy(value: &Value) -> Result<bool, Value> {
    match value {
        Value::Error(e) => Err(Value::Error(*e)),
        v => match v.as_number() {
            Some(n) => Ok(n != 0.0),
            None => Err(Value::Error(CellError::Value)),
        },
    }
}

/// IF - Conditional evaluation
pub fn if_fn(values: &[Value]) -> Value {
    if values.is_empty() {
        return Value::Error(CellError::Value);
    }

    let condition = match truthy(&values[0]) {
        Ok(b) => b,
        Err(e) => return e,
    };

    if condition {
        values.get(1).cloned().unwrap_or(Value::Number(1.0))
    } else {
        values.get(2).cloned().unwrap_or(Value::Number(0.0))
    }
}

/// AND - Logical AND of all values
pub fn and(values: &[Value]) -> Value {
    if values.is_empty() {
        return Value::Error(CellError::Value);
    }

    for value in values {
        match truthy(value) {
            Ok(true) => {}
            Ok(false) => return Value::Number(0.0),
            Err(e) => return e,
        }
    }

    Value::Number(1.0)
}

/// OR - Logical OR of all values
pub fn or(values: &[Value]) -> Value {
    if values.is_empty() {
        return Value::Error(CellError::Value);
    }

    for value in values {
        match truthy(value) {
            Ok(true) => return Value::Number(1.0),
            Ok(false) => {}
            Err(e) => return e,
        }
    }

    Value::Number(0.0)
}

/// NOT - Logical negation
pub fn not(values: &[Value]) -> Value {
    if values.is_empty() {
        return Value::Error(CellError::Value);
    }

    match truthy(&values[0]) {
        Ok(b) => Value::Number(if b { 0.0 } else { 1.0 }),
        Err(e) => e,
    }
}
