use calcgrid_common::{CellError, Value};

/// SUM - Sum all numeric values
pub fn sum(values: &[Value]) -> Value {
    let mut total = 0.0;

    for value in values {
        match value {
            Value::Number(n) => total += n,
            Value::Error(e) => return Value::Error(*e),
            Value::Text(_) => {} // Skip text
        }
    }

    Value::Number(total)
}

/// AVERAGE - Average of numeric values
pub fn average(values: &[Value]) -> Value {
    let mut total = 0.0;
    let mut count = 0;

    for value in values {
        match value {
            Value::Number(n) => {
                total += n;
                count += 1;
            }
            Value::Error(e) => return Value::Error(*e),
            Value::Text(_) => {}
        }
    }

    if count == 0 {
        Value::Error(CellError::Div0)
    } else {
        Value::Number(total / count as f64)
    }
}

/// COUNT - Count numeric values
pub fn count(values: &[Value]) -> Value {
    let count = values
        .iter()
        .filter(|v| matches!(v, Value::Number(_)))
        .count();

    Value::Number(count as f64)
}

/// MIN - Minimum numeric value
pub fn min(values: &[Value]) -> Value {
    let mut result: Option<f64> = None;

    for value in values {
        match value {
            Value::Number(n) => {
                result = Some(result.map_or(*n, |r| r.min(*n)));
            }
            Value::Error(e) => return Value::Error(*e),
            Value::Text(_) => {}
        }
    }

    match result {
        Some(n) => Value::Number(n),
        None => Value::Number(0.0),
    }
}

/// MAX - Maximum numeric value
pub fn max(values: &[Value]) -> Value {
    let mut result: Option<f64> = None;

    for value in values {
        match value {
            Value::Number(n) => {
                result = Some(result.map_or(*n, |r| r.max(*n)));
            }
            Value::Error(e) => return Value::Error(*e),
            Value::Text(_) => {}
        }
    }

    match result {
        Some(n) => Value::Number(n),
        None => Value::Number(0.0),
    }
}

/// ABS - Absolute value
pub fn abs(values: &[Value]) -> Value {
    if values.is_empty() {
        return Value::Error(CellError::Value);
    }

    match &values[0] {
        Value::Error(e) => Value::Error(*e),
        value => match value.as_number() {
            Some(n) => Value::Number(n.abs()),
            None => Value::Error(CellError::Value),
        },
    }
}

/// ROUND - Round to specified decimal places
pub fn round(values: &[Value]) -> Value {
    if values.is_empty() {
        return Value::Error(CellError::Value);
    }

    let num = match values[0].as_number() {
        Some(n) => n,
        None => return Value::Error(CellError::Value),
    };

    let decimals = if values.len() > 1 {
        values[1].as_number().unwrap_or(0.0) as i32
    } else {
        0
    };

    let factor = 10_f64.powi(decimals);
    Value::Number((num * factor).round() / factor)
}

/// SQRT - Square root
pub fn sqrt(values: &[Value]) -> Value {
    if values.is_empty() {
        return Value::Error(CellError::Value);
    }

    match values[0].as_number() {
        Some(n) if n >= 0.0 => Value::Number(n.sqrt()),
        Some(_) => Value::Error(CellError::Num),
        None => Value::Error(CellError::Value),
    }
}

/// POWER - Raise to power
pub fn power(values: &[Value]) -> Value {
    if values.len() < 2 {
        return Value::Error(CellError::Value);
    }

    let base = match values[0].as_number() {
        Some(n) => n,
        None => return Value::Error(CellError::Value),
    };

    let exp = match values[1].as_number() {
        Some(n) => n,
        None => return Value::Error(CellError::Value),
    };

    let result = base.powf(exp);
    if result.is_nan() || result.is_infinite() {
        Value::Error(CellError::Num)
    } else {
        Value::Number(result)
    }
}
