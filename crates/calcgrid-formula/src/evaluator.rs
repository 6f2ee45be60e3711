use std::cmp::Ordering;

use calcgrid_common::{CellError, Position, Value};

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::functions;

/// Evaluator for formula AST.
///
/// Cell references are resolved through the caller-supplied callback; the
/// evaluator itself holds no sheet state.
pub struct Evaluator<F>
where
    F: Fn(Position) -> Value,
{
    resolve: F,
}

impl<F> Evaluator<F>
where
    F: Fn(Position) -> Value,
{
    pub fn new(resolve: F) -> Self {
        Self { resolve }
    }

    /// Evaluate an expression AST to a value
    pub fn evaluate(&self, expr: &Expr) -> Value {
        match expr {
            Expr::Number(n) => Value::Number(*n),
            Expr::String(s) => Value::Text(s.clone()),

            Expr::CellRef { pos, .. } => (self.resolve)(*pos),

            Expr::Range { .. } => {
                // Ranges are only meaningful as function arguments
                Value::Error(CellError::Value)
            }

            Expr::Binary { left, op, right } => self.evaluate_binary(left, *op, right),

            Expr::Unary { op, operand } => self.evaluate_unary(*op, operand),

            Expr::FunctionCall { name, args } => self.evaluate_function(name, args),

            Expr::Grouped(inner) => self.evaluate(inner),
        }
    }

    fn evaluate_binary(&self, left: &Expr, op: BinaryOp, right: &Expr) -> Value {
        let left_val = self.evaluate(left);
        let right_val = self.evaluate(right);

        // Propagate errors
        if let Value::Error(e) = &left_val {
            return Value::Error(*e);
        }
        if let Value::Error(e) = &right_val {
            return Value::Error(*e);
        }

        match op {
            BinaryOp::Add => self.numeric_op(&left_val, &right_val, |a, b| a + b),
            BinaryOp::Sub => self.numeric_op(&left_val, &right_val, |a, b| a - b),
            BinaryOp::Mul => self.numeric_op(&left_val, &right_val, |a, b| a * b),
            BinaryOp::Div => match (left_val.as_number(), right_val.as_number()) {
                (Some(a), Some(b)) => {
                    if b == 0.0 {
                        Value::Error(CellError::Div0)
                    } else {
                        Value::Number(a / b)
                    }
                }
                _ => Value::Error(CellError::Value),
            },
            BinaryOp::Pow => self.numeric_op(&left_val, &right_val, |a, b| a.powf(b)),

            BinaryOp::Concat => {
                Value::Text(format!("{}{}", left_val.as_text(), right_val.as_text()))
            }

            BinaryOp::Eq => bool_value(self.compare_values(&left_val, &right_val) == Ordering::Equal),
            BinaryOp::Ne => bool_value(self.compare_values(&left_val, &right_val) != Ordering::Equal),
            BinaryOp::Lt => bool_value(self.compare_values(&left_val, &right_val) == Ordering::Less),
            BinaryOp::Gt => bool_value(self.compare_values(&left_val, &right_val) == Ordering::Greater),
            BinaryOp::Le => bool_value(self.compare_values(&left_val, &right_val) != Ordering::Greater),
            BinaryOp::Ge => bool_value(self.compare_values(&left_val, &right_val) != Ordering::Less),
        }
    }

    fn numeric_op(&self, left: &Value, right: &Value, op: impl Fn(f64, f64) -> f64) -> Value {
        match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) => {
                let result = op(a, b);
                if result.is_nan() || result.is_infinite() {
                    Value::Error(CellError::Num)
                } else {
                    Value::Number(result)
                }
            }
            _ => Value::Error(CellError::Value),
        }
    }

    fn compare_values(&self, left: &Value, right: &Value) -> Ordering {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Value::Text(a), Value::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            // Mixed types compare by display form
            _ => left.as_text().cmp(&right.as_text()),
        }
    }

    fn evaluate_unary(&self, op: UnaryOp, operand: &Expr) -> Value {
        let value = self.evaluate(operand);

        if let Value::Error(e) = &value {
            return Value::Error(*e);
        }

        match op {
            UnaryOp::Neg => match value.as_number() {
                Some(n) => Value::Number(-n),
                None => Value::Error(CellError::Value),
            },
            UnaryOp::Pos => match value.as_number() {
                Some(n) => Value::Number(n),
                None => Value::Error(CellError::Value),
            },
            UnaryOp::Percent => match value.as_number() {
                Some(n) => Value::Number(n / 100.0),
                None => Value::Error(CellError::Value),
            },
        }
    }

    fn evaluate_function(&self, name: &str, args: &[Expr]) -> Value {
        // IF picks between branches; it must not range-expand its arguments
        if name == "IF" {
            let arg_values: Vec<Value> = args.iter().map(|a| self.evaluate(a)).collect();
            return functions::logical::if_fn(&arg_values);
        }

        // Collect values, expanding ranges
        let values: Vec<Value> = args
            .iter()
            .flat_map(|arg| self.expand_argument(arg))
            .collect();

        match name {
            // Math functions
            "SUM" => functions::math::sum(&values),
            "AVERAGE" | "AVG" => functions::math::average(&values),
            "COUNT" => functions::math::count(&values),
            "MIN" => functions::math::min(&values),
            "MAX" => functions::math::max(&values),
            "ABS" => functions::math::abs(&values),
            "ROUND" => functions::math::round(&values),
            "SQRT" => functions::math::sqrt(&values),
            "POWER" | "POW" => functions::math::power(&values),

            // Logical functions
            "AND" => functions::logical::and(&values),
            "OR" => functions::logical::or(&values),
            "NOT" => functions::logical::not(&values),

            // Text functions
            "CONCAT" | "CONCATENATE" => functions::text::concat(&values),
            "LEN" => functions::text::len(&values),
            "UPPER" => functions::text::upper(&values),
            "LOWER" => functions::text::lower(&values),
            "TRIM" => functions::text::trim(&values),

            _ => Value::Error(CellError::Name),
        }
    }

    /// Evaluate a function argument, expanding a range into one value per cell
    fn expand_argument(&self, arg: &Expr) -> Vec<Value> {
        match arg {
            Expr::Range { start, end } => {
                if let (Expr::CellRef { pos: s, .. }, Expr::CellRef { pos: e, .. }) =
                    (start.as_ref(), end.as_ref())
                {
                    let mut values = Vec::new();
                    for row in s.row.min(e.row)..=s.row.max(e.row) {
                        for col in s.col.min(e.col)..=s.col.max(e.col) {
                            values.push((self.resolve)(Position::new(row, col)));
                        }
                    }
                    values
                } else {
                    vec![Value::Error(CellError::Value)]
                }
            }
            _ => vec![self.evaluate(arg)],
        }
    }
}

fn bool_value(b: bool) -> Value {
    Value::Number(if b { 1.0 } else { 0.0 })
}
