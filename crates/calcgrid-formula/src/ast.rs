use calcgrid_common::Position;

/// Abstract Syntax Tree for formula expressions.
///
/// The `Display` impl is the canonical textual form: uppercase labels and
/// function names, no spaces, integral numbers without a decimal point.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Literals
    Number(f64),
    String(String),

    // Cell reference (e.g., A1, $B$2)
    CellRef {
        pos: Position,
        abs_col: bool, // $A1 vs A1
        abs_row: bool, // A$1 vs A1
    },

    // Range reference (e.g., A1:B10); both ends are CellRef
    Range {
        start: Box<Expr>,
        end: Box<Expr>,
    },

    // Binary operation
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    // Unary operation
    Unary { op: UnaryOp, operand: Box<Expr> },

    // Function call (e.g., SUM(A1:A10))
    FunctionCall { name: String, args: Vec<Expr> },

    // Parenthesized expression
    Grouped(Box<Expr>),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Pow,

    // String
    Concat,

    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,     // -
    Pos,     // +
    Percent, // %
}

impl Expr {
    /// Create a cell reference expression
    pub fn cell_ref(pos: Position) -> Self {
        Expr::CellRef {
            pos,
            abs_col: false,
            abs_row: false,
        }
    }

    /// Create a binary expression
    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Create a unary expression
    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Create a range expression
    pub fn range(start: Expr, end: Expr) -> Self {
        Expr::Range {
            start: Box::new(start),
            end: Box::new(end),
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Number(n) => {
                // Format numbers without unnecessary decimals
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Expr::String(s) => write!(f, "\"{}\"", s.replace('"', "\"\"")),
            Expr::CellRef {
                pos,
                abs_col,
                abs_row,
            } => {
                use calcgrid_common::col_to_label;
                write!(
                    f,
                    "{}{}{}{}",
                    if *abs_col { "$" } else { "" },
                    col_to_label(pos.col),
                    if *abs_row { "$" } else { "" },
                    pos.row + 1 // back to 1-indexed notation
                )
            }
            Expr::Range { start, end } => write!(f, "{}:{}", start, end),
            Expr::Binary { left, op, right } => {
                write!(f, "{}{}{}", left, op, right)
            }
            Expr::Unary { op, operand } => match op {
                UnaryOp::Neg => write!(f, "-{}", operand),
                UnaryOp::Pos => write!(f, "+{}", operand),
                UnaryOp::Percent => write!(f, "{}%", operand),
            },
            Expr::FunctionCall { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Grouped(inner) => write!(f, "({})", inner),
        }
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Pow => write!(f, "^"),
            BinaryOp::Concat => write!(f, "&"),
            BinaryOp::Eq => write!(f, "="),
            BinaryOp::Ne => write!(f, "<>"),
            BinaryOp::Lt => write!(f, "<"),
            BinaryOp::Gt => write!(f, ">"),
            BinaryOp::Le => write!(f, "<="),
            BinaryOp::Ge => write!(f, ">="),
        }
    }
}
