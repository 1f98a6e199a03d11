use sheetcalc_core::CellCoord;

/// Abstract Syntax Tree for arithmetic formula expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),

    // Cell reference (e.g., A1)
    CellRef { row: u32, col: u32 },

    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    Unary { op: UnaryOp, operand: Box<Expr> },

    // Parenthesized expression
    Grouped(Box<Expr>),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg, // -
    Pos, // +
}

impl Expr {
    /// Create a cell reference expression
    pub fn cell_ref(row: u32, col: u32) -> Self {
        Expr::CellRef { row, col }
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

    /// Recursion depth needed to evaluate this expression.
    ///
    /// The left operand of a binary operator is walked in a loop, so a flat
    /// chain such as `1+2+3+...` stays shallow however long it is.
    pub fn depth(&self) -> usize {
        match self {
            Expr::Number(_) | Expr::CellRef { .. } => 0,
            Expr::Unary { operand, .. } => 1 + operand.depth(),
            Expr::Grouped(inner) => 1 + inner.depth(),
            Expr::Binary { .. } => {
                let mut node = self;
                let mut deepest = 0;
                while let Expr::Binary { left, right, .. } = node {
                    deepest = deepest.max(1 + right.depth());
                    node = left.as_ref();
                }
                deepest.max(node.depth())
            }
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::CellRef { row, col } => write!(f, "{}", CellCoord::new(*row, *col)),
            Expr::Binary { left, op, right } => write!(f, "{}{}{}", left, op, right),
            Expr::Unary { op, operand } => match op {
                UnaryOp::Neg => write!(f, "-{}", operand),
                UnaryOp::Pos => write!(f, "+{}", operand),
            },
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
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trips_shape() {
        let expr = Expr::binary(
            Expr::cell_ref(0, 0),
            BinaryOp::Mul,
            Expr::Grouped(Box::new(Expr::binary(
                Expr::Number(2.0),
                BinaryOp::Add,
                Expr::unary(UnaryOp::Neg, Expr::Number(0.5)),
            ))),
        );
        assert_eq!(expr.to_string(), "A1*(2+-0.5)");
    }

    #[test]
    fn test_depth() {
        assert_eq!(Expr::Number(1.0).depth(), 0);

        // 1+2*3
        let expr = Expr::binary(
            Expr::Number(1.0),
            BinaryOp::Add,
            Expr::binary(Expr::Number(2.0), BinaryOp::Mul, Expr::Number(3.0)),
        );
        assert_eq!(expr.depth(), 2);

        // ((A1))
        let grouped = Expr::Grouped(Box::new(Expr::Grouped(Box::new(Expr::cell_ref(0, 0)))));
        assert_eq!(grouped.depth(), 2);
    }

    #[test]
    fn test_depth_of_long_left_chain_is_flat() {
        let mut expr = Expr::Number(1.0);
        for _ in 0..2_000 {
            expr = Expr::binary(expr, BinaryOp::Add, Expr::Number(1.0));
        }
        assert_eq!(expr.depth(), 1);
    }
}
