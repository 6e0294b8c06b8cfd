//! Random scalar expressions over the screen coordinates and time.
//!
//! The grammar is tiny:
//!
//! ```text
//!   expr     := terminal | unary "(" expr ")" | "(" expr binop expr ")"
//!   terminal := x | y | t | w (4D only) | constant in [0, 1)
//!   unary    := sqrt(abs | sin | tan | exp
//!   binop    := + | - | / | *
//! ```
//!
//! Generation builds an explicit [`Expr`] tree and renders it with a
//! tree-walk, so the text is always balanced. Every recursive descent consumes
//! one unit of the complexity budget; at zero the node is forced to a
//! terminal.

use std::fmt;

use crate::assemble::MAX_SOURCE_BYTES;
use crate::config::max_complexity;
use crate::random::RandomSource;

/// Leaf of an expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Terminal {
    X,
    Y,
    T,
    W,
    /// Literal in `[0, 1)`, rendered with two decimal digits.
    Constant(f32),
}

const TERMINALS_3D: [Terminal; 4] = [
    Terminal::X,
    Terminal::Y,
    Terminal::T,
    Terminal::Constant(0.0),
];
const TERMINALS_4D: [Terminal; 5] = [
    Terminal::X,
    Terminal::Y,
    Terminal::T,
    Terminal::W,
    Terminal::Constant(0.0),
];

impl Terminal {
    /// Terminal kinds available for the given dimensionality, in selection order.
    ///
    /// The `Constant` entry is a placeholder; its value is drawn separately.
    pub fn choices(four_d: bool) -> &'static [Terminal] {
        if four_d {
            &TERMINALS_4D
        } else {
            &TERMINALS_3D
        }
    }
}

/// How constant terminals are spelled when an expression is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstantStyle {
    /// Bare literal such as `0.50`.
    #[default]
    Bare,
    /// Passed through [`OPAQUE_CONSTANT_FN`], e.g. `k(0.50)`. No subtree is
    /// then built from literals alone, so a compiler that folds constant
    /// expressions cannot reject `exp(exp(exp(exp(0.99))))` or `(0.50/0.00)`
    /// as infinite.
    Opaque,
}

/// Identity function a shader must define when rendering with
/// [`ConstantStyle::Opaque`].
pub const OPAQUE_CONSTANT_FN: &str = "k";

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminal::X => f.write_str("x"),
            Terminal::Y => f.write_str("y"),
            Terminal::T => f.write_str("t"),
            Terminal::W => f.write_str("w"),
            Terminal::Constant(value) => write!(f, "{value:.2}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `sqrt(abs(·))`, one node with two nested parentheses.
    SqrtAbs,
    Sin,
    Tan,
    Exp,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 4] = [UnaryOp::SqrtAbs, UnaryOp::Sin, UnaryOp::Tan, UnaryOp::Exp];

    fn prefix(self) -> &'static str {
        match self {
            UnaryOp::SqrtAbs => "sqrt(abs(",
            UnaryOp::Sin => "sin(",
            UnaryOp::Tan => "tan(",
            UnaryOp::Exp => "exp(",
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            UnaryOp::SqrtAbs => "))",
            _ => ")",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Div,
    Mul,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 4] = [BinaryOp::Add, BinaryOp::Sub, BinaryOp::Div, BinaryOp::Mul];

    fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Div => '/',
            BinaryOp::Mul => '*',
        }
    }
}

/// Expression tree produced by [`generate_tree`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Terminal(Terminal),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Number of operator levels below and including this node.
    pub fn depth(&self) -> usize {
        match self {
            Expr::Terminal(_) => 0,
            Expr::Unary(_, child) => 1 + child.depth(),
            Expr::Binary(_, lhs, rhs) => 1 + lhs.depth().max(rhs.depth()),
        }
    }

    /// Appends the GLSL text of this expression to `out`.
    pub fn write_to(&self, out: &mut String) {
        self.write_styled(out, ConstantStyle::Bare);
    }

    /// Like [`Expr::write_to`], spelling constants according to `style`.
    pub fn write_styled(&self, out: &mut String, style: ConstantStyle) {
        use fmt::Write;
        match self {
            // Writing into a String cannot fail.
            Expr::Terminal(constant @ Terminal::Constant(_)) => match style {
                ConstantStyle::Bare => {
                    let _ = write!(out, "{constant}");
                }
                ConstantStyle::Opaque => {
                    let _ = write!(out, "{OPAQUE_CONSTANT_FN}({constant})");
                }
            },
            Expr::Terminal(terminal) => {
                let _ = write!(out, "{terminal}");
            }
            Expr::Unary(op, child) => {
                out.push_str(op.prefix());
                child.write_styled(out, style);
                out.push_str(op.suffix());
            }
            Expr::Binary(op, lhs, rhs) => {
                out.push('(');
                lhs.write_styled(out, style);
                out.push(op.symbol());
                rhs.write_styled(out, style);
                out.push(')');
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut text = String::new();
        self.write_to(&mut text);
        f.write_str(&text)
    }
}

/// Draws a random expression tree whose depth never exceeds `complexity`.
///
/// Draw order per node: at budget zero a terminal index (plus a unit draw for
/// constants); otherwise a category pick (0 = unary, 1 = binary), an operator
/// pick, then the children left to right.
///
/// Panics if `complexity` exceeds [`max_complexity`]: the tree doubles per
/// level, so larger budgets cannot be rendered within [`MAX_SOURCE_BYTES`].
/// Validate user input with [`crate::config::validate_complexity`] first.
pub fn generate_tree<R: RandomSource + ?Sized>(
    rng: &mut R,
    complexity: usize,
    four_d: bool,
) -> Expr {
    assert!(
        complexity <= max_complexity(),
        "complexity {complexity} exceeds the source size ceiling"
    );
    build_node(rng, complexity, four_d)
}

fn build_node<R: RandomSource + ?Sized>(rng: &mut R, complexity: usize, four_d: bool) -> Expr {
    if complexity == 0 {
        let choices = Terminal::choices(four_d);
        let terminal = match choices[rng.pick(choices.len())] {
            Terminal::Constant(_) => Terminal::Constant(rng.unit()),
            other => other,
        };
        return Expr::Terminal(terminal);
    }

    let next = complexity - 1;
    if rng.pick(2) == 0 {
        let op = UnaryOp::ALL[rng.pick(UnaryOp::ALL.len())];
        Expr::Unary(op, Box::new(build_node(rng, next, four_d)))
    } else {
        let op = BinaryOp::ALL[rng.pick(BinaryOp::ALL.len())];
        let lhs = build_node(rng, next, four_d);
        let rhs = build_node(rng, next, four_d);
        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
    }
}

/// Generates one expression and writes it into `out`.
///
/// `out` must be empty: the caller owns surrounding text and appends the
/// result itself. Panics on the same complexities as [`generate_tree`].
pub fn generate_into<R: RandomSource + ?Sized>(
    rng: &mut R,
    complexity: usize,
    four_d: bool,
    style: ConstantStyle,
    out: &mut String,
) {
    assert!(out.is_empty(), "expression buffer must be empty before generation");
    let tree = generate_tree(rng, complexity, four_d);
    out.reserve(worst_case_len(complexity).min(MAX_SOURCE_BYTES));
    tree.write_styled(out, style);
}

/// Generates one expression as a fresh string with bare constants.
pub fn generate<R: RandomSource + ?Sized>(rng: &mut R, complexity: usize, four_d: bool) -> String {
    let mut out = String::new();
    generate_into(rng, complexity, four_d, ConstantStyle::Bare, &mut out);
    out
}

/// Longest terminal text in either style: `k(0.99)`.
const MAX_TERMINAL_LEN: usize = 7;
/// `sqrt(abs(` + `))`.
const MAX_UNARY_OVERHEAD: usize = 11;
/// `(` + operator + `)`.
const BINARY_OVERHEAD: usize = 3;

/// Upper bound on the rendered length of any expression at `complexity`.
///
/// Saturates instead of overflowing for absurd budgets.
pub fn worst_case_len(complexity: usize) -> usize {
    let mut len = MAX_TERMINAL_LEN;
    for _ in 0..complexity {
        let unary = len.saturating_add(MAX_UNARY_OVERHEAD);
        let binary = len.saturating_mul(2).saturating_add(BINARY_OVERHEAD);
        len = unary.max(binary);
        if len == usize::MAX {
            break;
        }
    }
    len
}
