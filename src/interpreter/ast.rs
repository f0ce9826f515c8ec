use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add, Subtract, Multiply, Divide, Modulo,
    Equal, NotEqual,
    Less, LessEqual, Greater, GreaterEqual,
    And, Or,
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
        }
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Debug for BinaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Plus,
    Not,
}

impl UnaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOperator::Negate => "-",
            UnaryOperator::Plus => "+",
            UnaryOperator::Not => "not",
        }
    }
}

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Debug for UnaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Clone, PartialEq)]
pub enum Expr {
    NumberLiteral(f64),
    StringLiteral(String),
    BooleanLiteral(bool),
    Identifier(String),

    BinaryOperation {
        left: Box<Expr>,
        operator: BinaryOperator,
        right: Box<Expr>,
    },
    UnaryOperation {
        operator: UnaryOperator,
        operand: Box<Expr>,
    },
    Parenthesized(Box<Expr>),

    InputCall(Option<Box<Expr>>),
    FunctionCall {
        name: String,
        args: Vec<Expr>,
    },
}

impl Debug for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::NumberLiteral(value) => write!(f, "{}", crate::util::format_number(*value)),
            Expr::StringLiteral(value) => write!(f, "{:?}", value),
            Expr::BooleanLiteral(value) => write!(f, "{}", value),
            Expr::Identifier(name) => f.write_str(name),

            Expr::BinaryOperation { left, operator, right } => write!(f, "({:?} {} {:?})", left, operator, right),
            Expr::UnaryOperation { operator: UnaryOperator::Not, operand } => write!(f, "(not {:?})", operand),
            Expr::UnaryOperation { operator, operand } => write!(f, "({}{:?})", operator, operand),
            // Binary and unary operations already render their own parentheses
            Expr::Parenthesized(expr) => write!(f, "{:?}", expr),

            Expr::InputCall(prompt) => match prompt {
                Some(prompt) => write!(f, "input({:?})", prompt),
                None => write!(f, "input()"),
            },
            Expr::FunctionCall { name, args } => write!(f, "{}({})", name, args.iter()
                .map(|arg| format!("{:?}", arg)).collect::<Vec<String>>().join(", ")),
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

impl Debug for FunctionDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "function {}({}) {:?}", self.name, self.params.join(", "), Block(&self.body))
    }
}

#[derive(Clone, PartialEq)]
pub enum Stmt {
    Say(Expr),
    Assignment {
        name: String,
        expr: Expr,
    },
    Block(Vec<Stmt>),
    If {
        condition: Expr,
        then: Box<Stmt>,
        otherwise: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    For {
        variable: String,
        start: Expr,
        end: Expr,
        step: Option<Expr>,
        body: Vec<Stmt>,
    },
    FunctionDefinition(Rc<FunctionDecl>),
    Return(Option<Expr>),
    Break,
    Continue,
}

struct Block<'a>(&'a [Stmt]);

impl Debug for Block<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return f.write_str("{ }");
        }

        write!(f, "{{ {} }}", self.0.iter().map(|stmt| format!("{:?}", stmt))
            .collect::<Vec<String>>().join("; "))
    }
}

impl Debug for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Stmt::Say(expr) => write!(f, "say {:?}", expr),
            Stmt::Assignment { name, expr } => write!(f, "kas {} = {:?}", name, expr),
            Stmt::Block(statements) => write!(f, "{:?}", Block(statements)),
            Stmt::If { condition, then, otherwise } => {
                write!(f, "if {:?} {:?}", condition, then)?;

                if let Some(otherwise) = otherwise {
                    write!(f, " else {:?}", otherwise)?;
                }

                Ok(())
            },
            Stmt::While { condition, body } => write!(f, "while {:?} {:?}", condition, body),
            Stmt::For { variable, start, end, step, body } => {
                write!(f, "for kas {} = {:?} to {:?}", variable, start, end)?;

                if let Some(step) = step {
                    write!(f, " step {:?}", step)?;
                }

                write!(f, " {:?}", Block(body))
            },
            Stmt::FunctionDefinition(function) => write!(f, "{:?}", function),
            Stmt::Return(Some(expr)) => write!(f, "return {:?}", expr),
            Stmt::Return(None) => f.write_str("return"),
            Stmt::Break => f.write_str("break"),
            Stmt::Continue => f.write_str("continue"),
        }
    }
}

#[derive(Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    pub fn new(statements: Vec<Stmt>) -> Program {
        Program { statements }
    }
}

impl Debug for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.statements.iter().map(|stmt| format!("{:?}", stmt))
            .collect::<Vec<String>>().join("\n"))
    }
}
