use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use thiserror::Error;
use crate::interpreter::ast::{BinaryOperator, Expr, FunctionDecl, Program, Stmt, UnaryOperator};
use crate::interpreter::environment::Environment;
use crate::interpreter::host::{Host, StdinHost};
use crate::interpreter::value::Value;

pub const DEFAULT_MAX_CALL_DEPTH: usize = 100;

// Remaining stack below which evaluation continues on a fresh segment
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Prefix of the output line that reports a runtime error.
pub const RUNTIME_ERROR_PREFIX: &str = "Runtime error: ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("Undefined variable: '{0}'")]
    UndefinedVariable(String),
    #[error("Undefined function: '{0}'")]
    UndefinedFunction(String),
    #[error("Function '{name}' expects {expected} argument(s), got {got}")]
    ArgumentCount {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("Cannot apply '{operator}' to {left} and {right}")]
    InvalidOperands {
        operator: BinaryOperator,
        left: &'static str,
        right: &'static str,
    },
    #[error("Cannot apply unary '{operator}' to {operand}")]
    InvalidOperand {
        operator: UnaryOperator,
        operand: &'static str,
    },
    #[error("Cannot compare {left} and {right} with '{operator}'")]
    IncomparableTypes {
        operator: BinaryOperator,
        left: &'static str,
        right: &'static str,
    },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Modulo by zero")]
    ModuloByZero,
    #[error("Step cannot be zero")]
    ZeroStep,
    #[error("Loop {part} must be a number, got {found}")]
    NonNumericRange {
        part: &'static str,
        found: &'static str,
    },
    #[error("Maximum call depth of {0} exceeded")]
    CallDepthExceeded(usize),
}

type RuntimeResult<T> = Result<T, RuntimeError>;

/// Signal returned by every statement, telling the enclosing block or loop how to proceed.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlFlow {
    Normal,
    Return(Option<Value>),
    Break,
    Continue,
}

/// Tree-walking interpreter. One instance keeps its environment across
/// `interpret` calls until `reset`.
pub struct Interpreter<H: Host = StdinHost> {
    environment: Environment,
    output: Vec<String>,
    last_error: Option<RuntimeError>,

    host: H,
    max_call_depth: usize,
}

impl Interpreter<StdinHost> {
    pub fn new() -> Interpreter<StdinHost> {
        Interpreter::with_host(StdinHost)
    }
}

impl Default for Interpreter<StdinHost> {
    fn default() -> Self {
        Interpreter::new()
    }
}

impl<H: Host> Interpreter<H> {
    pub fn with_host(host: H) -> Interpreter<H> {
        Interpreter {
            environment: Environment::new(),
            output: Vec::new(),
            last_error: None,
            host,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    pub fn set_max_call_depth(&mut self, max_call_depth: usize) {
        self.max_call_depth = max_call_depth;
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Runs every top-level statement and returns the lines printed by this call.
    /// The first runtime error stops the run and becomes the last line; a
    /// top-level `return` stops it silently.
    pub fn interpret(&mut self, program: &Program) -> Vec<String> {
        self.output.clear();
        self.last_error = None;

        let span = tracing::debug_span!("interpret", statements = program.statements.len());
        let _entered = span.enter();

        for stmt in &program.statements {
            match self.execute_stmt(stmt) {
                Ok(ControlFlow::Return(_)) => break,
                Ok(_) => {},
                Err(err) => {
                    tracing::debug!(%err, "runtime error");

                    let line = format!("{}{}", RUNTIME_ERROR_PREFIX, err);
                    self.emit(line);
                    self.last_error = Some(err);
                    break;
                },
            }
        }

        self.output.clone()
    }

    /// The runtime error that stopped the most recent `interpret` call, if any.
    pub fn last_error(&self) -> Option<&RuntimeError> {
        self.last_error.as_ref()
    }

    pub fn reset(&mut self) {
        self.environment.clear();
        self.output.clear();
        self.last_error = None;
    }

    pub fn get_variables(&self) -> BTreeMap<String, Value> {
        self.environment.variables()
    }

    pub fn set_variable(&mut self, name: &str, value: Value) {
        self.environment.assign_global(name, value);
    }

    /// Defined functions with their parameter names.
    pub fn get_functions(&self) -> BTreeMap<String, Vec<String>> {
        self.environment.functions()
    }

    // Statements

    fn execute_stmt(&mut self, stmt: &Stmt) -> RuntimeResult<ControlFlow> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.execute_stmt_inner(stmt))
    }

    fn execute_stmt_inner(&mut self, stmt: &Stmt) -> RuntimeResult<ControlFlow> {
        match stmt {
            Stmt::Say(expr) => {
                let value = self.evaluate_expr(expr)?;
                self.emit(value.to_string());
                Ok(ControlFlow::Normal)
            },
            Stmt::Assignment { name, expr } => {
                let value = self.evaluate_expr(expr)?;
                self.environment.assign(name, value);
                Ok(ControlFlow::Normal)
            },
            Stmt::Block(statements) => self.execute_block(statements),
            Stmt::If { condition, then, otherwise } => {
                if self.evaluate_expr(condition)?.is_truthy() {
                    self.execute_stmt(then)
                } else if let Some(otherwise) = otherwise {
                    self.execute_stmt(otherwise)
                } else {
                    Ok(ControlFlow::Normal)
                }
            },
            Stmt::While { condition, body } => self.execute_while(condition, body),
            Stmt::For { variable, start, end, step, body } => self.execute_for(variable, start, end, step.as_ref(), body),
            Stmt::FunctionDefinition(function) => {
                if !self.environment.define_function(Rc::clone(function)) {
                    tracing::debug!(function = %function.name, "function redefined");
                }

                Ok(ControlFlow::Normal)
            },
            Stmt::Return(expr) => {
                let value = match expr {
                    Some(expr) => Some(self.evaluate_expr(expr)?),
                    None => None,
                };

                Ok(ControlFlow::Return(value))
            },
            Stmt::Break => Ok(ControlFlow::Break),
            Stmt::Continue => Ok(ControlFlow::Continue),
        }
    }

    fn execute_block(&mut self, statements: &[Stmt]) -> RuntimeResult<ControlFlow> {
        for stmt in statements {
            match self.execute_stmt(stmt)? {
                ControlFlow::Normal => {},
                signal => return Ok(signal),
            }
        }

        Ok(ControlFlow::Normal)
    }

    fn execute_while(&mut self, condition: &Expr, body: &Stmt) -> RuntimeResult<ControlFlow> {
        while self.evaluate_expr(condition)?.is_truthy() {
            match self.execute_stmt(body)? {
                ControlFlow::Normal | ControlFlow::Continue => {},
                ControlFlow::Break => break,
                signal @ ControlFlow::Return(_) => return Ok(signal),
            }
        }

        Ok(ControlFlow::Normal)
    }

    fn execute_for(&mut self, variable: &str, start: &Expr, end: &Expr, step: Option<&Expr>, body: &[Stmt]) -> RuntimeResult<ControlFlow> {
        let start = self.evaluate_range_part(start, "start")?;
        let end = self.evaluate_range_part(end, "end")?;
        let step = match step {
            Some(step) => self.evaluate_range_part(step, "step")?,
            None => 1.0,
        };

        if step == 0.0 {
            return Err(RuntimeError::ZeroStep);
        }

        let mut iteration = 0.0;

        loop {
            let current = start + iteration * step;
            let in_range = if step > 0.0 { current <= end } else { current >= end };

            if !in_range {
                break;
            }

            self.environment.assign(variable, Value::Number(current));

            match self.execute_block(body)? {
                ControlFlow::Normal | ControlFlow::Continue => {},
                ControlFlow::Break => break,
                signal @ ControlFlow::Return(_) => return Ok(signal),
            }

            iteration += 1.0;
        }

        Ok(ControlFlow::Normal)
    }

    fn evaluate_range_part(&mut self, expr: &Expr, part: &'static str) -> RuntimeResult<f64> {
        let value = self.evaluate_expr(expr)?.to_numeric();

        value.as_number().ok_or(RuntimeError::NonNumericRange { part, found: value.type_name() })
    }

    fn emit(&mut self, line: String) {
        self.host.print(&line);
        self.output.push(line);
    }

    // Expressions

    fn evaluate_expr(&mut self, expr: &Expr) -> RuntimeResult<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.evaluate_expr_inner(expr))
    }

    fn evaluate_expr_inner(&mut self, expr: &Expr) -> RuntimeResult<Value> {
        match expr {
            Expr::NumberLiteral(value) => Ok(Value::Number(*value)),
            Expr::StringLiteral(value) => Ok(Value::Text(value.clone())),
            Expr::BooleanLiteral(value) => Ok(Value::Boolean(*value)),
            Expr::Identifier(name) => self.environment.get(name).cloned()
                .ok_or_else(|| RuntimeError::UndefinedVariable(name.clone())),
            Expr::BinaryOperation { left, operator, right } => {
                // Both operands are always evaluated, `and`/`or` included
                let left = self.evaluate_expr(left)?;
                let right = self.evaluate_expr(right)?;

                apply_binary_operator(left, *operator, right)
            },
            Expr::UnaryOperation { operator, operand } => {
                let operand = self.evaluate_expr(operand)?;
                apply_unary_operator(*operator, operand)
            },
            Expr::Parenthesized(expr) => self.evaluate_expr(expr),
            Expr::InputCall(prompt) => {
                let prompt = match prompt {
                    Some(prompt) => self.evaluate_expr(prompt)?.to_string(),
                    None => String::new(),
                };

                Ok(Value::Text(self.host.input(&prompt)))
            },
            Expr::FunctionCall { name, args } => self.call_function(name, args),
        }
    }

    fn call_function(&mut self, name: &str, args: &[Expr]) -> RuntimeResult<Value> {
        let function = self.environment.find_function(name)
            .ok_or_else(|| RuntimeError::UndefinedFunction(name.to_owned()))?;

        if function.params.len() != args.len() {
            return Err(RuntimeError::ArgumentCount {
                name: name.to_owned(),
                expected: function.params.len(),
                got: args.len(),
            });
        }

        if self.environment.depth() >= self.max_call_depth {
            return Err(RuntimeError::CallDepthExceeded(self.max_call_depth));
        }

        let mut bindings = HashMap::with_capacity(args.len());

        for (param, arg) in function.params.iter().zip(args) {
            bindings.insert(param.clone(), self.evaluate_expr(arg)?);
        }

        tracing::trace!(function = name, depth = self.environment.depth() + 1, "calling function");

        self.environment.push_frame(bindings);
        let result = self.execute_function_body(&function);
        self.environment.pop_frame();

        result
    }

    fn execute_function_body(&mut self, function: &FunctionDecl) -> RuntimeResult<Value> {
        match self.execute_block(&function.body)? {
            ControlFlow::Return(Some(value)) => Ok(value),
            // No value to hand back: calls always yield something, so use empty text
            _ => Ok(Value::Text(String::new())),
        }
    }
}

fn apply_binary_operator(left: Value, operator: BinaryOperator, right: Value) -> RuntimeResult<Value> {
    match operator {
        BinaryOperator::And => Ok(Value::Boolean(left.is_truthy() && right.is_truthy())),
        BinaryOperator::Or => Ok(Value::Boolean(left.is_truthy() || right.is_truthy())),
        // Text that does not take part in a sum is joined as written
        BinaryOperator::Add => match (left.numeric_value(), right.numeric_value()) {
            (Some(l), Some(r)) => Ok(Value::Number(l + r)),
            _ => Ok(Value::Text(format!("{}{}", left, right))),
        },
        BinaryOperator::Subtract | BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Modulo =>
            apply_arithmetic(left.to_numeric(), operator, right.to_numeric()),
        BinaryOperator::Equal => Ok(Value::Boolean(values_equal(left, right))),
        BinaryOperator::NotEqual => Ok(Value::Boolean(!values_equal(left, right))),
        BinaryOperator::Less | BinaryOperator::LessEqual | BinaryOperator::Greater | BinaryOperator::GreaterEqual =>
            apply_ordering(left.to_numeric(), operator, right.to_numeric()),
    }
}

fn apply_arithmetic(left: Value, operator: BinaryOperator, right: Value) -> RuntimeResult<Value> {
    let (l, r) = match (left.as_number(), right.as_number()) {
        (Some(l), Some(r)) => (l, r),
        _ => return Err(RuntimeError::InvalidOperands {
            operator,
            left: left.type_name(),
            right: right.type_name(),
        }),
    };

    match operator {
        BinaryOperator::Subtract => Ok(Value::Number(l - r)),
        BinaryOperator::Multiply => Ok(Value::Number(l * r)),
        BinaryOperator::Divide if r == 0.0 => Err(RuntimeError::DivisionByZero),
        BinaryOperator::Divide => Ok(Value::Number(l / r)),
        BinaryOperator::Modulo if r == 0.0 => Err(RuntimeError::ModuloByZero),
        _ => Ok(Value::Number(l % r)),
    }
}

// Mismatched types are never equal
fn values_equal(left: Value, right: Value) -> bool {
    let left = left.to_numeric();
    let right = right.to_numeric();

    left.same_type(&right) && left == right
}

fn apply_ordering(left: Value, operator: BinaryOperator, right: Value) -> RuntimeResult<Value> {
    if !left.same_type(&right) {
        return Err(RuntimeError::IncomparableTypes {
            operator,
            left: left.type_name(),
            right: right.type_name(),
        });
    }

    // NaN is unordered and fails every test
    let ordering = left.compare(&right);

    let result = match operator {
        BinaryOperator::Less => ordering == Some(Ordering::Less),
        BinaryOperator::LessEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        BinaryOperator::Greater => ordering == Some(Ordering::Greater),
        _ => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
    };

    Ok(Value::Boolean(result))
}

fn apply_unary_operator(operator: UnaryOperator, operand: Value) -> RuntimeResult<Value> {
    if operator == UnaryOperator::Not {
        return Ok(Value::Boolean(!operand.is_truthy()));
    }

    match (operator, operand.to_numeric()) {
        (UnaryOperator::Negate, Value::Number(value)) => Ok(Value::Number(-value)),
        (_, Value::Number(value)) => Ok(Value::Number(value)),
        (_, operand) => Err(RuntimeError::InvalidOperand { operator, operand: operand.type_name() }),
    }
}
