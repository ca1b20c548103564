use crate::ast::{BinaryOp, Expr, Program, Stmt, UnaryOp};
use crate::error::{BhaiError, ErrorKind, Span};
use crate::value::Value;
use log::{debug, trace};
use std::collections::HashMap;
use std::rc::Rc;

/// Default bound on nested function calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

/// Variable bindings as a stack of frames. The bottom frame holds the
/// program's top-level variables; each function call pushes one frame.
/// Reads search from the innermost frame outwards, writes always land in the
/// innermost frame, so a callee never changes its caller's variables.
#[derive(Debug, Clone)]
pub struct Environment {
    frames: Vec<HashMap<String, Value>>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn define(&mut self, name: &str, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), value);
        }
    }

    pub fn push_frame(&mut self, frame: HashMap<String, Value>) {
        self.frames.push(frame);
    }

    pub fn pop_frame(&mut self) {
        // The global frame stays
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Number of active function frames.
    pub fn call_depth(&self) -> usize {
        self.frames.len() - 1
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct FunctionDef {
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}

/// Interpreter state for one program run.
pub struct Evaluator {
    environment: Environment,
    functions: HashMap<String, Rc<FunctionDef>>,
    output: Vec<String>,
    max_call_depth: usize,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_max_call_depth(DEFAULT_MAX_CALL_DEPTH)
    }

    pub fn with_max_call_depth(max_call_depth: usize) -> Self {
        Self {
            environment: Environment::new(),
            functions: HashMap::new(),
            output: Vec::new(),
            max_call_depth,
        }
    }

    /// Runs `program` and returns the printed lines in order.
    pub fn evaluate_program(&mut self, program: &Program) -> Result<Vec<String>, BhaiError> {
        self.execute_block(&program.body)?;
        Ok(std::mem::take(&mut self.output))
    }

    fn execute_block(&mut self, statements: &[Stmt]) -> Result<(), BhaiError> {
        for statement in statements {
            self.execute_statement(statement)?;
        }
        Ok(())
    }

    fn execute_statement(&mut self, stmt: &Stmt) -> Result<(), BhaiError> {
        match stmt {
            Stmt::Print { expr, .. } => {
                let value = self.evaluate_expression(expr)?;
                self.output.push(value.to_string());
                Ok(())
            }
            Stmt::Variable {
                name,
                value,
                is_list,
                ..
            } => {
                let value = self.evaluate_expression(value)?;
                if *is_list && !matches!(value, Value::List(_)) {
                    debug!("list variable '{}' bound to a {}", name, value.type_name());
                }
                self.environment.define(name, value);
                Ok(())
            }
            Stmt::Function {
                name, params, body, ..
            } => {
                self.functions.insert(
                    name.clone(),
                    Rc::new(FunctionDef {
                        params: params.clone(),
                        body: body.clone(),
                    }),
                );
                Ok(())
            }
            Stmt::If {
                condition,
                then_body,
                else_body,
                ..
            } => {
                if self.evaluate_expression(condition)?.is_truthy() {
                    self.execute_block(then_body)
                } else if let Some(else_body) = else_body {
                    self.execute_block(else_body)
                } else {
                    Ok(())
                }
            }
            Stmt::Repeat { count, body, span } => {
                let count = self.evaluate_expression(count)?.to_number();
                if count.is_infinite() && count > 0.0 {
                    return Err(self.error(ErrorKind::InvalidRepeatCount { count }, span));
                }
                // NaN and non-positive counts run zero times
                let iterations = if count > 0.0 { count.ceil() as u64 } else { 0 };
                for _ in 0..iterations {
                    self.execute_block(body)?;
                }
                Ok(())
            }
            Stmt::Call { name, args, span } => self.call_function(name, args, span),
        }
    }

    fn call_function(&mut self, name: &str, args: &[Expr], span: &Span) -> Result<(), BhaiError> {
        let function = self.functions.get(name).cloned().ok_or_else(|| {
            self.error(
                ErrorKind::UndefinedFunction {
                    name: name.to_string(),
                },
                span,
            )
            .with_help(format!(
                "Define it before calling: `function {}(...) {{ ... }}`.",
                name
            ))
        })?;

        if self.environment.call_depth() >= self.max_call_depth {
            return Err(self.error(
                ErrorKind::CallDepthExceeded {
                    limit: self.max_call_depth,
                },
                span,
            ));
        }

        let mut arguments = Vec::with_capacity(args.len());
        for arg in args {
            arguments.push(self.evaluate_expression(arg)?);
        }
        if arguments.len() > function.params.len() {
            trace!(
                "{} extra argument(s) to '{}' ignored",
                arguments.len() - function.params.len(),
                name
            );
        }

        let mut arguments = arguments.into_iter();
        let frame = function
            .params
            .iter()
            .map(|param| (param.clone(), arguments.next().unwrap_or(Value::Undefined)))
            .collect();

        trace!("calling '{}' at depth {}", name, self.environment.call_depth() + 1);
        self.environment.push_frame(frame);
        let result = self.execute_block(&function.body);
        self.environment.pop_frame();
        result
    }

    pub fn evaluate_expression(&mut self, expr: &Expr) -> Result<Value, BhaiError> {
        match expr {
            Expr::Number { value, .. } => Ok(Value::Number(*value)),
            Expr::String { value, .. } => Ok(Value::String(value.clone())),
            Expr::Boolean { value, .. } => Ok(Value::Boolean(*value)),
            Expr::Array { items, .. } => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.evaluate_expression(item)?);
                }
                Ok(Value::List(values))
            }
            Expr::Identifier { name, span } => self.lookup(name, span).cloned(),
            Expr::Index { name, index, span } => {
                let len = match self.lookup(name, span)? {
                    Value::List(items) => items.len(),
                    other => {
                        let found = other.type_name();
                        return Err(self
                            .error(
                                ErrorKind::NotAList {
                                    name: name.clone(),
                                    found,
                                },
                                span,
                            )
                            .with_help(format!(
                                "'{}' holds a {}; only lists can be indexed. Declare one with `list {} = [...]`.",
                                name, found, name
                            )));
                    }
                };

                let position = match self.evaluate_expression(index)? {
                    Value::Number(n) if n.fract() == 0.0 && n >= 0.0 && n < len as f64 => n as usize,
                    other => {
                        return Err(self
                            .error(
                                ErrorKind::IndexOutOfBounds {
                                    index: other.to_string(),
                                    len,
                                },
                                index.span(),
                            )
                            .with_help(format!("Valid indexes for '{}' are 0 to {}.", name, len.saturating_sub(1))))
                    }
                };
                Ok(self.list_item(name, position))
            }
            Expr::Property {
                name,
                property,
                span,
            } => {
                let value = self.lookup(name, span)?;
                match (value, property.as_str()) {
                    (Value::List(items), "length") => Ok(Value::Number(items.len() as f64)),
                    (Value::String(s), "length") => Ok(Value::Number(s.chars().count() as f64)),
                    (other, _) => {
                        let found = other.type_name();
                        Err(self
                            .error(
                                ErrorKind::UnknownProperty {
                                    property: property.clone(),
                                    found,
                                },
                                span,
                            )
                            .with_help("Lists and strings have a `length` property."))
                    }
                }
            }
            Expr::Unary {
                operator,
                operand,
                span,
            } => {
                let value = self.evaluate_expression(operand)?;
                match (operator, value) {
                    (UnaryOp::Not, value) => Ok(Value::Boolean(!value.is_truthy())),
                    (UnaryOp::Negate, Value::Number(n)) => Ok(Value::Number(-n)),
                    (UnaryOp::Negate, other) => Err(self.error(
                        ErrorKind::TypeMismatch {
                            operator: operator.symbol(),
                            left: "nothing",
                            right: other.type_name(),
                        },
                        span,
                    )),
                }
            }
            Expr::Binary {
                left,
                operator,
                right,
                span,
            } => {
                // Both sides are always evaluated; `and`/`or` do not short-circuit
                let left_val = self.evaluate_expression(left)?;
                let right_val = self.evaluate_expression(right)?;
                self.evaluate_binary_op(*operator, left_val, right_val, span)
            }
        }
    }

    fn lookup(&self, name: &str, span: &Span) -> Result<&Value, BhaiError> {
        self.environment.get(name).ok_or_else(|| {
            self.error(
                ErrorKind::UndefinedVariable {
                    name: name.to_string(),
                },
                span,
            )
            .with_help(format!("Assign it before use: `{} = ...`.", name))
        })
    }

    fn list_item(&self, name: &str, position: usize) -> Value {
        match self.environment.get(name) {
            Some(Value::List(items)) => items.get(position).cloned().unwrap_or(Value::Undefined),
            _ => Value::Undefined,
        }
    }

    fn evaluate_binary_op(
        &self,
        operator: BinaryOp,
        left: Value,
        right: Value,
        span: &Span,
    ) -> Result<Value, BhaiError> {
        match operator {
            BinaryOp::Add => match (left, right) {
                (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
                (l, r) => Ok(Value::String(format!("{}{}", l, r))),
            },
            BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Divide => match (left, right) {
                (Value::Number(l), Value::Number(r)) => match operator {
                    BinaryOp::Subtract => Ok(Value::Number(l - r)),
                    BinaryOp::Multiply => Ok(Value::Number(l * r)),
                    _ if r == 0.0 => Err(self
                        .error(ErrorKind::DivisionByZero, span)
                        .with_help("Check the divisor before dividing.")),
                    _ => Ok(Value::Number(l / r)),
                },
                (l, r) => Err(self.error(
                    ErrorKind::TypeMismatch {
                        operator: operator.symbol(),
                        left: l.type_name(),
                        right: r.type_name(),
                    },
                    span,
                )),
            },
            BinaryOp::Greater => Ok(Value::Boolean(
                left.compare(&right) == Some(std::cmp::Ordering::Greater),
            )),
            BinaryOp::Less => Ok(Value::Boolean(
                left.compare(&right) == Some(std::cmp::Ordering::Less),
            )),
            BinaryOp::Equal => Ok(Value::Boolean(left.loose_eq(&right))),
            BinaryOp::NotEqual => Ok(Value::Boolean(!left.loose_eq(&right))),
            BinaryOp::And => Ok(Value::Boolean(left.is_truthy() && right.is_truthy())),
            BinaryOp::Or => Ok(Value::Boolean(left.is_truthy() || right.is_truthy())),
        }
    }

    fn error(&self, kind: ErrorKind, span: &Span) -> BhaiError {
        BhaiError::new(kind, span.clone())
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}
