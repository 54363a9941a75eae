// Numeric evaluation of a parsed expression.
//
// The tree is checked first (known constants, known functions, argument
// counts) so users get precise errors. It is then lowered to an evalexpr
// program where every literal and constant is a bound float variable and
// every compound node is parenthesized, so evalexpr's own precedence and
// integer arithmetic never come into play.

use super::expression::{BinaryOp, Expr, MathError, UnaryOp};
use evalexpr::{
    ContextWithMutableFunctions, ContextWithMutableVariables, EvalexprError, EvalexprResult,
    Function, HashMapContext, Value,
};

const UNARY_FUNCTIONS: &[(&str, fn(f64) -> f64)] = &[
    ("cbrt", f64::cbrt),
    ("abs", f64::abs),
    ("sin", f64::sin),
    ("cos", f64::cos),
    ("tan", f64::tan),
    ("asin", f64::asin),
    ("acos", f64::acos),
    ("atan", f64::atan),
    ("sinh", f64::sinh),
    ("cosh", f64::cosh),
    ("tanh", f64::tanh),
    ("exp", f64::exp),
    ("log2", f64::log2),
    ("log10", f64::log10),
    ("floor", f64::floor),
    ("ceil", f64::ceil),
    ("round", f64::round),
    ("sign", sign),
];

/// Accepted argument counts: minimum, optional maximum, and how to describe them.
fn arity(name: &str) -> Option<(usize, Option<usize>, &'static str)> {
    match name {
        "sqrt" | "factorial" => Some((1, Some(1), "1")),
        "log" => Some((1, Some(2), "1 or 2")),
        "pow" | "mod" => Some((2, Some(2), "2")),
        "min" | "max" => Some((1, None, "at least 1")),
        _ if UNARY_FUNCTIONS.iter().any(|(n, _)| *n == name) => Some((1, Some(1), "1")),
        _ => None,
    }
}

fn constant(name: &str) -> Option<f64> {
    match name {
        "pi" | "PI" => Some(std::f64::consts::PI),
        "e" | "E" => Some(std::f64::consts::E),
        "tau" => Some(std::f64::consts::TAU),
        "phi" => Some(1.618_033_988_749_895),
        "Infinity" => Some(f64::INFINITY),
        "NaN" => Some(f64::NAN),
        _ => None,
    }
}

/// Evaluate `expr` to a float.
pub fn eval(expr: &Expr) -> Result<f64, MathError> {
    let mut program = Program::default();
    program.lower(expr)?;

    let mut context = base_context().map_err(domain)?;
    for (i, value) in program.bindings.iter().enumerate() {
        context
            .set_value(binding(i), Value::Float(*value))
            .map_err(domain)?;
    }

    evalexpr::eval_with_context(&program.source, &context)
        .and_then(|value| value.as_number())
        .map_err(domain)
}

#[derive(Default)]
struct Program {
    source: String,
    bindings: Vec<f64>,
}

impl Program {
    fn bind(&mut self, value: f64) {
        self.source.push_str(&binding(self.bindings.len()));
        self.bindings.push(value);
    }

    fn lower(&mut self, expr: &Expr) -> Result<(), MathError> {
        match expr {
            Expr::Number(value) => self.bind(*value),
            Expr::Symbol(name) => {
                let value =
                    constant(name).ok_or_else(|| MathError::UndefinedSymbol(name.clone()))?;
                self.bind(value);
            }
            Expr::Unary { op, operand } => match op {
                UnaryOp::Neg => {
                    self.source.push_str("(-");
                    self.lower(operand)?;
                    self.source.push(')');
                }
                UnaryOp::Plus => self.lower(operand)?,
            },
            // evalexpr's `%` keeps the dividend's sign; the floored form is wanted here.
            Expr::Binary {
                op: BinaryOp::Mod,
                lhs,
                rhs,
                ..
            } => self.call("modulo", [lhs.as_ref(), rhs.as_ref()])?,
            Expr::Binary { op, lhs, rhs, .. } => {
                self.source.push('(');
                self.lower(lhs)?;
                self.source.push_str(match op {
                    BinaryOp::Add => " + ",
                    BinaryOp::Sub => " - ",
                    BinaryOp::Mul => " * ",
                    BinaryOp::Div => " / ",
                    BinaryOp::Pow => " ^ ",
                    BinaryOp::Mod => " % ",
                });
                self.lower(rhs)?;
                self.source.push(')');
            }
            Expr::Factorial(operand) => self.call("factorial", [operand.as_ref()])?,
            Expr::Call { name, args } => {
                let (min, max, expected) =
                    arity(name).ok_or_else(|| MathError::UndefinedFunction(name.clone()))?;
                if args.len() < min || max.is_some_and(|max| args.len() > max) {
                    return Err(MathError::Arity {
                        name: name.clone(),
                        expected,
                        given: args.len(),
                    });
                }
                self.call(name, args)?;
            }
            Expr::Group(inner) => self.lower(inner)?,
        }
        Ok(())
    }

    fn call<'e>(
        &mut self,
        name: &str,
        args: impl IntoIterator<Item = &'e Expr>,
    ) -> Result<(), MathError> {
        self.source.push_str(name);
        self.source.push('(');
        for (i, arg) in args.into_iter().enumerate() {
            if i > 0 {
                self.source.push_str(", ");
            }
            self.lower(arg)?;
        }
        self.source.push(')');
        Ok(())
    }
}

fn binding(index: usize) -> String {
    format!("x{}", index)
}

fn domain(error: EvalexprError) -> MathError {
    match error {
        EvalexprError::CustomMessage(message) => MathError::Domain(message),
        other => MathError::Domain(other.to_string()),
    }
}

/// Arguments arrive as a single value or, for several arguments, a tuple.
fn numbers(argument: &Value) -> EvalexprResult<Vec<f64>> {
    match argument {
        Value::Tuple(items) => items.iter().map(Value::as_number).collect(),
        other => Ok(vec![other.as_number()?]),
    }
}

fn base_context() -> EvalexprResult<HashMapContext> {
    let mut context = HashMapContext::new();

    for &(name, f) in UNARY_FUNCTIONS {
        context.set_function(
            name.to_string(),
            Function::new(move |argument| Ok(Value::Float(f(argument.as_number()?)))),
        )?;
    }

    context.set_function(
        "sqrt".to_string(),
        Function::new(|argument| {
            let value = argument.as_number()?;
            if value < 0.0 {
                return Err(EvalexprError::CustomMessage(
                    "Complex results are not supported".to_string(),
                ));
            }
            Ok(Value::Float(value.sqrt()))
        }),
    )?;
    context.set_function(
        "factorial".to_string(),
        Function::new(|argument| factorial(argument.as_number()?).map(Value::Float)),
    )?;
    context.set_function(
        "log".to_string(),
        Function::new(|argument| match numbers(argument)?.as_slice() {
            [x, base] => Ok(Value::Float(x.ln() / base.ln())),
            [x, ..] => Ok(Value::Float(x.ln())),
            [] => Err(EvalexprError::CustomMessage("log needs an argument".to_string())),
        }),
    )?;
    context.set_function(
        "pow".to_string(),
        Function::new(|argument| match numbers(argument)?.as_slice() {
            [base, exponent] => Ok(Value::Float(base.powf(*exponent))),
            _ => Err(EvalexprError::CustomMessage("pow needs two arguments".to_string())),
        }),
    )?;
    for name in ["mod", "modulo"] {
        context.set_function(
            name.to_string(),
            Function::new(|argument| match numbers(argument)?.as_slice() {
                [a, b] => Ok(Value::Float(modulo(*a, *b))),
                _ => Err(EvalexprError::CustomMessage("mod needs two arguments".to_string())),
            }),
        )?;
    }
    context.set_function(
        "min".to_string(),
        Function::new(|argument| {
            let values = numbers(argument)?;
            Ok(Value::Float(values.into_iter().fold(f64::INFINITY, f64::min)))
        }),
    )?;
    context.set_function(
        "max".to_string(),
        Function::new(|argument| {
            let values = numbers(argument)?;
            Ok(Value::Float(values.into_iter().fold(f64::NEG_INFINITY, f64::max)))
        }),
    )?;

    Ok(context)
}

fn sign(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value.signum()
    }
}

fn modulo(a: f64, b: f64) -> f64 {
    if b == 0.0 {
        a
    } else {
        a - b * (a / b).floor()
    }
}

fn factorial(value: f64) -> EvalexprResult<f64> {
    if value < 0.0 || value.fract() != 0.0 {
        return Err(EvalexprError::CustomMessage(
            "Factorial is only defined for non-negative integers".to_string(),
        ));
    }
    if value > 170.0 {
        return Ok(f64::INFINITY);
    }
    Ok((2..=value as u64).fold(1.0, |acc, n| acc * n as f64))
}
