use std::io::Write;

use super::environment::Environment;
use super::value::Value;
use crate::error::{Error, Result};
use crate::parser::{Expr, Program, Stmt};

/// Tree-walking evaluator for Brook programs
///
/// Walks the AST directly with a recursive match per node kind. All `print`
/// output goes to the caller-supplied sink, so tests and embedders can
/// capture it; the evaluator itself never touches stdout.
pub struct Evaluator<'a> {
    env: Environment,
    sink: &'a mut dyn Write,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator writing `print` output to `sink`
    pub fn new(sink: &'a mut dyn Write) -> Self {
        Evaluator {
            env: Environment::new(),
            sink,
        }
    }

    /// Runs a program to completion
    ///
    /// Returns the value of the final statement. Every statement kind has a
    /// value: declarations yield their initializer, `if` yields the taken
    /// branch, loops yield their last body result, function declarations
    /// yield the closure, and only `print` is always `Null`. The first
    /// error aborts the run.
    pub fn execute(&mut self, program: &Program) -> Result<Value> {
        let mut last = Value::Null;
        for stmt in &program.body {
            last = self.eval_stmt(stmt)?;
        }
        Ok(last)
    }

    fn eval_stmt(&mut self, stmt: &Stmt) -> Result<Value> {
        match stmt {
            Stmt::VariableDeclaration { name, value } => {
                let value = self.eval_expr(value)?;
                self.env.define(name, value.clone());
                Ok(value)
            }

            Stmt::If {
                test,
                consequent,
                alternate,
            } => {
                if self.eval_expr(test)?.is_truthy() {
                    self.eval_stmt(consequent)
                } else if let Some(alternate) = alternate {
                    self.eval_stmt(alternate)
                } else {
                    Ok(Value::Null)
                }
            }

            Stmt::While { test, body } => {
                let mut last = Value::Null;
                while self.eval_expr(test)?.is_truthy() {
                    last = self.eval_stmt(body)?;
                }
                Ok(last)
            }

            Stmt::For {
                init,
                test,
                update,
                body,
            } => {
                // The initializer binds in the enclosing scope, not in a
                // scope of its own; only a block body opens a snapshot.
                self.eval_stmt(init)?;
                let mut last = Value::Null;
                while self.eval_expr(test)?.is_truthy() {
                    last = self.eval_stmt(body)?;
                    self.eval_expr(update)?;
                }
                Ok(last)
            }

            Stmt::Block(body) => self.eval_block(body),

            Stmt::Print(argument) => {
                let value = self.eval_expr(argument)?;
                writeln!(self.sink, "{}", value)?;
                Ok(Value::Null)
            }

            Stmt::FunctionDeclaration { name, params, body } => {
                let closure = Value::Closure {
                    name: name.clone(),
                    params: std::rc::Rc::new(params.clone()),
                    body: body.clone(),
                };
                self.env.define(name, closure.clone());
                Ok(closure)
            }

            // A return that is not a direct child of a block (already handled
            // in eval_block) evaluates its argument and otherwise acts as a
            // plain statement; it does not unwind enclosing statements.
            Stmt::Return(argument) => self.eval_expr(argument),

            Stmt::Expression(expr) => self.eval_expr(expr),
        }
    }

    /// Evaluates a statement list in a fresh scope snapshot
    ///
    /// The block's value is its last statement's value; a `return`
    /// appearing as a *direct* child stops it early and supplies the value
    /// instead. A `return` nested inside an `if` or loop within the block
    /// does not propagate outward. Function calls get this behavior for
    /// their body block, so a return-less function yields its body's last
    /// statement value.
    fn eval_block(&mut self, body: &[Stmt]) -> Result<Value> {
        self.env.push_snapshot();
        let result = self.eval_block_inner(body);
        self.env.pop_scope();
        result
    }

    fn eval_block_inner(&mut self, body: &[Stmt]) -> Result<Value> {
        let mut last = Value::Null;
        for stmt in body {
            if let Stmt::Return(argument) = stmt {
                return self.eval_expr(argument);
            }
            last = self.eval_stmt(stmt)?;
        }
        Ok(last)
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Identifier(name) => self.env.get(name),
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),

            Expr::Binary { op, left, right } => {
                // Both operands are always evaluated; && and || select a
                // value rather than short-circuiting.
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                apply_binary(op, left, right)
            }

            Expr::Unary { op, operand } => {
                let operand = self.eval_expr(operand)?;
                apply_unary(op, operand)
            }

            Expr::Assignment { target, value } => self.eval_assignment(target, value),

            Expr::Call { callee, args } => self.eval_call(callee, args),

            Expr::Member {
                object,
                property,
                computed,
            } => self.eval_member_read(object, property, *computed),

            Expr::Array(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.eval_expr(element)?);
                }
                Ok(Value::array(values))
            }

            Expr::Object(properties) => {
                // Fields keep literal order; a repeated key overwrites the
                // earlier value in place.
                let mut fields: Vec<(String, Value)> = Vec::with_capacity(properties.len());
                for (key, value) in properties {
                    let value = self.eval_expr(value)?;
                    match fields.iter_mut().find(|(k, _)| k == key) {
                        Some((_, slot)) => *slot = value,
                        None => fields.push((key.clone(), value)),
                    }
                }
                Ok(Value::record(fields))
            }
        }
    }

    fn eval_assignment(&mut self, target: &Expr, value: &Expr) -> Result<Value> {
        match target {
            // First assignment to an unbound name declares it in the
            // current scope.
            Expr::Identifier(name) => {
                let value = self.eval_expr(value)?;
                self.env.assign(name, value.clone());
                Ok(value)
            }

            Expr::Member {
                object,
                property,
                computed,
            } => {
                let object = self.eval_expr(object)?;
                let key = self.property_key(property, *computed)?;
                let value = self.eval_expr(value)?;
                self.write_member(object, key, value)
            }

            _ => Err(Error::InvalidAssignmentTarget {
                property: "<expression>".to_string(),
                type_name: "temporary".to_string(),
            }),
        }
    }

    fn write_member(&mut self, object: Value, key: Value, value: Value) -> Result<Value> {
        match object {
            Value::Array(elements) => {
                let index = array_index(&key).ok_or_else(|| Error::InvalidAssignmentTarget {
                    property: key.to_string(),
                    type_name: "array".to_string(),
                })?;
                let mut elements = elements.borrow_mut();
                // Writing past the end grows the array, padding with nulls.
                if index >= elements.len() {
                    elements.resize(index + 1, Value::Null);
                }
                elements[index] = value.clone();
                Ok(value)
            }

            Value::Record(fields) => {
                let key = key.to_string();
                let mut fields = fields.borrow_mut();
                match fields.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, slot)) => *slot = value.clone(),
                    None => fields.push((key, value.clone())),
                }
                Ok(value)
            }

            other => Err(Error::InvalidAssignmentTarget {
                property: key.to_string(),
                type_name: other.type_name().to_string(),
            }),
        }
    }

    fn eval_call(&mut self, callee: &Expr, args: &[Expr]) -> Result<Value> {
        let callee = self.eval_expr(callee)?;

        let (name, params, body) = match callee {
            Value::Closure { name, params, body } => (name, params, body),
            other => {
                return Err(Error::NotCallable {
                    type_name: other.type_name().to_string(),
                })
            }
        };

        // Arguments are evaluated in the caller's scope, then the callee
        // runs in a snapshot of it: the function sees the caller's bindings
        // at call time, and its own writes stay behind when it returns.
        // Argument side effects land before the arity check fires.
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg)?);
        }

        if values.len() != params.len() {
            return Err(Error::ArityMismatch {
                name,
                expected: params.len(),
                got: values.len(),
            });
        }

        self.env.push_snapshot();
        for (param, value) in params.iter().zip(values) {
            self.env.define(param, value);
        }
        let result = self.eval_block(&body);
        self.env.pop_scope();
        result
    }

    fn eval_member_read(
        &mut self,
        object: &Expr,
        property: &Expr,
        computed: bool,
    ) -> Result<Value> {
        let object = self.eval_expr(object)?;
        let key = self.property_key(property, computed)?;

        match object {
            Value::Array(elements) => {
                let elements = elements.borrow();
                Ok(array_index(&key)
                    .and_then(|i| elements.get(i).cloned())
                    .unwrap_or(Value::Null))
            }

            // Absent keys read as null rather than erroring
            Value::Record(fields) => {
                let key = key.to_string();
                Ok(fields
                    .borrow()
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, v)| v.clone())
                    .unwrap_or(Value::Null))
            }

            other => Err(Error::InvalidPropertyAccess {
                property: key.to_string(),
                type_name: other.type_name().to_string(),
            }),
        }
    }

    /// Resolves the key of a member expression
    ///
    /// Dotted access uses the identifier text directly; computed access
    /// evaluates the bracketed expression.
    fn property_key(&mut self, property: &Expr, computed: bool) -> Result<Value> {
        if !computed {
            if let Expr::Identifier(name) = property {
                return Ok(Value::Str(name.clone()));
            }
        }
        self.eval_expr(property)
    }
}

/// Maps a key value onto an array index: a non-negative whole number.
fn array_index(key: &Value) -> Option<usize> {
    let n = key.as_number();
    if n.is_finite() && n >= 0.0 && n.fract() == 0.0 {
        Some(n as usize)
    } else {
        None
    }
}

fn apply_binary(op: &str, left: Value, right: Value) -> Result<Value> {
    match op {
        // String + anything concatenates display forms
        "+" => {
            if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) {
                Ok(Value::Str(format!("{}{}", left, right)))
            } else {
                Ok(Value::Number(left.as_number() + right.as_number()))
            }
        }
        "-" => Ok(Value::Number(left.as_number() - right.as_number())),
        "*" => Ok(Value::Number(left.as_number() * right.as_number())),

        // Only the literal number zero trips the error; a string "0" slips
        // past the check and divides with float semantics.
        "/" => {
            if matches!(right, Value::Number(n) if n == 0.0) {
                Err(Error::DivisionByZero)
            } else {
                Ok(Value::Number(left.as_number() / right.as_number()))
            }
        }

        "==" => Ok(Value::Bool(left == right)),
        "!=" => Ok(Value::Bool(left != right)),

        "<" => Ok(Value::Bool(compare(&left, &right, |o| o.is_lt()))),
        ">" => Ok(Value::Bool(compare(&left, &right, |o| o.is_gt()))),
        "<=" => Ok(Value::Bool(compare(&left, &right, |o| o.is_le()))),
        ">=" => Ok(Value::Bool(compare(&left, &right, |o| o.is_ge()))),

        // Value-selecting logical operators
        "&&" => Ok(if left.is_truthy() { right } else { left }),
        "||" => Ok(if left.is_truthy() { left } else { right }),

        _ => Err(Error::UnknownOperator {
            operator: op.to_string(),
        }),
    }
}

/// Ordering comparison: lexicographic when both sides are strings, numeric
/// coercion otherwise. NaN operands make every comparison false.
fn compare(left: &Value, right: &Value, test: fn(std::cmp::Ordering) -> bool) -> bool {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => test(a.cmp(b)),
        _ => left
            .as_number()
            .partial_cmp(&right.as_number())
            .map(test)
            .unwrap_or(false),
    }
}

fn apply_unary(op: &str, operand: Value) -> Result<Value> {
    match op {
        "-" => Ok(Value::Number(-operand.as_number())),
        "!" => Ok(Value::Bool(!operand.is_truthy())),
        _ => Err(Error::UnknownOperator {
            operator: op.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Scanner;
    use crate::parser::Parser;

    fn run(source: &str) -> (String, Result<Value>) {
        let tokens = Scanner::new(source).scan_tokens().unwrap();
        let program = Parser::new(tokens).parse().unwrap();
        let mut out = Vec::new();
        let result = Evaluator::new(&mut out).execute(&program);
        (String::from_utf8(out).unwrap(), result)
    }

    fn eval(source: &str) -> Value {
        run(source).1.unwrap()
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("1 + 2 * 3;"), Value::Number(7.0));
        assert_eq!(eval("(1 + 2) * 3;"), Value::Number(9.0));
        assert_eq!(eval("2 - 3 - 1;"), Value::Number(-2.0));
        assert_eq!(eval("7 / 2;"), Value::Number(3.5));
        assert_eq!(eval("-3 + 1;"), Value::Number(-2.0));
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(eval("'a' + 'b';"), Value::Str("ab".to_string()));
        assert_eq!(eval("'n = ' + 3;"), Value::Str("n = 3".to_string()));
        assert_eq!(eval("1 + '2';"), Value::Str("12".to_string()));
        // Without a string, + coerces numerically
        assert_eq!(eval("true + 1;"), Value::Number(2.0));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(run("5 / 0;").1, Err(Error::DivisionByZero));
        assert_eq!(run("5 / (1 - 1);").1, Err(Error::DivisionByZero));
        // A string "0" is not the number zero: float division applies
        assert_eq!(eval("5 / '0';"), Value::Number(f64::INFINITY));
        assert_eq!(run("print(5 / '0');").0, "Infinity\n");
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval("1 < 2;"), Value::Bool(true));
        assert_eq!(eval("2 <= 2;"), Value::Bool(true));
        // Both strings: lexicographic
        assert_eq!(eval("'apple' < 'banana';"), Value::Bool(true));
        assert_eq!(eval("'10' < '9';"), Value::Bool(true));
        // Mixed: numeric coercion
        assert_eq!(eval("'10' < 9;"), Value::Bool(false));
        // NaN poisons every ordering
        assert_eq!(eval("'abc' < 5;"), Value::Bool(false));
        assert_eq!(eval("'abc' >= 5;"), Value::Bool(false));
    }

    #[test]
    fn test_equality() {
        assert_eq!(eval("1 == 1;"), Value::Bool(true));
        assert_eq!(eval("1 == '1';"), Value::Bool(false));
        assert_eq!(eval("[1, 2] == [1, 2];"), Value::Bool(true));
        // At statement level `{` opens a block, so records need a binding
        assert_eq!(eval("let r = {a: 1} == {a: 1}; r;"), Value::Bool(true));
        assert_eq!(eval("let r = {a: 1} == {a: 2}; r;"), Value::Bool(false));
    }

    #[test]
    fn test_logical_operators_select_values() {
        assert_eq!(eval("0 && 'x';"), Value::Number(0.0));
        assert_eq!(eval("1 && 'x';"), Value::Str("x".to_string()));
        assert_eq!(eval("0 || 'x';"), Value::Str("x".to_string()));
        assert_eq!(eval("'y' || 'x';"), Value::Str("y".to_string()));
    }

    #[test]
    fn test_logical_operators_evaluate_both_sides() {
        // The right-hand print runs even when the left side decides
        let (output, result) = run("function side() { print('ran'); return 1; } true || side();");
        assert!(result.is_ok());
        assert_eq!(output, "ran\n");
    }

    #[test]
    fn test_unary() {
        assert_eq!(eval("!0;"), Value::Bool(true));
        assert_eq!(eval("!'text';"), Value::Bool(false));
        assert_eq!(eval("-'3';"), Value::Number(-3.0));
    }

    #[test]
    fn test_variables_and_scope_snapshots() {
        let (output, _) = run("let x = 1; { x = 2; print(x); } print(x);");
        assert_eq!(output, "2\n1\n");
    }

    #[test]
    fn test_implicit_declaration() {
        assert_eq!(eval("x = 5; x;"), Value::Number(5.0));
    }

    #[test]
    fn test_undefined_variable() {
        assert_eq!(
            run("print(nope);").1,
            Err(Error::UndefinedVariable {
                name: "nope".to_string()
            })
        );
    }

    #[test]
    fn test_function_call_and_return() {
        let (output, _) = run("function add(a, b) { return a + b; } print(add(2, 3));");
        assert_eq!(output, "5\n");
    }

    #[test]
    fn test_function_without_return_yields_last_body_value() {
        assert_eq!(eval("function f() { 1 + 1; } f();"), Value::Number(2.0));
        assert_eq!(run("function f() { 42; } print(f());").0, "42\n");
        // An empty body has no last value
        assert_eq!(eval("function f() { } f();"), Value::Null);
    }

    #[test]
    fn test_statements_carry_values() {
        // Declarations yield their initializer
        assert_eq!(eval("let x = 5;"), Value::Number(5.0));
        // if yields the taken branch's value
        assert_eq!(eval("if (true) 5; else 6;"), Value::Number(5.0));
        assert_eq!(eval("if (false) 5; else 6;"), Value::Number(6.0));
        assert_eq!(eval("if (false) 5;"), Value::Null);
        // Loops yield their last body result, Null when never entered
        assert_eq!(eval("let i = 0; while (i < 3) i = i + 1;"), Value::Number(3.0));
        assert_eq!(eval("while (false) 1;"), Value::Null);
        assert_eq!(
            eval("for (let i = 0; i < 2; i = i + 1) i * 10;"),
            Value::Number(10.0)
        );
        // A function declaration yields the closure it binds
        assert!(matches!(
            eval("function f() { }"),
            Value::Closure { .. }
        ));
    }

    #[test]
    fn test_return_only_escapes_as_direct_block_child() {
        // The return nested in the if does not leave the function; the
        // trailing direct return wins.
        let source = r#"
            function f() {
                if (true) { return 1; }
                return 2;
            }
            print(f());
        "#;
        assert_eq!(run(source).0, "2\n");
    }

    #[test]
    fn test_function_sees_caller_bindings_at_call_time() {
        let source = r#"
            let x = 1;
            function show() { print(x); }
            x = 10;
            show();
        "#;
        assert_eq!(run(source).0, "10\n");
    }

    #[test]
    fn test_function_writes_stay_local() {
        let (output, _) = run("let x = 1; function f() { x = 2; } f(); print(x);");
        assert_eq!(output, "1\n");
    }

    #[test]
    fn test_arity_mismatch() {
        assert_eq!(
            run("function f(a) { return a; } f(1, 2);").1,
            Err(Error::ArityMismatch {
                name: "f".to_string(),
                expected: 1,
                got: 2
            })
        );
    }

    #[test]
    fn test_arguments_evaluate_before_arity_check() {
        let source = r#"
            function noisy() { print('arg'); return 1; }
            function f(a, b) { return a; }
            f(noisy());
        "#;
        let (output, result) = run(source);
        assert_eq!(output, "arg\n");
        assert_eq!(
            result,
            Err(Error::ArityMismatch {
                name: "f".to_string(),
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn test_not_callable() {
        assert_eq!(
            run("let x = 3; x();").1,
            Err(Error::NotCallable {
                type_name: "number".to_string()
            })
        );
    }

    #[test]
    fn test_array_reads_and_writes() {
        let (output, _) = run("let a = [1, 2, 3]; print(a[0]); a[1] = 9; print(a);");
        assert_eq!(output, "1\n[1, 9, 3]\n");
    }

    #[test]
    fn test_array_out_of_range_read_is_null() {
        assert_eq!(eval("let a = [1]; a[5];"), Value::Null);
        assert_eq!(eval("let a = [1]; a[-1];"), Value::Null);
    }

    #[test]
    fn test_array_write_past_end_grows_with_nulls() {
        let (output, _) = run("let a = [1]; a[3] = 4; print(a);");
        assert_eq!(output, "[1, null, null, 4]\n");
    }

    #[test]
    fn test_arrays_alias_across_function_calls() {
        // Reference semantics reach through the scope snapshot
        let source = r#"
            let a = [1, 2];
            function bump(arr) { arr[0] = 99; }
            bump(a);
            print(a[0]);
        "#;
        assert_eq!(run(source).0, "99\n");
    }

    #[test]
    fn test_record_access() {
        let (output, _) = run(
            "let p = {name: 'Ada', age: 36}; print(p.name); p.age = 37; print(p['age']);",
        );
        assert_eq!(output, "Ada\n37\n");
    }

    #[test]
    fn test_records_print_in_insertion_order() {
        let source = "let r = {b: 2, a: 1, c: 3}; print(r); r.d = 4; print(r);";
        assert_eq!(run(source).0, "{b: 2, a: 1, c: 3}\n{b: 2, a: 1, c: 3, d: 4}\n");
    }

    #[test]
    fn test_missing_record_key_is_null() {
        assert_eq!(eval("let p = {a: 1}; p.b;"), Value::Null);
    }

    #[test]
    fn test_invalid_property_access() {
        assert_eq!(
            run("let n = 3; n.x;").1,
            Err(Error::InvalidPropertyAccess {
                property: "x".to_string(),
                type_name: "number".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert_eq!(
            run("let n = 3; n.x = 1;").1,
            Err(Error::InvalidAssignmentTarget {
                property: "x".to_string(),
                type_name: "number".to_string()
            })
        );
        assert!(matches!(
            run("1 = 2;").1,
            Err(Error::InvalidAssignmentTarget { .. })
        ));
    }

    #[test]
    fn test_while_loop() {
        // A single-statement body runs in the enclosing scope, so its
        // writes reach the condition. (A block body would snapshot, and
        // its writes would never terminate the loop.)
        let (output, _) = run("let i = 0; while (i < 3) i = i + 1; print(i);");
        assert_eq!(output, "3\n");
    }

    #[test]
    fn test_for_loop() {
        let (output, _) = run("for (let i = 0; i < 3; i = i + 1) print(i);");
        assert_eq!(output, "0\n1\n2\n");
    }

    #[test]
    fn test_error_aborts_before_later_output() {
        let (output, result) = run("print(5 / 0); print('after');");
        assert_eq!(result, Err(Error::DivisionByZero));
        assert_eq!(output, "");
    }

    #[test]
    fn test_rerun_is_deterministic() {
        let tokens = Scanner::new("let x = 2; print(x * 21);")
            .scan_tokens()
            .unwrap();
        let program = Parser::new(tokens).parse().unwrap();

        let mut first = Vec::new();
        Evaluator::new(&mut first).execute(&program).unwrap();
        let mut second = Vec::new();
        Evaluator::new(&mut second).execute(&program).unwrap();

        assert_eq!(first, second);
        assert_eq!(String::from_utf8(first).unwrap(), "42\n");
    }
}
