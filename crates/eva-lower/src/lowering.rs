/*! The recursive expression-to-IR translator.
 *
 * Every expression lowers to exactly one value. Mutable variables live in stack slots that are
 * sunk to the entry block, so a conditional only has to merge the values of its two branches with
 * a phi at the join block.
 */

use crate::env::{Binding, Environment};
use crate::errors::{LowerError, LowerResult};
use crate::type_resolver::TypeResolver;
use eva_core::{BinaryOp, FunctionBuilder, IntCC, Module, Type, Value};
use eva_parser::Expr;

pub const PRINTF: &str = "printf";

pub struct Lowering<'c> {
    module: &'c mut Module,
    builder: &'c mut FunctionBuilder,
    types: TypeResolver,
}

impl<'c> Lowering<'c> {
    pub fn new(module: &'c mut Module, builder: &'c mut FunctionBuilder, types: TypeResolver) -> Self {
        Self {
            module,
            builder,
            types,
        }
    }

    pub fn lower(&mut self, expr: &Expr, env: &mut Environment<'_>) -> LowerResult<Value> {
        match expr {
            Expr::Number(n) => lower_number(*n),
            Expr::String(raw) => Ok(self.lower_string(raw)),
            Expr::Symbol(name) => self.lower_symbol(name, env),
            Expr::List(items) => self.lower_list(items, env),
        }
    }

    fn lower_string(&mut self, raw: &str) -> Value {
        Value::Str(self.module.add_string(&unescape(raw)))
    }

    fn lower_symbol(&mut self, name: &str, env: &Environment<'_>) -> LowerResult<Value> {
        match name {
            "true" => return Ok(self.builder.bconst(true)),
            "false" => return Ok(self.builder.bconst(false)),
            _ => {}
        }

        match env.lookup(name)? {
            Binding::Value(value) => Ok(value.clone()),
            variable => {
                let (address, ty) = variable
                    .address()
                    .ok_or_else(|| LowerError::UnboundName(name.to_string()))?;
                let ty = ty.clone();
                Ok(self.builder.load(ty, address)?)
            }
        }
    }

    fn lower_list(&mut self, items: &[Expr], env: &mut Environment<'_>) -> LowerResult<Value> {
        let Some((head, operands)) = items.split_first() else {
            return Err(LowerError::UnknownForm("()".to_string()));
        };
        let Some(tag) = head.as_symbol() else {
            return Err(LowerError::UnknownForm(head.to_string()));
        };
        tracing::trace!(form = tag, operands = operands.len(), "lowering form");

        match tag {
            "+" => self.lower_binary(tag, BinaryOp::Add, operands, env),
            "-" => self.lower_binary(tag, BinaryOp::Sub, operands, env),
            "*" => self.lower_binary(tag, BinaryOp::Mul, operands, env),
            "/" => self.lower_binary(tag, BinaryOp::SDiv, operands, env),

            ">" => self.lower_compare(tag, IntCC::UnsignedGreaterThan, operands, env),
            "<" => self.lower_compare(tag, IntCC::UnsignedLessThan, operands, env),
            "==" => self.lower_compare(tag, IntCC::Equal, operands, env),
            "!=" => self.lower_compare(tag, IntCC::NotEqual, operands, env),
            ">=" => self.lower_compare(tag, IntCC::UnsignedGreaterThanOrEqual, operands, env),
            "<=" => self.lower_compare(tag, IntCC::UnsignedLessThanOrEqual, operands, env),

            "var" => self.lower_var(operands, env),
            "set" => self.lower_set(operands, env),
            "begin" => self.lower_begin(operands, env),
            "printf" => self.lower_printf(operands, env),
            "if" => self.lower_if(operands, env),

            _ => Err(LowerError::UnknownForm(tag.to_string())),
        }
    }

    fn lower_binary(
        &mut self,
        form: &str,
        op: BinaryOp,
        operands: &[Expr],
        env: &mut Environment<'_>,
    ) -> LowerResult<Value> {
        expect_exactly(form, operands, 2)?;
        let left = self.lower(&operands[0], env)?;
        let right = self.lower(&operands[1], env)?;
        Ok(self.builder.binary(op, left, right)?)
    }

    fn lower_compare(
        &mut self,
        form: &str,
        cond: IntCC,
        operands: &[Expr],
        env: &mut Environment<'_>,
    ) -> LowerResult<Value> {
        expect_exactly(form, operands, 2)?;
        let left = self.lower(&operands[0], env)?;
        let right = self.lower(&operands[1], env)?;
        Ok(self.builder.icmp(cond, left, right)?)
    }

    /// `(var name init)` or `(var (name type) init)`.
    fn lower_var(&mut self, operands: &[Expr], env: &mut Environment<'_>) -> LowerResult<Value> {
        expect_exactly("var", operands, 2)?;
        let (name, ty) = self.declaration_target(&operands[0])?;

        // The initializer cannot see the name it initializes.
        let init = self.lower(&operands[1], env)?;

        let slot = self.builder.alloca(name, ty.clone())?;
        env.define(name, Binding::Slot { slot, ty });
        self.builder.store(Value::Slot(slot), init.clone())?;
        Ok(init)
    }

    fn declaration_target<'e>(&self, target: &'e Expr) -> LowerResult<(&'e str, Type)> {
        match target {
            Expr::Symbol(name) => Ok((name, self.types.default_type())),
            Expr::List(parts) => match parts.as_slice() {
                [Expr::Symbol(name), Expr::Symbol(type_name)] => {
                    Ok((name, self.types.resolve(type_name)?))
                }
                [_, _] => Err(LowerError::invalid_target(
                    "var",
                    format!("name and type must be symbols in {}", target),
                )),
                _ => Err(LowerError::invalid_target(
                    "var",
                    format!("typed declaration needs exactly (name type), found {}", target),
                )),
            },
            other => Err(LowerError::invalid_target(
                "var",
                format!("expected a name, found {}", other),
            )),
        }
    }

    fn lower_set(&mut self, operands: &[Expr], env: &mut Environment<'_>) -> LowerResult<Value> {
        expect_exactly("set", operands, 2)?;
        let Some(name) = operands[0].as_symbol() else {
            return Err(LowerError::invalid_target(
                "set",
                format!("expected a variable name, found {}", operands[0]),
            ));
        };

        // The value may itself bind the target name, so resolve it afterwards.
        let value = self.lower(&operands[1], env)?;
        let (address, _) = env
            .lookup(name)?
            .address()
            .ok_or_else(|| LowerError::NotAssignable(name.to_string()))?;

        self.builder.store(address, value.clone())?;
        Ok(value)
    }

    fn lower_begin(&mut self, operands: &[Expr], env: &mut Environment<'_>) -> LowerResult<Value> {
        let Some((last, leading)) = operands.split_last() else {
            return Err(LowerError::arity("begin", "at least 1", 0));
        };

        let mut scope = Environment::with_parent(env);
        for expr in leading {
            self.lower(expr, &mut scope)?;
        }
        self.lower(last, &mut scope)
    }

    fn lower_printf(&mut self, operands: &[Expr], env: &mut Environment<'_>) -> LowerResult<Value> {
        expect_at_least("printf", operands, 1)?;
        if self.module.get_function(PRINTF).is_none() {
            return Err(LowerError::MissingExtern(PRINTF.to_string()));
        }

        let args = operands
            .iter()
            .map(|arg| self.lower(arg, env))
            .collect::<LowerResult<Vec<_>>>()?;
        Ok(self.builder.call(PRINTF, args)?)
    }

    /// Lays out `then`, `else` and `ifend` in that order. Nested conditionals
    /// may leave a branch in a different block than it started in, so the phi
    /// names the block each branch actually ended in.
    fn lower_if(&mut self, operands: &[Expr], env: &mut Environment<'_>) -> LowerResult<Value> {
        expect_exactly("if", operands, 3)?;

        let condition = self.lower(&operands[0], env)?;

        let then_block = self.builder.create_block("then");
        let else_block = self.builder.create_block("else");
        let join_block = self.builder.create_block("ifend");
        self.builder.branch(condition, then_block, else_block)?;

        self.builder.switch_to_block(then_block)?;
        let then_value = self.lower(&operands[1], env)?;
        let then_end = self.builder.current_block()?;
        self.builder.jump(join_block)?;

        self.builder.move_block_after(else_block, then_end)?;
        self.builder.switch_to_block(else_block)?;
        let else_value = self.lower(&operands[2], env)?;
        let else_end = self.builder.current_block()?;
        self.builder.jump(join_block)?;

        self.builder.move_block_after(join_block, else_end)?;
        self.builder.switch_to_block(join_block)?;
        tracing::debug!(%then_end, %else_end, join = %join_block, "merging conditional");

        let ty = self.builder.signature().ret.clone();
        Ok(self
            .builder
            .phi(ty, vec![(then_value, then_end), (else_value, else_end)])?)
    }
}

/// Accepts anything that fits in 32 bits, signed or unsigned, keeping the bit pattern.
fn lower_number(n: i64) -> LowerResult<Value> {
    if let Ok(v) = i32::try_from(n) {
        return Ok(Value::int(v));
    }
    u32::try_from(n)
        .map(|v| Value::int(v as i32))
        .map_err(|_| LowerError::LiteralOutOfRange(n))
}

fn expect_exactly(form: &str, operands: &[Expr], expected: usize) -> LowerResult<()> {
    if operands.len() != expected {
        return Err(LowerError::arity(form, expected.to_string(), operands.len()));
    }
    Ok(())
}

fn expect_at_least(form: &str, operands: &[Expr], min: usize) -> LowerResult<()> {
    if operands.len() < min {
        return Err(LowerError::arity(form, format!("at least {}", min), operands.len()));
    }
    Ok(())
}

/// Decodes backslash escapes. Unknown escapes are kept as written.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
