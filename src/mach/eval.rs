use super::function::Function;
use super::screen::Screen;
use super::val::Val;
use super::var::Var;
use crate::error;
use crate::lang::ast::Expression;
use crate::lang::Error;
use rand::rngs::StdRng;
use rand::Rng;

type Result<T> = std::result::Result<T, Error>;

/// ## Expression evaluator
///
/// Walks the parsed expression tree against the symbol environment and
/// the machine. The grammar is closed: identifiers resolve to user
/// variables or the fixed built-in table, nothing else.
pub struct Eval<'a> {
    pub vars: &'a mut Var,
    pub screen: &'a mut Screen,
    pub rng: &'a mut StdRng,
}

impl<'a> Eval<'a> {
    pub fn value(&mut self, expr: &Expression) -> Result<Val> {
        use Expression::*;
        match expr {
            Integer(n) => Ok(Val::Integer(*n)),
            Float(n) => Ok(Val::Float(*n)),
            String(s) => Ok(Val::String(s.clone())),
            Var(name) => self.variable(name),
            Function(name, args) => self.call(name, args),
            Negate(e) => match self.value(e)? {
                Val::Integer(n) => Ok(Val::Integer(-n)),
                Val::Float(n) => Ok(Val::Float(-n)),
                Val::String(_) => Err(error!(TypeMismatch)),
            },
            Not(e) => {
                let v = self.value(e)?;
                Ok(Val::Integer(if v.is_truthy() { 0 } else { 1 }))
            }
            Power(a, b) => self.power(a, b),
            Multiply(a, b) => self.arithmetic(a, b, i64::wrapping_mul, |x, y| x * y),
            Divide(a, b) => self.divide(a, b),
            Modulus(a, b) => self.modulus(a, b),
            Add(a, b) => self.add(a, b),
            Subtract(a, b) => self.arithmetic(a, b, i64::wrapping_sub, |x, y| x - y),
            Equal(a, b) => self.compare(a, b, |o| o == std::cmp::Ordering::Equal),
            NotEqual(a, b) => self.compare(a, b, |o| o != std::cmp::Ordering::Equal),
            Less(a, b) => self.compare(a, b, |o| o == std::cmp::Ordering::Less),
            LessEqual(a, b) => self.compare(a, b, |o| o != std::cmp::Ordering::Greater),
            Greater(a, b) => self.compare(a, b, |o| o == std::cmp::Ordering::Greater),
            GreaterEqual(a, b) => self.compare(a, b, |o| o != std::cmp::Ordering::Less),
            And(a, b) => self.bitwise(a, b, |x, y| x & y),
            Or(a, b) => self.bitwise(a, b, |x, y| x | y),
            Xor(a, b) => self.bitwise(a, b, |x, y| x ^ y),
        }
    }

    fn variable(&mut self, name: &str) -> Result<Val> {
        match name {
            "ti" => Ok(Val::Integer(self.jiffies())),
            "time" => Ok(Function::time()),
            _ => Ok(self.vars.fetch(name)),
        }
    }

    // The jiffy clock lives at $A0-$A2; the read hooks synthesize it.
    fn jiffies(&mut self) -> i64 {
        let mem = self.screen.memory();
        let hi = mem.read(160) as i64;
        let mid = mem.read(161) as i64;
        let lo = mem.read(162) as i64;
        (hi << 16) + (mid << 8) + lo
    }

    fn call(&mut self, name: &str, args: &[Expression]) -> Result<Val> {
        let arity = match Function::arity(name) {
            Some(arity) => arity,
            None => return Err(error!(SyntaxError; "UNDEF'D FUNCTION")),
        };
        if !arity.contains(&args.len()) {
            return Err(error!(SyntaxError; "WRONG NUMBER OF ARGUMENTS"));
        }
        let mut vals: Vec<Val> = Vec::with_capacity(args.len());
        for arg in args {
            vals.push(self.value(arg)?);
        }
        match name {
            "peek" => self.peek(&vals[0]),
            "peekw" => self.peekw(&vals[0]),
            "rnd" => Ok(Val::Float(self.rng.gen::<f64>())),
            "rndi" => self.rndi(&vals[0], &vals[1]),
            "abs" => Function::abs(vals.remove(0)),
            "asc" => Function::asc(vals.remove(0)),
            "atn" => Function::atn(vals.remove(0)),
            "chr" => Function::chr(vals.remove(0)),
            "cos" => Function::cos(vals.remove(0)),
            "crc32" => Function::crc32(vals.remove(0)),
            "exp" => Function::exp(vals.remove(0)),
            "int" => Function::int(vals.remove(0)),
            "len" => Function::len(vals.remove(0)),
            "log" => Function::log(vals.remove(0)),
            "sgn" => Function::sgn(vals.remove(0)),
            "sin" => Function::sin(vals.remove(0)),
            "sqrt" => Function::sqrt(vals.remove(0)),
            "str" => Function::str(vals.remove(0)),
            "tan" => Function::tan(vals.remove(0)),
            "val" => Function::val(vals.remove(0)),
            _ => Err(error!(SyntaxError; "UNDEF'D FUNCTION")),
        }
    }

    fn peek(&mut self, addr: &Val) -> Result<Val> {
        let addr = checked_address(addr)?;
        Ok(Val::Integer(self.screen.memory().read(addr) as i64))
    }

    fn peekw(&mut self, addr: &Val) -> Result<Val> {
        let addr = checked_address(addr)?;
        if addr & 1 != 0 {
            return Err(error!(IllegalQuantity));
        }
        Ok(Val::Integer(self.screen.memory().read_word(addr) as i64))
    }

    fn rndi(&mut self, lo: &Val, hi: &Val) -> Result<Val> {
        let lo = lo.to_i64()?;
        let hi = hi.to_i64()?;
        if lo >= hi {
            return Err(error!(IllegalQuantity));
        }
        Ok(Val::Integer(self.rng.gen_range(lo..hi)))
    }

    fn add(&mut self, a: &Expression, b: &Expression) -> Result<Val> {
        let a = self.value(a)?;
        let b = self.value(b)?;
        match (&a, &b) {
            (Val::String(x), Val::String(y)) => {
                let mut s = x.clone();
                s.push_str(y);
                Ok(Val::String(s))
            }
            (Val::Integer(x), Val::Integer(y)) => Ok(Val::Integer(x.wrapping_add(*y))),
            _ => Ok(Val::Float(a.to_f64()? + b.to_f64()?)),
        }
    }

    fn arithmetic(
        &mut self,
        a: &Expression,
        b: &Expression,
        int_op: fn(i64, i64) -> i64,
        float_op: fn(f64, f64) -> f64,
    ) -> Result<Val> {
        let a = self.value(a)?;
        let b = self.value(b)?;
        match (&a, &b) {
            (Val::Integer(x), Val::Integer(y)) => Ok(Val::Integer(int_op(*x, *y))),
            _ => Ok(Val::Float(float_op(a.to_f64()?, b.to_f64()?))),
        }
    }

    // Division always produces a float, like the original dialect.
    fn divide(&mut self, a: &Expression, b: &Expression) -> Result<Val> {
        let a = self.value(a)?.to_f64()?;
        let b = self.value(b)?.to_f64()?;
        if b == 0.0 {
            return Err(error!(IllegalQuantity; "DIVISION BY ZERO"));
        }
        Ok(Val::Float(a / b))
    }

    fn modulus(&mut self, a: &Expression, b: &Expression) -> Result<Val> {
        let a = self.value(a)?;
        let b = self.value(b)?;
        match (&a, &b) {
            (Val::Integer(x), Val::Integer(y)) => {
                if *y == 0 {
                    return Err(error!(IllegalQuantity; "DIVISION BY ZERO"));
                }
                Ok(Val::Integer(x.rem_euclid(*y)))
            }
            _ => {
                let x = a.to_f64()?;
                let y = b.to_f64()?;
                if y == 0.0 {
                    return Err(error!(IllegalQuantity; "DIVISION BY ZERO"));
                }
                Ok(Val::Float(x.rem_euclid(y)))
            }
        }
    }

    fn power(&mut self, a: &Expression, b: &Expression) -> Result<Val> {
        let a = self.value(a)?;
        let b = self.value(b)?;
        if let (Val::Integer(x), Val::Integer(y)) = (&a, &b) {
            if (0..=63).contains(y) {
                if let Some(n) = x.checked_pow(*y as u32) {
                    return Ok(Val::Integer(n));
                }
            }
        }
        Ok(Val::Float(a.to_f64()?.powf(b.to_f64()?)))
    }

    fn compare(
        &mut self,
        a: &Expression,
        b: &Expression,
        test: fn(std::cmp::Ordering) -> bool,
    ) -> Result<Val> {
        let a = self.value(a)?;
        let b = self.value(b)?;
        let ordering = match (&a, &b) {
            (Val::String(x), Val::String(y)) => x.cmp(y),
            (x, y) if x.is_number() && y.is_number() => {
                let x = x.to_f64()?;
                let y = y.to_f64()?;
                match x.partial_cmp(&y) {
                    Some(o) => o,
                    None => return Err(error!(TypeMismatch)),
                }
            }
            _ => return Err(error!(TypeMismatch)),
        };
        Ok(Val::Integer(if test(ordering) { 1 } else { 0 }))
    }

    fn bitwise(&mut self, a: &Expression, b: &Expression, op: fn(i64, i64) -> i64) -> Result<Val> {
        let a = self.value(a)?.to_i64()?;
        let b = self.value(b)?.to_i64()?;
        Ok(Val::Integer(op(a, b)))
    }
}

/// Addresses are range-checked before they touch the bus.
pub fn checked_address(val: &Val) -> Result<u16> {
    let addr = val.to_i64()?;
    if !(0..=0xffff).contains(&addr) {
        return Err(error!(IllegalQuantity));
    }
    Ok(addr as u16)
}

/// Byte values for POKE.
pub fn checked_byte(val: &Val) -> Result<u8> {
    let n = val.to_i64()?;
    if !(0..=0xff).contains(&n) {
        return Err(error!(IllegalQuantity));
    }
    Ok(n as u8)
}

/// Word values for POKEW.
pub fn checked_word(val: &Val) -> Result<u16> {
    let n = val.to_i64()?;
    if !(0..=0xffff).contains(&n) {
        return Err(error!(IllegalQuantity));
    }
    Ok(n as u16)
}
