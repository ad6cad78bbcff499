use super::Val;
use crate::error;
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

/// ## Built-in functions
///
/// The closed table the expression evaluator dispatches on. The pure
/// ones live here; `peek`, `peekw`, `rnd`, `rndi`, and `ti` need the
/// machine and are handled by the evaluator itself.
pub struct Function;

impl Function {
    pub fn arity(name: &str) -> Option<std::ops::RangeInclusive<usize>> {
        match name {
            "rnd" => Some(0..=0),
            "abs" | "asc" | "atn" | "chr" | "cos" | "crc32" | "exp" | "int" | "len" | "log"
            | "peek" | "peekw" | "sgn" | "sin" | "sqrt" | "str" | "tan" | "val" => Some(1..=1),
            "rndi" => Some(2..=2),
            _ => None,
        }
    }

    pub fn is_builtin(name: &str) -> bool {
        Function::arity(name).is_some() || matches!(name, "pi" | "e" | "ti" | "time")
    }

    fn math(val: Val, f: fn(f64) -> f64) -> Result<Val> {
        Ok(Val::Float(f(val.to_f64()?)))
    }

    pub fn abs(val: Val) -> Result<Val> {
        match val {
            Val::Integer(n) => Ok(Val::Integer(n.abs())),
            Val::Float(n) => Ok(Val::Float(n.abs())),
            Val::String(_) => Err(error!(TypeMismatch)),
        }
    }

    pub fn int(val: Val) -> Result<Val> {
        Ok(Val::Integer(val.to_i64()?))
    }

    pub fn sgn(val: Val) -> Result<Val> {
        let n = val.to_f64()?;
        Ok(Val::Integer(if n > 0.0 {
            1
        } else if n < 0.0 {
            -1
        } else {
            0
        }))
    }

    pub fn sqrt(val: Val) -> Result<Val> {
        let n = val.to_f64()?;
        if n < 0.0 {
            return Err(error!(IllegalQuantity));
        }
        Ok(Val::Float(n.sqrt()))
    }

    pub fn log(val: Val) -> Result<Val> {
        let n = val.to_f64()?;
        if n <= 0.0 {
            return Err(error!(IllegalQuantity));
        }
        Ok(Val::Float(n.ln()))
    }

    pub fn exp(val: Val) -> Result<Val> {
        Function::math(val, f64::exp)
    }

    pub fn sin(val: Val) -> Result<Val> {
        Function::math(val, f64::sin)
    }

    pub fn cos(val: Val) -> Result<Val> {
        Function::math(val, f64::cos)
    }

    pub fn tan(val: Val) -> Result<Val> {
        Function::math(val, f64::tan)
    }

    pub fn atn(val: Val) -> Result<Val> {
        Function::math(val, f64::atan)
    }

    pub fn len(val: Val) -> Result<Val> {
        Ok(Val::Integer(val.as_string()?.chars().count() as i64))
    }

    pub fn asc(val: Val) -> Result<Val> {
        match val.as_string()?.chars().next() {
            Some(c) => Ok(Val::Integer(c as i64)),
            None => Err(error!(IllegalQuantity)),
        }
    }

    pub fn chr(val: Val) -> Result<Val> {
        let n = val.to_i64()?;
        if !(0..=255).contains(&n) {
            return Err(error!(IllegalQuantity));
        }
        Ok(Val::String((n as u8 as char).to_string()))
    }

    pub fn str(val: Val) -> Result<Val> {
        Ok(Val::String(val.to_string()))
    }

    /// VAL returns zero for text that isn't a number.
    pub fn val(val: Val) -> Result<Val> {
        let s = val.as_string()?.trim();
        if let Ok(n) = s.parse::<i64>() {
            return Ok(Val::Integer(n));
        }
        if let Ok(n) = s.parse::<f64>() {
            return Ok(Val::Float(n));
        }
        Ok(Val::Integer(0))
    }

    pub fn crc32(val: Val) -> Result<Val> {
        let checksum = crc::crc32::checksum_ieee(val.as_string()?.as_bytes());
        Ok(Val::Integer(checksum as i64))
    }

    /// Wall clock as the classic six-digit HHMMSS string.
    pub fn time() -> Val {
        Val::String(chrono::Local::now().format("%H%M%S").to_string())
    }
}
