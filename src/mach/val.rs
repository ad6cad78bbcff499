use crate::error;
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

/// A runtime value: every expression evaluates to exactly one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Val {
    Integer(i64),
    Float(f64),
    String(String),
}

impl Val {
    pub fn is_truthy(&self) -> bool {
        match self {
            Val::Integer(n) => *n != 0,
            Val::Float(n) => *n != 0.0,
            Val::String(s) => !s.is_empty(),
        }
    }

    /// Numeric coercion; floats truncate the way the original's
    /// `int()` conversions did.
    pub fn to_i64(&self) -> Result<i64> {
        match self {
            Val::Integer(n) => Ok(*n),
            Val::Float(n) => Ok(*n as i64),
            Val::String(_) => Err(error!(TypeMismatch)),
        }
    }

    pub fn to_f64(&self) -> Result<f64> {
        match self {
            Val::Integer(n) => Ok(*n as f64),
            Val::Float(n) => Ok(*n),
            Val::String(_) => Err(error!(TypeMismatch)),
        }
    }

    pub fn as_string(&self) -> Result<&str> {
        match self {
            Val::String(s) => Ok(s),
            _ => Err(error!(TypeMismatch)),
        }
    }

    pub fn is_number(&self) -> bool {
        !matches!(self, Val::String(_))
    }

    /// PRINT formatting: negative numbers get a single trailing space,
    /// non-negatives a leading and a trailing one. Strings print as-is.
    pub fn to_print(&self) -> String {
        match self {
            Val::Integer(n) if *n < 0 => format!("{} ", n),
            Val::Integer(n) => format!(" {} ", n),
            Val::Float(n) if *n < 0.0 => format!("{} ", n),
            Val::Float(n) => format!(" {} ", n),
            Val::String(s) => s.clone(),
        }
    }
}

impl std::fmt::Display for Val {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Val::Integer(n) => write!(f, "{}", n),
            Val::Float(n) => write!(f, "{}", n),
            Val::String(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_formatting() {
        assert_eq!(Val::Integer(3).to_print(), " 3 ");
        assert_eq!(Val::Integer(-5).to_print(), "-5 ");
        assert_eq!(Val::Float(2.5).to_print(), " 2.5 ");
        assert_eq!(Val::String("hi".to_string()).to_print(), "hi");
    }

    #[test]
    fn test_truncating_coercion() {
        assert_eq!(Val::Float(3.9).to_i64().unwrap(), 3);
        assert!(Val::String("x".to_string()).to_i64().is_err());
    }
}
