use super::LineNumber;

/// A recoverable interpreter error.
///
/// Errors surface at the clause boundary: the offending line aborts, the
/// machine reports the message on its own screen, and direct mode keeps
/// working. When a program is running the line number is attached before
/// reporting.
pub struct Error {
    code: ErrorCode,
    line_number: LineNumber,
    message: String,
}

#[doc(hidden)]
#[macro_export]
macro_rules! error {
    ($err:ident) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
    };
    ($err:ident, $line:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).in_line_number($line)
    };
    ($err:ident; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err).message($msg)
    };
    ($err:ident, $line:expr; $msg:expr) => {
        $crate::lang::Error::new($crate::lang::ErrorCode::$err)
            .in_line_number($line)
            .message($msg)
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    SyntaxError,
    IllegalQuantity,
    UndefinedStatement,
    IllegalDirect,
    NextWithoutFor,
    ForNotAlone,
    OutOfData,
    TypeMismatch,
    FileError,
}

impl Error {
    pub fn new(code: ErrorCode) -> Error {
        Error {
            code,
            line_number: None,
            message: String::new(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn is_direct(&self) -> bool {
        self.line_number.is_none()
    }

    pub fn line_number(&self) -> LineNumber {
        self.line_number
    }

    pub fn in_line_number(&self, line: LineNumber) -> Error {
        debug_assert!(self.line_number.is_none());
        Error {
            code: self.code,
            line_number: line,
            message: self.message.clone(),
        }
    }

    pub fn message(&self, message: &str) -> Error {
        Error {
            code: self.code,
            line_number: self.line_number,
            message: message.to_string(),
        }
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Error {{ {} }}", self.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let code_str = match self.code {
            ErrorCode::SyntaxError => "SYNTAX",
            ErrorCode::IllegalQuantity => "ILLEGAL QUANTITY",
            ErrorCode::UndefinedStatement => "UNDEF'D STATEMENT",
            ErrorCode::IllegalDirect => "ILLEGAL DIRECT",
            ErrorCode::NextWithoutFor => "NEXT WITHOUT FOR",
            ErrorCode::ForNotAlone => "FOR NOT ALONE ON LINE",
            ErrorCode::OutOfData => "OUT OF DATA",
            ErrorCode::TypeMismatch => "TYPE MISMATCH",
            ErrorCode::FileError => "FILE",
        };
        // A custom message replaces the stock text, never both.
        let text = if self.message.is_empty() {
            code_str
        } else {
            &self.message
        };
        match self.line_number {
            Some(number) => write!(f, "{} ERROR IN {}", text, number),
            None => write!(f, "{} ERROR", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let e = Error::new(ErrorCode::SyntaxError);
        assert_eq!(e.to_string(), "SYNTAX ERROR");
        let e = e.in_line_number(Some(30));
        assert_eq!(e.to_string(), "SYNTAX ERROR IN 30");
        let e = Error::new(ErrorCode::FileError).message("MISSING FILE NAME");
        assert_eq!(e.to_string(), "MISSING FILE NAME ERROR");
    }
}
