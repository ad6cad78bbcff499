use super::{ast::*, token::*, Error, LineNumber, MAX_LINE_NUMBER};
use crate::error;

type Result<T> = std::result::Result<T, Error>;

/// Parse a lexed token stream into the statements of one line.
pub fn parse(line_number: LineNumber, tokens: &[Token]) -> Result<Vec<Statement>> {
    match Parser::parse(tokens) {
        Err(e) if e.is_direct() => Err(e.in_line_number(line_number)),
        other => other,
    }
}

struct Parser<'a> {
    token_stream: std::slice::Iter<'a, Token>,
    peeked: Option<&'a Token>,
}

impl<'a> Parser<'a> {
    fn parse(tokens: &'a [Token]) -> Result<Vec<Statement>> {
        let mut parser = Parser {
            token_stream: tokens.iter(),
            peeked: None,
        };
        parser.statements_to_end()
    }

    fn statements_to_end(&mut self) -> Result<Vec<Statement>> {
        let mut r: Vec<Statement> = vec![];
        loop {
            match self.peek() {
                None => return Ok(r),
                Some(Token::Word(Word::Rem)) => {
                    // comment swallows the rest of the line
                    while self.next().is_some() {}
                    return Ok(r);
                }
                Some(Token::Colon) => {
                    self.next();
                    continue;
                }
                _ => {}
            }
            r.push(self.statement()?);
        }
    }

    fn next(&mut self) -> Option<&'a Token> {
        if self.peeked.is_some() {
            return self.peeked.take();
        }
        loop {
            match self.token_stream.next()? {
                Token::Whitespace(_) => continue,
                t => return Some(t),
            }
        }
    }

    fn peek(&mut self) -> Option<&&'a Token> {
        if self.peeked.is_none() {
            self.peeked = self.next();
        }
        self.peeked.as_ref()
    }

    fn statement(&mut self) -> Result<Statement> {
        match self.peek() {
            Some(Token::Ident(_)) => Statement::r#let(self),
            Some(&&Token::Word(word)) => {
                self.next();
                Statement::for_word(self, word)
            }
            _ => Err(error!(SyntaxError; "EXPECTED STATEMENT")),
        }
    }

    fn expression(&mut self) -> Result<Expression> {
        self.binary_expression(0)
    }

    fn binary_expression(&mut self, precedence: usize) -> Result<Expression> {
        let mut lhs = self.unary_expression()?;
        loop {
            let op = match self.peek() {
                Some(&&Token::Operator(op)) => op,
                _ => break,
            };
            let op_precedence = match Expression::precedence(op) {
                Some(p) if p >= precedence => p,
                _ => break,
            };
            self.next();
            let rhs = self.binary_expression(op_precedence + 1)?;
            lhs = Expression::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    // Negation binds looser than ^ (so -2^2 is -(2^2)) and NOT looser
    // than the comparisons it usually wraps.
    fn unary_expression(&mut self) -> Result<Expression> {
        match self.peek() {
            Some(Token::Operator(Operator::Minus)) => {
                self.next();
                Ok(Expression::Negate(Box::new(self.binary_expression(6)?)))
            }
            Some(Token::Operator(Operator::Plus)) => {
                self.next();
                self.unary_expression()
            }
            Some(Token::Operator(Operator::Not)) => {
                self.next();
                Ok(Expression::Not(Box::new(self.binary_expression(3)?)))
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expression> {
        match self.next() {
            Some(Token::LParen) => {
                let expr = self.expression()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            Some(Token::Ident(name)) => match self.peek() {
                Some(&&Token::LParen) => {
                    Ok(Expression::Function(name.clone(), self.paren_list()?))
                }
                _ => Ok(Expression::Var(name.clone())),
            },
            Some(Token::Literal(lit)) => Expression::for_literal(lit),
            _ => Err(error!(SyntaxError; "EXPECTED EXPRESSION")),
        }
    }

    fn paren_list(&mut self) -> Result<Vec<Expression>> {
        self.expect(Token::LParen)?;
        if let Some(Token::RParen) = self.peek() {
            self.next();
            return Ok(vec![]);
        }
        let mut v: Vec<Expression> = vec![];
        loop {
            v.push(self.expression()?);
            match self.next() {
                Some(Token::RParen) => return Ok(v),
                Some(Token::Comma) => continue,
                _ => return Err(error!(SyntaxError; "EXPECTED END OR SEPARATOR")),
            }
        }
    }

    fn comma_list(&mut self) -> Result<Vec<Expression>> {
        let mut v: Vec<Expression> = vec![self.expression()?];
        while let Some(Token::Comma) = self.peek() {
            self.next();
            v.push(self.expression()?);
        }
        Ok(v)
    }

    fn ident(&mut self) -> Result<String> {
        match self.next() {
            Some(Token::Ident(name)) => Ok(name.clone()),
            _ => Err(error!(SyntaxError; "EXPECTED IDENTIFIER")),
        }
    }

    fn line_number(&mut self) -> Result<u16> {
        match self.next() {
            Some(Token::Literal(Literal::Integer(s))) => match s.parse::<u16>() {
                Ok(n) if n <= MAX_LINE_NUMBER => Ok(n),
                _ => Err(error!(IllegalQuantity; "INVALID LINE NUMBER")),
            },
            _ => Err(error!(SyntaxError; "EXPECTED LINE NUMBER")),
        }
    }

    fn end_of_clause(&mut self) -> Result<()> {
        match self.peek() {
            None | Some(Token::Colon) => Ok(()),
            _ => Err(error!(SyntaxError; "UNEXPECTED TOKEN")),
        }
    }

    fn expect(&mut self, token: Token) -> Result<()> {
        if let Some(t) = self.next() {
            if *t == token {
                return Ok(());
            }
        }
        use Token::*;
        Err(error!(SyntaxError;
            match token {
                Unknown(_) | Whitespace(_) => "UNEXPECTED TOKEN",
                Literal(_) => "EXPECTED LITERAL",
                Word(_) => "EXPECTED RESERVED WORD",
                Operator(_) => "EXPECTED OPERATOR",
                Ident(_) => "EXPECTED IDENTIFIER",
                LParen => "EXPECTED LEFT PARENTHESIS",
                RParen => "EXPECTED RIGHT PARENTHESIS",
                Comma => "EXPECTED COMMA",
                Colon => "EXPECTED COLON",
                Semicolon => "EXPECTED SEMICOLON",
            }
        ))
    }
}

impl Expression {
    fn binary(op: Operator, lhs: Expression, rhs: Expression) -> Expression {
        use Operator::*;
        let lhs = Box::new(lhs);
        let rhs = Box::new(rhs);
        match op {
            Caret => Expression::Power(lhs, rhs),
            Multiply => Expression::Multiply(lhs, rhs),
            Divide => Expression::Divide(lhs, rhs),
            Modulus => Expression::Modulus(lhs, rhs),
            Plus => Expression::Add(lhs, rhs),
            Minus => Expression::Subtract(lhs, rhs),
            Equal => Expression::Equal(lhs, rhs),
            NotEqual => Expression::NotEqual(lhs, rhs),
            Less => Expression::Less(lhs, rhs),
            LessEqual => Expression::LessEqual(lhs, rhs),
            Greater => Expression::Greater(lhs, rhs),
            GreaterEqual => Expression::GreaterEqual(lhs, rhs),
            And => Expression::And(lhs, rhs),
            Or => Expression::Or(lhs, rhs),
            Xor => Expression::Xor(lhs, rhs),
            Not => unreachable!("NOT is unary"),
        }
    }

    fn precedence(op: Operator) -> Option<usize> {
        use Operator::*;
        match op {
            Or | Xor => Some(1),
            And => Some(2),
            Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual => Some(3),
            Plus | Minus => Some(4),
            Multiply | Divide | Modulus => Some(5),
            Caret => Some(6),
            Not => None,
        }
    }

    fn for_literal(lit: &Literal) -> Result<Expression> {
        match lit {
            Literal::Integer(s) => match s.parse::<i64>() {
                Ok(n) => Ok(Expression::Integer(n)),
                Err(_) => Err(error!(IllegalQuantity; "NUMBER TOO LARGE")),
            },
            Literal::Float(s) => match s.parse::<f64>() {
                Ok(n) => Ok(Expression::Float(n)),
                Err(_) => Err(error!(SyntaxError; "INVALID NUMBER")),
            },
            Literal::Hex(s) => match i64::from_str_radix(s, 16) {
                Ok(n) => Ok(Expression::Integer(n)),
                Err(_) => Err(error!(IllegalQuantity; "NUMBER TOO LARGE")),
            },
            Literal::Binary(s) => match i64::from_str_radix(s, 2) {
                Ok(n) => Ok(Expression::Integer(n)),
                Err(_) => Err(error!(IllegalQuantity; "NUMBER TOO LARGE")),
            },
            Literal::String(s) => Ok(Expression::String(s.clone())),
        }
    }
}

impl Statement {
    fn for_word(parser: &mut Parser, word: Word) -> Result<Statement> {
        use Word::*;
        match word {
            Cls => {
                parser.end_of_clause()?;
                Ok(Statement::Cls)
            }
            Color => Ok(Statement::Color(parser.comma_list()?)),
            Cursor => Ok(Statement::Cursor(parser.comma_list()?)),
            Data => Self::data(parser),
            End => {
                parser.end_of_clause()?;
                Ok(Statement::End)
            }
            For => Self::r#for(parser),
            Goto => Ok(Statement::Goto(parser.expression()?)),
            Help => {
                parser.end_of_clause()?;
                Ok(Statement::Help)
            }
            If => Self::r#if(parser),
            List => Self::list(parser),
            Load => Self::load(parser),
            New => {
                parser.end_of_clause()?;
                Ok(Statement::New)
            }
            Next => Self::next(parser),
            On => Self::on_goto(parser),
            Poke => Self::poke(parser),
            Pokew => Self::pokew(parser),
            Print => Self::print(parser),
            Read => Ok(Statement::Read(parser.ident()?)),
            Restore => {
                parser.end_of_clause()?;
                Ok(Statement::Restore)
            }
            Run => Self::run(parser),
            Save => Self::load_save_name(parser).map(Statement::Save),
            Scroll => Ok(Statement::Scroll(parser.comma_list()?)),
            Sleep => Ok(Statement::Sleep(parser.expression()?)),
            Stop => {
                parser.end_of_clause()?;
                Ok(Statement::Stop)
            }
            Sys => Ok(Statement::Sys(parser.expression()?)),
            Rem | Step | Then | To => Err(error!(SyntaxError; "EXPECTED STATEMENT")),
        }
    }

    fn r#let(parser: &mut Parser) -> Result<Statement> {
        let name = parser.ident()?;
        parser.expect(Token::Operator(Operator::Equal))?;
        Ok(Statement::Let(name, parser.expression()?))
    }

    fn print(parser: &mut Parser) -> Result<Statement> {
        match parser.peek() {
            None | Some(Token::Colon) => {
                return Ok(Statement::Print(None, PrintEnd::Newline))
            }
            _ => {}
        }
        let expr = parser.expression()?;
        match parser.peek() {
            Some(Token::Comma) | Some(Token::Semicolon) => {
                parser.next();
                parser.end_of_clause()?;
                Ok(Statement::Print(Some(expr), PrintEnd::Suppress))
            }
            _ => {
                parser.end_of_clause()?;
                Ok(Statement::Print(Some(expr), PrintEnd::Newline))
            }
        }
    }

    fn r#for(parser: &mut Parser) -> Result<Statement> {
        let name = parser.ident()?;
        parser.expect(Token::Operator(Operator::Equal))?;
        let start = parser.expression()?;
        parser.expect(Token::Word(Word::To))?;
        let stop = parser.expression()?;
        let step = match parser.peek() {
            Some(Token::Word(Word::Step)) => {
                parser.next();
                Some(parser.expression()?)
            }
            _ => None,
        };
        Ok(Statement::For(name, start, stop, step))
    }

    fn next(parser: &mut Parser) -> Result<Statement> {
        match parser.peek() {
            Some(Token::Ident(_)) => {}
            Some(Token::Comma) => return Err(error!(SyntaxError; "NEXT WITH MULTIPLE VARS")),
            _ => return Err(error!(SyntaxError; "NEXT WITHOUT VARNAME")),
        }
        let name = parser.ident()?;
        if let Some(Token::Comma) = parser.peek() {
            return Err(error!(SyntaxError; "NEXT WITH MULTIPLE VARS"));
        }
        Ok(Statement::Next(name))
    }

    fn r#if(parser: &mut Parser) -> Result<Statement> {
        let condition = parser.expression()?;
        match parser.next() {
            Some(Token::Word(Word::Then)) => {
                let then = parser.statements_to_end()?;
                if then.is_empty() {
                    return Err(error!(SyntaxError; "EXPECTED STATEMENT"));
                }
                Ok(Statement::If(condition, then))
            }
            Some(Token::Word(Word::Goto)) => {
                let target = parser.expression()?;
                Ok(Statement::If(condition, vec![Statement::Goto(target)]))
            }
            _ => Err(error!(SyntaxError; "EXPECTED THEN OR GOTO")),
        }
    }

    fn on_goto(parser: &mut Parser) -> Result<Statement> {
        let index = parser.expression()?;
        parser.expect(Token::Word(Word::Goto))?;
        let mut targets = vec![parser.line_number()?];
        while let Some(Token::Comma) = parser.peek() {
            parser.next();
            targets.push(parser.line_number()?);
        }
        Ok(Statement::OnGoto(index, targets))
    }

    fn poke(parser: &mut Parser) -> Result<Statement> {
        let addr = parser.expression()?;
        parser.expect(Token::Comma)?;
        Ok(Statement::Poke(addr, parser.expression()?))
    }

    fn pokew(parser: &mut Parser) -> Result<Statement> {
        let addr = parser.expression()?;
        parser.expect(Token::Comma)?;
        Ok(Statement::Pokew(addr, parser.expression()?))
    }

    fn data(parser: &mut Parser) -> Result<Statement> {
        // the lexer hands over the raw item text in one token
        match parser.next() {
            Some(Token::Unknown(items)) => Ok(Statement::Data(items.clone())),
            None => Ok(Statement::Data(String::new())),
            _ => Err(error!(SyntaxError)),
        }
    }

    fn run(parser: &mut Parser) -> Result<Statement> {
        match parser.peek() {
            None | Some(Token::Colon) => Ok(Statement::Run(None)),
            _ => Ok(Statement::Run(Some(parser.line_number()?))),
        }
    }

    fn list(parser: &mut Parser) -> Result<Statement> {
        let mut range = ListRange::default();
        if let Some(Token::Literal(Literal::Integer(_))) = parser.peek() {
            range.from = Some(parser.line_number()?);
        }
        if let Some(Token::Operator(Operator::Minus)) = parser.peek() {
            parser.next();
            range.dashed = true;
            if let Some(Token::Literal(Literal::Integer(_))) = parser.peek() {
                range.to = Some(parser.line_number()?);
            }
        }
        parser.end_of_clause()?;
        Ok(Statement::List(range))
    }

    // LOAD and SAVE tolerate a trailing device number: load "game",8
    fn load(parser: &mut Parser) -> Result<Statement> {
        Self::load_save_name(parser).map(Statement::Load)
    }

    fn load_save_name(parser: &mut Parser) -> Result<Expression> {
        let name = parser.expression()?;
        while let Some(Token::Comma) = parser.peek() {
            parser.next();
            parser.expression()?;
        }
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::super::lex::lex;
    use super::*;

    fn parse_str(s: &str) -> Statement {
        let (line_number, tokens) = lex(s);
        let mut v = parse(line_number, &tokens).expect("parse failed");
        assert_eq!(v.len(), 1);
        v.pop().unwrap()
    }

    #[test]
    fn test_let() {
        assert_eq!(
            parse_str("a=12"),
            Statement::Let("a".to_string(), Expression::Integer(12))
        );
    }

    #[test]
    fn test_precedence_and_paren() {
        assert_eq!(
            parse_str("x=(2-3)*4"),
            Statement::Let(
                "x".to_string(),
                Expression::Multiply(
                    Box::new(Expression::Subtract(
                        Box::new(Expression::Integer(2)),
                        Box::new(Expression::Integer(3)),
                    )),
                    Box::new(Expression::Integer(4)),
                )
            )
        );
    }

    #[test]
    fn test_hex_and_binary_literals() {
        assert_eq!(
            parse_str("poke $d020,%1011"),
            Statement::Poke(Expression::Integer(0xd020), Expression::Integer(11))
        );
    }
}
