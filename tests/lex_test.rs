use retro64::lang::token::{Literal, Operator, Token, Word};
use retro64::lang::lex;

fn tokens(s: &str) -> Vec<Token> {
    let (_, tokens) = lex(s);
    tokens
        .into_iter()
        .filter(|t| !matches!(t, Token::Whitespace(_)))
        .collect()
}

#[test]
fn test_line_number_split() {
    let (number, _) = lex("10 print 1");
    assert_eq!(number, Some(10));
    let (number, _) = lex("print 1");
    assert_eq!(number, None);
    let (number, _) = lex("  20  goto 10");
    assert_eq!(number, Some(20));
}

#[test]
fn test_oversized_line_number_is_text() {
    let (number, _) = lex("99999 print");
    assert_eq!(number, None);
}

#[test]
fn test_keywords_and_idents() {
    assert_eq!(
        tokens("goto 10"),
        vec![
            Token::Word(Word::Goto),
            Token::Literal(Literal::Integer("10".to_string()))
        ]
    );
    assert_eq!(
        tokens("count"),
        vec![Token::Ident("count".to_string())]
    );
}

#[test]
fn test_question_mark_is_print() {
    assert_eq!(tokens("?")[0], Token::Word(Word::Print));
}

#[test]
fn test_comparison_operators_collapse() {
    assert_eq!(
        tokens("a <= b <> c"),
        vec![
            Token::Ident("a".to_string()),
            Token::Operator(Operator::LessEqual),
            Token::Ident("b".to_string()),
            Token::Operator(Operator::NotEqual),
            Token::Ident("c".to_string()),
        ]
    );
    assert_eq!(tokens("==")[0], Token::Operator(Operator::Equal));
    assert_eq!(tokens("!=")[0], Token::Operator(Operator::NotEqual));
}

#[test]
fn test_number_literals() {
    assert_eq!(
        tokens("12 2.5 1e3"),
        vec![
            Token::Literal(Literal::Integer("12".to_string())),
            Token::Literal(Literal::Float("2.5".to_string())),
            Token::Literal(Literal::Float("1E3".to_string())),
        ]
    );
}

#[test]
fn test_hex_and_binary_literals() {
    assert_eq!(
        tokens("$d020")[0],
        Token::Literal(Literal::Hex("D020".to_string()))
    );
    assert_eq!(
        tokens("%1011")[0],
        Token::Literal(Literal::Binary("1011".to_string()))
    );
}

#[test]
fn test_percent_after_value_is_modulus() {
    assert_eq!(
        tokens("a % 10"),
        vec![
            Token::Ident("a".to_string()),
            Token::Operator(Operator::Modulus),
            Token::Literal(Literal::Integer("10".to_string())),
        ]
    );
}

#[test]
fn test_string_literal_swallows_to_quote() {
    assert_eq!(
        tokens("\"hi there\""),
        vec![Token::Literal(Literal::String("hi there".to_string()))]
    );
    // unterminated strings close at end of line
    assert_eq!(
        tokens("\"open"),
        vec![Token::Literal(Literal::String("open".to_string()))]
    );
}

#[test]
fn test_rem_swallows_rest() {
    let t = tokens("rem anything: goes 10");
    assert_eq!(t[0], Token::Word(Word::Rem));
    assert_eq!(t[1], Token::Unknown("anything: goes 10".to_string()));
}

#[test]
fn test_data_keeps_raw_items() {
    let t = tokens("data 1, \"two\", 3");
    assert_eq!(t[0], Token::Word(Word::Data));
    assert_eq!(t[1], Token::Unknown("1, \"two\", 3".to_string()));
}

#[test]
fn test_crunched_input() {
    assert_eq!(
        tokens("fori=1to3"),
        vec![
            Token::Word(Word::For),
            Token::Ident("i".to_string()),
            Token::Operator(Operator::Equal),
            Token::Literal(Literal::Integer("1".to_string())),
            Token::Word(Word::To),
            Token::Literal(Literal::Integer("3".to_string())),
        ]
    );
}
