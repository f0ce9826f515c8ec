use super::*;

fn token_types(source: &str) -> Vec<TokenType> {
    Lexer::new(source).tokenize().unwrap().iter().map(Token::token_type).collect()
}

#[test]
fn assignment_tokens() {
    let tokens = Lexer::new("kas x = 5").tokenize().unwrap();

    assert_eq!(tokens.iter().map(Token::token_type).collect::<Vec<_>>(),
               vec![TokenType::Kas, TokenType::Identifier, TokenType::Assign, TokenType::Number, TokenType::Eof]);
    assert_eq!(tokens[1].source(), "x");
    assert_eq!(tokens[3].source(), "5");
    assert_eq!(*tokens[3].start(), TokenPos::new(1, 9));
}

#[test]
fn keywords_respect_word_boundaries() {
    let tokens = Lexer::new("say sayer kas_1 iffy if").tokenize().unwrap();

    assert_eq!(tokens.iter().map(Token::token_type).collect::<Vec<_>>(),
               vec![TokenType::Say, TokenType::Identifier, TokenType::Identifier, TokenType::Identifier,
                    TokenType::If, TokenType::Eof]);
    assert_eq!(tokens[1].source(), "sayer");
}

#[test]
fn range_keywords_are_reserved() {
    assert_eq!(token_types("for kas i = 1 to 3 step 1"),
               vec![TokenType::For, TokenType::Kas, TokenType::Identifier, TokenType::Assign, TokenType::Number,
                    TokenType::To, TokenType::Number, TokenType::Step, TokenType::Number, TokenType::Eof]);
}

#[test]
fn numbers() {
    let tokens = Lexer::new("42 3.14 7.").tokenize();
    // "7." leaves a dangling '.'
    assert_eq!(tokens, Err(LexerError::UnexpectedCharacter(TokenPos::new(1, 10), '.')));

    let tokens = Lexer::new("42 3.14").tokenize().unwrap();
    assert_eq!(tokens[0].source(), "42");
    assert_eq!(tokens[1].source(), "3.14");
}

#[test]
fn strings_keep_quotes_and_escapes() {
    let tokens = Lexer::new(r#""a \"b\"" 'it\'s'"#).tokenize().unwrap();

    assert_eq!(tokens[0].token_type(), TokenType::String);
    assert_eq!(tokens[0].source(), r#""a \"b\"""#);
    assert_eq!(tokens[1].source(), r"'it\'s'");
}

#[test]
fn unterminated_string() {
    assert_eq!(Lexer::new("say \"oops").tokenize(),
               Err(LexerError::UnterminatedString { pos: TokenPos::new(1, 5) }));
}

#[test]
fn two_character_operators_first() {
    assert_eq!(token_types("== != <= >= = < >"),
               vec![TokenType::Equal, TokenType::NotEqual, TokenType::LessEqual, TokenType::GreaterEqual,
                    TokenType::Assign, TokenType::Less, TokenType::Greater, TokenType::Eof]);
}

#[test]
fn comments_and_newlines() {
    let tokens = Lexer::new("# header\nsay 1 # trailing\n\tsay 2").tokenize().unwrap();

    assert_eq!(tokens.iter().map(Token::token_type).collect::<Vec<_>>(),
               vec![TokenType::Newline, TokenType::Say, TokenType::Number, TokenType::Newline,
                    TokenType::Say, TokenType::Number, TokenType::Eof]);
    assert_eq!(*tokens[4].start(), TokenPos::new(3, 2));
    assert_eq!(*tokens[6].start(), TokenPos::new(3, 7));
}

#[test]
fn unknown_character() {
    let error = Lexer::new("kas x = 1\nkas y = @").tokenize().unwrap_err();

    assert_eq!(error, LexerError::UnexpectedCharacter(TokenPos::new(2, 9), '@'));
    assert_eq!(error.get_pos(), TokenPos::new(2, 9));
    assert_eq!(error.to_string(), "[line 2 column 9] Unknown character '@'");
}

#[test]
fn lone_bang_is_rejected() {
    assert!(matches!(Lexer::new("!x").tokenize(), Err(LexerError::UnexpectedCharacter(_, '!'))));
}

#[test]
fn columns_count_characters() {
    let tokens = Lexer::new("say \"привет\" + x").tokenize().unwrap();

    assert_eq!(tokens[1].source(), "\"привет\"");
    assert_eq!(*tokens[2].start(), TokenPos::new(1, 14));
}

#[test]
fn empty_source() {
    let tokens = Lexer::new("").tokenize().unwrap();

    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].token_type(), TokenType::Eof);
    assert_eq!(*tokens[0].start(), TokenPos::begin());
}
