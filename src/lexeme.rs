/// All lexemes in the spec language.
#[derive(Clone, Debug, PartialEq)]
pub enum Lexeme {
    // Keywords
    Spec,
    Run,
    Requires,
    Ensures,
    True,
    False,
    Null,

    // Symbols
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    Comma,     // ,
    Colon,     // :
    Semicolon, // ;
    Dot,       // .
    Prime,     // ' (post-state marker)
    Bang,      // !
    EqEq,      // ==
    BangEq,    // !=
    Lt,        // <
    Le,        // <=
    Gt,        // >
    Ge,        // >=
    Plus,      // +
    Minus,     // -
    Star,      // *
    Slash,     // /
    AmpAmp,    // &&
    PipePipe,  // ||

    // Literals
    Integer(i64),
    Str(String),
    Ident(String),

    // End of file
    Eof,
}

impl Lexeme {
    /// Try to match an identifier string to a keyword lexeme.
    pub fn from_keyword(s: &str) -> Option<Lexeme> {
        match s {
            "spec" => Some(Lexeme::Spec),
            "run" => Some(Lexeme::Run),
            "requires" => Some(Lexeme::Requires),
            "ensures" => Some(Lexeme::Ensures),
            "true" => Some(Lexeme::True),
            "false" => Some(Lexeme::False),
            "null" => Some(Lexeme::Null),
            _ => None,
        }
    }

    /// Human-readable name for error messages.
    pub fn describe(&self) -> String {
        match self {
            Lexeme::Ident(name) => format!("identifier '{}'", name),
            Lexeme::Integer(v) => format!("integer '{}'", v),
            Lexeme::Str(_) => "string literal".to_string(),
            Lexeme::Eof => "end of file".to_string(),
            other => format!("{:?}", other),
        }
    }
}
