//! Token types for the lexer

use logos::Logos;

/// The kind of token produced by the lexer
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n]+")]
pub enum TokenKind {
    // ========== Keywords ==========
    #[token("VAR")]
    Var,
    #[token("FUNCAO")]
    Funcao,
    #[token("RETORNA")]
    Retorna,
    #[token("ESCREVEAI")]
    EscreveAi,
    /// Reserved: `for` loops are not part of the grammar
    #[token("FAZAVOLTA")]
    FazAVolta,
    #[token("VOLTAINFINITA")]
    VoltaInfinita,
    #[token("INTEIRO")]
    Inteiro,
    #[token("QUEBRADO")]
    Quebrado,
    #[token("SE")]
    Se,
    #[token("SENAO")]
    Senao,
    #[token("ISSOAI")]
    IssoAi,
    #[token("MENTIRA")]
    Mentira,
    #[token("NULO")]
    Nulo,
    #[token("ESCOLHEAI")]
    EscolheAi,
    #[token("CASO")]
    Caso,
    #[token("PADRAO")]
    Padrao,
    #[token("LEIA")]
    Leia,
    #[token("PAREI")]
    Parei,

    // ========== Literals ==========
    #[regex(r"[0-9]+")]
    Int,

    #[regex(r"[0-9]+\.[0-9]+")]
    Float,

    /// String literal, quotes included; no escapes, may span lines
    #[regex(r#""[^"]*""#)]
    String,

    #[regex(r"[\p{L}][\p{L}\p{N}_]*")]
    Ident,

    // ========== Operators ==========
    #[token("+")]
    Plus,
    #[token("++")]
    PlusPlus,
    #[token("-")]
    Minus,
    #[token("--")]
    MinusMinus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!")]
    Not,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    /// Lexed but not part of the expression grammar
    #[token("&&")]
    And,
    /// Lexed but not part of the expression grammar
    #[token("||")]
    Or,

    // ========== Delimiters ==========
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,

    // ========== Comments ==========
    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,

    /// End of file (added by lexer, not matched by logos)
    Eof,
}

impl TokenKind {
    /// Returns true if this token is a keyword
    #[must_use]
    pub const fn is_keyword(&self) -> bool {
        matches!(
            self,
            Self::Var
                | Self::Funcao
                | Self::Retorna
                | Self::EscreveAi
                | Self::FazAVolta
                | Self::VoltaInfinita
                | Self::Inteiro
                | Self::Quebrado
                | Self::Se
                | Self::Senao
                | Self::IssoAi
                | Self::Mentira
                | Self::Nulo
                | Self::EscolheAi
                | Self::Caso
                | Self::Padrao
                | Self::Leia
                | Self::Parei
        )
    }

    /// Returns true if this token should be dropped before parsing
    #[must_use]
    pub const fn is_trivia(&self) -> bool {
        matches!(self, Self::LineComment | Self::BlockComment)
    }

    /// Returns true if a statement can begin with this token
    #[must_use]
    pub const fn starts_statement(&self) -> bool {
        matches!(
            self,
            Self::Var
                | Self::Inteiro
                | Self::Quebrado
                | Self::Funcao
                | Self::Retorna
                | Self::EscreveAi
                | Self::FazAVolta
                | Self::VoltaInfinita
                | Self::Se
                | Self::EscolheAi
                | Self::Leia
                | Self::Parei
        )
    }
}

impl std::fmt::Display for TokenKind {
    #[allow(clippy::match_same_arms)]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Var => write!(f, "VAR"),
            Self::Funcao => write!(f, "FUNCAO"),
            Self::Retorna => write!(f, "RETORNA"),
            Self::EscreveAi => write!(f, "ESCREVEAI"),
            Self::FazAVolta => write!(f, "FAZAVOLTA"),
            Self::VoltaInfinita => write!(f, "VOLTAINFINITA"),
            Self::Inteiro => write!(f, "INTEIRO"),
            Self::Quebrado => write!(f, "QUEBRADO"),
            Self::Se => write!(f, "SE"),
            Self::Senao => write!(f, "SENAO"),
            Self::IssoAi => write!(f, "ISSOAI"),
            Self::Mentira => write!(f, "MENTIRA"),
            Self::Nulo => write!(f, "NULO"),
            Self::EscolheAi => write!(f, "ESCOLHEAI"),
            Self::Caso => write!(f, "CASO"),
            Self::Padrao => write!(f, "PADRAO"),
            Self::Leia => write!(f, "LEIA"),
            Self::Parei => write!(f, "PAREI"),
            Self::Int => write!(f, "inteiro"),
            Self::Float => write!(f, "quebrado"),
            Self::String => write!(f, "texto"),
            Self::Ident => write!(f, "identificador"),
            Self::Plus => write!(f, "+"),
            Self::PlusPlus => write!(f, "++"),
            Self::Minus => write!(f, "-"),
            Self::MinusMinus => write!(f, "--"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Percent => write!(f, "%"),
            Self::Eq => write!(f, "="),
            Self::EqEq => write!(f, "=="),
            Self::Not => write!(f, "!"),
            Self::NotEq => write!(f, "!="),
            Self::Lt => write!(f, "<"),
            Self::LtEq => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::GtEq => write!(f, ">="),
            Self::And => write!(f, "&&"),
            Self::Or => write!(f, "||"),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::LBrace => write!(f, "{{"),
            Self::RBrace => write!(f, "}}"),
            Self::LBracket => write!(f, "["),
            Self::RBracket => write!(f, "]"),
            Self::Comma => write!(f, ","),
            Self::Colon => write!(f, ":"),
            Self::Semicolon => write!(f, ";"),
            Self::LineComment => write!(f, "// comentário"),
            Self::BlockComment => write!(f, "/* comentário */"),
            Self::Eof => write!(f, "fim do arquivo"),
        }
    }
}
