//! Token kinds and tokens produced by the Apex lexer.

use std::fmt;

/// Kind of a lexed token.
///
/// Discriminants stay below 128 so kinds fit the parser's bitset
/// (`TokenSet`).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    Whitespace,
    Comment,

    Identifier,
    IntegerLiteral,
    LongLiteral,
    NumberLiteral,
    StringLiteral,
    DateLiteral,

    // Keywords
    Abstract,
    After,
    Before,
    Break,
    Catch,
    Class,
    Continue,
    Delete,
    Do,
    Else,
    Enum,
    Extends,
    False,
    Final,
    Finally,
    For,
    Get,
    Global,
    If,
    Implements,
    Inherited,
    Insert,
    Instanceof,
    Interface,
    List,
    Map,
    Merge,
    New,
    Null,
    On,
    Override,
    Private,
    Protected,
    Public,
    Return,
    Set,
    Sharing,
    Static,
    Super,
    Switch,
    SystemRunAs,
    Testmethod,
    This,
    Throw,
    Transient,
    Trigger,
    True,
    Try,
    Undelete,
    Update,
    Upsert,
    Virtual,
    Void,
    Webservice,
    When,
    While,
    With,
    Without,

    // Separators and operators
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBrack,
    RBrack,
    Semi,
    Comma,
    Dot,
    At,
    Assign,
    Gt,
    Lt,
    Bang,
    Tilde,
    Question,
    QuestionDot,
    Coalesce,
    Colon,
    Eq,
    TripleEq,
    Le,
    Ge,
    Ne,
    LessGreater,
    TripleNe,
    AndAnd,
    OrOr,
    Inc,
    Dec,
    Add,
    Sub,
    Mul,
    Div,
    BitAnd,
    BitOr,
    Caret,
    Mod,
    MapsTo,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    LShiftAssign,
    RShiftAssign,
    URShiftAssign,
}

impl TokenKind {
    /// Bit index used by `TokenSet`.
    pub const fn discriminant_index(self) -> u32 {
        self as u8 as u32
    }

    /// Keyword for a lower-case spelling.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        use TokenKind::*;
        let kind = match word {
            "abstract" => Abstract,
            "after" => After,
            "before" => Before,
            "break" => Break,
            "catch" => Catch,
            "class" => Class,
            "continue" => Continue,
            "delete" => Delete,
            "do" => Do,
            "else" => Else,
            "enum" => Enum,
            "extends" => Extends,
            "false" => False,
            "final" => Final,
            "finally" => Finally,
            "for" => For,
            "get" => Get,
            "global" => Global,
            "if" => If,
            "implements" => Implements,
            "inherited" => Inherited,
            "insert" => Insert,
            "instanceof" => Instanceof,
            "interface" => Interface,
            "list" => List,
            "map" => Map,
            "merge" => Merge,
            "new" => New,
            "null" => Null,
            "on" => On,
            "override" => Override,
            "private" => Private,
            "protected" => Protected,
            "public" => Public,
            "return" => Return,
            "set" => Set,
            "sharing" => Sharing,
            "static" => Static,
            "super" => Super,
            "switch" => Switch,
            "testmethod" => Testmethod,
            "this" => This,
            "throw" => Throw,
            "transient" => Transient,
            "trigger" => Trigger,
            "true" => True,
            "try" => Try,
            "undelete" => Undelete,
            "update" => Update,
            "upsert" => Upsert,
            "virtual" => Virtual,
            "void" => Void,
            "webservice" => Webservice,
            "when" => When,
            "while" => While,
            "with" => With,
            "without" => Without,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_keyword(self) -> bool {
        (self as u8) >= (TokenKind::Abstract as u8) && (self as u8) <= (TokenKind::Without as u8)
    }

    /// Keywords that may also be used as identifiers.
    pub fn is_soft_keyword(self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            After
                | Before
                | Get
                | Inherited
                | Instanceof
                | Set
                | Sharing
                | Switch
                | Transient
                | Trigger
                | When
                | With
                | Without
        )
    }

    /// Name used in "expecting ..." messages.
    pub fn display(self) -> &'static str {
        use TokenKind::*;
        match self {
            Eof => "<EOF>",
            Whitespace => "WS",
            Comment => "COMMENT",
            Identifier => "Identifier",
            IntegerLiteral => "IntegerLiteral",
            LongLiteral => "LongLiteral",
            NumberLiteral => "NumberLiteral",
            StringLiteral => "StringLiteral",
            DateLiteral => "DateLiteral",
            Abstract => "'abstract'",
            After => "'after'",
            Before => "'before'",
            Break => "'break'",
            Catch => "'catch'",
            Class => "'class'",
            Continue => "'continue'",
            Delete => "'delete'",
            Do => "'do'",
            Else => "'else'",
            Enum => "'enum'",
            Extends => "'extends'",
            False => "'false'",
            Final => "'final'",
            Finally => "'finally'",
            For => "'for'",
            Get => "'get'",
            Global => "'global'",
            If => "'if'",
            Implements => "'implements'",
            Inherited => "'inherited'",
            Insert => "'insert'",
            Instanceof => "'instanceof'",
            Interface => "'interface'",
            List => "'list'",
            Map => "'map'",
            Merge => "'merge'",
            New => "'new'",
            Null => "'null'",
            On => "'on'",
            Override => "'override'",
            Private => "'private'",
            Protected => "'protected'",
            Public => "'public'",
            Return => "'return'",
            Set => "'set'",
            Sharing => "'sharing'",
            Static => "'static'",
            Super => "'super'",
            Switch => "'switch'",
            SystemRunAs => "'system.runas'",
            Testmethod => "'testmethod'",
            This => "'this'",
            Throw => "'throw'",
            Transient => "'transient'",
            Trigger => "'trigger'",
            True => "'true'",
            Try => "'try'",
            Undelete => "'undelete'",
            Update => "'update'",
            Upsert => "'upsert'",
            Virtual => "'virtual'",
            Void => "'void'",
            Webservice => "'webservice'",
            When => "'when'",
            While => "'while'",
            With => "'with'",
            Without => "'without'",
            LParen => "'('",
            RParen => "')'",
            LBrace => "'{'",
            RBrace => "'}'",
            LBrack => "'['",
            RBrack => "']'",
            Semi => "';'",
            Comma => "','",
            Dot => "'.'",
            At => "'@'",
            Assign => "'='",
            Gt => "'>'",
            Lt => "'<'",
            Bang => "'!'",
            Tilde => "'~'",
            Question => "'?'",
            QuestionDot => "'?.'",
            Coalesce => "'??'",
            Colon => "':'",
            Eq => "'=='",
            TripleEq => "'==='",
            Le => "'<='",
            Ge => "'>='",
            Ne => "'!='",
            LessGreater => "'<>'",
            TripleNe => "'!=='",
            AndAnd => "'&&'",
            OrOr => "'||'",
            Inc => "'++'",
            Dec => "'--'",
            Add => "'+'",
            Sub => "'-'",
            Mul => "'*'",
            Div => "'/'",
            BitAnd => "'&'",
            BitOr => "'|'",
            Caret => "'^'",
            Mod => "'%'",
            MapsTo => "'=>'",
            AddAssign => "'+='",
            SubAssign => "'-='",
            MulAssign => "'*='",
            DivAssign => "'/='",
            AndAssign => "'&='",
            OrAssign => "'|='",
            XorAssign => "'^='",
            LShiftAssign => "'<<='",
            RShiftAssign => "'>>='",
            URShiftAssign => "'>>>='",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Default,
    Hidden,
}

/// A token with its original text and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Text exactly as written in the source.
    pub text: String,
    /// Spelling as seen through the lexer's lookahead: lower-cased when the
    /// lexer reads a case-insensitive stream. Empty for non-word tokens.
    pub word: String,
    pub channel: Channel,
    /// 1-based line of the first char.
    pub line: usize,
    /// 1-based column of the first char.
    pub column: usize,
    /// Char index of the first char.
    pub start: usize,
    /// Char index of the last char; `start - 1` for EOF.
    pub stop: isize,
    /// Position in the token stream.
    pub index: usize,
}

impl Token {
    /// Quoted text as used in error messages (`'x'`, `'<EOF>'`).
    pub fn error_display(&self) -> String {
        if self.kind == TokenKind::Eof {
            return "'<EOF>'".to_string();
        }
        format!("'{}'", escape_ws(&self.text))
    }

    /// Identifier, or keyword usable as one.
    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier || self.kind.is_soft_keyword()
    }

    /// Identifier or any keyword; valid after `.` and in SOQL names.
    pub fn is_word(&self) -> bool {
        !self.word.is_empty()
    }
}

/// Escapes line breaks and tabs for single-line messages.
pub fn escape_ws(text: &str) -> String {
    text.replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}
