//! Token sets used for lookahead decisions and error recovery.

use crate::grammar::token::TokenKind;

/// A set of token kinds as a bitset, one bit per `TokenKind` discriminant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub(crate) struct TokenSet(u128);

impl TokenSet {
    pub const fn new() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn with(self, kind: TokenKind) -> Self {
        Self(self.0 | (1u128 << kind.discriminant_index()))
    }

    pub const fn contains(&self, kind: TokenKind) -> bool {
        (self.0 & (1u128 << kind.discriminant_index())) != 0
    }
}

/// Member and local-variable modifiers.
pub(crate) const MODIFIERS: TokenSet = TokenSet::new()
    .with(TokenKind::Global)
    .with(TokenKind::Public)
    .with(TokenKind::Protected)
    .with(TokenKind::Private)
    .with(TokenKind::Transient)
    .with(TokenKind::Static)
    .with(TokenKind::Abstract)
    .with(TokenKind::Final)
    .with(TokenKind::Webservice)
    .with(TokenKind::Override)
    .with(TokenKind::Virtual)
    .with(TokenKind::Testmethod)
    .with(TokenKind::With)
    .with(TokenKind::Without)
    .with(TokenKind::Inherited);

/// Tokens that start a type or member declaration once modifiers are read.
pub(crate) const DECL_KEYWORDS: TokenSet = TokenSet::new()
    .with(TokenKind::Class)
    .with(TokenKind::Interface)
    .with(TokenKind::Enum)
    .with(TokenKind::Void);

pub(crate) const LITERALS: TokenSet = TokenSet::new()
    .with(TokenKind::IntegerLiteral)
    .with(TokenKind::LongLiteral)
    .with(TokenKind::NumberLiteral)
    .with(TokenKind::StringLiteral)
    .with(TokenKind::DateLiteral)
    .with(TokenKind::True)
    .with(TokenKind::False)
    .with(TokenKind::Null);

pub(crate) const DML_KEYWORDS: TokenSet = TokenSet::new()
    .with(TokenKind::Insert)
    .with(TokenKind::Update)
    .with(TokenKind::Delete)
    .with(TokenKind::Undelete)
    .with(TokenKind::Upsert);

pub(crate) const ASSIGN_OPS: TokenSet = TokenSet::new()
    .with(TokenKind::Assign)
    .with(TokenKind::AddAssign)
    .with(TokenKind::SubAssign)
    .with(TokenKind::MulAssign)
    .with(TokenKind::DivAssign)
    .with(TokenKind::AndAssign)
    .with(TokenKind::OrAssign)
    .with(TokenKind::XorAssign)
    .with(TokenKind::LShiftAssign)
    .with(TokenKind::RShiftAssign)
    .with(TokenKind::URShiftAssign);

/// Tokens that may open an expression.
pub(crate) const EXPR_START: TokenSet = LITERALS
    .with(TokenKind::Identifier)
    .with(TokenKind::This)
    .with(TokenKind::Super)
    .with(TokenKind::New)
    .with(TokenKind::LParen)
    .with(TokenKind::LBrack)
    .with(TokenKind::Add)
    .with(TokenKind::Sub)
    .with(TokenKind::Inc)
    .with(TokenKind::Dec)
    .with(TokenKind::Bang)
    .with(TokenKind::Tilde)
    .with(TokenKind::List)
    .with(TokenKind::Map)
    .with(TokenKind::Void);

/// After `(Type)`, these tokens make the parenthesized type a cast.
pub(crate) const CAST_FOLLOW: TokenSet = LITERALS
    .with(TokenKind::Identifier)
    .with(TokenKind::This)
    .with(TokenKind::Super)
    .with(TokenKind::New)
    .with(TokenKind::LParen)
    .with(TokenKind::LBrack)
    .with(TokenKind::Bang)
    .with(TokenKind::Tilde)
    .with(TokenKind::List)
    .with(TokenKind::Map);

/// Where a missing token is reported as `missing X at Y` rather than as a
/// mismatch: structural tokens the enclosing rule can resume from.
pub(crate) const RESUME: TokenSet = TokenSet::new()
    .with(TokenKind::Eof)
    .with(TokenKind::Semi)
    .with(TokenKind::Comma)
    .with(TokenKind::LBrace)
    .with(TokenKind::RBrace)
    .with(TokenKind::RParen)
    .with(TokenKind::RBrack);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership() {
        assert!(MODIFIERS.contains(TokenKind::Public));
        assert!(!MODIFIERS.contains(TokenKind::Class));
        assert!(DECL_KEYWORDS.contains(TokenKind::Class));
        assert!(RESUME.contains(TokenKind::Eof));
        assert!(EXPR_START.contains(TokenKind::StringLiteral));
        assert!(!TokenSet::new().contains(TokenKind::Eof));
    }
}
