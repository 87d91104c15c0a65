//! Expressions.
//!
//! Binary operators are parsed by precedence climbing over `BINARY_LEVELS`,
//! loosest first. Each level wraps its left operand with a checkpoint so
//! chains come out left-associative. Shift operators are lexed as separate
//! `<`/`>` tokens and recognized here when they touch.

use super::recovery::{ASSIGN_OPS, CAST_FOLLOW, LITERALS};
use super::stack::ensure_sufficient_stack;
use super::{PResult, Parser};
use crate::grammar::token::TokenKind;
use crate::grammar::tree::Rule;

/// Binary precedence levels, loosest first.
const BINARY_LEVELS: usize = 11;

impl Parser {
    pub(super) fn parse_expression(&mut self) -> PResult<()> {
        ensure_sufficient_stack(|| self.parse_expression_inner())
    }

    fn parse_expression_inner(&mut self) -> PResult<()> {
        let cp = self.tree.checkpoint();
        self.parse_conditional()?;
        if self.at_set(ASSIGN_OPS) {
            self.tree.start_at(cp, Rule::AssignExpression);
            self.bump();
            self.parse_expression()?;
            self.tree.finish();
        }
        Ok(())
    }

    /// `a ? b : c`, right-associative.
    pub(super) fn parse_conditional(&mut self) -> PResult<()> {
        let cp = self.tree.checkpoint();
        self.parse_binary(0)?;
        if self.at(TokenKind::Question) {
            self.tree.start_at(cp, Rule::CondExpression);
            self.bump();
            self.parse_expression()?;
            self.expect(TokenKind::Colon)?;
            self.parse_conditional()?;
            self.tree.finish();
        }
        Ok(())
    }

    fn parse_binary(&mut self, level: usize) -> PResult<()> {
        if level == BINARY_LEVELS {
            return self.parse_unary();
        }
        let cp = self.tree.checkpoint();
        self.parse_binary(level + 1)?;
        while let Some((rule, len)) = self.binary_operator(level) {
            self.tree.start_at(cp, rule);
            self.bump_n(len);
            if rule == Rule::InstanceOfExpression {
                self.parse_type_ref()?;
            } else {
                self.parse_binary(level + 1)?;
            }
            self.tree.finish();
        }
        Ok(())
    }

    /// Operator at the current position for `level`, with its token count.
    fn binary_operator(&self, level: usize) -> Option<(Rule, usize)> {
        use TokenKind::*;
        let kind = self.kind();
        let next = self.nth_kind(1);
        let op = match (level, kind) {
            (0, Coalesce) => (Rule::CoalExpression, 1),
            (1, OrOr) => (Rule::LogOrExpression, 1),
            (2, AndAnd) => (Rule::LogAndExpression, 1),
            (3, BitOr) => (Rule::BitOrExpression, 1),
            (4, Caret) => (Rule::BitNotExpression, 1),
            (5, BitAnd) => (Rule::BitAndExpression, 1),
            (6, Eq | Ne | LessGreater | TripleEq | TripleNe) => (Rule::EqualityExpression, 1),
            (7, Instanceof) => (Rule::InstanceOfExpression, 1),
            (7, Le | Ge) => (Rule::CmpExpression, 1),
            (7, Lt | Gt) if !(next == kind && self.adjacent(0)) => (Rule::CmpExpression, 1),
            (8, Lt) if next == Lt && self.adjacent(0) => (Rule::BitExpression, 2),
            (8, Gt) if next == Gt && self.adjacent(0) => {
                if self.nth_kind(2) == Gt && self.adjacent(1) {
                    (Rule::BitExpression, 3)
                } else {
                    (Rule::BitExpression, 2)
                }
            }
            (9, Add | Sub) => (Rule::Arth2Expression, 1),
            (10, Mul | Div | Mod) => (Rule::Arth1Expression, 1),
            _ => return None,
        };
        Some(op)
    }

    pub(super) fn parse_unary(&mut self) -> PResult<()> {
        ensure_sufficient_stack(|| self.parse_unary_inner())
    }

    fn parse_unary_inner(&mut self) -> PResult<()> {
        match self.kind() {
            TokenKind::Add | TokenKind::Sub | TokenKind::Inc | TokenKind::Dec => {
                self.tree.start(Rule::PreOpExpression);
                self.bump();
                self.parse_unary()?;
                self.tree.finish();
            }
            TokenKind::Bang | TokenKind::Tilde => {
                self.tree.start(Rule::NegExpression);
                self.bump();
                self.parse_unary()?;
                self.tree.finish();
            }
            TokenKind::LParen if self.is_cast() => {
                self.tree.start(Rule::CastExpression);
                self.bump();
                self.parse_type_ref()?;
                self.expect(TokenKind::RParen)?;
                self.parse_unary()?;
                self.tree.finish();
            }
            _ => self.parse_postfix()?,
        }
        Ok(())
    }

    /// `(Type)` followed by something that can only start an operand.
    fn is_cast(&self) -> bool {
        match self.scan_type(1) {
            Some(n) => {
                self.nth_kind(n) == TokenKind::RParen && CAST_FOLLOW.contains(self.nth_kind(n + 1))
            }
            None => false,
        }
    }

    fn parse_postfix(&mut self) -> PResult<()> {
        let cp = self.tree.checkpoint();
        self.parse_primary()?;
        loop {
            match self.kind() {
                TokenKind::Dot | TokenKind::QuestionDot => {
                    self.tree.start_at(cp, Rule::DotExpression);
                    self.bump();
                    if self.current().is_word() && self.nth_kind(1) == TokenKind::LParen {
                        self.parse_method_call()?;
                    } else {
                        self.expect_word()?;
                    }
                    self.tree.finish();
                }
                TokenKind::LBrack => {
                    self.tree.start_at(cp, Rule::ArrayExpression);
                    self.bump();
                    self.parse_expression()?;
                    self.expect(TokenKind::RBrack)?;
                    self.tree.finish();
                }
                TokenKind::Inc | TokenKind::Dec => {
                    self.tree.start_at(cp, Rule::PostOpExpression);
                    self.bump();
                    self.tree.finish();
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_primary(&mut self) -> PResult<()> {
        self.tree.start(Rule::PrimaryExpression);
        match self.kind() {
            TokenKind::This | TokenKind::Super if self.nth_kind(1) == TokenKind::LParen => {
                self.parse_method_call()?
            }
            TokenKind::This | TokenKind::Super => self.bump(),
            k if LITERALS.contains(k) => self.parse_literal()?,
            TokenKind::LParen => {
                self.bump();
                self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
            }
            TokenKind::New => self.parse_new()?,
            TokenKind::LBrack if self.nth_word(1, "select") => self.parse_soql_literal()?,
            TokenKind::LBrack if self.nth_word(1, "find") => self.parse_sosl_literal()?,
            TokenKind::Void if self.nth_kind(1) == TokenKind::Dot => self.bump(),
            _ if self.is_type_name(0) => {
                if self.nth_kind(1) == TokenKind::LParen {
                    self.parse_method_call()?;
                } else if self.is_class_reference() {
                    self.parse_type_ref()?;
                } else {
                    self.bump();
                }
            }
            _ => self.no_viable()?,
        }
        self.tree.finish();
        Ok(())
    }

    /// Generic or array type used as `Type.class`.
    fn is_class_reference(&self) -> bool {
        if !matches!(self.nth_kind(1), TokenKind::Lt | TokenKind::LBrack) {
            return false;
        }
        match self.scan_type(0) {
            Some(n) => self.nth_kind(n) == TokenKind::Dot && self.nth_word(n + 1, "class"),
            None => false,
        }
    }

    pub(super) fn parse_literal(&mut self) -> PResult<()> {
        self.tree.start(Rule::Literal);
        if self.at_set(LITERALS) {
            self.bump();
        } else {
            self.no_viable()?;
        }
        self.tree.finish();
        Ok(())
    }

    /// `name(args)`; the name may be any word.
    fn parse_method_call(&mut self) -> PResult<()> {
        self.tree.start(Rule::MethodCall);
        self.bump();
        self.parse_arguments()?;
        self.tree.finish();
        Ok(())
    }

    fn parse_arguments(&mut self) -> PResult<()> {
        self.tree.start(Rule::Arguments);
        self.expect(TokenKind::LParen)?;
        if !self.at(TokenKind::RParen) {
            loop {
                self.parse_expression()?;
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        self.tree.finish();
        Ok(())
    }

    fn parse_new(&mut self) -> PResult<()> {
        self.tree.start(Rule::NewExpression);
        self.bump();
        self.parse_creator()?;
        self.tree.finish();
        Ok(())
    }

    /// `Type(args)`, `Type[n]`, `Type[]{...}`, `List<T>{...}`,
    /// `Map<K, V>{k => v}`.
    fn parse_creator(&mut self) -> PResult<()> {
        self.tree.start(Rule::Creator);
        self.parse_type_name()?;
        while self.at(TokenKind::Dot) && self.is_type_name(1) {
            self.bump();
            self.parse_type_name()?;
        }
        match self.kind() {
            TokenKind::LParen => self.parse_arguments()?,
            TokenKind::LBrack => {
                self.bump();
                if self.eat(TokenKind::RBrack) {
                    if self.at(TokenKind::LBrace) {
                        self.parse_initializer()?;
                    }
                } else {
                    self.parse_expression()?;
                    self.expect(TokenKind::RBrack)?;
                }
            }
            TokenKind::LBrace => self.parse_initializer()?,
            _ => self.mismatch("{'(', '[', '{'}")?,
        }
        self.tree.finish();
        Ok(())
    }

    /// `{a, b}` or `{k => v, ...}`; the form is known after the first entry.
    fn parse_initializer(&mut self) -> PResult<()> {
        let cp = self.tree.checkpoint();
        self.bump();
        if self.at(TokenKind::RBrace) {
            self.tree.start_at(cp, Rule::ArrayInitializer);
            self.bump();
            self.tree.finish();
            return Ok(());
        }
        self.parse_expression()?;
        if self.at(TokenKind::MapsTo) {
            self.tree.start_at(cp, Rule::MapInitializer);
            self.bump();
            self.parse_expression()?;
            while self.eat(TokenKind::Comma) {
                self.parse_expression()?;
                self.expect(TokenKind::MapsTo)?;
                self.parse_expression()?;
            }
        } else {
            self.tree.start_at(cp, Rule::ArrayInitializer);
            while self.eat(TokenKind::Comma) {
                self.parse_expression()?;
            }
        }
        self.expect(TokenKind::RBrace)?;
        self.tree.finish();
        Ok(())
    }
}
