//! Statements and blocks.
//!
//! A bare `;` is not a statement. Block statement lists skip it as a no-op,
//! `while` and `for` accept it as an empty body, and everywhere else a
//! single statement is required it is a syntax error.

use super::recovery::{DML_KEYWORDS, EXPR_START, LITERALS};
use super::stack::ensure_sufficient_stack;
use super::{PResult, Parser};
use crate::grammar::token::TokenKind;
use crate::grammar::tree::Rule;

impl Parser {
    pub(super) fn parse_block(&mut self) -> PResult<()> {
        ensure_sufficient_stack(|| self.parse_block_inner())
    }

    fn parse_block_inner(&mut self) -> PResult<()> {
        self.tree.start(Rule::Block);
        if self.expect(TokenKind::LBrace)? {
            while !self.at(TokenKind::RBrace) && !self.at_eof() {
                let start = self.pos;
                if !self.eat(TokenKind::Semi) {
                    self.parse_statement()?;
                }
                self.guard_progress(start);
            }
            self.expect(TokenKind::RBrace)?;
        }
        self.tree.finish();
        Ok(())
    }

    pub(super) fn parse_statement(&mut self) -> PResult<()> {
        ensure_sufficient_stack(|| self.parse_statement_inner())
    }

    fn parse_statement_inner(&mut self) -> PResult<()> {
        self.tree.start(Rule::Statement);
        match self.kind() {
            TokenKind::LBrace => self.parse_block()?,
            TokenKind::If => self.parse_if()?,
            TokenKind::Switch if self.nth_kind(1) == TokenKind::On => self.parse_switch()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::While => self.parse_while()?,
            TokenKind::Do => self.parse_do_while()?,
            TokenKind::Try => self.parse_try()?,
            TokenKind::Return => self.parse_return()?,
            TokenKind::Throw => self.parse_keyword_expression(Rule::ThrowStatement)?,
            TokenKind::Break => self.parse_jump(Rule::BreakStatement)?,
            TokenKind::Continue => self.parse_jump(Rule::ContinueStatement)?,
            TokenKind::Merge => self.parse_merge()?,
            TokenKind::SystemRunAs => self.parse_run_as()?,
            k if DML_KEYWORDS.contains(k) => self.parse_dml()?,
            _ if self.is_local_variable_declaration() => {
                self.parse_local_variable_declaration()?;
                self.expect(TokenKind::Semi)?;
            }
            k if EXPR_START.contains(k) || self.at_ident() => {
                self.tree.start(Rule::ExpressionStatement);
                self.parse_expression()?;
                self.expect(TokenKind::Semi)?;
                self.tree.finish();
            }
            _ => {
                self.no_viable()?;
                self.bump_error();
            }
        }
        self.tree.finish();
        Ok(())
    }

    /// Single statement, or `;` as an empty body.
    fn parse_loop_body(&mut self) -> PResult<()> {
        if !self.eat(TokenKind::Semi) {
            self.parse_statement()?;
        }
        Ok(())
    }

    pub(super) fn parse_local_variable_declaration(&mut self) -> PResult<()> {
        self.tree.start(Rule::LocalVariableDeclaration);
        self.parse_modifiers()?;
        self.parse_type_ref()?;
        self.parse_variable_declarators()?;
        self.tree.finish();
        Ok(())
    }

    fn parse_par_expression(&mut self) -> PResult<()> {
        self.tree.start(Rule::ParExpression);
        self.expect(TokenKind::LParen)?;
        self.parse_expression()?;
        self.expect(TokenKind::RParen)?;
        self.tree.finish();
        Ok(())
    }

    fn parse_if(&mut self) -> PResult<()> {
        self.tree.start(Rule::IfStatement);
        self.bump();
        self.parse_par_expression()?;
        self.parse_statement()?;
        if self.eat(TokenKind::Else) {
            self.parse_statement()?;
        }
        self.tree.finish();
        Ok(())
    }

    /// `switch on expr { when ... { } when else { } }`
    fn parse_switch(&mut self) -> PResult<()> {
        self.tree.start(Rule::SwitchStatement);
        self.bump_n(2);
        self.parse_expression()?;
        if self.expect(TokenKind::LBrace)? {
            // At least one `when` is required.
            if self.at(TokenKind::RBrace) {
                self.mismatch(TokenKind::When.display())?;
            }
            while !self.at(TokenKind::RBrace) && !self.at_eof() {
                let start = self.pos;
                self.tree.start(Rule::WhenControl);
                self.expect(TokenKind::When)?;
                self.parse_when_value()?;
                self.parse_block()?;
                self.tree.finish();
                self.guard_progress(start);
            }
            self.expect(TokenKind::RBrace)?;
        }
        self.tree.finish();
        Ok(())
    }

    /// `else`, `Type name`, or a comma-separated literal list.
    fn parse_when_value(&mut self) -> PResult<()> {
        self.tree.start(Rule::WhenValue);
        if self.at(TokenKind::Else) {
            self.bump();
        } else if self.at_ident() && self.nth(1).is_identifier() {
            self.bump_n(2);
        } else {
            loop {
                self.parse_when_literal()?;
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.tree.finish();
        Ok(())
    }

    fn parse_when_literal(&mut self) -> PResult<()> {
        self.tree.start(Rule::WhenLiteral);
        if self.at(TokenKind::LParen) {
            self.bump();
            self.parse_when_literal()?;
            self.expect(TokenKind::RParen)?;
        } else {
            self.eat(TokenKind::Sub);
            if self.at_set(LITERALS) || self.at_ident() {
                self.bump();
            } else {
                self.no_viable()?;
            }
        }
        self.tree.finish();
        Ok(())
    }

    fn parse_for(&mut self) -> PResult<()> {
        self.tree.start(Rule::ForStatement);
        self.bump();
        self.expect(TokenKind::LParen)?;
        self.parse_for_control()?;
        self.expect(TokenKind::RParen)?;
        self.parse_loop_body()?;
        self.tree.finish();
        Ok(())
    }

    /// `Type name : expr` or `init; condition; update`.
    fn parse_for_control(&mut self) -> PResult<()> {
        self.tree.start(Rule::ForControl);
        if self.is_enhanced_for() {
            self.parse_modifiers()?;
            self.parse_type_ref()?;
            self.expect_ident()?;
            self.expect(TokenKind::Colon)?;
            self.parse_expression()?;
        } else {
            if !self.at(TokenKind::Semi) {
                if self.is_local_variable_declaration() {
                    self.parse_local_variable_declaration()?;
                } else {
                    self.parse_expression_list()?;
                }
            }
            self.expect(TokenKind::Semi)?;
            if !self.at(TokenKind::Semi) {
                self.parse_expression()?;
            }
            self.expect(TokenKind::Semi)?;
            if !self.at(TokenKind::RParen) {
                self.parse_expression_list()?;
            }
        }
        self.tree.finish();
        Ok(())
    }

    fn is_enhanced_for(&self) -> bool {
        let n = if self.at(TokenKind::Final) { 1 } else { 0 };
        match self.scan_type(n) {
            Some(m) => self.nth(m).is_identifier() && self.nth_kind(m + 1) == TokenKind::Colon,
            None => false,
        }
    }

    fn parse_expression_list(&mut self) -> PResult<()> {
        loop {
            self.parse_expression()?;
            if !self.eat(TokenKind::Comma) {
                return Ok(());
            }
        }
    }

    fn parse_while(&mut self) -> PResult<()> {
        self.tree.start(Rule::WhileStatement);
        self.bump();
        self.parse_par_expression()?;
        self.parse_loop_body()?;
        self.tree.finish();
        Ok(())
    }

    fn parse_do_while(&mut self) -> PResult<()> {
        self.tree.start(Rule::DoWhileStatement);
        self.bump();
        self.parse_block()?;
        self.expect(TokenKind::While)?;
        self.parse_par_expression()?;
        self.expect(TokenKind::Semi)?;
        self.tree.finish();
        Ok(())
    }

    fn parse_try(&mut self) -> PResult<()> {
        self.tree.start(Rule::TryStatement);
        self.bump();
        self.parse_block()?;
        let mut handled = false;
        while self.at(TokenKind::Catch) {
            handled = true;
            self.tree.start(Rule::CatchClause);
            self.bump();
            self.expect(TokenKind::LParen)?;
            self.parse_modifiers()?;
            self.parse_type_ref()?;
            self.expect_ident()?;
            self.expect(TokenKind::RParen)?;
            self.parse_block()?;
            self.tree.finish();
        }
        if self.at(TokenKind::Finally) {
            handled = true;
            self.tree.start(Rule::FinallyBlock);
            self.bump();
            self.parse_block()?;
            self.tree.finish();
        }
        if !handled {
            self.mismatch("{'catch', 'finally'}")?;
        }
        self.tree.finish();
        Ok(())
    }

    fn parse_return(&mut self) -> PResult<()> {
        self.tree.start(Rule::ReturnStatement);
        self.bump();
        if !self.at(TokenKind::Semi) {
            self.parse_expression()?;
        }
        self.expect(TokenKind::Semi)?;
        self.tree.finish();
        Ok(())
    }

    fn parse_keyword_expression(&mut self, rule: Rule) -> PResult<()> {
        self.tree.start(rule);
        self.bump();
        self.parse_expression()?;
        self.expect(TokenKind::Semi)?;
        self.tree.finish();
        Ok(())
    }

    fn parse_jump(&mut self, rule: Rule) -> PResult<()> {
        self.tree.start(rule);
        self.bump();
        self.expect(TokenKind::Semi)?;
        self.tree.finish();
        Ok(())
    }

    /// `insert [as user|system] expr;`, `upsert expr [field];`, ...
    fn parse_dml(&mut self) -> PResult<()> {
        self.tree.start(Rule::DmlStatement);
        let upsert = self.at(TokenKind::Upsert);
        self.bump();
        if self.at_word("as")
            && (self.nth_word(1, "user") || self.nth_word(1, "system"))
            && self.nth_kind(2) != TokenKind::Semi
        {
            self.tree.start(Rule::AccessLevel);
            self.bump_n(2);
            self.tree.finish();
        }
        self.parse_expression()?;
        if upsert && !self.at(TokenKind::Semi) {
            self.parse_qualified_name()?;
        }
        self.expect(TokenKind::Semi)?;
        self.tree.finish();
        Ok(())
    }

    /// `merge master duplicates;`
    fn parse_merge(&mut self) -> PResult<()> {
        self.tree.start(Rule::DmlStatement);
        self.bump();
        self.parse_expression()?;
        self.parse_expression()?;
        self.expect(TokenKind::Semi)?;
        self.tree.finish();
        Ok(())
    }

    /// `System.runAs(user) { ... }`
    fn parse_run_as(&mut self) -> PResult<()> {
        self.tree.start(Rule::RunAsStatement);
        self.bump();
        self.expect(TokenKind::LParen)?;
        if !self.at(TokenKind::RParen) {
            self.parse_expression_list()?;
        }
        self.expect(TokenKind::RParen)?;
        self.parse_block()?;
        self.tree.finish();
        Ok(())
    }
}
