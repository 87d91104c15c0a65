//! Inline SOQL and SOSL.
//!
//! SOQL keywords are not reserved in Apex, so clauses are recognized by
//! spelling (`Token::word`). Bind expressions (`:expr`) are parsed as Apex
//! unary expressions.

use super::recovery::LITERALS;
use super::{PResult, Parser};
use crate::grammar::token::TokenKind;
use crate::grammar::tree::Rule;

/// Words that end a select entry or field expression instead of aliasing it.
const CLAUSE_WORDS: &[&str] = &[
    "from", "where", "with", "group", "order", "limit", "offset", "for", "update", "using",
    "having", "all", "and", "or", "not", "like", "in", "includes", "excludes", "asc", "desc",
    "nulls", "first", "last", "when", "then", "else", "end",
];

impl Parser {
    pub(super) fn parse_soql_literal(&mut self) -> PResult<()> {
        self.tree.start(Rule::SoqlLiteral);
        self.bump();
        self.parse_query()?;
        self.expect(TokenKind::RBrack)?;
        self.tree.finish();
        Ok(())
    }

    pub(super) fn parse_sosl_literal(&mut self) -> PResult<()> {
        self.tree.start(Rule::SoslLiteral);
        self.bump();
        self.parse_sosl_query()?;
        self.expect(TokenKind::RBrack)?;
        self.tree.finish();
        Ok(())
    }

    fn at_alias(&self) -> bool {
        self.at_ident() && !CLAUSE_WORDS.contains(&self.current().word.as_str())
    }

    pub(super) fn parse_query(&mut self) -> PResult<()> {
        self.tree.start(Rule::Query);
        self.expect_keyword("select")?;
        self.tree.start(Rule::SelectList);
        loop {
            self.parse_select_entry()?;
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.tree.finish();

        self.tree.start(Rule::FromClause);
        self.expect_keyword("from")?;
        loop {
            self.parse_field_name()?;
            if self.at_alias() {
                self.bump();
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.tree.finish();

        if self.at_word("using") {
            self.bump();
            self.expect_keyword("scope")?;
            self.expect_word()?;
        }
        if self.at_word("where") {
            self.tree.start(Rule::WhereClause);
            self.bump();
            self.parse_logical_expression()?;
            self.tree.finish();
        }
        if self.at_word("with") {
            self.parse_with_clause()?;
        }
        if self.at_word("group") {
            self.parse_group_by()?;
        }
        if self.at_word("order") {
            self.parse_order_by()?;
        }
        if self.at_word("limit") {
            self.parse_bounded_number(Rule::LimitClause)?;
        }
        if self.at_word("offset") {
            self.parse_bounded_number(Rule::OffsetClause)?;
        }
        if self.at_word("all") {
            self.bump();
            self.expect_keyword("rows")?;
        }
        if self.at_word("for") || self.at_word("update") {
            self.tree.start(Rule::ForClauses);
            while self.at_word("for") || self.at_word("update") {
                self.bump();
                loop {
                    self.expect_word()?;
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.tree.finish();
        }
        self.tree.finish();
        Ok(())
    }

    /// Field, function call, sub-query or `TYPEOF`, with an optional alias.
    fn parse_select_entry(&mut self) -> PResult<()> {
        self.tree.start(Rule::SelectEntry);
        if self.at(TokenKind::LParen) {
            self.tree.start(Rule::SubQuery);
            self.bump();
            self.parse_query()?;
            self.expect(TokenKind::RParen)?;
            self.tree.finish();
        } else if self.at_word("typeof") {
            self.bump();
            self.parse_field_name()?;
            while self.at_word("when") {
                self.bump();
                self.expect_word()?;
                self.expect_keyword("then")?;
                self.parse_field_list()?;
            }
            if self.at_word("else") {
                self.bump();
                self.parse_field_list()?;
            }
            self.expect_keyword("end")?;
        } else {
            self.parse_field_or_function()?;
        }
        if self.at_alias() {
            self.bump();
        }
        self.tree.finish();
        Ok(())
    }

    fn parse_field_list(&mut self) -> PResult<()> {
        loop {
            self.parse_field_name()?;
            if !self.eat(TokenKind::Comma) {
                return Ok(());
            }
        }
    }

    fn parse_field_or_function(&mut self) -> PResult<()> {
        if self.current().is_word() && self.nth_kind(1) == TokenKind::LParen {
            self.tree.start(Rule::SoqlFunction);
            self.bump_n(2);
            if !self.at(TokenKind::RParen) {
                loop {
                    self.parse_field_or_function()?;
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen)?;
            self.tree.finish();
            return Ok(());
        }
        self.parse_field_name()
    }

    fn parse_field_name(&mut self) -> PResult<()> {
        self.tree.start(Rule::FieldName);
        self.expect_word()?;
        while self.at(TokenKind::Dot) && self.nth(1).is_word() {
            self.bump_n(2);
        }
        self.tree.finish();
        Ok(())
    }

    /// Conditions joined by `AND`/`OR`, each optionally negated or
    /// parenthesized.
    fn parse_logical_expression(&mut self) -> PResult<()> {
        self.tree.start(Rule::LogicalExpression);
        loop {
            if self.at_word("not") {
                self.bump();
            }
            if self.at(TokenKind::LParen) {
                self.bump();
                self.parse_logical_expression()?;
                self.expect(TokenKind::RParen)?;
            } else {
                self.parse_field_expression()?;
            }
            if !(self.at_word("and") || self.at_word("or")) {
                break;
            }
            self.bump();
        }
        self.tree.finish();
        Ok(())
    }

    fn parse_field_expression(&mut self) -> PResult<()> {
        self.tree.start(Rule::FieldExpression);
        self.parse_field_or_function()?;
        match self.kind() {
            TokenKind::Assign
            | TokenKind::Ne
            | TokenKind::LessGreater
            | TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::Le
            | TokenKind::Ge => self.bump(),
            _ if self.at_word("not") && self.nth_word(1, "in") => self.bump_n(2),
            _ if ["like", "in", "includes", "excludes"]
                .iter()
                .any(|w| self.at_word(w)) =>
            {
                self.bump()
            }
            _ => self.mismatch("{'=', '!=', '<', '>', '<=', '>=', 'LIKE', 'IN'}")?,
        }
        self.parse_soql_value()?;
        self.tree.finish();
        Ok(())
    }

    fn parse_soql_value(&mut self) -> PResult<()> {
        self.tree.start(Rule::SoqlValue);
        match self.kind() {
            TokenKind::Colon => self.parse_bound_expression()?,
            TokenKind::LParen => {
                self.bump();
                if self.at_word("select") {
                    self.parse_query()?;
                } else {
                    loop {
                        self.parse_soql_value()?;
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RParen)?;
            }
            TokenKind::Sub | TokenKind::Add if LITERALS.contains(self.nth_kind(1)) => {
                self.bump_n(2)
            }
            k if LITERALS.contains(k) => self.bump(),
            // Date literals such as TODAY or LAST_N_DAYS:30.
            _ if self.at_ident() => {
                self.bump();
                if self.at(TokenKind::Colon) && LITERALS.contains(self.nth_kind(1)) {
                    self.bump_n(2);
                }
            }
            _ => self.no_viable()?,
        }
        self.tree.finish();
        Ok(())
    }

    fn parse_bound_expression(&mut self) -> PResult<()> {
        self.tree.start(Rule::BoundExpression);
        self.bump();
        self.parse_unary()?;
        self.tree.finish();
        Ok(())
    }

    /// `WITH SECURITY_ENFORCED`, `WITH USER_MODE`, `WITH DATA CATEGORY ...`.
    fn parse_with_clause(&mut self) -> PResult<()> {
        self.tree.start(Rule::WithClause);
        self.bump();
        if self.at_word("data") {
            self.bump();
            self.expect_keyword("category")?;
            loop {
                self.parse_field_name()?;
                self.expect_word()?;
                self.parse_soql_value()?;
                if !self.at_word("and") {
                    break;
                }
                self.bump();
            }
        } else {
            self.expect_word()?;
        }
        self.tree.finish();
        Ok(())
    }

    fn parse_group_by(&mut self) -> PResult<()> {
        self.tree.start(Rule::GroupByClause);
        self.bump();
        self.expect_keyword("by")?;
        loop {
            self.parse_field_or_function()?;
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        if self.at_word("having") {
            self.bump();
            self.parse_logical_expression()?;
        }
        self.tree.finish();
        Ok(())
    }

    fn parse_order_by(&mut self) -> PResult<()> {
        self.tree.start(Rule::OrderByClause);
        self.bump();
        self.expect_keyword("by")?;
        loop {
            self.parse_field_or_function()?;
            if self.at_word("asc") || self.at_word("desc") {
                self.bump();
            }
            if self.at_word("nulls") {
                self.bump();
                if self.at_word("first") || self.at_word("last") {
                    self.bump();
                } else {
                    self.mismatch("{'FIRST', 'LAST'}")?;
                }
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.tree.finish();
        Ok(())
    }

    /// `LIMIT n`, `OFFSET n`, or with a bind expression.
    fn parse_bounded_number(&mut self, rule: Rule) -> PResult<()> {
        self.tree.start(rule);
        self.bump();
        if self.at(TokenKind::Colon) {
            self.parse_bound_expression()?;
        } else {
            self.expect(TokenKind::IntegerLiteral)?;
        }
        self.tree.finish();
        Ok(())
    }

    /// `FIND 'term' IN ALL FIELDS RETURNING ...`: the search term and
    /// binds are parsed, the rest is matched up to the closing bracket.
    pub(super) fn parse_sosl_query(&mut self) -> PResult<()> {
        self.tree.start(Rule::SoslQuery);
        self.expect_keyword("find")?;
        match self.kind() {
            TokenKind::StringLiteral => self.bump(),
            TokenKind::Colon => self.parse_bound_expression()?,
            TokenKind::LBrace => {
                while !self.at(TokenKind::RBrace) && !self.at_eof() {
                    self.bump();
                }
                self.expect(TokenKind::RBrace)?;
            }
            _ => self.mismatch("StringLiteral")?,
        }
        let mut depth = 0usize;
        while !self.at_eof() {
            match self.kind() {
                TokenKind::RBrack if depth == 0 => break,
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => depth = depth.saturating_sub(1),
                TokenKind::Colon => {
                    self.parse_bound_expression()?;
                    continue;
                }
                _ => {}
            }
            self.bump();
        }
        self.tree.finish();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{messages, parser};
    use crate::grammar::tree::Rule;
    use pretty_assertions::assert_eq;

    fn query_errors(src: &str) -> Vec<String> {
        let mut p = parser(src);
        p.query().unwrap();
        messages(&mut p)
    }

    #[test]
    fn test_queries_parse_clean() {
        let queries = [
            "SELECT Id FROM Account",
            "select Id, Name, Owner.Name from Account a where Name like 'A%' and (Type = 'X' or Type != null)",
            "SELECT COUNT(Id) cnt, MAX(Amount) FROM Opportunity GROUP BY StageName HAVING COUNT(Id) > 1",
            "SELECT Id, (SELECT Id FROM Contacts) FROM Account WHERE Id IN :ids WITH USER_MODE",
            "SELECT Id FROM Account WHERE Id NOT IN (SELECT AccountId FROM Contact) ORDER BY Name DESC NULLS LAST LIMIT 10 OFFSET :skip",
            "SELECT Id FROM Task WHERE ActivityDate = LAST_N_DAYS:30 AND IsClosed = false FOR UPDATE",
            "SELECT TYPEOF What WHEN Account THEN Phone ELSE Name END FROM Event",
            "SELECT Id FROM Account WITH SECURITY_ENFORCED ALL ROWS",
            "SELECT Id FROM Account WHERE CreatedDate > 2020-01-01T00:00:00Z AND Amount > -5",
        ];
        for q in queries {
            assert_eq!(query_errors(q), Vec::<String>::new(), "{q}");
        }
    }

    #[test]
    fn test_missing_from() {
        assert_eq!(
            query_errors("SELECT Id Account"),
            vec!["1:18 missing 'from' at '<EOF>'".to_string()]
        );
    }

    #[test]
    fn test_bind_expressions_are_apex() {
        let mut p = parser(
            "SELECT Id FROM Account WHERE Id = :accts[0].Id AND Name = :names.get(0)",
        );
        let tree = p.query().unwrap();
        assert_eq!(p.syntax_error_count(), 0);
        assert_eq!(tree.find_all(Rule::BoundExpression).len(), 2);
        assert_eq!(tree.find_all(Rule::ArrayExpression).len(), 1);
    }

    #[test]
    fn test_sosl() {
        let mut p = parser(
            "FIND :term IN ALL FIELDS RETURNING Account(Id, Name WHERE Name != :skip), Contact",
        );
        let tree = p.sosl_query().unwrap();
        assert_eq!(p.syntax_error_count(), 0);
        assert_eq!(tree.find_all(Rule::BoundExpression).len(), 2);

        let mut p = parser("x = [FIND 'acme*' IN NAME FIELDS RETURNING Account];");
        p.statement().unwrap();
        assert_eq!(p.syntax_error_count(), 0);
    }
}
