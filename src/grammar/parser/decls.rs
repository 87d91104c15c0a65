//! Units, type declarations and class members.

use super::recovery::{DECL_KEYWORDS, DML_KEYWORDS};
use super::{PResult, Parser};
use crate::grammar::token::TokenKind;
use crate::grammar::tree::Rule;

impl Parser {
    pub(super) fn parse_compilation_unit(&mut self) -> PResult<()> {
        self.tree.start(Rule::CompilationUnit);
        self.parse_type_declaration()?;
        self.expect_eof()?;
        self.tree.finish();
        Ok(())
    }

    pub(super) fn parse_trigger_unit(&mut self) -> PResult<()> {
        self.tree.start(Rule::TriggerUnit);
        self.expect(TokenKind::Trigger)?;
        self.expect_ident()?;
        self.expect(TokenKind::On)?;
        self.expect_ident()?;
        self.expect(TokenKind::LParen)?;
        loop {
            self.parse_trigger_case()?;
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        self.parse_member_block(Rule::TriggerBlock, Rule::TriggerBlockMember)?;
        self.expect_eof()?;
        self.tree.finish();
        Ok(())
    }

    pub(super) fn parse_anonymous_unit(&mut self) -> PResult<()> {
        self.tree.start(Rule::AnonymousUnit);
        while !self.at_eof() {
            let start = self.pos;
            if !self.eat(TokenKind::Semi) {
                self.parse_block_member(Rule::AnonymousBlockMember)?;
            }
            self.guard_progress(start);
        }
        self.bump();
        self.tree.finish();
        Ok(())
    }

    /// `before insert`, `after undelete`, ...
    fn parse_trigger_case(&mut self) -> PResult<()> {
        self.tree.start(Rule::TriggerCase);
        if matches!(self.kind(), TokenKind::Before | TokenKind::After) {
            self.bump();
        } else {
            self.mismatch("{'before', 'after'}")?;
        }
        if self.at_set(DML_KEYWORDS) && !self.at(TokenKind::Upsert) {
            self.bump();
        } else {
            self.mismatch("{'insert', 'update', 'delete', 'undelete'}")?;
        }
        self.tree.finish();
        Ok(())
    }

    /// `{ member* }` where each member is a statement or a declaration.
    fn parse_member_block(&mut self, block: Rule, member: Rule) -> PResult<()> {
        self.tree.start(block);
        if self.expect(TokenKind::LBrace)? {
            while !self.at(TokenKind::RBrace) && !self.at_eof() {
                let start = self.pos;
                if !self.eat(TokenKind::Semi) {
                    self.parse_block_member(member)?;
                }
                self.guard_progress(start);
            }
            self.expect(TokenKind::RBrace)?;
        }
        self.tree.finish();
        Ok(())
    }

    fn parse_block_member(&mut self, member: Rule) -> PResult<()> {
        self.tree.start(member);
        if self.is_member_start() {
            self.parse_modifiers()?;
            self.parse_member_declaration()?;
        } else {
            self.parse_statement()?;
        }
        self.tree.finish();
        Ok(())
    }

    /// Inside trigger and anonymous blocks: annotations, modifiers other
    /// than `final`, a declaration keyword, or `Type name (` / `Type name {`.
    fn is_member_start(&self) -> bool {
        let mut n = 0;
        let mut prefixed = false;
        loop {
            if self.nth_kind(n) == TokenKind::At {
                prefixed = true;
                n += 1;
                while self.nth(n).is_word() {
                    n += 1;
                    if self.nth_kind(n) != TokenKind::Dot {
                        break;
                    }
                    n += 1;
                }
                if self.nth_kind(n) == TokenKind::LParen {
                    n = self.skip_balanced(n);
                }
                continue;
            }
            let len = self.modifier_len(n);
            if len == 0 {
                break;
            }
            if self.nth_kind(n) != TokenKind::Final {
                prefixed = true;
            }
            n += len;
        }
        if prefixed || DECL_KEYWORDS.contains(self.nth_kind(n)) {
            return true;
        }
        match self.scan_type(n) {
            Some(m) => {
                self.nth(m).is_identifier()
                    && matches!(self.nth_kind(m + 1), TokenKind::LParen | TokenKind::LBrace)
            }
            None => false,
        }
    }

    /// Offset past the parenthesized group opening `n` ahead.
    fn skip_balanced(&self, mut n: usize) -> usize {
        let mut depth = 0usize;
        loop {
            match self.nth_kind(n) {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return n + 1;
                    }
                }
                TokenKind::Eof => return n,
                _ => {}
            }
            n += 1;
        }
    }

    fn parse_type_declaration(&mut self) -> PResult<()> {
        self.tree.start(Rule::TypeDeclaration);
        self.parse_modifiers()?;
        match self.kind() {
            TokenKind::Class => self.parse_class_declaration()?,
            TokenKind::Interface => self.parse_interface_declaration()?,
            TokenKind::Enum => self.parse_enum_declaration()?,
            _ => self.mismatch("{'class', 'interface', 'enum'}")?,
        }
        self.tree.finish();
        Ok(())
    }

    /// Annotations and modifiers, in any order.
    pub(super) fn parse_modifiers(&mut self) -> PResult<()> {
        loop {
            if self.at(TokenKind::At) {
                self.parse_annotation()?;
                continue;
            }
            let len = self.modifier_len(0);
            if len == 0 {
                return Ok(());
            }
            self.tree.start(Rule::Modifier);
            self.bump_n(len);
            self.tree.finish();
        }
    }

    /// `@Name`, `@Name(value)` or `@Name(key=value key=value)`.
    fn parse_annotation(&mut self) -> PResult<()> {
        self.tree.start(Rule::Annotation);
        self.bump();
        self.parse_qualified_name()?;
        if self.eat(TokenKind::LParen) {
            while !self.at(TokenKind::RParen) && !self.at_eof() {
                let start = self.pos;
                if self.current().is_word() && self.nth_kind(1) == TokenKind::Assign {
                    self.bump_n(2);
                }
                self.parse_element_value()?;
                self.eat(TokenKind::Comma);
                self.guard_progress(start);
            }
            self.expect(TokenKind::RParen)?;
        }
        self.tree.finish();
        Ok(())
    }

    fn parse_element_value(&mut self) -> PResult<()> {
        self.tree.start(Rule::ElementValue);
        if self.eat(TokenKind::LBrace) {
            while !self.at(TokenKind::RBrace) && !self.at_eof() {
                let start = self.pos;
                self.parse_element_value()?;
                self.eat(TokenKind::Comma);
                self.guard_progress(start);
            }
            self.expect(TokenKind::RBrace)?;
        } else {
            self.parse_conditional()?;
        }
        self.tree.finish();
        Ok(())
    }

    pub(super) fn parse_qualified_name(&mut self) -> PResult<()> {
        self.tree.start(Rule::QualifiedName);
        self.expect_word()?;
        while self.at(TokenKind::Dot) && self.nth(1).is_word() {
            self.bump_n(2);
        }
        self.tree.finish();
        Ok(())
    }

    fn parse_class_declaration(&mut self) -> PResult<()> {
        self.tree.start(Rule::ClassDeclaration);
        self.bump();
        self.expect_ident()?;
        if self.eat(TokenKind::Extends) {
            self.parse_type_ref()?;
        }
        if self.eat(TokenKind::Implements) {
            self.parse_type_list()?;
        }
        self.parse_class_body()?;
        self.tree.finish();
        Ok(())
    }

    fn parse_type_list(&mut self) -> PResult<()> {
        loop {
            self.parse_type_ref()?;
            if !self.eat(TokenKind::Comma) {
                return Ok(());
            }
        }
    }

    fn parse_class_body(&mut self) -> PResult<()> {
        self.tree.start(Rule::ClassBody);
        if self.expect(TokenKind::LBrace)? {
            while !self.at(TokenKind::RBrace) && !self.at_eof() {
                let start = self.pos;
                if !self.eat(TokenKind::Semi) {
                    self.parse_class_body_declaration()?;
                }
                self.guard_progress(start);
            }
            self.expect(TokenKind::RBrace)?;
        }
        self.tree.finish();
        Ok(())
    }

    fn parse_class_body_declaration(&mut self) -> PResult<()> {
        self.tree.start(Rule::ClassBodyDeclaration);
        if self.at(TokenKind::Static) && self.nth_kind(1) == TokenKind::LBrace {
            self.bump();
            self.parse_block()?;
        } else if self.at(TokenKind::LBrace) {
            self.parse_block()?;
        } else {
            self.parse_modifiers()?;
            self.parse_member_declaration()?;
        }
        self.tree.finish();
        Ok(())
    }

    /// Member after its modifiers: nested type, constructor, method,
    /// property or field.
    fn parse_member_declaration(&mut self) -> PResult<()> {
        match self.kind() {
            TokenKind::Class => return self.parse_class_declaration(),
            TokenKind::Interface => return self.parse_interface_declaration(),
            TokenKind::Enum => return self.parse_enum_declaration(),
            TokenKind::Void => return self.parse_method_declaration(),
            _ => {}
        }
        if self.at_ident() && self.nth_kind(1) == TokenKind::LParen {
            return self.parse_constructor_declaration();
        }
        let Some(n) = self.scan_type(0) else {
            return self.no_viable();
        };
        if !self.nth(n).is_identifier() {
            return self.parse_field_declaration();
        }
        match self.nth_kind(n + 1) {
            TokenKind::LParen => self.parse_method_declaration(),
            TokenKind::LBrace => self.parse_property_declaration(),
            _ => self.parse_field_declaration(),
        }
    }

    fn parse_method_declaration(&mut self) -> PResult<()> {
        self.tree.start(Rule::MethodDeclaration);
        if !self.eat(TokenKind::Void) {
            self.parse_type_ref()?;
        }
        self.expect_ident()?;
        self.parse_formal_parameters()?;
        if self.at(TokenKind::LBrace) {
            self.parse_block()?;
        } else {
            self.expect(TokenKind::Semi)?;
        }
        self.tree.finish();
        Ok(())
    }

    fn parse_constructor_declaration(&mut self) -> PResult<()> {
        self.tree.start(Rule::ConstructorDeclaration);
        self.bump();
        self.parse_formal_parameters()?;
        self.parse_block()?;
        self.tree.finish();
        Ok(())
    }

    fn parse_field_declaration(&mut self) -> PResult<()> {
        self.tree.start(Rule::FieldDeclaration);
        self.parse_type_ref()?;
        self.parse_variable_declarators()?;
        self.expect(TokenKind::Semi)?;
        self.tree.finish();
        Ok(())
    }

    pub(super) fn parse_variable_declarators(&mut self) -> PResult<()> {
        loop {
            self.tree.start(Rule::VariableDeclarator);
            self.expect_ident()?;
            if self.eat(TokenKind::Assign) {
                self.parse_expression()?;
            }
            self.tree.finish();
            if !self.eat(TokenKind::Comma) {
                return Ok(());
            }
        }
    }

    /// `Type name { get; set { ... } }`
    fn parse_property_declaration(&mut self) -> PResult<()> {
        self.tree.start(Rule::PropertyDeclaration);
        self.parse_type_ref()?;
        self.expect_ident()?;
        if self.expect(TokenKind::LBrace)? {
            while !self.at(TokenKind::RBrace) && !self.at_eof() {
                let start = self.pos;
                self.parse_property_accessor()?;
                self.guard_progress(start);
            }
            self.expect(TokenKind::RBrace)?;
        }
        self.tree.finish();
        Ok(())
    }

    fn parse_property_accessor(&mut self) -> PResult<()> {
        self.tree.start(Rule::PropertyAccessor);
        self.parse_modifiers()?;
        if matches!(self.kind(), TokenKind::Get | TokenKind::Set) {
            self.bump();
            if !self.eat(TokenKind::Semi) {
                self.parse_block()?;
            }
        } else {
            self.mismatch("{'get', 'set'}")?;
        }
        self.tree.finish();
        Ok(())
    }

    fn parse_formal_parameters(&mut self) -> PResult<()> {
        self.tree.start(Rule::FormalParameters);
        self.expect(TokenKind::LParen)?;
        if !self.at(TokenKind::RParen) {
            loop {
                self.tree.start(Rule::FormalParameter);
                self.parse_modifiers()?;
                self.parse_type_ref()?;
                self.expect_ident()?;
                self.tree.finish();
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        self.tree.finish();
        Ok(())
    }

    fn parse_interface_declaration(&mut self) -> PResult<()> {
        self.tree.start(Rule::InterfaceDeclaration);
        self.bump();
        self.expect_ident()?;
        if self.eat(TokenKind::Extends) {
            self.parse_type_list()?;
        }
        self.tree.start(Rule::InterfaceBody);
        if self.expect(TokenKind::LBrace)? {
            while !self.at(TokenKind::RBrace) && !self.at_eof() {
                let start = self.pos;
                if !self.eat(TokenKind::Semi) {
                    self.parse_interface_method()?;
                }
                self.guard_progress(start);
            }
            self.expect(TokenKind::RBrace)?;
        }
        self.tree.finish();
        self.tree.finish();
        Ok(())
    }

    fn parse_interface_method(&mut self) -> PResult<()> {
        self.tree.start(Rule::InterfaceMethodDeclaration);
        self.parse_modifiers()?;
        if !self.eat(TokenKind::Void) {
            self.parse_type_ref()?;
        }
        self.expect_ident()?;
        self.parse_formal_parameters()?;
        self.expect(TokenKind::Semi)?;
        self.tree.finish();
        Ok(())
    }

    fn parse_enum_declaration(&mut self) -> PResult<()> {
        self.tree.start(Rule::EnumDeclaration);
        self.bump();
        self.expect_ident()?;
        if self.expect(TokenKind::LBrace)? {
            if self.at_ident() {
                loop {
                    self.expect_ident()?;
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RBrace)?;
        }
        self.tree.finish();
        Ok(())
    }

    /// `Name<Args>.Name[]...`
    pub(super) fn parse_type_ref(&mut self) -> PResult<()> {
        self.tree.start(Rule::TypeRef);
        self.parse_type_name()?;
        while self.at(TokenKind::Dot) && self.is_type_name(1) {
            self.bump();
            self.parse_type_name()?;
        }
        while self.at(TokenKind::LBrack) && self.nth_kind(1) == TokenKind::RBrack {
            self.bump_n(2);
        }
        self.tree.finish();
        Ok(())
    }

    pub(super) fn parse_type_name(&mut self) -> PResult<()> {
        if self.is_type_name(0) {
            self.bump();
        } else {
            self.expect_ident()?;
        }
        if self.at(TokenKind::Lt) {
            self.tree.start(Rule::TypeArguments);
            self.bump();
            self.parse_type_list()?;
            self.expect(TokenKind::Gt)?;
            self.tree.finish();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{messages, parser};
    use crate::grammar::tree::Rule;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_class_with_members() {
        let src = r#"
@IsTest(SeeAllData=false)
global with sharing class Accounts extends Base implements Api.Handler, Comparable {
    public static final Integer MAX = 10, MIN = 0;
    private Map<Id, List<Account>> byOwner = new Map<Id, List<Account>>();
    public String name { get; private set; }
    public Integer size { get { return byOwner.size(); } }
    static { MAX.format(); }
    public Accounts() { this(null); }
    public Accounts(String name) { super(name); }
    public override Integer compareTo(Object other) { return 0; }
    public abstract void run();
    @TestVisible
    private class Inner { }
    public enum Color { RED, GREEN }
    public interface Visitor { void visit(Account a); String name(); }
    ;
}
"#;
        let mut p = parser(src);
        let tree = p.compilation_unit().unwrap();
        assert_eq!(messages(&mut p), Vec::<String>::new());
        assert_eq!(tree.find_all(Rule::ConstructorDeclaration).len(), 2);
        assert_eq!(tree.find_all(Rule::PropertyDeclaration).len(), 2);
        assert_eq!(tree.find_all(Rule::MethodDeclaration).len(), 2);
        assert_eq!(tree.find_all(Rule::InterfaceMethodDeclaration).len(), 2);
        assert_eq!(tree.find_all(Rule::FieldDeclaration).len(), 2);
        assert_eq!(tree.find_all(Rule::EnumDeclaration).len(), 1);
    }

    #[test]
    fn test_keywords_in_any_case() {
        let mut p = parser("Public CLASS Hello { PRIVATE Integer x; }");
        p.compilation_unit().unwrap();
        assert_eq!(p.syntax_error_count(), 0);
    }

    #[test]
    fn test_trigger_unit() {
        let src = r#"
trigger AccountTrigger on Account (before insert, after update) {
    for (Account a : Trigger.new) {
        if (Trigger.isBefore) { a.Name = a.Name.trim(); }
    }
    private static void helper() { }
    AccountHandler.run(Trigger.newMap);
}
"#;
        let mut p = parser(src);
        let tree = p.trigger_unit().unwrap();
        assert_eq!(messages(&mut p), Vec::<String>::new());
        assert_eq!(tree.rule(), Rule::TriggerUnit);
        assert_eq!(tree.find_all(Rule::TriggerCase).len(), 2);
        assert_eq!(tree.find_all(Rule::MethodDeclaration).len(), 1);
    }

    #[test]
    fn test_trigger_with_bad_event() {
        let mut p = parser("trigger T on Account (before upsert) { }");
        p.trigger_unit().unwrap();
        assert_eq!(
            messages(&mut p),
            vec![
                "1:30 mismatched input 'upsert' expecting {'insert', 'update', 'delete', 'undelete'}"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_anonymous_unit_mixes_statements_and_members() {
        let src = r#"
Integer count = 0;
public class Local { }
Integer twice(Integer x) { return x * 2; }
System.debug(twice(count));
"#;
        let mut p = parser(src);
        let tree = p.anonymous_unit().unwrap();
        assert_eq!(messages(&mut p), Vec::<String>::new());
        assert_eq!(tree.rule(), Rule::AnonymousUnit);
        assert_eq!(tree.find_all(Rule::AnonymousBlockMember).len(), 4);
        assert_eq!(tree.find_all(Rule::ClassDeclaration).len(), 1);
        assert_eq!(tree.find_all(Rule::MethodDeclaration).len(), 1);
    }

    #[test]
    fn test_missing_member_name() {
        let mut p = parser("class A {\n  Integer ;\n}");
        p.compilation_unit().unwrap();
        assert_eq!(
            messages(&mut p),
            vec!["2:11 missing Identifier at ';'".to_string()]
        );
    }
}
