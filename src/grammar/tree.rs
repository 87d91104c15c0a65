//! Parse trees returned by the parser's entry points.

use super::token::{Token, TokenKind};

/// Grammar rule a tree node was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    CompilationUnit,
    TriggerUnit,
    AnonymousUnit,
    TypeDeclaration,
    ClassDeclaration,
    InterfaceDeclaration,
    EnumDeclaration,
    ClassBody,
    ClassBodyDeclaration,
    InterfaceBody,
    InterfaceMethodDeclaration,
    Modifier,
    Annotation,
    ElementValue,
    MethodDeclaration,
    ConstructorDeclaration,
    FieldDeclaration,
    PropertyDeclaration,
    PropertyAccessor,
    FormalParameters,
    FormalParameter,
    VariableDeclarator,
    TypeRef,
    TypeArguments,
    QualifiedName,
    TriggerCase,
    TriggerBlock,
    TriggerBlockMember,
    AnonymousBlockMember,

    Block,
    Statement,
    LocalVariableDeclaration,
    IfStatement,
    SwitchStatement,
    WhenControl,
    WhenValue,
    WhenLiteral,
    ForStatement,
    ForControl,
    WhileStatement,
    DoWhileStatement,
    TryStatement,
    CatchClause,
    FinallyBlock,
    ReturnStatement,
    ThrowStatement,
    BreakStatement,
    ContinueStatement,
    DmlStatement,
    AccessLevel,
    RunAsStatement,
    ExpressionStatement,

    Expression,
    ParExpression,
    PrimaryExpression,
    Literal,
    MethodCall,
    Arguments,
    DotExpression,
    ArrayExpression,
    PostOpExpression,
    PreOpExpression,
    NegExpression,
    CastExpression,
    NewExpression,
    Creator,
    ArrayInitializer,
    MapInitializer,
    Arth1Expression,
    Arth2Expression,
    BitExpression,
    CmpExpression,
    InstanceOfExpression,
    EqualityExpression,
    BitAndExpression,
    BitNotExpression,
    BitOrExpression,
    LogAndExpression,
    LogOrExpression,
    CoalExpression,
    CondExpression,
    AssignExpression,

    SoqlLiteral,
    SoslLiteral,
    Query,
    SelectList,
    SelectEntry,
    SubQuery,
    SoqlFunction,
    FieldName,
    FromClause,
    WhereClause,
    LogicalExpression,
    FieldExpression,
    SoqlValue,
    BoundExpression,
    WithClause,
    GroupByClause,
    OrderByClause,
    LimitClause,
    OffsetClause,
    ForClauses,
    SoslQuery,
}

/// A node child: a sub-rule, a matched token, or a token skipped by error
/// recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    Node(ParseTree),
    Token(Token),
    Error(Token),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    rule: Rule,
    children: Vec<Child>,
}

impl ParseTree {
    pub fn new(rule: Rule) -> Self {
        Self {
            rule,
            children: Vec::new(),
        }
    }

    pub fn rule(&self) -> Rule {
        self.rule
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Direct sub-rule children, in order.
    pub fn nodes(&self) -> impl Iterator<Item = &ParseTree> {
        self.children.iter().filter_map(|c| match c {
            Child::Node(n) => Some(n),
            _ => None,
        })
    }

    /// First direct child produced by `rule`.
    pub fn node(&self, rule: Rule) -> Option<&ParseTree> {
        self.nodes().find(|n| n.rule == rule)
    }

    /// Every node in the subtree produced by `rule`, pre-order.
    pub fn find_all(&self, rule: Rule) -> Vec<&ParseTree> {
        let mut out = Vec::new();
        self.collect(rule, &mut out);
        out
    }

    fn collect<'a>(&'a self, rule: Rule, out: &mut Vec<&'a ParseTree>) {
        if self.rule == rule {
            out.push(self);
        }
        for n in self.nodes() {
            n.collect(rule, out);
        }
    }

    /// Number of tokens skipped by error recovery in the subtree.
    pub fn error_count(&self) -> usize {
        self.children
            .iter()
            .map(|c| match c {
                Child::Node(n) => n.error_count(),
                Child::Error(_) => 1,
                Child::Token(_) => 0,
            })
            .sum()
    }

    /// Concatenated text of the matched tokens, without hidden tokens.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        for c in &self.children {
            match c {
                Child::Node(n) => n.push_text(out),
                Child::Token(t) | Child::Error(t) => {
                    if t.kind != TokenKind::Eof {
                        out.push_str(&t.text);
                    }
                }
            }
        }
    }
}

impl Drop for ParseTree {
    // Iterative, so deeply nested trees do not overflow the stack on drop.
    fn drop(&mut self) {
        let mut pending: Vec<ParseTree> = Vec::new();
        let take = |children: &mut Vec<Child>, pending: &mut Vec<ParseTree>| {
            pending.extend(children.drain(..).filter_map(|c| match c {
                Child::Node(n) => Some(n),
                _ => None,
            }));
        };
        take(&mut self.children, &mut pending);
        while let Some(mut node) = pending.pop() {
            take(&mut node.children, &mut pending);
        }
    }
}

/// Incremental builder used by the parser.
///
/// Frames are opened and closed as rules are entered and left. A checkpoint
/// lets a rule wrap children that were already parsed, which is how
/// left-recursive binary expressions are built.
#[derive(Debug)]
pub(crate) struct TreeBuilder {
    stack: Vec<ParseTree>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self {
            // Sentinel frame collecting the root.
            stack: vec![ParseTree::new(Rule::CompilationUnit)],
        }
    }
}

impl TreeBuilder {
    pub fn start(&mut self, rule: Rule) {
        self.stack.push(ParseTree::new(rule));
    }

    pub fn checkpoint(&self) -> usize {
        self.stack.last().map_or(0, |f| f.children.len())
    }

    /// Opens `rule` around the children added since `checkpoint`.
    pub fn start_at(&mut self, checkpoint: usize, rule: Rule) {
        let mut node = ParseTree::new(rule);
        if let Some(top) = self.stack.last_mut() {
            let at = checkpoint.min(top.children.len());
            node.children = top.children.split_off(at);
        }
        self.stack.push(node);
    }

    pub fn finish(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        if let Some(node) = self.stack.pop() {
            if let Some(parent) = self.stack.last_mut() {
                parent.children.push(Child::Node(node));
            }
        }
    }

    pub fn token(&mut self, tok: Token) {
        if let Some(top) = self.stack.last_mut() {
            top.children.push(Child::Token(tok));
        }
    }

    pub fn error(&mut self, tok: Token) {
        if let Some(top) = self.stack.last_mut() {
            top.children.push(Child::Error(tok));
        }
    }

    /// Closes any open frame and returns the root node.
    pub fn finish_root(mut self) -> ParseTree {
        while self.stack.len() > 1 {
            self.finish();
        }
        self.stack
            .pop()
            .and_then(|mut sentinel| {
                std::mem::take(&mut sentinel.children).into_iter().find_map(|c| match c {
                    Child::Node(n) => Some(n),
                    _ => None,
                })
            })
            .unwrap_or_else(|| ParseTree::new(Rule::CompilationUnit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::token::Channel;

    fn tok(kind: TokenKind, text: &str) -> Token {
        Token {
            kind,
            text: text.into(),
            word: String::new(),
            channel: Channel::Default,
            line: 1,
            column: 1,
            start: 0,
            stop: 0,
            index: 0,
        }
    }

    #[test]
    fn test_checkpoint_wraps_previous_children() {
        let mut b = TreeBuilder::default();
        b.start(Rule::Expression);
        let cp = b.checkpoint();
        b.start(Rule::PrimaryExpression);
        b.token(tok(TokenKind::Identifier, "a"));
        b.finish();
        b.start_at(cp, Rule::Arth2Expression);
        b.token(tok(TokenKind::Add, "+"));
        b.start(Rule::PrimaryExpression);
        b.token(tok(TokenKind::IntegerLiteral, "1"));
        b.finish();
        b.finish();
        b.finish();
        let root = b.finish_root();
        assert_eq!(root.rule(), Rule::Expression);
        let sum = root.node(Rule::Arth2Expression).unwrap();
        assert_eq!(sum.nodes().count(), 2);
        assert_eq!(root.text(), "a+1");
        assert_eq!(root.find_all(Rule::PrimaryExpression).len(), 2);
    }

    #[test]
    fn test_error_tokens_are_counted_and_kept_in_text() {
        let mut b = TreeBuilder::default();
        b.start(Rule::Block);
        b.error(tok(TokenKind::Semi, ";"));
        b.token(tok(TokenKind::Eof, "<EOF>"));
        let root = b.finish_root();
        assert_eq!(root.error_count(), 1);
        assert_eq!(root.text(), ";");
    }

    #[test]
    fn test_deep_tree_drops_without_recursion() {
        let mut b = TreeBuilder::default();
        for _ in 0..200_000 {
            b.start(Rule::ParExpression);
        }
        b.token(tok(TokenKind::IntegerLiteral, "1"));
        let root = b.finish_root();
        assert_eq!(root.rule(), Rule::ParExpression);
        drop(root);
    }
}
