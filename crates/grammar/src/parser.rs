// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error-tolerant LogQL parser
//!
//! Recursive descent over the token stream from [`crate::lexer`]. The parser
//! never fails. Input it cannot fit into the grammar is represented with
//! [`NodeKind::Error`] nodes:
//!
//! - a required element that is absent becomes a zero-width error at the end
//!   of the last consumed token
//! - a token that cannot appear where it stands is wrapped in a non-zero-width
//!   error that keeps the token as a child when it is a named leaf
//!
//! Completion relies on the exact position of these error nodes, so every
//! recovery point below is deliberate about where it reports.

use tracing::trace;

use crate::kind::NodeKind;
use crate::lexer::{Span, Token, TokenKind, lex};
use crate::tree::{RawNode, Tree};

/// Range aggregation functions, `rate({..}[5m])`
pub const RANGE_OPS: &[&str] = &[
    "count_over_time",
    "rate",
    "rate_counter",
    "bytes_over_time",
    "bytes_rate",
    "avg_over_time",
    "sum_over_time",
    "min_over_time",
    "max_over_time",
    "stddev_over_time",
    "stdvar_over_time",
    "quantile_over_time",
    "first_over_time",
    "last_over_time",
    "absent_over_time",
];

/// Vector aggregation operators, `sum by (job) (..)`
pub const VECTOR_OPS: &[&str] = &[
    "sum", "avg", "count", "max", "min", "stddev", "stdvar", "bottomk", "topk", "sort", "sort_desc",
];

/// Conversion functions accepted by `| unwrap`
pub const CONV_OPS: &[&str] = &["bytes", "duration", "duration_seconds"];

/// Deepest metric expression nesting parsed before the rest of the input is
/// swallowed into one error node
pub const MAX_NESTING: usize = 128;

pub(crate) fn parse(source: &str) -> Tree {
    let mut parser = Parser::new(source);
    let root = parser.parse_top();
    Tree::from_raw(root)
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    /// End offset of the last consumed token
    last_end: usize,
    /// Position of the last zero-width error emitted
    last_missing: Option<usize>,
    /// Current metric expression nesting
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            tokens: lex(src),
            pos: 0,
            last_end: 0,
            last_missing: None,
            depth: 0,
        }
    }

    // ------------------------------------------------------------------
    // Token access
    // ------------------------------------------------------------------

    fn current(&self) -> Token {
        self.tokens.get(self.pos).copied().unwrap_or(Token {
            kind: TokenKind::Eof,
            span: Span::new(self.src.len(), self.src.len()),
        })
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn nth(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    fn nth_text(&self, n: usize) -> &'a str {
        self.tokens
            .get(self.pos + n)
            .and_then(|t| self.src.get(t.span.start..t.span.end))
            .unwrap_or("")
    }

    fn peek_text(&self) -> &'a str {
        self.nth_text(0)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.at(TokenKind::Identifier) && self.peek_text() == keyword
    }

    fn at_keyword_in(&self, keywords: &[&str]) -> bool {
        self.at(TokenKind::Identifier) && keywords.contains(&self.peek_text())
    }

    /// Tokens that end the construct being parsed, used to resynchronize
    fn at_sync(&self, closer: TokenKind) -> bool {
        let kind = self.peek();
        kind != closer
            && matches!(
                kind,
                TokenKind::RBrace
                    | TokenKind::RParen
                    | TokenKind::RBracket
                    | TokenKind::Pipe
                    | TokenKind::PipeExact
                    | TokenKind::PipeMatch
            )
    }

    fn at_stage_end(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Eof
                | TokenKind::Pipe
                | TokenKind::PipeExact
                | TokenKind::PipeMatch
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::LBracket
                | TokenKind::Comma
        )
    }

    fn bump(&mut self) -> Token {
        let token = self.current();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
            self.last_end = token.span.end;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume the current token as a leaf of the given kind
    fn leaf(&mut self, kind: NodeKind) -> RawNode {
        let token = self.bump();
        RawNode::leaf(kind, token.span.start, token.span.end)
    }

    /// Consume the current token as the leaf its token kind maps to
    fn token_leaf(&mut self) -> RawNode {
        let token = self.bump();
        let kind = token.kind.leaf_kind().unwrap_or(NodeKind::Error);
        RawNode::leaf(kind, token.span.start, token.span.end)
    }

    // ------------------------------------------------------------------
    // Recovery
    // ------------------------------------------------------------------

    /// Report a missing element as a zero-width error at the end of the last
    /// consumed token.
    fn missing(&mut self, out: &mut Vec<RawNode>) {
        let at = self.last_end;
        if self.last_missing == Some(at) {
            return;
        }
        trace!(at, found = ?self.peek(), "missing element");
        self.last_missing = Some(at);
        out.push(RawNode::leaf(NodeKind::Error, at, at));
    }

    /// Wrap the current token in an error node.
    fn unexpected(&mut self, out: &mut Vec<RawNode>) {
        let token = self.bump();
        trace!(kind = ?token.kind, start = token.span.start, "unexpected token");
        let children = token
            .kind
            .leaf_kind()
            .map(|kind| RawNode::leaf(kind, token.span.start, token.span.end))
            .into_iter()
            .collect();
        out.push(RawNode {
            kind: NodeKind::Error,
            from: token.span.start,
            to: token.span.end,
            children,
        });
    }

    /// Consume `closer`, skipping anything that does not belong before it.
    fn expect_closing(&mut self, closer: TokenKind, out: &mut Vec<RawNode>) {
        if self.eat(closer) {
            return;
        }
        if self.at(TokenKind::Eof) || self.at_sync(closer) {
            self.missing(out);
            return;
        }

        let from = self.current().span.start;
        let mut skipped = Vec::new();
        while !self.at(TokenKind::Eof) && !self.at(closer) && !self.at_sync(closer) {
            let token = self.bump();
            if let Some(kind) = token.kind.leaf_kind() {
                skipped.push(RawNode::leaf(kind, token.span.start, token.span.end));
            }
        }
        trace!(from, to = self.last_end, ?closer, "skipped tokens");
        out.push(RawNode {
            kind: NodeKind::Error,
            from,
            to: self.last_end,
            children: skipped,
        });

        if !self.eat(closer) {
            self.missing(out);
        }
    }

    /// Wrap every remaining token in one error node.
    fn skip_rest(&mut self, out: &mut Vec<RawNode>) {
        if self.at(TokenKind::Eof) {
            self.missing(out);
            return;
        }

        let from = self.current().span.start;
        let mut rest = Vec::new();
        while !self.at(TokenKind::Eof) {
            let token = self.bump();
            if let Some(kind) = token.kind.leaf_kind() {
                rest.push(RawNode::leaf(kind, token.span.start, token.span.end));
            }
        }
        trace!(from, to = self.last_end, "skipped rest of input");
        out.push(RawNode {
            kind: NodeKind::Error,
            from,
            to: self.last_end,
            children: rest,
        });
    }

    /// Build a node covering the tokens consumed since `start` and its children.
    fn finish(&self, kind: NodeKind, start: usize, children: Vec<RawNode>) -> RawNode {
        let consumed = self.pos > start;
        let (mut from, mut to) = if consumed {
            let from = self.tokens.get(start).map_or(self.last_end, |t| t.span.start);
            (from, self.last_end)
        } else {
            (self.last_end, self.last_end)
        };

        if let (Some(first), Some(last)) = (children.first(), children.last()) {
            if consumed {
                from = from.min(first.from);
                to = to.max(last.to);
            } else {
                from = first.from;
                to = last.to;
            }
        }

        RawNode {
            kind,
            from,
            to,
            children,
        }
    }

    /// Left-nested comma list: `List[List[List[a], b], c]`.
    ///
    /// A comma not followed by an item reports the missing item in `out`,
    /// after the list, unless the next token is `closer`.
    fn parse_list(
        &mut self,
        list_kind: NodeKind,
        closer: Option<TokenKind>,
        out: &mut Vec<RawNode>,
        item: fn(&mut Self) -> RawNode,
    ) {
        let mut list = RawNode::spanning(list_kind, vec![item(self)]);
        while self.eat(TokenKind::Comma) {
            if self.at(TokenKind::Identifier) {
                let next = item(self);
                list = RawNode::spanning(list_kind, vec![list, next]);
                continue;
            }
            out.push(list);
            if closer.is_none_or(|closer| !self.at(closer)) {
                self.missing(out);
            }
            return;
        }
        out.push(list);
    }

    /// A quoted literal, or recovery when it is absent.
    fn parse_string_value(&mut self, out: &mut Vec<RawNode>) {
        match self.peek() {
            TokenKind::String => out.push(self.leaf(NodeKind::String)),
            TokenKind::Eof
            | TokenKind::RBrace
            | TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::Comma
            | TokenKind::Pipe
            | TokenKind::PipeExact
            | TokenKind::PipeMatch => self.missing(out),
            _ => self.unexpected(out),
        }
    }

    // ------------------------------------------------------------------
    // Top level
    // ------------------------------------------------------------------

    fn parse_top(&mut self) -> RawNode {
        let mut children = Vec::new();

        if self.at_expr_start() {
            children.push(self.parse_expr());
        } else if self.at(TokenKind::Eof) {
            self.missing(&mut children);
        }

        if !self.at(TokenKind::Eof) {
            self.skip_rest(&mut children);
        }

        RawNode {
            kind: NodeKind::LogQL,
            from: 0,
            to: self.src.len(),
            children,
        }
    }

    fn at_expr_start(&self) -> bool {
        match self.peek() {
            TokenKind::LBrace | TokenKind::LParen | TokenKind::Number => true,
            TokenKind::Add | TokenKind::Sub => self.nth(1) == TokenKind::Number,
            TokenKind::Identifier => {
                self.at_keyword_in(RANGE_OPS) || self.at_keyword_in(VECTOR_OPS) || self.at_keyword("vector")
            }
            _ => false,
        }
    }

    fn parse_expr(&mut self) -> RawNode {
        let start = self.pos;
        let inner = if self.at(TokenKind::LBrace) {
            self.parse_log_expr()
        } else {
            self.parse_metric_expr()
        };
        self.finish(NodeKind::Expr, start, vec![inner])
    }

    // ------------------------------------------------------------------
    // Log queries
    // ------------------------------------------------------------------

    fn parse_log_expr(&mut self) -> RawNode {
        let start = self.pos;
        let mut children = vec![self.parse_selector()];
        self.parse_pipeline(&mut children);
        self.finish(NodeKind::LogExpr, start, children)
    }

    fn parse_selector(&mut self) -> RawNode {
        let start = self.pos;
        let mut children = Vec::new();
        self.bump();

        if self.at(TokenKind::Identifier) {
            self.parse_list(NodeKind::Matchers, Some(TokenKind::RBrace), &mut children, Self::parse_matcher);
        } else if !self.at(TokenKind::RBrace) {
            self.missing(&mut children);
        }
        self.expect_closing(TokenKind::RBrace, &mut children);

        self.finish(NodeKind::Selector, start, children)
    }

    fn parse_matcher(&mut self) -> RawNode {
        let start = self.pos;
        let mut children = vec![self.leaf(NodeKind::Identifier)];

        match self.peek() {
            TokenKind::Eq | TokenKind::Neq | TokenKind::Re | TokenKind::Nre => {
                children.push(self.token_leaf());
            }
            _ => {
                self.missing(&mut children);
                return self.finish(NodeKind::Matcher, start, children);
            }
        }
        self.parse_string_value(&mut children);

        self.finish(NodeKind::Matcher, start, children)
    }

    fn at_unwrap(&self) -> bool {
        self.at(TokenKind::Pipe) && self.nth(1) == TokenKind::Identifier && self.nth_text(1) == "unwrap"
    }

    /// `PipelineExpr? UnwrapExpr?`
    fn parse_pipeline(&mut self, out: &mut Vec<RawNode>) {
        let start = self.pos;
        let mut stages = Vec::new();

        loop {
            match self.peek() {
                TokenKind::Pipe if !self.at_unwrap() => stages.push(self.parse_pipe_stage()),
                TokenKind::PipeExact | TokenKind::PipeMatch | TokenKind::Neq | TokenKind::Nre => {
                    stages.push(self.parse_line_filters());
                }
                _ => break,
            }
        }

        if !stages.is_empty() {
            out.push(self.finish(NodeKind::PipelineExpr, start, stages));
        }
        if self.at_unwrap() {
            out.push(self.parse_unwrap());
        }
    }

    fn parse_line_filters(&mut self) -> RawNode {
        let start = self.pos;
        let mut filters = Vec::new();
        while matches!(
            self.peek(),
            TokenKind::PipeExact | TokenKind::PipeMatch | TokenKind::Neq | TokenKind::Nre
        ) {
            let filter_start = self.pos;
            let mut children = vec![self.token_leaf()];
            self.parse_string_value(&mut children);
            filters.push(self.finish(NodeKind::LineFilter, filter_start, children));
        }
        let line_filters = self.finish(NodeKind::LineFilters, start, filters);
        self.finish(NodeKind::PipelineStage, start, vec![line_filters])
    }

    fn parse_pipe_stage(&mut self) -> RawNode {
        let start = self.pos;
        let mut children = vec![self.leaf(NodeKind::Pipe)];

        if self.at(TokenKind::Identifier) {
            let stage = match self.peek_text() {
                "logfmt" => Some(self.parse_logfmt()),
                "json" => Some(self.parse_json()),
                "unpack" => Some(self.parse_label_parser(NodeKind::Unpack, false)),
                "regexp" => Some(self.parse_label_parser(NodeKind::Regexp, true)),
                "pattern" => Some(self.parse_label_parser(NodeKind::Pattern, true)),
                "line_format" => Some(self.parse_line_format()),
                "label_format" => Some(self.parse_label_format()),
                "decolorize" => Some(self.leaf(NodeKind::Decolorize)),
                "keep" => Some(self.parse_keep_drop(NodeKind::KeepLabelsExpr)),
                "drop" => Some(self.parse_keep_drop(NodeKind::DropLabelsExpr)),
                _ => self.parse_label_filter(),
            };
            match stage {
                Some(stage) => children.push(stage),
                None => self.unexpected(&mut children),
            }
        } else if self.at_stage_end() {
            self.missing(&mut children);
        } else {
            self.unexpected(&mut children);
        }

        self.finish(NodeKind::PipelineStage, start, children)
    }

    fn parse_logfmt(&mut self) -> RawNode {
        let start = self.pos;
        let mut children = vec![self.leaf(NodeKind::Logfmt)];
        while self.at(TokenKind::ParserFlag) {
            children.push(self.leaf(NodeKind::ParserFlag));
        }

        if self.at(TokenKind::Identifier) {
            self.parse_list(NodeKind::LabelExtractionExpressionList, None, &mut children, Self::parse_extraction);
            self.finish(NodeKind::LogfmtExpressionParser, start, children)
        } else {
            self.finish(NodeKind::LogfmtParser, start, children)
        }
    }

    fn parse_json(&mut self) -> RawNode {
        let start = self.pos;
        let json = self.leaf(NodeKind::Json);

        if self.at(TokenKind::Identifier) {
            let mut children = vec![json];
            self.parse_list(NodeKind::LabelExtractionExpressionList, None, &mut children, Self::parse_extraction);
            self.finish(NodeKind::JsonExpressionParser, start, children)
        } else {
            self.finish(NodeKind::LabelParser, start, vec![json])
        }
    }

    /// `foo` or `foo="expression"`
    fn parse_extraction(&mut self) -> RawNode {
        let start = self.pos;
        let mut children = vec![self.leaf(NodeKind::Identifier)];
        if self.at(TokenKind::Eq) {
            children.push(self.leaf(NodeKind::Eq));
            self.parse_string_value(&mut children);
        }
        self.finish(NodeKind::LabelExtractionExpression, start, children)
    }

    fn parse_label_parser(&mut self, keyword: NodeKind, with_expression: bool) -> RawNode {
        let start = self.pos;
        let mut children = vec![self.leaf(keyword)];
        if with_expression {
            self.parse_string_value(&mut children);
        }
        self.finish(NodeKind::LabelParser, start, children)
    }

    fn parse_line_format(&mut self) -> RawNode {
        let start = self.pos;
        let mut children = vec![self.leaf(NodeKind::LineFormat)];
        self.parse_string_value(&mut children);
        self.finish(NodeKind::LineFormatExpr, start, children)
    }

    fn parse_label_format(&mut self) -> RawNode {
        let start = self.pos;
        let mut children = vec![self.leaf(NodeKind::LabelFormat)];

        if self.at(TokenKind::Identifier) {
            let list_start = self.pos;
            let mut matchers = vec![self.parse_label_format_matcher()];
            while self.eat(TokenKind::Comma) {
                if self.at(TokenKind::Identifier) {
                    matchers.push(self.parse_label_format_matcher());
                } else {
                    self.missing(&mut matchers);
                    break;
                }
            }
            children.push(self.finish(NodeKind::LabelsFormat, list_start, matchers));
        } else {
            self.missing(&mut children);
        }

        self.finish(NodeKind::LabelFormatExpr, start, children)
    }

    /// `dst=src` or `dst="{{ template }}"`
    fn parse_label_format_matcher(&mut self) -> RawNode {
        let start = self.pos;
        let mut children = vec![self.leaf(NodeKind::Identifier)];
        if self.at(TokenKind::Eq) {
            children.push(self.leaf(NodeKind::Eq));
            if self.at(TokenKind::Identifier) {
                children.push(self.leaf(NodeKind::Identifier));
            } else {
                self.parse_string_value(&mut children);
            }
        } else {
            self.missing(&mut children);
        }
        self.finish(NodeKind::LabelFormatMatcher, start, children)
    }

    fn parse_keep_drop(&mut self, expr_kind: NodeKind) -> RawNode {
        let (keyword, list_kind, item): (NodeKind, NodeKind, fn(&mut Self) -> RawNode) =
            if expr_kind == NodeKind::KeepLabelsExpr {
                (NodeKind::Keep, NodeKind::KeepLabels, Self::parse_keep_label)
            } else {
                (NodeKind::Drop, NodeKind::DropLabels, Self::parse_drop_label)
            };

        let start = self.pos;
        let mut children = vec![self.leaf(keyword)];
        if self.at(TokenKind::Identifier) {
            self.parse_list(list_kind, None, &mut children, item);
        } else {
            self.missing(&mut children);
        }
        self.finish(expr_kind, start, children)
    }

    fn parse_keep_label(&mut self) -> RawNode {
        self.parse_label_item(NodeKind::KeepLabel)
    }

    fn parse_drop_label(&mut self) -> RawNode {
        self.parse_label_item(NodeKind::DropLabel)
    }

    /// `name` or `name="value"`
    fn parse_label_item(&mut self, kind: NodeKind) -> RawNode {
        let start = self.pos;
        let inner = match self.nth(1) {
            TokenKind::Eq | TokenKind::Neq | TokenKind::Re | TokenKind::Nre => self.parse_matcher(),
            _ => self.leaf(NodeKind::Identifier),
        };
        self.finish(kind, start, vec![inner])
    }

    /// `level="error"`, `status >= 400`, `duration > 10s`.
    ///
    /// Returns `None` without consuming when the identifier is not followed
    /// by a comparison.
    fn parse_label_filter(&mut self) -> Option<RawNode> {
        let start = self.pos;
        let numeric = matches!(self.nth(2), TokenKind::Number | TokenKind::Duration);
        let inner = match self.nth(1) {
            TokenKind::Eq | TokenKind::Neq if numeric => self.parse_number_filter(),
            TokenKind::Eq | TokenKind::Neq | TokenKind::Re | TokenKind::Nre => self.parse_matcher(),
            TokenKind::Gt | TokenKind::Gte | TokenKind::Lt | TokenKind::Lte | TokenKind::CmpEq => {
                self.parse_number_filter()
            }
            _ => return None,
        };
        Some(self.finish(NodeKind::LabelFilter, start, vec![inner]))
    }

    fn parse_number_filter(&mut self) -> RawNode {
        let start = self.pos;
        let mut children = vec![self.leaf(NodeKind::Identifier), self.token_leaf()];
        match self.peek() {
            TokenKind::Number => children.push(self.leaf(NodeKind::Number)),
            TokenKind::Duration => children.push(self.leaf(NodeKind::Duration)),
            _ if self.at_stage_end() => self.missing(&mut children),
            _ => self.unexpected(&mut children),
        }
        self.finish(NodeKind::NumberFilter, start, children)
    }

    /// `| unwrap label` or `| unwrap bytes(label)`
    fn parse_unwrap(&mut self) -> RawNode {
        let start = self.pos;
        let mut children = vec![self.leaf(NodeKind::Pipe), self.leaf(NodeKind::Unwrap)];

        if self.at_keyword_in(CONV_OPS) && self.nth(1) == TokenKind::LParen {
            children.push(self.leaf(NodeKind::ConvOp));
            self.bump();
            if self.at(TokenKind::Identifier) {
                children.push(self.leaf(NodeKind::Identifier));
            } else {
                self.missing(&mut children);
            }
            self.expect_closing(TokenKind::RParen, &mut children);
        } else if self.at(TokenKind::Identifier) {
            children.push(self.leaf(NodeKind::Identifier));
        } else if self.at_stage_end() {
            self.missing(&mut children);
        } else {
            self.unexpected(&mut children);
        }

        self.finish(NodeKind::UnwrapExpr, start, children)
    }

    /// `[5m]`
    fn parse_range(&mut self) -> RawNode {
        let start = self.pos;
        let mut children = Vec::new();
        self.bump();

        match self.peek() {
            TokenKind::Duration => children.push(self.leaf(NodeKind::Duration)),
            TokenKind::RBracket | TokenKind::Eof => self.missing(&mut children),
            _ => self.unexpected(&mut children),
        }
        self.expect_closing(TokenKind::RBracket, &mut children);

        self.finish(NodeKind::Range, start, children)
    }

    /// `{..}[5m] | ..` or `{..} | .. [5m]`
    fn parse_log_range_expr(&mut self) -> RawNode {
        let start = self.pos;
        let mut children = vec![self.parse_selector()];

        if self.at(TokenKind::LBracket) {
            children.push(self.parse_range());
            self.parse_pipeline(&mut children);
        } else {
            self.parse_pipeline(&mut children);
            if self.at(TokenKind::LBracket) {
                children.push(self.parse_range());
            } else {
                self.missing(&mut children);
            }
        }

        self.finish(NodeKind::LogRangeExpr, start, children)
    }

    // ------------------------------------------------------------------
    // Metric queries
    // ------------------------------------------------------------------

    fn parse_metric_expr(&mut self) -> RawNode {
        self.parse_binary(0)
    }

    /// Precedence climbing, bounded by [`MAX_NESTING`]
    fn parse_binary(&mut self, min_prec: u8) -> RawNode {
        if self.depth >= MAX_NESTING {
            let start = self.pos;
            let mut children = Vec::new();
            self.skip_rest(&mut children);
            return self.finish(NodeKind::MetricExpr, start, children);
        }

        self.depth += 1;
        let expr = self.parse_binary_operands(min_prec);
        self.depth -= 1;
        expr
    }

    fn parse_binary_operands(&mut self, min_prec: u8) -> RawNode {
        let mut lhs = self.parse_metric_operand();

        while let Some((op, prec, right_assoc)) = binary_op(self.peek()) {
            if prec < min_prec {
                break;
            }
            let op = self.leaf(op);
            let next_min = if right_assoc { prec } else { prec + 1 };
            let rhs = self.parse_binary(next_min);
            let bin_op = RawNode::spanning(NodeKind::BinOpExpr, vec![lhs, op, rhs]);
            lhs = RawNode::spanning(NodeKind::MetricExpr, vec![bin_op]);
        }

        lhs
    }

    /// A single metric operand wrapped in `MetricExpr`
    fn parse_metric_operand(&mut self) -> RawNode {
        let start = self.pos;
        let inner = match self.peek() {
            TokenKind::Identifier if self.at_keyword_in(RANGE_OPS) => self.parse_range_aggregation(),
            TokenKind::Identifier if self.at_keyword_in(VECTOR_OPS) => self.parse_vector_aggregation(),
            TokenKind::Identifier if self.at_keyword("vector") => self.parse_vector_expr(),
            TokenKind::Number | TokenKind::Add | TokenKind::Sub => self.parse_literal(),
            TokenKind::LParen => self.parse_parenthesis(),
            TokenKind::Eof | TokenKind::RParen | TokenKind::Comma => {
                let mut children = Vec::new();
                self.missing(&mut children);
                self.finish(NodeKind::LiteralExpr, start, children)
            }
            _ => {
                let mut children = Vec::new();
                self.unexpected(&mut children);
                self.finish(NodeKind::LiteralExpr, start, children)
            }
        };
        self.finish(NodeKind::MetricExpr, start, vec![inner])
    }

    fn parse_range_aggregation(&mut self) -> RawNode {
        let start = self.pos;
        let mut children = vec![self.leaf(NodeKind::RangeOp)];
        if !self.eat(TokenKind::LParen) {
            self.missing(&mut children);
            return self.finish(NodeKind::RangeAggregationExpr, start, children);
        }

        if self.at(TokenKind::Number) && self.nth(1) == TokenKind::Comma {
            children.push(self.leaf(NodeKind::Number));
            self.bump();
        }

        match self.peek() {
            TokenKind::LBrace => children.push(self.parse_log_range_expr()),
            TokenKind::RParen | TokenKind::Eof => self.missing(&mut children),
            _ => self.unexpected(&mut children),
        }
        self.expect_closing(TokenKind::RParen, &mut children);

        if self.at_keyword("by") || self.at_keyword("without") {
            children.push(self.parse_grouping());
        }

        self.finish(NodeKind::RangeAggregationExpr, start, children)
    }

    fn parse_vector_aggregation(&mut self) -> RawNode {
        let start = self.pos;
        let mut children = vec![self.leaf(NodeKind::VectorOp)];

        if self.at_keyword("by") || self.at_keyword("without") {
            children.push(self.parse_grouping());
        }
        if !self.eat(TokenKind::LParen) {
            self.missing(&mut children);
            return self.finish(NodeKind::VectorAggregationExpr, start, children);
        }

        if self.at(TokenKind::Number) && self.nth(1) == TokenKind::Comma {
            children.push(self.leaf(NodeKind::Number));
            self.bump();
        }

        children.push(self.parse_metric_expr());
        self.expect_closing(TokenKind::RParen, &mut children);

        if self.at_keyword("by") || self.at_keyword("without") {
            children.push(self.parse_grouping());
        }

        self.finish(NodeKind::VectorAggregationExpr, start, children)
    }

    /// `by (a, b)` or `without (a)`
    fn parse_grouping(&mut self) -> RawNode {
        let start = self.pos;
        let keyword = if self.at_keyword("by") {
            NodeKind::By
        } else {
            NodeKind::Without
        };
        let mut children = vec![self.leaf(keyword)];

        if !self.eat(TokenKind::LParen) {
            self.missing(&mut children);
            return self.finish(NodeKind::Grouping, start, children);
        }
        if self.at(TokenKind::Identifier) {
            self.parse_list(NodeKind::Labels, Some(TokenKind::RParen), &mut children, |p| {
                p.leaf(NodeKind::Identifier)
            });
        }
        self.expect_closing(TokenKind::RParen, &mut children);

        self.finish(NodeKind::Grouping, start, children)
    }

    fn parse_vector_expr(&mut self) -> RawNode {
        let start = self.pos;
        let mut children = vec![self.leaf(NodeKind::Vector)];
        if !self.eat(TokenKind::LParen) {
            self.missing(&mut children);
            return self.finish(NodeKind::VectorExpr, start, children);
        }
        if self.at(TokenKind::Number) {
            children.push(self.leaf(NodeKind::Number));
        } else {
            self.missing(&mut children);
        }
        self.expect_closing(TokenKind::RParen, &mut children);
        self.finish(NodeKind::VectorExpr, start, children)
    }

    fn parse_literal(&mut self) -> RawNode {
        let start = self.pos;
        let mut children = Vec::new();
        if matches!(self.peek(), TokenKind::Add | TokenKind::Sub) {
            children.push(self.token_leaf());
        }
        if self.at(TokenKind::Number) {
            children.push(self.leaf(NodeKind::Number));
        } else {
            self.missing(&mut children);
        }
        self.finish(NodeKind::LiteralExpr, start, children)
    }

    fn parse_parenthesis(&mut self) -> RawNode {
        let start = self.pos;
        self.bump();
        let mut children = vec![self.parse_metric_expr()];
        self.expect_closing(TokenKind::RParen, &mut children);
        self.finish(NodeKind::ParenthesisExpr, start, children)
    }
}

/// Binary operator kind, precedence and right associativity
fn binary_op(kind: TokenKind) -> Option<(NodeKind, u8, bool)> {
    let op = match kind {
        TokenKind::Add => (NodeKind::Add, 1, false),
        TokenKind::Sub => (NodeKind::Sub, 1, false),
        TokenKind::Mul => (NodeKind::Mul, 2, false),
        TokenKind::Div => (NodeKind::Div, 2, false),
        TokenKind::Mod => (NodeKind::Mod, 2, false),
        TokenKind::Pow => (NodeKind::Pow, 3, true),
        _ => return None,
    };
    Some(op)
}
