// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Resolver registry
//!
//! An ordered table of ancestor-chain prefixes, each bound to a handler.
//!
//! Dispatch walks the table in declaration order and, within an entry, tries
//! each alternative prefix in order. A prefix matches when it equals the
//! front of the chain; extra ancestors past its length are not checked. The
//! first handler that returns a situation wins, so declaration order alone
//! decides between overlapping prefixes.

use logql_grammar::{Node, NodeKind};
use tracing::{debug, trace};

use crate::error::ContextResult;
use crate::handlers;
use crate::situation::Situation;

/// Handler signature shared by every registry entry
pub type Handler = for<'t> fn(Node<'t>, &str, usize) -> ContextResult<Option<Situation>>;

/// One registry entry
#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    /// Name used in traces
    pub name: &'static str,
    /// Alternative ancestor-chain prefixes, anchor kind first
    pub paths: &'static [&'static [NodeKind]],
    pub handler: Handler,
}

const ERR: NodeKind = NodeKind::Error;

static REGISTRY: &[Resolver] = &[
    Resolver {
        name: "selector",
        paths: &[
            &[NodeKind::Selector],
            &[NodeKind::Matchers],
            &[ERR, NodeKind::Selector],
            &[ERR, NodeKind::Matchers, NodeKind::Selector],
        ],
        handler: handlers::resolve_selector,
    },
    Resolver {
        name: "logfmt",
        paths: &[
            &[NodeKind::LogQL],
            &[NodeKind::RangeAggregationExpr],
            &[ERR, NodeKind::LogRangeExpr, NodeKind::RangeAggregationExpr],
            &[ERR, NodeKind::LogfmtExpressionParser],
            &[ERR, NodeKind::LabelExtractionExpressionList],
            &[NodeKind::LogRangeExpr],
            &[NodeKind::LabelExtractionExpressionList],
            &[NodeKind::LogfmtExpressionParser],
            &[NodeKind::LogfmtParser],
            &[NodeKind::Logfmt],
            &[NodeKind::ParserFlag],
            &[NodeKind::Identifier, NodeKind::LabelExtractionExpression],
            &[NodeKind::String, NodeKind::LabelExtractionExpression],
        ],
        handler: handlers::resolve_logfmt_parser,
    },
    Resolver {
        name: "top_level",
        paths: &[&[NodeKind::LogQL]],
        handler: handlers::resolve_top_level,
    },
    Resolver {
        name: "matcher_value",
        paths: &[&[NodeKind::String, NodeKind::Matcher]],
        handler: handlers::resolve_matcher,
    },
    Resolver {
        name: "grouping",
        paths: &[&[NodeKind::Grouping]],
        handler: handlers::resolve_labels_for_grouping,
    },
    Resolver {
        name: "log_range",
        paths: &[&[NodeKind::LogRangeExpr]],
        handler: handlers::resolve_log_range,
    },
    Resolver {
        name: "matcher_error",
        paths: &[&[ERR, NodeKind::Matcher]],
        handler: handlers::resolve_matcher,
    },
    Resolver {
        name: "durations",
        paths: &[&[ERR, NodeKind::Range]],
        handler: handlers::resolve_durations,
    },
    Resolver {
        name: "log_range_error",
        paths: &[&[ERR, NodeKind::LogRangeExpr]],
        handler: handlers::resolve_log_range_from_error,
    },
    Resolver {
        name: "aggregation",
        paths: &[&[
            ERR,
            NodeKind::LiteralExpr,
            NodeKind::MetricExpr,
            NodeKind::VectorAggregationExpr,
        ]],
        handler: handlers::resolve_in_aggregation,
    },
    Resolver {
        name: "pipe_error",
        paths: &[&[ERR, NodeKind::PipelineStage, NodeKind::PipelineExpr]],
        handler: handlers::resolve_pipe_error,
    },
    Resolver {
        name: "unwrap",
        paths: &[&[ERR, NodeKind::UnwrapExpr], &[NodeKind::UnwrapExpr]],
        handler: handlers::resolve_after_unwrap,
    },
    Resolver {
        name: "keep_drop",
        paths: &[
            &[ERR, NodeKind::DropLabelsExpr],
            &[ERR, NodeKind::DropLabels],
            &[ERR, NodeKind::KeepLabelsExpr],
            &[ERR, NodeKind::KeepLabels],
        ],
        handler: handlers::resolve_after_keep_and_drop,
    },
];

/// The resolver table in priority order
pub fn registry() -> &'static [Resolver] {
    REGISTRY
}

/// Whether `path` equals the front of `chain`
pub fn is_path_match(path: &[NodeKind], chain: &[NodeKind]) -> bool {
    chain.starts_with(path)
}

/// Run `chain` against `registry`, returning the first situation produced
pub fn dispatch_with(
    registry: &[Resolver],
    chain: &[NodeKind],
    node: Node<'_>,
    text: &str,
    pos: usize,
) -> ContextResult<Option<Situation>> {
    for resolver in registry {
        for path in resolver.paths {
            if !is_path_match(path, chain) {
                continue;
            }
            trace!(resolver = resolver.name, ?path, "path matched");
            if let Some(situation) = (resolver.handler)(node, text, pos)? {
                debug!(resolver = resolver.name, ?situation, "situation resolved");
                return Ok(Some(situation));
            }
            trace!(resolver = resolver.name, "handler rejected");
        }
    }
    Ok(None)
}

/// Run `chain` against the built-in registry
pub fn dispatch(
    chain: &[NodeKind],
    node: Node<'_>,
    text: &str,
    pos: usize,
) -> ContextResult<Option<Situation>> {
    dispatch_with(registry(), chain, node, text, pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use logql_grammar::parse;

    fn first<'t>(_: Node<'t>, _: &str, _: usize) -> ContextResult<Option<Situation>> {
        Ok(Some(Situation::InRange))
    }

    fn second<'t>(_: Node<'t>, _: &str, _: usize) -> ContextResult<Option<Situation>> {
        Ok(Some(Situation::InAggregation))
    }

    fn reject<'t>(_: Node<'t>, _: &str, _: usize) -> ContextResult<Option<Situation>> {
        Ok(None)
    }

    const CHAIN: &[NodeKind] = &[NodeKind::Selector, NodeKind::LogExpr, NodeKind::Expr];

    #[test]
    fn test_prefix_match() {
        assert!(is_path_match(&[NodeKind::Selector], CHAIN));
        assert!(is_path_match(&[NodeKind::Selector, NodeKind::LogExpr], CHAIN));
        assert!(is_path_match(&[], CHAIN));
        assert!(!is_path_match(&[NodeKind::LogExpr], CHAIN));
        assert!(!is_path_match(
            &[NodeKind::Selector, NodeKind::LogExpr, NodeKind::Expr, NodeKind::LogQL],
            CHAIN
        ));
    }

    #[test]
    fn test_order_beats_specificity() {
        let tree = parse("{}");
        let node = tree.root();

        let short_first = [
            Resolver {
                name: "short",
                paths: &[&[NodeKind::Selector]],
                handler: first,
            },
            Resolver {
                name: "long",
                paths: &[&[NodeKind::Selector, NodeKind::LogExpr]],
                handler: second,
            },
        ];
        assert_eq!(
            dispatch_with(&short_first, CHAIN, node, "{}", 0),
            Ok(Some(Situation::InRange))
        );

        let long_first = [short_first[1], short_first[0]];
        assert_eq!(
            dispatch_with(&long_first, CHAIN, node, "{}", 0),
            Ok(Some(Situation::InAggregation))
        );
    }

    #[test]
    fn test_rejection_falls_through() {
        let tree = parse("{}");
        let node = tree.root();

        let registry = [
            Resolver {
                name: "reject",
                paths: &[&[NodeKind::Selector]],
                handler: reject,
            },
            Resolver {
                name: "unmatched",
                paths: &[&[NodeKind::LogQL]],
                handler: first,
            },
            Resolver {
                name: "accept",
                paths: &[&[NodeKind::Matchers], &[NodeKind::Selector]],
                handler: second,
            },
        ];
        assert_eq!(
            dispatch_with(&registry, CHAIN, node, "{}", 0),
            Ok(Some(Situation::InAggregation))
        );
        assert_eq!(dispatch_with(&registry[..2], CHAIN, node, "{}", 0), Ok(None));
    }

    #[test]
    fn test_registry_order() {
        let names: Vec<_> = registry().iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "selector",
                "logfmt",
                "top_level",
                "matcher_value",
                "grouping",
                "log_range",
                "matcher_error",
                "durations",
                "log_range_error",
                "aggregation",
                "pipe_error",
                "unwrap",
                "keep_drop",
            ]
        );
    }
}
