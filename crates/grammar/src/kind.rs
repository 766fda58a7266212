// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Node kinds
//!
//! Every node in a LogQL syntax tree carries a [`NodeKind`]. Kinds have stable
//! integer ids; id `0` is reserved for error nodes produced by recovery.

use std::fmt;

macro_rules! node_kinds {
    ($($(#[$doc:meta])* $name:ident = $id:literal,)+) => {
        /// Grammar symbol of a syntax node
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        pub enum NodeKind {
            $($(#[$doc])* $name = $id,)+
        }

        impl NodeKind {
            /// All node kinds, indexed by id
            pub const ALL: &'static [NodeKind] = &[$(NodeKind::$name,)+];

            /// Name of the kind as it appears in tree dumps
            pub fn name(self) -> &'static str {
                match self {
                    $(NodeKind::$name => stringify!($name),)+
                }
            }
        }
    };
}

node_kinds! {
    /// Text the grammar could not fit into any construct
    Error = 0,
    LogQL = 1,
    Expr = 2,
    LogExpr = 3,
    MetricExpr = 4,
    Selector = 5,
    Matchers = 6,
    Matcher = 7,
    Identifier = 8,
    String = 9,
    Eq = 10,
    Neq = 11,
    Re = 12,
    Nre = 13,
    PipelineExpr = 14,
    PipelineStage = 15,
    Pipe = 16,
    LineFilters = 17,
    LineFilter = 18,
    PipeExact = 19,
    PipeMatch = 20,
    LogfmtParser = 21,
    LogfmtExpressionParser = 22,
    Logfmt = 23,
    ParserFlag = 24,
    JsonExpressionParser = 25,
    Json = 26,
    LabelParser = 27,
    Unpack = 28,
    Regexp = 29,
    Pattern = 30,
    LabelExtractionExpressionList = 31,
    LabelExtractionExpression = 32,
    LabelFilter = 33,
    NumberFilter = 34,
    Gt = 35,
    Gte = 36,
    Lt = 37,
    Lte = 38,
    CmpEq = 39,
    Number = 40,
    Duration = 41,
    LineFormatExpr = 42,
    LineFormat = 43,
    LabelFormatExpr = 44,
    LabelFormat = 45,
    LabelsFormat = 46,
    LabelFormatMatcher = 47,
    Decolorize = 48,
    KeepLabelsExpr = 49,
    Keep = 50,
    KeepLabels = 51,
    KeepLabel = 52,
    DropLabelsExpr = 53,
    Drop = 54,
    DropLabels = 55,
    DropLabel = 56,
    UnwrapExpr = 57,
    Unwrap = 58,
    ConvOp = 59,
    Range = 60,
    LogRangeExpr = 61,
    RangeAggregationExpr = 62,
    RangeOp = 63,
    VectorAggregationExpr = 64,
    VectorOp = 65,
    Grouping = 66,
    By = 67,
    Without = 68,
    Labels = 69,
    BinOpExpr = 70,
    Add = 71,
    Sub = 72,
    Mul = 73,
    Div = 74,
    Mod = 75,
    Pow = 76,
    LiteralExpr = 77,
    ParenthesisExpr = 78,
    VectorExpr = 79,
    Vector = 80,
}

impl NodeKind {
    /// Integer grammar-symbol id of this kind
    pub fn id(self) -> u16 {
        self as u16
    }

    /// Look up a kind by its integer id
    pub fn from_id(id: u16) -> Option<NodeKind> {
        Self::ALL.get(id as usize).copied()
    }

    /// Whether this is the error sentinel
    pub fn is_error(self) -> bool {
        self == NodeKind::Error
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_error() {
            write!(f, "⚠")
        } else {
            write!(f, "{}", self.name())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_match_table_index() {
        for (index, kind) in NodeKind::ALL.iter().enumerate() {
            assert_eq!(kind.id() as usize, index, "{} is out of order", kind.name());
            assert_eq!(NodeKind::from_id(kind.id()), Some(*kind));
        }
    }

    #[test]
    fn test_error_is_id_zero() {
        assert_eq!(NodeKind::Error.id(), 0);
        assert!(NodeKind::from_id(0).is_some_and(NodeKind::is_error));
        assert_eq!(NodeKind::from_id(u16::MAX), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(NodeKind::Error.to_string(), "⚠");
        assert_eq!(NodeKind::LogQL.to_string(), "LogQL");
        assert_eq!(NodeKind::LabelExtractionExpressionList.to_string(), "LabelExtractionExpressionList");
    }
}
