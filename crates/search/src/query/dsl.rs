//! Query expression tree.
//!
//! [`Query`] is an immutable value. Composite variants own their children,
//! so building a query never touches another one and a query can be reused
//! for any number of requests.
//!
//! ```
//! use helios_search::query::{ChildScoreMode, Query};
//!
//! let by_name = Query::match_text("productName", "android");
//! let cheap = Query::range("skuPrice", 0, 100);
//! let both = Query::bool_must(vec![by_name.clone(), cheap]);
//!
//! let nested = Query::nested(
//!     "user",
//!     Query::bool_must(vec![
//!         Query::match_text("user.first", "John"),
//!         Query::match_text("user.last", "Smith"),
//!     ]),
//!     ChildScoreMode::Avg,
//! );
//!
//! assert_eq!(both.to_dsl()["bool"]["must"][0], by_name.to_dsl());
//! assert_eq!(nested.to_dsl()["nested"]["score_mode"], "avg");
//! ```

use std::fmt;
use std::ops::Bound;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value, json};

/// How matching child documents contribute to the parent score in a
/// [`Query::Nested`] query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildScoreMode {
    /// Children do not contribute.
    None,
    /// Mean of the child scores.
    #[default]
    Avg,
    /// Highest child score.
    Max,
    /// Lowest child score.
    Min,
    /// Sum of the child scores.
    Sum,
}

impl ChildScoreMode {
    /// Engine name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChildScoreMode::None => "none",
            ChildScoreMode::Avg => "avg",
            ChildScoreMode::Max => "max",
            ChildScoreMode::Min => "min",
            ChildScoreMode::Sum => "sum",
        }
    }
}

impl fmt::Display for ChildScoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A search query.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Query {
    /// Every document in the index.
    #[default]
    MatchAll,

    /// Analyzed full-text match on one field.
    Match {
        /// Field to search.
        field: String,
        /// Text analyzed into the terms to match.
        text: String,
    },

    /// Analyzed full-text match on any of several fields.
    MultiMatch {
        /// Fields to search.
        fields: Vec<String>,
        /// Text analyzed into the terms to match.
        text: String,
    },

    /// Phrase match where the last term is treated as a prefix.
    MatchPhrasePrefix {
        /// Field to search.
        field: String,
        /// Phrase whose last term may be incomplete.
        text: String,
    },

    /// Documents whose key is in the list.
    Ids {
        /// Document keys.
        values: Vec<String>,
    },

    /// Exact, unanalyzed match on one field.
    Term {
        /// Field to search.
        field: String,
        /// Value compared as is.
        value: Value,
    },

    /// Edit-distance tolerant match.
    Fuzzy {
        /// Field to search.
        field: String,
        /// Term to approximate.
        value: String,
        /// Maximum edit distance. `None` uses the engine default (`AUTO`).
        fuzziness: Option<String>,
    },

    /// Values between two bounds.
    Range {
        /// Field to compare.
        field: String,
        /// Lower bound; `Unbounded` leaves it open.
        lower: Bound<Value>,
        /// Upper bound; `Unbounded` leaves it open.
        upper: Bound<Value>,
    },

    /// Glob pattern (`*`, `?`) on one field.
    Wildcard {
        /// Field to search.
        field: String,
        /// Pattern matched against unanalyzed terms.
        pattern: String,
    },

    /// Runs a filter without scoring and gives every match the same score.
    ConstantScore {
        /// Query run in filter context.
        filter: Box<Query>,
        /// Score given to every match.
        boost: f64,
    },

    /// Best-scoring sub-query wins; other matching sub-queries add
    /// `tie_breaker` times their score.
    DisMax {
        /// Competing sub-queries.
        queries: Vec<Query>,
        /// Weight of the non-winning sub-query scores, between 0 and 1.
        tie_breaker: f64,
        /// Multiplier on the final score.
        boost: Option<f64>,
    },

    /// Lucene query syntax (`+required -excluded "a phrase"`).
    QueryString {
        /// The expression.
        query: String,
        /// Field searched by terms without a field prefix.
        default_field: Option<String>,
    },

    /// Exact term at a token position.
    SpanTerm {
        /// Field to search.
        field: String,
        /// Unanalyzed term.
        value: String,
    },

    /// Span term that must end within the first `end` positions.
    SpanFirst {
        /// Field to search.
        field: String,
        /// Unanalyzed term.
        value: String,
        /// Last allowed end position.
        end: u32,
    },

    /// All sub-queries must match.
    Bool {
        /// Required sub-queries.
        must: Vec<Query>,
    },

    /// Runs a query against each object of a nested field.
    Nested {
        /// Path of the nested field.
        path: String,
        /// Query applied to each nested object.
        query: Box<Query>,
        /// How child scores combine into the parent score.
        score_mode: ChildScoreMode,
    },
}

impl Query {
    /// Matches every document.
    pub fn match_all() -> Self {
        Query::MatchAll
    }

    /// Analyzed match of `text` on `field`.
    pub fn match_text(field: impl Into<String>, text: impl Into<String>) -> Self {
        Query::Match {
            field: field.into(),
            text: text.into(),
        }
    }

    /// Analyzed match of `text` on any of `fields`.
    pub fn multi_match<I, S>(fields: I, text: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Query::MultiMatch {
            fields: fields.into_iter().map(Into::into).collect(),
            text: text.into(),
        }
    }

    /// Phrase match of `text` on `field` with a prefix last term.
    pub fn match_phrase_prefix(field: impl Into<String>, text: impl Into<String>) -> Self {
        Query::MatchPhrasePrefix {
            field: field.into(),
            text: text.into(),
        }
    }

    /// Matches the documents stored under `values`.
    pub fn ids<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Query::Ids {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact match of `value` on `field`.
    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Fuzzy match with the engine default edit distance.
    pub fn fuzzy(field: impl Into<String>, value: impl Into<String>) -> Self {
        Query::Fuzzy {
            field: field.into(),
            value: value.into(),
            fuzziness: None,
        }
    }

    /// Fuzzy match with an explicit maximum edit distance (`0`, `1`, `2` or
    /// `AUTO`).
    pub fn fuzzy_with(
        field: impl Into<String>,
        value: impl Into<String>,
        fuzziness: impl Into<String>,
    ) -> Self {
        Query::Fuzzy {
            field: field.into(),
            value: value.into(),
            fuzziness: Some(fuzziness.into()),
        }
    }

    /// Inclusive range `from..=to`.
    pub fn range(field: impl Into<String>, from: impl Into<Value>, to: impl Into<Value>) -> Self {
        Query::Range {
            field: field.into(),
            lower: Bound::Included(from.into()),
            upper: Bound::Included(to.into()),
        }
    }

    /// Range with explicit bounds. Either side may be open.
    pub fn range_bounds(
        field: impl Into<String>,
        lower: Bound<Value>,
        upper: Bound<Value>,
    ) -> Self {
        Query::Range {
            field: field.into(),
            lower,
            upper,
        }
    }

    /// Glob match of `pattern` on `field`.
    pub fn wildcard(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Query::Wildcard {
            field: field.into(),
            pattern: pattern.into(),
        }
    }

    /// Scores every match of `filter` as `boost`.
    pub fn constant_score(filter: Query, boost: f64) -> Self {
        Query::ConstantScore {
            filter: Box::new(filter),
            boost,
        }
    }

    /// Constant-score query over a term filter.
    pub fn constant_score_term(
        field: impl Into<String>,
        value: impl Into<Value>,
        boost: f64,
    ) -> Self {
        Self::constant_score(Self::term(field, value), boost)
    }

    /// Disjunction scored by the best matching sub-query.
    pub fn dis_max(queries: Vec<Query>, tie_breaker: f64, boost: Option<f64>) -> Self {
        Query::DisMax {
            queries,
            tie_breaker,
            boost,
        }
    }

    /// Lucene-syntax query over the default fields.
    pub fn query_string(query: impl Into<String>) -> Self {
        Query::QueryString {
            query: query.into(),
            default_field: None,
        }
    }

    /// Query string whose unqualified terms search `default_field`.
    pub fn query_string_in(default_field: impl Into<String>, query: impl Into<String>) -> Self {
        Query::QueryString {
            query: query.into(),
            default_field: Some(default_field.into()),
        }
    }

    /// Span query for a single unanalyzed term.
    pub fn span_term(field: impl Into<String>, value: impl Into<String>) -> Self {
        Query::SpanTerm {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Span term ending within the first `end` positions of `field`.
    pub fn span_first(field: impl Into<String>, value: impl Into<String>, end: u32) -> Self {
        Query::SpanFirst {
            field: field.into(),
            value: value.into(),
            end,
        }
    }

    /// Conjunction of `must`.
    pub fn bool_must(must: Vec<Query>) -> Self {
        Query::Bool { must }
    }

    /// Runs `query` against each object at the nested `path`.
    pub fn nested(path: impl Into<String>, query: Query, score_mode: ChildScoreMode) -> Self {
        Query::Nested {
            path: path.into(),
            query: Box::new(query),
            score_mode,
        }
    }

    /// Short name of the variant, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Query::MatchAll => "match_all",
            Query::Match { .. } => "match",
            Query::MultiMatch { .. } => "multi_match",
            Query::MatchPhrasePrefix { .. } => "match_phrase_prefix",
            Query::Ids { .. } => "ids",
            Query::Term { .. } => "term",
            Query::Fuzzy { .. } => "fuzzy",
            Query::Range { .. } => "range",
            Query::Wildcard { .. } => "wildcard",
            Query::ConstantScore { .. } => "constant_score",
            Query::DisMax { .. } => "dis_max",
            Query::QueryString { .. } => "query_string",
            Query::SpanTerm { .. } => "span_term",
            Query::SpanFirst { .. } => "span_first",
            Query::Bool { .. } => "bool",
            Query::Nested { .. } => "nested",
        }
    }

    /// Renders the query as engine Query DSL.
    pub fn to_dsl(&self) -> Value {
        match self {
            Query::MatchAll => json!({ "match_all": {} }),
            Query::Match { field, text } => {
                json!({ "match": keyed(field, json!({ "query": text })) })
            }
            Query::MultiMatch { fields, text } => json!({
                "multi_match": {
                    "query": text,
                    "fields": fields,
                }
            }),
            Query::MatchPhrasePrefix { field, text } => {
                json!({ "match_phrase_prefix": keyed(field, json!({ "query": text })) })
            }
            Query::Ids { values } => json!({ "ids": { "values": values } }),
            Query::Term { field, value } => {
                json!({ "term": keyed(field, json!({ "value": value })) })
            }
            Query::Fuzzy {
                field,
                value,
                fuzziness,
            } => {
                let mut body = json!({ "value": value });
                if let Some(f) = fuzziness {
                    body["fuzziness"] = json!(f);
                }
                json!({ "fuzzy": keyed(field, body) })
            }
            Query::Range {
                field,
                lower,
                upper,
            } => {
                let mut body = Map::new();
                match lower {
                    Bound::Included(v) => {
                        body.insert("gte".to_string(), v.clone());
                    }
                    Bound::Excluded(v) => {
                        body.insert("gt".to_string(), v.clone());
                    }
                    Bound::Unbounded => {}
                }
                match upper {
                    Bound::Included(v) => {
                        body.insert("lte".to_string(), v.clone());
                    }
                    Bound::Excluded(v) => {
                        body.insert("lt".to_string(), v.clone());
                    }
                    Bound::Unbounded => {}
                }
                json!({ "range": keyed(field, Value::Object(body)) })
            }
            Query::Wildcard { field, pattern } => {
                json!({ "wildcard": keyed(field, json!({ "value": pattern })) })
            }
            Query::ConstantScore { filter, boost } => json!({
                "constant_score": {
                    "filter": filter.to_dsl(),
                    "boost": boost,
                }
            }),
            Query::DisMax {
                queries,
                tie_breaker,
                boost,
            } => {
                let mut body = json!({
                    "queries": queries.iter().map(Query::to_dsl).collect::<Vec<_>>(),
                    "tie_breaker": tie_breaker,
                });
                if let Some(b) = boost {
                    body["boost"] = json!(b);
                }
                json!({ "dis_max": body })
            }
            Query::QueryString {
                query,
                default_field,
            } => {
                let mut body = json!({ "query": query });
                if let Some(f) = default_field {
                    body["default_field"] = json!(f);
                }
                json!({ "query_string": body })
            }
            Query::SpanTerm { field, value } => {
                json!({ "span_term": keyed(field, json!({ "value": value })) })
            }
            Query::SpanFirst { field, value, end } => json!({
                "span_first": {
                    "match": { "span_term": keyed(field, json!({ "value": value })) },
                    "end": end,
                }
            }),
            Query::Bool { must } => json!({
                "bool": {
                    "must": must.iter().map(Query::to_dsl).collect::<Vec<_>>(),
                }
            }),
            Query::Nested {
                path,
                query,
                score_mode,
            } => json!({
                "nested": {
                    "path": path,
                    "query": query.to_dsl(),
                    "score_mode": score_mode.as_str(),
                }
            }),
        }
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_dsl().serialize(serializer)
    }
}

/// `{ field: body }`
fn keyed(field: &str, body: Value) -> Value {
    let mut map = Map::new();
    map.insert(field.to_string(), body);
    Value::Object(map)
}
