//! Search request shape shared by every query variant.
//!
//! A [`SearchRequest`] pairs a [`Query`] with an optional pagination window
//! and sort, an optional highlight and an optional histogram aggregation.
//! Each `with_*` method consumes the request and returns a new one.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::dsl::Query;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest value first.
    #[default]
    Asc,
    /// Largest value first.
    Desc,
}

impl SortOrder {
    /// `Desc` when `descending` is true.
    pub fn from_descending(descending: bool) -> Self {
        if descending {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }

    /// Engine name of the direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Single-field sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    /// Field to sort on. Text fields need fielddata or a keyword sub-field.
    pub field: String,
    /// Sort direction.
    pub order: SortOrder,
}

/// Pagination window and sort.
///
/// Fields left as `None` are omitted from the request, so the engine applies
/// its own defaults (first 10 hits, by relevance).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Offset of the first hit.
    pub from: Option<u64>,
    /// Maximum number of hits.
    pub size: Option<u64>,
    /// Sort applied before paging.
    pub sort: Option<SortField>,
}

impl PageRequest {
    /// Window of `size` hits starting at offset `from`.
    pub fn new(from: u64, size: u64) -> Self {
        Self {
            from: Some(from),
            size: Some(size),
            sort: None,
        }
    }

    /// Sorts by `field`.
    pub fn sorted_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(SortField {
            field: field.into(),
            order,
        });
        self
    }

    /// Window and sort in the `(sort field, from, size, descending)` form.
    pub fn sorted_window(field: impl Into<String>, from: u64, size: u64, descending: bool) -> Self {
        Self::new(from, size).sorted_by(field, SortOrder::from_descending(descending))
    }
}

/// Highlighting of one field with caller-chosen markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    /// Field to highlight.
    pub field: String,
    /// Marker inserted before each matched term.
    pub pre_tag: String,
    /// Marker inserted after each matched term.
    pub post_tag: String,
}

impl Highlight {
    /// Highlights `field`, wrapping matches in `pre_tag` and `post_tag`.
    pub fn new(
        field: impl Into<String>,
        pre_tag: impl Into<String>,
        post_tag: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            pre_tag: pre_tag.into(),
            post_tag: post_tag.into(),
        }
    }
}

/// Fixed-interval histogram over a numeric field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramAggregation {
    /// Numeric field to bucket.
    pub field: String,
    /// Width of each bucket.
    pub interval: f64,
}

impl HistogramAggregation {
    /// Buckets `field` into ranges of width `interval`.
    pub fn new(field: impl Into<String>, interval: f64) -> Self {
        Self {
            field: field.into(),
            interval,
        }
    }
}

/// A complete search request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchRequest {
    /// What to match.
    pub query: Query,
    /// Window and sort. Empty by default.
    pub page: PageRequest,
    /// Optional highlighting.
    pub highlight: Option<Highlight>,
    /// Aggregation name and definition.
    pub histogram: Option<(String, HistogramAggregation)>,
}

impl SearchRequest {
    /// Request for `query` with engine defaults for everything else.
    pub fn new(query: Query) -> Self {
        Self {
            query,
            ..Default::default()
        }
    }

    /// Replaces the window and sort.
    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }

    /// Requests highlighted fragments.
    pub fn with_highlight(mut self, highlight: Highlight) -> Self {
        self.highlight = Some(highlight);
        self
    }

    /// Adds a histogram aggregation under `key`.
    pub fn with_histogram(
        mut self,
        key: impl Into<String>,
        aggregation: HistogramAggregation,
    ) -> Self {
        self.histogram = Some((key.into(), aggregation));
        self
    }

    /// Aggregation-only request: no hits are returned.
    pub fn aggregation_only(
        query: Query,
        key: impl Into<String>,
        aggregation: HistogramAggregation,
    ) -> Self {
        Self::new(query)
            .with_page(PageRequest {
                size: Some(0),
                ..Default::default()
            })
            .with_histogram(key, aggregation)
    }

    /// Renders the `_search` request body.
    pub fn to_body(&self) -> Value {
        let mut body = json!({ "query": self.query.to_dsl() });

        if let Some(from) = self.page.from {
            body["from"] = json!(from);
        }
        if let Some(size) = self.page.size {
            body["size"] = json!(size);
        }
        if let Some(ref sort) = self.page.sort {
            body["sort"] = json!([{ sort.field.as_str(): { "order": sort.order.as_str() } }]);
        }

        if let Some(ref highlight) = self.highlight {
            body["highlight"] = json!({
                "fields": {
                    highlight.field.as_str(): {
                        "pre_tags": [highlight.pre_tag],
                        "post_tags": [highlight.post_tag],
                    }
                }
            });
        }

        if let Some((ref key, ref histogram)) = self.histogram {
            body["aggs"] = json!({
                key.as_str(): {
                    "histogram": {
                        "field": histogram.field,
                        "interval": histogram.interval,
                    }
                }
            });
        }

        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window_is_omitted() {
        let body = SearchRequest::new(Query::match_all()).to_body();
        assert_eq!(body, json!({ "query": { "match_all": {} } }));
    }

    #[test]
    fn test_window_and_sort() {
        let request = SearchRequest::new(Query::match_all())
            .with_page(PageRequest::sorted_window("id", 0, 3, true));
        let body = request.to_body();
        assert_eq!(body["from"], 0);
        assert_eq!(body["size"], 3);
        assert_eq!(body["sort"], json!([{ "id": { "order": "desc" } }]));
    }

    #[test]
    fn test_highlight_markers_are_caller_supplied() {
        let body = SearchRequest::new(Query::match_text("skuName", "phone"))
            .with_highlight(Highlight::new("skuName", "<em>", "</em>"))
            .to_body();
        assert_eq!(
            body["highlight"],
            json!({
                "fields": {
                    "skuName": { "pre_tags": ["<em>"], "post_tags": ["</em>"] }
                }
            })
        );
    }

    #[test]
    fn test_aggregation_only_request() {
        let body = SearchRequest::aggregation_only(
            Query::match_text("spuName", "phone"),
            "price_histogram",
            HistogramAggregation::new("skuPrice", 50.0),
        )
        .to_body();

        assert_eq!(body["size"], 0);
        assert!(body.get("from").is_none());
        assert_eq!(
            body["aggs"]["price_histogram"]["histogram"],
            json!({ "field": "skuPrice", "interval": 50.0 })
        );
    }

    #[test]
    fn test_sort_order_from_flag() {
        assert_eq!(SortOrder::from_descending(false), SortOrder::Asc);
        assert_eq!(SortOrder::from_descending(true).as_str(), "desc");
    }
}
