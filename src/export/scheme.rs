//! Paging schemes
//!
//! A scheme decides which query arguments are sent to the page source and
//! which column set the CSV formatters use. It has no behaviour of its own
//! beyond that selection.

use std::sync::Arc;

use bson::{Bson, Document as BsonDocument, doc};
use serde::{Deserialize, Serialize};

use super::formatters::{CsvFormatter, Formatter, JsonArrayFormatter, NicknameCsvFormatter};
use super::lookup::UserLookup;
use super::options::{ExportOptions, OutputFormat};

/// Columns of a search results export
pub const SEARCH_COLUMNS: &[&str] = &[
    "id",
    "title",
    "price",
    "currency_id",
    "available_quantity",
    "sold_quantity",
    "condition",
    "permalink",
    "seller.id",
];

/// Columns of an orders export
pub const ORDER_COLUMNS: &[&str] = &[
    "id",
    "status",
    "date_created",
    "total_amount",
    "currency_id",
    "buyer.id",
    "seller.id",
];

/// Field read from looked-up user documents
const NICKNAME_FIELD: &str = "nickname";

/// Which collection and document shape an export targets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PagingScheme {
    Search,
    Orders,
}

impl PagingScheme {
    /// Regular CSV columns
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            PagingScheme::Search => SEARCH_COLUMNS,
            PagingScheme::Orders => ORDER_COLUMNS,
        }
    }

    /// Field path of the user id resolved for the extra column
    pub fn user_id_path(&self) -> &'static str {
        match self {
            PagingScheme::Search => "seller.id",
            PagingScheme::Orders => "buyer.id",
        }
    }

    /// Header of the extra column
    pub fn extra_column(&self) -> &'static str {
        match self {
            PagingScheme::Search => "seller.nickname",
            PagingScheme::Orders => "buyer.nickname",
        }
    }

    /// Sort order that keeps offsets stable across fetches
    pub fn sort(&self) -> BsonDocument {
        match self {
            PagingScheme::Search => doc! { "_id": 1 },
            PagingScheme::Orders => doc! { "date_created": 1, "_id": 1 },
        }
    }

    /// Select the formatter for `options`
    ///
    /// The extra column only exists for CSV and needs a lookup; without one the
    /// plain column set is used.
    pub fn formatter(
        &self,
        options: &ExportOptions,
        lookup: Option<Arc<dyn UserLookup>>,
    ) -> Box<dyn Formatter> {
        match (options.format, options.include_extra_column, lookup) {
            (OutputFormat::Json, _, _) => Box::new(JsonArrayFormatter::new()),
            (OutputFormat::Csv, true, Some(lookup)) => Box::new(NicknameCsvFormatter::new(
                self.columns().iter().copied(),
                self.extra_column(),
                self.user_id_path(),
                NICKNAME_FIELD,
                lookup,
            )),
            (OutputFormat::Csv, _, _) => {
                Box::new(CsvFormatter::new(self.columns().iter().copied()))
            }
        }
    }
}

/// Arguments of a search results export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchArgs {
    /// Case-insensitive title match
    pub query: Option<String>,
    pub category: Option<String>,
    pub seller_id: Option<i64>,
}

impl SearchArgs {
    /// Query filter for the items collection
    pub fn filter(&self) -> BsonDocument {
        let mut filter = BsonDocument::new();
        if let Some(query) = non_blank(&self.query) {
            filter.insert("title", doc! { "$regex": escape_regex(query), "$options": "i" });
        }
        if let Some(category) = non_blank(&self.category) {
            filter.insert("category_id", category);
        }
        if let Some(seller_id) = self.seller_id {
            filter.insert("seller.id", seller_id);
        }
        filter
    }
}

/// Arguments of an orders export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderArgs {
    pub seller_id: i64,
    /// Accepted statuses; empty means any status
    pub statuses: Vec<String>,
    pub buyer_id: Option<i64>,
}

impl OrderArgs {
    /// Query filter for the orders collection
    pub fn filter(&self) -> BsonDocument {
        let mut filter = doc! { "seller.id": self.seller_id };

        let statuses: Vec<Bson> = self
            .statuses
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(Bson::from)
            .collect();
        if !statuses.is_empty() {
            filter.insert("status", doc! { "$in": statuses });
        }
        if let Some(buyer_id) = self.buyer_id {
            filter.insert("buyer.id", buyer_id);
        }
        filter
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Escape regex metacharacters so the query matches literally
fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if "\\.+*?()|[]{}^$".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_filter_skips_blank_arguments() {
        let args = SearchArgs {
            query: Some("  ".into()),
            category: None,
            seller_id: Some(7),
        };
        assert_eq!(args.filter(), doc! { "seller.id": 7_i64 });
    }

    #[test]
    fn test_search_filter_full() {
        let args = SearchArgs {
            query: Some("usb c".into()),
            category: Some("MLA1051".into()),
            seller_id: None,
        };
        assert_eq!(
            args.filter(),
            doc! {
                "title": { "$regex": "usb c", "$options": "i" },
                "category_id": "MLA1051",
            }
        );
    }

    #[test]
    fn test_escape_regex() {
        assert_eq!(escape_regex("a.b*(c)"), "a\\.b\\*\\(c\\)");
    }

    #[test]
    fn test_order_filter() {
        let args = OrderArgs {
            seller_id: 42,
            statuses: vec!["paid".into(), "".into(), "cancelled".into()],
            buyer_id: Some(9),
        };
        assert_eq!(
            args.filter(),
            doc! {
                "seller.id": 42_i64,
                "status": { "$in": ["paid", "cancelled"] },
                "buyer.id": 9_i64,
            }
        );
    }

    #[test]
    fn test_order_filter_without_statuses() {
        let args = OrderArgs {
            seller_id: 42,
            ..OrderArgs::default()
        };
        assert_eq!(args.filter(), doc! { "seller.id": 42_i64 });
    }

    #[test]
    fn test_extra_column_per_scheme() {
        assert_eq!(PagingScheme::Search.user_id_path(), "seller.id");
        assert_eq!(PagingScheme::Orders.extra_column(), "buyer.nickname");
        assert_eq!(PagingScheme::Orders.columns()[0], "id");
    }
}
