#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use esrows::model::{
        DateHistogramSpec, Dimension, MetricOp, MetricRequest, NamedExpression, RangeBucket,
    };
    use esrows::search::SearchBuilder;
    use serde_json::{json, Value};

    fn aggs(builder: &SearchBuilder) -> Value {
        Value::Object(builder.aggregation_body())
    }

    #[test]
    fn test_one_metric_without_grouping() {
        let request = MetricRequest::new(
            vec![],
            vec![NamedExpression::metric("total_sales", MetricOp::Sum, "price")],
        );
        assert_eq!(
            aggs(&SearchBuilder::new(&request)),
            json!({"total_sales": {"sum": {"field": "price"}}})
        );
    }

    #[test]
    fn test_one_aggregation_one_metric() {
        let request = MetricRequest::new(
            vec![Dimension::terms("shop_id")],
            vec![NamedExpression::metric("total_sales", MetricOp::Sum, "price")],
        );
        assert_eq!(
            aggs(&SearchBuilder::new(&request)),
            json!({
                "shop_id": {
                    "terms": {"field": "shop_id"},
                    "aggs": {"total_sales": {"sum": {"field": "price"}}},
                },
            })
        );
    }

    #[test]
    fn test_two_aggregations_two_metrics() {
        let request = MetricRequest::new(
            vec![Dimension::terms("shop_id"), Dimension::terms("client_id")],
            vec![
                NamedExpression::metric("total_sales", MetricOp::Sum, "price"),
                NamedExpression::metric("avg_sales", MetricOp::Avg, "price"),
            ],
        );
        assert_eq!(
            aggs(&SearchBuilder::new(&request)),
            json!({
                "shop_id": {
                    "terms": {"field": "shop_id"},
                    "aggs": {
                        "client_id": {
                            "terms": {"field": "client_id"},
                            "aggs": {
                                "total_sales": {"sum": {"field": "price"}},
                                "avg_sales": {"avg": {"field": "price"}},
                            },
                        },
                    },
                },
            })
        );
    }

    #[test]
    fn test_order_by_lands_on_innermost_terms() {
        let request = MetricRequest::new(
            vec![Dimension::terms("shop_id"), Dimension::terms("client_id")],
            vec![NamedExpression::metric("total_sales", MetricOp::Sum, "price")],
        );
        let body = aggs(&SearchBuilder::new(&request).order_by("total_sales", "desc"));
        assert_eq!(
            body["shop_id"]["aggs"]["client_id"]["terms"],
            json!({"field": "client_id", "order": {"total_sales": "desc"}})
        );
        assert_eq!(body["shop_id"]["terms"], json!({"field": "shop_id"}));
    }

    #[test]
    fn test_sizes_default_and_per_dimension() {
        let request = MetricRequest::new(
            vec![
                Dimension::terms("shop_id").sized(5),
                Dimension::terms("client_id"),
            ],
            vec![NamedExpression::doc_count()],
        );
        let body = aggs(&SearchBuilder::new(&request).default_size(50));
        assert_eq!(body["shop_id"]["terms"]["size"], json!(5));
        assert_eq!(body["shop_id"]["aggs"]["client_id"]["terms"]["size"], json!(50));
    }

    #[test]
    fn test_nested_dimension_and_reverse_nested_bundle() {
        let request = MetricRequest::new(
            vec![
                Dimension::nested("products", "products"),
                Dimension::terms("product_type").stored_as("products.product_type"),
            ],
            vec![
                NamedExpression::metric(
                    "avg_product_price",
                    MetricOp::Avg,
                    "products.product_price",
                ),
                NamedExpression::reverse_nested(
                    "root",
                    vec![NamedExpression::metric("avg_sales", MetricOp::Avg, "price")],
                ),
            ],
        );
        assert_eq!(
            aggs(&SearchBuilder::new(&request)),
            json!({
                "products": {
                    "nested": {"path": "products"},
                    "aggs": {
                        "product_type": {
                            "terms": {"field": "products.product_type"},
                            "aggs": {
                                "avg_product_price": {
                                    "avg": {"field": "products.product_price"},
                                },
                                "reverse_nested_root": {
                                    "reverse_nested": {},
                                    "aggs": {
                                        "avg_sales": {"avg": {"field": "price"}},
                                    },
                                },
                            },
                        },
                    },
                },
            })
        );
    }

    #[test]
    fn test_date_histogram_with_extended_bounds() {
        let spec = DateHistogramSpec::bounded(
            "1d",
            Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2016, 1, 31, 0, 0, 0).unwrap(),
        );
        let request = MetricRequest::new(
            vec![Dimension::date_histogram("timestamp", spec)],
            vec![NamedExpression::metric("total_sales", MetricOp::Sum, "price")],
        );
        assert_eq!(
            aggs(&SearchBuilder::new(&request))["timestamp"]["date_histogram"],
            json!({
                "field": "timestamp",
                "interval": "1d",
                "min_doc_count": 0,
                "extended_bounds": {
                    "min": "2016-01-01T00:00:00",
                    "max": "2016-01-31T00:00:00",
                },
            })
        );
    }

    #[test]
    fn test_keyed_range_rendering() {
        let request = MetricRequest::new(
            vec![Dimension::with_ranges(
                "price_range",
                vec![
                    RangeBucket {
                        from: None,
                        to: Some(json!(50)),
                        key: Some("cheap".to_string()),
                    },
                    RangeBucket {
                        from: Some(json!(50)),
                        to: None,
                        key: Some("expensive".to_string()),
                    },
                ],
            )
            .stored_as("price")],
            vec![NamedExpression::doc_count()],
        );
        assert_eq!(
            aggs(&SearchBuilder::new(&request)),
            json!({
                "price_range": {
                    "range": {
                        "field": "price",
                        "keyed": true,
                        "ranges": [
                            {"to": 50, "key": "cheap"},
                            {"from": 50, "key": "expensive"},
                        ],
                    },
                },
            })
        );
    }

    #[test]
    fn test_filters_rendering() {
        let request = MetricRequest::new(
            vec![Dimension::filters(
                "payment",
                vec![
                    ("cash".to_string(), vec![json!("cash")]),
                    (
                        "deferred".to_string(),
                        vec![json!("wire_transfer"), json!("store_credit")],
                    ),
                ],
            )
            .stored_as("payment_type")],
            vec![NamedExpression::doc_count()],
        );
        assert_eq!(
            aggs(&SearchBuilder::new(&request)),
            json!({
                "payment": {
                    "filters": {
                        "filters": {
                            "cash": {"terms": {"payment_type": ["cash"]}},
                            "deferred": {
                                "terms": {"payment_type": ["wire_transfer", "store_credit"]},
                            },
                        },
                    },
                },
            })
        );
    }

    #[test]
    fn test_search_body_wraps_match_all() {
        let request = MetricRequest::new(
            vec![],
            vec![NamedExpression::metric("total_sales", MetricOp::Sum, "price")],
        );
        let body = SearchBuilder::new(&request).search_body();
        assert_eq!(body["query"], json!({"match_all": {}}));
        assert!(body["aggs"].is_object());
    }
}
