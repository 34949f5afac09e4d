#[cfg(test)]
mod tests {
    use esrows::model::{
        ComputedOp, Dimension, Expression, MetricOp, MetricRequest, NamedExpression,
    };
    use esrows::FlattenError;

    fn sales_request() -> MetricRequest {
        MetricRequest::new(
            vec![Dimension::terms("shop_id")],
            vec![
                NamedExpression::metric("total_sales", MetricOp::Sum, "price"),
                NamedExpression::doc_count(),
            ],
        )
    }

    #[test]
    fn test_plain_request_validates() {
        assert_eq!(sales_request().validate(), Ok(()));
    }

    #[test]
    fn test_computed_with_known_operands_validates() {
        let mut request = sales_request();
        request.expressions.push(NamedExpression::metric(
            "avg_sales",
            MetricOp::Avg,
            "price",
        ));
        request.expressions.push(NamedExpression::computed(
            "sales_per_doc",
            ComputedOp::Ratio,
            vec!["total_sales".to_string(), "doc_count".to_string()],
        ));
        assert_eq!(request.validate(), Ok(()));
    }

    #[test]
    fn test_computed_operand_may_reference_bundle_columns() {
        let mut request = sales_request();
        request.expressions.push(NamedExpression::reverse_nested(
            "root",
            vec![NamedExpression::metric(
                "avg_sales",
                MetricOp::Avg,
                "price",
            )],
        ));
        request.expressions.push(NamedExpression::computed(
            "nested_share",
            ComputedOp::Ratio,
            vec![
                "total_sales".to_string(),
                "reverse_nested_root__avg_sales".to_string(),
            ],
        ));
        assert_eq!(request.validate(), Ok(()));
    }

    #[test]
    fn test_unknown_operand_is_rejected() {
        let mut request = sales_request();
        request.expressions.push(NamedExpression::computed(
            "broken",
            ComputedOp::Addition,
            vec!["total_sales".to_string(), "missing_column".to_string()],
        ));
        assert_eq!(
            request.validate(),
            Err(FlattenError::UnknownOperand {
                expression: "broken".to_string(),
                operand: "missing_column".to_string(),
            })
        );
    }

    #[test]
    fn test_computed_requires_flattened_result() {
        let mut request = sales_request().raw();
        request.expressions.push(NamedExpression::computed(
            "double_sales",
            ComputedOp::Addition,
            vec!["total_sales".to_string(), "total_sales".to_string()],
        ));
        assert_eq!(
            request.validate(),
            Err(FlattenError::ComputedRequiresFlat("double_sales".to_string()))
        );
    }

    #[test]
    fn test_value_dimensions_skip_structural_markers() {
        let request = MetricRequest::new(
            vec![
                Dimension::nested("products", "products"),
                Dimension::terms("product_type").stored_as("products.product_type"),
            ],
            vec![NamedExpression::doc_count()],
        );
        let keys: Vec<&str> = request
            .value_dimensions()
            .map(|dim| dim.key.as_str())
            .collect();
        assert_eq!(keys, vec!["product_type"]);
    }

    #[test]
    fn test_doc_count_expression_kind() {
        let count = NamedExpression::doc_count();
        assert!(matches!(count.expr, Expression::DocCount));
    }
}
