/// Asserts the parent's children are in exactly this order.
#[macro_export]
macro_rules! assert_child_order {
    ($parent:expr, [$($name:expr),* $(,)?]) => {
        let expected: Vec<String> = vec![$($name.to_string()),*];
        assert_eq!(
            common::child_names(&$parent),
            expected,
            "unexpected child order"
        );
    };
}

/// Asserts that a result failed with an assertion error.
#[macro_export]
macro_rules! assert_assertion_failure {
    ($result:expr) => {
        match $result {
            Err(err) => assert!(err.is_assertion(), "expected an assertion failure, got {err}"),
            Ok(_) => panic!("expected an assertion failure, got Ok"),
        }
    };
}
