//! Unit tests for GcError and ErrorKind

use core_types::{Address, ErrorKind, GcError, Value};

#[cfg(test)]
mod error_kind_tests {
    use super::*;

    #[test]
    fn test_heap_exhausted_kind() {
        let err = GcError::HeapExhausted { capacity: 0 };
        assert_eq!(err.kind(), ErrorKind::HeapExhausted);
    }

    #[test]
    fn test_invariant_violation_kind() {
        let err = GcError::InvariantViolation("T - B is odd".to_string());
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert_eq!(err.to_string(), "invariant violation: T - B is odd");
    }

    #[test]
    fn test_type_contract_violation_kind() {
        let err = GcError::type_violation("cell", Value::integer(1));
        assert_eq!(err.kind(), ErrorKind::TypeContractViolation);
    }

    #[test]
    fn test_invalid_config_kind() {
        let err = GcError::InvalidConfig("scan quantum must be at least 1".to_string());
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }
}

#[cfg(test)]
mod error_message_tests {
    use super::*;

    #[test]
    fn test_heap_exhausted_message_names_capacity() {
        let err = GcError::HeapExhausted { capacity: 25 };
        assert!(err.to_string().contains("25 cells"));
    }

    #[test]
    fn test_type_violation_names_value() {
        let err = GcError::type_violation("integer", Value::HeapRef(Address::new(10)));
        assert!(err.to_string().contains("HeapRef(@10)"));
    }

    #[test]
    fn test_error_is_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        assert_error(&GcError::HeapExhausted { capacity: 1 });
    }
}
