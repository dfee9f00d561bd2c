//! Error categories for failure analysis
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable bucket for a validation error message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    JsonExtractionFailure,
    WrongCharacteristicName,
    MissingValue,
    WrongUnit,
    WrongValueType,
    MissingRequiredField,
    OtherSchemaViolation,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 7] = [
        ErrorCategory::JsonExtractionFailure,
        ErrorCategory::WrongCharacteristicName,
        ErrorCategory::MissingValue,
        ErrorCategory::WrongUnit,
        ErrorCategory::WrongValueType,
        ErrorCategory::MissingRequiredField,
        ErrorCategory::OtherSchemaViolation,
    ];

    /// Classify a validator error by its message template.
    /// Field names are part of most messages, so only the fixed phrases are matched.
    pub fn classify(error: &str) -> Self {
        if error.ends_with("not found in specification") {
            ErrorCategory::WrongCharacteristicName
        } else if error.ends_with("Value is missing") || error.ends_with("missing 'value' field") {
            ErrorCategory::MissingValue
        } else if error.contains(": Unit '") && error.contains("doesn't match") {
            ErrorCategory::WrongUnit
        } else if error.contains(": Expected ") && error.contains("(type: ") {
            ErrorCategory::WrongValueType
        } else if error.starts_with("Missing required field")
            || error.starts_with("Required field")
            || error.ends_with("missing 'name' field")
        {
            ErrorCategory::MissingRequiredField
        } else {
            ErrorCategory::OtherSchemaViolation
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::JsonExtractionFailure => "json_extraction_failure",
            ErrorCategory::WrongCharacteristicName => "wrong_characteristic_name",
            ErrorCategory::MissingValue => "missing_value",
            ErrorCategory::WrongUnit => "wrong_unit",
            ErrorCategory::WrongValueType => "wrong_value_type",
            ErrorCategory::MissingRequiredField => "missing_required_field",
            ErrorCategory::OtherSchemaViolation => "other_schema_violation",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_templates() {
        use ErrorCategory::*;
        let cases = [
            ("Characteristic 'Quantum flux' not found in specification", WrongCharacteristicName),
            ("Availability: Value is missing", MissingValue),
            ("Characteristic 2 missing 'value' field", MissingValue),
            ("Delay tolerance: Unit 's' doesn't match specification unit 'ms'", WrongUnit),
            ("Area of service: Expected SET, got value 'EU' (type: text)", WrongValueType),
            ("Missing required field: 'name'", MissingRequiredField),
            ("Required field 'description' is empty", MissingRequiredField),
            ("'serviceSpecCharacteristic' must be a list", OtherSchemaViolation),
        ];
        for (message, expected) in cases {
            assert_eq!(ErrorCategory::classify(message), expected, "{}", message);
        }
    }

    #[test]
    fn test_field_names_do_not_leak_into_category() {
        // "Community" contains "unit", "Prototype" contains "type"
        assert_eq!(
            ErrorCategory::classify("Community prototype: Value is missing"),
            ErrorCategory::MissingValue
        );
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(
            serde_json::to_string(&ErrorCategory::JsonExtractionFailure).unwrap(),
            "\"json_extraction_failure\""
        );
    }

    #[test]
    fn test_every_category_serializes_as_its_name() {
        for category in ErrorCategory::ALL {
            let json = serde_json::to_value(category).unwrap();
            assert_eq!(json, category.as_str());
            assert_eq!(category.to_string(), category.as_str());
        }
    }
}
