//! Macro for implementing Display and FromStr for status enums
//!
//! Status columns are stored as lowercase text, so every persisted enum needs
//! the same pair of conversions. The macro keeps the string table in one place.
//!
//! # Example
//!
//! ```rust
//! use focusflow_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum SessionStatus {
//!     Active,
//!     Completed,
//! }
//!
//! impl_domain_status_conversions!(SessionStatus {
//!     Active => "active",
//!     Completed => "completed",
//! });
//! ```

/// Implements Display and FromStr traits for status enums
///
/// - Display writes the lowercase string
/// - FromStr parses case-insensitively and reports the enum name on failure
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum SampleStatus {
        Active,
        Completed,
    }

    impl_domain_status_conversions!(SampleStatus {
        Active => "active",
        Completed => "completed",
    });

    #[test]
    fn displays_lowercase() {
        assert_eq!(SampleStatus::Active.to_string(), "active");
        assert_eq!(SampleStatus::Completed.to_string(), "completed");
    }

    #[test]
    fn parses_any_case() {
        assert_eq!(SampleStatus::from_str("active").unwrap(), SampleStatus::Active);
        assert_eq!(SampleStatus::from_str("COMPLETED").unwrap(), SampleStatus::Completed);
        assert_eq!(SampleStatus::from_str("CompLeted").unwrap(), SampleStatus::Completed);
    }

    #[test]
    fn rejects_unknown_values() {
        let result = SampleStatus::from_str("paused");
        assert!(result.unwrap_err().contains("Invalid SampleStatus: paused"));
        assert!(SampleStatus::from_str("").is_err());
    }

    mod alias_in_scope {
        use std::str::FromStr;

        #[allow(unused_imports)]
        use crate::errors::Result;

        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum Role {
            Owner,
        }

        impl_domain_status_conversions!(Role {
            Owner => "owner",
        });

        #[test]
        fn expands_next_to_the_crate_result_alias() {
            assert_eq!(Role::from_str("Owner"), Ok(Role::Owner));
            assert_eq!(Role::Owner.to_string(), "owner");
        }
    }
}
