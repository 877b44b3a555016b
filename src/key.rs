//! Cache key derivation.
//!
//! A key is `"{cache_name}:{part}|{part}|..."`, or `"{cache_name}:noargs"`
//! when the call has no arguments. Integers and strings contribute their
//! literal text, so `42_i32` and `42_i64` land on the same key. Anything else
//! contributes a hash of its *content*, never of its address.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// One argument's contribution to a cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyArg {
    /// Absent value, rendered as `null`.
    Null,
    /// Integer primitive, rendered as its decimal text.
    Int(i128),
    /// String primitive, rendered verbatim.
    Str(String),
    /// Content hash of a structured value.
    Hashed(u64),
}

impl KeyArg {
    /// Key fragment for a structured value, derived from its `Hash` impl.
    ///
    /// `DefaultHasher::new()` uses fixed SipHash keys, so equal content gives
    /// an equal fragment for the lifetime of the process.
    pub fn hashed<T: Hash + ?Sized>(value: &T) -> Self {
        KeyArg::Hashed(content_hash(value))
    }
}

impl fmt::Display for KeyArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyArg::Null => f.write_str("null"),
            KeyArg::Int(v) => write!(f, "{}", v),
            KeyArg::Str(s) => f.write_str(s),
            KeyArg::Hashed(h) => write!(f, "{}", h),
        }
    }
}

macro_rules! key_arg_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for KeyArg {
                fn from(v: $t) -> Self {
                    KeyArg::Int(v as i128)
                }
            }
        )*
    };
}

key_arg_from_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<&str> for KeyArg {
    fn from(v: &str) -> Self {
        KeyArg::Str(v.to_string())
    }
}

impl From<String> for KeyArg {
    fn from(v: String) -> Self {
        KeyArg::Str(v)
    }
}

impl<T: Into<KeyArg>> From<Option<T>> for KeyArg {
    fn from(v: Option<T>) -> Self {
        v.map_or(KeyArg::Null, Into::into)
    }
}

/// Hash a value's content with the process-stable default hasher.
pub fn content_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Builder for cache keys.
pub struct CacheKeyBuilder;

impl CacheKeyBuilder {
    /// Build the full cache key for a namespace and an argument list.
    pub fn build(cache_name: &str, args: &[KeyArg]) -> String {
        if args.is_empty() {
            return format!("{}:noargs", cache_name);
        }

        let parts: Vec<String> = args.iter().map(KeyArg::to_string).collect();
        format!("{}:{}", cache_name, parts.join("|"))
    }

    /// Split a key back into its namespace and raw argument section.
    ///
    /// The split happens at the first `:`, so this only round-trips keys
    /// whose cache name contains no `:`. Argument text may contain any
    /// character.
    pub fn parse(key: &str) -> Option<(&str, &str)> {
        key.split_once(':')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Hash)]
    struct Filter {
        name: String,
        limit: u32,
    }

    #[test]
    fn test_key_without_args() {
        assert_eq!(CacheKeyBuilder::build("user", &[]), "user:noargs");
    }

    #[test]
    fn test_key_with_primitives() {
        let args = [KeyArg::from(42), KeyArg::from("a"), KeyArg::Null];
        assert_eq!(CacheKeyBuilder::build("user", &args), "user:42|a|null");
    }

    #[test]
    fn test_integer_width_does_not_matter() {
        let narrow = CacheKeyBuilder::build("user", &[KeyArg::from(42_i32)]);
        let wide = CacheKeyBuilder::build("user", &[KeyArg::from(42_i64)]);
        let unsigned = CacheKeyBuilder::build("user", &[KeyArg::from(42_u64)]);
        assert_eq!(narrow, wide);
        assert_eq!(wide, unsigned);
    }

    #[test]
    fn test_none_is_null() {
        let arg: KeyArg = Option::<i64>::None.into();
        assert_eq!(arg, KeyArg::Null);
        let arg: KeyArg = Some("x").into();
        assert_eq!(arg, KeyArg::Str("x".to_string()));
    }

    #[test]
    fn test_content_hash_is_structural() {
        let a = Filter {
            name: "active".to_string(),
            limit: 10,
        };
        let b = Filter {
            name: "active".to_string(),
            limit: 10,
        };
        let c = Filter {
            name: "active".to_string(),
            limit: 11,
        };

        assert_eq!(KeyArg::hashed(&a), KeyArg::hashed(&b));
        assert_ne!(KeyArg::hashed(&a), KeyArg::hashed(&c));
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            CacheKeyBuilder::parse("user:42|a"),
            Some(("user", "42|a"))
        );
        assert_eq!(CacheKeyBuilder::parse("nokey"), None);
    }

    #[test]
    fn test_parse_args_with_colons() {
        let key = CacheKeyBuilder::build(
            "session",
            &[KeyArg::from("tenant:acme"), KeyArg::from(3)],
        );
        assert_eq!(
            CacheKeyBuilder::parse(&key),
            Some(("session", "tenant:acme|3"))
        );
    }
}
