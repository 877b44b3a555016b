//! Call context handed to every aspect.
//!
//! A [`JoinPoint`] names the intercepted operation and captures its
//! arguments. Each [`Arg`] is captured once, up front, in the two forms the
//! aspects need: a cache-key fragment and a JSON rendering.

use crate::key::KeyArg;
use crate::serialization;
use serde::Serialize;
use serde_json::Value;
use std::hash::Hash;

/// One captured call argument.
#[derive(Clone, Debug)]
pub struct Arg {
    key: KeyArg,
    rendered: Result<Value, String>,
}

impl Arg {
    /// Absent argument.
    pub fn null() -> Self {
        Arg {
            key: KeyArg::Null,
            rendered: Ok(Value::Null),
        }
    }

    /// Structured argument keyed by a hash of its content.
    pub fn object<T: Serialize + Hash + ?Sized>(value: &T) -> Self {
        Arg {
            key: KeyArg::hashed(value),
            rendered: capture(value),
        }
    }

    /// Structured argument with a caller-chosen key fragment.
    ///
    /// Useful for values that cannot implement `Hash` (floats, maps).
    pub fn keyed<T: Serialize + ?Sized>(key: impl Into<KeyArg>, value: &T) -> Self {
        Arg {
            key: key.into(),
            rendered: capture(value),
        }
    }

    pub fn key(&self) -> &KeyArg {
        &self.key
    }

    /// JSON rendering, or the reason it failed.
    pub fn rendered(&self) -> Result<&Value, &str> {
        self.rendered.as_ref().map_err(String::as_str)
    }
}

fn capture<T: Serialize + ?Sized>(value: &T) -> Result<Value, String> {
    serialization::to_value(value).map_err(|e| {
        warn!("Failed to serialize method parameter: {}", e);
        e.to_string()
    })
}

macro_rules! arg_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Arg {
                fn from(v: $t) -> Self {
                    Arg {
                        key: KeyArg::from(v),
                        rendered: Ok(Value::from(v)),
                    }
                }
            }
        )*
    };
}

arg_from_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<&str> for Arg {
    fn from(v: &str) -> Self {
        Arg {
            key: KeyArg::from(v),
            rendered: Ok(Value::from(v)),
        }
    }
}

impl From<String> for Arg {
    fn from(v: String) -> Self {
        Arg {
            key: KeyArg::Str(v.clone()),
            rendered: Ok(Value::String(v)),
        }
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(v: Option<T>) -> Self {
        v.map_or_else(Arg::null, Into::into)
    }
}

/// Identity and arguments of an intercepted call.
///
/// # Example
///
/// ```
/// use aspect_kit::joinpoint::{Arg, JoinPoint};
///
/// let jp = JoinPoint::new("UserService::find(id: i64, verbose: Option<&str>)")
///     .with_short_signature("UserService::find")
///     .arg(42_i64)
///     .arg(Option::<&str>::None);
///
/// assert_eq!(jp.parameters_text(), "[42,null]");
/// ```
#[derive(Clone, Debug)]
pub struct JoinPoint {
    signature: String,
    short_signature: Option<String>,
    args: Vec<Arg>,
}

impl JoinPoint {
    pub fn new(signature: impl Into<String>) -> Self {
        JoinPoint {
            signature: signature.into(),
            short_signature: None,
            args: Vec::new(),
        }
    }

    /// Compact name used in local log lines.
    pub fn with_short_signature(mut self, short: impl Into<String>) -> Self {
        self.short_signature = Some(short.into());
        self
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append a structured argument keyed by its content.
    pub fn object_arg<T: Serialize + Hash + ?Sized>(self, value: &T) -> Self {
        self.arg(Arg::object(value))
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn short_signature(&self) -> &str {
        self.short_signature.as_deref().unwrap_or(&self.signature)
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Cache-key fragments, in argument order.
    pub fn key_args(&self) -> Vec<KeyArg> {
        self.args.iter().map(|arg| arg.key().clone()).collect()
    }

    /// JSON array of the arguments, `"[]"` when there are none, or the
    /// parameters placeholder when any argument failed to render.
    pub fn parameters_text(&self) -> String {
        serialization::render_parameters(self.args.iter().map(Arg::rendered))
    }
}
