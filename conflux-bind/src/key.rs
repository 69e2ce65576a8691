// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Canonical, hashable cache keys built from argument tuples.
//!
//! Two calls address the same pipeline entry exactly when their trimmed
//! argument tuples are structurally equal: trailing absent arguments are
//! stripped, so `(5,)` and `(5, None)` share one entry while `(1,)` and
//! `(2,)` never do. Keys are a flat `Vec` of tagged segments compared by
//! `Hash + Eq` — no nested-map walks, no serialized-string keys.

/// One canonical key segment.
///
/// The supported argument domain is integers, booleans, strings and absent
/// values. Floats are deliberately not representable: they have no total
/// equality, which makes them unsound as hash-map keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArgValue {
    Int(i64),
    Bool(bool),
    Str(String),
    /// An absent argument (`Option::None`). Trailing absent segments are
    /// trimmed away during keying.
    None,
}

/// Conversion of one argument into its canonical key segment.
pub trait IntoArgValue {
    fn into_arg_value(self) -> ArgValue;
}

macro_rules! impl_into_arg_value_int {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl IntoArgValue for $ty {
                fn into_arg_value(self) -> ArgValue {
                    ArgValue::Int(i64::from(self))
                }
            }
        )+
    };
}

impl_into_arg_value_int!(i8, i16, i32, i64, u8, u16, u32);

impl IntoArgValue for bool {
    fn into_arg_value(self) -> ArgValue {
        ArgValue::Bool(self)
    }
}

impl IntoArgValue for String {
    fn into_arg_value(self) -> ArgValue {
        ArgValue::Str(self)
    }
}

impl IntoArgValue for &str {
    fn into_arg_value(self) -> ArgValue {
        ArgValue::Str(self.to_string())
    }
}

impl<V: IntoArgValue> IntoArgValue for Option<V> {
    fn into_arg_value(self) -> ArgValue {
        match self {
            Some(value) => value.into_arg_value(),
            None => ArgValue::None,
        }
    }
}

impl IntoArgValue for ArgValue {
    fn into_arg_value(self) -> ArgValue {
        self
    }
}

/// The canonical cache key: trimmed, tagged argument segments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PipelineKey(Vec<ArgValue>);

impl PipelineKey {
    /// Builds a key, trimming trailing absent segments.
    #[must_use]
    pub fn new(mut segments: Vec<ArgValue>) -> Self {
        while segments.last() == Some(&ArgValue::None) {
            segments.pop();
        }
        Self(segments)
    }

    /// The trimmed segments.
    #[must_use]
    pub fn segments(&self) -> &[ArgValue] {
        &self.0
    }
}

/// An argument tuple that can address a pipeline entry.
///
/// Implemented for `()` and tuples of up to four [`IntoArgValue`] elements.
/// The original (untrimmed) tuple is what the factory receives; only the
/// key is trimmed.
pub trait PipelineArgs: Clone + Send + Sync + 'static {
    fn to_key(&self) -> PipelineKey;
}

impl PipelineArgs for () {
    fn to_key(&self) -> PipelineKey {
        PipelineKey::new(Vec::new())
    }
}

macro_rules! impl_pipeline_args {
    ($(($($name:ident . $idx:tt),+)),+ $(,)?) => {
        $(
            impl<$($name),+> PipelineArgs for ($($name,)+)
            where
                $($name: IntoArgValue + Clone + Send + Sync + 'static,)+
            {
                fn to_key(&self) -> PipelineKey {
                    PipelineKey::new(vec![$(self.$idx.clone().into_arg_value(),)+])
                }
            }
        )+
    };
}

impl_pipeline_args!(
    (A.0),
    (A.0, B.1),
    (A.0, B.1, C.2),
    (A.0, B.1, C.2, D.3),
);
