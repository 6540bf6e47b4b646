//! Namespace and field-key derivation

use std::fmt::Display;

/// Delimiter for namespace parts, parameter lists and positional arguments
pub const KEY_DELIMITER: &str = "-";

/// Name and declared parameter names of a wrapped function.
///
/// Rust has no runtime reflection for this, so it is supplied explicitly,
/// usually through the [`signature!`](crate::signature) macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    name: String,
    params: Vec<String>,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>, params: &[&str]) -> Self {
        Self {
            name: name.into(),
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }
}

/// Build a [`FunctionSignature`] from something shaped like a call.
///
/// ```
/// let sig = redis_memo::signature!(compute(x, y));
/// assert_eq!(sig.name(), "compute");
/// assert_eq!(sig.params(), ["x", "y"]);
/// ```
#[macro_export]
macro_rules! signature {
    ($name:ident ( $($param:ident),* $(,)? )) => {
        $crate::cache::FunctionSignature::new(stringify!($name), &[$(stringify!($param)),*])
    };
}

/// Arguments of one wrapped call.
///
/// Only positional arguments take part in the field key. Keyword arguments
/// are carried along but ignored, so two calls that differ only in keyword
/// arguments hit the same entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallArgs {
    positional: Vec<String>,
    keyword: Vec<(String, String)>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument (stored in its `Display` form)
    pub fn arg(mut self, value: impl Display) -> Self {
        self.positional.push(value.to_string());
        self
    }

    /// Attach a keyword argument; does not affect the field key
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.keyword.push((name.into(), value.to_string()));
        self
    }

    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    pub fn keyword(&self) -> &[(String, String)] {
        &self.keyword
    }

    /// Positional arguments joined with [`KEY_DELIMITER`]; empty for no arguments
    pub fn field_key(&self) -> String {
        self.positional.join(KEY_DELIMITER)
    }
}

impl<D: Display> FromIterator<D> for CallArgs {
    fn from_iter<I: IntoIterator<Item = D>>(iter: I) -> Self {
        Self {
            positional: iter.into_iter().map(|v| v.to_string()).collect(),
            keyword: Vec::new(),
        }
    }
}

/// `{file}-{function}-{param1-param2-...}`.
///
/// A parameterless function keeps the trailing delimiter (`"main.rs-load-"`).
pub fn derive_namespace(file: &str, signature: &FunctionSignature) -> String {
    let params = signature.params.join(KEY_DELIMITER);
    [file, signature.name.as_str(), params.as_str()].join(KEY_DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_key_joins_positional_args() {
        let args = CallArgs::new().arg(7).arg("abc").arg(1.5);
        assert_eq!(args.field_key(), "7-abc-1.5");
    }

    #[test]
    fn test_field_key_ignores_keyword_args() {
        let plain = CallArgs::new().arg(7);
        let with_kwargs = CallArgs::new().arg(7).kwarg("verbose", true);

        assert_eq!(plain.field_key(), with_kwargs.field_key());
        assert_eq!(with_kwargs.keyword().len(), 1);
    }

    #[test]
    fn test_field_key_empty_args() {
        assert_eq!(CallArgs::new().field_key(), "");
    }

    #[test]
    fn test_call_args_from_iter() {
        let args: CallArgs = [1, 2, 3].into_iter().collect();
        assert_eq!(args.positional(), ["1", "2", "3"]);
        assert_eq!(args.field_key(), "1-2-3");
    }

    #[test]
    fn test_derive_namespace() {
        let sig = FunctionSignature::new("compute", &["x", "y"]);
        assert_eq!(derive_namespace("src/lib.rs", &sig), "src/lib.rs-compute-x-y");
    }

    #[test]
    fn test_derive_namespace_without_params() {
        let sig = crate::signature!(load());
        assert_eq!(derive_namespace("src/main.rs", &sig), "src/main.rs-load-");
    }

    #[test]
    fn test_signature_macro() {
        let sig = crate::signature!(compute(x));
        assert_eq!(sig, FunctionSignature::new("compute", &["x"]));
    }
}
