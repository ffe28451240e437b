/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// Object keys must be string literals. Any other expression is converted with
/// [`to_value`](crate::to_value); expressions that cannot be represented become
/// `Value::Null`. Negative numbers inside arrays or objects need parentheses,
/// e.g. `value!([(-1), 2])`.
///
/// # Examples
///
/// ```rust
/// use recmap::{value, Value};
///
/// let tree = value!({
///     "type": "beer",
///     "alcohol_content": "5%",
///     "tags": ["cold", null]
/// });
///
/// assert_eq!(tree.get("type"), Some(&Value::from("beer")));
/// ```
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::value!($elem)),*])
    };

    ({}) => {
        $crate::Value::Object($crate::Map::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::Map::new();
        $(
            object.insert($key.to_string(), $crate::value!($value));
        )*
        $crate::Value::Object(object)
    }};

    ($s:expr) => {{
        $crate::to_value(&$s).unwrap_or($crate::Value::Null)
    }};
}
