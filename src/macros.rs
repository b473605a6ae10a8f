/// Builds a [`Value`](crate::Value) from JSON-like syntax.
///
/// Objects become tables, arrays become inline arrays, and any other
/// expression goes through [`to_value`](crate::to_value), falling back to
/// [`Value::Null`](crate::Value::Null) if it cannot be represented.
///
/// ```rust
/// use toml_cursor::{toml, Value};
///
/// let server = toml!({
///     "host": "localhost",
///     "ports": [8080, 8081],
///     "tls": { "enabled": false }
/// });
/// assert_eq!(server["ports"][1], Value::Integer(8081));
/// assert_eq!(server["tls"]["enabled"], Value::Boolean(false));
/// ```
#[macro_export]
macro_rules! toml {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Boolean(true)
    };

    (false) => {
        $crate::Value::Boolean(false)
    };

    ([]) => {
        $crate::Value::Array($crate::Array::new())
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array($crate::Array::from(vec![$($crate::toml!($elem)),*]))
    };

    ({}) => {
        $crate::Value::Table($crate::Table::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut table = $crate::Table::new();
        $(
            table.insert($key.to_string(), $crate::toml!($value));
        )*
        $crate::Value::Table(table)
    }};

    ($s:expr) => {
        $crate::to_value(&$s).unwrap_or($crate::Value::Null)
    };
}
