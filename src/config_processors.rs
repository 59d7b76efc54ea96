use justconfig::error::ConfigError;
use justconfig::item::{MapAction, StringItem};

/// Strips one pair of surrounding quotes from configuration strings.
pub trait Unquote
where
    Self: Sized,
{
    fn unquote(self) -> Result<StringItem, ConfigError>;
}

impl Unquote for Result<StringItem, ConfigError> {
    /// Trims every value and removes a matching pair of leading and trailing quotes,
    /// either `"` or `'`. Unquoted values are kept as they are, so `strategy = cosine`
    /// and `strategy = "cosine"` read the same.
    fn unquote(self) -> Result<StringItem, ConfigError> {
        self?.map(|v| match strip_quotes(v.trim()) {
            Some(inner) => MapAction::Replace(vec![inner.to_owned()]),
            None => MapAction::Keep,
        })
    }
}

fn strip_quotes(value: &str) -> Option<&str> {
    if value.len() < 2 {
        return None;
    }
    ['"', '\'']
        .iter()
        .find(|quote| value.starts_with(**quote) && value.ends_with(**quote))
        .map(|_| &value[1..value.len() - 1])
}
