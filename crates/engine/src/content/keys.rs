use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceKeyError {
    #[error("resource key must not be empty")]
    Empty,
    #[error("resource key must be relative")]
    Absolute,
    #[error("resource key must not contain '..'")]
    ParentTraversal,
    #[error("resource key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

/// Keys name files under `assets/images/` without extension, e.g. `title` or
/// `map/marker-1`.
pub(crate) fn validate_resource_key(key: &str) -> Result<(), ResourceKeyError> {
    if key.is_empty() {
        return Err(ResourceKeyError::Empty);
    }
    if key.starts_with('/') {
        return Err(ResourceKeyError::Absolute);
    }
    if key.split('/').any(|segment| segment == "..") {
        return Err(ResourceKeyError::ParentTraversal);
    }
    match key
        .chars()
        .find(|ch| {
            !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-'))
        })
    {
        Some(character) => Err(ResourceKeyError::InvalidCharacter { character }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_and_nested_keys() {
        for key in ["title", "map/marker-1", "font_8x8"] {
            assert_eq!(validate_resource_key(key), Ok(()), "key={key}");
        }
    }

    #[test]
    fn rejects_paths_that_escape_or_misname() {
        assert_eq!(validate_resource_key(""), Err(ResourceKeyError::Empty));
        assert_eq!(validate_resource_key("/title"), Err(ResourceKeyError::Absolute));
        assert_eq!(
            validate_resource_key("a/../b"),
            Err(ResourceKeyError::ParentTraversal)
        );
        assert_eq!(
            validate_resource_key("Title.png"),
            Err(ResourceKeyError::InvalidCharacter { character: 'T' })
        );
        assert!(validate_resource_key(r"a\b").is_err());
    }
}
