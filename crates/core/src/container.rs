//! Container name validation.
//!
//! SQLite cannot bind a table name as a parameter, so a container name is
//! interpolated directly into SQL. This is the one place in the crate
//! where that's unavoidable; `validate_container_name` fences it so a
//! caller-supplied name can never smuggle in arbitrary SQL.

use crate::error::Error;

pub fn validate_container_name(name: &str) -> Result<(), Error> {
    let mut chars = name.chars();
    let ok = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidContainerName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_identifiers() {
        assert!(validate_container_name("goldfinger").is_ok());
        assert!(validate_container_name("_barn_9").is_ok());
    }

    #[test]
    fn rejects_sql_metacharacters() {
        assert!(validate_container_name("goldfinger; DROP TABLE x;--").is_err());
        assert!(validate_container_name("").is_err());
        assert!(validate_container_name("9starts_with_digit").is_err());
        assert!(validate_container_name("has space").is_err());
    }
}
