//! `key.path=value` overrides applied to a parsed TOML document.

use toml::{value::Table, Value};

use crate::ConfigError;

/// Splits `a.b.c=value` into the key path and a TOML value. The value is
/// read as a TOML literal if it parses as one, and as a bare string
/// otherwise.
pub fn parse_override(s: &str) -> Result<(String, Value), ConfigError> {
    let (path, raw) = s
        .split_once('=')
        .ok_or_else(|| ConfigError::InvalidOverride(s.to_string()))?;

    let path = path.trim();
    if path.is_empty() || path.split('.').any(str::is_empty) {
        return Err(ConfigError::InvalidOverride(s.to_string()));
    }

    Ok((path.to_string(), parse_value(raw.trim())))
}

fn parse_value(raw: &str) -> Value {
    toml::from_str::<Table>(&format!("v = {raw}"))
        .ok()
        .and_then(|mut t| t.remove("v"))
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

/// Sets the value at a dotted path, creating the final key if missing.
/// Intermediate tables must exist.
pub fn apply_override(path: &str, value: Value, table: &mut Table) -> Result<(), ConfigError> {
    let mut keys = path.split('.').peekable();
    let mut current = table;
    let mut walked = String::new();

    while let Some(key) = keys.next() {
        if keys.peek().is_none() {
            current.insert(key.to_string(), value);
            return Ok(());
        }

        if !walked.is_empty() {
            walked.push('.');
        }
        walked.push_str(key);

        current = match current.get_mut(key) {
            Some(Value::Table(inner)) => inner,
            Some(_) => {
                return Err(ConfigError::TraverseNonTableAt {
                    key: key.to_string(),
                    path: walked,
                })
            }
            None => return Err(ConfigError::MissingKey(walked)),
        };
    }

    Err(ConfigError::InvalidOverride(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Value {
        toml::from_str(
            r#"
            [query]
            nonce = 1
            finality = "finalized"

            [verifier]
            guardians = []
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_parse_override_values() {
        assert_eq!(
            parse_override("query.nonce=42").unwrap(),
            ("query.nonce".to_string(), Value::Integer(42))
        );
        assert_eq!(
            parse_override("query.finality = confirmed").unwrap(),
            ("query.finality".to_string(), Value::String("confirmed".into()))
        );
        assert_eq!(
            parse_override(r#"logging.json_format=true"#).unwrap().1,
            Value::Boolean(true)
        );
        assert_eq!(
            parse_override(r#"verifier.guardians=["0x01"]"#).unwrap().1,
            Value::Array(vec![Value::String("0x01".into())])
        );
    }

    #[test]
    fn test_parse_override_rejects_malformed() {
        for bad in ["query.nonce", "=1", "query..nonce=1", ".nonce=1"] {
            assert!(
                matches!(parse_override(bad), Err(ConfigError::InvalidOverride(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_apply_override() {
        let mut doc = doc();
        let table = doc.as_table_mut().unwrap();

        apply_override("query.nonce", Value::Integer(7), table).unwrap();
        apply_override("query.owner", Value::String("abc".into()), table).unwrap();
        assert_eq!(table["query"]["nonce"], Value::Integer(7));
        assert_eq!(table["query"]["owner"], Value::String("abc".into()));

        assert_eq!(
            apply_override("proxy.fixture", Value::Integer(1), table),
            Err(ConfigError::MissingKey("proxy".into()))
        );
        assert!(matches!(
            apply_override("query.nonce.inner", Value::Integer(1), table),
            Err(ConfigError::TraverseNonTableAt { .. })
        ));
    }
}
