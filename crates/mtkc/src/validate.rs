/// Names the emitted C unit reserves for itself; author arguments must not
/// shadow them.
pub const RESERVED_ARG_NAMES: &[&str] = &["ctx", "argc", "argv"];

pub fn validate_c_identifier(name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("name must be non-empty".to_string());
    }
    let mut chars = name.chars();
    let first = chars.next().unwrap_or('_');
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(format!(
            "invalid identifier start (must be [A-Za-z_]): {name:?}"
        ));
    }
    for c in chars {
        if !(c.is_ascii_alphanumeric() || c == '_') {
            return Err(format!(
                "invalid identifier char (allowed [A-Za-z0-9_]): {name:?}"
            ));
        }
    }
    Ok(())
}

pub fn validate_arg_name(name: &str) -> Result<(), String> {
    validate_c_identifier(name)?;
    if RESERVED_ARG_NAMES.contains(&name) {
        return Err(format!("argument name is reserved: {name:?}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_rules() {
        assert!(validate_c_identifier("axpy").is_ok());
        assert!(validate_c_identifier("_m2").is_ok());
        assert!(validate_c_identifier("").is_err());
        assert!(validate_c_identifier("2x").is_err());
        assert!(validate_c_identifier("a-b").is_err());
        assert!(validate_c_identifier("a.b").is_err());
    }

    #[test]
    fn reserved_arg_names_rejected() {
        assert!(validate_arg_name("ctx").is_err());
        assert!(validate_arg_name("argv").is_err());
        assert!(validate_arg_name("context").is_ok());
    }
}
