//! Normalises company numbers typed by users into the registry's 8 character form.

const COMPANY_NUMBER_LENGTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompanyNumberError {
    #[error("Company number is required")]
    Required,
}

/// Strip whitespace, upper-case and zero-pad the numeric part.
///
/// A leading alphabetic prefix such as `SC` or `NI` is preserved and only the
/// digits after it are padded. Inputs already 8 characters or longer are
/// returned as-is after whitespace removal and upper-casing.
pub fn sanitize_company_number(raw: Option<&str>) -> Result<String, CompanyNumberError> {
    let compact: String = raw
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    if compact.is_empty() {
        return Err(CompanyNumberError::Required);
    }

    let length = compact.chars().count();
    if length >= COMPANY_NUMBER_LENGTH {
        return Ok(compact);
    }

    let prefix: String = compact
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    let rest = &compact[prefix.len()..];
    let padding = "0".repeat(COMPANY_NUMBER_LENGTH - length);

    Ok(format!("{prefix}{padding}{rest}"))
}
