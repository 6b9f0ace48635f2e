use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::AppError;

/// Validation failures keyed by form field name (`Email`, `DateActe`, ...).
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Adds `message` to the errors of `field`.
pub fn push_error(errors: &mut FieldErrors, field: &str, message: impl Into<String>) {
    errors.entry(field.to_string()).or_default().push(message.into());
}

/// `date_naissance` -> `DateNaissance`, the key the portal's forms use.
fn form_key(path: &str) -> String {
    path.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Flattens a `garde` report into `errors`.
pub fn collect_report(errors: &mut FieldErrors, report: &garde::Report) {
    for (path, error) in report.iter() {
        push_error(errors, &form_key(&path.to_string()), error.message());
    }
}

/// Returns `Ok(())` when `errors` is empty.
pub fn finish(errors: FieldErrors) -> Result<(), AppError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Parses a `YYYY-MM-DD` form date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Rejects values made of whitespace only.
pub fn not_blank(value: &str, _ctx: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("Ce champ est obligatoire"));
    }
    Ok(())
}
