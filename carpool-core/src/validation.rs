//! Field-rule validation for the client's input forms.
//!
//! Rules are checked in declaration order and the first failing message wins, so a form
//! reports one problem at a time.

/// Message for the first rule a form or search failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

#[derive(Clone, Copy, Default)]
pub struct FieldRules {
    pub required: bool,
    pub numeric: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<fn(&str) -> bool>,
}

impl FieldRules {
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    pub fn numeric(mut self) -> Self {
        self.numeric = true;
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn pattern(mut self, matcher: fn(&str) -> bool) -> Self {
        self.pattern = Some(matcher);
        self
    }
}

pub fn validate_field(
    value: &str,
    field_name: &str,
    rules: &FieldRules,
) -> Result<(), ValidationError> {
    if rules.required && value.is_empty() {
        return Err(ValidationError(format!("{field_name} is required")));
    }

    if rules.numeric && !value.is_empty() && value.trim().parse::<f64>().is_err() {
        return Err(ValidationError(format!("{field_name} must be a number")));
    }

    let length = value.chars().count();
    if let Some(min) = rules.min_length.filter(|min| length < *min) {
        return Err(ValidationError(format!(
            "{field_name} must be at least {min} characters"
        )));
    }

    if let Some(max) = rules.max_length.filter(|max| length > *max) {
        return Err(ValidationError(format!(
            "{field_name} must be no more than {max} characters"
        )));
    }

    if let Some(matcher) = rules.pattern {
        if !matcher(value) {
            return Err(ValidationError(format!("{field_name} format is invalid")));
        }
    }

    Ok(())
}

/// Validate every ruled field of `form`. Fields missing from the form count as empty.
pub fn validate_form(
    form: &[(&str, &str)],
    rules: &[(&str, FieldRules)],
) -> Result<(), ValidationError> {
    for (field_name, field_rules) in rules {
        let value = form
            .iter()
            .find(|(name, _)| name == field_name)
            .map(|(_, value)| *value)
            .unwrap_or("");
        validate_field(value, field_name, field_rules)?;
    }
    Ok(())
}
