use crate::error::{ClinicError, ClinicResult};

/// The four cost lines of a visit. `other` defaults to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BillInput {
    pub base: f64,
    pub tests: f64,
    pub meds: f64,
    pub other: f64,
}

impl BillInput {
    pub fn new(base: f64, tests: f64, meds: f64) -> Self {
        Self {
            base,
            tests,
            meds,
            other: 0.0,
        }
    }

    pub fn with_other(mut self, other: f64) -> Self {
        self.other = other;
        self
    }

    pub fn total(&self) -> ClinicResult<f64> {
        compute_bill(self.base, self.tests, self.meds, self.other)
    }
}

/// Sum of all cost lines, rounded to two decimal places.
pub fn compute_bill(base: f64, tests: f64, meds: f64, other: f64) -> ClinicResult<f64> {
    for (field, value) in [("base", base), ("tests", tests), ("meds", meds), ("other", other)] {
        if !value.is_finite() {
            return Err(ClinicError::MalformedNumber {
                field,
                value: value.to_string(),
            });
        }
    }
    let total = base + tests + meds + other;
    Ok((total * 100.0).round() / 100.0)
}

/// Parse one cost line from user input. Blank input counts as zero.
pub fn parse_amount(field: &'static str, raw: &str) -> ClinicResult<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ClinicError::MalformedNumber {
            field,
            value: trimmed.to_string(),
        }),
    }
}
