use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared::domain::{AffordabilityUnitSize, Demographic, RentUnitSize, UnknownValueError};

/// Income slider bounds, in dollars per hour.
pub const MIN_HOURLY_INCOME: f64 = 0.0;
pub const MAX_HOURLY_INCOME: f64 = 150.0;
pub const DEFAULT_HOURLY_INCOME: f64 = 15.0;

/// Which user-adjustable input changed. Keys the routing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterField {
    UserIncome,
    UserUnitSize,
    OtherUnitSize,
    OtherDemographic,
}

impl ParameterField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterField::UserIncome => "user_income",
            ParameterField::UserUnitSize => "user_unit_size",
            ParameterField::OtherUnitSize => "other_unit_size",
            ParameterField::OtherDemographic => "other_demographic",
        }
    }
}

impl fmt::Display for ParameterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Error)]
pub enum ValidationError {
    #[error("income {value} is outside the allowed range {min}..={max}")]
    IncomeOutOfRange { value: f64, min: f64, max: f64 },
    #[error("income must be a finite number")]
    IncomeNotFinite,
    #[error(transparent)]
    UnknownValue(#[from] UnknownValueError),
}

/// Current user-adjustable inputs. Every field always holds a value from its
/// declared finite domain; mutated only through the validated setters, never
/// by fetch results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub user_income: f64,
    pub user_unit_size: RentUnitSize,
    pub other_unit_size: AffordabilityUnitSize,
    pub other_demographic: Demographic,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            user_income: DEFAULT_HOURLY_INCOME,
            user_unit_size: RentUnitSize::default(),
            other_unit_size: AffordabilityUnitSize::default(),
            other_demographic: Demographic::default(),
        }
    }
}

impl Parameters {
    pub fn set_user_income(&mut self, income: f64) -> Result<(), ValidationError> {
        validate_income(income)?;
        self.user_income = income;
        Ok(())
    }

    pub fn set_user_unit_size(&mut self, size: RentUnitSize) {
        self.user_unit_size = size;
    }

    pub fn set_other_unit_size(&mut self, size: AffordabilityUnitSize) {
        self.other_unit_size = size;
    }

    pub fn set_other_demographic(&mut self, demographic: Demographic) {
        self.other_demographic = demographic;
    }
}

pub fn validate_income(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::IncomeNotFinite);
    }
    if !(MIN_HOURLY_INCOME..=MAX_HOURLY_INCOME).contains(&value) {
        return Err(ValidationError::IncomeOutOfRange {
            value,
            min: MIN_HOURLY_INCOME,
            max: MAX_HOURLY_INCOME,
        });
    }
    Ok(())
}
