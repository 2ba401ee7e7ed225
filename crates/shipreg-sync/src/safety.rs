//! Shipping-safety check for temperature-sensitive medicines.
//!
//! A shipment is safe when the transit temperature stays at or below the
//! medicine's storage limit and the remaining shelf life covers the travel
//! time. The remaining shelf life is a natural `expiry_days` for the
//! shipment record.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Storage limits for one medicine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineProfile {
    pub name: String,
    /// Days from manufacture until expiry.
    pub shelf_life_days: u32,
    pub max_temp_celsius: f64,
    pub description: String,
}

impl MedicineProfile {
    fn new(name: &str, shelf_life_days: u32, max_temp_celsius: f64, description: &str) -> Self {
        Self {
            name: name.to_string(),
            shelf_life_days,
            max_temp_celsius,
            description: description.to_string(),
        }
    }
}

/// Medicines known to the check. Lookup ignores case.
#[derive(Clone, Debug, PartialEq)]
pub struct MedicineCatalog {
    profiles: Vec<MedicineProfile>,
}

impl MedicineCatalog {
    pub fn new(profiles: Vec<MedicineProfile>) -> Self {
        Self { profiles }
    }

    pub fn profiles(&self) -> &[MedicineProfile] {
        &self.profiles
    }

    pub fn find(&self, name: &str) -> Option<&MedicineProfile> {
        let name = name.trim();
        self.profiles
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Judge a planned shipment as of `today`.
    pub fn check(&self, request: &ShippingCheck, today: NaiveDate) -> SafetyVerdict {
        let Some(profile) = self.find(&request.medicine) else {
            return SafetyVerdict {
                can_ship: false,
                medicine: None,
                remaining_shelf_life_days: None,
                problems: vec![SafetyProblem::UnknownMedicine {
                    name: request.medicine.trim().to_string(),
                }],
            };
        };

        let mut problems = Vec::new();
        let temperature = request.temperature_celsius;
        if temperature.is_nan() || temperature > profile.max_temp_celsius {
            problems.push(SafetyProblem::TooWarm {
                temperature_celsius: temperature,
                max_celsius: profile.max_temp_celsius,
            });
        }

        // A manufacture date in the future counts as today.
        let elapsed = request
            .manufactured_on
            .map(|made| (today - made).num_days().max(0))
            .unwrap_or(0);
        let remaining = (i64::from(profile.shelf_life_days) - elapsed).max(0) as u32;
        if request.travel_days > remaining {
            problems.push(SafetyProblem::ShelfLifeExceeded {
                travel_days: request.travel_days,
                remaining_days: remaining,
            });
        }

        SafetyVerdict {
            can_ship: problems.is_empty(),
            medicine: Some(profile.clone()),
            remaining_shelf_life_days: Some(remaining),
            problems,
        }
    }
}

impl Default for MedicineCatalog {
    fn default() -> Self {
        Self::new(vec![
            MedicineProfile::new("Insulin", 30, 8.0, "Diabetes medication"),
            MedicineProfile::new("Amoxicillin", 90, 25.0, "Antibiotic"),
            MedicineProfile::new("Vaccine", 180, 5.0, "Immunization"),
            MedicineProfile::new("Aspirin", 730, 30.0, "Pain reliever"),
        ])
    }
}

/// A planned shipment of one medicine.
#[derive(Clone, Debug, PartialEq)]
pub struct ShippingCheck {
    pub medicine: String,
    pub travel_days: u32,
    /// Expected transit temperature.
    pub temperature_celsius: f64,
    /// Without it the full shelf life is assumed.
    pub manufactured_on: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "problem", rename_all = "snake_case")]
pub enum SafetyProblem {
    UnknownMedicine {
        name: String,
    },
    TooWarm {
        temperature_celsius: f64,
        max_celsius: f64,
    },
    ShelfLifeExceeded {
        travel_days: u32,
        remaining_days: u32,
    },
}

impl fmt::Display for SafetyProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownMedicine { name } => write!(f, "unknown medicine {name:?}"),
            Self::TooWarm {
                temperature_celsius,
                max_celsius,
            } => write!(
                f,
                "temperature {temperature_celsius}°C is above the {max_celsius}°C limit"
            ),
            Self::ShelfLifeExceeded {
                travel_days,
                remaining_days,
            } => write!(
                f,
                "travel time of {travel_days} days exceeds remaining shelf life of {remaining_days} days"
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyVerdict {
    pub can_ship: bool,
    pub medicine: Option<MedicineProfile>,
    pub remaining_shelf_life_days: Option<u32>,
    pub problems: Vec<SafetyProblem>,
}

impl SafetyVerdict {
    pub fn message(&self) -> String {
        if self.can_ship {
            let remaining = self.remaining_shelf_life_days.unwrap_or_default();
            return format!("safe to ship, {remaining} days of shelf life remaining");
        }
        let reasons: Vec<String> = self.problems.iter().map(ToString::to_string).collect();
        format!("not recommended: {}", reasons.join("; "))
    }
}
