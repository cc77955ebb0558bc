use serde::{Deserialize, Serialize};

use super::draft::Field;
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "under20")]
    Under20,
    #[serde(rename = "20s")]
    Twenties,
    #[serde(rename = "30s")]
    Thirties,
    #[serde(rename = "40s")]
    Forties,
    #[serde(rename = "50s")]
    Fifties,
    #[serde(rename = "over60")]
    Over60,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 6] = [
        AgeGroup::Under20,
        AgeGroup::Twenties,
        AgeGroup::Thirties,
        AgeGroup::Forties,
        AgeGroup::Fifties,
        AgeGroup::Over60,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AgeGroup::Under20 => "Under 20",
            AgeGroup::Twenties => "20s",
            AgeGroup::Thirties => "30s",
            AgeGroup::Forties => "40s",
            AgeGroup::Fifties => "50s",
            AgeGroup::Over60 => "60 and over",
        }
    }
}

/// Collected once per install and reused for every vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemographicsProfile {
    pub gender: Gender,
    #[serde(rename = "ageGroup")]
    pub age_group: AgeGroup,
}

/// Selections made so far in the demographics prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DemographicsForm {
    pub gender: Option<Gender>,
    pub age_group: Option<AgeGroup>,
}

impl DemographicsForm {
    pub fn cycle_gender(&mut self, forward: bool) {
        self.gender = Some(cycle(&Gender::ALL, self.gender, forward));
    }

    pub fn cycle_age_group(&mut self, forward: bool) {
        self.age_group = Some(cycle(&AgeGroup::ALL, self.age_group, forward));
    }

    pub fn submit(&self) -> Result<DemographicsProfile> {
        match (self.gender, self.age_group) {
            (Some(gender), Some(age_group)) => Ok(DemographicsProfile { gender, age_group }),
            (None, _) => Err(AppError::validation(
                Field::Gender,
                "Please select both gender and age group",
            )),
            (_, None) => Err(AppError::validation(
                Field::AgeGroup,
                "Please select both gender and age group",
            )),
        }
    }
}

fn cycle<T: Copy + PartialEq>(options: &[T], current: Option<T>, forward: bool) -> T {
    let len = options.len();
    let idx = match current.and_then(|c| options.iter().position(|o| *o == c)) {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None if forward => 0,
        None => len - 1,
    };
    options[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_uses_stored_key_names() {
        let profile = DemographicsProfile {
            gender: Gender::Female,
            age_group: AgeGroup::Thirties,
        };
        let json = serde_json::to_string(&profile).unwrap();
        assert_eq!(json, r#"{"gender":"female","ageGroup":"30s"}"#);

        let back: DemographicsProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn submit_requires_both_selections() {
        let mut form = DemographicsForm::default();
        assert!(matches!(
            form.submit(),
            Err(AppError::Validation { field: Field::Gender, .. })
        ));

        form.cycle_gender(true);
        assert!(matches!(
            form.submit(),
            Err(AppError::Validation { field: Field::AgeGroup, .. })
        ));

        form.cycle_age_group(false);
        let profile = form.submit().unwrap();
        assert_eq!(profile.gender, Gender::Male);
        assert_eq!(profile.age_group, AgeGroup::Over60);
    }

    #[test]
    fn cycling_wraps_around() {
        let mut form = DemographicsForm {
            gender: Some(Gender::Other),
            age_group: Some(AgeGroup::Under20),
        };
        form.cycle_gender(true);
        form.cycle_age_group(false);
        assert_eq!(form.gender, Some(Gender::Male));
        assert_eq!(form.age_group, Some(AgeGroup::Over60));
    }
}
