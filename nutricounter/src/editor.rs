//! Food edit controller
//!
//! Draft-based editing of a single logged record. A draft is a local
//! copy of the record; nothing touches the store until the draft is
//! saved, and deletion is armed by an explicit confirmation step first.

use std::str::FromStr;

use crate::store::models::NutrientRecord;

/// Numeric fields of a record the editor can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NutrientField {
    Calories,
    Protein,
    Carbohydrates,
    Fat,
    Fiber,
    Sugar,
    Sodium,
    VitaminC,
    Calcium,
    Iron,
}

impl FromStr for NutrientField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "calories" => Ok(NutrientField::Calories),
            "protein" => Ok(NutrientField::Protein),
            "carbohydrates" => Ok(NutrientField::Carbohydrates),
            "fat" => Ok(NutrientField::Fat),
            "fiber" => Ok(NutrientField::Fiber),
            "sugar" => Ok(NutrientField::Sugar),
            "sodium" => Ok(NutrientField::Sodium),
            "vitamin_c" => Ok(NutrientField::VitaminC),
            "calcium" => Ok(NutrientField::Calcium),
            "iron" => Ok(NutrientField::Iron),
            other => Err(format!("unknown nutrient field: {}", other)),
        }
    }
}

/// In-progress copy of a record being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodDraft {
    record: NutrientRecord,
    confirm_delete: bool,
}

impl FoodDraft {
    pub fn open(record: NutrientRecord) -> Self {
        Self {
            record,
            confirm_delete: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn record(&self) -> &NutrientRecord {
        &self.record
    }

    /// Consume the draft for saving.
    pub fn into_record(self) -> NutrientRecord {
        self.record
    }

    /// Set a numeric field from raw input. Unparseable input silently
    /// coerces to 0; field edits never produce errors.
    pub fn set_field(&mut self, field: NutrientField, raw: &str) {
        let value: f64 = raw.trim().parse().unwrap_or(0.0);
        match field {
            NutrientField::Calories => self.record.calories = value,
            NutrientField::Protein => self.record.protein = value,
            NutrientField::Carbohydrates => self.record.carbohydrates = value,
            NutrientField::Fat => self.record.fat = value,
            NutrientField::Fiber => self.record.fiber = value,
            NutrientField::Sugar => self.record.sugar = value,
            NutrientField::Sodium => self.record.sodium = value,
            NutrientField::VitaminC => self.record.vitamin_c = value,
            NutrientField::Calcium => self.record.calcium = value,
            NutrientField::Iron => self.record.iron = value,
        }
    }

    /// Arm the destructive delete; the actual deletion only happens once
    /// the armed draft is confirmed.
    pub fn request_delete(&mut self) {
        self.confirm_delete = true;
    }

    /// Disarm a requested delete, keeping the draft open.
    pub fn cancel_delete(&mut self) {
        self.confirm_delete = false;
    }

    pub fn delete_armed(&self) -> bool {
        self.confirm_delete
    }
}
