//! Aggregation engine
//!
//! Pure recomputation of running totals and per-macro progress from the
//! mirrored food log. Deterministic and side-effect free; recomputed on
//! every snapshot.

use serde::Serialize;

use crate::store::models::{Goals, NutrientRecord};

/// Running totals of the four tracked macros across the daily log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NutrientTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl NutrientTotals {
    /// Field-wise sum over the log. Records store absent numeric fields
    /// as zero, so a plain sum is exact.
    pub fn from_log(log: &[NutrientRecord]) -> Self {
        let mut totals = Self::default();
        for food in log {
            totals.calories += food.calories;
            totals.protein += food.protein;
            totals.carbs += food.carbohydrates;
            totals.fat += food.fat;
        }
        totals
    }
}

/// Progress toward a target, clamped to [0, 1].
///
/// A target of zero or below reports no progress rather than dividing.
pub fn progress_ratio(total: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    (total / target).min(1.0)
}

/// One display row of the daily overview.
#[derive(Debug, Clone, Serialize)]
pub struct MacroProgress {
    pub name: &'static str,
    pub current: f64,
    pub target: u32,
    pub unit: &'static str,
    /// Fill ratio of the progress bar, in [0, 1].
    pub ratio: f64,
}

/// The four overview rows in display order.
pub fn overview(totals: &NutrientTotals, goals: &Goals) -> [MacroProgress; 4] {
    [
        MacroProgress {
            name: "Calories",
            current: totals.calories,
            target: goals.calories,
            unit: "kcal",
            ratio: progress_ratio(totals.calories, f64::from(goals.calories)),
        },
        MacroProgress {
            name: "Protein",
            current: totals.protein,
            target: goals.protein,
            unit: "g",
            ratio: progress_ratio(totals.protein, f64::from(goals.protein)),
        },
        MacroProgress {
            name: "Carbs",
            current: totals.carbs,
            target: goals.carbs,
            unit: "g",
            ratio: progress_ratio(totals.carbs, f64::from(goals.carbs)),
        },
        MacroProgress {
            name: "Fat",
            current: totals.fat,
            target: goals.fat,
            unit: "g",
            ratio: progress_ratio(totals.fat, f64::from(goals.fat)),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn food(calories: f64, protein: f64, carbohydrates: f64, fat: f64) -> NutrientRecord {
        NutrientRecord {
            calories,
            protein,
            carbohydrates,
            fat,
            ..NutrientRecord::default()
        }
    }

    #[test]
    fn empty_log_sums_to_zero() {
        let totals = NutrientTotals::from_log(&[]);
        assert_eq!(totals, NutrientTotals::default());
    }

    #[test]
    fn totals_are_field_wise_sums() {
        let log = vec![
            food(206.0, 4.3, 44.5, 0.4),
            food(300.0, 25.0, 10.0, 18.0),
            food(0.0, 0.0, 0.0, 0.0),
        ];

        let totals = NutrientTotals::from_log(&log);
        assert_eq!(totals.calories, 506.0);
        assert_eq!(totals.protein, 29.3);
        assert_eq!(totals.carbs, 54.5);
        assert_eq!(totals.fat, 18.4);
    }

    #[test]
    fn ratio_is_clamped_to_one() {
        assert_eq!(progress_ratio(3000.0, 2000.0), 1.0);
        assert_eq!(progress_ratio(2000.0, 2000.0), 1.0);
    }

    #[test]
    fn ratio_is_zero_for_non_positive_targets() {
        assert_eq!(progress_ratio(1500.0, 0.0), 0.0);
        assert_eq!(progress_ratio(1500.0, -10.0), 0.0);
    }

    #[test]
    fn seventy_five_percent_of_calorie_goal() {
        let totals = NutrientTotals {
            calories: 1500.0,
            ..NutrientTotals::default()
        };
        let goals = Goals {
            calories: 2000,
            protein: 100,
            carbs: 250,
            fat: 60,
        };

        let rows = overview(&totals, &goals);
        assert_eq!(rows[0].name, "Calories");
        assert_eq!(rows[0].ratio, 0.75);
        assert_eq!(rows[1].ratio, 0.0);
    }
}
