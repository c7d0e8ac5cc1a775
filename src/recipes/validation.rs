use crate::error::ServiceError;

pub const DEFAULT_MIN_INSTRUCTIONS_LENGTH: usize = 20;

pub const TITLE_REQUIRED: &str = "Title is required";
pub const INSTRUCTIONS_REQUIRED: &str = "Instructions are required";
pub const MINUTES_NOT_POSITIVE: &str = "Minutes to complete must be a positive integer";

/// Recipe payload after JSON decoding; every field may still be missing.
#[derive(Debug, Default, Clone)]
pub struct RecipeInput {
    pub title: Option<String>,
    pub instructions: Option<String>,
    pub minutes_to_complete: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeRules {
    min_instructions_length: usize,
}

impl Default for RecipeRules {
    fn default() -> Self {
        Self {
            min_instructions_length: DEFAULT_MIN_INSTRUCTIONS_LENGTH,
        }
    }
}

/// Fields that passed validation, trimmed and ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRecipe {
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: Option<i32>,
}

impl RecipeRules {
    #[must_use]
    pub fn with_min_instructions_length(mut self, length: usize) -> Self {
        self.min_instructions_length = length;
        self
    }

    #[must_use]
    pub fn min_instructions_length(&self) -> usize {
        self.min_instructions_length
    }

    /// Check `input` and return the fields to store.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` naming the first offending field.
    pub fn validate(&self, input: RecipeInput) -> Result<ValidRecipe, ServiceError> {
        let title = input
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ServiceError::validation(TITLE_REQUIRED))?;

        let instructions = input
            .instructions
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty())
            .ok_or_else(|| ServiceError::validation(INSTRUCTIONS_REQUIRED))?;

        if instructions.chars().count() < self.min_instructions_length {
            return Err(ServiceError::validation(format!(
                "Instructions must be at least {} characters long",
                self.min_instructions_length
            )));
        }

        let minutes_to_complete = match input.minutes_to_complete {
            None => None,
            Some(minutes) => Some(
                i32::try_from(minutes)
                    .ok()
                    .filter(|m| *m > 0)
                    .ok_or_else(|| ServiceError::validation(MINUTES_NOT_POSITIVE))?,
            ),
        };

        Ok(ValidRecipe {
            title,
            instructions,
            minutes_to_complete,
        })
    }
}
