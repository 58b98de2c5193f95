/// Key shared by intake and outcome documents.
pub const ANIMAL_ID: &str = "animal_id";

/// Store-internal document id, never part of the dataset.
pub const STORE_ID: &str = "_id";

pub const DATETIME_INTAKE: &str = "datetime_intake";
pub const DATETIME_OUTCOME: &str = "datetime_outcome";

pub const INTAKE_SUFFIX: &str = "_intake";
pub const OUTCOME_SUFFIX: &str = "_outcome";

pub const DEFAULT_INTAKE_COLLECTION: &str = "intakes";
pub const DEFAULT_OUTCOME_COLLECTION: &str = "outcomes";

/// Text written wherever a value is missing.
pub const UNKNOWN: &str = "unknown";

pub mod fields {
    pub const BREED: &str = "breed";
    pub const AGE_UPON_OUTCOME_IN_WEEKS: &str = "age_upon_outcome_in_weeks";
    pub const AGE_IN_WEEKS: &str = "age_in_weeks";
}

pub mod derived {
    pub const AGE_IN_YEARS: &str = "age_in_years";
    pub const INTAKE_YEAR: &str = "intake_year";
    pub const OUTCOME_YEAR: &str = "outcome_year";
    pub const DAYS_IN_SHELTER: &str = "days_in_shelter";
    pub const IS_WORKING_DOG: &str = "is_working_dog";
}

pub const WEEKS_PER_YEAR: f64 = 52.0;

/// Lower-cased breed names classified as working dogs.
pub const WORKING_BREEDS: [&str; 6] = [
    "german shepherd dog",
    "labrador retriever",
    "golden retriever",
    "belgian malinois",
    "border collie",
    "australian cattle dog",
];
