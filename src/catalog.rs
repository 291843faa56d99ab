// src/catalog.rs

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const SELECT_SENTINEL: &str = "-- Select --";
pub const NOT_APPLICABLE: &str = "N/A";

const YEARS: &[&str] = &["Freshman", "Sophomore", "Junior", "Senior", "Graduate"];

const FIELDS_OF_STUDY: &[&str] = &[
    "Accounting",
    "Finance",
    "Economics",
    "Business Administration",
    "Management",
    "Marketing",
    "International Business",
    "Entrepreneurship",
    "Supply Chain Management / Logistics",
    "Management Information Systems (MIS)",
    "Computer Science",
    "Information Technology",
    "Data Science",
    "Data Analytics",
    "Computer Engineering",
    "Software Engineering",
    "Electrical Engineering",
    "Mechanical Engineering",
    "Industrial Engineering",
    "Civil Engineering",
    "Chemical Engineering",
    "Systems Engineering",
    "Biomedical Engineering",
    "Environmental Engineering",
    "Mathematics",
    "Statistics",
    "Applied Mathematics",
    "Physics",
    "Chemistry",
    "Biology",
    "Environmental Science",
    "Biochemistry",
    "Neuroscience",
    "Marine Science",
    "Environmental Studies",
    "Agriculture",
    "Forestry",
    "Political Science",
    "Psychology",
    "Sociology",
    "Anthropology",
    "International Relations",
    "Public Policy",
    "Geography",
    "Criminology",
    "Legal Studies",
    "Urban Studies / Planning",
    "Public Administration",
    "Homeland Security",
    "English / Literature",
    "History",
    "Philosophy",
    "Linguistics",
    "Art / Art History",
    "Design / Graphic Design",
    "Music",
    "Theatre / Performing Arts",
    "Communications",
    "Journalism",
    "Film / Media Studies",
    "Nursing",
    "Public Health",
    "Pre-Med / Biology (Health Sciences)",
    "Kinesiology / Exercise Science",
    "Pharmacy",
    "Nutrition",
    "Education",
    "Early Childhood Education",
    "Secondary Education",
    "Human Development",
    "Social Work",
];

const ASSIGNMENT_TYPES: &[&str] = &[
    "Problem Set",
    "Coding Assignment",
    "Research Paper",
    "Creative Writing/Essay",
    "Presentation/Slide deck",
    "Modeling (financial, statistics, data)",
    "Discussion post/short written assignment",
    "Readings (textbooks or otherwise)",
    "Case Study",
];

const RESOURCES: &[&str] = &[
    "Textbook / class materials",
    "Google/internet",
    "AI / Chatgpt",
    "Tutoring service (Chegg, etc.)",
    "Study group with peers",
    "Other",
];

const LOCATIONS: &[&str] = &[
    "At home/private setting",
    "School/library",
    "Other public setting (cafe, etc.)",
];

const RANKING_TOKENS: &[&str] = &["morning", "afternoon", "evening", "night"];

/// Classification fields backed by a fixed choice set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogField {
    Year,
    Major,
    SecondConcentration,
    Minor,
    FieldOfStudy,
    AssignmentType,
    Resource,
    Location,
}

impl CatalogField {
    pub const ALL: [CatalogField; 8] = [
        CatalogField::Year,
        CatalogField::Major,
        CatalogField::SecondConcentration,
        CatalogField::Minor,
        CatalogField::FieldOfStudy,
        CatalogField::AssignmentType,
        CatalogField::Resource,
        CatalogField::Location,
    ];

    /// Only the optional academic fields offer an "N/A" choice.
    pub fn supports_not_applicable(self) -> bool {
        matches!(self, CatalogField::SecondConcentration | CatalogField::Minor)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CatalogField::Year => "year",
            CatalogField::Major => "major",
            CatalogField::SecondConcentration => "second_concentration",
            CatalogField::Minor => "minor",
            CatalogField::FieldOfStudy => "field_of_study",
            CatalogField::AssignmentType => "assignment_type",
            CatalogField::Resource => "external_resources",
            CatalogField::Location => "work_location",
        }
    }
}

impl FromStr for CatalogField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CatalogField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| AppError::BadRequest(format!("unknown catalog field: {}", s)))
    }
}

/// Read-only choice sets for every select control.
///
/// Built once and shared by handle; nothing mutates it after construction.
#[derive(Debug, Clone)]
pub struct OptionCatalog {
    years: Vec<String>,
    fields_of_study: Vec<String>,
    assignment_types: Vec<String>,
    resources: Vec<String>,
    locations: Vec<String>,
    ranking: Vec<String>,
}

impl Default for OptionCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl OptionCatalog {
    /// The survey vocabulary the estimation model was trained on.
    pub fn standard() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            years: owned(YEARS),
            fields_of_study: owned(FIELDS_OF_STUDY),
            assignment_types: owned(ASSIGNMENT_TYPES),
            resources: owned(RESOURCES),
            locations: owned(LOCATIONS),
            ranking: owned(RANKING_TOKENS),
        }
    }

    fn values(&self, field: CatalogField) -> &[String] {
        match field {
            CatalogField::Year => &self.years,
            CatalogField::Major
            | CatalogField::SecondConcentration
            | CatalogField::Minor
            | CatalogField::FieldOfStudy => &self.fields_of_study,
            CatalogField::AssignmentType => &self.assignment_types,
            CatalogField::Resource => &self.resources,
            CatalogField::Location => &self.locations,
        }
    }

    /// Ordered choices for a select control, sentinel first.
    ///
    /// The sentinel is "N/A" when the caller asks for it and the field supports it,
    /// "-- Select --" otherwise.
    pub fn options_for(&self, field: CatalogField, include_not_applicable: bool) -> Vec<String> {
        let sentinel = if include_not_applicable && field.supports_not_applicable() {
            NOT_APPLICABLE
        } else {
            SELECT_SENTINEL
        };
        let values = self.values(field);
        let mut options = Vec::with_capacity(values.len() + 1);
        options.push(sentinel.to_string());
        options.extend(values.iter().cloned());
        options
    }

    pub fn is_valid_choice(&self, field: CatalogField, value: &str) -> bool {
        (value == NOT_APPLICABLE && field.supports_not_applicable())
            || self.values(field).iter().any(|v| v == value)
    }

    /// Stable ranking tokens in their default order.
    pub fn ranking_tokens(&self) -> Vec<String> {
        self.ranking.clone()
    }
}
