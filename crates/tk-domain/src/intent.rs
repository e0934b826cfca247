use serde::{Deserialize, Serialize};

/// What `parse` believes the user is doing with this utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Question,
    Request,
    Confusion,
    Correction,
    Claim,
    Unknown,
}

/// The subject-matter bucket `parse` assigns the utterance to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Mathematics,
    Physics,
    Chemistry,
    Biology,
    History,
    Language,
    ComputerScience,
    Geography,
    Economics,
    #[default]
    General,
}

impl Subject {
    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Mathematics => "mathematics",
            Subject::Physics => "physics",
            Subject::Chemistry => "chemistry",
            Subject::Biology => "biology",
            Subject::History => "history",
            Subject::Language => "language",
            Subject::ComputerScience => "computer_science",
            Subject::Geography => "geography",
            Subject::Economics => "economics",
            Subject::General => "general",
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
