use uuid::Uuid;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub channel_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
    // join projection, absent when the author profile is gone
    #[serde(default)]
    pub author: Option<Author>,
}

impl Message {
    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .map(|author| author.display_name.as_str())
            .unwrap_or("unknown")
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Author {
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Mentor,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub city: Option<String>,
    pub fun_fact: Option<String>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Channel {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub display_name: String,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Meeting {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub start_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_at: time::OffsetDateTime,
    #[serde(default)]
    pub student: Option<Person>,
    #[serde(default)]
    pub mentor: Option<Person>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Corrected,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub video_url: String,
    pub status: TaskStatus,
    pub mentor_comment: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
    pub student_id: Uuid,
    #[serde(default)]
    pub channel_id: Option<Uuid>,
    #[serde(default)]
    pub student: Option<Person>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyKind {
    Theory,
    Hymns,
    Live,
    Composition,
}

impl StudyKind {
    pub const ALL: [Self; 4] = [Self::Theory, Self::Hymns, Self::Live, Self::Composition];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Theory => "theory",
            Self::Hymns => "hymns",
            Self::Live => "live",
            Self::Composition => "composition",
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct StudyEntry {
    pub study_kind: StudyKind,
    #[serde(with = "time::serde::rfc3339")]
    pub completed_at: time::OffsetDateTime,
}
