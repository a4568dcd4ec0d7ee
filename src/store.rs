use anyhow::Context as _;
use reqwest::{header::HeaderName, StatusCode};
use url::Url;
use uuid::Uuid;

use crate::resolver::Fut;

pub mod data;

pub struct Config {
    pub base_url: Url,
    pub api_key: String,
}

/// Client for the hosted row store. Reads are filtered selects with join
/// projections, writes are single-row inserts/updates. Every call runs on the
/// runtime and hands back a [`Fut`].
#[derive(Clone)]
pub struct Client {
    client: reqwest::Client,
    base: Url,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyMember,
}

impl Client {
    pub fn create(config: Config) -> Self {
        let headers = [
            ("user-agent", crate::USER_AGENT),
            ("apikey", &*config.api_key),
        ]
        .into_iter()
        .map(|(k, v)| {
            (
                HeaderName::from_static(k),
                v.parse().expect("valid header value"),
            )
        })
        .collect();

        let client = reqwest::ClientBuilder::new()
            .default_headers(headers)
            .build()
            .expect("valid client configuration");

        Self {
            client,
            base: config.base_url,
        }
    }

    const MESSAGE_COLUMNS: &'static str = "*,author:profiles(display_name,avatar_url)";

    pub fn channel_messages(&self, channel_id: Uuid) -> Fut<anyhow::Result<Vec<data::Message>>> {
        self.rows_fut(
            "messages",
            vec![
                ("select", Self::MESSAGE_COLUMNS.to_string()),
                ("channel_id", format!("eq.{channel_id}")),
                ("order", "created_at.asc".to_string()),
            ],
            |rows| rows,
        )
    }

    pub fn message_by_id(&self, id: Uuid) -> Fut<Option<data::Message>> {
        self.rows_fut(
            "messages",
            vec![
                ("select", Self::MESSAGE_COLUMNS.to_string()),
                ("id", format!("eq.{id}")),
                ("limit", "1".to_string()),
            ],
            Self::result_vec_single,
        )
    }

    pub fn insert_message(
        &self,
        channel_id: Uuid,
        author_id: Uuid,
        body: &str,
    ) -> Fut<anyhow::Result<()>> {
        #[derive(serde::Serialize)]
        struct Row {
            channel_id: Uuid,
            author_id: Uuid,
            body: String,
        }

        self.insert_fut(
            "messages",
            Row {
                channel_id,
                author_id,
                body: body.to_string(),
            },
        )
    }

    pub fn membership(&self, channel_id: Uuid, user_id: Uuid) -> Fut<anyhow::Result<bool>> {
        self.rows_fut::<serde_json::Value, _>(
            "channel_members",
            vec![
                ("select", "channel_id".to_string()),
                ("channel_id", format!("eq.{channel_id}")),
                ("user_id", format!("eq.{user_id}")),
                ("limit", "1".to_string()),
            ],
            |rows| rows.map(|rows| !rows.is_empty()),
        )
    }

    pub fn join_channel(&self, channel_id: Uuid, user_id: Uuid) -> Fut<anyhow::Result<JoinOutcome>> {
        #[derive(serde::Serialize)]
        struct Row {
            channel_id: Uuid,
            user_id: Uuid,
        }

        let this = self.clone();
        Fut::spawn(async move {
            let resp = this
                .client
                .post(this.endpoint("channel_members"))
                .header("prefer", "return=minimal")
                .json(&Row {
                    channel_id,
                    user_id,
                })
                .send()
                .await?;

            // unique (channel_id, user_id) constraint
            if resp.status() == StatusCode::CONFLICT {
                return Ok(JoinOutcome::AlreadyMember);
            }

            resp.error_for_status()?;
            Ok(JoinOutcome::Joined)
        })
    }

    pub fn channels(&self) -> Fut<anyhow::Result<Vec<data::Channel>>> {
        self.rows_fut(
            "channels",
            vec![("order", "created_at.desc".to_string())],
            |rows| rows,
        )
    }

    pub fn channel_by_id(&self, id: Uuid) -> Fut<Option<data::Channel>> {
        self.rows_fut(
            "channels",
            vec![("id", format!("eq.{id}")), ("limit", "1".to_string())],
            Self::result_vec_single,
        )
    }

    pub fn create_channel(&self, name: &str, description: &str) -> Fut<anyhow::Result<()>> {
        #[derive(serde::Serialize)]
        struct Row {
            name: String,
            description: String,
        }

        self.insert_fut(
            "channels",
            Row {
                name: name.to_string(),
                description: description.to_string(),
            },
        )
    }

    pub fn profile(&self, user_id: Uuid) -> Fut<Option<data::Profile>> {
        self.rows_fut(
            "profiles",
            vec![("id", format!("eq.{user_id}")), ("limit", "1".to_string())],
            Self::result_vec_single,
        )
    }

    pub fn meetings_after(
        &self,
        user_id: Uuid,
        after: time::OffsetDateTime,
    ) -> Fut<anyhow::Result<Vec<data::Meeting>>> {
        self.rows_fut(
            "meetings",
            vec![
                (
                    "select",
                    "*,student:profiles!meetings_student_id_fkey(id,display_name),\
                     mentor:profiles!meetings_mentor_id_fkey(id,display_name)"
                        .to_string(),
                ),
                (
                    "or",
                    format!("(student_id.eq.{user_id},mentor_id.eq.{user_id})"),
                ),
                ("start_at", format!("gte.{}", stamp(after))),
                ("order", "start_at.asc".to_string()),
            ],
            |rows| rows,
        )
    }

    pub fn tasks_for(&self, profile: &data::Profile) -> Fut<anyhow::Result<Vec<data::Task>>> {
        let mut query = vec![
            (
                "select",
                "*,student:profiles!tasks_student_id_fkey(id,display_name)".to_string(),
            ),
            ("order", "created_at.desc".to_string()),
        ];

        // students only ever see their own submissions
        if profile.role == data::Role::Student {
            query.push(("student_id", format!("eq.{}", profile.id)));
        }

        self.rows_fut("tasks", query, |rows| rows)
    }

    pub fn submit_task(
        &self,
        student_id: Uuid,
        video_url: &str,
        channel_id: Option<Uuid>,
    ) -> Fut<anyhow::Result<()>> {
        #[derive(serde::Serialize)]
        struct Row {
            student_id: Uuid,
            video_url: String,
            channel_id: Option<Uuid>,
            status: data::TaskStatus,
        }

        self.insert_fut(
            "tasks",
            Row {
                student_id,
                video_url: video_url.to_string(),
                channel_id,
                status: data::TaskStatus::Pending,
            },
        )
    }

    pub fn correct_task(
        &self,
        task_id: Uuid,
        mentor_id: Uuid,
        comment: &str,
    ) -> Fut<anyhow::Result<()>> {
        #[derive(serde::Serialize)]
        struct Patch<'a> {
            status: data::TaskStatus,
            mentor_comment: &'a str,
            mentor_id: Uuid,
        }

        let patch = serde_json::to_value(Patch {
            status: data::TaskStatus::Corrected,
            mentor_comment: comment,
            mentor_id,
        });

        let this = self.clone();
        Fut::spawn(async move {
            this.client
                .patch(this.endpoint("tasks"))
                .query(&[("id", format!("eq.{task_id}"))])
                .header("prefer", "return=minimal")
                .json(&patch?)
                .send()
                .await?
                .error_for_status()?;
            Ok(())
        })
    }

    pub fn study_entries_on(
        &self,
        user_id: Uuid,
        day: time::Date,
    ) -> Fut<anyhow::Result<Vec<data::StudyEntry>>> {
        let (start, end) = crate::study::day_bounds(day);
        self.rows_fut(
            "study_entries",
            vec![
                ("select", "study_kind,completed_at".to_string()),
                ("user_id", format!("eq.{user_id}")),
                ("completed_at", format!("gte.{}", stamp(start))),
                ("completed_at", format!("lte.{}", stamp(end))),
            ],
            |rows| rows,
        )
    }

    pub fn log_study(&self, user_id: Uuid, kind: data::StudyKind) -> Fut<anyhow::Result<()>> {
        #[derive(serde::Serialize)]
        struct Row {
            user_id: Uuid,
            study_kind: data::StudyKind,
        }

        self.insert_fut(
            "study_entries",
            Row {
                user_id,
                study_kind: kind,
            },
        )
    }

    pub fn clear_study(
        &self,
        user_id: Uuid,
        kind: data::StudyKind,
        day: time::Date,
    ) -> Fut<anyhow::Result<()>> {
        let (start, end) = crate::study::day_bounds(day);
        let this = self.clone();
        Fut::spawn(async move {
            this.client
                .delete(this.endpoint("study_entries"))
                .query(&[
                    ("user_id", format!("eq.{user_id}")),
                    ("study_kind", format!("eq.{}", kind.label())),
                    ("completed_at", format!("gte.{}", stamp(start))),
                    ("completed_at", format!("lte.{}", stamp(end))),
                ])
                .send()
                .await?
                .error_for_status()?;
            Ok(())
        })
    }

    fn result_vec_single<T>(result: anyhow::Result<Vec<T>>) -> Option<T> {
        let mut items = result.ok().filter(|items| !items.is_empty())?;
        Some(items.remove(0))
    }

    fn rows_fut<T, U>(
        &self,
        path: &'static str,
        query: Vec<(&'static str, String)>,
        map: impl FnOnce(anyhow::Result<Vec<T>>) -> U + Send + 'static,
    ) -> Fut<U>
    where
        U: Send + 'static,
        T: for<'de> serde::Deserialize<'de> + Send + 'static,
    {
        let this = self.clone();
        Fut::spawn(async move {
            let result = this.get_rows(path, &query).await;
            map(result)
        })
    }

    async fn get_rows<T>(&self, path: &str, query: &[(&str, String)]) -> anyhow::Result<Vec<T>>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let rows = self
            .client
            .get(self.endpoint(path))
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("malformed rows from '{path}'"))?;

        Ok(rows)
    }

    fn insert_fut(
        &self,
        path: &'static str,
        row: impl serde::Serialize + Send + 'static,
    ) -> Fut<anyhow::Result<()>> {
        let this = self.clone();
        Fut::spawn(async move {
            this.client
                .post(this.endpoint(path))
                .header("prefer", "return=minimal")
                .json(&row)
                .send()
                .await?
                .error_for_status()?;
            Ok(())
        })
    }

    fn endpoint(&self, path: &str) -> Url {
        self.base.join(path).expect("valid endpoint path")
    }
}

fn stamp(at: time::OffsetDateTime) -> String {
    at.format(&time::format_description::well_known::Rfc3339)
        .expect("well-formed timestamp")
}
