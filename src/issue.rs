//! The issue read model.
//!
//! An [`Issue`] is mapped field by field from one issue document. Apart from
//! the key and the project, every field may be missing from the JSON and then
//! simply reads as `None`.

use std::collections::BTreeMap;
use std::fmt;

use chrono::DateTime;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::api::types::{rich_text, Progress, UserRef, WorklogEntry, WorklogResponse};
use crate::api::{ApiError, Client, RequestOptions, Result, Transport};
use crate::config::ClientConfig;
use crate::format::{sprintf, FormatError, Lookup};

/// A JIRA issue.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    id: String,
    project: String,
    project_id: String,
    url: String,
    summary: Option<String>,
    description: Option<String>,
    issue_type: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    reporter: Option<String>,
    assignee: Option<String>,
    fix_versions: Option<Vec<String>>,
    resolution: Option<String>,
    resolution_date: Option<String>,
    progress: Option<Progress>,
    original_estimate: u64,
    custom_fields: BTreeMap<String, Value>,
    worklogs: Option<Vec<WorkLog>>,
}

/// One work log entry of an issue.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkLog {
    pub author: String,
    /// Start of the logged work, in milliseconds since the Unix epoch.
    pub started: i64,
    /// Time spent, in seconds.
    pub time: u64,
    pub comment: String,
    /// Time spent, in hours.
    pub hours: f64,
}

impl TryFrom<WorklogEntry> for WorkLog {
    type Error = ApiError;

    fn try_from(entry: WorklogEntry) -> Result<Self> {
        let started = parse_timestamp(&entry.started).ok_or_else(|| {
            ApiError::InvalidResponse(format!("unparseable worklog start '{}'", entry.started))
        })?;

        Ok(Self {
            author: entry
                .author
                .as_ref()
                .and_then(UserRef::label)
                .unwrap_or_default()
                .to_string(),
            started,
            time: entry.time_spent_seconds,
            comment: entry.comment.as_ref().and_then(rich_text).unwrap_or_default(),
            hours: entry.time_spent_seconds as f64 / 3600.0,
        })
    }
}

/// Parse JIRA's `2014-10-04T12:34:56.000+0000` or an RFC 3339 timestamp into epoch millis.
fn parse_timestamp(raw: &str) -> Option<i64> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.timestamp_millis())
}

impl Issue {
    /// Issue types counted as project (feature) work.
    pub const PROJECT_TYPES: [&'static str; 3] = ["Feature", "Improvement", "Task"];

    /// Map an issue document.
    ///
    /// # Errors
    ///
    /// Returns `InvalidResponse` if the document has no `key`, no `fields`
    /// object, or no `fields.project` object.
    pub fn from_json(json: Value, config: &ClientConfig) -> Result<Self> {
        let id = json
            .get("key")
            .and_then(scalar_text)
            .ok_or_else(|| ApiError::InvalidResponse("issue has no key".to_string()))?;
        let fields = json
            .get("fields")
            .and_then(Value::as_object)
            .ok_or_else(|| ApiError::InvalidResponse(format!("issue {} has no fields", id)))?;
        let project = fields
            .get("project")
            .and_then(Value::as_object)
            .ok_or_else(|| ApiError::InvalidResponse(format!("issue {} has no project", id)))?;

        let custom_fields = config
            .custom_fields()
            .iter()
            .map(|(name, rule)| (name.clone(), rule.extract(fields).unwrap_or(Value::Null)))
            .collect();

        Ok(Self {
            url: format!("{}/browse/{}", config.root_uri(), id),
            project: project.get("name").and_then(scalar_text).unwrap_or_default(),
            project_id: project.get("id").and_then(scalar_text).unwrap_or_default(),
            summary: text_field(fields, "summary"),
            description: fields.get("description").and_then(rich_text),
            issue_type: name_of(fields, "issuetype"),
            status: name_of(fields, "status"),
            priority: name_of(fields, "priority"),
            reporter: user_of(fields, "reporter"),
            assignee: user_of(fields, "assignee"),
            fix_versions: fields
                .get("fixVersions")
                .and_then(Value::as_array)
                .map(|versions| {
                    versions
                        .iter()
                        .filter_map(|v| v.get("name").and_then(Value::as_str))
                        .map(str::to_string)
                        .collect()
                }),
            resolution: match fields.get("resolution") {
                Some(Value::String(name)) => Some(name.clone()),
                _ => name_of(fields, "resolution"),
            },
            resolution_date: text_field(fields, "resolutiondate"),
            progress: fields
                .get("aggregateprogress")
                .and_then(|p| serde_json::from_value(p.clone()).ok()),
            original_estimate: fields
                .get("timeoriginalestimate")
                .and_then(Value::as_u64)
                .unwrap_or(0),
            custom_fields,
            worklogs: None,
            id,
        })
    }

    /// The issue key, e.g. "PROJ-123".
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The project name.
    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Browse link: `<root>/browse/<key>`.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// The description as plain text.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The issue type name, e.g. "Bug".
    pub fn issue_type(&self) -> Option<&str> {
        self.issue_type.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn priority(&self) -> Option<&str> {
        self.priority.as_deref()
    }

    pub fn reporter(&self) -> Option<&str> {
        self.reporter.as_deref()
    }

    pub fn assignee(&self) -> Option<&str> {
        self.assignee.as_deref()
    }

    pub fn fix_versions(&self) -> Option<&[String]> {
        self.fix_versions.as_deref()
    }

    pub fn resolution(&self) -> Option<&str> {
        self.resolution.as_deref()
    }

    pub fn resolution_date(&self) -> Option<&str> {
        self.resolution_date.as_deref()
    }

    pub fn progress(&self) -> Option<&Progress> {
        self.progress.as_ref()
    }

    /// Original estimate in seconds; 0 when none was set.
    pub fn original_estimate(&self) -> u64 {
        self.original_estimate
    }

    /// A configured custom field, if the issue had a value for it.
    pub fn custom_field(&self, name: &str) -> Option<&Value> {
        self.custom_fields.get(name).filter(|v| !v.is_null())
    }

    /// Every configured custom field; `null` where the issue had no value.
    pub fn custom_fields(&self) -> &BTreeMap<String, Value> {
        &self.custom_fields
    }

    /// The work log, once [`load_work_log`](Self::load_work_log) has succeeded.
    pub fn worklogs(&self) -> Option<&[WorkLog]> {
        self.worklogs.as_deref()
    }

    /// Fetch this issue's work log and store it on the issue.
    ///
    /// A later call replaces the stored entries. On error the stored entries
    /// are left as they were.
    #[instrument(skip(self, client), fields(issue_key = %self.id))]
    pub async fn load_work_log<T: Transport>(&mut self, client: &Client<T>) -> Result<&mut Self> {
        let path = format!("issue/{}/worklog", self.id);
        let json = client.request(&path, RequestOptions::get()).await?;

        let response: WorklogResponse = serde_json::from_value(json)
            .map_err(|e| ApiError::InvalidResponse(format!("malformed worklog response: {}", e)))?;
        let worklogs = response
            .worklogs
            .into_iter()
            .map(WorkLog::try_from)
            .collect::<Result<Vec<_>>>()?;

        debug!(count = worklogs.len(), "Loaded work log");
        self.worklogs = Some(worklogs);
        Ok(self)
    }

    /// Render a `%(name)s` template with this issue's attributes.
    ///
    /// ```
    /// # use jirakit::{ClientConfig, Issue};
    /// # let config = ClientConfig::builder("https://jira.example.com").build().unwrap();
    /// # let json = serde_json::json!({"key": "MY-1", "fields": {"project": {"id": "1", "name": "P"}, "summary": "Fix it"}});
    /// let issue = Issue::from_json(json, &config).unwrap();
    /// assert_eq!(issue.format("%(id)-6s| %(summary)s").unwrap(), "MY-1  | Fix it");
    /// ```
    pub fn format(&self, template: &str) -> std::result::Result<String, FormatError> {
        sprintf(template, self)
    }

    /// True iff the type is "Bug".
    pub fn is_bug(&self) -> bool {
        self.issue_type.as_deref() == Some("Bug")
    }

    /// True iff the type is one of [`Issue::PROJECT_TYPES`].
    pub fn is_project(&self) -> bool {
        self.issue_type
            .as_deref()
            .is_some_and(|t| Self::PROJECT_TYPES.contains(&t))
    }
}

/// Predicate form of [`Issue::is_bug`], for filters.
pub fn is_bug(issue: &Issue) -> bool {
    issue.is_bug()
}

/// Predicate form of [`Issue::is_project`], for filters.
pub fn is_project(issue: &Issue) -> bool {
    issue.is_project()
}

impl Lookup for Issue {
    fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.custom_fields.get(name) {
            return Some(value.clone());
        }

        let opt = |v: &Option<String>| v.clone().map_or(Value::Null, Value::String);
        let value = match name {
            "id" => Value::String(self.id.clone()),
            "project" => Value::String(self.project.clone()),
            "project_id" => Value::String(self.project_id.clone()),
            "url" => Value::String(self.url.clone()),
            "summary" => opt(&self.summary),
            "description" => opt(&self.description),
            "type" => opt(&self.issue_type),
            "status" => opt(&self.status),
            "priority" => opt(&self.priority),
            "reporter" => opt(&self.reporter),
            "assignee" => opt(&self.assignee),
            "fix_versions" | "fixVersions" => self
                .fix_versions
                .as_ref()
                .map_or(Value::Null, |v| Value::String(v.join(", "))),
            "resolution" => opt(&self.resolution),
            "resolution_date" | "resolutionDate" => opt(&self.resolution_date),
            "progress" => self
                .progress
                .as_ref()
                .and_then(|p| serde_json::to_value(p).ok())
                .unwrap_or(Value::Null),
            "original_estimate" | "originalLOE" => Value::from(self.original_estimate),
            _ => return None,
        };
        Some(value)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.summary.as_deref().unwrap_or_default())
    }
}

/// A string, or a number rendered as its decimal text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_string)
}

fn name_of(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)?
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn user_of(fields: &Map<String, Value>, key: &str) -> Option<String> {
    let user: UserRef = serde_json::from_value(fields.get(key)?.clone()).ok()?;
    user.label().map(str::to_string)
}
