use super::{Commit, GitPlatform, PlatformConfig, PushEvent, Repository};
use crate::models::{Calendar, ContributionDay, Week};
use crate::utils::http_client::create_http_client;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

const CONTRIBUTION_CALENDAR_QUERY: &str = r#"
    query($username: String!, $from: DateTime!, $to: DateTime!) {
        user(login: $username) {
            contributionsCollection(from: $from, to: $to) {
                contributionCalendar {
                    totalContributions
                    weeks {
                        contributionDays {
                            contributionCount
                            date
                        }
                    }
                }
            }
        }
    }
"#;

pub struct GitHubClient {
    client: Client,
    config: PlatformConfig,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(config: PlatformConfig, token: Option<String>) -> Result<Self> {
        Ok(Self {
            client: create_http_client()?,
            config,
            token,
        })
    }

    fn graphql_url(&self) -> String {
        match self.config.api_base_url.strip_suffix("/v3") {
            Some(enterprise_api) => format!("{}/graphql", enterprise_api),
            None => format!("{}/graphql", self.config.api_base_url),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("Accept", "application/vnd.github+json");
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn send_get(&self, path: &str, query: &[(&str, &str)]) -> Result<Response> {
        Ok(self
            .authorized(self.client.get(format!("{}{}", self.config.api_base_url, path)))
            .query(query)
            .send()
            .await?)
    }

    async fn read_json<T: DeserializeOwned>(path: &str, response: Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "GitHub API request {} failed with status {}: {}",
                path,
                status,
                error_text
            ));
        }

        response
            .json()
            .await
            .with_context(|| format!("Malformed GitHub response from {}", path))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self.send_get(path, query).await?;
        Self::read_json(path, response).await
    }
}

#[async_trait]
impl GitPlatform for GitHubClient {
    async fn fetch_contribution_calendar(
        &self,
        username: &str,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> Result<Calendar> {
        if self.token.is_none() {
            return Err(anyhow!("The GitHub GraphQL API requires an access token"));
        }

        let variables = json!({
            "username": username,
            "from": from.to_rfc3339(),
            "to": to.to_rfc3339(),
        });

        let response = self
            .authorized(self.client.post(self.graphql_url()))
            .json(&json!({
                "query": CONTRIBUTION_CALENDAR_QUERY,
                "variables": variables,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "GitHub API request failed with status {}: {}",
                status,
                error_text
            ));
        }

        let response_data: GitHubCalendarResponse = response
            .json()
            .await
            .context("Malformed GitHub contribution calendar response")?;
        let calendar = calendar_from_response(response_data)?;

        log::info!(
            "📊 GitHub returned {} days of contributions ({} total) for {}..{}",
            calendar.day_count(),
            calendar.total_contributions(),
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d")
        );

        Ok(calendar)
    }

    async fn fetch_repositories(&self, username: &str) -> Result<Vec<Repository>> {
        let repos: Vec<GitHubRepo> = self
            .get_json(
                &format!("/users/{}/repos", username),
                &[("type", "public"), ("per_page", "100"), ("sort", "pushed")],
            )
            .await?;

        log::info!("📦 Fetched {} public repositories for {}", repos.len(), username);

        Ok(repos
            .into_iter()
            .map(|repo| Repository {
                name: repo.name,
                full_name: repo.full_name,
                is_private: repo.private,
            })
            .collect())
    }

    async fn fetch_commits(&self, owner: &str, repository: &str) -> Result<Vec<Commit>> {
        let path = format!("/repos/{}/{}/commits", owner, repository);
        let response = self.send_get(&path, &[("per_page", "100")]).await?;

        // GitHub answers 409 for a repository without any commits
        if response.status() == StatusCode::CONFLICT {
            log::debug!("Repository {}/{} is empty", owner, repository);
            return Ok(Vec::new());
        }

        let commits: Vec<GitHubCommit> = Self::read_json(&path, response).await?;

        Ok(commits
            .into_iter()
            .map(|commit| Commit {
                sha: commit.sha,
                authored_at: commit.commit.author.date,
            })
            .collect())
    }

    async fn fetch_push_events(&self, username: &str) -> Result<Vec<PushEvent>> {
        let events: Vec<GitHubEvent> = self
            .get_json(
                &format!("/users/{}/events/public", username),
                &[("per_page", "100")],
            )
            .await?;

        log::info!("📥 Fetched {} events from GitHub", events.len());

        Ok(events.into_iter().filter_map(push_event_from).collect())
    }
}

/// Convert a GraphQL calendar payload into a [`Calendar`]
fn calendar_from_response(response: GitHubCalendarResponse) -> Result<Calendar> {
    if let Some(errors) = response.errors {
        let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
        return Err(anyhow!("GitHub GraphQL errors: {}", messages.join("; ")));
    }

    let user = response
        .data
        .ok_or_else(|| anyhow!("No data in GitHub response"))?
        .user
        .ok_or_else(|| anyhow!("User not found"))?;

    let weeks = user
        .contributions_collection
        .contribution_calendar
        .weeks
        .into_iter()
        .map(|week| Week {
            days: week
                .contribution_days
                .into_iter()
                .map(|day| ContributionDay::new(day.date, day.contribution_count))
                .collect(),
        })
        .collect();

    Ok(Calendar::new(weeks))
}

/// Keep push events only, counting the commits each one carried
fn push_event_from(event: GitHubEvent) -> Option<PushEvent> {
    if event.event_type != "PushEvent" {
        return None;
    }

    // Newer payloads omit both fields; a push still means at least one commit
    let commit_count = event
        .payload
        .as_ref()
        .and_then(|payload| {
            payload
                .get("size")
                .and_then(|size| size.as_u64())
                .or_else(|| {
                    payload
                        .get("commits")
                        .and_then(|commits| commits.as_array())
                        .map(|commits| commits.len() as u64)
                })
        })
        .map(|count| u32::try_from(count).unwrap_or(u32::MAX))
        .unwrap_or(1)
        .max(1);

    Some(PushEvent {
        repository_name: event.repo.name,
        created_at: event.created_at,
        commit_count,
    })
}

// GitHub GraphQL response types

#[derive(Debug, Deserialize)]
struct GitHubCalendarResponse {
    data: Option<GitHubCalendarData>,
    errors: Option<Vec<GitHubGraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GitHubGraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GitHubCalendarData {
    user: Option<GitHubCalendarUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GitHubCalendarUser {
    contributions_collection: GitHubContributionsCollection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GitHubContributionsCollection {
    contribution_calendar: GitHubContributionCalendar,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
struct GitHubContributionCalendar {
    total_contributions: u64,
    weeks: Vec<GitHubWeek>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GitHubWeek {
    contribution_days: Vec<GitHubContributionDay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GitHubContributionDay {
    contribution_count: u32,
    date: NaiveDate,
}

// GitHub REST API response types

#[derive(Debug, Deserialize)]
struct GitHubRepo {
    name: String,
    full_name: String,
    private: bool,
}

#[derive(Debug, Deserialize)]
struct GitHubCommit {
    sha: String,
    commit: GitHubCommitDetail,
}

#[derive(Debug, Deserialize)]
struct GitHubCommitDetail {
    author: GitHubCommitAuthor,
}

#[derive(Debug, Deserialize)]
struct GitHubCommitAuthor {
    date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct GitHubEvent {
    #[serde(rename = "type")]
    event_type: String,
    created_at: DateTime<Utc>,
    repo: GitHubEventRepo,
    payload: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GitHubEventRepo {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: serde_json::Value) -> Result<Calendar> {
        calendar_from_response(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn test_calendar_from_response() {
        let calendar = parse(json!({
            "data": {
                "user": {
                    "contributionsCollection": {
                        "contributionCalendar": {
                            "totalContributions": 6,
                            "weeks": [
                                { "contributionDays": [
                                    { "contributionCount": 1, "date": "2022-12-31" }
                                ]},
                                { "contributionDays": [
                                    { "contributionCount": 2, "date": "2023-01-01" },
                                    { "contributionCount": 3, "date": "2023-01-02" }
                                ]}
                            ]
                        }
                    }
                }
            }
        }))
        .unwrap();

        assert_eq!(calendar.weeks.len(), 2);
        assert_eq!(calendar.day_count(), 3);
        let newest = calendar.days_rev().next().unwrap();
        assert_eq!(newest.date, NaiveDate::from_ymd_opt(2023, 1, 2).unwrap());
        assert_eq!(newest.count, 3);
    }

    #[test]
    fn test_calendar_graphql_errors() {
        let err = parse(json!({
            "data": null,
            "errors": [{ "message": "Could not resolve to a User with the login of 'nobody'." }]
        }))
        .unwrap_err();

        assert!(err.to_string().contains("Could not resolve to a User"));
    }

    #[test]
    fn test_calendar_missing_user() {
        let err = parse(json!({ "data": { "user": null } })).unwrap_err();
        assert_eq!(err.to_string(), "User not found");
    }

    #[test]
    fn test_malformed_day_is_rejected() {
        let malformed = serde_json::from_value::<GitHubCalendarResponse>(json!({
            "data": { "user": { "contributionsCollection": { "contributionCalendar": {
                "totalContributions": 1,
                "weeks": [{ "contributionDays": [{ "contributionCount": 1, "date": "01/02/2023" }] }]
            }}}}
        }));

        assert!(malformed.is_err());
    }

    #[test]
    fn test_push_event_commit_counts() {
        let event = |payload: serde_json::Value| -> GitHubEvent {
            serde_json::from_value(json!({
                "type": "PushEvent",
                "created_at": "2023-01-03T01:02:03Z",
                "repo": { "name": "octocat/hello-world" },
                "payload": payload,
            }))
            .unwrap()
        };

        assert_eq!(push_event_from(event(json!({ "size": 3 }))).unwrap().commit_count, 3);
        assert_eq!(
            push_event_from(event(json!({ "commits": [{}, {}] }))).unwrap().commit_count,
            2
        );
        assert_eq!(push_event_from(event(json!({ "ref": "refs/heads/main" }))).unwrap().commit_count, 1);
    }

    #[test]
    fn test_non_push_events_are_dropped() {
        let event: GitHubEvent = serde_json::from_value(json!({
            "type": "WatchEvent",
            "created_at": "2023-01-03T01:02:03Z",
            "repo": { "name": "octocat/hello-world" },
            "payload": { "action": "started" },
        }))
        .unwrap();

        assert!(push_event_from(event).is_none());
    }

    #[test]
    fn test_commit_listing_payload() {
        let commits: Vec<GitHubCommit> = serde_json::from_value(json!([
            { "sha": "abc", "commit": { "author": { "name": "Octo", "date": "2023-01-03T10:00:00Z" } } }
        ]))
        .unwrap();

        assert_eq!(commits[0].sha, "abc");
        assert_eq!(commits[0].commit.author.date.to_rfc3339(), "2023-01-03T10:00:00+00:00");
    }

    #[test]
    fn test_graphql_url() {
        let public = GitHubClient::new(PlatformConfig::github(), None).unwrap();
        assert_eq!(public.graphql_url(), "https://api.github.com/graphql");

        let enterprise = GitHubClient::new(
            PlatformConfig::github_custom("https://git.example.com/api/v3"),
            None,
        )
        .unwrap();
        assert_eq!(enterprise.graphql_url(), "https://git.example.com/api/graphql");
    }
}
