//! Lists everyone currently in space, as reported by the Open Notify API.
//!
//! One request, no retries. Any failure ends the command.

use std::io::Write;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};
use tracing_error::{ExtractSpanTrace, SpanTrace};

use crate::config::AstronautsConfig;
use crate::error::{SpannedErr, SpannedExt};

const HEADER: &str = "👨‍🚀 Astronautas no espaço agora:";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PeopleInSpace {
    pub people: Vec<Astronaut>,
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Astronaut {
    pub name: String,
    pub craft: String,
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request to '{0}' failed: {1}")]
    Request(String, SpannedErr<reqwest::Error>),

    #[error("Response from '{0}' is not a valid people list: {1}")]
    Decode(String, SpannedErr<serde_json::Error>),

    #[error("Failed to write roster: {0}")]
    Output(#[from] std::io::Error),
}

impl ExtractSpanTrace for FetchError {
    fn span_trace(&self) -> Option<&SpanTrace> {
        match self {
            FetchError::Request(_, e) => e.span_trace(),
            FetchError::Decode(_, e) => e.span_trace(),
            FetchError::Output(_) => None,
        }
    }
}

#[instrument("astronauts/fetch", skip(client))]
pub async fn fetch_people_in_space(
    client: &reqwest::Client,
    url: &str,
) -> Result<PeopleInSpace, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .with_span_trace()
        .map_err(|e| FetchError::Request(url.to_string(), e))?;
    debug!("Received {} from '{}'.", response.status(), url);

    let body = response
        .text()
        .await
        .with_span_trace()
        .map_err(|e| FetchError::Request(url.to_string(), e))?;

    serde_json::from_str(&body)
        .with_span_trace()
        .map_err(|e| FetchError::Decode(url.to_string(), e))
}

/// One `- {name} ({craft})` line per person, in response order.
pub fn roster_lines(roster: &PeopleInSpace) -> impl Iterator<Item = String> + '_ {
    roster
        .people
        .iter()
        .map(|person| format!("- {} ({})", person.name, person.craft))
}

pub fn print_roster<W: Write>(out: &mut W, roster: &PeopleInSpace) -> std::io::Result<()> {
    writeln!(out, "{HEADER}")?;
    for line in roster_lines(roster) {
        writeln!(out, "{line}")?;
    }
    out.flush()
}

pub async fn run(config: &AstronautsConfig) -> Result<(), FetchError> {
    let client = reqwest::Client::new();
    let roster = fetch_people_in_space(&client, &config.url).await?;
    print_roster(&mut std::io::stdout().lock(), &roster)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::header;
    use axum::routing::get;

    const SAMPLE: &str = r#"{
        "message": "success",
        "number": 3,
        "people": [
            {"craft": "ISS", "name": "Oleg Kononenko"},
            {"craft": "ISS", "name": "Tracy Caldwell Dyson"},
            {"craft": "Tiangong", "name": "Ye Guangfu"}
        ]
    }"#;

    async fn serve_body(body: &'static str) -> String {
        let router = Router::new().route(
            "/astros.json",
            get(move || async move { ([(header::CONTENT_TYPE, "application/json")], body) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/astros.json")
    }

    #[test]
    fn test_roster_lines_one_per_person() {
        let roster: PeopleInSpace = serde_json::from_str(SAMPLE).unwrap();

        let lines: Vec<String> = roster_lines(&roster).collect();

        assert_eq!(
            lines,
            vec![
                "- Oleg Kononenko (ISS)",
                "- Tracy Caldwell Dyson (ISS)",
                "- Ye Guangfu (Tiangong)",
            ]
        );
    }

    #[test]
    fn test_roster_lines_empty() {
        let roster: PeopleInSpace = serde_json::from_str(r#"{"people": []}"#).unwrap();
        assert_eq!(roster_lines(&roster).count(), 0);
    }

    #[test]
    fn test_print_roster() {
        let roster: PeopleInSpace = serde_json::from_str(SAMPLE).unwrap();
        let mut out = Vec::new();

        print_roster(&mut out, &roster).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "👨‍🚀 Astronautas no espaço agora:\n\
             - Oleg Kononenko (ISS)\n\
             - Tracy Caldwell Dyson (ISS)\n\
             - Ye Guangfu (Tiangong)\n"
        );
    }

    #[test]
    fn test_people_list_is_required() {
        assert!(serde_json::from_str::<PeopleInSpace>(r#"{"number": 0}"#).is_err());
        assert!(
            serde_json::from_str::<PeopleInSpace>(r#"{"people": [{"name": "No Craft"}]}"#)
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_fetch_people_in_space() {
        let url = serve_body(SAMPLE).await;

        let roster = fetch_people_in_space(&reqwest::Client::new(), &url)
            .await
            .unwrap();

        assert_eq!(roster.number, Some(3));
        assert_eq!(roster.people.len(), 3);
        assert_eq!(
            roster.people[2],
            Astronaut {
                name: "Ye Guangfu".to_string(),
                craft: "Tiangong".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_non_json_body() {
        let url = serve_body("<html>maintenance</html>").await;

        let err = fetch_people_in_space(&reqwest::Client::new(), &url)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Decode(..)));
        assert!(err.span_trace().is_some());
    }

    #[tokio::test]
    async fn test_fetch_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetch_people_in_space(&reqwest::Client::new(), &format!("http://{addr}/"))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Request(..)));
    }
}
