use super::error::ClientError;
use super::scheduler::Command;
use crate::api::protocol::{ENDPOINT_VALUES, ValueEnvelope};

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;

/// A fully resolved outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub body: Option<ValueEnvelope>,
}

impl RequestDescriptor {
    /// Harmless request sent in place of a command that cannot be built.
    pub fn diagnostic(base_url: &str) -> Self {
        Self {
            method: Method::OPTIONS,
            url: base_url.trim_end_matches('/').to_string(),
            body: None,
        }
    }
}

/// Builds the request for `command`, stamping write bodies with `now`.
pub fn try_build_request(
    command: Command,
    known_id: Option<&str>,
    base_url: &str,
    now: DateTime<Utc>,
) -> Result<RequestDescriptor, ClientError> {
    let collection_url = format!("{}{}", base_url.trim_end_matches('/'), ENDPOINT_VALUES);
    let item_url = || {
        known_id
            .filter(|id| !id.is_empty())
            .map(|id| format!("{}/{}", collection_url, id))
            .ok_or(ClientError::UnsupportedCommand(command))
    };
    let body = || ValueEnvelope {
        value: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    let request = match command {
        Command::GetAll => RequestDescriptor {
            method: Method::GET,
            url: collection_url.clone(),
            body: None,
        },
        Command::Add => RequestDescriptor {
            method: Method::POST,
            url: collection_url.clone(),
            body: Some(body()),
        },
        Command::GetById => RequestDescriptor {
            method: Method::GET,
            url: item_url()?,
            body: None,
        },
        Command::SetById => RequestDescriptor {
            method: Method::PUT,
            url: item_url()?,
            body: Some(body()),
        },
        Command::DeleteById => RequestDescriptor {
            method: Method::DELETE,
            url: item_url()?,
            body: None,
        },
    };

    Ok(request)
}

/// Builds the request for `command`; never fails.
///
/// A command that cannot be built is logged as an error and replaced by
/// `RequestDescriptor::diagnostic`, so the workload loop keeps running.
pub fn build_request(command: Command, known_id: Option<&str>, base_url: &str) -> RequestDescriptor {
    match try_build_request(command, known_id, base_url, Utc::now()) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!("{}", e);
            RequestDescriptor::diagnostic(base_url)
        }
    }
}
