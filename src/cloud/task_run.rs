//! TaskRun identifiers
//!
//! A task run is addressed as `<namespace>:<name>`. Both halves must be valid
//! Kubernetes names, so `:` can never appear inside either of them.

use crate::{CrdHostError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SEPARATOR: char = ':';
const MAX_LABEL_LEN: usize = 63;
const MAX_SUBDOMAIN_LEN: usize = 253;

/// Namespace and name of a TaskRun
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskRunId {
    pub namespace: String,
    pub name: String,
}

impl TaskRunId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let id = Self {
            namespace: namespace.into(),
            name: name.into(),
        };
        validate_parts(&id.to_string(), &id.namespace, &id.name)?;
        Ok(id)
    }
}

impl fmt::Display for TaskRunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.namespace, SEPARATOR, self.name)
    }
}

impl FromStr for TaskRunId {
    type Err = CrdHostError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(invalid(s, "TaskRun ID cannot be empty"));
        }

        let mut parts = s.split(SEPARATOR);
        let (namespace, name) = match (parts.next(), parts.next(), parts.next()) {
            (Some(ns), Some(name), None) => (ns, name),
            _ => return Err(invalid(s, "expected format 'namespace:name'")),
        };

        validate_parts(s, namespace, name)?;

        Ok(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }
}

/// Check that `id` is a well-formed `<namespace>:<name>` TaskRun ID
pub fn validate_task_run_id(id: &str) -> Result<()> {
    id.parse::<TaskRunId>().map(|_| ())
}

/// Validate a DNS-1123 label, the format of a Kubernetes namespace
pub fn validate_dns_label(value: &str) -> std::result::Result<(), String> {
    validate_dns_name(value, MAX_LABEL_LEN, false)
}

fn validate_parts(id: &str, namespace: &str, name: &str) -> Result<()> {
    validate_dns_label(namespace).map_err(|e| invalid(id, &format!("namespace {}", e)))?;
    validate_dns_name(name, MAX_SUBDOMAIN_LEN, true)
        .map_err(|e| invalid(id, &format!("name {}", e)))
}

fn validate_dns_name(
    value: &str,
    max_len: usize,
    allow_dots: bool,
) -> std::result::Result<(), String> {
    if value.is_empty() {
        return Err("must not be empty".to_string());
    }
    if value.len() > max_len {
        return Err(format!("must be at most {} characters", max_len));
    }

    let allowed = |c: char| {
        c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || (allow_dots && c == '.')
    };
    if let Some(bad) = value.chars().find(|c| !allowed(*c)) {
        return Err(format!("contains invalid character {:?}", bad));
    }

    let alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    let starts_ok = value.chars().next().is_some_and(alnum);
    let ends_ok = value.chars().next_back().is_some_and(alnum);
    if !starts_ok || !ends_ok {
        return Err("must start and end with an alphanumeric character".to_string());
    }

    Ok(())
}

fn invalid(id: &str, reason: &str) -> CrdHostError {
    CrdHostError::InvalidTaskRunId {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}
