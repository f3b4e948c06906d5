// ── Policy ACL import ──
//
// Rule files hold one rule per line: a URL pattern, one space, then the
// ACL text (`/secret/ group:eng user:bob`). Rules become `policyAcls`
// entries keyed by `urlPattern`.

use std::io::BufRead;

use gsa_api::terms::{feeds, properties};
use gsa_api::{Entry, GsaClient};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::CoreError;
use crate::paginate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AclRule {
    pub url_pattern: String,
    pub acl: String,
}

impl AclRule {
    pub fn to_entry(&self) -> Entry {
        Entry::new()
            .with(properties::URL_PATTERN, &self.url_pattern)
            .with(properties::POLICY_ACL, &self.acl)
    }
}

/// A rule the appliance refused.
#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    pub url_pattern: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub rejected: Vec<Rejection>,
}

/// Read rules, one per non-empty line. Lines without a space separating
/// pattern from ACL are skipped with a warning.
pub fn parse_rules(reader: impl BufRead) -> Result<Vec<AclRule>, CoreError> {
    let mut rules = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        match line.split_once(' ') {
            Some((pattern, acl)) => rules.push(AclRule {
                url_pattern: pattern.to_owned(),
                acl: acl.to_owned(),
            }),
            None => warn!(line_no = index + 1, "skipping rule without an ACL: {line:?}"),
        }
    }
    Ok(rules)
}

/// Insert each rule into `policyAcls`.
///
/// A rule the appliance rejects is recorded and skipped. Failures that
/// would hit every following rule too (transport, timeout, expired
/// session) abort the import.
pub async fn import_rules(
    client: &GsaClient,
    rules: &[AclRule],
) -> Result<ImportReport, CoreError> {
    let mut report = ImportReport::default();
    for rule in rules {
        match client
            .insert_entry(feeds::POLICY_ACLS, &rule.to_entry())
            .await
        {
            Ok(_) => {
                info!(pattern = %rule.url_pattern, "added rule");
                report.inserted += 1;
            }
            Err(e) if !e.is_fatal_for_batch() => {
                warn!(pattern = %rule.url_pattern, error = %e, "rule rejected");
                report.rejected.push(Rejection {
                    url_pattern: rule.url_pattern.clone(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(report)
}

/// Delete every existing rule. Returns how many were removed.
pub async fn clear_rules(client: &GsaClient) -> Result<usize, CoreError> {
    let existing =
        paginate::fetch_all(client, feeds::POLICY_ACLS, paginate::DEFAULT_PAGE_SIZE).await?;
    let mut removed = 0;
    for entry in existing {
        let Some(pattern) = entry.get(properties::URL_PATTERN) else {
            warn!(id = ?entry.id, "policy entry without urlPattern, leaving it");
            continue;
        };
        client.delete_entry(feeds::POLICY_ACLS, &pattern).await?;
        info!(pattern = %pattern, "cleared rule");
        removed += 1;
    }
    Ok(removed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn splits_on_first_space_only() {
        let input = "/secret/ group:eng user:tom\n\n/public/ user:jerry group:school\r\n";
        let rules = parse_rules(Cursor::new(input)).unwrap();
        assert_eq!(
            rules,
            vec![
                AclRule {
                    url_pattern: "/secret/".into(),
                    acl: "group:eng user:tom".into(),
                },
                AclRule {
                    url_pattern: "/public/".into(),
                    acl: "user:jerry group:school".into(),
                },
            ]
        );
    }

    #[test]
    fn skips_lines_without_acl() {
        let rules = parse_rules(Cursor::new("lonely-pattern\n/a/ user:x\n")).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].url_pattern, "/a/");
    }

    #[test]
    fn rule_becomes_policy_entry() {
        let entry = AclRule {
            url_pattern: "/a/?x=1&y=2".into(),
            acl: "user:x".into(),
        }
        .to_entry();
        assert_eq!(entry.get("urlPattern").as_deref(), Some("/a/?x=1&y=2"));
        assert_eq!(entry.get("acl").as_deref(), Some("user:x"));
    }
}
