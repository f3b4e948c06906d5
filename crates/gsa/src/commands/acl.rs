//! Policy ACL command handlers.

use std::io::Cursor;

use gsa_api::terms::feeds;
use gsa_api::{Feed, GsaClient};
use gsa_core::acl::{self, ImportReport};
use gsa_core::paginate;
use tracing::info;

use crate::cli::{AclArgs, AclCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(report: &ImportReport) -> String {
    let mut lines = vec![
        format!("Inserted: {}", report.inserted),
        format!("Rejected: {}", report.rejected.len()),
    ];
    for rejection in &report.rejected {
        lines.push(format!("  {}  {}", rejection.url_pattern, rejection.reason));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &GsaClient,
    args: AclArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    match args.command {
        AclCommand::List => {
            let entries =
                paginate::fetch_all(client, feeds::POLICY_ACLS, paginate::DEFAULT_PAGE_SIZE)
                    .await?;
            let feed = Feed {
                title: Some(feeds::POLICY_ACLS.into()),
                entries,
                ..Feed::default()
            };
            output::print_output(&output::render_feed(format, &feed)?, global.quiet);
            Ok(())
        }

        AclCommand::Import { file, replace_all } => {
            let text = util::read_input(&file)?;
            let rules = acl::parse_rules(Cursor::new(text))?;

            if replace_all {
                let prompt = "Delete every existing policy ACL rule before importing?";
                if !util::confirm(prompt, global.yes)? {
                    return Ok(());
                }
                let removed = acl::clear_rules(client).await?;
                info!(removed, "cleared existing rules");
            }

            let report = acl::import_rules(client, &rules).await?;
            let out = output::render_single(format, &report, detail)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use gsa_core::acl::Rejection;

    use super::*;

    #[test]
    fn detail_lists_rejections() {
        let report = ImportReport {
            inserted: 2,
            rejected: vec![Rejection {
                url_pattern: "/dup/".into(),
                reason: "EntryAlreadyExist".into(),
            }],
        };
        let text = detail(&report);
        assert!(text.starts_with("Inserted: 2\nRejected: 1"));
        assert!(text.contains("/dup/  EntryAlreadyExist"));
    }
}
