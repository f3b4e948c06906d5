//! `gsa crawl`, `gsa index` and `gsa doc-limit`: one command, many appliances.

use gsa_config::Config;
use gsa_core::fleet::{self, FleetCommand, FleetReport};
use tracing::warn;

use crate::cli::{
    CrawlArgs, CrawlCommand, DocLimitArgs, DocLimitCommand, GlobalOpts, IndexArgs, IndexCommand,
    OutputFormat,
};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(report: &FleetReport) -> String {
    let mut lines = vec![format!("Applied: {}", report.applied.len())];
    lines.extend(report.applied.iter().map(|address| format!("  {address}")));
    lines.push(format!("Failed: {}", report.failed.len()));
    lines.extend(
        report
            .failed
            .iter()
            .map(|failure| format!("  {}  {}", failure.address, failure.reason)),
    );
    lines.join("\n")
}

pub async fn crawl(
    args: CrawlArgs,
    global: &GlobalOpts,
    cfg: &Config,
    format: OutputFormat,
) -> Result<(), CliError> {
    match args.command {
        CrawlCommand::Pause(targets) => {
            run(FleetCommand::PauseCrawl, &targets.hosts, global, cfg, format).await
        }
        CrawlCommand::Resume(targets) => {
            run(FleetCommand::ResumeCrawl, &targets.hosts, global, cfg, format).await
        }
    }
}

pub async fn index(
    args: IndexArgs,
    global: &GlobalOpts,
    cfg: &Config,
    format: OutputFormat,
) -> Result<(), CliError> {
    match args.command {
        IndexCommand::Reset(targets) => {
            run(FleetCommand::ResetIndex, &targets.hosts, global, cfg, format).await
        }
    }
}

pub async fn doc_limit(
    args: DocLimitArgs,
    global: &GlobalOpts,
    cfg: &Config,
    format: OutputFormat,
) -> Result<(), CliError> {
    match args.command {
        DocLimitCommand::Set { max_urls, targets } => {
            let command = FleetCommand::SetDocLimit { max_urls };
            run(command, &targets.hosts, global, cfg, format).await
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

async fn run(
    command: FleetCommand,
    hosts: &[String],
    global: &GlobalOpts,
    cfg: &Config,
    format: OutputFormat,
) -> Result<(), CliError> {
    let connections = config::fleet_connections(global, cfg, hosts)?;

    if command == FleetCommand::ResetIndex {
        let prompt = format!(
            "Reset the index on {} appliance(s)? Every document will be recrawled.",
            connections.len()
        );
        if !util::confirm(&prompt, global.yes)? {
            return Ok(());
        }
    }

    let mut report = FleetReport::default();
    let mut clients = Vec::with_capacity(connections.len());
    for (address, login) in fleet::connect_all(&connections).await {
        match login {
            Ok(client) => clients.push(client),
            Err(e) => {
                warn!(address = %address, error = %e, "login failed, skipping appliance");
                report.record_failure(address, e);
            }
        }
    }

    let sent = fleet::apply(&clients, command).await;
    report.applied = sent.applied;
    report.failed.extend(sent.failed);

    let out = output::render_single(format, &report, detail)?;
    output::print_output(&out, global.quiet);

    if report.is_complete() {
        Ok(())
    } else {
        Err(CliError::PartialFailure {
            action: command.to_string(),
            failed: report.failed.len(),
            total: connections.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use gsa_core::fleet::FleetFailure;

    use super::*;

    #[test]
    fn detail_lists_both_outcomes() {
        let report = FleetReport {
            applied: vec!["gsa1:8000".into()],
            failed: vec![FleetFailure {
                address: "gsa2:8000".into(),
                reason: "refused".into(),
            }],
        };
        assert_eq!(
            detail(&report),
            "Applied: 1\n  gsa1:8000\nFailed: 1\n  gsa2:8000  refused"
        );
    }
}
