use crate::Result;
use crate::model::{OwnerKind, TrendingVisit, Visit};
use crate::store::{IdentityStore, VisitSnapshot};
use chrono::DateTime;
use csv::{QuoteStyle, Writer, WriterBuilder};
use ohno::IntoAppError;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const LOG_TARGET: &str = "    export";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The `-1` sentinel for measurements that could not be taken.
const UNKNOWN: i64 = -1;

/// Files written by one export, with their data row counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub tables: Vec<(String, usize)>,
    pub snapshots: usize,
}

struct Table {
    name: &'static str,
    path: PathBuf,
    writer: Writer<File>,
    rows: usize,
}

impl Table {
    fn create(dir: &Path, name: &'static str, header: &[&str]) -> Result<Self> {
        let path = dir.join(name);
        let mut file = File::create(&path).into_app_err_with(|| format!("unable to create file '{}'", path.display()))?;

        // column names stay bare; only data fields follow the quoting rule
        writeln!(file, "{}", header.join(",")).into_app_err_with(|| format!("unable to write file '{}'", path.display()))?;

        let writer = WriterBuilder::new().quote_style(QuoteStyle::NonNumeric).from_writer(file);
        Ok(Self { name, path, writer, rows: 0 })
    }

    fn row(&mut self, record: impl Serialize) -> Result<()> {
        self.writer
            .serialize(record)
            .into_app_err_with(|| format!("unable to write file '{}'", self.path.display()))?;
        self.rows += 1;
        Ok(())
    }

    fn finish(mut self, summary: &mut ExportSummary) -> Result<()> {
        self.writer
            .flush()
            .into_app_err_with(|| format!("unable to flush file '{}'", self.path.display()))?;

        log::debug!(target: LOG_TARGET, "Wrote {} rows to '{}'", self.rows, self.path.display());
        summary.tables.push((self.name.to_string(), self.rows));
        Ok(())
    }
}

fn render_timestamp(timestamp: i64) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

/// Flatten the identity store and every snapshot of `data_dir` into CSV tables in `output_dir`.
///
/// Rows follow key order and snapshots follow date order, so exporting unchanged data again
/// produces identical files.
pub fn export(data_dir: &Path, output_dir: &Path) -> Result<ExportSummary> {
    let store = IdentityStore::load(data_dir)?;

    let mut snapshots = Vec::new();
    for path in VisitSnapshot::list(data_dir)? {
        log::info!(target: LOG_TARGET, "Reading snapshot '{}'", path.display());
        snapshots.push(VisitSnapshot::load(&path)?);
    }

    fs::create_dir_all(output_dir).into_app_err_with(|| format!("unable to create directory '{}'", output_dir.display()))?;

    let mut summary = ExportSummary {
        snapshots: snapshots.len(),
        ..ExportSummary::default()
    };

    write_identity_tables(&store, &snapshots, output_dir, &mut summary)?;
    write_visit_tables(&store, &snapshots, output_dir, &mut summary)?;

    Ok(summary)
}

fn write_identity_tables(store: &IdentityStore, snapshots: &[VisitSnapshot], dir: &Path, summary: &mut ExportSummary) -> Result<()> {
    let mut table = Table::create(dir, "Repositories.csv", &["owner", "name", "description", "mainLanguage", "license"])?;
    for r in store.repositories.values() {
        table.row((&r.owner, &r.repo, &r.description, &r.main_language, &r.license))?;
    }
    table.finish(summary)?;

    let mut table = Table::create(dir, "RepositoryTopics.csv", &["owner", "repo", "topic"])?;
    for r in store.repositories.values() {
        for tag in &r.tags {
            table.row((&r.owner, &r.repo, tag.trim()))?;
        }
    }
    table.finish(summary)?;

    let mut table = Table::create(dir, "Commits.csv", &["sha", "author", "repository", "repositoryOwner", "message"])?;
    for c in store.commits.values() {
        let message = c.message.lines().next().unwrap_or("");
        table.row((&c.sha, &c.commit_author, &c.repo, &c.repo_owner, message))?;
    }
    table.finish(summary)?;

    // every username referenced anywhere, with details where the owner itself is known
    let mut owners: BTreeMap<&str, (&str, &str)> = BTreeMap::new();
    for o in store.owners.values() {
        let _ = owners.insert(&o.username, (&o.avatar_url, o.kind.as_str()));
    }

    let referenced = snapshots
        .iter()
        .flat_map(|s| s.owners().values().map(|v| v.username.as_str()))
        .chain(store.commits.values().flat_map(|c| [c.commit_author.as_str(), c.repo_owner.as_str()]));
    for username in referenced.filter(|u| !u.is_empty()) {
        let _ = owners.entry(username).or_insert(("", OwnerKind::User.as_str()));
    }

    let mut table = Table::create(dir, "Owners.csv", &["username", "avatar_url", "kind"])?;
    for (username, (avatar_url, kind)) in owners {
        table.row((username, avatar_url, kind))?;
    }
    table.finish(summary)?;

    // visited topics plus tags that were never visited
    let mut topics: BTreeMap<&str, &str> = store.topics.values().map(|t| (t.name.as_str(), t.main_language.trim())).collect();
    for tag in store.repositories.values().flat_map(|r| r.tags.iter()) {
        let tag = tag.trim();
        if !tag.is_empty() {
            let _ = topics.entry(tag).or_insert("");
        }
    }

    let mut table = Table::create(dir, "Topics.csv", &["name", "mainLanguage"])?;
    for (name, main_language) in topics {
        table.row((name, main_language))?;
    }
    table.finish(summary)
}

fn write_visit_tables(store: &IdentityStore, snapshots: &[VisitSnapshot], dir: &Path, summary: &mut ExportSummary) -> Result<()> {
    let mut table = Table::create(
        dir,
        "RepositoryVisits.csv",
        &[
            "date",
            "owner",
            "name",
            "forks",
            "commits",
            "stars",
            "watchers",
            "contributors",
            "openIssues",
            "closedIssues",
            "openPullRequests",
            "closedPullRequests",
        ],
    )?;
    for v in snapshots.iter().flat_map(|s| s.repositories().values()) {
        table.row((
            render_timestamp(v.visit_timestamp()),
            &v.owner,
            &v.repo,
            v.forks_amount,
            v.commits_amount,
            v.stars_amount,
            v.watchers_amount,
            v.contributors_amount,
            v.open_issues_amount,
            v.closed_issues_amount,
            v.open_pull_requests_amount,
            v.closed_pull_requests_amount,
        ))?;
    }
    table.finish(summary)?;

    let mut table = Table::create(dir, "OwnerVisits.csv", &["date", "username", "contributionsLastYear"])?;
    for v in snapshots.iter().flat_map(|s| s.owners().values()) {
        if v.contributions_last_year != UNKNOWN {
            table.row((render_timestamp(v.visit_timestamp()), &v.username, v.contributions_last_year))?;
        }
    }
    table.finish(summary)?;

    let mut table = Table::create(dir, "TopicVisits.csv", &["date", "name", "repositories", "followers"])?;
    for v in snapshots.iter().flat_map(|s| s.topics().values()) {
        table.row((render_timestamp(v.visit_timestamp()), &v.name, v.repositories, v.followers))?;
    }
    table.finish(summary)?;

    // the store keeps the latest trending pages, which may predate snapshots that carry them
    let mut seen = HashSet::new();
    let trending = snapshots
        .iter()
        .flat_map(|s| s.trending_per_language().values())
        .chain(store.trending_per_language.values())
        .flatten()
        .filter(|v| seen.insert((v.visit_timestamp(), v.language.clone(), v.key())));

    let mut table = Table::create(dir, "TrendVisits.csv", &["date", "repo_name", "owner", "starsToday", "language"])?;
    for v in trending {
        write_trend(&mut table, v)?;
    }
    table.finish(summary)
}

fn write_trend(table: &mut Table, v: &TrendingVisit) -> Result<()> {
    table.row((render_timestamp(v.visit_timestamp()), &v.repo, &v.owner, v.stars_today, &v.language))
}
