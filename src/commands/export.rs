use super::Host;
use super::common::{CommonArgs, init_logging};
use crate::Result;
use crate::export::export;
use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;

const DEFAULT_OUTPUT_DIR: &str = "csv";

#[derive(Parser, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Directory for the CSV files (default is `csv` in the data directory)
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<Utf8PathBuf>,
}

pub fn export_data<H: Host>(host: &mut H, args: &ExportArgs) -> Result<()> {
    init_logging(args.common.log_level);

    let data_dir = args.common.data_dir()?;
    let output = args.output.clone().unwrap_or_else(|| data_dir.join(DEFAULT_OUTPUT_DIR));

    let summary = export(data_dir.as_std_path(), output.as_std_path())?;

    let mut out = host.output();
    for (name, rows) in &summary.tables {
        let _ = writeln!(out, "Wrote {rows} rows to {output}/{name}");
    }
    let _ = writeln!(out, "Read {} visit snapshots", summary.snapshots);

    Ok(())
}
