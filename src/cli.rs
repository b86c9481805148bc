use std::path::PathBuf;

use clap::Parser;

use crate::builder::RewriteBuilder;
use crate::errors::RewriteResult;
use crate::rules::RuleTable;

/// Add missing NAME fields to a QFX/OFX file by extracting them from MEMO.
#[derive(Parser, Debug, Clone)]
#[command(name = "qfx-name-from-memo", version, about)]
pub struct CliConfig {
    /// Input QFX file (OFX 2 XML), or an http(s) URL
    pub qfx_file_in: String,

    /// Output QFX file (OFX 1.02 SGML)
    pub qfx_file_out: PathBuf,

    /// Skip unrecognized transactions instead of failing
    #[arg(long)]
    pub skip_unknown: bool,

    /// TOML rule file replacing the built-in rules
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliConfig {
    /// Build the pipeline this invocation describes.
    pub fn builder(&self) -> RewriteResult<RewriteBuilder> {
        let mut builder = RewriteBuilder::new()
            .input(&self.qfx_file_in)
            .output(&self.qfx_file_out)
            .skip_unmatched(self.skip_unknown);
        if let Some(path) = &self.rules {
            builder = builder.rules(RuleTable::load(path)?);
        }
        Ok(builder)
    }
}
