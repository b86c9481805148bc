use std::process::ExitCode;

use clap::Parser;
use qfx_name_from_memo::RewriteError;
use qfx_name_from_memo::cli::CliConfig;
use qfx_name_from_memo::logger;

fn main() -> ExitCode {
    let config = CliConfig::parse();
    logger::init_cli_logger(config.verbose);
    tracing::debug!("CLI config: {:?}", config);

    let result = config
        .builder()
        .and_then(|builder| builder.run());

    match result {
        Ok(report) => {
            tracing::info!(
                "Done: {} rewritten, {} skipped, {} untouched",
                report.rewritten,
                report.skipped,
                report.untouched
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            if let RewriteError::UnmatchedMemo { fitid: Some(fitid), .. } = &e {
                tracing::error!("Offending transaction FITID: {}", fitid);
            }
            if matches!(e, RewriteError::UnmatchedMemo { .. }) {
                eprintln!("Add a rule for this memo with --rules, or rerun with --skip-unknown");
            }
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
