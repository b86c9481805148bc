use qfx_name_from_memo::{RewriteBuilder, RuleTable};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let file_path = if args.len() > 1 {
        &args[1]
    } else {
        println!("Using sample QFX data from tests/fixtures/capital_one_360.qfx\n");
        println!("Usage: cargo run --example rewrite_qfx [path/to/in.qfx] [path/to/out.qfx]\n");
        "tests/fixtures/capital_one_360.qfx"
    };

    println!("Built-in rules:");
    for (i, rule) in RuleTable::default().iter().enumerate() {
        println!("  #{} {} -> {:?}", i + 1, rule.pattern(), rule.source());
    }
    println!();

    if let Some(out_path) = args.get(2) {
        let report = RewriteBuilder::new()
            .input(file_path)
            .output(out_path)
            .skip_unmatched(true)
            .run()?;
        println!(
            "Wrote {}: {} rewritten, {} skipped, {} untouched",
            out_path, report.rewritten, report.skipped, report.untouched
        );
        return Ok(());
    }

    let rewritten = RewriteBuilder::new()
        .input(file_path)
        .skip_unmatched(true)
        .rewrite()?;

    println!(
        "{} rewritten, {} skipped, {} untouched\n",
        rewritten.report.rewritten, rewritten.report.skipped, rewritten.report.untouched
    );
    print!("{}", rewritten.output);

    Ok(())
}
