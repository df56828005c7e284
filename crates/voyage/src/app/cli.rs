use std::path::PathBuf;

use super::loop_runner::RunOptions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CliCommand {
    Run(RunOptions),
    Help,
}

pub(crate) fn parse_args<I>(args: I) -> Result<CliCommand, String>
where
    I: IntoIterator<Item = String>,
{
    let args = args.into_iter().collect::<Vec<_>>();
    let mut options = RunOptions::default();
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "-h" | "--help" => return Ok(CliCommand::Help),
            "--config" => {
                options.config_path = Some(PathBuf::from(value_for(&args, index, "--config")?));
                index += 2;
            }
            "--map" => {
                options.map_path = Some(PathBuf::from(value_for(&args, index, "--map")?));
                index += 2;
            }
            "--snapshot" => {
                options.snapshot_path = Some(PathBuf::from(value_for(&args, index, "--snapshot")?));
                index += 2;
            }
            "--max-ticks" => {
                let value = value_for(&args, index, "--max-ticks")?;
                options.max_ticks = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("invalid --max-ticks value '{value}' (expected u64)"))?,
                );
                index += 2;
            }
            other => return Err(format!("unknown argument '{other}'\n\n{}", usage_text())),
        }
    }
    Ok(CliCommand::Run(options))
}

fn value_for<'a>(args: &'a [String], index: usize, flag: &str) -> Result<&'a str, String> {
    args.get(index + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("missing value for {flag}"))
}

pub(crate) fn usage_text() -> String {
    [
        "voyage - headless sea chart navigation run",
        "",
        "Usage:",
        "  voyage [--config <file.json>] [--map <file.tmx>] [--snapshot <out.png>] [--max-ticks <u64>]",
        "",
        "Without --map the built-in demo chart and its scripted voyage are used.",
        "The config path falls back to $VOYAGE_CONFIG, then to built-in defaults.",
        "Log filtering follows $RUST_LOG (default: info).",
    ]
    .join("\n")
}
