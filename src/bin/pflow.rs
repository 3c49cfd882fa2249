use std::io::Write;

use anyhow::{Context, Result};
use log::{debug, warn};

use pflow::codegen;
use pflow::config::PflowConfig;
use pflow::net::io::write_text;
use pflow::options::Options;
use pflow::{Compiler, NetDocument};

fn main() {
    if std::env::var("PFLOW_LOG").is_ok() {
        let e = env_logger::Env::new()
            .filter("PFLOW_LOG")
            .write_style("PFLOW_LOG_STYLE");
        env_logger::init_from_env(e);
    }

    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let env_flags = std::env::var("PFLOW_FLAGS").unwrap_or_default();
    let options = match Options::parse_with_env_flags(&env_flags, &args) {
        Ok(options) => options,
        Err(pflow::options::OptionsError::Clap(err)) => err.exit(),
        Err(err) => return Err(err.into()),
    };
    debug!("pflow options: {:?}", options);

    let config = PflowConfig::load_from_file(&options.config)?;
    debug!("pflow config: {:?}", config);

    let document = NetDocument::from_path(&options.input)?;
    let model = Compiler::new(config.default_role.as_str())
        .compile(&document.records)
        .with_context(|| format!("Failed to compile {:?}", options.input))?;

    let report = model.diagnose();
    for warning in report.warnings() {
        warn!("{warning}");
    }

    let name = options
        .name
        .or(config.machine_name)
        .unwrap_or(document.name);
    let target = options.target.unwrap_or(config.target);
    let artifact = codegen::emit(&model, &name, target)?;

    match options.output {
        Some(path) => write_text(&path, &artifact)
            .with_context(|| format!("Failed to write {:?}", path))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(artifact.as_bytes())?;
            if !artifact.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}
