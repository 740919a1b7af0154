use crate::cli::args::RunArgs;
use crate::config::load_config;

pub fn check(args: &RunArgs) -> anyhow::Result<()> {
    match load_config(args.config.as_deref(), args.overrides()) {
        Ok(cfg) => {
            println!("✔ Config loaded successfully");
            if let Some(file) = &cfg.file {
                println!("✔ following {}", file.display());
            }
            println!("✔ top {} sections every {}s", cfg.top_k, cfg.period_secs);
            Ok(())
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
