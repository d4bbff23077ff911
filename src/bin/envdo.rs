use anyhow::{Context, Result};
use envdo::common::{Config, EnvdoError, logging};
use envdo::runner::{Launcher, args, env};
use log::debug;

fn main() -> Result<()> {
    logging::init().context("Failed to initialize logging")?;

    let mut argv = std::env::args();
    let program = argv.next().unwrap_or_else(|| "envdo".to_string());

    let (settings, command) = match args::resolve(argv.collect()) {
        Ok(resolved) => resolved,
        Err(EnvdoError::Usage) => {
            usage(&program);
            return Err(EnvdoError::Usage.into());
        }
        Err(e) => return Err(e).context("could not resolve flags"),
    };

    let config = Config::load(&settings.config_path)?;
    debug!(
        "Using profile '{}' from {}",
        settings.profile,
        config.path().display()
    );
    let environment = env::merge(&config, &settings.profile)?;

    let launcher = Launcher::new(command, environment)?;
    debug!("Replacing process with {}", launcher.executable().display());

    match launcher.execute()? {}
}

fn usage(program: &str) {
    println!("Usage of {}:", program);
    println!("$ {} -p <profile> <cmd with args...>", program);
    println!("runs <cmd with args...> using env vars defined for <profile>");
    println!();
    println!("Options:");
    println!();
    println!("  --profile string");
    println!("  -p string");
    println!(
        "        Profile, i.e. a set of env vars to use for the command (default \"{}\")",
        args::DEFAULT_PROFILE
    );
    println!("  --config string");
    println!("  -f string");
    println!(
        "        File to read profiles from (default \"{}\")",
        args::DEFAULT_CONFIG_PATH
    );
    println!(
        r#"        Example file:
            # This is an example configuration. Put something like this into {}

            [default]
            # if no profile is specified, envdo will use the default profile
            FOO = "yes"
            BAR = "for sure"

            [other]
            FOO = "correct"
            BAR = "yes""#,
        args::DEFAULT_CONFIG_PATH
    );
}
