use anyhow::Result;
use env_logger::{Builder, Env, Target, WriteStyle};
use log::LevelFilter;
use std::io::Write;

/// Environment variable holding an env_logger filter, e.g. `ENVDO_LOG=debug`.
pub const LOG_ENV: &str = "ENVDO_LOG";

/// `always`, `never` or `auto` (the default: colour only when stderr is a terminal).
pub const LOG_STYLE_ENV: &str = "ENVDO_LOG_STYLE";

/// Initialize logging on stderr. Quiet (`warn`) unless `ENVDO_LOG` says otherwise,
/// since anything printed here shows up in front of the wrapped command's output.
pub fn init() -> Result<()> {
    Builder::new()
        .target(Target::Stderr)
        .filter_level(LevelFilter::Warn)
        .write_style(WriteStyle::Auto)
        .parse_env(Env::new().filter(LOG_ENV).write_style(LOG_STYLE_ENV))
        .format(format_log)
        .try_init()?;

    Ok(())
}

/// `HH:MM:SS LEVEL [module] message`, prefixed with `envdo` so the lines stand apart
/// from the wrapped command's own stderr.
fn format_log(buf: &mut env_logger::fmt::Formatter, record: &log::Record) -> std::io::Result<()> {
    let target = record.target();
    let module = target.rsplit("::").next().unwrap_or(target);
    let style = buf.default_level_style(record.level());

    writeln!(
        buf,
        "envdo {} {style}{:<5}{style:#} [{}] {}",
        chrono::Local::now().format("%H:%M:%S"),
        record.level(),
        module,
        record.args()
    )
}
