use env_logger::{Builder, Env};
use std::io::Write;

/// Installs the global logger. Level comes from `RUST_LOG`, `info` if unset.
/// Calling it again is a no-op.
pub fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(buf, "{} [{}] {} - {}",
                buf.timestamp_seconds(),
                record.level(),
                record.module_path().unwrap_or("unknown"),
                record.args())
        })
        .try_init();
}
