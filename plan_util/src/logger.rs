/// Intercept messages using the `log` crate and print them to STDERR. Defaults to the `info`
/// level; override with `RUST_LOG`.
pub fn setup() {
    use env_logger::{Builder, Env};
    // Tests and tools may call this more than once
    let _ = Builder::from_env(Env::default().default_filter_or("info")).try_init();
}
