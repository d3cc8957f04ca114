use std::sync::Once;

static INIT: Once = Once::new();

/// Routes `tracing` output through the test harness so it only shows for
/// failing tests.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).with_test_writer().try_init();
    });
}
